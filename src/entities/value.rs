//! Attribute/property values and their usda literal form.
//!
//! Formatting rules:
//! - `Text` is double-quoted with `"` and `\` escaped; multi-line text uses `"""`.
//! - `Sequence` is `[a, b]` in array context and `(a, b)` otherwise.
//!   Nested sequences are always tuples, so `point3f[]` reads `[(0, 0, 1), ...]`.
//! - `Float` always carries a decimal point so `24.0` never turns into `24`.
//!
//! Formatting never fails.

use std::fmt;

use super::keys::ARRAY_SUFFIX;

/// Generic scene value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Sequence(Vec<Value>),
    /// Scene path, written as `</a/b>`
    Path(String),
    /// Asset path, written as `@file.usda@`
    Asset(String),
}

impl Value {
    pub fn path(path: impl Into<String>) -> Self {
        Value::Path(path.into())
    }

    pub fn asset(path: impl Into<String>) -> Self {
        Value::Asset(path.into())
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_empty_sequence(&self) -> bool {
        matches!(self, Value::Sequence(items) if items.is_empty())
    }

    /// Unquoted text of the value, used where the surrounding syntax
    /// supplies its own delimiters (asset references).
    pub fn raw_string(&self) -> String {
        match self {
            Value::Text(s) | Value::Path(s) | Value::Asset(s) => s.clone(),
            other => format_value(other, false),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_value(self, true))
    }
}

/// Format a value as a usda literal.
///
/// `array_context` picks `[...]` over `(...)` for the outermost sequence.
pub fn format_value(value: &Value, array_context: bool) -> String {
    match value {
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Text(s) => format_string(s),
        Value::Sequence(items) => {
            let elements: Vec<String> = items.iter().map(|v| format_value(v, false)).collect();
            if array_context {
                format!("[{}]", elements.join(", "))
            } else {
                format!("({})", elements.join(", "))
            }
        }
        Value::Path(p) => format!("<{}>", p),
        Value::Asset(a) => format!("@{}@", a),
    }
}

/// Whether a declared type tag selects array bracketing.
///
/// No declared type means array form.
pub fn is_array_type(as_type: Option<&str>) -> bool {
    as_type.is_none_or(|t| t.ends_with(ARRAY_SUFFIX))
}

/// Format a float ensuring it has a decimal point (to distinguish from int).
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f.is_sign_positive() { "inf" } else { "-inf" }.to_string();
    }

    let s = f.to_string();
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Quote a string, switching to a triple-quoted literal for multi-line text.
pub fn format_string(s: &str) -> String {
    if s.contains('\n') {
        format!("\"\"\"{}\"\"\"", escape_string(s))
    } else {
        format!("\"{}\"", escape_string(s))
    }
}

fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ => result.push(ch),
        }
    }
    result
}

// --- Conversions ---

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! int_into_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

int_into_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        // Past i64::MAX only a float can hold the magnitude
        i64::try_from(v).map_or(Value::Float(v as f64), Value::Int)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::from(v as u64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        // Widen through the shortest decimal so 0.1f32 stays 0.1
        Value::Float(v.to_string().parse().unwrap_or(v as f64))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::Sequence(v.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Sequence(vec![a.into(), b.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Value::Sequence(vec![a.into(), b.into(), c.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>, D: Into<Value>> From<(A, B, C, D)> for Value {
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        Value::Sequence(vec![a.into(), b.into(), c.into(), d.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_vs_tuple() {
        let v: Value = vec![1, 2, 3].into();
        assert_eq!(format_value(&v, true), "[1, 2, 3]");
        let t: Value = (1, 2, 3).into();
        assert_eq!(format_value(&t, false), "(1, 2, 3)");
    }

    #[test]
    fn test_string_escaping() {
        let v = Value::from("a\"b");
        assert_eq!(format_value(&v, false), "\"a\\\"b\"");
        assert_eq!(format_value(&Value::from("c:\\tmp"), false), "\"c:\\\\tmp\"");
    }

    #[test]
    fn test_multiline_string() {
        let v = Value::from("line one\nline two");
        assert_eq!(format_value(&v, false), "\"\"\"line one\nline two\"\"\"");
    }

    #[test]
    fn test_multiline_string_escapes_quotes_and_backslashes() {
        let trailing = format_value(&Value::from("line one\nends with \""), false);
        assert_eq!(trailing, "\"\"\"line one\nends with \\\"\"\"\"");

        let inner = format_value(&Value::from("say \"hi\"\nbye"), false);
        assert_eq!(inner, "\"\"\"say \\\"hi\\\"\nbye\"\"\"");

        let windows = format_value(&Value::from("C:\\new\nx"), false);
        assert_eq!(windows, "\"\"\"C:\\\\new\nx\"\"\"");
    }

    #[test]
    fn test_large_unsigned_does_not_wrap() {
        assert_eq!(Value::from(7usize), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::Float(u64::MAX as f64));
        assert!(!format_value(&Value::from(u64::MAX), false).starts_with('-'));
    }

    #[test]
    fn test_strings_inside_sequence_are_quoted_once() {
        let v: Value = vec!["xformOp:translate", "xformOp:scale"].into();
        assert_eq!(
            format_value(&v, true),
            "[\"xformOp:translate\", \"xformOp:scale\"]"
        );
    }

    #[test]
    fn test_nested_sequences_are_tuples() {
        let v: Value = vec![(0, 0, 1), (1, 0, 0)].into();
        assert_eq!(format_value(&v, true), "[(0, 0, 1), (1, 0, 0)]");
    }

    #[test]
    fn test_empty_sequence() {
        let v: Value = Vec::<i32>::new().into();
        assert!(v.is_empty_sequence());
        assert_eq!(format_value(&v, true), "[]");
    }

    #[test]
    fn test_floats_keep_decimal_point() {
        assert_eq!(format_float(24.0), "24.0");
        assert_eq!(format_float(-1.99), "-1.99");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_value(&Value::from(0.1f32), false), "0.1");
    }

    #[test]
    fn test_scalars() {
        assert_eq!(format_value(&Value::from(true), false), "true");
        assert_eq!(format_value(&Value::from(10), false), "10");
        assert_eq!(format_value(&Value::path("/root/cyl"), false), "</root/cyl>");
        assert_eq!(format_value(&Value::asset("a.usda"), false), "@a.usda@");
    }

    #[test]
    fn test_array_type_detection() {
        assert!(is_array_type(None));
        assert!(is_array_type(Some("point3f[]")));
        assert!(!is_array_type(Some("double3")));
    }
}
