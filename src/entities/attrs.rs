//! Properties and attributes: named values owned by prims and the stage.
//!
//! - `Property` renders in a prim's `( ... )` metadata block.
//! - `Attribute` renders in a prim's `{ ... }` body and may be `uniform`.
//!
//! Both share `ValueState`: a plain value plus optional time samples.
//! Nothing renders until it is authored (`was_set` or at least one keyframe).
//! Setting a plain value drops time samples and vice versa, so a holder is
//! either static or animated, never both.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use log::{trace, warn};

use super::keys::TIME_SAMPLES;
use super::value::{Value, format_value, is_array_type};
use super::writer::{Emit, UsdaWriter};
use crate::error::{Result, UsdError};

/// Plain value and time samples of a property or attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueState {
    pub value: Option<Value>,
    pub was_set: bool,
    /// frame -> value, iterated in ascending frame order
    pub keyframes: BTreeMap<i32, Value>,
}

impl ValueState {
    /// Unauthored state carrying a fallback value (schema defaults).
    pub fn with_default(value: Option<Value>) -> Self {
        Self {
            value,
            was_set: false,
            keyframes: BTreeMap::new(),
        }
    }
}

/// Shared value behavior of `Property` and `Attribute`.
pub trait ValueHolder {
    fn name(&self) -> &str;
    fn as_type(&self) -> Option<&str>;
    fn state(&self) -> &ValueState;
    fn state_mut(&mut self) -> &mut ValueState;

    /// Hook run before a value is stored.
    fn check_value(&self, _value: &Value) {}

    fn value(&self) -> Option<&Value> {
        self.state().value.as_ref()
    }

    fn set_value(&mut self, value: impl Into<Value>) {
        let value = value.into();
        self.check_value(&value);
        let state = self.state_mut();
        state.keyframes.clear();
        state.value = Some(value);
        state.was_set = true;
    }

    fn unset_value(&mut self) {
        let state = self.state_mut();
        state.value = None;
        state.was_set = false;
    }

    /// Author a time sample. Clears the plain value.
    fn set_keyframe(&mut self, frame: i32, value: impl Into<Value>) {
        let value = value.into();
        self.check_value(&value);
        let state = self.state_mut();
        state.value = None;
        state.was_set = false;
        state.keyframes.insert(frame, value);
    }

    fn remove_keyframe(&mut self, frame: i32) -> Option<Value> {
        self.state_mut().keyframes.remove(&frame)
    }

    fn keyframes(&self) -> &BTreeMap<i32, Value> {
        &self.state().keyframes
    }

    fn is_time_sampled(&self) -> bool {
        !self.state().keyframes.is_empty()
    }

    /// Whether this holder contributes any lines on emission.
    fn is_authored(&self) -> bool {
        self.state().was_set || self.is_time_sampled()
    }

    fn array_context(&self) -> bool {
        is_array_type(self.as_type())
    }

    fn formatted_value(&self) -> Option<String> {
        self.value().map(|v| format_value(v, self.array_context()))
    }

    fn formatted_value_at(&self, frame: i32) -> Result<String> {
        self.keyframes()
            .get(&frame)
            .map(|v| format_value(v, self.array_context()))
            .ok_or(UsdError::MissingKeyframe(frame))
    }
}

/// Ordered, name-unique set of nested properties.
pub type PropertyMap = IndexMap<String, Property>;

/// Metadata value rendered inside parentheses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Property {
    pub name: String,
    pub as_type: Option<String>,
    pub state: ValueState,
    pub properties: PropertyMap,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn typed(name: impl Into<String>, as_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            as_type: Some(as_type.into()),
            ..Default::default()
        }
    }

    /// Nested property by name, created if absent.
    pub fn add_property(&mut self, name: &str) -> &mut Property {
        add_nested(&mut self.properties, name)
    }

    pub fn set_property(&mut self, name: &str, value: impl Into<Value>) -> &mut Property {
        let prop = self.add_property(name);
        prop.set_value(value);
        prop
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }
}

impl ValueHolder for Property {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_type(&self) -> Option<&str> {
        self.as_type.as_deref()
    }

    fn state(&self) -> &ValueState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ValueState {
        &mut self.state
    }
}

impl Emit for Property {
    fn emit(&self, w: &mut UsdaWriter) {
        if !self.is_authored() {
            return;
        }
        let mut head = Vec::new();
        if let Some(t) = self.as_type() {
            head.push(t);
        }
        emit_holder(self, &head, &self.properties, w);
    }
}

/// Typed data value rendered in a prim body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub as_type: Option<String>,
    pub uniform: bool,
    /// Allowed token values (documentation hint, warned on but not enforced)
    pub allowed_tokens: Vec<String>,
    pub docstring: Option<String>,
    pub state: ValueState,
    pub properties: PropertyMap,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn typed(name: impl Into<String>, as_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            as_type: Some(as_type.into()),
            ..Default::default()
        }
    }

    pub fn uniform(mut self) -> Self {
        self.uniform = true;
        self
    }

    pub fn add_property(&mut self, name: &str) -> &mut Property {
        add_nested(&mut self.properties, name)
    }

    /// Set a nested metadata property, e.g. `interpolation = "faceVarying"`.
    pub fn set_property(&mut self, name: &str, value: impl Into<Value>) -> &mut Property {
        let prop = self.add_property(name);
        prop.set_value(value);
        prop
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    fn token_allowed(&self, token: &str) -> bool {
        self.allowed_tokens.is_empty() || self.allowed_tokens.iter().any(|t| t == token)
    }
}

impl ValueHolder for Attribute {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_type(&self) -> Option<&str> {
        self.as_type.as_deref()
    }

    fn state(&self) -> &ValueState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ValueState {
        &mut self.state
    }

    fn check_value(&self, value: &Value) {
        if let Value::Text(token) = value {
            if self.token_allowed(token) {
                return;
            }
            warn!(
                "{}: `{}` is not an allowed token (expected one of {:?})",
                self.name, token, self.allowed_tokens
            );
        }
    }
}

impl Emit for Attribute {
    fn emit(&self, w: &mut UsdaWriter) {
        if !self.is_authored() {
            return;
        }
        let mut head = Vec::new();
        if self.uniform {
            head.push("uniform");
        }
        if let Some(t) = self.as_type() {
            head.push(t);
        }
        emit_holder(self, &head, &self.properties, w);
    }
}

fn add_nested<'a>(map: &'a mut PropertyMap, name: &str) -> &'a mut Property {
    map.entry(name.to_string())
        .or_insert_with(|| Property::new(name))
}

/// `[head...] name = value` or the `.timeSamples` block, plus nested metadata.
fn emit_holder<H: ValueHolder>(holder: &H, head: &[&str], nested: &PropertyMap, w: &mut UsdaWriter) {
    let mut decl = head.join(" ");
    if !decl.is_empty() {
        decl.push(' ');
    }
    decl.push_str(holder.name());

    let array = holder.array_context();
    if holder.is_time_sampled() {
        trace!("emit {} ({} samples)", holder.name(), holder.keyframes().len());
        w.writeln(&format!("{}.{} = {{", decl, TIME_SAMPLES));
        w.nested(|w| {
            for (frame, value) in holder.keyframes() {
                w.writeln(&format!("{}: {},", frame, format_value(value, array)));
            }
        });
        w.writeln("}");
    } else {
        let value = holder.formatted_value().unwrap_or_else(|| "None".to_string());
        w.writeln(&format!("{} = {}", decl, value));
    }

    if nested.values().any(|p| p.is_authored()) {
        w.append(" (");
        w.nested(|w| {
            for prop in nested.values() {
                prop.emit(w);
            }
        });
        w.writeln(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_renders_nothing() {
        let prop = Property::new("kind");
        assert!(prop.lines(0).is_empty());
        let attr = Attribute::typed("height", "double");
        assert!(attr.lines(1).is_empty());
    }

    #[test]
    fn test_property_line() {
        let mut prop = Property::new("upAxis");
        prop.set_value("Y");
        assert_eq!(prop.lines(1), vec!["    upAxis = \"Y\""]);
    }

    #[test]
    fn test_uniform_attribute_line() {
        let mut attr = Attribute::typed("axis", "token").uniform();
        attr.set_value("Y");
        assert_eq!(attr.lines(0), vec!["uniform token axis = \"Y\""]);
    }

    #[test]
    fn test_array_attribute_uses_brackets() {
        let mut attr = Attribute::typed("points", "point3f[]");
        attr.set_value(vec![(0, 0, 1), (1, 0, 0)]);
        assert_eq!(attr.lines(0), vec!["point3f[] points = [(0, 0, 1), (1, 0, 0)]"]);

        let mut t = Attribute::typed("xformOp:translate", "double3");
        t.set_value((1, 2, 3));
        assert_eq!(t.lines(0), vec!["double3 xformOp:translate = (1, 2, 3)"]);
    }

    #[test]
    fn test_empty_sequence_still_renders() {
        let mut attr = Attribute::typed("faceVertexCounts", "int[]");
        attr.set_value(Vec::<i32>::new());
        assert_eq!(attr.lines(0), vec!["int[] faceVertexCounts = []"]);
    }

    #[test]
    fn test_keyframes_sorted_and_clear_value() {
        let mut attr = Attribute::typed("xformOp:translate", "double3");
        attr.set_value((-1.99, 0, 2));
        attr.set_keyframe(100, (10, 10, 10));
        attr.set_keyframe(1, (1, 2, 3));
        assert!(attr.value().is_none());
        assert!(attr.is_authored());
        assert_eq!(
            attr.lines(1),
            vec![
                "    double3 xformOp:translate.timeSamples = {",
                "        1: (1, 2, 3),",
                "        100: (10, 10, 10),",
                "    }",
            ]
        );
    }

    #[test]
    fn test_set_value_drops_keyframes() {
        let mut prop = Property::new("startTimeCode");
        prop.set_keyframe(1, 5);
        prop.set_value(1);
        assert!(!prop.is_time_sampled());
        assert_eq!(prop.lines(0), vec!["startTimeCode = 1"]);
    }

    #[test]
    fn test_unset_value_keeps_samples() {
        let mut attr = Attribute::typed("radius", "double");
        attr.set_keyframe(1, 0.5);
        attr.unset_value();
        assert!(attr.is_authored());
        assert_eq!(
            attr.lines(0),
            vec!["double radius.timeSamples = {", "    1: 0.5,", "}"]
        );

        assert_eq!(attr.remove_keyframe(1), Some(Value::Float(0.5)));
        assert_eq!(attr.remove_keyframe(1), None);
        assert!(!attr.is_authored());
        assert!(attr.lines(0).is_empty());
    }

    #[test]
    fn test_unset_value_suppresses_plain_value() {
        let mut prop = Property::new("upAxis");
        prop.set_value("Y");
        prop.unset_value();
        assert!(prop.value().is_none());
        assert!(prop.lines(0).is_empty());
    }

    #[test]
    fn test_formatted_value_at_missing_frame() {
        let mut attr = Attribute::typed("radius", "double");
        attr.set_keyframe(1, 0.5);
        assert_eq!(attr.formatted_value_at(1).unwrap(), "0.5");
        assert!(matches!(
            attr.formatted_value_at(7),
            Err(UsdError::MissingKeyframe(7))
        ));
    }

    #[test]
    fn test_nested_properties_block() {
        let mut attr = Attribute::typed("normals", "normal3f[]");
        attr.set_value(vec![(0, 0, 1)]);
        attr.set_property("interpolation", "faceVarying");
        assert_eq!(
            attr.lines(1),
            vec![
                "    normal3f[] normals = [(0, 0, 1)] (",
                "        interpolation = \"faceVarying\"",
                "    )",
            ]
        );
    }

    #[test]
    fn test_unset_nested_property_adds_no_block() {
        let mut attr = Attribute::typed("size", "double");
        attr.set_value(2.0);
        attr.add_property("interpolation");
        assert_eq!(attr.lines(0), vec!["double size = 2.0"]);
    }

    #[test]
    fn test_nested_property_names_unique() {
        let mut prop = Property::new("customData");
        prop.add_property("a").set_value(1);
        prop.add_property("a");
        assert_eq!(prop.properties.len(), 1);
        assert!(prop.property("a").is_some_and(|p| p.is_authored()));
    }

    #[test]
    fn test_disallowed_token_is_kept() {
        let mut attr = Attribute::typed("axis", "token").uniform();
        attr.allowed_tokens = vec!["X".into(), "Y".into(), "Z".into()];
        attr.set_value("W");
        assert_eq!(attr.value(), Some(&Value::from("W")));
    }
}
