//! Composition arcs: references, inherits and variant-set lists.
//!
//! An arc is a named list operation on a prim:
//!
//! ```text
//! prepend references = [
//!     @./visual.usda@</visual>
//! ]
//! ```
//!
//! Each prim keeps one list per [`ArcKind`], and within a list one arc per
//! [`ArcMode`]. Targets are appended in call order.

use std::fmt;
use std::str::FromStr;

use super::value::{Value, format_value};
use super::writer::{Emit, UsdaWriter};
use crate::error::UsdError;

/// List-edit operation of an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArcMode {
    /// Explicit list, no keyword
    #[default]
    None,
    Add,
    Prepend,
    Delete,
}

impl ArcMode {
    /// Keyword written before the arc name, if any.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            ArcMode::None => None,
            ArcMode::Add => Some("add"),
            ArcMode::Prepend => Some("prepend"),
            ArcMode::Delete => Some("delete"),
        }
    }
}

impl FromStr for ArcMode {
    type Err = UsdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(ArcMode::None),
            "add" => Ok(ArcMode::Add),
            "prepend" => Ok(ArcMode::Prepend),
            "delete" => Ok(ArcMode::Delete),
            other => Err(UsdError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for ArcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword().unwrap_or("none"))
    }
}

/// Which arc list an arc belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcKind {
    VariantSets,
    References,
    Inherits,
}

impl ArcKind {
    /// Emission order inside a prim's metadata block.
    pub const ORDER: [ArcKind; 3] = [ArcKind::VariantSets, ArcKind::References, ArcKind::Inherits];

    pub fn name(&self) -> &'static str {
        match self {
            ArcKind::VariantSets => "variantSets",
            ArcKind::References => "references",
            ArcKind::Inherits => "inherits",
        }
    }
}

/// One entry of an arc list.
///
/// Formatting precedence:
/// - file reference: `@asset@`, followed by `<path>` when a path is set
/// - path only: `<path>`
/// - bare literal: formatted as a plain value
/// - nothing meaningful: skipped
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionTarget {
    pub value: Option<Value>,
    pub path: Option<String>,
    pub is_file: bool,
}

impl CompositionTarget {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn file(asset: impl Into<String>) -> Self {
        Self {
            value: Some(Value::Text(asset.into())),
            path: None,
            is_file: true,
        }
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self {
            value: None,
            path: Some(path.into()),
            is_file: false,
        }
    }

    /// `@asset@</path>`
    pub fn file_with_path(asset: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            value: Some(Value::Text(asset.into())),
            path: Some(path.into()),
            is_file: true,
        }
    }

    fn raw_value(&self) -> Option<String> {
        self.value
            .as_ref()
            .map(Value::raw_string)
            .filter(|s| !s.is_empty())
    }

    pub fn formatted(&self) -> Option<String> {
        let raw = self.raw_value();
        let path = self.path.as_deref().filter(|p| !p.is_empty());
        if raw.is_none() && path.is_none() {
            return None;
        }

        if path.is_none() && !self.is_file {
            return self.value.as_ref().map(|v| format_value(v, false));
        }

        let mut out = String::new();
        if self.is_file {
            if let Some(asset) = raw {
                out.push_str(&format!("@{}@", asset));
            }
        }
        if let Some(p) = path {
            out.push_str(&format!("<{}>", p));
        }
        Some(out).filter(|s| !s.is_empty())
    }
}

/// Caller-side arc target before it is wrapped.
///
/// Literals become file references for `references` and plain values for
/// the other lists; prepared targets are used as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum ArcTarget {
    Literal(Value),
    Target(CompositionTarget),
}

impl ArcTarget {
    pub(crate) fn into_target(self, kind: ArcKind) -> CompositionTarget {
        match self {
            ArcTarget::Target(t) => t,
            ArcTarget::Literal(v) if kind == ArcKind::References => match v {
                Value::Path(p) => CompositionTarget::path(p),
                other => CompositionTarget::file(other.raw_string()),
            },
            ArcTarget::Literal(v) => CompositionTarget::literal(v),
        }
    }
}

impl From<CompositionTarget> for ArcTarget {
    fn from(t: CompositionTarget) -> Self {
        ArcTarget::Target(t)
    }
}

impl From<Value> for ArcTarget {
    fn from(v: Value) -> Self {
        ArcTarget::Literal(v)
    }
}

impl From<&str> for ArcTarget {
    fn from(v: &str) -> Self {
        ArcTarget::Literal(Value::from(v))
    }
}

impl From<String> for ArcTarget {
    fn from(v: String) -> Self {
        ArcTarget::Literal(Value::from(v))
    }
}

/// Named, moded list of targets.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionArc {
    pub kind: ArcKind,
    pub mode: ArcMode,
    pub targets: Vec<CompositionTarget>,
}

impl CompositionArc {
    pub fn new(kind: ArcKind, mode: ArcMode) -> Self {
        Self {
            kind,
            mode,
            targets: Vec::new(),
        }
    }

    pub fn push(&mut self, target: CompositionTarget) {
        self.targets.push(target);
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn rendered_targets(&self) -> Vec<String> {
        self.targets.iter().filter_map(CompositionTarget::formatted).collect()
    }

    /// True when at least one target formats to something.
    pub fn is_renderable(&self) -> bool {
        self.targets.iter().any(|t| t.formatted().is_some())
    }
}

impl Emit for CompositionArc {
    fn emit(&self, w: &mut UsdaWriter) {
        let targets = self.rendered_targets();
        if targets.is_empty() {
            return;
        }
        let head = match self.mode.keyword() {
            Some(kw) => format!("{} {} = [", kw, self.name()),
            None => format!("{} = [", self.name()),
        };
        w.writeln(&head);
        w.nested(|w| w.writeln(&targets.join(", ")));
        w.writeln("]");
    }
}

/// All arcs of one prim, one list per kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionArcs {
    pub variants: Vec<CompositionArc>,
    pub references: Vec<CompositionArc>,
    pub inherits: Vec<CompositionArc>,
}

impl CompositionArcs {
    pub fn list(&self, kind: ArcKind) -> &[CompositionArc] {
        match kind {
            ArcKind::VariantSets => &self.variants,
            ArcKind::References => &self.references,
            ArcKind::Inherits => &self.inherits,
        }
    }

    fn list_mut(&mut self, kind: ArcKind) -> &mut Vec<CompositionArc> {
        match kind {
            ArcKind::VariantSets => &mut self.variants,
            ArcKind::References => &mut self.references,
            ArcKind::Inherits => &mut self.inherits,
        }
    }

    /// Arc of `kind` with `mode`, created if absent.
    pub fn arc_mut(&mut self, kind: ArcKind, mode: ArcMode) -> &mut CompositionArc {
        let list = self.list_mut(kind);
        let idx = match list.iter().position(|a| a.mode == mode) {
            Some(idx) => idx,
            None => {
                list.push(CompositionArc::new(kind, mode));
                list.len() - 1
            }
        };
        &mut list[idx]
    }

    pub fn add(&mut self, kind: ArcKind, target: impl Into<ArcTarget>, mode: ArcMode) {
        let target = target.into().into_target(kind);
        self.arc_mut(kind, mode).push(target);
    }

    /// All arcs in emission order: variants, references, inherits.
    pub fn iter(&self) -> impl Iterator<Item = &CompositionArc> {
        ArcKind::ORDER.into_iter().flat_map(|k| self.list(k).iter())
    }

    pub fn is_renderable(&self) -> bool {
        self.iter().any(CompositionArc::is_renderable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("add".parse::<ArcMode>().unwrap(), ArcMode::Add);
        assert_eq!("".parse::<ArcMode>().unwrap(), ArcMode::None);
        assert_eq!("delete".parse::<ArcMode>().unwrap(), ArcMode::Delete);
        let err = "bogus".parse::<ArcMode>().unwrap_err();
        assert!(matches!(err, UsdError::InvalidMode(ref m) if m == "bogus"));
    }

    #[test]
    fn test_target_formatting() {
        assert_eq!(CompositionTarget::file("a.usda").formatted().unwrap(), "@a.usda@");
        assert_eq!(
            CompositionTarget::file_with_path("./visual.usd", "/visual").formatted().unwrap(),
            "@./visual.usd@</visual>"
        );
        assert_eq!(CompositionTarget::path("/root/cyl").formatted().unwrap(), "</root/cyl>");
        assert_eq!(CompositionTarget::literal("lodVariant").formatted().unwrap(), "\"lodVariant\"");
        assert_eq!(CompositionTarget::file_with_path("", "/x").formatted().unwrap(), "</x>");
        assert!(CompositionTarget::default().formatted().is_none());
        assert!(CompositionTarget::file("").formatted().is_none());
    }

    #[test]
    fn test_arc_lines() {
        let mut arcs = CompositionArcs::default();
        arcs.add(ArcKind::Inherits, CompositionTarget::path("/root/cylinder"), ArcMode::Add);
        let arc = &arcs.inherits[0];
        assert_eq!(
            arc.lines(1),
            vec!["    add inherits = [", "        </root/cylinder>", "    ]"]
        );
    }

    #[test]
    fn test_one_arc_per_mode_and_kind() {
        let mut arcs = CompositionArcs::default();
        arcs.add(ArcKind::References, "a.usda", ArcMode::Prepend);
        arcs.add(ArcKind::References, "b.usda", ArcMode::Prepend);
        arcs.add(ArcKind::References, "c.usda", ArcMode::None);
        assert_eq!(arcs.references.len(), 2);
        assert_eq!(arcs.references[0].targets.len(), 2);
        assert!(arcs.inherits.is_empty() && arcs.variants.is_empty());
        assert_eq!(
            arcs.references[0].lines(0),
            vec!["prepend references = [", "    @a.usda@, @b.usda@", "]"]
        );
    }

    #[test]
    fn test_literal_variant_is_quoted() {
        let mut arcs = CompositionArcs::default();
        arcs.add(ArcKind::VariantSets, "lodVariant", ArcMode::None);
        assert_eq!(
            arcs.variants[0].lines(0),
            vec!["variantSets = [", "    \"lodVariant\"", "]"]
        );
    }

    #[test]
    fn test_empty_targets_filtered() {
        let mut arc = CompositionArc::new(ArcKind::References, ArcMode::None);
        arc.push(CompositionTarget::default());
        assert!(!arc.is_renderable());
        assert!(arc.lines(0).is_empty());
        arc.push(CompositionTarget::file("x.usda"));
        assert_eq!(arc.lines(0)[1], "    @x.usda@");
    }

    #[test]
    fn test_iteration_order() {
        let mut arcs = CompositionArcs::default();
        arcs.add(ArcKind::Inherits, CompositionTarget::path("/a"), ArcMode::None);
        arcs.add(ArcKind::References, "r.usda", ArcMode::None);
        arcs.add(ArcKind::VariantSets, "v", ArcMode::None);
        let kinds: Vec<ArcKind> = arcs.iter().map(|a| a.kind).collect();
        assert_eq!(kinds, ArcKind::ORDER.to_vec());
    }
}
