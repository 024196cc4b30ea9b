//! Scene nodes: prims, variant sets and variants.
//!
//! A `Node` owns its properties, attributes and composition arcs. Tree
//! links (`parent`, `children`) are ids into the owning [`Stage`] arena and
//! are only changed through `Stage::add_child` / `Stage::remove_child`.
//!
//! ## Default resolution
//!
//! A node bound to a [`PrimSchema`] can answer `get_attribute("axis", true)`
//! before anything was authored: the schema chain is searched and a fresh
//! copy returned. Authoring (`set_attribute`) inserts that copy into the
//! node, so instances never share state.
//!
//! [`Stage`]: super::stage::Stage

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use log::debug;

use super::attr_schemas::{PrimSchema, schema_for};
use super::attrs::{Attribute, Property, ValueHolder};
use super::composition::{ArcKind, ArcMode, ArcTarget, CompositionArcs};
use super::keys::{A_ROTATE_XYZ, A_SCALE, A_TRANSLATE, A_XFORM_OP_ORDER, T_TOKEN_ARRAY};
use super::stage::NodeId;
use super::value::{Value, format_string};
use super::writer::{Emit, UsdaWriter};
use crate::error::{Result, UsdError};

/// Emission grammar of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Stage root (arena slot 0)
    Stage,
    Prim,
    VariantSet,
    Variant,
}

impl NodeKind {
    pub fn is_prim_like(&self) -> bool {
        !matches!(self, NodeKind::Stage)
    }
}

/// Prim specifier keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Specifier {
    #[default]
    Def,
    Over,
    Class,
}

impl Specifier {
    pub fn keyword(&self) -> &'static str {
        match self {
            Specifier::Def => "def",
            Specifier::Over => "over",
            Specifier::Class => "class",
        }
    }

    /// `is_class` wins over `is_over`.
    pub fn from_flags(is_class: bool, is_over: bool) -> Self {
        if is_class {
            Specifier::Class
        } else if is_over {
            Specifier::Over
        } else {
            Specifier::Def
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub specifier: Specifier,
    pub type_tag: Option<String>,
    /// Default table consulted by `get_property` / `get_attribute`
    pub schema: Option<&'static PrimSchema>,
    pub properties: IndexMap<String, Property>,
    pub attributes: IndexMap<String, Attribute>,
    pub arcs: CompositionArcs,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            specifier: Specifier::Def,
            type_tag: None,
            schema: None,
            properties: IndexMap::new(),
            attributes: IndexMap::new(),
            arcs: CompositionArcs::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn stage_root() -> Self {
        Self::with_kind("", NodeKind::Stage)
    }

    /// Untyped `def "name"`.
    pub fn prim(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Prim)
    }

    pub fn class(name: impl Into<String>) -> Self {
        let mut node = Self::prim(name);
        node.specifier = Specifier::Class;
        node
    }

    pub fn over(name: impl Into<String>) -> Self {
        let mut node = Self::prim(name);
        node.specifier = Specifier::Over;
        node
    }

    /// Typed prim; binds the built-in schema for `type_tag` when one exists.
    pub fn typed(type_tag: &str, name: impl Into<String>) -> Self {
        let mut node = Self::prim(name);
        node.type_tag = Some(type_tag.to_string());
        node.schema = schema_for(type_tag);
        node
    }

    /// Typed prim driven by an explicit schema table.
    pub fn from_schema(schema: &'static PrimSchema, name: impl Into<String>) -> Self {
        let mut node = Self::prim(name);
        node.type_tag = schema.type_tag.map(str::to_string);
        node.schema = Some(schema);
        node
    }

    pub fn new(name: impl Into<String>, is_class: bool, is_over: bool, type_tag: Option<&str>) -> Self {
        let mut node = match type_tag {
            Some(t) => Self::typed(t, name),
            None => Self::prim(name),
        };
        node.specifier = Specifier::from_flags(is_class, is_over);
        node
    }

    pub fn variant_set(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::VariantSet)
    }

    pub fn variant(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Variant)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    // --- Properties ---

    /// Property by name, created if absent (seeded from the schema default).
    pub fn add_property(&mut self, name: &str) -> &mut Property {
        let schema = self.schema;
        self.properties
            .entry(name.to_string())
            .or_insert_with(|| {
                schema
                    .and_then(|s| s.default_property(name))
                    .unwrap_or_else(|| Property::new(name))
            })
    }

    /// Insert a prepared property; an existing entry with the same name wins.
    pub fn insert_property(&mut self, prop: Property) -> &mut Property {
        self.properties.entry(prop.name.clone()).or_insert(prop)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.get_mut(name)
    }

    /// Instance entry first, then (if `defaults`) a fresh schema copy.
    pub fn get_property(&self, name: &str, defaults: bool) -> Option<Cow<'_, Property>> {
        if let Some(prop) = self.properties.get(name) {
            return Some(Cow::Borrowed(prop));
        }
        if !defaults {
            return None;
        }
        self.schema
            .and_then(|s| s.default_property(name))
            .map(Cow::Owned)
    }

    pub fn set_property(&mut self, name: &str, value: impl Into<Value>) -> &mut Property {
        let value = value.into();
        debug!("{}: set property {} = {}", self.name, name, value);
        let prop = self.add_property(name);
        prop.set_value(value);
        prop
    }

    pub fn remove_property(&mut self, name: &str) -> Option<Property> {
        self.properties.shift_remove(name)
    }

    // --- Attributes ---

    /// Attribute by name, created if absent (seeded from the schema default).
    pub fn add_attribute(&mut self, name: &str) -> &mut Attribute {
        let schema = self.schema;
        self.attributes
            .entry(name.to_string())
            .or_insert_with(|| {
                schema
                    .and_then(|s| s.default_attribute(name))
                    .unwrap_or_else(|| Attribute::new(name))
            })
    }

    /// Insert a prepared attribute; an existing entry with the same name wins.
    pub fn insert_attribute(&mut self, attr: Attribute) -> &mut Attribute {
        self.attributes.entry(attr.name.clone()).or_insert(attr)
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        self.attributes.get_mut(name)
    }

    pub fn get_attribute(&self, name: &str, defaults: bool) -> Option<Cow<'_, Attribute>> {
        if let Some(attr) = self.attributes.get(name) {
            return Some(Cow::Borrowed(attr));
        }
        if !defaults {
            return None;
        }
        self.schema
            .and_then(|s| s.default_attribute(name))
            .map(Cow::Owned)
    }

    /// Author a value, keeping the declared (or schema) type.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) -> &mut Attribute {
        self.set_attribute_with(name, value, None, None)
    }

    /// Author a value, overriding type and uniformity only when given.
    pub fn set_attribute_with(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        as_type: Option<&str>,
        uniform: Option<bool>,
    ) -> &mut Attribute {
        let value = value.into();
        debug!("{}: set attribute {} = {}", self.name, name, value);
        let attr = self.add_attribute(name);
        if let Some(t) = as_type {
            attr.as_type = Some(t.to_string());
        }
        if let Some(u) = uniform {
            attr.uniform = u;
        }
        attr.set_value(value);
        attr
    }

    /// Author a time sample on an attribute, creating it if needed.
    pub fn set_keyframe(&mut self, name: &str, frame: i32, value: impl Into<Value>) -> &mut Attribute {
        let attr = self.add_attribute(name);
        attr.set_keyframe(frame, value);
        attr
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<Attribute> {
        self.attributes.shift_remove(name)
    }

    // --- Composition ---

    /// Bare literals become file references (`@asset@`).
    pub fn add_reference(&mut self, target: impl Into<ArcTarget>, mode: ArcMode) {
        debug!("{}: add {} reference", self.name, mode);
        self.arcs.add(ArcKind::References, target, mode);
    }

    pub fn add_inherit(&mut self, target: impl Into<ArcTarget>, mode: ArcMode) {
        debug!("{}: add {} inherit", self.name, mode);
        self.arcs.add(ArcKind::Inherits, target, mode);
    }

    pub fn add_variant(&mut self, target: impl Into<ArcTarget>, mode: ArcMode) {
        debug!("{}: add {} variant set", self.name, mode);
        self.arcs.add(ArcKind::VariantSets, target, mode);
    }

    /// Author `uniform token[] xformOpOrder` from a code like `"trs"`.
    pub fn set_xform_order(&mut self, order: &str) -> Result<&mut Attribute> {
        let ops = xform_ops(order)?;
        Ok(self.set_attribute_with(A_XFORM_OP_ORDER, ops, Some(T_TOKEN_ARRAY), Some(true)))
    }

    // --- Emission ---

    fn has_metadata(&self) -> bool {
        self.arcs.is_renderable() || self.properties.values().any(|p| p.is_authored())
    }

    /// Writes up to and including the opening `{` of a prim body.
    pub(crate) fn emit_prim_head(&self, w: &mut UsdaWriter) {
        w.blank_line();
        let mut decl = vec![self.specifier.keyword().to_string()];
        if let Some(t) = &self.type_tag {
            decl.push(t.clone());
        }
        decl.push(format_string(&self.name));
        w.writeln(&decl.join(" "));

        if self.has_metadata() {
            w.append(" (");
            w.nested(|w| {
                for arc in self.arcs.iter().filter(|a| a.is_renderable()) {
                    arc.emit(w);
                    w.blank_line();
                }
                for prop in self.properties.values().filter(|p| p.is_authored()) {
                    prop.emit(w);
                    w.blank_line();
                }
            });
            w.writeln(")");
        }
        w.writeln("{");
    }

    pub(crate) fn emit_attributes(&self, w: &mut UsdaWriter) {
        for attr in self.attributes.values() {
            attr.emit(w);
        }
    }

    /// Opening line of a variant set / variant group.
    pub(crate) fn group_head(&self) -> String {
        match self.kind {
            NodeKind::VariantSet => format!("variantSet {} = {{", format_string(&self.name)),
            _ => format!("{} {{", format_string(&self.name)),
        }
    }
}

/// Expand a transform order code into op names.
fn xform_ops(order: &str) -> Result<Vec<&'static str>> {
    let mut ops = Vec::with_capacity(3);
    for c in order.chars() {
        let op = match c.to_ascii_lowercase() {
            't' => A_TRANSLATE,
            'r' => A_ROTATE_XYZ,
            's' => A_SCALE,
            _ => return Err(UsdError::InvalidXformOrder(order.to_string())),
        };
        if ops.contains(&op) {
            return Err(UsdError::InvalidXformOrder(order.to_string()));
        }
        ops.push(op);
    }
    if ops.len() != 3 {
        return Err(UsdError::InvalidXformOrder(order.to_string()));
    }
    Ok(ops)
}
