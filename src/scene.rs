//! JSON scene descriptions.
//!
//! A producer that cannot link the library (a DCC exporter script, a
//! pipeline tool) describes its hierarchy as JSON and `aud convert` turns it
//! into a stage:
//!
//! ```json
//! {
//!   "frame_range": [1, 200], "fps": 24, "up_axis": "Y",
//!   "prims": [{
//!     "name": "root",
//!     "children": [{
//!       "name": "cylinder", "type": "Cylinder",
//!       "attributes": [
//!         {"name": "height", "value": 10},
//!         {"name": "xformOp:translate", "keyframes": {"1": [1, 2, 3]}}
//!       ]
//!     }, {
//!       "name": "foo", "type": "Xform",
//!       "inherits": [{"node": "/root/cylinder", "mode": "add"}]
//!     }]
//!   }]
//! }
//! ```
//!
//! JSON values map onto [`Value`]: numbers keep their int/float kind, arrays
//! become sequences, `{"path": "/a"}` is a scene path and `{"asset": "a.usda"}`
//! an asset path.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use crate::config::WriterConfig;
use crate::entities::{
    ArcKind, ArcMode, ArcTarget, CompositionTarget, Node, NodeId, Specifier, Stage, Value,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneDesc {
    pub frame_range: Option<[JsonValue; 2]>,
    pub fps: Option<JsonValue>,
    pub up_axis: Option<String>,
    /// Extra stage metadata, in file order
    pub metadata: Map<String, JsonValue>,
    pub prims: Vec<PrimDesc>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SpecifierDesc {
    #[default]
    Def,
    Over,
    Class,
}

impl From<SpecifierDesc> for Specifier {
    fn from(s: SpecifierDesc) -> Self {
        match s {
            SpecifierDesc::Def => Specifier::Def,
            SpecifierDesc::Over => Specifier::Over,
            SpecifierDesc::Class => Specifier::Class,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum KindDesc {
    #[default]
    Prim,
    VariantSet,
    Variant,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PrimDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: Option<String>,
    pub specifier: SpecifierDesc,
    pub kind: KindDesc,
    pub properties: Map<String, JsonValue>,
    pub attributes: Vec<AttrDesc>,
    pub references: Vec<ArcDesc>,
    pub inherits: Vec<ArcDesc>,
    pub variants: Vec<ArcDesc>,
    pub xform_order: Option<String>,
    pub children: Vec<PrimDesc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttrDesc {
    pub name: String,
    pub value: Option<JsonValue>,
    #[serde(rename = "type")]
    pub as_type: Option<String>,
    pub uniform: Option<bool>,
    pub keyframes: BTreeMap<i32, JsonValue>,
    pub properties: Map<String, JsonValue>,
}

/// One arc target: a literal, a prim path, an asset, or asset + prim path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArcDesc {
    pub target: Option<JsonValue>,
    pub node: Option<String>,
    pub asset: Option<String>,
    pub mode: String,
}

/// Parse a scene description from JSON text.
pub fn parse_scene(text: &str) -> Result<SceneDesc> {
    serde_json::from_str(text).context("Invalid scene description")
}

pub fn load_scene(path: &Path) -> Result<SceneDesc> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene: {}", path.display()))?;
    parse_scene(&text).with_context(|| format!("Failed to parse scene: {}", path.display()))
}

/// Map a JSON value onto a scene value.
pub fn json_to_value(json: &JsonValue) -> Result<Value> {
    Ok(match json {
        JsonValue::Null => bail!("null is not a scene value"),
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().ok_or_else(|| anyhow!("unrepresentable number {n}"))?),
        },
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(items) => {
            Value::Sequence(items.iter().map(json_to_value).collect::<Result<_>>()?)
        }
        JsonValue::Object(map) => match (map.len(), map.get("path"), map.get("asset")) {
            (1, Some(JsonValue::String(p)), _) => Value::Path(p.clone()),
            (1, _, Some(JsonValue::String(a))) => Value::Asset(a.clone()),
            _ => bail!("objects must be {{\"path\": ...}} or {{\"asset\": ...}}, got {json}"),
        },
    })
}

/// Build a stage from a description.
pub fn build_stage(desc: &SceneDesc, config: WriterConfig) -> Result<Stage> {
    let mut stage = Stage::with_config(config);

    if let Some([start, end]) = &desc.frame_range {
        stage.set_frame_range(json_to_value(start)?, json_to_value(end)?);
    }
    if let Some(fps) = &desc.fps {
        stage.set_framerate(json_to_value(fps).context("fps")?);
    }
    if let Some(axis) = &desc.up_axis {
        stage.set_up_axis(axis);
    }
    for (name, value) in &desc.metadata {
        let value = json_to_value(value).with_context(|| format!("stage metadata {name}"))?;
        stage.set_property(name, value);
    }

    let mut node_targets = Vec::new();
    for prim in &desc.prims {
        build_prim(&mut stage, NodeId::ROOT, prim, &mut node_targets)?;
    }

    // Arc targets may point forward in the tree, so check them last
    for (owner, path) in node_targets {
        if stage.find(&path).is_none() {
            bail!("{}: arc target {} does not exist", stage.path(owner), path);
        }
    }

    debug!("built stage with {} nodes", stage.len());
    Ok(stage)
}

fn build_prim(
    stage: &mut Stage,
    parent: NodeId,
    desc: &PrimDesc,
    node_targets: &mut Vec<(NodeId, String)>,
) -> Result<NodeId> {
    let mut node = match desc.kind {
        KindDesc::Prim => match &desc.type_tag {
            Some(t) => Node::typed(t, &desc.name),
            None => Node::prim(&desc.name),
        },
        KindDesc::VariantSet => Node::variant_set(&desc.name),
        KindDesc::Variant => Node::variant(&desc.name),
    };
    node.specifier = desc.specifier.into();

    let label = format!("{}/{}", stage.path(parent).trim_end_matches('/'), desc.name);
    fill_node(&mut node, desc, &label)?;

    let id = stage
        .add_prim(parent, node)
        .with_context(|| format!("cannot place {label}"))?;

    for (kind, arcs) in [
        (ArcKind::References, &desc.references),
        (ArcKind::Inherits, &desc.inherits),
        (ArcKind::VariantSets, &desc.variants),
    ] {
        for arc in arcs {
            let ctx = || format!("{label}: {} arc", kind.name());
            let mode: ArcMode = arc.mode.parse().with_context(ctx)?;
            let target = arc_target(arc).with_context(ctx)?;
            if let Some(path) = &arc.node {
                node_targets.push((id, path.clone()));
            }
            stage[id].arcs.add(kind, target, mode);
        }
    }

    for child in &desc.children {
        build_prim(stage, id, child, node_targets)?;
    }
    Ok(id)
}

fn fill_node(node: &mut Node, desc: &PrimDesc, label: &str) -> Result<()> {
    for (name, value) in &desc.properties {
        let value = json_to_value(value).with_context(|| format!("{label}: property {name}"))?;
        node.set_property(name, value);
    }

    for attr in &desc.attributes {
        let ctx = || format!("{label}: attribute {}", attr.name);
        if attr.value.is_none() && attr.keyframes.is_empty() {
            bail!("{}: needs a value or keyframes", ctx());
        }
        let a = node.add_attribute(&attr.name);
        if let Some(t) = &attr.as_type {
            a.as_type = Some(t.clone());
        }
        if let Some(u) = attr.uniform {
            a.uniform = u;
        }
        if let Some(value) = &attr.value {
            let value = json_to_value(value).with_context(ctx)?;
            node.set_attribute(&attr.name, value);
        }
        for (frame, value) in &attr.keyframes {
            let value = json_to_value(value).with_context(ctx)?;
            node.set_keyframe(&attr.name, *frame, value);
        }
        for (name, value) in &attr.properties {
            let value = json_to_value(value).with_context(ctx)?;
            if let Some(a) = node.attribute_mut(&attr.name) {
                a.set_property(name, value);
            }
        }
    }

    if let Some(order) = &desc.xform_order {
        node.set_xform_order(order)
            .with_context(|| format!("{label}: xform_order"))?;
    }
    Ok(())
}

fn arc_target(arc: &ArcDesc) -> Result<ArcTarget> {
    let target = match (&arc.asset, &arc.node, &arc.target) {
        (Some(asset), Some(node), _) => CompositionTarget::file_with_path(asset.clone(), node.clone()),
        (Some(asset), None, _) => CompositionTarget::file(asset.clone()),
        (None, Some(node), _) => CompositionTarget::path(node.clone()),
        (None, None, Some(literal)) => return Ok(json_to_value(literal)?.into()),
        (None, None, None) => bail!("needs one of target, node or asset"),
    };
    Ok(target.into())
}
