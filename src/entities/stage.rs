//! Stage: node arena, tree links and file output.
//!
//! All nodes live in one `Vec<Node>`; `NodeId` is an index into it and the
//! root (slot 0) is the stage itself. A node has at most one parent at a
//! time: `add_child` detaches it from a former parent before attaching.
//! Detached nodes keep their slot, so every `NodeId` stays valid and a
//! detached node can be attached again. They are never emitted. The arena
//! never shrinks: a stage is built for one export and then dropped.
//!
//! ## Output
//!
//! ```text
//! #usda 1.0
//! (
//!     "Written by AUD v0.1.0"
//!     upAxis = "Y"
//! )
//!
//!
//! def Xform "root"
//! {
//! }
//! ```
//!
//! `save` renders the whole file in memory before opening the target, so a
//! failed emission never leaves a partial file behind.

use std::fmt;
use std::fs;
use std::ops::{Index, IndexMut};
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};

use super::attrs::Property;
use super::composition::{ArcMode, CompositionTarget};
use super::keys::{
    P_END_TIME, P_START_TIME, P_TIME_CODES_PER_SECOND, P_UP_AXIS, USDA_EXT, USDA_HEADER,
};
use super::node::{Node, NodeKind};
use super::value::{Value, format_string};
use super::writer::{Emit, UsdaWriter};
use crate::config::WriterConfig;
use crate::error::{Result, UsdError};

/// Index of a node in its stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// The stage itself.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct Stage {
    nodes: Vec<Node>,
    config: WriterConfig,
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage {
    pub fn new() -> Self {
        Self::with_config(WriterConfig::default())
    }

    pub fn with_config(config: WriterConfig) -> Self {
        Self {
            nodes: vec![Node::stage_root()],
            config,
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn check(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(UsdError::UnknownNode(id))
    }

    // --- Tree ---

    /// Add a detached node to the arena.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        trace!("insert {} {:?} \"{}\"", id, node.kind, node.name);
        self.nodes.push(node);
        id
    }

    /// Insert `node` and attach it under `parent`.
    pub fn add_prim(&mut self, parent: NodeId, node: Node) -> Result<NodeId> {
        self.check(parent)?;
        let id = self.insert(node);
        self.add_child(parent, id)
    }

    /// Attach `child` under `parent`, detaching it from any former parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        let p = self.check(parent)?;
        let c = self.check(child)?;

        let reason = match (p.kind, c.kind) {
            (_, NodeKind::Stage) => Some("the stage root cannot be a child"),
            (NodeKind::VariantSet, NodeKind::Variant) => None,
            (NodeKind::VariantSet, _) => Some("variant sets only hold variants"),
            (_, NodeKind::Variant) => Some("variants must live under a variant set"),
            (NodeKind::Stage, NodeKind::VariantSet) => Some("variant sets must live under a prim"),
            _ => None,
        };
        if let Some(reason) = reason {
            return Err(UsdError::TypeConstraint {
                child: c.name.clone(),
                parent: self.path(parent),
                reason,
            });
        }

        if self.is_ancestor_or_self(child, parent) {
            return Err(UsdError::Cycle { child, parent });
        }

        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|&c| c != child);
        }
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        debug!("attach {} under {}", self.path(child), self.path(parent));
        Ok(child)
    }

    /// Detach `child` from `parent`. Returns whether it was attached there.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(p) = self.nodes.get_mut(parent.0) else {
            return false;
        };
        let before = p.children.len();
        p.children.retain(|&c| c != child);
        if p.children.len() == before {
            warn!("remove_child: {} is not a child of {}", child, parent);
            return false;
        }
        self.nodes[child.0].parent = None;
        debug!("detach {} from {}", child, parent);
        true
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, mut id: NodeId) -> bool {
        loop {
            if id == candidate {
                return true;
            }
            match self.nodes[id.0].parent {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Absolute path, e.g. `/root/foo/Hi`. The stage itself is `/`.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(cur) = cursor {
            let Some(node) = self.get(cur) else { break };
            if !node.name.is_empty() {
                names.push(node.name.as_str());
            }
            cursor = node.parent;
        }
        names.reverse();
        format!("/{}", names.join("/"))
    }

    /// Resolve an absolute path to the first matching attached node.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        let mut id = NodeId::ROOT;
        for name in path.split('/').filter(|s| !s.is_empty()) {
            id = *self.children(id).iter().find(|&&c| self.nodes[c.0].name == name)?;
        }
        Some(id)
    }

    // --- Stage metadata ---

    pub fn set_property(&mut self, name: &str, value: impl Into<Value>) -> &mut Property {
        self.nodes[NodeId::ROOT.0].set_property(name, value)
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.nodes[NodeId::ROOT.0].property(name)
    }

    pub fn set_frame_range(&mut self, start: impl Into<Value>, end: impl Into<Value>) {
        self.set_property(P_START_TIME, start);
        self.set_property(P_END_TIME, end);
    }

    pub fn set_framerate(&mut self, fps: impl Into<Value>) {
        self.set_property(P_TIME_CODES_PER_SECOND, fps);
    }

    pub fn set_up_axis(&mut self, axis: &str) {
        self.set_property(P_UP_AXIS, axis.to_uppercase());
    }

    // --- Node-targeted arcs ---

    /// Reference `target` by its current path.
    pub fn add_reference_node(&mut self, id: NodeId, target: NodeId, mode: ArcMode) -> Result<()> {
        self.check(id)?;
        self.check(target)?;
        let path = self.path(target);
        self.nodes[id.0].add_reference(CompositionTarget::path(path), mode);
        Ok(())
    }

    /// Inherit from `target` by its current path.
    pub fn add_inherit_node(&mut self, id: NodeId, target: NodeId, mode: ArcMode) -> Result<()> {
        self.check(id)?;
        self.check(target)?;
        let path = self.path(target);
        self.nodes[id.0].add_inherit(CompositionTarget::path(path), mode);
        Ok(())
    }

    // --- Output ---

    fn emit_node(&self, id: NodeId, w: &mut UsdaWriter) {
        let node = &self.nodes[id.0];
        match node.kind {
            NodeKind::Stage => self.emit_stage(w),
            NodeKind::Prim => {
                node.emit_prim_head(w);
                w.nested(|w| {
                    node.emit_attributes(w);
                    self.emit_children(id, w);
                });
                w.writeln("}");
            }
            NodeKind::VariantSet | NodeKind::Variant => {
                w.writeln(&node.group_head());
                w.nested(|w| {
                    node.emit_attributes(w);
                    self.emit_children(id, w);
                });
                w.writeln("}");
            }
        }
    }

    fn emit_children(&self, id: NodeId, w: &mut UsdaWriter) {
        for &child in &self.nodes[id.0].children {
            self.emit_node(child, w);
        }
    }

    fn emit_stage(&self, w: &mut UsdaWriter) {
        let root = &self.nodes[NodeId::ROOT.0];
        w.writeln(USDA_HEADER);
        w.writeln("(");
        w.nested(|w| {
            w.writeln(&format_string(&self.config.header_comment()));
            for prop in root.properties.values() {
                prop.emit(w);
            }
        });
        w.writeln(")");
        w.blank_line();
        self.emit_children(NodeId::ROOT, w);
    }

    /// Lines of one subtree, starting at `level`.
    pub fn emit_subtree(&self, id: NodeId, level: usize) -> Result<Vec<String>> {
        self.check(id)?;
        let mut w = UsdaWriter::at_level(level);
        self.emit_node(id, &mut w);
        Ok(w.into_lines())
    }

    /// Whole file as text.
    pub fn to_usda(&self) -> String {
        let mut w = UsdaWriter::new();
        self.emit(&mut w);
        w.finish()
    }

    /// Write the file, forcing the `.usda` extension when configured.
    /// Returns the path actually written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let mut path = path.as_ref().to_path_buf();
        if self.config.force_extension {
            path.set_extension(USDA_EXT);
        }
        let text = self.to_usda();
        fs::write(&path, &text).map_err(|source| UsdError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("saved {} ({} bytes)", path.display(), text.len());
        Ok(path)
    }
}

impl Emit for Stage {
    fn emit(&self, w: &mut UsdaWriter) {
        self.emit_node(NodeId::ROOT, w);
    }
}

impl Index<NodeId> for Stage {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

impl IndexMut<NodeId> for Stage {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> (Stage, NodeId, NodeId, NodeId) {
        let mut stage = Stage::new();
        let root = stage.add_prim(NodeId::ROOT, Node::prim("root")).unwrap();
        let foo = stage.add_prim(root, Node::typed("Xform", "foo")).unwrap();
        let hi = stage.add_prim(foo, Node::typed("Xform", "Hi")).unwrap();
        (stage, root, foo, hi)
    }

    #[test]
    fn test_paths() {
        let (mut stage, _, _, hi) = tree();
        let cyl = stage.add_prim(NodeId::ROOT, Node::typed("Cylinder", "cyl")).unwrap();
        assert_eq!(stage.path(cyl), "/cyl");
        assert_eq!(stage.path(hi), "/root/foo/Hi");
        assert_eq!(stage.path(NodeId::ROOT), "/");
        let loose = stage.insert(Node::prim("loose"));
        assert_eq!(stage.path(loose), "/loose");
    }

    #[test]
    fn test_find() {
        let (stage, root, _, hi) = tree();
        assert_eq!(stage.find("/root/foo/Hi"), Some(hi));
        assert_eq!(stage.find("/root"), Some(root));
        assert_eq!(stage.find("/"), Some(NodeId::ROOT));
        assert_eq!(stage.find("/root/nope"), None);
    }

    #[test]
    fn test_reparent_moves_child() {
        let (mut stage, root, foo, hi) = tree();
        stage.add_child(root, hi).unwrap();
        assert_eq!(stage.parent(hi), Some(root));
        assert!(stage.children(foo).is_empty());
        assert_eq!(stage.children(root), &[foo, hi]);
    }

    #[test]
    fn test_remove_child_is_idempotent() {
        let (mut stage, _, foo, hi) = tree();
        assert!(stage.remove_child(foo, hi));
        assert_eq!(stage.parent(hi), None);
        assert!(!stage.remove_child(foo, hi));
        assert!(!stage.remove_child(NodeId::ROOT, hi));
    }

    #[test]
    fn test_remove_child_from_wrong_parent_keeps_link() {
        let (mut stage, root, foo, hi) = tree();
        assert!(!stage.remove_child(root, hi));
        assert_eq!(stage.parent(hi), Some(foo));
    }

    #[test]
    fn test_type_constraints() {
        let (mut stage, root, _, _) = tree();
        let err = stage.add_child(root, NodeId::ROOT).unwrap_err();
        assert!(matches!(err, UsdError::TypeConstraint { .. }));

        let vset = stage.add_prim(root, Node::variant_set("lod")).unwrap();
        let err = stage.add_prim(vset, Node::prim("p")).unwrap_err();
        assert!(matches!(err, UsdError::TypeConstraint { .. }));
        let err = stage.add_prim(root, Node::variant("hi")).unwrap_err();
        assert!(matches!(err, UsdError::TypeConstraint { .. }));
        let err = stage.add_prim(NodeId::ROOT, Node::variant_set("top")).unwrap_err();
        assert!(matches!(err, UsdError::TypeConstraint { .. }));
        assert!(stage.add_prim(vset, Node::variant("hi")).is_ok());
    }

    #[test]
    fn test_cycles_rejected() {
        let (mut stage, root, _, hi) = tree();
        assert!(matches!(stage.add_child(hi, root), Err(UsdError::Cycle { .. })));
        assert!(matches!(stage.add_child(hi, hi), Err(UsdError::Cycle { .. })));
    }

    #[test]
    fn test_unknown_node() {
        let mut stage = Stage::new();
        let bogus = NodeId(42);
        assert!(matches!(stage.add_child(NodeId::ROOT, bogus), Err(UsdError::UnknownNode(_))));
        assert!(!stage.remove_child(bogus, NodeId::ROOT));
    }

    #[test]
    fn test_stage_header_and_metadata() {
        let mut stage = Stage::new();
        stage.set_frame_range(1, 200);
        stage.set_framerate(24);
        stage.set_up_axis("y");
        let text = stage.to_usda();
        let version = env!("CARGO_PKG_VERSION");
        assert_eq!(
            text,
            format!(
                "#usda 1.0\n(\n    \"Written by AUD v{version}\"\n    startTimeCode = 1\n    endTimeCode = 200\n    timeCodesPerSecond = 24\n    upAxis = \"Y\"\n)\n\n"
            )
        );
    }

    #[test]
    fn test_prim_body_layout() {
        let mut stage = Stage::new();
        let cube = stage.add_prim(NodeId::ROOT, Node::typed("Cube", "Cube")).unwrap();
        stage[cube].set_attribute("size", 4);
        stage.add_prim(cube, Node::prim("child")).unwrap();
        assert_eq!(
            stage.emit_subtree(cube, 0).unwrap(),
            vec![
                "",
                "def Cube \"Cube\"",
                "{",
                "    double size = 4",
                "",
                "    def \"child\"",
                "    {",
                "    }",
                "}",
            ]
        );
    }

    #[test]
    fn test_variant_set_layout() {
        let mut stage = Stage::new();
        let foo = stage.add_prim(NodeId::ROOT, Node::typed("Xform", "foo")).unwrap();
        let vset = stage.add_prim(foo, Node::variant_set("lodVariant")).unwrap();
        let hi = stage.add_prim(vset, Node::variant("hi")).unwrap();
        stage.add_prim(hi, Node::typed("Xform", "HiGeometry")).unwrap();
        assert_eq!(
            stage.emit_subtree(vset, 1).unwrap(),
            vec![
                "    variantSet \"lodVariant\" = {",
                "        \"hi\" {",
                "",
                "            def Xform \"HiGeometry\"",
                "            {",
                "            }",
                "        }",
                "    }",
            ]
        );
    }

    #[test]
    fn test_detached_nodes_not_emitted() {
        let (mut stage, _, foo, hi) = tree();
        let before = stage.len();
        stage.remove_child(foo, hi);
        assert!(!stage.to_usda().contains("\"Hi\""));

        assert_eq!(stage.len(), before);
        assert_eq!(stage[hi].name, "Hi");
        stage.add_child(foo, hi).unwrap();
        assert!(stage.to_usda().contains("\"Hi\""));
    }

    #[test]
    fn test_inherit_node_captures_path() {
        let (mut stage, root, foo, hi) = tree();
        stage.add_inherit_node(root, hi, ArcMode::Add).unwrap();
        stage.add_reference_node(hi, foo, ArcMode::None).unwrap();
        let text = stage.to_usda();
        assert!(text.contains("    add inherits = [\n        </root/foo/Hi>\n    ]"));
        assert!(text.contains("references = [\n                </root/foo>\n"));
    }

    #[test]
    fn test_emission_is_repeatable() {
        let (mut stage, root, _, _) = tree();
        stage[root].set_property("kind", "assembly");
        assert_eq!(stage.to_usda(), stage.to_usda());
    }

    #[test]
    fn test_save_forces_extension() {
        let dir = tempfile::tempdir().unwrap();
        let (stage, ..) = tree();
        let written = stage.save(dir.path().join("scene.usd")).unwrap();
        assert_eq!(written, dir.path().join("scene.usda"));
        let text = fs::read_to_string(&written).unwrap();
        assert_eq!(text, stage.to_usda());
    }

    #[test]
    fn test_save_keeps_extension_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let config = WriterConfig {
            force_extension: false,
            ..Default::default()
        };
        let stage = Stage::with_config(config);
        let written = stage.save(dir.path().join("scene.txt")).unwrap();
        assert_eq!(written, dir.path().join("scene.txt"));
    }

    #[test]
    fn test_save_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let stage = Stage::new();
        let err = stage.save(dir.path().join("missing").join("scene")).unwrap_err();
        assert!(matches!(err, UsdError::Io { .. }));
        assert!(!dir.path().join("missing").exists());
    }
}
