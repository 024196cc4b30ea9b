//! AUD - ASCII USD scene writer library
//!
//! Build a prim tree on a [`Stage`], author attributes, time samples and
//! composition arcs, then `save` it as `.usda`.
//!
//! ```no_run
//! use aud::{ArcMode, Node, NodeId, Stage};
//!
//! let mut stage = Stage::new();
//! stage.set_up_axis("Y");
//! let root = stage.add_prim(NodeId::ROOT, Node::prim("root"))?;
//! let cyl = stage.add_prim(root, Node::typed("Cylinder", "cyl"))?;
//! stage[cyl].set_attribute("height", 10);
//! let foo = stage.add_prim(root, Node::typed("Xform", "foo"))?;
//! stage.add_inherit_node(foo, cyl, ArcMode::Add)?;
//! stage.save("scene.usda")?;
//! # Ok::<(), aud::UsdError>(())
//! ```

// Scene model
pub mod entities;
pub mod error;

// App modules
pub mod cli;
pub mod config;
pub mod sample;
pub mod scene;

// Re-export commonly used types
pub use config::WriterConfig;
pub use entities::{
    ArcMode, Attribute, CompositionTarget, Node, NodeId, Property, Stage, Value, ValueHolder,
};
pub use error::{Result, UsdError};
