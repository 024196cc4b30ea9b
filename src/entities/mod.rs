//! Entities module - scene model and its usda text form.
//!
//! - `value`: closed value type + literal formatting
//! - `attrs`: properties and attributes (plain values, time samples)
//! - `composition`: references / inherits / variant-set arcs
//! - `node`, `stage`: the prim tree (arena + ids) and file output
//! - `attr_schemas`: per-type default tables

pub mod attr_schemas;
pub mod attrs;
pub mod composition;
pub mod keys;
pub mod node;
pub mod stage;
pub mod value;
pub mod writer;

pub use attr_schemas::{AttrDef, CATALOG, PrimSchema, PropDef, SchemaValue, defaults_for, schema_for};
pub use attrs::{Attribute, Property, ValueHolder, ValueState};
pub use composition::{ArcKind, ArcMode, ArcTarget, CompositionArc, CompositionArcs, CompositionTarget};
pub use node::{Node, NodeKind, Specifier};
pub use stage::{NodeId, Stage};
pub use value::{Value, format_value};
pub use writer::{Emit, UsdaWriter};
