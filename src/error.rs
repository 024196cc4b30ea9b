//! Error type for the scene model and the usda writer.
//!
//! Everything here is raised synchronously at the call that caused it.
//! Nothing is retried or coerced: an invalid composition mode stays invalid.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::entities::stage::NodeId;

#[derive(Debug, Error)]
pub enum UsdError {
    #[error("`{0}` is not a valid composition mode (expected none, add, prepend or delete)")]
    InvalidMode(String),

    #[error("cannot attach {child} under {parent}: {reason}")]
    TypeConstraint {
        child: String,
        parent: String,
        reason: &'static str,
    },

    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },

    #[error("node {0} does not exist on this stage")]
    UnknownNode(NodeId),

    #[error("no keyframe at frame {0}")]
    MissingKeyframe(i32),

    #[error("`{0}` is not a transform order (expected a permutation of t, r and s)")]
    InvalidXformOrder(String),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, UsdError>;
