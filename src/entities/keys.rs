//! Name constants for stage metadata, transform ops and file syntax.
//!
//! Avoid string typos, enable IDE autocomplete.
//! Usage: `stage.set_property(P_UP_AXIS, "Y")`

// === File syntax ===
/// First line of every usda file
pub const USDA_HEADER: &str = "#usda 1.0";
/// Forced file extension (no leading dot)
pub const USDA_EXT: &str = "usda";
/// Type-tag suffix that selects `[...]` bracketing
pub const ARRAY_SUFFIX: &str = "[]";
/// Spaces per indentation level
pub const INDENT: &str = "    ";
/// Suffix on an attribute/property name when authoring time samples
pub const TIME_SAMPLES: &str = "timeSamples";

// === Stage metadata ===
/// First frame of the animation range
pub const P_START_TIME: &str = "startTimeCode";
/// Last frame of the animation range
pub const P_END_TIME: &str = "endTimeCode";
/// Playback rate
pub const P_TIME_CODES_PER_SECOND: &str = "timeCodesPerSecond";
/// Scene up axis ("Y" or "Z")
pub const P_UP_AXIS: &str = "upAxis";

// === Transform ===
/// Ordered list of transform ops
pub const A_XFORM_OP_ORDER: &str = "xformOpOrder";
/// Translation op (double3)
pub const A_TRANSLATE: &str = "xformOp:translate";
/// Euler rotation op, XYZ order (float3)
pub const A_ROTATE_XYZ: &str = "xformOp:rotateXYZ";
/// Scale op (float3)
pub const A_SCALE: &str = "xformOp:scale";

// === Common attribute types ===
pub const T_TOKEN: &str = "token";
pub const T_TOKEN_ARRAY: &str = "token[]";
pub const T_DOUBLE3: &str = "double3";
pub const T_FLOAT3: &str = "float3";
