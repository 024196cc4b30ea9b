//! Static default tables for the built-in prim types.
//!
//! Each schema lists the attributes/properties its type declares, with the
//! declared type tag, fallback value, uniform flag and allowed tokens.
//! Schemas chain to their base (`Cylinder -> Gprim -> Boundable -> Xformable
//! -> Imageable`); lookups walk from the most-derived schema to the root and
//! stop at the first match.
//!
//! The tables are plain data. A generated catalog can define more
//! `PrimSchema` statics the same way and bind them with `Node::from_schema`.

use indexmap::IndexMap;

use super::attrs::{Attribute, Property, ValueState};
use super::keys::{T_FLOAT3, T_TOKEN};
use super::value::Value;

/// Fallback value in a schema table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Token(&'static str),
    Tokens(&'static [&'static str]),
    Float2([f64; 2]),
    Float3([f64; 3]),
}

impl SchemaValue {
    pub fn to_value(&self) -> Value {
        match *self {
            SchemaValue::Bool(b) => Value::Bool(b),
            SchemaValue::Int(i) => Value::Int(i),
            SchemaValue::Float(f) => Value::Float(f),
            SchemaValue::Token(t) => Value::from(t),
            SchemaValue::Tokens(ts) => Value::from(ts.to_vec()),
            SchemaValue::Float2(v) => Value::from(v),
            SchemaValue::Float3(v) => Value::from(v),
        }
    }
}

/// Declared attribute of a schema.
#[derive(Debug, Clone, Copy)]
pub struct AttrDef {
    pub name: &'static str,
    pub as_type: &'static str,
    pub default: Option<SchemaValue>,
    pub uniform: bool,
    pub allowed_tokens: &'static [&'static str],
    pub doc: &'static str,
}

impl AttrDef {
    pub const fn new(name: &'static str, as_type: &'static str) -> Self {
        Self {
            name,
            as_type,
            default: None,
            uniform: false,
            allowed_tokens: &[],
            doc: "",
        }
    }

    pub const fn value(mut self, default: SchemaValue) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn uniform(mut self) -> Self {
        self.uniform = true;
        self
    }

    pub const fn tokens(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed_tokens = allowed;
        self
    }

    pub const fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    /// Fresh, unauthored attribute carrying this declaration.
    pub fn to_attribute(&self) -> Attribute {
        Attribute {
            name: self.name.to_string(),
            as_type: Some(self.as_type.to_string()),
            uniform: self.uniform,
            allowed_tokens: self.allowed_tokens.iter().map(|t| t.to_string()).collect(),
            docstring: (!self.doc.is_empty()).then(|| self.doc.to_string()),
            state: ValueState::with_default(self.default.map(|d| d.to_value())),
            properties: Default::default(),
        }
    }
}

/// Declared metadata property of a schema.
#[derive(Debug, Clone, Copy)]
pub struct PropDef {
    pub name: &'static str,
    pub as_type: Option<&'static str>,
    pub default: Option<SchemaValue>,
}

impl PropDef {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            as_type: None,
            default: None,
        }
    }

    pub const fn typed(mut self, as_type: &'static str) -> Self {
        self.as_type = Some(as_type);
        self
    }

    pub const fn value(mut self, default: SchemaValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn to_property(&self) -> Property {
        Property {
            name: self.name.to_string(),
            as_type: self.as_type.map(str::to_string),
            state: ValueState::with_default(self.default.map(|d| d.to_value())),
            properties: Default::default(),
        }
    }
}

/// Declarations of one prim type plus a link to its base type.
#[derive(Debug)]
pub struct PrimSchema {
    pub name: &'static str,
    /// Type tag written after the specifier; `None` for abstract schemas
    pub type_tag: Option<&'static str>,
    pub base: Option<&'static PrimSchema>,
    pub attributes: &'static [AttrDef],
    pub properties: &'static [PropDef],
}

impl PrimSchema {
    pub const fn new(
        name: &'static str,
        type_tag: Option<&'static str>,
        base: Option<&'static PrimSchema>,
        attributes: &'static [AttrDef],
        properties: &'static [PropDef],
    ) -> Self {
        Self {
            name,
            type_tag,
            base,
            attributes,
            properties,
        }
    }

    /// This schema followed by its bases, most-derived first.
    pub fn chain(&'static self) -> impl Iterator<Item = &'static PrimSchema> {
        std::iter::successors(Some(self), |s| s.base)
    }

    pub fn attribute_def(&'static self, name: &str) -> Option<&'static AttrDef> {
        self.chain()
            .find_map(|s| s.attributes.iter().find(|a| a.name == name))
    }

    pub fn property_def(&'static self, name: &str) -> Option<&'static PropDef> {
        self.chain()
            .find_map(|s| s.properties.iter().find(|p| p.name == name))
    }

    /// Fresh copy of the declared default attribute.
    pub fn default_attribute(&'static self, name: &str) -> Option<Attribute> {
        self.attribute_def(name).map(AttrDef::to_attribute)
    }

    pub fn default_property(&'static self, name: &str) -> Option<Property> {
        self.property_def(name).map(PropDef::to_property)
    }

    /// Whether `other` is this schema or one of its bases.
    pub fn is_a(&'static self, other: &PrimSchema) -> bool {
        self.chain().any(|s| std::ptr::eq(s, other))
    }
}

// ============================================================================
// UsdGeom
// ============================================================================

const AXIS: &[&str] = &["X", "Y", "Z"];

const IMAGEABLE_DEFS: &[AttrDef] = &[
    AttrDef::new("purpose", T_TOKEN)
        .uniform()
        .value(SchemaValue::Token("default"))
        .tokens(&["default", "render", "proxy", "guide"])
        .doc("Purpose is a classification of geometry into categories that can each be independently included or excluded from traversals."),
    AttrDef::new("visibility", T_TOKEN)
        .value(SchemaValue::Token("inherited"))
        .tokens(&["inherited", "invisible"])
        .doc("Visibility is meant to be the simplest form of pruning visibility."),
    AttrDef::new("proxyPrim", "rel"),
];

pub static IMAGEABLE_SCHEMA: PrimSchema = PrimSchema::new("Imageable", None, None, IMAGEABLE_DEFS, &[]);

const XFORMABLE_DEFS: &[AttrDef] = &[
    AttrDef::new("xformOpOrder", "token[]")
        .uniform()
        .doc("Encodes the sequence of transformation operations in the order in which they should be pushed onto a transform stack."),
    AttrDef::new("xformOp:translate", "double3"),
    AttrDef::new("xformOp:rotateXYZ", T_FLOAT3),
    AttrDef::new("xformOp:scale", T_FLOAT3),
];

pub static XFORMABLE_SCHEMA: PrimSchema =
    PrimSchema::new("Xformable", None, Some(&IMAGEABLE_SCHEMA), XFORMABLE_DEFS, &[]);

pub static SCOPE_SCHEMA: PrimSchema =
    PrimSchema::new("Scope", Some("Scope"), Some(&IMAGEABLE_SCHEMA), &[], &[]);

pub static XFORM_SCHEMA: PrimSchema =
    PrimSchema::new("Xform", Some("Xform"), Some(&XFORMABLE_SCHEMA), &[], &[]);

const BOUNDABLE_DEFS: &[AttrDef] = &[
    AttrDef::new("extent", "float3[]")
        .doc("Extent is a three dimensional range measuring the geometric extent of the authored gprim in its own local space."),
];

pub static BOUNDABLE_SCHEMA: PrimSchema =
    PrimSchema::new("Boundable", None, Some(&XFORMABLE_SCHEMA), BOUNDABLE_DEFS, &[]);

const GPRIM_DEFS: &[AttrDef] = &[
    AttrDef::new("displayColor", "color3f[]"),
    AttrDef::new("displayOpacity", "float[]"),
    AttrDef::new("doubleSided", "bool").uniform().value(SchemaValue::Bool(false)),
    AttrDef::new("orientation", T_TOKEN)
        .uniform()
        .value(SchemaValue::Token("rightHanded"))
        .tokens(&["rightHanded", "leftHanded"]),
];

pub static GPRIM_SCHEMA: PrimSchema =
    PrimSchema::new("Gprim", None, Some(&BOUNDABLE_SCHEMA), GPRIM_DEFS, &[]);

const CUBE_DEFS: &[AttrDef] = &[
    AttrDef::new("size", "double")
        .value(SchemaValue::Float(2.0))
        .doc("Indicates the length of each edge of the cube."),
];

pub static CUBE_SCHEMA: PrimSchema = PrimSchema::new("Cube", Some("Cube"), Some(&GPRIM_SCHEMA), CUBE_DEFS, &[]);

const SPHERE_DEFS: &[AttrDef] = &[
    AttrDef::new("radius", "double")
        .value(SchemaValue::Float(1.0))
        .doc("Indicates the sphere's radius."),
];

pub static SPHERE_SCHEMA: PrimSchema =
    PrimSchema::new("Sphere", Some("Sphere"), Some(&GPRIM_SCHEMA), SPHERE_DEFS, &[]);

const CYLINDER_DEFS: &[AttrDef] = &[
    AttrDef::new("height", "double")
        .value(SchemaValue::Float(2.0))
        .doc("The size of the cylinder's spine along the specified axis."),
    AttrDef::new("radius", "double").value(SchemaValue::Float(1.0)),
    AttrDef::new("axis", T_TOKEN)
        .uniform()
        .value(SchemaValue::Token("Z"))
        .tokens(AXIS)
        .doc("The axis along which the spine of the cylinder is aligned."),
];

pub static CYLINDER_SCHEMA: PrimSchema =
    PrimSchema::new("Cylinder", Some("Cylinder"), Some(&GPRIM_SCHEMA), CYLINDER_DEFS, &[]);

// Cone shares the cylinder's declarations
pub static CONE_SCHEMA: PrimSchema =
    PrimSchema::new("Cone", Some("Cone"), Some(&GPRIM_SCHEMA), CYLINDER_DEFS, &[]);

const CAPSULE_DEFS: &[AttrDef] = &[
    AttrDef::new("height", "double").value(SchemaValue::Float(1.0)),
    AttrDef::new("radius", "double").value(SchemaValue::Float(0.5)),
    AttrDef::new("axis", T_TOKEN).uniform().value(SchemaValue::Token("Z")).tokens(AXIS),
];

pub static CAPSULE_SCHEMA: PrimSchema =
    PrimSchema::new("Capsule", Some("Capsule"), Some(&GPRIM_SCHEMA), CAPSULE_DEFS, &[]);

const POINT_BASED_DEFS: &[AttrDef] = &[
    AttrDef::new("points", "point3f[]"),
    AttrDef::new("velocities", "vector3f[]"),
    AttrDef::new("normals", "normal3f[]"),
];

pub static POINT_BASED_SCHEMA: PrimSchema =
    PrimSchema::new("PointBased", None, Some(&GPRIM_SCHEMA), POINT_BASED_DEFS, &[]);

const MESH_DEFS: &[AttrDef] = &[
    AttrDef::new("faceVertexIndices", "int[]"),
    AttrDef::new("faceVertexCounts", "int[]"),
    AttrDef::new("subdivisionScheme", T_TOKEN)
        .uniform()
        .value(SchemaValue::Token("catmullClark"))
        .tokens(&["catmullClark", "loop", "bilinear", "none"]),
    AttrDef::new("interpolateBoundary", T_TOKEN)
        .value(SchemaValue::Token("edgeAndCorner"))
        .tokens(&["none", "edgeOnly", "edgeAndCorner"]),
    AttrDef::new("faceVaryingLinearInterpolation", T_TOKEN)
        .value(SchemaValue::Token("cornersPlus1"))
        .tokens(&["none", "cornersOnly", "cornersPlus1", "cornersPlus2", "boundaries", "all"]),
    AttrDef::new("triangleSubdivisionRule", T_TOKEN)
        .value(SchemaValue::Token("catmullClark"))
        .tokens(&["catmullClark", "smooth"]),
];

pub static MESH_SCHEMA: PrimSchema =
    PrimSchema::new("Mesh", Some("Mesh"), Some(&POINT_BASED_SCHEMA), MESH_DEFS, &[]);

const POINTS_DEFS: &[AttrDef] = &[
    AttrDef::new("widths", "float[]"),
    AttrDef::new("ids", "int64[]"),
];

pub static POINTS_SCHEMA: PrimSchema =
    PrimSchema::new("Points", Some("Points"), Some(&POINT_BASED_SCHEMA), POINTS_DEFS, &[]);

const CAMERA_DEFS: &[AttrDef] = &[
    AttrDef::new("clippingRange", "float2").value(SchemaValue::Float2([1.0, 1000000.0])),
    AttrDef::new("focalLength", "float").value(SchemaValue::Float(50.0)),
    AttrDef::new("focusDistance", "float").value(SchemaValue::Float(0.0)),
    AttrDef::new("fStop", "float").value(SchemaValue::Float(0.0)),
    AttrDef::new("horizontalAperture", "float").value(SchemaValue::Float(20.955)),
    AttrDef::new("horizontalApertureOffset", "float").value(SchemaValue::Float(0.0)),
    AttrDef::new("verticalAperture", "float").value(SchemaValue::Float(15.2908)),
    AttrDef::new("verticalApertureOffset", "float").value(SchemaValue::Float(0.0)),
    AttrDef::new("projection", T_TOKEN)
        .value(SchemaValue::Token("perspective"))
        .tokens(&["perspective", "orthographic"]),
    AttrDef::new("shutter:open", "double").value(SchemaValue::Float(0.0)),
    AttrDef::new("shutter:close", "double").value(SchemaValue::Float(0.0)),
    AttrDef::new("stereoRole", T_TOKEN)
        .uniform()
        .value(SchemaValue::Token("mono"))
        .tokens(&["mono", "left", "right"]),
];

pub static CAMERA_SCHEMA: PrimSchema =
    PrimSchema::new("Camera", Some("Camera"), Some(&XFORMABLE_SCHEMA), CAMERA_DEFS, &[]);

// ============================================================================
// UsdLux
// ============================================================================

const LIGHT_DEFS: &[AttrDef] = &[
    AttrDef::new("color", "color3f").value(SchemaValue::Float3([1.0, 1.0, 1.0])),
    AttrDef::new("colorTemperature", "float").value(SchemaValue::Float(6500.0)),
    AttrDef::new("diffuse", "float").value(SchemaValue::Float(1.0)),
    AttrDef::new("enableColorTemperature", "bool").value(SchemaValue::Bool(false)),
    AttrDef::new("exposure", "float").value(SchemaValue::Float(0.0)),
    AttrDef::new("intensity", "float").value(SchemaValue::Float(1.0)),
    AttrDef::new("normalize", "bool").value(SchemaValue::Bool(false)),
    AttrDef::new("specular", "float").value(SchemaValue::Float(1.0)),
    AttrDef::new("filters", "rel"),
];

const LIGHT_PROPS: &[PropDef] = &[
    PropDef::new("apiSchemas")
        .value(SchemaValue::Tokens(&["CollectionAPI:lightLink", "CollectionAPI:shadowLink"])),
];

pub static LIGHT_SCHEMA: PrimSchema =
    PrimSchema::new("Light", None, Some(&XFORMABLE_SCHEMA), LIGHT_DEFS, LIGHT_PROPS);

const DISTANT_LIGHT_DEFS: &[AttrDef] = &[
    AttrDef::new("angle", "float").value(SchemaValue::Float(0.53)),
    AttrDef::new("intensity", "float").value(SchemaValue::Float(50000.0)),
];

pub static DISTANT_LIGHT_SCHEMA: PrimSchema = PrimSchema::new(
    "DistantLight",
    Some("DistantLight"),
    Some(&LIGHT_SCHEMA),
    DISTANT_LIGHT_DEFS,
    &[],
);

const SPHERE_LIGHT_DEFS: &[AttrDef] = &[
    AttrDef::new("radius", "float").value(SchemaValue::Float(0.5)),
    AttrDef::new("treatAsPoint", "bool").value(SchemaValue::Bool(false)),
];

pub static SPHERE_LIGHT_SCHEMA: PrimSchema = PrimSchema::new(
    "SphereLight",
    Some("SphereLight"),
    Some(&LIGHT_SCHEMA),
    SPHERE_LIGHT_DEFS,
    &[],
);

// ============================================================================
// UsdShade
// ============================================================================

const MATERIAL_DEFS: &[AttrDef] = &[
    AttrDef::new("outputs:surface", T_TOKEN),
    AttrDef::new("outputs:displacement", T_TOKEN),
    AttrDef::new("outputs:volume", T_TOKEN),
];

pub static MATERIAL_SCHEMA: PrimSchema =
    PrimSchema::new("Material", Some("Material"), None, MATERIAL_DEFS, &[]);

const SHADER_DEFS: &[AttrDef] = &[
    AttrDef::new("info:id", T_TOKEN).uniform(),
    AttrDef::new("info:implementationSource", T_TOKEN)
        .uniform()
        .value(SchemaValue::Token("id"))
        .tokens(&["id", "sourceAsset", "sourceCode"]),
];

pub static SHADER_SCHEMA: PrimSchema =
    PrimSchema::new("Shader", Some("Shader"), None, SHADER_DEFS, &[]);

/// All built-in schemas, bases before derived types.
pub static CATALOG: &[&PrimSchema] = &[
    &IMAGEABLE_SCHEMA,
    &XFORMABLE_SCHEMA,
    &SCOPE_SCHEMA,
    &XFORM_SCHEMA,
    &BOUNDABLE_SCHEMA,
    &GPRIM_SCHEMA,
    &CUBE_SCHEMA,
    &SPHERE_SCHEMA,
    &CYLINDER_SCHEMA,
    &CONE_SCHEMA,
    &CAPSULE_SCHEMA,
    &POINT_BASED_SCHEMA,
    &MESH_SCHEMA,
    &POINTS_SCHEMA,
    &CAMERA_SCHEMA,
    &LIGHT_SCHEMA,
    &DISTANT_LIGHT_SCHEMA,
    &SPHERE_LIGHT_SCHEMA,
    &MATERIAL_SCHEMA,
    &SHADER_SCHEMA,
];

/// Concrete schema for a type tag (`"Cylinder"`, `"Mesh"`...).
pub fn schema_for(type_tag: &str) -> Option<&'static PrimSchema> {
    CATALOG
        .iter()
        .copied()
        .find(|s| s.type_tag == Some(type_tag))
}

/// Every attribute declaration visible on a type, derived overriding base.
///
/// Unknown types have no defaults.
pub fn defaults_for(type_tag: &str) -> IndexMap<&'static str, &'static AttrDef> {
    let mut out = IndexMap::new();
    if let Some(schema) = schema_for(type_tag) {
        for s in schema.chain() {
            for def in s.attributes {
                out.entry(def.name).or_insert(def);
            }
        }
    }
    out
}
