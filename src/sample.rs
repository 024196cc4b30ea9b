//! Reference scene exercising every authoring feature once.
//!
//! ```text
//! /root
//!     cylinder   Cylinder, animated translate, xformOpOrder
//!     Cube       Cube
//!     foo        Xform, inherits /root/cylinder, variantSets lodVariant
//!         lodVariant { "hi" { HiGeometry } }
//! ```

use crate::config::WriterConfig;
use crate::entities::keys::{A_TRANSLATE, T_DOUBLE3};
use crate::entities::{ArcMode, Node, NodeId, Stage, ValueHolder};
use crate::error::Result;

/// Transform order authored on the sample cylinder.
pub const DEFAULT_XFORM_ORDER: &str = "trs";

pub fn build_sample(config: WriterConfig) -> Result<Stage> {
    let mut stage = Stage::with_config(config);
    stage.set_frame_range(1, 200);
    stage.set_framerate(24);
    stage.set_up_axis("Y");

    let root = stage.add_prim(NodeId::ROOT, Node::prim("root"))?;

    let cyl = stage.add_prim(root, Node::typed("Cylinder", "cylinder"))?;
    stage.add_prim(root, Node::typed("Cube", "Cube"))?;
    {
        let cylinder = &mut stage[cyl];
        cylinder.set_attribute("height", 10);
        cylinder.set_attribute("axis", "Y");
        let translate =
            cylinder.set_attribute_with(A_TRANSLATE, (-1.99, 0, 2), Some(T_DOUBLE3), None);
        translate.set_keyframe(1, (1, 2, 3));
        translate.set_keyframe(2, (5, 4, 3));
        translate.set_keyframe(100, (10, 10, 10));
        cylinder.set_xform_order(DEFAULT_XFORM_ORDER)?;
    }

    let foo = stage.add_prim(root, Node::typed("Xform", "foo"))?;
    stage.add_inherit_node(foo, cyl, ArcMode::Add)?;
    stage[foo].add_variant("lodVariant", ArcMode::None);

    let lod = stage.add_prim(foo, Node::variant_set("lodVariant"))?;
    let hi = stage.add_prim(lod, Node::variant("hi"))?;
    stage.add_prim(hi, Node::typed("Xform", "HiGeometry"))?;

    Ok(stage)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_BODY: &str = r#"

def "root"
{

    def Cylinder "cylinder"
    {
        double height = 10
        uniform token axis = "Y"
        double3 xformOp:translate.timeSamples = {
            1: (1, 2, 3),
            2: (5, 4, 3),
            100: (10, 10, 10),
        }
        uniform token[] xformOpOrder = ["xformOp:translate", "xformOp:rotateXYZ", "xformOp:scale"]
    }

    def Cube "Cube"
    {
    }

    def Xform "foo" (
        variantSets = [
            "lodVariant"
        ]

        add inherits = [
            </root/cylinder>
        ]

    )
    {
        variantSet "lodVariant" = {
            "hi" {

                def Xform "HiGeometry"
                {
                }
            }
        }
    }
}
"#;

    #[test]
    fn test_sample_scene_text() {
        let stage = build_sample(WriterConfig::default()).unwrap();
        let text = stage.to_usda();

        let header = format!(
            "#usda 1.0\n(\n    \"Written by AUD v{}\"\n    startTimeCode = 1\n    endTimeCode = 200\n    timeCodesPerSecond = 24\n    upAxis = \"Y\"\n)\n",
            env!("CARGO_PKG_VERSION")
        );
        assert_eq!(text, format!("{header}{EXPECTED_BODY}"));
    }

    #[test]
    fn test_sample_scene_structure() {
        let stage = build_sample(WriterConfig::default()).unwrap();
        let cyl = stage.find("/root/cylinder").unwrap();
        assert_eq!(stage.path(cyl), "/root/cylinder");
        assert!(stage.find("/root/foo/lodVariant/hi/HiGeometry").is_some());

        let translate = stage[cyl].attribute(A_TRANSLATE).unwrap();
        assert!(translate.value().is_none());
        assert_eq!(translate.keyframes().len(), 3);
        assert_eq!(translate.formatted_value_at(2).unwrap(), "(5, 4, 3)");
        assert!(translate.formatted_value_at(3).is_err());
    }

    #[test]
    fn test_sample_is_stable() {
        let a = build_sample(WriterConfig::default()).unwrap().to_usda();
        let b = build_sample(WriterConfig::default()).unwrap().to_usda();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_save() {
        let dir = tempfile::tempdir().unwrap();
        let stage = build_sample(WriterConfig::default()).unwrap();
        let written = stage.save(dir.path().join("test")).unwrap();
        assert_eq!(written.extension().and_then(|e| e.to_str()), Some("usda"));
        let text = std::fs::read_to_string(written).unwrap();
        assert!(text.starts_with("#usda 1.0\n"));
    }
}
