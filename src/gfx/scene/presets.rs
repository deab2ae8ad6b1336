//! The two scenes the viewer ships with

use std::path::Path;

use crate::error::AssetError;
use crate::gfx::resources::material::OverrideMaterial;

use super::loader::load_obj;
use super::object::Object;
use super::scene::{Drawable, MaterialSpec, Scene, SceneId, SceneSet};

pub const CLOTH_MODEL: &str = "cloth.obj";
pub const SPHERE_MODEL: &str = "sphere.obj";
pub const FABRIC_MODEL: &str = "fabric_front.obj";
pub const TABLE_MODEL: &str = "table.obj";
pub const SEWING_MODEL: &str = "sewing.obj";

/// Texture set index of the table maps.
pub const TABLE_TEXTURES: usize = 0;
/// Texture set index of the sewing machine maps.
pub const MACHINE_TEXTURES: usize = 1;

/// Diffuse, normal and specular file names, indexed by texture set.
pub const TEXTURE_SETS: [[&str; 3]; 2] = [
    ["table_basecolor.png", "table_normal.png", "table_specular.png"],
    ["machine_basecolor.png", "machine_normal.png", "machine_specular.png"],
];

/// Cloth and a glossy sphere. The cloth sets the scale; the sphere is
/// drawn first.
pub fn scene_one(cloth: Object, sphere: Object) -> Scene {
    Scene::new(
        SceneId::Scene1,
        vec![cloth, sphere],
        0,
        0.75,
        vec![
            Drawable {
                object: 1,
                material: MaterialSpec::Flat(OverrideMaterial::uniform(0.2, 0.3, 0.01)),
                dust: false,
            },
            Drawable {
                object: 0,
                material: MaterialSpec::Fabric,
                dust: false,
            },
        ],
    )
}

/// Fabric on a textured table next to a dusty sewing machine. The table
/// sets the scale.
pub fn scene_two(fabric: Object, table: Object, sewing: Object) -> Scene {
    Scene::new(
        SceneId::Scene2,
        vec![fabric, table, sewing],
        1,
        1.0,
        vec![
            Drawable {
                object: 0,
                material: MaterialSpec::Fabric,
                dust: false,
            },
            Drawable {
                object: 1,
                material: MaterialSpec::Textured {
                    roughness: 0.4,
                    specular_mult: 0.3,
                    textures: TABLE_TEXTURES,
                },
                dust: false,
            },
            Drawable {
                object: 2,
                material: MaterialSpec::Textured {
                    roughness: 0.01,
                    specular_mult: 0.2,
                    textures: MACHINE_TEXTURES,
                },
                dust: true,
            },
        ],
    )
}

/// Loads the models of both scenes from `model_dir`.
pub fn load_scenes(model_dir: &Path) -> Result<SceneSet, AssetError> {
    let load = |file: &str| load_obj(&model_dir.join(file));

    let one = scene_one(load(CLOTH_MODEL)?, load(SPHERE_MODEL)?);
    let two = scene_two(load(FABRIC_MODEL)?, load(TABLE_MODEL)?, load(SEWING_MODEL)?);

    Ok(SceneSet::new(vec![one, two]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::bounding_box::BoundingBox;
    use cgmath::Vector3;

    fn object(name: &str) -> Object {
        Object::new(
            name,
            Vec::new(),
            BoundingBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0)),
        )
    }

    #[test]
    fn test_scene_one_layout() {
        let scene = scene_one(object("cloth"), object("sphere"));
        assert_eq!(scene.fudge(), 0.75);
        assert_eq!(scene.drawables()[0].object, 1);
        assert!(matches!(scene.drawables()[1].material, MaterialSpec::Fabric));
        assert!(scene.drawables().iter().all(|d| !d.dust));
    }

    #[test]
    fn test_scene_two_references_table() {
        let scene = scene_two(object("fabric"), object("table"), object("sewing"));
        assert_eq!(scene.object(1).unwrap().name(), "table");
        assert_eq!(scene.fudge(), 1.0);
        let textured = scene
            .drawables()
            .iter()
            .filter_map(|d| match d.material {
                MaterialSpec::Textured { textures, .. } => Some(textures),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(textured, vec![TABLE_TEXTURES, MACHINE_TEXTURES]);
        assert!(scene.drawables()[2].dust);
        assert!(textured.iter().all(|&i| i < TEXTURE_SETS.len()));
    }

    #[test]
    fn test_missing_model_directory() {
        assert!(load_scenes(Path::new("no/such/dir")).is_err());
    }
}
