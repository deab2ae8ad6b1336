//! Scenes: resident object lists with a per-draw material description

use super::bounding_box::BoundingBox;
use super::object::Object;
use crate::gfx::resources::material::OverrideMaterial;

/// Selectable scenes. Switching is immediate; every scene stays loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SceneId {
    #[default]
    Scene1,
    Scene2,
}

impl SceneId {
    pub const ALL: [SceneId; 2] = [SceneId::Scene1, SceneId::Scene2];

    pub fn label(self) -> &'static str {
        match self {
            SceneId::Scene1 => "Scene 1",
            SceneId::Scene2 => "Scene 2",
        }
    }
}

/// How one drawable is shaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialSpec {
    /// Flat material following the live fabric parameters.
    Fabric,
    /// Fixed flat material.
    Flat(OverrideMaterial),
    /// Base material using texture set `textures`.
    Textured {
        roughness: f32,
        specular_mult: f32,
        textures: usize,
    },
}

/// One draw: an object of the scene and the material it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub object: usize,
    pub material: MaterialSpec,
    pub dust: bool,
}

pub struct Scene {
    id: SceneId,
    objects: Vec<Object>,
    reference: usize,
    fudge: f32,
    drawables: Vec<Drawable>,
    pub(crate) degenerate_reported: bool,
}

impl Scene {
    /// `reference` indexes the object whose bounds drive normalization;
    /// `fudge` scales the normalized size.
    pub fn new(
        id: SceneId,
        objects: Vec<Object>,
        reference: usize,
        fudge: f32,
        drawables: Vec<Drawable>,
    ) -> Self {
        Self {
            id,
            objects,
            reference,
            fudge,
            drawables,
            degenerate_reported: false,
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [Object] {
        &mut self.objects
    }

    pub fn object(&self, index: usize) -> Option<&Object> {
        self.objects.get(index)
    }

    pub fn reference_bounds(&self) -> Option<&BoundingBox> {
        self.objects.get(self.reference).map(Object::bounding_box)
    }

    pub fn fudge(&self) -> f32 {
        self.fudge
    }

    /// Draws in submission order.
    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }
}

/// All scenes, resident at once.
#[derive(Default)]
pub struct SceneSet {
    scenes: Vec<Scene>,
}

impl SceneSet {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    pub fn get(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.id == id)
    }

    pub fn get_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|scene| scene.id == id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Scene> {
        self.scenes.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn object(name: &str) -> Object {
        Object::new(
            name,
            Vec::new(),
            BoundingBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0)),
        )
    }

    #[test]
    fn test_scene_lookup() {
        let set = SceneSet::new(vec![
            Scene::new(SceneId::Scene2, vec![object("a"), object("b")], 1, 1.0, Vec::new()),
            Scene::new(SceneId::Scene1, vec![object("c")], 0, 0.75, Vec::new()),
        ]);

        assert_eq!(set.get(SceneId::Scene1).unwrap().fudge(), 0.75);
        assert_eq!(set.get(SceneId::Scene2).unwrap().objects().len(), 2);
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_reference_out_of_range() {
        let scene = Scene::new(SceneId::Scene1, vec![object("a")], 3, 1.0, Vec::new());
        assert!(scene.reference_bounds().is_none());
        assert_eq!(SceneId::default(), SceneId::Scene1);
    }
}
