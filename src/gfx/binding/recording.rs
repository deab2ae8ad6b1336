//! Recording program for tests
//!
//! Checks every write against the same [`UniformBlock`] and slot table the
//! GPU program uses, and keeps an ordered log of what was accepted.

use cgmath::Vector3;

use crate::error::BindingError;
use crate::gfx::resources::ltc::{LtcSet, LtcTable, LtcTableKind, TableUploader};
use crate::gfx::resources::material::{MaterialTexture, MaterialTextures};
use crate::gfx::resources::slots::TextureSlot;
use crate::gfx::scene::{Object, SceneId};

use super::{DrawTarget, UniformBlock, UniformTarget};

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec3([f32; 3]),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Uniform {
        name: String,
        value: RecordedValue,
    },
    Texture {
        name: String,
        slot: u32,
        texture: u32,
    },
    Unbind {
        slot: u32,
    },
    Draw {
        scene: SceneId,
        object_index: usize,
        object: String,
    },
}

#[derive(Debug, Default)]
pub struct RecordingTarget {
    pub calls: Vec<RecordedCall>,
    block: UniformBlock,
    slots: [Option<u32>; TextureSlot::COUNT],
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    pub fn bound(&self, slot: TextureSlot) -> Option<u32> {
        self.slots[slot.index() as usize]
    }

    /// Names of accepted uniform writes, in order.
    pub fn uniform_names(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Uniform { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn value_of(&self, name: &str) -> Option<&RecordedValue> {
        self.calls.iter().rev().find_map(|call| match call {
            RecordedCall::Uniform { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }

    pub fn texture_slots(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Texture { slot, .. } => Some(*slot),
                _ => None,
            })
            .collect()
    }

    pub fn draws(&self) -> Vec<(SceneId, usize, &str)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Draw {
                    scene,
                    object_index,
                    object,
                } => Some((*scene, *object_index, object.as_str())),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, name: &str, value: RecordedValue) {
        self.calls.push(RecordedCall::Uniform {
            name: name.to_string(),
            value,
        });
    }
}

impl UniformTarget for RecordingTarget {
    type Texture = u32;

    fn set_float(&mut self, name: &str, value: f32) -> Result<(), BindingError> {
        self.block.set_float(name, value)?;
        self.record(name, RecordedValue::Float(value));
        Ok(())
    }

    fn set_int(&mut self, name: &str, value: i32) -> Result<(), BindingError> {
        self.block.set_int(name, value)?;
        self.record(name, RecordedValue::Int(value));
        Ok(())
    }

    fn set_bool(&mut self, name: &str, value: bool) -> Result<(), BindingError> {
        self.block.set_bool(name, value)?;
        self.record(name, RecordedValue::Bool(value));
        Ok(())
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) -> Result<(), BindingError> {
        self.block.set_vec3(name, value)?;
        self.record(name, RecordedValue::Vec3(value.into()));
        Ok(())
    }

    fn bind_texture(&mut self, name: &str, slot: u32, texture: &u32) -> Result<(), BindingError> {
        TextureSlot::resolve(name, slot)?;
        self.slots[slot as usize] = Some(*texture);
        self.calls.push(RecordedCall::Texture {
            name: name.to_string(),
            slot,
            texture: *texture,
        });
        Ok(())
    }

    fn unbind_texture(&mut self, slot: u32) -> Result<(), BindingError> {
        let entry = self
            .slots
            .get_mut(slot as usize)
            .ok_or(BindingError::SlotOutOfRange(slot))?;
        *entry = None;
        self.calls.push(RecordedCall::Unbind { slot });
        Ok(())
    }
}

impl DrawTarget for RecordingTarget {
    fn draw(&mut self, scene: SceneId, object_index: usize, object: &Object) {
        self.calls.push(RecordedCall::Draw {
            scene,
            object_index,
            object: object.name().to_string(),
        });
    }
}

/// Uploader handing out texture ids 101, 102, ...
#[derive(Debug, Default)]
pub struct CountingUploader {
    uploaded: u32,
    pub released: Vec<u32>,
}

impl TableUploader for CountingUploader {
    type Texture = u32;

    fn upload_table(&mut self, _table: &LtcTable, _label: &str) -> u32 {
        self.uploaded += 1;
        100 + self.uploaded
    }

    fn release(&mut self, texture: u32) {
        self.released.push(texture);
    }
}

/// Lookup textures 101 (LTC1), 102 (LTC2) and 103 (SHEENCOEFFS).
pub fn ltc_set() -> LtcSet<u32> {
    let table = |kind: LtcTableKind| {
        LtcTable::from_f32(kind, vec![0.0; kind.float_count()]).expect("table size")
    };
    LtcSet::from_tables(
        &mut CountingUploader::default(),
        &table(LtcTableKind::Matrix),
        &table(LtcTableKind::Amplitude),
        &table(LtcTableKind::Sheen),
    )
    .expect("default slots")
}

/// Material maps with ids `base`, `base + 1` and `base + 2`.
pub fn material_textures(base: u32) -> MaterialTextures<u32> {
    let texture = |name: &str, slot: TextureSlot, id: u32| MaterialTexture {
        name: name.to_string(),
        slot,
        texture: id,
    };
    MaterialTextures {
        diffuse: texture("basecolor.png", TextureSlot::Diffuse, base),
        normal: texture("normal.png", TextureSlot::NormalMap, base + 1),
        specular: texture("specular.png", TextureSlot::Specular, base + 2),
    }
}
