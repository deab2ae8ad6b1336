//! wgpu implementation of the binding surface
//!
//! [`GpuProgram`] keeps a CPU copy of the material uniform block and the
//! texture currently attached to each slot. Each draw snapshots both into
//! its own uniform buffer and bind group, so later writes never disturb a
//! draw already recorded, while values not rewritten carry over to the next.

use cgmath::Vector3;

use crate::error::BindingError;
use crate::gfx::resources::slots::TextureSlot;
use crate::gfx::resources::texture_resource::TextureResource;
use crate::gfx::scene::{Object, SceneId};
use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

use super::uniform_block::{ShadingUniforms, UniformBlock};
use super::{DrawTarget, UniformTarget};

type MaterialUBO = UniformBuffer<ShadingUniforms>;

/// Binding types of the material group, in binding order: the uniform
/// block, one texture per [`TextureSlot`] and the shared sampler.
pub fn material_binding_types() -> Vec<wgpu::BindingType> {
    let mut types = vec![binding_types::uniform()];
    types.extend(TextureSlot::ALL.iter().map(|slot| {
        if slot.is_lookup_table() {
            binding_types::texture_2d_unfilterable()
        } else {
            binding_types::texture_2d()
        }
    }));
    types.push(binding_types::sampler(wgpu::SamplerBindingType::Filtering));
    types
}

/// A draw recorded by [`GpuProgram`], waiting for the render pass.
pub struct PendingDraw {
    pub scene: SceneId,
    pub object_index: usize,
    pub bind_group: wgpu::BindGroup,
}

pub struct GpuProgram {
    device: wgpu::Device,
    queue: wgpu::Queue,
    layout: BindGroupLayoutWithDesc,
    sampler: wgpu::Sampler,
    block: UniformBlock,
    slots: [Option<TextureResource>; TextureSlot::COUNT],
    fallback_lookup: TextureResource,
    fallback_material: TextureResource,
    buffers: Vec<MaterialUBO>,
    pending: Vec<PendingDraw>,
}

impl GpuProgram {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = material_binding_types()
            .into_iter()
            .fold(BindGroupLayoutBuilder::new(), |builder, ty| {
                builder.next_binding_fragment(ty)
            })
            .create(device, "Material Bind Group Layout");

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let fallback_lookup =
            TextureResource::create_float_rgba(device, queue, &[0.0, 0.0, 0.0, 1.0], 1, "Empty Lookup");
        let fallback_material =
            TextureResource::create_solid(device, queue, [255, 255, 255, 255], "Empty Material Map");

        Self {
            device: device.clone(),
            queue: queue.clone(),
            layout,
            sampler,
            block: UniformBlock::new(),
            slots: Default::default(),
            fallback_lookup,
            fallback_material,
            buffers: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout.layout
    }

    pub fn block(&self) -> &UniformBlock {
        &self.block
    }

    /// Drops the draws of the previous frame. Uniform values and slot
    /// attachments are kept.
    pub fn begin_frame(&mut self) {
        self.pending.clear();
    }

    pub fn pending_draws(&self) -> &[PendingDraw] {
        &self.pending
    }

    /// Destroys the per-draw uniform buffers and fallback textures.
    pub fn release(&mut self) {
        self.pending.clear();
        for buffer in self.buffers.drain(..) {
            buffer.buffer().destroy();
        }
        self.slots = Default::default();
        self.fallback_lookup.texture.destroy();
        self.fallback_material.texture.destroy();
    }

    fn view_for(&self, slot: TextureSlot) -> &wgpu::TextureView {
        match &self.slots[slot.index() as usize] {
            Some(texture) => &texture.view,
            None if slot.is_lookup_table() => &self.fallback_lookup.view,
            None => &self.fallback_material.view,
        }
    }
}

impl UniformTarget for GpuProgram {
    type Texture = TextureResource;

    fn set_float(&mut self, name: &str, value: f32) -> Result<(), BindingError> {
        self.block.set_float(name, value)
    }

    fn set_int(&mut self, name: &str, value: i32) -> Result<(), BindingError> {
        self.block.set_int(name, value)
    }

    fn set_bool(&mut self, name: &str, value: bool) -> Result<(), BindingError> {
        self.block.set_bool(name, value)
    }

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>) -> Result<(), BindingError> {
        self.block.set_vec3(name, value)
    }

    fn bind_texture(
        &mut self,
        name: &str,
        slot: u32,
        texture: &TextureResource,
    ) -> Result<(), BindingError> {
        let slot = TextureSlot::resolve(name, slot)?;
        self.slots[slot.index() as usize] = Some(texture.clone());
        Ok(())
    }

    fn unbind_texture(&mut self, slot: u32) -> Result<(), BindingError> {
        let slot = TextureSlot::from_index(slot).ok_or(BindingError::SlotOutOfRange(slot))?;
        self.slots[slot.index() as usize] = None;
        Ok(())
    }
}

impl DrawTarget for GpuProgram {
    fn draw(&mut self, scene: SceneId, object_index: usize, object: &Object) {
        let index = self.pending.len();
        if index == self.buffers.len() {
            self.buffers.push(MaterialUBO::new(&self.device));
        }
        self.buffers[index].update_content(&self.queue, *self.block.contents());

        let builder = TextureSlot::ALL.iter().fold(
            BindGroupBuilder::new(&self.layout).resource(self.buffers[index].binding_resource()),
            |builder, &slot| builder.texture(self.view_for(slot)),
        );
        let bind_group = builder
            .sampler(&self.sampler)
            .create(&self.device, &format!("{} Material Bind Group", object.name()));

        self.pending.push(PendingDraw {
            scene,
            object_index,
            bind_group,
        });
    }
}
