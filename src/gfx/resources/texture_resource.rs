//! Texture resource management for wgpu
//!
//! Depth buffers, decoded image textures and the float lookup tables, plus
//! the [`GpuUploader`] that puts lookup tables on the device.

use std::path::Path;

use crate::error::AssetError;

use super::ltc::{LtcTable, TableUploader};
use super::material::{MaterialTexture, MaterialTextures};
use super::slots::TextureSlot;

/// GPU texture resource containing texture, view, and sampler
#[derive(Debug, Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Standard depth buffer format used throughout the viewer
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Lookup tables are uploaded as full 32-bit floats.
    pub const LOOKUP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[Self::DEPTH_FORMAT],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Creates a repeating, linearly filtered texture from RGBA8 pixels.
    ///
    /// Colour maps should pass `srgb = true`; normal and specular maps hold
    /// linear data.
    pub fn create_from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        srgb: bool,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// 1x1 texture, bound to material slots that nothing else occupies.
    pub fn create_solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        label: &str,
    ) -> Self {
        Self::create_from_rgba8(device, queue, &rgba, 1, 1, false, label)
    }

    /// Decodes a PNG or JPEG file.
    pub fn load_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        srgb: bool,
    ) -> Result<Self, AssetError> {
        let image = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        log::info!("Loaded texture {} ({width}x{height})", path.display());

        Ok(Self::create_from_rgba8(
            device,
            queue,
            &image,
            width,
            height,
            srgb,
            &path.display().to_string(),
        ))
    }

    /// Uploads a lookup table as an unfilterable RGBA float texture. Three
    /// channel tables are widened with alpha 1.
    pub fn create_lookup_table(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        table: &LtcTable,
        label: &str,
    ) -> Self {
        Self::create_float_rgba(device, queue, &table.to_rgba(), table.kind().size(), label)
    }

    /// Square `Rgba32Float` texture of edge `edge` from row-major texels.
    pub fn create_float_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texels: &[f32],
        edge: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: edge,
            height: edge,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::LOOKUP_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(LOOKUP_TEXEL_BYTES * edge),
                rows_per_image: Some(edge),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        // Never used for filtering; the shader reads texels directly.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

const LOOKUP_TEXEL_BYTES: u32 = 16;

/// Loads diffuse, normal and specular maps from `dir`.
pub fn load_material_textures(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    dir: &Path,
    files: [&str; 3],
) -> Result<MaterialTextures<TextureResource>, AssetError> {
    let load = |file: &str, slot: TextureSlot| -> Result<MaterialTexture<TextureResource>, AssetError> {
        let srgb = slot == TextureSlot::Diffuse;
        Ok(MaterialTexture {
            name: file.to_string(),
            slot,
            texture: TextureResource::load_image(device, queue, &dir.join(file), srgb)?,
        })
    };

    Ok(MaterialTextures {
        diffuse: load(files[0], TextureSlot::Diffuse)?,
        normal: load(files[1], TextureSlot::NormalMap)?,
        specular: load(files[2], TextureSlot::Specular)?,
    })
}

/// Creates lookup textures on a wgpu device.
pub struct GpuUploader<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
}

impl TableUploader for GpuUploader<'_> {
    type Texture = TextureResource;

    fn upload_table(&mut self, table: &LtcTable, label: &str) -> TextureResource {
        log::debug!("Uploading {label} lookup table");
        TextureResource::create_lookup_table(self.device, self.queue, table, label)
    }

    fn release(&mut self, texture: TextureResource) {
        texture.texture.destroy();
    }
}
