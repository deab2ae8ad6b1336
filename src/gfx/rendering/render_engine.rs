//! WGPU-based rendering engine for the sheen viewer
//!
//! Owns the surface, device and queue, the depth buffer, the camera
//! bindings and the area-light shading pipeline. The shading program it
//! owns collects one bind group per draw while a scene is composed;
//! [`RenderEngine::render_frame`] replays them in order.

use wgpu::TextureFormat;

use crate::error::RenderError;
use crate::gfx::{
    binding::program::GpuProgram,
    camera::camera_utils::CameraUniform,
    resources::{
        global_bindings::{update_global_ubo, GlobalBindings, GlobalUBO},
        texture_resource::TextureResource,
    },
    scene::{
        object::{transform_bind_group_layout, DrawObject},
        scene::Scene,
    },
};
use crate::wgpu_utils::binding_builder::BindGroupLayoutWithDesc;

use super::pipeline_manager::{PipelineConfig, PipelineManager};

const SHADER_NAME: &str = "ltc.wgsl";
const PIPELINE_NAME: &str = "LTC";

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    format: TextureFormat,
    clear_color: wgpu::Color,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,
    transform_layout: BindGroupLayoutWithDesc,
    program: GpuProgram,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    /// * `background` - Clear colour, RGBA
    ///
    /// # Errors
    /// Fails when no surface, adapter or device can be created, or when the
    /// shading pipeline does not build.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        background: [f32; 4],
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: 4096,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(RenderError::NoSurfaceFormat)?;
        log::info!("Surface format {format:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let transform_layout = transform_bind_group_layout(&device);
        let program = GpuProgram::new(&device, &queue);

        let mut pipeline_manager = PipelineManager::new(&device);
        pipeline_manager.load_shader(SHADER_NAME, include_str!("ltc.wgsl"));
        pipeline_manager.register_pipeline(
            PIPELINE_NAME,
            PipelineConfig::default_with_shader(SHADER_NAME)
                .with_label("LTC Pipeline")
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layouts().clone(),
                    program.bind_group_layout().clone(),
                    transform_layout.layout.clone(),
                ])
                .with_cull_mode(None)
                .with_depth_format(TextureResource::DEPTH_FORMAT)
                .with_color_format(format),
        );
        pipeline_manager
            .create_all_pipelines()
            .map_err(RenderError::Pipeline)?;

        let [r, g, b, a] = background.map(f64::from);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            format,
            clear_color: wgpu::Color { r, g, b, a },
            pipeline_manager,
            global_ubo,
            global_bindings,
            transform_layout,
            program,
        })
    }

    /// Renders one frame of `scene`
    ///
    /// Clears colour and depth, then issues the draws the shading program
    /// recorded for this scene in recording order. The optional callback
    /// records the UI overlay into the same encoder.
    ///
    /// # Errors
    /// Returns the surface error when no frame could be acquired; the caller
    /// decides whether to reconfigure or skip the frame.
    pub fn render_frame<F>(
        &mut self,
        scene: &Scene,
        ui_callback: Option<F>,
    ) -> Result<(), wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = self.surface.get_current_texture()?;

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, self.global_bindings.bind_groups(), &[]);

            if let Some(pipeline) = self.pipeline_manager.pipeline(PIPELINE_NAME) {
                render_pass.set_pipeline(pipeline);

                for draw in self.program.pending_draws() {
                    if draw.scene != scene.id() {
                        continue;
                    }
                    let Some(object) = scene.object(draw.object_index) else {
                        continue;
                    };
                    let Some(transform) = object.transform_bind_group() else {
                        log::debug!("Skipping '{}' - no GPU resources", object.name());
                        continue;
                    };

                    render_pass.set_bind_group(1, &draw.bind_group, &[]);
                    render_pass.set_bind_group(2, transform, &[]);
                    render_pass.draw_object(object);
                }
            }
        }

        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Writes this frame's camera uniform
    pub fn update(&mut self, camera_uniform: CameraUniform) {
        update_global_ubo(&mut self.global_ubo, &self.queue, camera_uniform);
    }

    /// Resizes the surface and recreates the depth buffer
    ///
    /// Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::warn!("Ignoring resize to {width}x{height}");
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    /// Reconfigures the surface at its current size, after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Used by the UI renderer for a compatible render target.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Layout objects use for their transform bind groups.
    pub fn transform_layout(&self) -> &BindGroupLayoutWithDesc {
        &self.transform_layout
    }

    pub fn program(&self) -> &GpuProgram {
        &self.program
    }

    pub fn program_mut(&mut self) -> &mut GpuProgram {
        &mut self.program
    }

    /// Destroys the program's per-draw buffers and the depth buffer.
    pub fn release(&mut self) {
        self.program.release();
        self.depth_texture.texture.destroy();
    }
}
