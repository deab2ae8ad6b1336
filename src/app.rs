//! Application shell
//!
//! [`ViewerApp`] owns the winit event loop. Everything the frame loop needs
//! lives in one [`Viewer`] context created when the window appears: the
//! render engine, camera, scenes, shading parameters, lookup tables and
//! material textures. Shutdown releases GPU resources in reverse order of
//! acquisition.

use std::sync::Arc;
use std::time::Instant;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::AppConfig;
use crate::error::{AppError, RenderError};
use crate::gfx::{
    camera::{CameraController, FlyCamera, KeyAction},
    rendering::RenderEngine,
    resources::{
        ltc::LtcSet,
        material::{MaterialTextures, ShadingParameters},
        texture_resource::{load_material_textures, GpuUploader, TextureResource},
    },
    scene::{
        presets::{load_scenes, TEXTURE_SETS},
        SceneComposer, SceneId, SceneSet,
    },
};
use crate::performance::FpsCounter;
use crate::ui::{apply_edit, parameters_panel, PanelStatus, UiManager};

pub struct ViewerApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    window: Option<Arc<Window>>,
    viewer: Option<Viewer>,
    error: Option<AppError>,
}

/// Application context of a running viewer.
struct Viewer {
    render_engine: RenderEngine,
    ui_manager: UiManager,
    camera: FlyCamera,
    controller: CameraController,
    scenes: SceneSet,
    active_scene: SceneId,
    shading: ShadingParameters,
    composer: SceneComposer,
    ltc: Option<LtcSet<TextureResource>>,
    texture_sets: Vec<MaterialTextures<TextureResource>>,
    fps: FpsCounter,
    start: Instant,
}

impl ViewerApp {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let event_loop = EventLoop::new()?;
        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                window: None,
                viewer: None,
                error: None,
            },
        })
    }

    /// Runs until the window closes. Returns the error that stopped the
    /// viewer, if any.
    pub fn run(mut self) -> Result<(), AppError> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop.run_app(&mut self.app_state)?;

        self.app_state.shutdown();
        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{error}");
        self.error.get_or_insert(error);
        event_loop.exit();
    }

    fn shutdown(&mut self) {
        if let Some(viewer) = self.viewer.take() {
            viewer.release();
        }
        self.window = None;
    }
}

impl Viewer {
    fn new(config: &AppConfig, window: Arc<Window>) -> Result<Self, AppError> {
        let PhysicalSize { width, height } = window.inner_size();
        let camera = FlyCamera::from_config(&config.camera, width.max(1), height.max(1))?;
        let shading = ShadingParameters::from_config(&config.shading)?;

        let render_engine = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            config.background,
        ))?;
        let device = render_engine.device();
        let queue = render_engine.queue();

        let mut scenes = load_scenes(&config.assets.model_dir)?;
        for scene in scenes.iter_mut() {
            for object in scene.objects_mut() {
                object.init_gpu_resources(device, render_engine.transform_layout());
            }
        }

        let texture_sets = TEXTURE_SETS
            .iter()
            .map(|files| load_material_textures(device, queue, &config.assets.texture_dir, *files))
            .collect::<Result<Vec<_>, _>>()?;

        let ltc = LtcSet::load(&mut GpuUploader { device, queue }, &config.assets.ltc_dir)?;
        log::info!("Lookup tables uploaded from {}", config.assets.ltc_dir.display());

        let ui_manager = UiManager::new(device, queue, render_engine.surface_format(), &window);

        Ok(Self {
            render_engine,
            ui_manager,
            camera,
            controller: CameraController::new(),
            scenes,
            active_scene: SceneId::default(),
            shading,
            composer: SceneComposer::from_config(&config.animation, config.strict_bindings),
            ltc: Some(ltc),
            texture_sets,
            fps: FpsCounter::new(config.animation.fps_sample_frames),
            start: Instant::now(),
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_width(width);
        self.camera.set_height(height);
        self.render_engine.resize(width, height);
        self.ui_manager.update_display_size(width, height);
    }

    /// Builds the UI, animates and binds the active scene, then renders it.
    fn frame(&mut self, window: &Window) -> Result<(), AppError> {
        let Viewer {
            render_engine,
            ui_manager,
            camera,
            scenes,
            active_scene,
            shading,
            composer,
            ltc,
            texture_sets,
            fps,
            start,
            ..
        } = self;

        let history = fps.frame_time_history();
        let status = PanelStatus {
            fps: fps.fps(),
            frame_times: &history,
        };
        let mut edits = Vec::new();
        ui_manager.update_logic(window, |ui| {
            edits = parameters_panel(ui, shading, *active_scene, &status);
        });
        for edit in edits {
            apply_edit(edit, shading, active_scene);
        }

        let Some(scene) = scenes.get_mut(*active_scene) else {
            log::error!("{} is not loaded", active_scene.label());
            return Ok(());
        };
        composer.update_transforms(scene, start.elapsed());
        for object in scene.objects_mut() {
            object.update_transform(render_engine.queue());
        }
        render_engine.update(camera.uniform());

        let Some(ltc) = ltc.as_ref() else {
            return Ok(());
        };
        let program = render_engine.program_mut();
        program.begin_frame();
        match composer.compose(program, scene, shading, ltc, texture_sets) {
            Ok(report) => log::debug!("{report:?}"),
            Err(e) => log::error!("Binding aborted for this frame: {e}"),
        }

        let rendered = render_engine.render_frame(
            scene,
            Some(|device: &wgpu::Device,
                  queue: &wgpu::Queue,
                  encoder: &mut wgpu::CommandEncoder,
                  view: &wgpu::TextureView| {
                ui_manager.render_display_only(device, queue, encoder, view);
            }),
        );

        match rendered {
            Ok(()) => {
                fps.tick();
                Ok(())
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_engine.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(RenderError::Frame(wgpu::SurfaceError::OutOfMemory).into())
            }
            Err(e) => {
                log::warn!("Skipping frame: {e}");
                Ok(())
            }
        }
    }

    fn release(mut self) {
        let device = self.render_engine.device().clone();
        let queue = self.render_engine.queue().clone();

        for set in self.texture_sets.drain(..).rev() {
            for texture in set.into_textures().into_iter().rev() {
                texture.texture.destroy();
            }
        }
        if let Some(ltc) = self.ltc.take() {
            ltc.remove(&mut GpuUploader {
                device: &device,
                queue: &queue,
            });
        }
        for scene in self.scenes.iter_mut() {
            for object in scene.objects_mut() {
                object.release_gpu_resources();
            }
        }
        self.render_engine.release();
        log::info!("Released GPU resources");
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };

        match Viewer::new(&self.config, window.clone()) {
            Ok(viewer) => {
                self.viewer = Some(viewer);
                self.window = Some(window);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let (Some(viewer), Some(window)) = (self.viewer.as_mut(), self.window.clone()) else {
            return;
        };

        let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        let ui_captured = viewer.ui_manager.handle_input(&window, &ui_event);

        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if ui_captured || viewer.ui_manager.wants_keyboard() {
                    return;
                }
                if let Some(KeyAction::Exit) = viewer
                    .controller
                    .process_keyed_events(&key_event, &mut viewer.camera)
                {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                viewer.resize(width, height);
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = viewer.frame(&window) {
                    self.fail(event_loop, e);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
