//! The engine: a [`RevealSession`] plus the GPU resources that draw it.
//!
//! Hosts (the winit viewer, the wasm canvas) own one [`XrayEngine`], feed
//! it input and resize events, and call [`XrayEngine::render`] once per
//! display refresh. The engine assumes it is the only live instance; the
//! host enforces that and calls [`XrayEngine::dispose`] on teardown.

/// The engine's command vocabulary.
pub mod command;
/// GPU-free per-frame core.
pub mod session;

pub use command::EngineCommand;
pub use session::{RevealSession, SessionTick};

use crate::camera::binding::CameraBinding;
use crate::error::SkinboneError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::viewport::Viewport;
use crate::input::InputEvent;
use crate::options::Options;
use crate::renderer::XrayRenderer;
use crate::util::frame_timing::FrameTiming;

/// Result of one [`XrayEngine::render`] call. None of these is an error:
/// every non-`Rendered` outcome means "try again next frame".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was composited and presented.
    Rendered,
    /// The frame-rate cap has not elapsed yet.
    Throttled,
    /// A model is still loading; nothing was drawn.
    Loading,
    /// The surface was lost, outdated or timed out; it has been
    /// reconfigured where possible.
    SurfaceUnavailable,
    /// The engine has been disposed.
    Disposed,
}

/// GPU resources, dropped together on dispose.
struct GpuState {
    context: RenderContext,
    camera: CameraBinding,
    renderer: XrayRenderer,
}

/// Interactive x-ray reveal engine.
pub struct XrayEngine {
    session: RevealSession,
    gpu: Option<GpuState>,
    timing: FrameTiming,
}

impl XrayEngine {
    /// Build the engine on `context` with procedural models and canned
    /// explanations. `viewport` is the logical size and pixel ratio.
    ///
    /// # Errors
    ///
    /// Returns [`SkinboneError`] if a shader fails to compose or the
    /// condition table cannot be loaded. Both are fatal at startup.
    pub fn new(
        context: RenderContext,
        options: Options,
        viewport: Viewport,
    ) -> Result<Self, SkinboneError> {
        let session = RevealSession::new(options, viewport)?;
        Self::with_session(context, session)
    }

    /// Build the engine around an existing session.
    ///
    /// # Errors
    ///
    /// Returns [`SkinboneError::Shader`] if a shader fails to compose.
    pub fn with_session(
        context: RenderContext,
        session: RevealSession,
    ) -> Result<Self, SkinboneError> {
        let camera =
            CameraBinding::new(&context.device, &session.scene().orbit.camera);
        let renderer = XrayRenderer::new(
            &context,
            &camera.layout,
            session.scene().extent(),
            session.options(),
        )?;
        let timing = FrameTiming::new(session.options().display.target_fps);
        log::info!(
            "engine ready at {}x{}",
            session.scene().extent().width,
            session.scene().extent().height
        );
        Ok(Self {
            session,
            gpu: Some(GpuState {
                context,
                camera,
                renderer,
            }),
            timing,
        })
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    /// Run one command. No-op after dispose.
    pub fn execute(&mut self, command: EngineCommand) {
        if self.gpu.is_some() {
            self.session.execute(command);
        }
    }

    /// Feed a platform-agnostic input event. No-op after dispose.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.gpu.is_some() {
            self.session.handle_input(event);
        }
    }

    /// Pointer moved, logical pixels from the top-left.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.execute(EngineCommand::PointerMoved { x, y });
    }

    /// Click at logical pixels from the top-left. Returns the id of the
    /// marker hit, if any.
    pub fn on_click(&mut self, x: f32, y: f32) -> Option<String> {
        if self.gpu.is_none() {
            return None;
        }
        self.session.on_click(x, y)
    }

    /// Key press by key name. Returns whether the key was bound.
    pub fn on_key(&mut self, key: &str) -> bool {
        self.gpu.is_some() && self.session.on_key(key)
    }

    /// Window resized to a physical size at `scale_factor` physical pixels
    /// per logical pixel. The surface is reconfigured now; offscreen
    /// targets follow at the start of the next frame.
    pub fn resize(&mut self, physical_width: u32, physical_height: u32, scale_factor: f64) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        gpu.context.resize_surface(physical_width, physical_height);
        let scale = scale_factor.max(f64::EPSILON);
        self.session.request_resize(Viewport::new(
            (f64::from(physical_width) / scale) as f32,
            (f64::from(physical_height) / scale) as f32,
            scale as f32,
        ));
    }

    /// Apply a face image to the skin's face material. Returns `false` for
    /// malformed pixel buffers (the previous face stays).
    pub fn set_face_image(&mut self, rgba: &[u8], width: u32, height: u32) -> bool {
        let Some(gpu) = &mut self.gpu else {
            return false;
        };
        let applied = gpu.renderer.set_face(&gpu.context, rgba, width, height);
        if applied {
            log::info!("face image applied ({width}x{height})");
        } else {
            log::warn!(
                "ignoring face image: {} bytes for {width}x{height}",
                rgba.len()
            );
        }
        applied
    }

    /// Replace the runtime options.
    pub fn set_options(&mut self, options: Options) {
        if let Some(gpu) = &mut self.gpu {
            gpu.renderer.apply_options(&gpu.context.queue, &options);
        }
        self.timing = FrameTiming::new(options.display.target_fps);
        self.session.set_options(options);
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Advance and draw one frame to the surface.
    pub fn render(&mut self) -> FrameOutcome {
        if self.gpu.is_none() {
            return FrameOutcome::Disposed;
        }
        if !self.timing.should_render() {
            return FrameOutcome::Throttled;
        }
        let outcome = self.render_frame();
        self.timing.end_frame();
        outcome
    }

    fn render_frame(&mut self) -> FrameOutcome {
        let Some(gpu) = &mut self.gpu else {
            return FrameOutcome::Disposed;
        };
        let tick = self.session.tick(self.timing.delta());
        if let Some(extent) = tick.resized {
            gpu.renderer.resize(&gpu.context.device, extent);
        }
        if !tick.ready {
            return FrameOutcome::Loading;
        }

        let frame = match gpu.context.get_next_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost; reconfiguring");
                gpu.context.reconfigure();
                return FrameOutcome::SurfaceUnavailable;
            }
            Err(e) => {
                log::warn!("skipping frame: {e}");
                return FrameOutcome::SurfaceUnavailable;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let outcome = Self::encode(gpu, &mut self.session, &view);
        frame.present();
        outcome
    }

    /// Advance and draw one frame into an external view (texture-only
    /// embedding without a surface).
    pub fn render_to_view(&mut self, dt: f32, view: &wgpu::TextureView) -> FrameOutcome {
        let Some(gpu) = &mut self.gpu else {
            return FrameOutcome::Disposed;
        };
        let tick = self.session.tick(dt);
        if let Some(extent) = tick.resized {
            gpu.renderer.resize(&gpu.context.device, extent);
        }
        if !tick.ready {
            return FrameOutcome::Loading;
        }
        Self::encode(gpu, &mut self.session, view)
    }

    fn encode(
        gpu: &mut GpuState,
        session: &mut RevealSession,
        view: &wgpu::TextureView,
    ) -> FrameOutcome {
        let (scene, reveal) = session.render_parts();
        gpu.camera.update(&gpu.context.queue, &scene.orbit.camera);

        let mut encoder = gpu.context.create_encoder();
        let drawn = gpu.renderer.render(
            &gpu.context,
            &mut encoder,
            scene,
            reveal,
            &gpu.camera.bind_group,
            view,
        );
        gpu.context.submit(encoder);
        if drawn {
            FrameOutcome::Rendered
        } else {
            FrameOutcome::Loading
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle & accessors
    // ------------------------------------------------------------------

    /// Release every GPU resource and stop background work. Safe to call
    /// more than once; afterwards every entry point is a no-op.
    pub fn dispose(&mut self) {
        if self.gpu.take().is_some() {
            self.session.shutdown();
            log::info!("engine disposed");
        }
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.gpu.is_none()
    }

    /// The session (discovery, reveal, score, explanations).
    #[must_use]
    pub fn session(&self) -> &RevealSession {
        &self.session
    }

    /// Mutable session, for attaching collaborators.
    pub fn session_mut(&mut self) -> &mut RevealSession {
        &mut self.session
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.timing.fps()
    }
}

impl Drop for XrayEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}
