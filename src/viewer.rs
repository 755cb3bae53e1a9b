//! Standalone reveal window backed by winit.
//!
//! ```no_run
//! # use skinbone::Viewer;
//! Viewer::builder()
//!     .with_title("Skinbone")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowId},
};

use crate::{
    engine::FrameOutcome, error::SkinboneError, gpu::render_context::RenderContext,
    gpu::viewport::Viewport, options::Options, InputEvent, MouseButton,
    XrayEngine,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    face: Option<FaceImage>,
    title: String,
}

/// Raw RGBA8 pixels applied to the skin's face after startup.
struct FaceImage {
    rgba: Vec<u8>,
    width: u32,
    height: u32,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            face: None,
            title: "Skinbone".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Apply an RGBA8 face image once the engine is up.
    #[must_use]
    pub fn with_face_image(mut self, rgba: Vec<u8>, width: u32, height: u32) -> Self {
        self.face = Some(FaceImage {
            rgba,
            width,
            height,
        });
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options,
            face: self.face,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window running the x-ray reveal.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Option<Options>,
    face: Option<FaceImage>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`SkinboneError::Viewer`] if the event loop cannot start.
    pub fn run(self) -> Result<(), SkinboneError> {
        let event_loop =
            EventLoop::new().map_err(|e| SkinboneError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            options: self.options,
            face: self.face,
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| SkinboneError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<XrayEngine>,
    options: Option<Options>,
    face: Option<FaceImage>,
    title: String,
}

/// Logical viewport for a window's physical size and scale factor.
fn logical_viewport(inner: winit::dpi::PhysicalSize<u32>, scale: f64) -> Viewport {
    let logical = inner.to_logical::<f64>(scale);
    Viewport::new(logical.width as f32, logical.height as f32, scale as f32)
}

impl ViewerApp {
    fn create_engine(&self, window: &Arc<Window>) -> Result<XrayEngine, SkinboneError> {
        let inner = window.inner_size();
        let context = pollster::block_on(RenderContext::new(
            Arc::clone(window),
            (inner.width.max(1), inner.height.max(1)),
        ))?;
        let options = self.options.clone().unwrap_or_default();
        XrayEngine::new(context, options, logical_viewport(inner, window.scale_factor()))
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map_or(1.0, |w| w.scale_factor())
    }

    fn request_redraw(&self) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (mon_size.width as f64 / scale * 0.75) as u32;
            let logical_h = (mon_size.height as f64 / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(logical_w, logical_h))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut engine = match self.create_engine(&window) {
            Ok(e) => e,
            Err(e) => {
                log::error!("Failed to initialize engine: {e}");
                event_loop.exit();
                return;
            }
        };

        if let Some(face) = self.face.take() {
            let _ = engine.set_face_image(&face.rgba, face.width, face.height);
        }

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            if let Some(engine) = &mut self.engine {
                engine.dispose();
            }
            event_loop.exit();
            return;
        }

        let scale = self.scale_factor();
        let Some(engine) = &mut self.engine else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => {
                engine.resize(size.width, size.height, scale);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(inner) = self.window.as_ref().map(|w| w.inner_size()) {
                    engine.resize(inner.width, inner.height, scale_factor);
                }
            }

            WindowEvent::RedrawRequested => {
                match engine.render() {
                    FrameOutcome::Disposed => {
                        event_loop.exit();
                        return;
                    }
                    FrameOutcome::SurfaceUnavailable => {
                        log::debug!("surface unavailable; retrying next frame");
                    }
                    _ => {}
                }
                self.request_redraw();
            }

            WindowEvent::MouseInput { button, state, .. } => {
                engine.handle_input(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(scale);
                engine.handle_input(InputEvent::CursorMoved {
                    x: logical.x as f32,
                    y: logical.y as f32,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                engine.handle_input(InputEvent::Scroll {
                    delta: scroll_delta,
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let key_str = format!("{code:?}");
                if !engine.on_key(&key_str) {
                    log::trace!("unbound key {key_str}");
                }
            }

            _ => (),
        }
    }
}
