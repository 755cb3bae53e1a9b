//! Browser host: runs an [`XrayEngine`] on an HTML canvas.
//!
//! The page owns the single [`WebHost`] instance, forwards DOM events to it,
//! drives [`WebHost::frame`] from `requestAnimationFrame`, and calls
//! [`WebHost::dispose`] before hot-reloading or leaving the page.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::{
    engine::FrameOutcome, gpu::render_context::RenderContext, gpu::viewport::Viewport,
    options::Options, XrayEngine,
};

/// Install the panic hook and console logger. Runs once on module load.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn find_canvas(canvas_id: &str) -> Result<(web_sys::Window, web_sys::HtmlCanvasElement), JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window.document().ok_or_else(|| js_error("no document"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| js_error(format!("missing #{canvas_id}")))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| js_error(format!("#{canvas_id} is not a canvas")))?;
    Ok((window, canvas))
}

/// A running engine bound to one canvas.
#[wasm_bindgen]
pub struct WebHost {
    engine: XrayEngine,
    canvas: web_sys::HtmlCanvasElement,
}

#[wasm_bindgen]
impl WebHost {
    /// Create the GPU context on `#canvas_id` and start the engine.
    /// `options_toml` may be empty for defaults.
    pub async fn start(canvas_id: String, options_toml: String) -> Result<WebHost, JsValue> {
        let (window, canvas) = find_canvas(&canvas_id)?;
        let options = if options_toml.trim().is_empty() {
            Options::default()
        } else {
            Options::from_toml(&options_toml).map_err(js_error)?
        };

        let ratio = window.device_pixel_ratio() as f32;
        let viewport = Viewport::new(
            canvas.client_width() as f32,
            canvas.client_height() as f32,
            ratio,
        );
        let physical = viewport.render_extent(options.display.max_pixel_ratio);
        canvas.set_width(physical.width);
        canvas.set_height(physical.height);

        let context = RenderContext::new(
            wgpu::SurfaceTarget::Canvas(canvas.clone()),
            (physical.width, physical.height),
        )
        .await
        .map_err(js_error)?;
        let engine = XrayEngine::new(context, options, viewport).map_err(js_error)?;
        Ok(Self { engine, canvas })
    }

    /// Pointer position in CSS pixels relative to the canvas.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.engine.on_pointer_move(x, y);
    }

    /// Click in CSS pixels. Returns the id of the marker hit, if any.
    pub fn click(&mut self, x: f32, y: f32) -> Option<String> {
        self.engine.on_click(x, y)
    }

    /// Key press by `KeyboardEvent.code`. Returns whether it was bound.
    pub fn key(&mut self, code: &str) -> bool {
        self.engine.on_key(code)
    }

    /// Canvas resized to `width`×`height` CSS pixels at `ratio`.
    pub fn resize(&mut self, width: f32, height: f32, ratio: f32) {
        let physical_w = (width * ratio).round().max(1.0) as u32;
        let physical_h = (height * ratio).round().max(1.0) as u32;
        self.canvas.set_width(physical_w);
        self.canvas.set_height(physical_h);
        self.engine.resize(physical_w, physical_h, f64::from(ratio));
    }

    /// Advance and draw one frame. Returns `false` once disposed.
    pub fn frame(&mut self) -> bool {
        !matches!(self.engine.render(), FrameOutcome::Disposed)
    }

    /// Apply an RGBA8 face image.
    pub fn set_face(&mut self, rgba: &[u8], width: u32, height: u32) -> bool {
        self.engine.set_face_image(rgba, width, height)
    }

    /// Current score.
    pub fn score(&self) -> u32 {
        self.engine.session().score().score()
    }

    /// Explanation text for a discovered condition, empty if none yet.
    pub fn explanation(&self, id: &str) -> String {
        self.engine
            .session()
            .explanation(id)
            .map(|e| e.text.clone())
            .unwrap_or_default()
    }

    /// Tear down GPU resources. Safe to call more than once.
    pub fn dispose(&mut self) {
        self.engine.dispose();
    }
}
