//! [`Surface`] over an HTML canvas 2D context.

use glam::DVec2;
use plexus_core::{BackdropError, Srgb, Surface};
use std::f64::consts::TAU;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// Draws onto a `<canvas>` through its `2d` context.
///
/// Styles are CSS `rgba()` strings; link opacity goes into the stroke color
/// rather than `globalAlpha` so each line carries its own alpha.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Looks up `id` in the current document and acquires its 2D context.
    pub fn from_element_id(id: &str) -> Result<Self, BackdropError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| BackdropError::SurfaceUnavailable("no document".into()))?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| BackdropError::SurfaceUnavailable(format!("no element #{id}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| BackdropError::SurfaceUnavailable(format!("#{id} is not a canvas")))?;
        Self::from_canvas(canvas)
    }

    pub fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self, BackdropError> {
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .ok_or_else(|| BackdropError::SurfaceUnavailable("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| BackdropError::SurfaceUnavailable("unexpected context type".into()))?;
        Ok(Self { canvas, context })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn resize(&mut self, width: u32, height: u32) {
        // assigning the size resets the bitmap to transparent
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        self.context.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Srgb) {
        self.context.begin_path();
        let _ = self.context.arc(center.x, center.y, radius, 0.0, TAU);
        #[allow(deprecated)]
        self.context
            .set_fill_style(&JsValue::from_str(&color.to_css_rgba(1.0)));
        self.context.fill();
    }

    fn stroke_line(&mut self, from: DVec2, to: DVec2, color: Srgb, alpha: f64, width: f64) {
        self.context.begin_path();
        #[allow(deprecated)]
        self.context
            .set_stroke_style(&JsValue::from_str(&color.to_css_rgba(alpha)));
        self.context.set_line_width(width);
        self.context.move_to(from.x, from.y);
        self.context.line_to(to.x, to.y);
        self.context.stroke();
    }
}
