//! Canvas 2D surface for the scroll player.

use scrollreel_core::{Rect, Size2D};
use scrollreel_player::{FrameImage, Surface};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

/// A sequence frame held by the browser.
#[derive(Debug, Clone)]
pub struct CanvasImage(pub HtmlImageElement);

impl FrameImage for CanvasImage {
    fn natural_size(&self) -> Option<Size2D> {
        let img = &self.0;
        if !img.complete() || img.natural_width() == 0 || img.natural_height() == 0 {
            return None;
        }
        Some(Size2D::from((img.natural_width(), img.natural_height())))
    }
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas 2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(JsValue::from)?;
        Ok(Self { canvas, ctx })
    }
}

impl Surface for CanvasSurface {
    type Image = CanvasImage;

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    fn clear(&mut self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w as f64, h as f64);
    }

    fn draw_image(&mut self, image: &CanvasImage, dest: Rect) {
        if let Err(err) = self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
            &image.0,
            dest.x,
            dest.y,
            dest.width,
            dest.height,
        ) {
            web_sys::console::warn_2(&JsValue::from_str("drawImage failed"), &err);
        }
    }
}
