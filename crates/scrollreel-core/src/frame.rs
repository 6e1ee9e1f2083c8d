use crate::error::{ReelError, ReelResult};
use crate::math::{Rect, Size2D};
use crate::Color;

const BYTES_PER_PIXEL: usize = 4;

/// An 8-bit RGBA raster, used both for decoded sequence frames and for the
/// software drawing surface.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    /// Raw pixel data, row-major RGBA.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros (transparent black).
    pub fn new(width: u32, height: u32) -> Self {
        let size = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        Self {
            data: vec![0u8; size],
            width,
            height,
        }
    }

    /// Create a frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &Color) -> Self {
        let mut fb = Self::new(width, height);
        fb.fill(color);
        fb
    }

    /// Wrap raw RGBA bytes, checking the length against the dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> ReelResult<Self> {
        let expected = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(ReelError::InvalidArgument(format!(
                "expected {} bytes for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn size(&self) -> Size2D {
        Size2D::from((self.width, self.height))
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Overwrite every pixel with `color`.
    pub fn fill(&mut self, color: &Color) {
        let pixel = color.to_rgba8();
        for chunk in self.data.chunks_exact_mut(BYTES_PER_PIXEL) {
            chunk.copy_from_slice(&pixel);
        }
    }

    /// Reallocate to new dimensions. Like a canvas, resizing discards the
    /// previous contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.data[offset..offset + BYTES_PER_PIXEL]);
        Some(px)
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset(x, y);
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    /// Copy `src` scaled into `dest` (which may extend past the buffer edges)
    /// using nearest-neighbour sampling. Pixels outside the buffer are clipped.
    pub fn draw_scaled(&mut self, src: &FrameBuffer, dest: Rect) {
        if src.width == 0 || src.height == 0 || dest.size().is_empty() {
            return;
        }
        let bounds = Rect::new(0.0, 0.0, self.width as f64, self.height as f64);
        let Some(visible) = bounds.intersect(&dest) else {
            return;
        };

        let scale_x = src.width as f64 / dest.width;
        let scale_y = src.height as f64 / dest.height;

        let x0 = visible.x.floor() as u32;
        let y0 = visible.y.floor() as u32;
        let x1 = (visible.right().ceil() as u32).min(self.width);
        let y1 = (visible.bottom().ceil() as u32).min(self.height);

        for y in y0..y1 {
            let sy = (((y as f64 + 0.5) - dest.y) * scale_y).floor();
            if sy < 0.0 {
                continue;
            }
            let sy = (sy as u32).min(src.height - 1);
            for x in x0..x1 {
                let sx = (((x as f64 + 0.5) - dest.x) * scale_x).floor();
                if sx < 0.0 {
                    continue;
                }
                let sx = (sx as u32).min(src.width - 1);
                if let Some(px) = src.get_pixel(sx, sy) {
                    self.set_pixel(x, y, px);
                }
            }
        }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * BYTES_PER_PIXEL
    }
}
