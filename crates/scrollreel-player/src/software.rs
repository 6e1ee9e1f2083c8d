//! CPU surface and frame decoding, for running the player without a browser.

use std::path::Path;

use scrollreel_core::{Color, FrameBuffer, ReelError, ReelResult, Rect, Size2D};

use crate::render::{FrameImage, Surface};

impl FrameImage for FrameBuffer {
    fn natural_size(&self) -> Option<Size2D> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.size())
    }
}

/// A [`Surface`] backed by an RGBA [`FrameBuffer`].
#[derive(Debug, Clone)]
pub struct SoftwareSurface {
    buffer: FrameBuffer,
}

impl SoftwareSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            buffer: FrameBuffer::new(width, height),
        }
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    /// Paint the whole surface, e.g. to tell later draws apart from untouched pixels.
    pub fn fill(&mut self, color: &Color) {
        self.buffer.fill(color);
    }

    /// Write the current contents as a PNG.
    pub fn save_png(&self, path: &Path) -> ReelResult<()> {
        let image = image::RgbaImage::from_raw(
            self.buffer.width,
            self.buffer.height,
            self.buffer.data.clone(),
        )
        .ok_or_else(|| ReelError::Other("surface buffer has the wrong length".into()))?;
        image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|e| ReelError::Other(format!("failed to write '{}': {}", path.display(), e)))
    }
}

impl Surface for SoftwareSurface {
    type Image = FrameBuffer;

    fn size(&self) -> (u32, u32) {
        (self.buffer.width, self.buffer.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.buffer.resize(width, height);
    }

    fn clear(&mut self) {
        self.buffer.fill(&Color::TRANSPARENT);
    }

    fn draw_image(&mut self, image: &FrameBuffer, dest: Rect) {
        self.buffer.draw_scaled(image, dest);
    }
}

/// Decode a fetched frame (PNG, or anything else `image` recognizes).
pub fn decode_frame(bytes: &[u8]) -> ReelResult<FrameBuffer> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ReelError::Decode(format!("failed to decode frame: {}", e)))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer::from_raw(width, height, rgba.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_frame_png() {
        let fb = decode_frame(&png_bytes(8, 10, [10, 20, 30, 255])).unwrap();
        assert_eq!((fb.width, fb.height), (8, 10));
        assert_eq!(fb.get_pixel(7, 9), Some([10, 20, 30, 255]));
        assert_eq!(fb.natural_size(), Some(Size2D::new(8.0, 10.0)));
    }

    #[test]
    fn test_decode_frame_rejects_garbage() {
        let err = decode_frame(b"<html>404</html>").unwrap_err();
        assert!(matches!(err, ReelError::Decode(_)));
    }

    #[test]
    fn test_empty_buffer_has_no_natural_size() {
        assert_eq!(FrameBuffer::new(0, 4).natural_size(), None);
    }

    #[test]
    fn test_clear_is_transparent() {
        let mut surface = SoftwareSurface::new(2, 2);
        surface.fill(&Color::BLACK);
        surface.clear();
        assert_eq!(surface.buffer().get_pixel(1, 1), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_save_png() {
        let path = std::env::temp_dir().join(format!("scrollreel-surface-{}.png", std::process::id()));
        let mut surface = SoftwareSurface::new(3, 2);
        surface.fill(&Color::BLACK);
        surface.save_png(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(decode_frame(&bytes).unwrap().get_pixel(2, 1), Some([0, 0, 0, 255]));
        std::fs::remove_file(&path).unwrap();
    }
}
