//! Cover-fit drawing of sequence frames.

use scrollreel_core::{Rect, Size2D};

use crate::frame_set::{FrameSet, FrameState};

/// A decoded (or browser-owned) frame image.
pub trait FrameImage {
    /// Intrinsic pixel size, or `None` while the image has no usable pixels.
    fn natural_size(&self) -> Option<Size2D>;
}

/// A drawing target with a pixel backing store.
pub trait Surface {
    type Image: FrameImage;

    /// Backing-store size in pixels.
    fn size(&self) -> (u32, u32);

    /// Resize the backing store. Implementations may discard contents.
    fn set_size(&mut self, width: u32, height: u32);

    /// Erase the whole surface to transparent.
    fn clear(&mut self);

    /// Draw `image` scaled into `dest`, which may overflow the surface.
    fn draw_image(&mut self, image: &Self::Image, dest: Rect);
}

/// Placement that fills `canvas` with `image`, preserving aspect ratio and
/// centering the overflow on the cropped axis.
///
/// Returns `None` when either size is degenerate.
pub fn cover_fit(canvas: Size2D, image: Size2D) -> Option<Rect> {
    if canvas.is_empty() || image.is_empty() {
        return None;
    }

    let canvas_ratio = canvas.aspect_ratio();
    let image_ratio = image.aspect_ratio();

    if image_ratio > canvas_ratio {
        // Wider than the canvas: match heights, crop the sides.
        let draw_height = canvas.height;
        let draw_width = canvas.height * image.width / image.height;
        Some(Rect::new(
            (canvas.width - draw_width) / 2.0,
            0.0,
            draw_width,
            draw_height,
        ))
    } else {
        // Taller (or equal): match widths, crop top and bottom.
        let draw_width = canvas.width;
        let draw_height = canvas.width * image.height / image.width;
        Some(Rect::new(
            0.0,
            (canvas.height - draw_height) / 2.0,
            draw_width,
            draw_height,
        ))
    }
}

/// Why a draw request left the surface untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OutOfRange,
    Pending,
    Failed,
    EmptyImage,
    EmptySurface,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawOutcome {
    Drawn { index: usize, dest: Rect },
    Skipped { index: usize, reason: SkipReason },
}

impl DrawOutcome {
    pub fn is_drawn(&self) -> bool {
        matches!(self, DrawOutcome::Drawn { .. })
    }
}

/// Sole writer of the player's surface.
#[derive(Debug, Default)]
pub struct CanvasRenderer {
    last_drawn: Option<usize>,
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the most recent frame that actually reached the surface.
    pub fn last_drawn(&self) -> Option<usize> {
        self.last_drawn
    }

    /// Clear the surface and draw frame `index` cover-fitted.
    ///
    /// Frames that are missing, pending or failed are skipped without
    /// touching the surface, so whatever was drawn last stays visible.
    pub fn draw<S: Surface>(
        &mut self,
        surface: &mut S,
        frames: &FrameSet<S::Image>,
        index: usize,
    ) -> DrawOutcome {
        let skip = |reason| DrawOutcome::Skipped { index, reason };

        let image = match frames.state(index) {
            None => return skip(SkipReason::OutOfRange),
            Some(FrameState::Pending) => return skip(SkipReason::Pending),
            Some(FrameState::Failed) => return skip(SkipReason::Failed),
            Some(FrameState::Loaded(image)) => image,
        };
        let Some(image_size) = image.natural_size() else {
            return skip(SkipReason::EmptyImage);
        };
        let canvas_size = Size2D::from(surface.size());
        let Some(dest) = cover_fit(canvas_size, image_size) else {
            let reason = if canvas_size.is_empty() {
                SkipReason::EmptySurface
            } else {
                SkipReason::EmptyImage
            };
            tracing::debug!("skipping frame {}: {:?}", index, reason);
            return skip(reason);
        };

        surface.clear();
        surface.draw_image(image, dest);
        self.last_drawn = Some(index);
        DrawOutcome::Drawn { index, dest }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_fit_tall_image_on_wide_canvas() {
        let dest = cover_fit(Size2D::new(1920.0, 1080.0), Size2D::new(800.0, 1000.0)).unwrap();
        assert_eq!(dest, Rect::new(0.0, -660.0, 1920.0, 2400.0));
    }

    #[test]
    fn test_cover_fit_wide_image_on_tall_canvas() {
        // 2:1 image on a 1:1 canvas: height matches, sides cropped.
        let dest = cover_fit(Size2D::new(500.0, 500.0), Size2D::new(1000.0, 500.0)).unwrap();
        assert_eq!(dest, Rect::new(-250.0, 0.0, 1000.0, 500.0));
    }

    #[test]
    fn test_cover_fit_same_ratio_fills_exactly() {
        let dest = cover_fit(Size2D::new(1920.0, 1080.0), Size2D::new(960.0, 540.0)).unwrap();
        assert_eq!(dest, Rect::new(0.0, 0.0, 1920.0, 1080.0));
    }

    #[test]
    fn test_cover_fit_always_covers() {
        let canvases = [(1920.0, 1080.0), (390.0, 844.0), (1024.0, 1024.0)];
        let images = [(1280.0, 720.0), (720.0, 1280.0), (300.0, 299.0)];
        for (cw, ch) in canvases {
            for (iw, ih) in images {
                let dest = cover_fit(Size2D::new(cw, ch), Size2D::new(iw, ih)).unwrap();
                assert!(dest.x <= 0.0 && dest.y <= 0.0);
                assert!(dest.right() >= cw - 1e-9 && dest.bottom() >= ch - 1e-9);
                assert!((dest.width / dest.height - iw / ih).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_draw_on_zero_size_surface_is_skipped() {
        use crate::frame_set::Generation;
        use crate::software::SoftwareSurface;
        use scrollreel_core::{Color, FrameBuffer};

        let mut frames = FrameSet::new(Generation::first(), 2);
        assert!(frames.mark_loaded(1, FrameBuffer::solid(8, 10, &Color::BLACK)));

        let mut surface = SoftwareSurface::new(0, 108);
        let mut renderer = CanvasRenderer::new();
        assert_eq!(
            renderer.draw(&mut surface, &frames, 1),
            DrawOutcome::Skipped {
                index: 1,
                reason: SkipReason::EmptySurface
            }
        );
        assert_eq!(renderer.last_drawn(), None);
        assert_eq!(surface.size(), (0, 108));
    }

    #[test]
    fn test_cover_fit_degenerate() {
        assert!(cover_fit(Size2D::new(0.0, 1080.0), Size2D::new(800.0, 1000.0)).is_none());
        assert!(cover_fit(Size2D::new(1920.0, 1080.0), Size2D::new(800.0, 0.0)).is_none());
    }
}
