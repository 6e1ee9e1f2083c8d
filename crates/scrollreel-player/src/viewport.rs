use serde::Serialize;

use crate::render::Surface;

/// Viewport dimensions in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Viewport sizes reported by a browser are floats; negative and
    /// non-finite values collapse to zero.
    pub fn from_f64(width: f64, height: f64) -> Self {
        let px = |v: f64| {
            if v.is_finite() && v > 0.0 {
                v.round().min(u32::MAX as f64) as u32
            } else {
                0
            }
        };
        Self::new(px(width), px(height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Make the surface backing store match the viewport.
///
/// Returns true if the surface was resized (and so may have lost its pixels).
pub fn sync_surface<S: Surface>(surface: &mut S, viewport: ViewportSize) -> bool {
    if surface.size() == (viewport.width, viewport.height) {
        return false;
    }
    surface.set_size(viewport.width, viewport.height);
    true
}
