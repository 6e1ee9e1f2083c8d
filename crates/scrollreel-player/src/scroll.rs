//! Scroll position to frame index mapping.

use serde::Serialize;

/// The hero container is this many viewports tall; the sticky canvas stays
/// pinned while the page scrolls through the difference.
pub const HERO_HEIGHT_VIEWPORTS: f64 = 4.0;

/// Layout inputs sampled at event time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollGeometry {
    /// Document offset of the hero container's top edge.
    pub container_top: f64,
    /// Full scroll height of the hero container.
    pub container_height: f64,
    pub viewport_height: f64,
    pub scroll_y: f64,
}

impl ScrollGeometry {
    /// Geometry of a hero at the top of the page, scrolled to `progress`.
    pub fn hero(viewport_height: f64, progress: f64) -> Self {
        let container_height = viewport_height * HERO_HEIGHT_VIEWPORTS;
        let travel = container_height - viewport_height;
        Self {
            container_top: 0.0,
            container_height,
            viewport_height,
            scroll_y: travel * progress.clamp(0.0, 1.0),
        }
    }

    /// Scrollable distance while the canvas is pinned.
    pub fn travel(&self) -> f64 {
        self.container_height - self.viewport_height
    }

    pub fn progress(&self) -> f64 {
        scroll_progress(
            self.container_top,
            self.container_height,
            self.viewport_height,
            self.scroll_y,
        )
    }

    pub fn frame_index(&self, frame_count: usize) -> usize {
        frame_index_for_progress(self.progress(), frame_count)
    }
}

/// Normalized progress through the hero, clamped to `[0, 1]`.
///
/// A container no taller than the viewport has no travel; progress is then 0.
/// Non-finite inputs also yield 0.
pub fn scroll_progress(
    container_top: f64,
    container_height: f64,
    viewport_height: f64,
    scroll_y: f64,
) -> f64 {
    let travel = container_height - viewport_height;
    if !travel.is_finite() || travel <= 0.0 {
        return 0.0;
    }
    let progress = (scroll_y - container_top) / travel;
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, 1.0)
}

/// Frame to show for the given scroll position.
pub fn compute_frame_index(
    container_top: f64,
    container_height: f64,
    viewport_height: f64,
    scroll_y: f64,
    frame_count: usize,
) -> usize {
    let progress = scroll_progress(container_top, container_height, viewport_height, scroll_y);
    frame_index_for_progress(progress, frame_count)
}

fn frame_index_for_progress(progress: f64, frame_count: usize) -> usize {
    let Some(last) = frame_count.checked_sub(1) else {
        return 0;
    };
    let index = (progress * last as f64).floor();
    (index.max(0.0) as usize).min(last)
}
