use serde::{Deserialize, Serialize};

/// A 2D size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f64,
    pub height: f64,
}

impl Size2D {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Compute the aspect ratio (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0.0 {
            return 0.0;
        }
        self.width / self.height
    }

    /// True when either side is zero, negative or not finite.
    pub fn is_empty(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

impl From<(u32, u32)> for Size2D {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// An axis-aligned rectangle. Origin may be negative when the rectangle
/// overflows its container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size2D {
        Size2D::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// The overlapping region of two rectangles, if any.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x || bottom <= y {
            return None;
        }
        Some(Rect::new(x, y, right - x, bottom - y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_aspect_ratio() {
        let s = Size2D::new(1920.0, 1080.0);
        assert!((s.aspect_ratio() - 16.0 / 9.0).abs() < 0.01);
        assert_eq!(Size2D::new(10.0, 0.0).aspect_ratio(), 0.0);
    }

    #[test]
    fn test_size_is_empty() {
        assert!(Size2D::new(0.0, 10.0).is_empty());
        assert!(Size2D::new(10.0, -1.0).is_empty());
        assert!(Size2D::new(f64::NAN, 10.0).is_empty());
        assert!(!Size2D::new(1.0, 1.0).is_empty());
    }

    #[test]
    fn test_rect_intersect() {
        let canvas = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let overflow = Rect::new(0.0, -660.0, 1920.0, 2400.0);
        assert_eq!(canvas.intersect(&overflow), Some(canvas));

        let outside = Rect::new(2000.0, 0.0, 10.0, 10.0);
        assert_eq!(canvas.intersect(&outside), None);
    }
}
