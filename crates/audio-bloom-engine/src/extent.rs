//! Surface dimensions in pixels

/// Pixel size of a rendering surface (origin top-left, y pointing down)
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// False for zero, negative or non-finite dimensions
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}
