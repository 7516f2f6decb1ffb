use crate::core::data::point::Point;
use thiserror::Error;

/// Largest grid accepted, a little over 8K UHD (7680x4320).
pub const MAX_PIXELS: usize = 1 << 25;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum PixelRectError {
    #[error("pixel rect size must be positive: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("pixel rect {width}x{height} exceeds the limit of {max} pixels")]
    TooLarge { width: u32, height: u32, max: usize },
}

/// Pixel grid dimensions with the origin at `(0, 0)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PixelRect {
    width: u32,
    height: u32,
}

impl PixelRect {
    pub fn new(width: u32, height: u32) -> Result<Self, PixelRectError> {
        if width == 0 || height == 0 {
            return Err(PixelRectError::InvalidSize { width, height });
        }

        if u64::from(width) * u64::from(height) > MAX_PIXELS as u64 {
            return Err(PixelRectError::TooLarge {
                width,
                height,
                max: MAX_PIXELS,
            });
        }

        Ok(Self { width, height })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn contains_point(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Row-major index of `point`; the caller guarantees `contains_point`.
    #[must_use]
    pub fn index_of(&self, point: Point) -> usize {
        point.y as usize * self.width as usize + point.x as usize
    }
}
