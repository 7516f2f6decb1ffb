use crate::core::data::pixel_rect::PixelRect;
use crate::core::data::point::Point;

/// Per-pixel evaluation used by the tile scheduler.
///
/// Implementations must be pure: the same pixel always yields the same value,
/// whatever thread evaluates it and in whatever order.
pub trait FractalAlgorithm {
    type Success;

    fn pixel_rect(&self) -> PixelRect;

    fn compute(&self, pixel: Point) -> Self::Success;
}
