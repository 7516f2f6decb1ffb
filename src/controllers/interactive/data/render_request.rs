use crate::core::data::viewport::Viewport;
use crate::core::fractals::mandelbrot::palettes::kinds::PaletteKind;

/// Snapshot of everything one frame depends on.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    pub viewport: Viewport,
    pub max_iterations: u32,
    pub palette: PaletteKind,
    /// Animation phase in radians.
    pub phase: f64,
}

impl RenderRequest {
    /// True when `other` would produce the same escape field, so only colouring differs.
    #[must_use]
    pub fn same_geometry(&self, other: &RenderRequest) -> bool {
        self.viewport == other.viewport && self.max_iterations == other.max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::pixel_rect::PixelRect;

    fn request() -> RenderRequest {
        RenderRequest {
            viewport: Viewport::new(PixelRect::new(8, 6).unwrap()),
            max_iterations: 100,
            palette: PaletteKind::Rainbow,
            phase: 0.0,
        }
    }

    #[test]
    fn test_palette_and_phase_do_not_affect_geometry() {
        let a = request();
        let b = RenderRequest {
            palette: PaletteKind::Matrix,
            phase: 2.0,
            ..request()
        };

        assert!(a.same_geometry(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_budget_and_view_affect_geometry() {
        let a = request();
        let more_iterations = RenderRequest {
            max_iterations: 150,
            ..request()
        };
        let mut panned = request();
        panned.viewport.pan(3.0, 0.0).unwrap();

        assert!(!a.same_geometry(&more_iterations));
        assert!(!a.same_geometry(&panned));
    }
}
