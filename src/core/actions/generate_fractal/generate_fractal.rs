use crate::core::actions::generate_fractal::ports::fractal_algorithm::FractalAlgorithm;
use crate::core::data::point::Point;

/// Single-threaded row-major evaluation. Reference output for the tile scheduler.
pub fn generate_fractal<Alg: FractalAlgorithm>(algorithm: &Alg) -> Vec<Alg::Success> {
    let pixel_rect = algorithm.pixel_rect();

    (0..pixel_rect.height())
        .flat_map(|y| (0..pixel_rect.width()).map(move |x| Point { x, y }))
        .map(|pixel| algorithm.compute(pixel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::pixel_rect::PixelRect;

    struct StubAlgorithm {
        pixel_rect: PixelRect,
    }

    impl FractalAlgorithm for StubAlgorithm {
        type Success = (u32, u32);

        fn pixel_rect(&self) -> PixelRect {
            self.pixel_rect
        }

        fn compute(&self, pixel: Point) -> Self::Success {
            (pixel.x, pixel.y)
        }
    }

    #[test]
    fn test_results_are_row_major() {
        let algorithm = StubAlgorithm {
            pixel_rect: PixelRect::new(3, 2).unwrap(),
        };

        assert_eq!(
            generate_fractal(&algorithm),
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn test_single_pixel() {
        let algorithm = StubAlgorithm {
            pixel_rect: PixelRect::new(1, 1).unwrap(),
        };

        assert_eq!(generate_fractal(&algorithm), vec![(0, 0)]);
    }
}
