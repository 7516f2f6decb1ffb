//! Escape-time kernel for `z ← z² + c`.
//!
//! Arithmetic is `f64` throughout. Past the viewport's precision ceiling,
//! neighbouring pixels share the same `c` and classification near the set's
//! boundary becomes noisy; every evaluation still terminates within the budget.

use crate::core::actions::generate_fractal::ports::fractal_algorithm::FractalAlgorithm;
use crate::core::data::complex::Complex;
use crate::core::data::pixel_rect::PixelRect;
use crate::core::data::point::Point;
use crate::core::data::scalar_field::EscapeValue;
use crate::core::data::viewport::Viewport;
use std::f64::consts::LN_2;
use thiserror::Error;

/// `|z| > 2`, compared squared.
pub const ESCAPE_RADIUS_SQUARED: f64 = 4.0;

// An orbit that collapses onto zero after this many steps is periodic.
const COLLAPSE_CHECK_AFTER: u32 = 20;
const COLLAPSE_MAGNITUDE_SQUARED: f64 = 1e-20;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum MandelbrotAlgorithmError {
    #[error("maximum iterations must be greater than zero")]
    ZeroMaxIterations,
}

/// Classifies `c` under a budget of `max_iterations` steps.
///
/// Escape after `k` steps with final magnitude `|z|` yields the smoothed count
/// `k + 1 - ln(ln|z|) / ln 2`.
#[must_use]
#[inline]
pub fn escape_time(c: Complex, max_iterations: u32) -> EscapeValue {
    if in_main_cardioid_or_period_two_bulb(c) {
        return EscapeValue::Interior;
    }

    iterate(c, max_iterations)
}

#[inline]
pub(crate) fn iterate(c: Complex, max_iterations: u32) -> EscapeValue {
    let mut z = Complex::ZERO;

    for iteration in 0..max_iterations {
        z = z * z + c;
        let magnitude_squared = z.magnitude_squared();

        if magnitude_squared > ESCAPE_RADIUS_SQUARED {
            return EscapeValue::Escaped(smoothed_count(iteration + 1, magnitude_squared));
        }

        if iteration >= COLLAPSE_CHECK_AFTER && magnitude_squared < COLLAPSE_MAGNITUDE_SQUARED {
            return EscapeValue::Interior;
        }
    }

    EscapeValue::Interior
}

#[inline]
fn smoothed_count(steps: u32, magnitude_squared: f64) -> f64 {
    let log_magnitude = 0.5 * magnitude_squared.ln();

    f64::from(steps) + 1.0 - log_magnitude.ln() / LN_2
}

#[inline]
fn in_main_cardioid_or_period_two_bulb(c: Complex) -> bool {
    let x_minus = c.real - 0.25;
    let y_squared = c.imag * c.imag;
    let q = x_minus * x_minus + y_squared;

    if q * (q + x_minus) <= 0.25 * y_squared {
        return true;
    }

    let x_plus = c.real + 1.0;
    x_plus * x_plus + y_squared <= 0.0625
}

/// Binds a viewport snapshot and budget so pixels can be evaluated independently.
#[derive(Debug, Clone, PartialEq)]
pub struct MandelbrotAlgorithm {
    viewport: Viewport,
    max_iterations: u32,
}

impl MandelbrotAlgorithm {
    pub fn new(viewport: Viewport, max_iterations: u32) -> Result<Self, MandelbrotAlgorithmError> {
        if max_iterations == 0 {
            return Err(MandelbrotAlgorithmError::ZeroMaxIterations);
        }

        Ok(Self {
            viewport,
            max_iterations,
        })
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
}

impl FractalAlgorithm for MandelbrotAlgorithm {
    type Success = EscapeValue;

    fn pixel_rect(&self) -> PixelRect {
        self.viewport.pixel_rect()
    }

    // Samples the centre of each pixel.
    #[inline]
    fn compute(&self, pixel: Point) -> EscapeValue {
        let c = self
            .viewport
            .pixel_to_plane(f64::from(pixel.x) + 0.5, f64::from(pixel.y) + 0.5);

        escape_time(c, self.max_iterations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centre_of_main_cardioid_is_interior() {
        assert_eq!(escape_time(Complex::new(-0.5, 0.0), 1000), EscapeValue::Interior);
        assert_eq!(iterate(Complex::new(-0.5, 0.0), 1000), EscapeValue::Interior);
    }

    #[test]
    fn test_far_point_escapes_within_two_iterations() {
        let value = escape_time(Complex::new(2.0, 2.0), 1000);
        let smoothed = value.smoothed().expect("(2, 2) must escape");

        assert!(smoothed <= 3.0, "smoothed value {smoothed} implies more than two steps");
        assert_eq!(escape_time(Complex::new(2.0, 2.0), 2), value);
    }

    #[test]
    fn test_cusp_does_not_escape_at_moderate_budgets() {
        assert_eq!(escape_time(Complex::new(0.25, 0.0), 1000), EscapeValue::Interior);
        assert_eq!(iterate(Complex::new(0.25, 0.0), 1000), EscapeValue::Interior);
    }

    #[test]
    fn test_escape_time_is_deterministic() {
        let c = Complex::new(-0.743_643_887, 0.131_825_904);
        let first = escape_time(c, 500);

        for _ in 0..100 {
            assert_eq!(escape_time(c, 500), first);
        }
    }

    #[test]
    fn test_smoothed_count_matches_formula() {
        // c = 1: z1 = 1, z2 = 2, z3 = 5 -> escapes after three steps with |z| = 5.
        let value = escape_time(Complex::new(1.0, 0.0), 100);
        let expected = 3.0 + 1.0 - (0.5 * 25.0_f64.ln()).ln() / LN_2;

        assert_eq!(value, EscapeValue::Escaped(expected));
    }

    #[test]
    fn test_smoothed_values_are_continuous_across_a_band() {
        let a = escape_time(Complex::new(0.3, 0.0), 1000).smoothed().unwrap();
        let b = escape_time(Complex::new(0.3001, 0.0), 1000).smoothed().unwrap();

        assert!((a - b).abs() < 1.0, "{a} vs {b}");
    }

    #[test]
    fn test_zero_budget_is_interior() {
        assert_eq!(escape_time(Complex::new(3.0, 3.0), 0), EscapeValue::Interior);
    }

    #[test]
    fn test_shortcut_agrees_with_plain_iteration() {
        let samples = [
            Complex::new(-0.1, 0.1),
            Complex::new(0.2, 0.3),
            Complex::new(-1.0, 0.1),
            Complex::new(-1.1, 0.0),
            Complex::new(-0.2, 0.5),
        ];

        for c in samples {
            assert!(in_main_cardioid_or_period_two_bulb(c), "{c:?} should be inside");
            assert_eq!(iterate(c, 2000), EscapeValue::Interior, "{c:?}");
        }
    }

    #[test]
    fn test_points_outside_the_set_are_not_short_circuited() {
        for c in [Complex::new(0.5, 0.0), Complex::new(-2.1, 0.0), Complex::new(0.0, 1.1)] {
            assert!(!in_main_cardioid_or_period_two_bulb(c));
            assert!(!escape_time(c, 1000).is_interior(), "{c:?}");
        }
    }

    #[test]
    fn test_non_finite_input_terminates_as_interior() {
        assert_eq!(escape_time(Complex::new(f64::NAN, 0.0), 50), EscapeValue::Interior);
    }

    #[test]
    fn test_algorithm_rejects_zero_iterations() {
        let viewport = Viewport::new(PixelRect::new(4, 4).unwrap());

        assert_eq!(
            MandelbrotAlgorithm::new(viewport, 0),
            Err(MandelbrotAlgorithmError::ZeroMaxIterations)
        );
    }

    #[test]
    fn test_algorithm_samples_pixel_centres() {
        let viewport = Viewport::new(PixelRect::new(2, 2).unwrap());
        let algorithm = MandelbrotAlgorithm::new(viewport, 100).unwrap();
        let expected = escape_time(viewport.pixel_to_plane(1.5, 0.5), 100);

        assert_eq!(algorithm.compute(Point { x: 1, y: 0 }), expected);
    }
}
