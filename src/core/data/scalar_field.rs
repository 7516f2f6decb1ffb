use crate::core::data::pixel_rect::PixelRect;
use crate::core::data::point::Point;
use thiserror::Error;

/// Result of the escape-time test for one point.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum EscapeValue {
    /// Did not escape within the iteration budget.
    #[default]
    Interior,
    /// Escaped; carries the smoothed (continuous) iteration count.
    Escaped(f64),
}

impl EscapeValue {
    #[must_use]
    pub fn is_interior(&self) -> bool {
        matches!(self, Self::Interior)
    }

    #[must_use]
    pub fn smoothed(&self) -> Option<f64> {
        match self {
            Self::Interior => None,
            Self::Escaped(value) => Some(*value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScalarFieldError {
    #[error("pixel rect size {pixel_rect_size} does not match field size {field_size}")]
    BoundsMismatch { pixel_rect_size: usize, field_size: usize },
    #[error("iteration budget must be greater than zero")]
    ZeroBudget,
}

/// A `width × height` grid of escape values, row-major, tagged with the
/// iteration budget it was computed with.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField {
    pixel_rect: PixelRect,
    max_iterations: u32,
    values: Vec<EscapeValue>,
}

impl ScalarField {
    pub fn from_values(
        pixel_rect: PixelRect,
        max_iterations: u32,
        values: Vec<EscapeValue>,
    ) -> Result<Self, ScalarFieldError> {
        if max_iterations == 0 {
            return Err(ScalarFieldError::ZeroBudget);
        }

        if values.len() != pixel_rect.size() {
            return Err(ScalarFieldError::BoundsMismatch {
                pixel_rect_size: pixel_rect.size(),
                field_size: values.len(),
            });
        }

        Ok(Self {
            pixel_rect,
            max_iterations,
            values,
        })
    }

    #[must_use]
    pub fn pixel_rect(&self) -> PixelRect {
        self.pixel_rect
    }

    #[must_use]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    #[must_use]
    pub fn values(&self) -> &[EscapeValue] {
        &self.values
    }

    #[must_use]
    pub fn get(&self, point: Point) -> Option<EscapeValue> {
        self.pixel_rect
            .contains_point(point)
            .then(|| self.values[self.pixel_rect.index_of(point)])
    }

    #[must_use]
    pub fn interior_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_interior()).count()
    }

    #[must_use]
    pub fn exterior_count(&self) -> usize {
        self.values.len() - self.interior_count()
    }
}
