//! The visible rectangle of the complex plane and its mapping onto the pixel grid.
//!
//! Pixel `(0, 0)` is the top-left corner of the grid. The real axis grows to the
//! right and the imaginary axis grows upward, so increasing `y` moves toward
//! smaller imaginary values. Pixels are square: one pixel spans
//! `2 * half_width / width` plane units on both axes.
//!
//! # Precision ceiling
//!
//! All coordinates are `f64`. Zooming never renormalises to a canonical scale,
//! so after enough zoom-ins the spacing between neighbouring pixels drops below
//! what `f64` can represent around the centre (roughly `1e-15` relative to a
//! half-width of 1–2). Past that point neighbouring pixels collapse onto the same
//! plane value and the image turns blocky or noisy. That is a resolution
//! ceiling of the number format, not a defect. [`ViewportLimits::min_half_width`]
//! stops zooming at the ceiling and [`Viewport::at_precision_limit`] reports when
//! the view is there.

use crate::core::data::complex::Complex;
use crate::core::data::pixel_rect::PixelRect;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_CENTER: Complex = Complex::new(-0.5, 0.0);
pub const DEFAULT_HALF_WIDTH: f64 = 2.0;
/// Zoom factor 1e15 relative to the default half-width.
pub const DEFAULT_MIN_HALF_WIDTH: f64 = DEFAULT_HALF_WIDTH * 1.0e-15;
/// Zoom factor 0.1 relative to the default half-width.
pub const DEFAULT_MAX_HALF_WIDTH: f64 = DEFAULT_HALF_WIDTH * 10.0;

// Pixel spacing below this many ulps of the centre no longer resolves detail.
const PRECISION_ULPS_PER_PIXEL: f64 = 4.0;

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum ViewportError {
    #[error("zoom factor must be finite and positive, got {0}")]
    InvalidZoomFactor(f64),
    #[error("pan delta must be finite, got ({dx}, {dy})")]
    InvalidPanDelta { dx: f64, dy: f64 },
    #[error("half-width must be finite and positive, got {0}")]
    InvalidHalfWidth(f64),
    #[error("half-width limits must satisfy 0 < min <= default <= max, got {min} <= {default} <= {max}")]
    InvalidLimits { min: f64, default: f64, max: f64 },
}

/// Outcome of a zoom request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ZoomOutcome {
    /// The requested factor was applied in full.
    Applied,
    /// The half-width hit a limit; only part of the factor (possibly none) was applied.
    Clamped,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportLimits {
    pub default_center: Complex,
    pub default_half_width: f64,
    pub min_half_width: f64,
    pub max_half_width: f64,
}

impl Default for ViewportLimits {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            default_half_width: DEFAULT_HALF_WIDTH,
            min_half_width: DEFAULT_MIN_HALF_WIDTH,
            max_half_width: DEFAULT_MAX_HALF_WIDTH,
        }
    }
}

impl ViewportLimits {
    pub fn validate(&self) -> Result<(), ViewportError> {
        let ordered = self.min_half_width > 0.0
            && self.min_half_width <= self.default_half_width
            && self.default_half_width <= self.max_half_width
            && self.max_half_width.is_finite();

        if !ordered || !self.default_center.is_finite() {
            return Err(ViewportError::InvalidLimits {
                min: self.min_half_width,
                default: self.default_half_width,
                max: self.max_half_width,
            });
        }

        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    center: Complex,
    half_width: f64,
    pixel_rect: PixelRect,
    limits: ViewportLimits,
}

impl Viewport {
    #[must_use]
    pub fn new(pixel_rect: PixelRect) -> Self {
        let limits = ViewportLimits::default();

        Self {
            center: limits.default_center,
            half_width: limits.default_half_width,
            pixel_rect,
            limits,
        }
    }

    pub fn with_limits(pixel_rect: PixelRect, limits: ViewportLimits) -> Result<Self, ViewportError> {
        limits.validate()?;

        Ok(Self {
            center: limits.default_center,
            half_width: limits.default_half_width,
            pixel_rect,
            limits,
        })
    }

    /// Places the view at an explicit centre and half-width, clamped to the limits.
    pub fn set_view(&mut self, center: Complex, half_width: f64) -> Result<(), ViewportError> {
        if !half_width.is_finite() || half_width <= 0.0 {
            return Err(ViewportError::InvalidHalfWidth(half_width));
        }

        self.center = center;
        self.half_width = half_width.clamp(self.limits.min_half_width, self.limits.max_half_width);
        Ok(())
    }

    #[must_use]
    pub fn center(&self) -> Complex {
        self.center
    }

    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    /// Imaginary-axis half extent, derived from the aspect ratio.
    #[must_use]
    pub fn half_height(&self) -> f64 {
        self.half_width * f64::from(self.pixel_rect.height()) / f64::from(self.pixel_rect.width())
    }

    #[must_use]
    pub fn pixel_rect(&self) -> PixelRect {
        self.pixel_rect
    }

    #[must_use]
    pub fn limits(&self) -> ViewportLimits {
        self.limits
    }

    /// Plane units per pixel.
    #[must_use]
    pub fn scale(&self) -> f64 {
        2.0 * self.half_width / f64::from(self.pixel_rect.width())
    }

    /// Default half-width divided by the current one.
    #[must_use]
    pub fn zoom_factor(&self) -> f64 {
        self.limits.default_half_width / self.half_width
    }

    /// `(real_min, real_max, imag_min, imag_max)` of the visible region.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let half_height = self.half_height();

        (
            self.center.real - self.half_width,
            self.center.real + self.half_width,
            self.center.imag - half_height,
            self.center.imag + half_height,
        )
    }

    #[must_use]
    pub fn pixel_to_plane(&self, px: f64, py: f64) -> Complex {
        let scale = self.scale();
        let (half_w, half_h) = self.half_pixel_extent();

        Complex {
            real: self.center.real + (px - half_w) * scale,
            imag: self.center.imag - (py - half_h) * scale,
        }
    }

    #[must_use]
    pub fn plane_to_pixel(&self, point: Complex) -> (f64, f64) {
        let scale = self.scale();
        let (half_w, half_h) = self.half_pixel_extent();

        (
            (point.real - self.center.real) / scale + half_w,
            half_h - (point.imag - self.center.imag) / scale,
        )
    }

    /// Moves the view so the content follows a drag of `(dx_px, dy_px)` pixels.
    pub fn pan(&mut self, dx_px: f64, dy_px: f64) -> Result<(), ViewportError> {
        if !dx_px.is_finite() || !dy_px.is_finite() {
            return Err(ViewportError::InvalidPanDelta { dx: dx_px, dy: dy_px });
        }

        let scale = self.scale();
        self.center.real -= dx_px * scale;
        self.center.imag += dy_px * scale;
        Ok(())
    }

    /// Scales the half-width by `factor` (`< 1` zooms in).
    ///
    /// With an anchor pixel, the plane point under the anchor stays put.
    pub fn zoom(&mut self, factor: f64, anchor_px: Option<(f64, f64)>) -> Result<ZoomOutcome, ViewportError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ViewportError::InvalidZoomFactor(factor));
        }

        let requested = self.half_width * factor;
        let clamped = requested.clamp(self.limits.min_half_width, self.limits.max_half_width);
        let outcome = if clamped == requested {
            ZoomOutcome::Applied
        } else {
            ZoomOutcome::Clamped
        };

        if requested < self.limits.min_half_width && self.half_width > self.limits.min_half_width {
            warn!(
                zoom_factor = self.limits.default_half_width / clamped,
                "zoom reached the f64 precision ceiling; further zoom-in is ignored"
            );
        }

        let anchor = anchor_px.map(|(ax, ay)| ((ax, ay), self.pixel_to_plane(ax, ay)));
        self.half_width = clamped;

        if let Some(((ax, ay), fixed)) = anchor {
            let scale = self.scale();
            let (half_w, half_h) = self.half_pixel_extent();

            self.center = Complex {
                real: fixed.real - (ax - half_w) * scale,
                imag: fixed.imag + (ay - half_h) * scale,
            };
        }

        Ok(outcome)
    }

    pub fn reset(&mut self) {
        self.center = self.limits.default_center;
        self.half_width = self.limits.default_half_width;
    }

    /// Changes the pixel dimensions; centre and half-width are untouched.
    pub fn resize(&mut self, pixel_rect: PixelRect) {
        self.pixel_rect = pixel_rect;
    }

    /// True once zooming further cannot resolve new detail in `f64`.
    #[must_use]
    pub fn at_precision_limit(&self) -> bool {
        let magnitude = self.center.real.abs().max(self.center.imag.abs()).max(self.half_width);
        let resolvable = magnitude * f64::EPSILON * PRECISION_ULPS_PER_PIXEL;

        self.half_width <= self.limits.min_half_width || self.scale() < resolvable
    }

    fn half_pixel_extent(&self) -> (f64, f64) {
        (
            f64::from(self.pixel_rect.width()) / 2.0,
            f64::from(self.pixel_rect.height()) / 2.0,
        )
    }
}
