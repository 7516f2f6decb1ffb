//! Explorer configuration loaded from JSON.
//!
//! Every section and field is optional; missing values fall back to the
//! defaults below.
//!
//! ```json
//! {
//!   "viewport": { "width": 1200, "height": 800, "center_re": -0.5 },
//!   "iterations": { "base_iterations": 100, "adjust_step": 50 },
//!   "render": { "workers": 8, "band_rows": 16, "colour_cache": true },
//!   "palette": { "initial": "fire", "phase_speed": 1.2 }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::controllers::interactive::animation::DEFAULT_PHASE_SPEED;
use crate::controllers::interactive::controller::ControllerSettings;
use crate::core::data::complex::Complex;
use crate::core::data::pixel_rect::{PixelRect, PixelRectError};
use crate::core::data::viewport::{
    DEFAULT_CENTER, DEFAULT_HALF_WIDTH, DEFAULT_MAX_HALF_WIDTH, DEFAULT_MIN_HALF_WIDTH, ViewportError, ViewportLimits,
};
use crate::core::fractals::mandelbrot::iteration_policy::{IterationPolicy, IterationPolicyError, IterationSettings};
use crate::core::fractals::mandelbrot::palettes::kinds::PaletteKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] serde_json::Error),
    #[error("invalid image size")]
    Size(#[from] PixelRectError),
    #[error("invalid viewport settings")]
    Viewport(#[from] ViewportError),
    #[error("invalid iteration settings")]
    Iterations(#[from] IterationPolicyError),
    #[error("band_rows must be greater than zero")]
    ZeroBandRows,
    #[error("workers must be greater than zero when set")]
    ZeroWorkers,
    #[error("zoom_step must be finite and greater than 1, got {0}")]
    InvalidZoomStep(f64),
    #[error("phase_speed must be finite, got {0}")]
    InvalidPhaseSpeed(f64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub center_re: f64,
    pub center_im: f64,
    pub half_width: f64,
    pub min_half_width: f64,
    pub max_half_width: f64,
    /// Half-width divisor for one scroll step.
    pub zoom_step: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            center_re: DEFAULT_CENTER.real,
            center_im: DEFAULT_CENTER.imag,
            half_width: DEFAULT_HALF_WIDTH,
            min_half_width: DEFAULT_MIN_HALF_WIDTH,
            max_half_width: DEFAULT_MAX_HALF_WIDTH,
            zoom_step: 1.2,
        }
    }
}

impl ViewportConfig {
    pub fn pixel_rect(&self) -> Result<PixelRect, PixelRectError> {
        PixelRect::new(self.width, self.height)
    }

    #[must_use]
    pub fn limits(&self) -> ViewportLimits {
        ViewportLimits {
            default_center: Complex::new(self.center_re, self.center_im),
            default_half_width: self.half_width,
            min_half_width: self.min_half_width,
            max_half_width: self.max_half_width,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub initial: PaletteKind,
    /// Animation speed in radians per second.
    pub phase_speed: f64,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            initial: PaletteKind::default(),
            phase_speed: DEFAULT_PHASE_SPEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub viewport: ViewportConfig,
    pub iterations: IterationSettings,
    pub render: ControllerSettings,
    pub palette: PaletteConfig,
}

impl ExplorerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.viewport.pixel_rect()?;
        self.viewport.limits().validate()?;
        IterationPolicy::new(self.iterations, self.viewport.half_width)?;

        if self.render.scheduler.band_rows == 0 {
            return Err(ConfigError::ZeroBandRows);
        }

        if self.render.scheduler.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }

        if !self.viewport.zoom_step.is_finite() || self.viewport.zoom_step <= 1.0 {
            return Err(ConfigError::InvalidZoomStep(self.viewport.zoom_step));
        }

        if !self.palette.phase_speed.is_finite() {
            return Err(ConfigError::InvalidPhaseSpeed(self.palette.phase_speed));
        }

        Ok(())
    }
}
