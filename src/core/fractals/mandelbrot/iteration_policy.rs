//! Adaptive iteration budget.
//!
//! The automatic budget grows logarithmically with zoom:
//!
//! ```text
//! auto(half_width) = base + per_octave * log2(default_half_width / half_width)
//! ```
//!
//! where zoom-outs (`half_width > default_half_width`) contribute nothing. The
//! user can offset the result in either direction; the effective budget is
//! `clamp(auto + cumulative_delta, min, max)`.

use serde::Deserialize;
use thiserror::Error;

use crate::core::data::viewport::DEFAULT_HALF_WIDTH;

#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum IterationPolicyError {
    #[error("iteration bounds must satisfy 1 <= min <= max, got {min}..={max}")]
    InvalidBounds { min: u32, max: u32 },
    #[error("iterations per octave must be finite and non-negative, got {0}")]
    InvalidSlope(f64),
    #[error("reference half-width must be finite and positive, got {0}")]
    InvalidReference(f64),
}

#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IterationSettings {
    pub min_iterations: u32,
    pub max_iterations: u32,
    pub base_iterations: u32,
    pub iterations_per_octave: f64,
    /// Iterations added or removed per quality step.
    pub adjust_step: u32,
    /// Upper bound on `pixels × budget` for a single frame.
    pub max_work_per_frame: u64,
}

impl Default for IterationSettings {
    fn default() -> Self {
        Self {
            min_iterations: 50,
            max_iterations: 2000,
            base_iterations: 100,
            iterations_per_octave: 24.0,
            adjust_step: 50,
            max_work_per_frame: 4_000_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IterationPolicy {
    settings: IterationSettings,
    reference_half_width: f64,
    cumulative_delta: i64,
}

impl IterationPolicy {
    pub fn new(settings: IterationSettings, reference_half_width: f64) -> Result<Self, IterationPolicyError> {
        if settings.min_iterations == 0 || settings.min_iterations > settings.max_iterations {
            return Err(IterationPolicyError::InvalidBounds {
                min: settings.min_iterations,
                max: settings.max_iterations,
            });
        }

        if !settings.iterations_per_octave.is_finite() || settings.iterations_per_octave < 0.0 {
            return Err(IterationPolicyError::InvalidSlope(settings.iterations_per_octave));
        }

        if !reference_half_width.is_finite() || reference_half_width <= 0.0 {
            return Err(IterationPolicyError::InvalidReference(reference_half_width));
        }

        Ok(Self {
            settings,
            reference_half_width,
            cumulative_delta: 0,
        })
    }

    #[must_use]
    pub fn settings(&self) -> &IterationSettings {
        &self.settings
    }

    #[must_use]
    pub fn cumulative_delta(&self) -> i64 {
        self.cumulative_delta
    }

    /// Zoom-derived budget, ignoring the user offset.
    #[must_use]
    pub fn budget_for(&self, half_width: f64) -> u32 {
        let octaves = if half_width.is_finite() && half_width > 0.0 {
            (self.reference_half_width / half_width).log2().max(0.0)
        } else {
            0.0
        };

        let auto = f64::from(self.settings.base_iterations) + self.settings.iterations_per_octave * octaves;
        self.clamp(auto.round() as i64)
    }

    /// Budget after applying the user offset.
    #[must_use]
    pub fn effective_budget(&self, half_width: f64) -> u32 {
        self.clamp(i64::from(self.budget_for(half_width)) + self.cumulative_delta)
    }

    /// Nudges the effective budget by `delta` iterations.
    pub fn adjust(&mut self, delta: i64) {
        let limit = i64::from(self.settings.max_iterations);
        self.cumulative_delta = self.cumulative_delta.saturating_add(delta).clamp(-limit, limit);
    }

    /// Nudges the effective budget by whole quality steps.
    pub fn adjust_steps(&mut self, steps: i32) {
        self.adjust(i64::from(steps) * i64::from(self.settings.adjust_step));
    }

    pub fn reset_adjustment(&mut self) {
        self.cumulative_delta = 0;
    }

    /// Lowers `budget` so `pixel_count × budget` stays within the per-frame work
    /// limit, never going below the minimum budget.
    #[must_use]
    pub fn capped_for_pixels(&self, budget: u32, pixel_count: usize) -> u32 {
        let pixels = (pixel_count as u64).max(1);
        let affordable = self.settings.max_work_per_frame / pixels;
        let affordable = u32::try_from(affordable).unwrap_or(u32::MAX);

        budget.min(affordable).max(self.settings.min_iterations)
    }

    fn clamp(&self, value: i64) -> u32 {
        let clamped = value.clamp(
            i64::from(self.settings.min_iterations),
            i64::from(self.settings.max_iterations),
        );

        // In range of u32 by construction.
        clamped as u32
    }
}

impl Default for IterationPolicy {
    fn default() -> Self {
        Self {
            settings: IterationSettings::default(),
            reference_half_width: DEFAULT_HALF_WIDTH,
            cumulative_delta: 0,
        }
    }
}
