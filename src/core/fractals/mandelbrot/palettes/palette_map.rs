use std::f64::consts::TAU;

use crate::core::actions::generate_pixel_buffer::ports::colour_map::ColourMap;
use crate::core::data::colour::Colour;
use crate::core::data::scalar_field::EscapeValue;
use crate::core::fractals::mandelbrot::palettes::colour_cache::{COLOUR_LEVELS, ColourCache};
use crate::core::fractals::mandelbrot::palettes::gradients::{evaluate, intensity_for};
use crate::core::fractals::mandelbrot::palettes::kinds::PaletteKind;

/// Number of distinct animation phases per `2π`.
pub const PHASE_BUCKETS: u32 = 256;

/// Bucket index for a phase in radians; any finite phase is accepted.
#[must_use]
pub fn phase_bucket(phase: f64) -> u32 {
    if !phase.is_finite() {
        return 0;
    }

    let turns = phase.rem_euclid(TAU) / TAU;
    ((turns * f64::from(PHASE_BUCKETS)).floor() as u32) % PHASE_BUCKETS
}

#[must_use]
pub fn bucket_phase(bucket: u32) -> f64 {
    f64::from(bucket % PHASE_BUCKETS) * TAU / f64::from(PHASE_BUCKETS)
}

/// Quantised level of a smoothed count under `max_iterations`, in `0..=COLOUR_LEVELS`.
#[must_use]
#[inline]
pub fn colour_level(smoothed: f64, max_iterations: u32) -> usize {
    let t = (smoothed / f64::from(max_iterations.max(1))).clamp(0.0, 1.0);

    if t.is_nan() {
        return 0;
    }

    (t * COLOUR_LEVELS as f64).round() as usize
}

/// Colours escape values for one palette at one animation phase.
///
/// Both the value and the phase are quantised before the palette runs, so
/// output is identical with or without a cache.
#[derive(Debug, Clone, Copy)]
pub struct PaletteMap<'a> {
    kind: PaletteKind,
    phase_bucket: u32,
    max_iterations: u32,
    cache: Option<&'a ColourCache>,
}

impl<'a> PaletteMap<'a> {
    #[must_use]
    pub fn new(kind: PaletteKind, phase: f64, max_iterations: u32) -> Self {
        // Static palettes share one bucket so their cache survives phase changes.
        let phase_bucket = if kind.is_animated() { phase_bucket(phase) } else { 0 };

        Self {
            kind,
            phase_bucket,
            max_iterations,
            cache: None,
        }
    }

    /// Reuses `cache`, which must already be prepared for this palette and phase bucket.
    #[must_use]
    pub fn with_cache(mut self, cache: &'a ColourCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn kind(&self) -> PaletteKind {
        self.kind
    }

    #[must_use]
    pub fn phase_bucket(&self) -> u32 {
        self.phase_bucket
    }

    fn colour_for_level(&self, level: usize) -> Colour {
        let t = level as f64 / COLOUR_LEVELS as f64;

        evaluate(self.kind, t, intensity_for(t), bucket_phase(self.phase_bucket))
    }
}

impl ColourMap for PaletteMap<'_> {
    type T = EscapeValue;

    #[inline]
    fn map(&self, value: EscapeValue) -> Colour {
        let smoothed = match value {
            EscapeValue::Interior => return self.kind.interior_colour(),
            EscapeValue::Escaped(smoothed) => smoothed,
        };

        let level = colour_level(smoothed, self.max_iterations);

        match self.cache {
            Some(cache) => cache.get_or_insert_with(level, || self.colour_for_level(level)),
            None => self.colour_for_level(level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_is_black_for_every_palette() {
        for &kind in PaletteKind::ALL {
            let map = PaletteMap::new(kind, 1.0, 100);

            assert_eq!(map.map(EscapeValue::Interior), Colour::BLACK);
        }
    }

    #[test]
    fn test_phase_bucket_wraps() {
        assert_eq!(phase_bucket(0.0), 0);
        assert_eq!(phase_bucket(TAU), 0);
        assert_eq!(phase_bucket(-TAU / 2.0), PHASE_BUCKETS / 2);
        assert_eq!(phase_bucket(f64::NAN), 0);
        assert!(phase_bucket(TAU - 1e-9) < PHASE_BUCKETS);
    }

    #[test]
    fn test_bucket_phase_round_trips() {
        for bucket in [0, 1, 17, 128, 255] {
            assert_eq!(phase_bucket(bucket_phase(bucket) + 1e-9), bucket);
        }
    }

    #[test]
    fn test_colour_level_clamps() {
        assert_eq!(colour_level(-5.0, 100), 0);
        assert_eq!(colour_level(0.0, 100), 0);
        assert_eq!(colour_level(50.0, 100), COLOUR_LEVELS / 2);
        assert_eq!(colour_level(150.0, 100), COLOUR_LEVELS);
        assert_eq!(colour_level(f64::NAN, 100), 0);
    }

    #[test]
    fn test_cached_and_uncached_agree() {
        let mut cache = ColourCache::new();

        for &kind in PaletteKind::ALL {
            let phase = 2.5;
            let plain = PaletteMap::new(kind, phase, 500);
            cache.prepare(kind, plain.phase_bucket());
            let cached = PaletteMap::new(kind, phase, 500).with_cache(&cache);

            for step in 0..2000 {
                let value = EscapeValue::Escaped(f64::from(step) * 0.31);
                // Second lookup hits the cache.
                assert_eq!(cached.map(value), plain.map(value), "{kind} at {value:?}");
                assert_eq!(cached.map(value), plain.map(value), "{kind} at {value:?}");
            }
        }
    }

    #[test]
    fn test_phases_in_one_bucket_match() {
        let a = PaletteMap::new(PaletteKind::Rainbow, 1.0, 100);
        let b = PaletteMap::new(PaletteKind::Rainbow, 1.0 + 1e-6, 100);

        assert_eq!(a.phase_bucket(), b.phase_bucket());
        assert_eq!(a.map(EscapeValue::Escaped(42.0)), b.map(EscapeValue::Escaped(42.0)));
    }

    #[test]
    fn test_static_palette_ignores_phase() {
        let a = PaletteMap::new(PaletteKind::Sunset, 0.0, 100);
        let b = PaletteMap::new(PaletteKind::Sunset, 3.0, 100);

        assert_eq!(b.phase_bucket(), 0);

        for step in 0..100 {
            let value = EscapeValue::Escaped(f64::from(step));
            assert_eq!(a.map(value), b.map(value));
        }
    }
}
