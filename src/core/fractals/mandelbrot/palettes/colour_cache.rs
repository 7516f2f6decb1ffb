use std::sync::atomic::{AtomicU32, Ordering};

use crate::core::data::colour::Colour;
use crate::core::fractals::mandelbrot::palettes::kinds::PaletteKind;

/// Number of quantisation steps for the normalised escape value.
pub const COLOUR_LEVELS: usize = 1024;

// Packed colour occupies the low 24 bits.
const FILLED: u32 = 1 << 24;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct CacheKey {
    palette: PaletteKind,
    phase_bucket: u32,
}

/// Memoises colours for one `(palette, phase bucket)` pair, indexed by level.
///
/// Lookups and fills take `&self` and may race; every racing writer stores the
/// same value because the colour is a pure function of the level and the key.
/// Switching key needs `&mut self`, so no fill for an old key can land after a
/// switch.
#[derive(Debug)]
pub struct ColourCache {
    key: Option<CacheKey>,
    entries: Box<[AtomicU32]>,
}

impl ColourCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            key: None,
            entries: (0..=COLOUR_LEVELS).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    /// Points the cache at `palette` and `phase_bucket`, clearing it if either changed.
    pub fn prepare(&mut self, palette: PaletteKind, phase_bucket: u32) {
        let key = CacheKey { palette, phase_bucket };

        if self.key != Some(key) {
            self.clear();
            self.key = Some(key);
        }
    }

    pub fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry.get_mut() = 0;
        }
    }

    #[must_use]
    #[inline]
    pub fn get(&self, level: usize) -> Option<Colour> {
        let packed = self.entries.get(level)?.load(Ordering::Relaxed);

        (packed & FILLED != 0).then(|| Colour::from_rgb_u32(packed))
    }

    #[inline]
    pub fn get_or_insert_with(&self, level: usize, compute: impl FnOnce() -> Colour) -> Colour {
        if let Some(colour) = self.get(level) {
            return colour;
        }

        let colour = compute();
        if let Some(entry) = self.entries.get(level) {
            entry.store(colour.to_rgb_u32() | FILLED, Ordering::Relaxed);
        }

        colour
    }

    /// Number of filled entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.load(Ordering::Relaxed) & FILLED != 0)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ColourCache {
    fn default() -> Self {
        Self::new()
    }
}
