use crate::core::actions::cancellation::{CancelToken, NeverCancel};
use crate::core::actions::generate_pixel_buffer::generate_pixel_buffer::{
    GeneratePixelBufferError, generate_pixel_buffer_cancelable,
};
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::core::data::scalar_field::ScalarField;
use crate::core::fractals::mandelbrot::palettes::colour_cache::ColourCache;
use crate::core::fractals::mandelbrot::palettes::kinds::PaletteKind;
use crate::core::fractals::mandelbrot::palettes::palette_map::PaletteMap;

/// Colours a field without a cache.
pub fn colorize(field: &ScalarField, palette: PaletteKind, phase: f64) -> Result<PixelBuffer, GeneratePixelBufferError> {
    colorize_cancelable(field, palette, phase, &NeverCancel)
}

pub fn colorize_cancelable<C: CancelToken>(
    field: &ScalarField,
    palette: PaletteKind,
    phase: f64,
    cancel: &C,
) -> Result<PixelBuffer, GeneratePixelBufferError> {
    let map = PaletteMap::new(palette, phase, field.max_iterations());

    generate_pixel_buffer_cancelable(field.values(), &map, field.pixel_rect(), cancel)
}

/// Palette engine with an optional colour cache that persists between frames.
#[derive(Debug, Default)]
pub struct Colorizer {
    cache: Option<ColourCache>,
}

impl Colorizer {
    #[must_use]
    pub fn new(use_cache: bool) -> Self {
        Self {
            cache: use_cache.then(ColourCache::new),
        }
    }

    #[must_use]
    pub fn cache(&self) -> Option<&ColourCache> {
        self.cache.as_ref()
    }

    /// Filled cache entries, zero when caching is off.
    #[must_use]
    pub fn cache_fill(&self) -> usize {
        self.cache.as_ref().map_or(0, ColourCache::len)
    }

    pub fn colorize(
        &mut self,
        field: &ScalarField,
        palette: PaletteKind,
        phase: f64,
    ) -> Result<PixelBuffer, GeneratePixelBufferError> {
        self.colorize_cancelable(field, palette, phase, &NeverCancel)
    }

    pub fn colorize_cancelable<C: CancelToken>(
        &mut self,
        field: &ScalarField,
        palette: PaletteKind,
        phase: f64,
        cancel: &C,
    ) -> Result<PixelBuffer, GeneratePixelBufferError> {
        let mut map = PaletteMap::new(palette, phase, field.max_iterations());

        if let Some(cache) = self.cache.as_mut() {
            cache.prepare(palette, map.phase_bucket());
        }

        if let Some(cache) = self.cache.as_ref() {
            map = map.with_cache(cache);
        }

        generate_pixel_buffer_cancelable(field.values(), &map, field.pixel_rect(), cancel)
    }
}
