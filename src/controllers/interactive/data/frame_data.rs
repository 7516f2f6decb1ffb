use std::time::Duration;

use crate::controllers::interactive::data::render_request::RenderRequest;
use crate::core::data::pixel_buffer::PixelBuffer;

#[derive(Debug)]
pub struct FrameData {
    pub generation: u64,
    pub pixel_buffer: PixelBuffer,
    pub render_duration: Duration,
    pub request: RenderRequest,
    /// The escape field came from the previous frame; only colouring ran.
    pub reused_field: bool,
    pub interior_pixels: usize,
    /// Colour cache entries filled after this frame, zero with caching off.
    pub colour_cache_fill: usize,
}
