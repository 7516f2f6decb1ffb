use rayon::prelude::*;
use thiserror::Error;

use crate::core::actions::cancellation::{CANCEL_CHECK_INTERVAL_PIXELS, CancelToken, Cancelled, NeverCancel};
use crate::core::actions::generate_pixel_buffer::ports::colour_map::ColourMap;
use crate::core::data::colour::Colour;
use crate::core::data::pixel_buffer::{BYTES_PER_PIXEL, PixelBuffer, PixelBufferError};
use crate::core::data::pixel_rect::PixelRect;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeneratePixelBufferError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("pixel buffer error: {0}")]
    PixelBuffer(#[from] PixelBufferError),
}

/// Maps every input value to an RGB pixel.
pub fn generate_pixel_buffer<CMap>(
    input: &[CMap::T],
    mapper: &CMap,
    pixel_rect: PixelRect,
) -> Result<PixelBuffer, PixelBufferError>
where
    CMap: ColourMap,
    CMap::T: Copy + Sync,
{
    generate_pixel_buffer_cancelable(input, mapper, pixel_rect, &NeverCancel).map_err(|e| match e {
        GeneratePixelBufferError::PixelBuffer(err) => err,
        GeneratePixelBufferError::Cancelled(_) => {
            unreachable!("NeverCancel token should never signal cancellation")
        }
    })
}

/// Like [`generate_pixel_buffer`], polling `cancel` at the start of every row and
/// every [`CANCEL_CHECK_INTERVAL_PIXELS`] pixels within it.
///
/// Rows are coloured in parallel; a cancelled call never yields a partial buffer.
pub fn generate_pixel_buffer_cancelable<CMap, C>(
    input: &[CMap::T],
    mapper: &CMap,
    pixel_rect: PixelRect,
    cancel: &C,
) -> Result<PixelBuffer, GeneratePixelBufferError>
where
    CMap: ColourMap,
    CMap::T: Copy + Sync,
    C: CancelToken,
{
    if input.len() != pixel_rect.size() {
        return Err(PixelBufferError::BoundsMismatch {
            pixel_rect_size: pixel_rect.size() * BYTES_PER_PIXEL,
            buffer_size: input.len() * BYTES_PER_PIXEL,
        }
        .into());
    }

    let width = pixel_rect.width() as usize;
    let mut buffer = vec![0u8; pixel_rect.size() * BYTES_PER_PIXEL];

    buffer
        .par_chunks_mut(width * BYTES_PER_PIXEL)
        .zip(input.par_chunks(width))
        .try_for_each(|(row_bytes, row_values)| {
            for (i, (pixel, &value)) in row_bytes
                .chunks_exact_mut(BYTES_PER_PIXEL)
                .zip(row_values)
                .enumerate()
            {
                if i % CANCEL_CHECK_INTERVAL_PIXELS == 0 && cancel.is_cancelled() {
                    return Err(Cancelled);
                }

                let Colour { r, g, b } = mapper.map(value);
                pixel.copy_from_slice(&[r, g, b]);
            }

            Ok(())
        })?;

    Ok(PixelBuffer::from_data(pixel_rect, buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::point::Point;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Debug)]
    struct StubColourMap {}

    impl ColourMap for StubColourMap {
        type T = u8;

        fn map(&self, value: u8) -> Colour {
            Colour {
                r: value,
                g: value,
                b: value,
            }
        }
    }

    #[test]
    fn test_generates_pixel_buffer_correctly() {
        let input: Vec<u8> = vec![1, 2, 3, 4, 5, 6];
        let pixel_rect = PixelRect::new(3, 2).unwrap();
        let expected = vec![1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5, 5, 6, 6, 6];

        let results = generate_pixel_buffer(&input, &StubColourMap {}, pixel_rect).unwrap();

        assert_eq!(results.buffer(), &expected);
        assert_eq!(results.pixel_rect(), pixel_rect);
        assert_eq!(results.pixel(Point { x: 0, y: 1 }).unwrap(), Colour::new(4, 4, 4));
    }

    #[test]
    fn test_pixel_rect_input_size_mismatch_returns_err() {
        let input: Vec<u8> = vec![1, 2, 3, 4, 5, 6];
        let pixel_rect = PixelRect::new(2, 2).unwrap();

        let results = generate_pixel_buffer(&input, &StubColourMap {}, pixel_rect);

        assert_eq!(
            results,
            Err(PixelBufferError::BoundsMismatch {
                pixel_rect_size: 12,
                buffer_size: 18
            })
        );
    }

    #[test]
    fn test_cancelable_returns_cancelled_when_token_is_cancelled() {
        let input: Vec<u8> = vec![1, 2, 3, 4, 5, 6];
        let pixel_rect = PixelRect::new(3, 2).unwrap();
        let cancelled = AtomicBool::new(true);
        let cancel_token = || cancelled.load(Ordering::Relaxed);

        let result = generate_pixel_buffer_cancelable(&input, &StubColourMap {}, pixel_rect, &cancel_token);

        assert_eq!(result, Err(GeneratePixelBufferError::Cancelled(Cancelled)));
    }

    #[test]
    fn test_cancellation_polled_once_per_row() {
        let input = vec![7u8; 4 * 9];
        let pixel_rect = PixelRect::new(4, 9).unwrap();
        let polls = AtomicUsize::new(0);
        let cancel_token = || {
            polls.fetch_add(1, Ordering::Relaxed);
            false
        };

        let result = generate_pixel_buffer_cancelable(&input, &StubColourMap {}, pixel_rect, &cancel_token);

        assert!(result.is_ok());
        assert_eq!(polls.load(Ordering::Relaxed), 9);
    }

    #[test]
    fn test_cancelled_error_displays_message() {
        let err = GeneratePixelBufferError::Cancelled(Cancelled);

        assert_eq!(err.to_string(), "render cancelled");
    }
}
