//! Parallel evaluation of a [`FractalAlgorithm`] over the pixel grid.
//!
//! The grid is cut into bands of `band_rows` full rows. Each band is a disjoint
//! `&mut` slice of the row-major output, so workers never share a cell and the
//! result does not depend on how many workers ran or how tall the bands were.

use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::core::actions::cancellation::{CANCEL_CHECK_INTERVAL_PIXELS, CancelToken, Cancelled, NeverCancel};
use crate::core::actions::generate_fractal::ports::fractal_algorithm::FractalAlgorithm;
use crate::core::data::point::Point;
use crate::core::data::scalar_field::{EscapeValue, ScalarField, ScalarFieldError};
use crate::core::fractals::mandelbrot::algorithm::MandelbrotAlgorithm;
use crate::core::util::worker_count::default_worker_count;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("worker count must be greater than zero")]
    ZeroWorkers,
    #[error("band height must be greater than zero")]
    ZeroBandRows,
    #[error("failed to build render thread pool")]
    PoolBuild(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to spawn render worker")]
    WorkerSpawn(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateFractalError {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("invalid scalar field: {0}")]
    Field(#[from] ScalarFieldError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    /// `None` uses the available hardware parallelism.
    pub workers: Option<usize>,
    pub band_rows: usize,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            workers: None,
            band_rows: 16,
        }
    }
}

pub struct TileScheduler {
    pool: ThreadPool,
    workers: usize,
    band_rows: usize,
}

impl std::fmt::Debug for TileScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileScheduler")
            .field("workers", &self.workers)
            .field("band_rows", &self.band_rows)
            .finish()
    }
}

impl TileScheduler {
    pub fn new(settings: SchedulerSettings) -> Result<Self, SchedulerError> {
        let workers = settings.workers.unwrap_or_else(default_worker_count);

        if workers == 0 {
            return Err(SchedulerError::ZeroWorkers);
        }

        if settings.band_rows == 0 {
            return Err(SchedulerError::ZeroBandRows);
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("mandelbrot-tile-{index}"))
            .build()?;

        Ok(Self {
            pool,
            workers,
            band_rows: settings.band_rows,
        })
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub fn band_rows(&self) -> usize {
        self.band_rows
    }

    /// Runs `op` on this scheduler's pool, so nested rayon work stays within `workers` threads.
    pub fn install<R, F>(&self, op: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(op)
    }

    /// Evaluates every pixel; cannot be cancelled.
    pub fn generate<Alg>(&self, algorithm: &Alg) -> Vec<Alg::Success>
    where
        Alg: FractalAlgorithm + Sync,
        Alg::Success: Default + Send,
    {
        match self.generate_cancelable(algorithm, &NeverCancel) {
            Ok(values) => values,
            Err(Cancelled) => unreachable!("NeverCancel token should never signal cancellation"),
        }
    }

    /// Evaluates every pixel, polling `cancel` at the start of each band and
    /// every [`CANCEL_CHECK_INTERVAL_PIXELS`] pixels within it.
    ///
    /// Either the complete row-major output or [`Cancelled`] is returned, never a
    /// partial grid. A band whose evaluation panics is filled with
    /// `Success::default()` and the remaining bands are unaffected.
    pub fn generate_cancelable<Alg, C>(&self, algorithm: &Alg, cancel: &C) -> Result<Vec<Alg::Success>, Cancelled>
    where
        Alg: FractalAlgorithm + Sync,
        Alg::Success: Default + Send,
        C: CancelToken,
    {
        let pixel_rect = algorithm.pixel_rect();
        let width = pixel_rect.width() as usize;
        // A band never spans more than the whole grid, so the product cannot overflow.
        let band_rows = self.band_rows.min(pixel_rect.height() as usize);
        let band_len = width * band_rows;

        let mut values = Vec::with_capacity(pixel_rect.size());
        values.resize_with(pixel_rect.size(), Alg::Success::default);

        self.pool.install(|| {
            values
                .par_chunks_mut(band_len)
                .enumerate()
                .try_for_each(|(band, cells)| {
                    let first_row = band * band_rows;
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        fill_band(algorithm, cancel, cells, width, first_row)
                    }));

                    match outcome {
                        Ok(result) => result,
                        Err(_) => {
                            warn!(band, first_row, "render tile panicked; band left as default values");
                            cells.fill_with(Alg::Success::default);
                            Ok(())
                        }
                    }
                })
        })?;

        Ok(values)
    }

    /// Computes the escape field for one viewport snapshot.
    pub fn generate_scalar_field<C>(
        &self,
        algorithm: &MandelbrotAlgorithm,
        cancel: &C,
    ) -> Result<ScalarField, GenerateFractalError>
    where
        C: CancelToken,
    {
        let values: Vec<EscapeValue> = self.generate_cancelable(algorithm, cancel)?;

        Ok(ScalarField::from_values(
            algorithm.pixel_rect(),
            algorithm.max_iterations(),
            values,
        )?)
    }
}

fn fill_band<Alg, C>(
    algorithm: &Alg,
    cancel: &C,
    cells: &mut [Alg::Success],
    width: usize,
    first_row: usize,
) -> Result<(), Cancelled>
where
    Alg: FractalAlgorithm,
    C: CancelToken,
{
    for (offset, cell) in cells.iter_mut().enumerate() {
        if offset % CANCEL_CHECK_INTERVAL_PIXELS == 0 && cancel.is_cancelled() {
            return Err(Cancelled);
        }

        let pixel = Point {
            x: (offset % width) as u32,
            y: (first_row + offset / width) as u32,
        };
        *cell = algorithm.compute(pixel);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::actions::generate_fractal::generate_fractal::generate_fractal;
    use crate::core::data::pixel_rect::PixelRect;
    use crate::core::data::viewport::Viewport;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct StubAlgorithm {
        pixel_rect: PixelRect,
    }

    impl FractalAlgorithm for StubAlgorithm {
        type Success = u64;

        fn pixel_rect(&self) -> PixelRect {
            self.pixel_rect
        }

        fn compute(&self, pixel: Point) -> Self::Success {
            u64::from(pixel.x) * 1000 + u64::from(pixel.y)
        }
    }

    struct PanickingRowAlgorithm {
        pixel_rect: PixelRect,
        bad_row: u32,
    }

    impl FractalAlgorithm for PanickingRowAlgorithm {
        type Success = u64;

        fn pixel_rect(&self) -> PixelRect {
            self.pixel_rect
        }

        fn compute(&self, pixel: Point) -> Self::Success {
            if pixel.y == self.bad_row {
                panic!("stub failure at row {}", pixel.y);
            }

            u64::from(pixel.x) + 1
        }
    }

    fn scheduler(workers: usize, band_rows: usize) -> TileScheduler {
        TileScheduler::new(SchedulerSettings {
            workers: Some(workers),
            band_rows,
        })
        .unwrap()
    }

    fn stub(width: u32, height: u32) -> StubAlgorithm {
        StubAlgorithm {
            pixel_rect: PixelRect::new(width, height).unwrap(),
        }
    }

    #[test]
    fn test_matches_serial_output() {
        let algorithm = stub(37, 23);

        assert_eq!(scheduler(4, 5).generate(&algorithm), generate_fractal(&algorithm));
    }

    #[test]
    fn test_output_independent_of_partitioning() {
        let viewport = Viewport::new(PixelRect::new(64, 48).unwrap());
        let algorithm = MandelbrotAlgorithm::new(viewport, 200).unwrap();
        let reference = generate_fractal(&algorithm);

        for workers in [1, 4] {
            for band_rows in [1, 7, 64] {
                assert_eq!(
                    scheduler(workers, band_rows).generate(&algorithm),
                    reference,
                    "workers {workers}, band_rows {band_rows}"
                );
            }
        }
    }

    #[test]
    fn test_band_taller_than_grid_is_one_band() {
        let algorithm = stub(37, 23);

        assert_eq!(scheduler(2, usize::MAX).generate(&algorithm), generate_fractal(&algorithm));
    }

    #[test]
    fn test_install_runs_on_scheduler_pool() {
        let scheduler = scheduler(3, 4);

        assert_eq!(scheduler.install(rayon::current_num_threads), 3);
    }

    #[test]
    fn test_single_pixel_grid() {
        let algorithm = stub(1, 1);

        assert_eq!(scheduler(2, 16).generate(&algorithm), vec![0]);
    }

    #[test]
    fn test_returns_cancelled_when_token_is_cancelled() {
        let algorithm = stub(10, 8);
        let cancelled = AtomicBool::new(true);
        let cancel_token = || cancelled.load(Ordering::Relaxed);

        let result = scheduler(2, 2).generate_cancelable(&algorithm, &cancel_token);

        assert_eq!(result, Err(Cancelled));
    }

    #[test]
    fn test_cancels_after_k_polls() {
        let algorithm = stub(6, 6);
        let poll_count = AtomicUsize::new(0);
        let cancel_after = 3;
        let cancel_token = || poll_count.fetch_add(1, Ordering::Relaxed) >= cancel_after;

        let result = scheduler(2, 1).generate_cancelable(&algorithm, &cancel_token);

        assert_eq!(result, Err(Cancelled));
        assert!(poll_count.load(Ordering::Relaxed) >= cancel_after);
    }

    #[test]
    fn test_cancellation_polled_at_band_start() {
        let algorithm = stub(2, 5);
        let poll_count = AtomicUsize::new(0);
        let cancel_token = || {
            poll_count.fetch_add(1, Ordering::Relaxed);
            false
        };

        let result = scheduler(2, 1).generate_cancelable(&algorithm, &cancel_token);

        assert!(result.is_ok());
        assert_eq!(poll_count.load(Ordering::Relaxed), 5);
    }

    #[test]
    fn test_cancellation_polled_within_wide_bands() {
        // 3000 pixels per band polls at offsets 0, 1024 and 2048.
        let algorithm = stub(3000, 2);
        let poll_count = AtomicUsize::new(0);
        let cancel_token = || {
            poll_count.fetch_add(1, Ordering::Relaxed);
            false
        };

        let result = scheduler(2, 1).generate_cancelable(&algorithm, &cancel_token);

        assert!(result.is_ok());
        assert_eq!(poll_count.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_panicking_band_is_isolated() {
        let algorithm = PanickingRowAlgorithm {
            pixel_rect: PixelRect::new(4, 6).unwrap(),
            bad_row: 3,
        };

        let values = scheduler(3, 2).generate(&algorithm);

        // Rows 2 and 3 share a band and fall back to defaults.
        for (index, value) in values.iter().enumerate() {
            let (x, y) = (index % 4, index / 4);
            let expected = if (2..=3).contains(&y) { 0 } else { x as u64 + 1 };
            assert_eq!(*value, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn test_scalar_field_carries_budget_and_rect() {
        let pixel_rect = PixelRect::new(16, 12).unwrap();
        let algorithm = MandelbrotAlgorithm::new(Viewport::new(pixel_rect), 150).unwrap();

        let field = scheduler(2, 4).generate_scalar_field(&algorithm, &NeverCancel).unwrap();

        assert_eq!(field.pixel_rect(), pixel_rect);
        assert_eq!(field.max_iterations(), 150);
        assert!(field.interior_count() > 0);
        assert!(field.exterior_count() > 0);
    }

    #[test]
    fn test_rejects_zero_settings() {
        let zero_workers = TileScheduler::new(SchedulerSettings {
            workers: Some(0),
            band_rows: 4,
        });
        let zero_rows = TileScheduler::new(SchedulerSettings {
            workers: Some(1),
            band_rows: 0,
        });

        assert!(matches!(zero_workers, Err(SchedulerError::ZeroWorkers)));
        assert!(matches!(zero_rows, Err(SchedulerError::ZeroBandRows)));
    }
}
