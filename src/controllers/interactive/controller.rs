use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, debug_span, error};

use crate::controllers::interactive::data::frame_data::FrameData;
use crate::controllers::interactive::data::render_request::RenderRequest;
use crate::controllers::interactive::errors::render_error::RenderError;
use crate::controllers::interactive::events::render_event::RenderEvent;
use crate::controllers::interactive::ports::presenter_port::PresenterPort;
use crate::core::actions::cancellation::{CancelToken, GenerationToken};
use crate::core::actions::generate_fractal::tile_scheduler::{
    GenerateFractalError, SchedulerError, SchedulerSettings, TileScheduler,
};
use crate::core::actions::generate_pixel_buffer::colorize::Colorizer;
use crate::core::actions::generate_pixel_buffer::generate_pixel_buffer::GeneratePixelBufferError;
use crate::core::data::pixel_buffer::PixelBuffer;
use crate::core::data::scalar_field::ScalarField;
use crate::core::fractals::mandelbrot::algorithm::MandelbrotAlgorithm;

/// Whether the newest submitted request is reflected in presented output.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderState {
    /// The newest request has been presented (or nothing was ever submitted).
    Idle,
    /// The worker is computing the newest request.
    Rendering,
    /// A newer request is waiting while older work finishes or is abandoned.
    Stale,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    #[serde(flatten)]
    pub scheduler: SchedulerSettings,
    pub colour_cache: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            scheduler: SchedulerSettings::default(),
            colour_cache: true,
        }
    }
}

struct SharedState {
    generation: Arc<AtomicU64>,
    last_completed_generation: AtomicU64,
    // Generation the worker is currently computing, 0 when idle.
    in_flight_generation: AtomicU64,
    latest_request: Mutex<Option<(u64, Arc<RenderRequest>)>>,
    wake: Condvar,
    shutdown: AtomicBool,
    presenter_port: Arc<dyn PresenterPort>,
}

/// Renders requests on a background thread, always converging on the newest one.
///
/// Submitting replaces the single pending slot, so a burst of requests made
/// while a render is in flight collapses into one follow-up render. The
/// in-flight render notices the newer generation through its cancel token and
/// is dropped without presenting anything.
pub struct InteractiveController {
    shared: Arc<SharedState>,
    worker: Option<JoinHandle<()>>,
    workers: usize,
}

struct RenderWorker {
    scheduler: TileScheduler,
    colorizer: Colorizer,
    last_field: Option<(Arc<RenderRequest>, Arc<ScalarField>)>,
}

struct RenderOutput {
    pixel_buffer: PixelBuffer,
    reused_field: bool,
    interior_pixels: usize,
    colour_cache_fill: usize,
}

enum RenderOutcome {
    Cancelled,
    Error(String),
}

impl From<GenerateFractalError> for RenderOutcome {
    fn from(err: GenerateFractalError) -> Self {
        match err {
            GenerateFractalError::Cancelled(_) => Self::Cancelled,
            GenerateFractalError::Field(err) => Self::Error(err.to_string()),
        }
    }
}

impl From<GeneratePixelBufferError> for RenderOutcome {
    fn from(err: GeneratePixelBufferError) -> Self {
        match err {
            GeneratePixelBufferError::Cancelled(_) => Self::Cancelled,
            GeneratePixelBufferError::PixelBuffer(err) => Self::Error(err.to_string()),
        }
    }
}

impl InteractiveController {
    pub fn new(presenter_port: Arc<dyn PresenterPort>, settings: ControllerSettings) -> Result<Self, SchedulerError> {
        let scheduler = TileScheduler::new(settings.scheduler)?;
        let workers = scheduler.workers();

        let shared = Arc::new(SharedState {
            generation: Arc::new(AtomicU64::new(0)),
            last_completed_generation: AtomicU64::new(0),
            in_flight_generation: AtomicU64::new(0),
            latest_request: Mutex::new(None),
            wake: Condvar::new(),
            shutdown: AtomicBool::new(false),
            presenter_port,
        });

        let mut render_worker = RenderWorker {
            scheduler,
            colorizer: Colorizer::new(settings.colour_cache),
            last_field: None,
        };
        let worker_shared = Arc::clone(&shared);

        let worker = thread::Builder::new()
            .name("mandelbrot-render".to_string())
            .spawn(move || {
                Self::worker_loop(&worker_shared, &mut render_worker);
            })?;

        Ok(Self {
            shared,
            worker: Some(worker),
            workers,
        })
    }

    pub fn submit_request(&self, request: Arc<RenderRequest>) -> u64 {
        let mut guard = self
            .shared
            .latest_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Bumped under the lock so the pending slot never holds an older
        // generation than the counter implies.
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *guard = Some((generation, request));
        drop(guard);

        self.shared.wake.notify_one();

        generation
    }

    pub fn shutdown(&mut self) {
        // Set under the slot lock so the worker cannot miss the wakeup between
        // checking the flag and waiting.
        let guard = self
            .shared
            .latest_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.shared.shutdown.store(true, Ordering::Release);
        drop(guard);
        self.shared.wake.notify_all();

        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    #[must_use]
    pub fn last_submitted_generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn last_completed_generation(&self) -> u64 {
        self.shared.last_completed_generation.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub fn state(&self) -> RenderState {
        let latest = self.shared.generation.load(Ordering::Acquire);
        let completed = self.shared.last_completed_generation.load(Ordering::Acquire);

        if completed >= latest {
            RenderState::Idle
        } else if self.shared.in_flight_generation.load(Ordering::Acquire) == latest {
            RenderState::Rendering
        } else {
            RenderState::Stale
        }
    }

    fn worker_loop(shared: &Arc<SharedState>, render_worker: &mut RenderWorker) {
        loop {
            let (job_generation, request) = {
                let mut guard = shared.latest_request.lock().unwrap_or_else(PoisonError::into_inner);
                loop {
                    if shared.shutdown.load(Ordering::Acquire) {
                        return;
                    }

                    if let Some(req) = guard.take() {
                        shared.in_flight_generation.store(req.0, Ordering::Release);
                        break req;
                    }

                    guard = shared.wake.wait(guard).unwrap_or_else(PoisonError::into_inner);
                }
            };

            let generation_token = GenerationToken::new(job_generation, Arc::clone(&shared.generation));
            let cancel_token = || shared.shutdown.load(Ordering::Relaxed) || generation_token.is_cancelled();

            let span = debug_span!("render", generation = job_generation);
            let _entered = span.enter();

            let start = Instant::now();
            let result = catch_panic(AssertUnwindSafe(|| render_worker.render(&request, &cancel_token)))
                .unwrap_or_else(|message| {
                    error!(%message, "render panicked");
                    render_worker.last_field = None;
                    Err(RenderOutcome::Error(format!("render panicked: {message}")))
                });
            let render_duration = start.elapsed();

            shared.in_flight_generation.store(0, Ordering::Release);

            let event = match result {
                Ok(output) => {
                    debug!(
                        duration_ms = render_duration.as_secs_f64() * 1000.0,
                        max_iterations = request.max_iterations,
                        reused_field = output.reused_field,
                        "render complete"
                    );

                    RenderEvent::Frame(FrameData {
                        generation: job_generation,
                        pixel_buffer: output.pixel_buffer,
                        render_duration,
                        request: (*request).clone(),
                        reused_field: output.reused_field,
                        interior_pixels: output.interior_pixels,
                        colour_cache_fill: output.colour_cache_fill,
                    })
                }
                Err(RenderOutcome::Cancelled) => {
                    debug!("render superseded");
                    continue;
                }
                Err(RenderOutcome::Error(message)) => RenderEvent::Error(RenderError {
                    generation: job_generation,
                    message,
                }),
            };

            if job_generation != shared.generation.load(Ordering::Acquire) {
                continue;
            }

            if let Err(message) = catch_panic(AssertUnwindSafe(|| shared.presenter_port.present(event))) {
                error!(%message, "presenter panicked");
            }
            shared
                .last_completed_generation
                .store(job_generation, Ordering::Release);
        }
    }
}

impl RenderWorker {
    fn render<C: CancelToken>(
        &mut self,
        request: &Arc<RenderRequest>,
        cancel: &C,
    ) -> Result<RenderOutput, RenderOutcome> {
        let reusable = self
            .last_field
            .as_ref()
            .filter(|(previous, _)| previous.same_geometry(request))
            .map(|(_, field)| Arc::clone(field));
        let reused_field = reusable.is_some();

        let field = match reusable {
            Some(field) => field,
            None => {
                let algorithm = MandelbrotAlgorithm::new(request.viewport, request.max_iterations)
                    .map_err(|err| RenderOutcome::Error(err.to_string()))?;
                let field = Arc::new(self.scheduler.generate_scalar_field(&algorithm, cancel)?);

                self.last_field = Some((Arc::clone(request), Arc::clone(&field)));
                field
            }
        };

        if cancel.is_cancelled() {
            return Err(RenderOutcome::Cancelled);
        }

        let colorizer = &mut self.colorizer;
        let pixel_buffer = self
            .scheduler
            .install(|| colorizer.colorize_cancelable(&field, request.palette, request.phase, cancel))?;

        Ok(RenderOutput {
            pixel_buffer,
            reused_field,
            interior_pixels: field.interior_count(),
            colour_cache_fill: self.colorizer.cache_fill(),
        })
    }
}

/// Runs `op`, turning a panic into its message.
fn catch_panic<R>(op: impl FnOnce() -> R + panic::UnwindSafe) -> Result<R, String> {
    panic::catch_unwind(op).map_err(|payload| panic_message(payload.as_ref()))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Drop for InteractiveController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
