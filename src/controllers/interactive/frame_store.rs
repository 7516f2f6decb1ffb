use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::controllers::interactive::data::frame_data::FrameData;
use crate::controllers::interactive::errors::render_error::RenderError;
use crate::controllers::interactive::events::render_event::RenderEvent;
use crate::controllers::interactive::ports::presenter_port::PresenterPort;

#[derive(Debug, Default)]
struct Latest {
    generation: u64,
    frame: Option<Arc<FrameData>>,
    error: Option<RenderError>,
}

/// Keeps the newest presented frame.
///
/// Events older than the newest one seen are ignored, so a late frame can never
/// replace a newer one. The previous frame stays available until a newer one
/// arrives.
#[derive(Debug, Default)]
pub struct FrameStore {
    latest: Mutex<Latest>,
    updated: Condvar,
}

impl FrameStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current_frame(&self) -> Option<Arc<FrameData>> {
        self.lock().frame.clone()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<RenderError> {
        self.lock().error.clone()
    }

    /// Generation of the newest frame or error seen.
    #[must_use]
    pub fn presented_generation(&self) -> u64 {
        self.lock().generation
    }

    /// Blocks until an event for `generation` or later lands, or `timeout` passes.
    ///
    /// Returns `None` on timeout, otherwise the frame, or the error if that
    /// generation failed.
    pub fn wait_for_generation(
        &self,
        generation: u64,
        timeout: Duration,
    ) -> Option<Result<Arc<FrameData>, RenderError>> {
        let deadline = Instant::now() + timeout;
        let mut latest = self.lock();

        while latest.generation < generation {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }

            latest = self
                .updated
                .wait_timeout(latest, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        match (&latest.error, &latest.frame) {
            (Some(error), _) if error.generation == latest.generation => Some(Err(error.clone())),
            (_, Some(frame)) => Some(Ok(Arc::clone(frame))),
            (Some(error), None) => Some(Err(error.clone())),
            (None, None) => None,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Latest> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PresenterPort for FrameStore {
    fn present(&self, event: RenderEvent) {
        let mut latest = self.lock();

        if event.generation() <= latest.generation {
            return;
        }

        latest.generation = event.generation();
        match event {
            RenderEvent::Frame(frame) => latest.frame = Some(Arc::new(frame)),
            RenderEvent::Error(error) => latest.error = Some(error),
        }
        drop(latest);

        self.updated.notify_all();
    }
}
