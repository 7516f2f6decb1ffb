use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, ExplorerConfig};
use crate::controllers::interactive::animation::AnimationClock;
use crate::controllers::interactive::controller::{InteractiveController, RenderState};
use crate::controllers::interactive::data::frame_data::FrameData;
use crate::controllers::interactive::data::render_request::RenderRequest;
use crate::controllers::interactive::errors::render_error::RenderError;
use crate::controllers::interactive::frame_store::FrameStore;
use crate::controllers::interactive::ports::presenter_port::PresenterPort;
use crate::core::actions::generate_fractal::tile_scheduler::SchedulerError;
use crate::core::data::complex::Complex;
use crate::core::data::pixel_rect::{PixelRect, PixelRectError};
use crate::core::data::viewport::{Viewport, ViewportError};
use crate::core::fractals::mandelbrot::iteration_policy::{IterationPolicy, IterationPolicyError};
use crate::core::fractals::mandelbrot::palettes::kinds::PaletteKind;
use crate::core::fractals::mandelbrot::palettes::palette_map::phase_bucket;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("invalid configuration")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Viewport(#[from] ViewportError),
    #[error(transparent)]
    Size(#[from] PixelRectError),
    #[error(transparent)]
    Iterations(#[from] IterationPolicyError),
    #[error("failed to start the renderer")]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("no frame arrived within {0:?}")]
    Timeout(Duration),
}

/// Point-in-time summary of the explorer for status displays.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerInfo {
    pub center: Complex,
    pub zoom_factor: f64,
    /// `(real_min, real_max, imag_min, imag_max)`.
    pub bounds: (f64, f64, f64, f64),
    pub iteration_budget: u32,
    pub iteration_adjustment: i64,
    pub width: u32,
    pub height: u32,
    pub render_count: u64,
    pub palette_name: &'static str,
    pub palette_index: usize,
    pub phase: f64,
    pub colour_cache_fill: usize,
    pub at_precision_limit: bool,
    pub render_state: RenderState,
}

/// Input-facing front of the renderer.
///
/// Every input updates the view state and, if the resulting frame would look
/// different from the last one requested, submits a new render. Inputs return
/// the generation they submitted, or `None` when nothing needed rendering.
pub struct Explorer {
    viewport: Viewport,
    iteration_policy: IterationPolicy,
    palette: PaletteKind,
    animation: AnimationClock,
    zoom_step: f64,
    frame_store: Arc<FrameStore>,
    controller: InteractiveController,
    last_request: Option<Arc<RenderRequest>>,
    last_generation: u64,
    render_count: u64,
}

impl Explorer {
    /// Starts the render worker and submits the first frame.
    pub fn new(config: &ExplorerConfig) -> Result<Self, ExplorerError> {
        config.validate()?;

        let viewport = Viewport::with_limits(config.viewport.pixel_rect()?, config.viewport.limits())?;
        let iteration_policy = IterationPolicy::new(config.iterations, config.viewport.half_width)?;
        let frame_store = Arc::new(FrameStore::new());
        let controller = InteractiveController::new(
            Arc::clone(&frame_store) as Arc<dyn PresenterPort>,
            config.render,
        )?;

        let mut explorer = Self {
            viewport,
            iteration_policy,
            palette: config.palette.initial,
            animation: AnimationClock::new(config.palette.phase_speed),
            zoom_step: config.viewport.zoom_step,
            frame_store,
            controller,
            last_request: None,
            last_generation: 0,
            render_count: 0,
        };
        explorer.request_render();

        Ok(explorer)
    }

    /// Drags the view by a pixel delta.
    pub fn pan(&mut self, dx_px: f64, dy_px: f64) -> Result<Option<u64>, ExplorerError> {
        self.viewport.pan(dx_px, dy_px)?;

        Ok(self.request_render())
    }

    /// Scales the half-width by `factor` (`< 1` zooms in), keeping the plane
    /// point under `anchor_px` fixed.
    pub fn zoom(&mut self, factor: f64, anchor_px: Option<(f64, f64)>) -> Result<Option<u64>, ExplorerError> {
        self.viewport.zoom(factor, anchor_px)?;

        Ok(self.request_render())
    }

    /// Zooms by whole wheel notches; positive steps zoom in.
    pub fn scroll(&mut self, steps: i32, anchor_px: Option<(f64, f64)>) -> Result<Option<u64>, ExplorerError> {
        self.zoom(self.zoom_step.powi(-steps), anchor_px)
    }

    /// Places the view at `center` with the given zoom factor.
    pub fn set_view(&mut self, center: Complex, zoom_factor: f64) -> Result<Option<u64>, ExplorerError> {
        if !zoom_factor.is_finite() || zoom_factor <= 0.0 {
            return Err(ViewportError::InvalidZoomFactor(zoom_factor).into());
        }

        let half_width = self.viewport.limits().default_half_width / zoom_factor;
        self.viewport.set_view(center, half_width)?;

        Ok(self.request_render())
    }

    /// Raises (positive) or lowers (negative) render quality by whole steps.
    pub fn adjust_iterations(&mut self, steps: i32) -> Option<u64> {
        self.iteration_policy.adjust_steps(steps);
        info!(
            steps,
            adjustment = self.iteration_policy.cumulative_delta(),
            budget = self.iteration_budget(),
            "iteration budget adjusted"
        );

        self.request_render()
    }

    pub fn next_palette(&mut self) -> Option<u64> {
        self.set_palette(self.palette.next())
    }

    pub fn set_palette(&mut self, palette: PaletteKind) -> Option<u64> {
        if palette != self.palette {
            self.palette = palette;
            info!(palette = %palette, index = palette.index(), "palette changed");
        }

        self.request_render()
    }

    /// Restores the default view, iteration quality and animation phase.
    pub fn reset(&mut self) -> Option<u64> {
        self.viewport.reset();
        self.iteration_policy.reset_adjustment();
        self.animation.reset();
        info!("view reset");

        self.request_render()
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<Option<u64>, ExplorerError> {
        let pixel_rect = PixelRect::new(width, height)?;

        if pixel_rect != self.viewport.pixel_rect() {
            self.viewport.resize(pixel_rect);
            info!(width, height, "resized");
        }

        Ok(self.request_render())
    }

    /// Advances the palette animation. Only animated palettes re-render, and
    /// only once the phase moves into a new bucket.
    pub fn tick(&mut self, now: Instant) -> Option<u64> {
        self.animation.tick(now);

        if !self.palette.is_animated() {
            return None;
        }

        self.request_render()
    }

    /// Newest completed frame; stays put while newer renders are in flight.
    #[must_use]
    pub fn current_frame(&self) -> Option<Arc<FrameData>> {
        self.frame_store.current_frame()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<RenderError> {
        self.frame_store.last_error()
    }

    /// Blocks until the most recently submitted render is presented.
    pub fn wait_for_frame(&self, timeout: Duration) -> Result<Arc<FrameData>, ExplorerError> {
        match self.frame_store.wait_for_generation(self.last_generation, timeout) {
            Some(Ok(frame)) => Ok(frame),
            Some(Err(error)) => Err(error.into()),
            None => Err(ExplorerError::Timeout(timeout)),
        }
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn zoom_factor(&self) -> f64 {
        self.viewport.zoom_factor()
    }

    /// Budget the next render uses, after the user offset and the work cap.
    #[must_use]
    pub fn iteration_budget(&self) -> u32 {
        let budget = self.iteration_policy.effective_budget(self.viewport.half_width());

        self.iteration_policy
            .capped_for_pixels(budget, self.viewport.pixel_rect().size())
    }

    #[must_use]
    pub fn palette(&self) -> PaletteKind {
        self.palette
    }

    #[must_use]
    pub fn palette_name(&self) -> &'static str {
        self.palette.display_name()
    }

    #[must_use]
    pub fn phase(&self) -> f64 {
        self.animation.phase()
    }

    #[must_use]
    pub fn last_render_duration(&self) -> Option<Duration> {
        self.current_frame().map(|frame| frame.render_duration)
    }

    #[must_use]
    pub fn render_state(&self) -> RenderState {
        self.controller.state()
    }

    /// Renders submitted so far, including the first one.
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.controller.workers()
    }

    #[must_use]
    pub fn info(&self) -> ExplorerInfo {
        let pixel_rect = self.viewport.pixel_rect();

        ExplorerInfo {
            center: self.viewport.center(),
            zoom_factor: self.zoom_factor(),
            bounds: self.viewport.bounds(),
            iteration_budget: self.iteration_budget(),
            iteration_adjustment: self.iteration_policy.cumulative_delta(),
            width: pixel_rect.width(),
            height: pixel_rect.height(),
            render_count: self.render_count,
            palette_name: self.palette_name(),
            palette_index: self.palette.index(),
            phase: self.phase(),
            colour_cache_fill: self.current_frame().map_or(0, |frame| frame.colour_cache_fill),
            at_precision_limit: self.viewport.at_precision_limit(),
            render_state: self.render_state(),
        }
    }

    fn request_render(&mut self) -> Option<u64> {
        let request = RenderRequest {
            viewport: self.viewport,
            max_iterations: self.iteration_budget(),
            palette: self.palette,
            phase: self.animation.phase(),
        };

        if self
            .last_request
            .as_deref()
            .is_some_and(|previous| looks_identical(previous, &request))
        {
            return None;
        }

        let request = Arc::new(request);
        self.last_request = Some(Arc::clone(&request));
        self.last_generation = self.controller.submit_request(request);
        self.render_count += 1;

        Some(self.last_generation)
    }
}

// Phases within one bucket colour identically, and static palettes ignore phase.
fn looks_identical(a: &RenderRequest, b: &RenderRequest) -> bool {
    let phase_key = |request: &RenderRequest| {
        if request.palette.is_animated() {
            phase_bucket(request.phase)
        } else {
            0
        }
    };

    a.same_geometry(b) && a.palette == b.palette && phase_key(a) == phase_key(b)
}
