use crate::controllers::interactive::events::render_event::RenderEvent;

/// Receives completed renders from the controller's worker thread.
pub trait PresenterPort: Send + Sync {
    fn present(&self, event: RenderEvent);
}
