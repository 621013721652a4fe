/// Fire and forget status notifications emitted by the tile worker.
/// Implementations are called from the worker thread and must not block.
pub trait RenderEvents: Send + Sync {
    /// A tile render is about to start
    fn rendering_started(&self);
    /// The pending queue ran dry, no more work in flight
    fn rendering_finished(&self);
    /// A new tile landed in the cache, the display should repaint
    fn redraw_needed(&self);
}

/// Status collaborator that only logs, useful as a default
#[derive(Default)]
pub struct LogRenderEvents;

impl RenderEvents for LogRenderEvents {
    fn rendering_started(&self) {
        log::debug!("[TILE] rendering started");
    }

    fn rendering_finished(&self) {
        log::debug!("[TILE] rendering finished");
    }

    fn redraw_needed(&self) {
        log::debug!("[TILE] redraw needed");
    }
}
