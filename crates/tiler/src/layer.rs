use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::{JobQueue, RenderEvents, Renderer, Result, TileBitmap, TileCache, TileJob, TileWorker};

/// Couples a renderer, its worker thread and the shared tile cache.
///
/// The renderer resources follow the layer lifecycle: `attach` opens them and
/// starts the worker, `detach` stops the worker and closes them again. The
/// worker thread lifecycle (pause/resume/cancel) is independent and reachable
/// through the layer while attached.
pub struct RasterLayer {
    renderer: Arc<Mutex<Box<dyn Renderer>>>,
    queue: Arc<JobQueue>,
    cache: Arc<TileCache>,
    events: Arc<dyn RenderEvents>,
    worker: Option<TileWorker>,
}

impl RasterLayer {
    pub fn new(renderer: Box<dyn Renderer>, cache: Arc<TileCache>, events: Arc<dyn RenderEvents>) -> Self {
        RasterLayer {
            renderer: Arc::new(Mutex::new(renderer)),
            queue: Arc::new(JobQueue::new()),
            cache,
            events,
            worker: None,
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.renderer.lock().expect("renderer poisoned").file_path().to_path_buf()
    }

    pub fn is_attached(&self) -> bool {
        self.worker.is_some()
    }

    /// Opens the render resources and starts the worker thread
    pub fn attach(&mut self) -> Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }

        self.renderer.lock().expect("renderer poisoned").start()?;
        // the previous queue is closed after a detach, start from a fresh one
        self.queue = Arc::new(JobQueue::new());
        self.worker = Some(TileWorker::start(
            self.renderer.clone(),
            self.queue.clone(),
            self.cache.clone(),
            self.events.clone(),
        ));

        Ok(())
    }

    /// Stops the worker thread and closes the render resources
    pub fn detach(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel();
            worker.stop();
        }

        self.renderer.lock().expect("renderer poisoned").stop();
    }

    /// Queues a tile job for rendering, returns whether it was accepted
    pub fn request_tile(&self, job: TileJob) -> bool {
        if self.worker.is_none() {
            return false;
        }

        self.queue.push(job)
    }

    pub fn cached_tile(&self, job: &TileJob) -> Option<Arc<TileBitmap>> {
        self.cache.get(job)
    }

    pub fn pause_rendering(&self) {
        if let Some(worker) = &self.worker {
            worker.pause();
        }
    }

    pub fn resume_rendering(&self) {
        if let Some(worker) = &self.worker {
            worker.resume();
        }
    }
}

impl Drop for RasterLayer {
    fn drop(&mut self) {
        self.detach();
        self.renderer.lock().expect("renderer poisoned").destroy();
    }
}
