use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use crate::{JobQueue, RenderEvents, Renderer, TileCache, TileJob};

struct WorkerControl {
    cancelled: AtomicBool,
    paused: Mutex<bool>,
    resumed: Condvar,
}

impl WorkerControl {
    fn new() -> Self {
        WorkerControl {
            cancelled: AtomicBool::new(false),
            paused: Mutex::new(false),
            resumed: Condvar::new(),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn wait_while_paused(&self) {
        let mut paused = self.paused.lock().expect("worker control poisoned");
        while *paused && !self.is_cancelled() {
            paused = self.resumed.wait(paused).expect("worker control poisoned");
        }
    }
}

/// The dedicated per layer worker that turns pending tile jobs into cached
/// bitmaps. It blocks on the job queue, skips jobs whose tile is already
/// cached and otherwise delegates pixel production to the renderer.
///
/// Cancellation is cooperative: the flag is checked before the cache write and
/// before the redraw notification, an interrupted render never publishes its
/// result. A job leaves the pending set no matter how its render ends.
pub struct TileWorker {
    control: Arc<WorkerControl>,
    queue: Arc<JobQueue>,
    handle: Option<JoinHandle<()>>,
}

impl TileWorker {
    pub fn start(
        renderer: Arc<Mutex<Box<dyn Renderer>>>,
        queue: Arc<JobQueue>,
        cache: Arc<TileCache>,
        events: Arc<dyn RenderEvents>,
    ) -> Self {
        let control = Arc::new(WorkerControl::new());

        let handle = {
            let control = control.clone();
            let queue = queue.clone();
            std::thread::spawn(move || run_loop(renderer, queue, cache, events, control))
        };

        TileWorker {
            control,
            queue,
            handle: Some(handle),
        }
    }

    pub fn pause(&self) {
        *self.control.paused.lock().expect("worker control poisoned") = true;
    }

    pub fn resume(&self) {
        *self.control.paused.lock().expect("worker control poisoned") = false;
        self.control.resumed.notify_all();
    }

    /// Requests cooperative cancellation of the in flight render
    pub fn cancel(&self) {
        self.control.cancelled.store(true, Ordering::SeqCst);
        self.control.resumed.notify_all();
    }

    /// Closes the queue and waits for the worker thread to wind down
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.queue.close();
        self.control.resumed.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Tile worker thread panicked");
            }
        }
    }
}

impl Drop for TileWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(
    renderer: Arc<Mutex<Box<dyn Renderer>>>,
    queue: Arc<JobQueue>,
    cache: Arc<TileCache>,
    events: Arc<dyn RenderEvents>,
    control: Arc<WorkerControl>,
) {
    while let Some(job) = queue.take() {
        control.wait_while_paused();
        if control.is_cancelled() {
            break;
        }

        if cache.contains(&job) {
            // already rendered, the display reads it straight from the cache
            if queue.is_empty() {
                events.rendering_finished();
            }
            continue;
        }

        events.rendering_started();
        log::debug!("[{}] rendering", job);

        let result = renderer.lock().expect("renderer poisoned").execute_job(&job);

        match result {
            Ok(Some(bitmap)) => {
                if control.is_cancelled() {
                    log::debug!("[{}] cancelled, result discarded", job);
                } else {
                    cache.insert(job.clone(), Arc::new(bitmap));
                    if !control.is_cancelled() {
                        events.redraw_needed();
                    }
                }
            }
            Ok(None) => log::debug!("[{}] nothing to render", job),
            Err(err) => log::warn!("[{}] render failed: {}", job, err),
        }

        // the job left the queue on take, reaching this point with any outcome
        // means it is no longer pending
        if queue.is_empty() {
            events.rendering_finished();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::Duration;

    use geo::{RasterSize, Tile};
    use inf::color;

    use super::*;
    use crate::{DisplayParams, Error, Result, TileBitmap};

    #[derive(Default)]
    struct EventCounter {
        started: AtomicUsize,
        finished: AtomicUsize,
        redraws: AtomicUsize,
    }

    impl RenderEvents for EventCounter {
        fn rendering_started(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn rendering_finished(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }

        fn redraw_needed(&self) {
            self.redraws.fetch_add(1, Ordering::SeqCst);
        }
    }

    enum Behavior {
        Render,
        Empty,
        Fail,
        /// handshake: report the render start, then wait for the go-ahead
        Blocking(mpsc::Sender<()>, mpsc::Receiver<()>),
    }

    struct ScriptedRenderer {
        behavior: Behavior,
        invocations: Arc<AtomicUsize>,
    }

    impl Renderer for ScriptedRenderer {
        fn execute_job(&mut self, _job: &TileJob) -> Result<Option<TileBitmap>> {
            self.invocations.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Render => Ok(Some(TileBitmap::filled(RasterSize::square(2), color::GREEN))),
                Behavior::Empty => Ok(None),
                Behavior::Fail => Err(Error::Runtime("scripted failure".to_string())),
                Behavior::Blocking(started, proceed) => {
                    started.send(()).expect("handshake");
                    proceed.recv_timeout(Duration::from_secs(5)).expect("handshake");
                    Ok(Some(TileBitmap::filled(RasterSize::square(2), color::GREEN)))
                }
            }
        }

        fn start(&mut self) -> Result<()> {
            Ok(())
        }

        fn stop(&mut self) {}

        fn is_working(&self) -> bool {
            false
        }

        fn file_path(&self) -> &Path {
            Path::new("scripted://layer")
        }

        fn destroy(&mut self) {}
    }

    struct Fixture {
        queue: Arc<JobQueue>,
        cache: Arc<TileCache>,
        events: Arc<EventCounter>,
        invocations: Arc<AtomicUsize>,
    }

    fn fixture(behavior: Behavior) -> (Fixture, TileWorker) {
        let invocations = Arc::new(AtomicUsize::new(0));
        let renderer: Arc<Mutex<Box<dyn Renderer>>> = Arc::new(Mutex::new(Box::new(ScriptedRenderer {
            behavior,
            invocations: invocations.clone(),
        })));

        let fixture = Fixture {
            queue: Arc::new(JobQueue::new()),
            cache: Arc::new(TileCache::new()),
            events: Arc::new(EventCounter::default()),
            invocations,
        };

        let worker = TileWorker::start(
            renderer,
            fixture.queue.clone(),
            fixture.cache.clone(),
            fixture.events.clone(),
        );

        (fixture, worker)
    }

    fn job(x: i32) -> TileJob {
        TileJob::new(Tile { x, y: 0, z: 4 }, "scripted://layer", DisplayParams::default())
    }

    fn wait_until(what: &str, condition: impl Fn() -> bool) {
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(std::time::Instant::now() < deadline, "timed out waiting for {}", what);
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn renders_and_caches_pending_jobs() {
        let (fixture, worker) = fixture(Behavior::Render);

        fixture.queue.push(job(1));
        fixture.queue.push(job(2));
        wait_until("both tiles cached", || fixture.cache.len() == 2);
        worker.stop();

        assert_eq!(fixture.invocations.load(Ordering::SeqCst), 2);
        assert_eq!(fixture.events.started.load(Ordering::SeqCst), 2);
        assert_eq!(fixture.events.redraws.load(Ordering::SeqCst), 2);
        assert!(fixture.events.finished.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn duplicate_jobs_render_once() {
        let (fixture, worker) = fixture(Behavior::Render);

        // worker is paused so both submissions land before processing starts
        worker.pause();
        fixture.queue.push(job(1));
        fixture.queue.push(job(1));
        assert_eq!(fixture.queue.len(), 1, "queue deduplicates equal pending jobs");

        // resubmission after the render completes hits the cache instead
        worker.resume();
        wait_until("tile cached", || fixture.cache.len() == 1);
        fixture.queue.push(job(1));
        wait_until("queue drained", || fixture.queue.is_empty());
        worker.stop();

        assert_eq!(fixture.invocations.load(Ordering::SeqCst), 1);
        assert_eq!(fixture.cache.len(), 1);
    }

    #[test]
    fn failed_renders_drop_the_job_without_cache_write() {
        let (fixture, worker) = fixture(Behavior::Fail);

        fixture.queue.push(job(1));
        wait_until("queue drained", || {
            fixture.queue.is_empty() && fixture.invocations.load(Ordering::SeqCst) == 1
        });
        wait_until("finished notification", || fixture.events.finished.load(Ordering::SeqCst) >= 1);
        worker.stop();

        assert!(fixture.cache.is_empty());
        assert_eq!(fixture.events.redraws.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_render_results_are_tolerated() {
        let (fixture, worker) = fixture(Behavior::Empty);

        fixture.queue.push(job(1));
        wait_until("queue drained", || fixture.invocations.load(Ordering::SeqCst) == 1);
        worker.stop();

        assert!(fixture.cache.is_empty());
    }

    #[test]
    fn cancelled_render_never_writes_the_cache() {
        let (started_tx, started_rx) = mpsc::channel();
        let (proceed_tx, proceed_rx) = mpsc::channel();
        let (fixture, worker) = fixture(Behavior::Blocking(started_tx, proceed_rx));

        fixture.queue.push(job(1));
        started_rx.recv_timeout(Duration::from_secs(5)).expect("render started");

        // cancel while the render is in flight, then let it finish
        worker.cancel();
        proceed_tx.send(()).expect("handshake");
        worker.stop();

        assert!(fixture.cache.is_empty(), "cancelled result must be discarded");
        assert_eq!(fixture.events.redraws.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn pause_defers_processing() {
        let (fixture, worker) = fixture(Behavior::Render);

        worker.pause();
        fixture.queue.push(job(1));
        std::thread::sleep(Duration::from_millis(30));
        assert!(fixture.cache.is_empty(), "paused worker must not render");

        worker.resume();
        wait_until("tile cached", || fixture.cache.len() == 1);
        worker.stop();
    }
}
