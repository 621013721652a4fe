use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use crate::TileJob;

struct QueueState {
    jobs: VecDeque<TileJob>,
    closed: bool,
}

/// Synchronized FIFO of pending tile jobs.
/// `take` blocks until a job arrives, `remove` is non blocking, closing the
/// queue wakes every waiter and makes `take` return `None`.
pub struct JobQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl Default for JobQueue {
    fn default() -> Self {
        JobQueue::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        JobQueue {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                closed: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Appends a job, equal jobs that are already pending are not queued twice.
    /// Returns whether the job was queued.
    pub fn push(&self, job: TileJob) -> bool {
        let mut state = self.state.lock().expect("job queue poisoned");
        if state.closed || state.jobs.contains(&job) {
            return false;
        }

        state.jobs.push_back(job);
        self.available.notify_one();
        true
    }

    /// Blocks until the head job is available, `None` once the queue is closed
    pub fn take(&self) -> Option<TileJob> {
        let mut state = self.state.lock().expect("job queue poisoned");
        loop {
            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }

            if state.closed {
                return None;
            }

            state = self.available.wait(state).expect("job queue poisoned");
        }
    }

    pub fn remove(&self, job: &TileJob) -> bool {
        let mut state = self.state.lock().expect("job queue poisoned");
        match state.jobs.iter().position(|pending| pending == job) {
            Some(index) => {
                state.jobs.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, job: &TileJob) -> bool {
        self.state.lock().expect("job queue poisoned").jobs.contains(job)
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().expect("job queue poisoned").jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.state.lock().expect("job queue poisoned").jobs.len()
    }

    pub fn close(&self) {
        self.state.lock().expect("job queue poisoned").closed = true;
        self.available.notify_all();
    }
}
