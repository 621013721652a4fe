use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::{TileBitmap, TileJob};

/// Shared bitmap cache keyed by tile job identity.
/// The worker writes, the display side reads, all access is internally locked.
#[derive(Default)]
pub struct TileCache {
    entries: Mutex<HashMap<TileJob, Arc<TileBitmap>>>,
}

impl TileCache {
    pub fn new() -> Self {
        TileCache::default()
    }

    pub fn contains(&self, job: &TileJob) -> bool {
        self.entries.lock().expect("tile cache poisoned").contains_key(job)
    }

    pub fn get(&self, job: &TileJob) -> Option<Arc<TileBitmap>> {
        self.entries.lock().expect("tile cache poisoned").get(job).cloned()
    }

    /// Stores a rendered bitmap, keeps the existing entry on double insert.
    /// Returns whether the bitmap was actually stored.
    pub fn insert(&self, job: TileJob, bitmap: Arc<TileBitmap>) -> bool {
        let mut entries = self.entries.lock().expect("tile cache poisoned");
        if entries.contains_key(&job) {
            return false;
        }

        entries.insert(job, bitmap);
        true
    }

    pub fn remove(&self, job: &TileJob) -> Option<Arc<TileBitmap>> {
        self.entries.lock().expect("tile cache poisoned").remove(job)
    }

    pub fn clear(&self) {
        self.entries.lock().expect("tile cache poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("tile cache poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
