//! Resolved assets and the broadcast signal every waiter blocks on

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex};
use quarry_core::AssetIdentity;

use crate::asset::Asset;

/// One coarse "something was loaded or failed" signal.
///
/// Every broadcast bumps a generation counter so a waiter that observed
/// generation `n` before checking state never misses a broadcast that
/// happened after the check.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    generation: Mutex<u64>,
    changed: Condvar,
}

impl CompletionSignal {
    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    pub fn broadcast(&self) {
        let mut generation = self.generation.lock();
        *generation = generation.wrapping_add(1);
        self.changed.notify_all();
    }

    /// Wait until a broadcast newer than `seen` happens or `deadline` passes.
    /// Returns false on timeout.
    pub fn wait_past(&self, seen: u64, deadline: Instant) -> bool {
        let mut generation = self.generation.lock();
        while *generation == seen {
            if self.changed.wait_until(&mut generation, deadline).timed_out() {
                return *generation != seen;
            }
        }
        true
    }
}

/// Map from identity to resolved, shared asset.
#[derive(Debug, Default)]
pub struct LoadedTable {
    assets: Mutex<HashMap<AssetIdentity, Arc<Asset>>>,
    signal: CompletionSignal,
}

impl LoadedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `asset` under `id`. Returns false (and keeps the existing
    /// entry) if the identity was already published.
    pub fn insert(&self, id: AssetIdentity, asset: Arc<Asset>) -> bool {
        let mut assets = self.assets.lock();
        if assets.contains_key(&id) {
            return false;
        }
        assets.insert(id, asset);
        true
    }

    pub fn get(&self, id: &AssetIdentity) -> Option<Arc<Asset>> {
        self.assets.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &AssetIdentity) -> bool {
        self.assets.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.assets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn signal(&self) -> &CompletionSignal {
        &self.signal
    }
}
