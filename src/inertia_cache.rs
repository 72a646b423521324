//! Memoised inertia tensors keyed by shape and mass.
//!
//! The cache is an explicitly constructed service: share it between bodies
//! and pools with an `Arc`. A single mutex guards the map so scenes can be
//! assembled from several threads.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cgmath::Matrix3;
use log::debug;

use crate::shape::{Shape, ShapeKey};

#[derive(Debug, Default)]
struct CacheState {
    tensors: HashMap<ShapeKey, Matrix3<f64>>,
    hits: u64,
    misses: u64,
}

/// Hit/miss counters of an [`InertiaTensorCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Thread-safe memo of inertia tensors.
#[derive(Debug, Default)]
pub struct InertiaTensorCache {
    state: Mutex<CacheState>,
}

impl InertiaTensorCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached tensor for `key`, or `None` if nothing was stored for it.
    pub fn get(&self, key: &ShapeKey) -> Option<Matrix3<f64>> {
        let mut state = self.lock();
        let found = state.tensors.get(key).copied();
        if found.is_some() {
            state.hits += 1;
        } else {
            state.misses += 1;
        }
        found
    }

    /// Store `tensor` under `key`, replacing any previous entry.
    pub fn put(&self, key: ShapeKey, tensor: Matrix3<f64>) {
        self.lock().tensors.insert(key, tensor);
    }

    /// Cached tensor of `shape` at `mass`, computing and storing it on a miss.
    pub fn get_or_compute(&self, shape: &Shape, mass: f64) -> Matrix3<f64> {
        let key = shape.key(mass);
        if let Some(tensor) = self.get(&key) {
            return tensor;
        }

        // Computed outside the lock; a concurrent miss computes the same value.
        let tensor = shape.inertia_tensor(mass);
        self.put(key, tensor);
        tensor
    }

    pub fn len(&self) -> usize {
        self.lock().tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().tensors.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            entries: state.tensors.len(),
            hits: state.hits,
            misses: state.misses,
        }
    }

    /// Drop all entries and reset the counters.
    pub fn clear(&self) {
        let mut state = self.lock();
        let dropped = state.tensors.len();
        *state = CacheState::default();
        debug!("inertia tensor cache cleared ({dropped} entries)");
    }
}
