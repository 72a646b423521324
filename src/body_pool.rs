//! Recycling of rigid bodies, bucketed by shape and mass.
//!
//! The pool is a two-level structure: a global map from [`ShapeKey`] to a
//! per-key queue, each with its own lock. Locks are always taken in the
//! order global then per-key, and the global lock is held for the whole
//! per-key operation so that `clear` cannot detach a queue mid-update.
//!
//! Pooled bodies are the same [`BodyRef`] handles a
//! [`World`](crate::World) simulates, so a body keeps its allocation across
//! acquire, simulation and release.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace, warn};

use crate::config::PoolConfig;
use crate::constants;
use crate::handle::{body_ref, BodyLock, BodyRef};
use crate::inertia_cache::InertiaTensorCache;
use crate::rigid_body::RigidBody;
use crate::shape::{Shape, ShapeKey, ShapeKind};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct ShapePoolState {
    available: VecDeque<BodyRef>,
    created: usize,
    reused: usize,
}

#[derive(Debug, Default)]
struct ShapePool {
    state: Mutex<ShapePoolState>,
}

/// Counters of a single shape key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapePoolStats {
    pub available: usize,
    pub created: usize,
    pub reused: usize,
}

/// Counters summed over every shape key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub pools: usize,
    pub available: usize,
    pub created: usize,
    pub reused: usize,
}

/// Thread-safe pool of reusable bodies.
#[derive(Debug, Default)]
pub struct BodyPool {
    config: PoolConfig,
    pools: Mutex<HashMap<ShapeKey, ShapePool>>,
    inertia_cache: Option<Arc<InertiaTensorCache>>,
}

impl BodyPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            pools: Mutex::new(HashMap::new()),
            inertia_cache: None,
        }
    }

    /// Bodies created by this pool share `cache` for their inertia tensors.
    #[must_use]
    pub fn with_inertia_cache(mut self, cache: Arc<InertiaTensorCache>) -> Self {
        self.inertia_cache = Some(cache);
        self
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Run `f` on the queue for `key` with both locks held.
    fn with_shape_pool<R>(&self, key: ShapeKey, f: impl FnOnce(&mut ShapePoolState) -> R) -> R {
        let mut pools = lock(&self.pools);
        let pool = pools.entry(key).or_default();
        let mut state = lock(&pool.state);
        f(&mut state)
    }

    fn create_body(&self, shape: Shape, mass: f64) -> RigidBody {
        let body = RigidBody::new(shape, mass);
        match &self.inertia_cache {
            Some(cache) => body.with_inertia_cache(Arc::clone(cache)),
            None => body,
        }
    }

    /// Take a body with `shape` and `mass`, reusing a released one if the
    /// matching queue is non-empty. The body is always in its reset state.
    pub fn acquire(&self, shape: Shape, mass: f64) -> BodyRef {
        let key = shape.key(mass);
        let recycled = self.with_shape_pool(key, |state| {
            let recycled = state.available.pop_front();
            if recycled.is_some() {
                state.reused += 1;
            } else {
                state.created += 1;
            }
            recycled
        });

        let Some(handle) = recycled else {
            trace!("creating body {key}");
            return body_ref(self.create_body(shape, mass));
        };

        trace!("reusing pooled body {key}");
        {
            let mut body = handle.lock_body();
            body.reset();
            body.set_shape(shape);
            body.set_mass(mass);
            if body.inertia_cache().is_none() {
                if let Some(cache) = &self.inertia_cache {
                    body.set_inertia_cache(Some(Arc::clone(cache)));
                }
            }
        }
        handle
    }

    /// Return a body to the pool. It is reset and queued under its current
    /// shape and mass. Returns whether it was queued.
    ///
    /// Only the last handle can be released: a body that is still cloned
    /// elsewhere or registered in a world is dropped from the pool's point of
    /// view and left to its other owners. Remove it from the world first. A
    /// body is also dropped when its queue is already full.
    pub fn release(&self, mut handle: BodyRef) -> bool {
        let Some(cell) = Arc::get_mut(&mut handle) else {
            warn!("not pooling a body that is still shared or registered in a world");
            return false;
        };
        let body = cell.get_mut().unwrap_or_else(PoisonError::into_inner);
        let key = body.shape().key(body.mass());
        body.reset();

        let capacity = self.config.capacity_per_key;
        let queued = self.with_shape_pool(key, |state| {
            if state.available.len() < capacity {
                state.available.push_back(handle);
                true
            } else {
                false
            }
        });
        if !queued {
            debug!("pool for {key} is full; dropping released body");
        }
        queued
    }

    /// Create up to `count` bodies for `shape` and `mass` ahead of time,
    /// stopping at the per-key capacity. Returns how many were added.
    pub fn preallocate_shape(&self, shape: Shape, mass: f64, count: usize) -> usize {
        let capacity = self.config.capacity_per_key;
        self.with_shape_pool(shape.key(mass), |state| {
            let added = count.min(capacity.saturating_sub(state.available.len()));
            for _ in 0..added {
                state.available.push_back(body_ref(self.create_body(shape, mass)));
            }
            state.created += added;
            added
        })
    }

    /// Warm the pool with the commonly used shapes.
    pub fn preallocate(&self) {
        let count = self.config.preallocate_count;
        let warm = [
            (Shape::default_of(ShapeKind::Box), 10.0),
            (Shape::cuboid(0.4, 0.4, 0.4), 1.0),
            (Shape::default_of(ShapeKind::Sphere), 5.0),
            (Shape::sphere(0.3, constants::DEFAULT_SPHERE_SEGMENTS), 1.0),
        ];

        let mut total = 0;
        for (shape, mass) in warm {
            total += self.preallocate_shape(shape, mass, count);
        }
        debug!("preallocated {total} bodies across {} shapes", warm.len());
    }

    /// Counters for one key, or `None` if the key was never used.
    pub fn key_stats(&self, key: &ShapeKey) -> Option<ShapePoolStats> {
        let pools = lock(&self.pools);
        let pool = pools.get(key)?;
        let state = lock(&pool.state);
        Some(ShapePoolStats {
            available: state.available.len(),
            created: state.created,
            reused: state.reused,
        })
    }

    pub fn stats(&self) -> PoolStats {
        let pools = lock(&self.pools);
        pools.values().fold(
            PoolStats {
                pools: pools.len(),
                ..PoolStats::default()
            },
            |mut stats, pool| {
                let state = lock(&pool.state);
                stats.available += state.available.len();
                stats.created += state.created;
                stats.reused += state.reused;
                stats
            },
        )
    }

    pub fn total_available(&self) -> usize {
        self.stats().available
    }

    /// Drop every queued body and all counters.
    pub fn clear(&self) {
        let mut pools = lock(&self.pools);
        let dropped = pools.len();
        pools.clear();
        debug!("body pool cleared ({dropped} shape keys)");
    }
}
