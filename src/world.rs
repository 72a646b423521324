//! The simulation container.
//!
//! A world does not own its bodies. The scene keeps them alive through
//! [`BodyRef`] handles and the world only holds weak references, so a body
//! dropped by the scene silently disappears from the simulation.

use std::sync::{Arc, Mutex, Weak};

use cgmath::Vector3;
use log::{debug, trace, warn};

use crate::backend::{ImpulseBackend, PhysicsBackend};
use crate::collision::CollisionSystem;
use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, Result};
use crate::handle::{BodyLock, BodyRef};
use crate::rigid_body::RigidBody;

pub struct World<B: PhysicsBackend = ImpulseBackend> {
    config: PhysicsConfig,
    bodies: Vec<Weak<Mutex<RigidBody>>>,
    collision_system: CollisionSystem,
    backend: B,
    accumulator: f64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl World {
    pub fn new(config: PhysicsConfig) -> Self {
        Self::with_backend(config, ImpulseBackend)
    }

    /// Like [`World::new`], but validates the configuration first.
    pub fn try_new(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }
}

impl<B: PhysicsBackend> World<B> {
    pub fn with_backend(config: PhysicsConfig, backend: B) -> Self {
        Self {
            collision_system: CollisionSystem::new(config.contact),
            config,
            bodies: Vec::new(),
            backend,
            accumulator: 0.0,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn collision_system(&self) -> &CollisionSystem {
        &self.collision_system
    }

    pub fn gravity(&self) -> Vector3<f64> {
        self.config.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vector3<f64>) {
        self.config.gravity = gravity;
    }

    pub fn ground_level(&self) -> f64 {
        self.config.ground_level
    }

    pub fn set_ground_level(&mut self, ground_level: f64) {
        self.config.ground_level = ground_level;
    }

    /// Register a body. Registering the same body twice is a no-op.
    pub fn add_body(&mut self, body: &BodyRef) {
        if self.contains(body) {
            debug!("body already registered");
            return;
        }
        self.bodies.push(Arc::downgrade(body));
    }

    /// Unregister a body. Returns whether it was registered.
    pub fn remove_body(&mut self, body: &BodyRef) -> bool {
        let weak = Arc::downgrade(body);
        let before = self.bodies.len();
        self.bodies.retain(|registered| !registered.ptr_eq(&weak));
        self.bodies.len() != before
    }

    pub fn contains(&self, body: &BodyRef) -> bool {
        let weak = Arc::downgrade(body);
        self.bodies.iter().any(|registered| registered.ptr_eq(&weak))
    }

    /// Number of registered bodies that are still alive.
    pub fn body_count(&self) -> usize {
        self.bodies
            .iter()
            .filter(|body| body.strong_count() > 0)
            .count()
    }

    /// Strong handles to every live body, pruning dropped ones.
    pub fn bodies(&mut self) -> Vec<BodyRef> {
        let before = self.bodies.len();
        self.bodies.retain(|body| body.strong_count() > 0);
        if self.bodies.len() != before {
            debug!("pruned {} dropped bodies", before - self.bodies.len());
        }
        self.bodies.iter().filter_map(Weak::upgrade).collect()
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// Gravity is applied to every dynamic body with gravity enabled (which
    /// wakes it) and every dynamic body is integrated. The pairwise pass runs
    /// if enabled, and finally every body is resolved against the ground
    /// plane. With `freeze_sleeping` set, sleeping bodies are skipped.
    pub fn update(&mut self, dt: f64) {
        let bodies = self.bodies();
        trace!("world update: dt {dt}, {} bodies", bodies.len());

        for handle in &bodies {
            let Some(mut body) = handle.try_lock_body() else {
                warn!("skipping locked body during integration");
                continue;
            };
            if body.is_static() || (self.config.freeze_sleeping && body.is_sleeping()) {
                continue;
            }
            if body.is_gravity_enabled() {
                let weight = self.config.gravity * body.mass();
                self.backend.apply_force(&mut body, weight);
            }
            self.backend.integrate(&mut body, dt);
        }

        if self.config.resolve_pairs {
            let contacts = self.collision_system.check_collisions(&bodies);
            for contact in &contacts {
                self.backend
                    .resolve_pair_contact(contact, &self.config.contact);
            }
        }

        let ground_y = self.config.ground_level;
        for handle in &bodies {
            if let Some(mut body) = handle.try_lock_body() {
                self.backend.resolve_ground_contact(&mut body, ground_y);
            }
        }
    }

    /// Advance by whole fixed steps of `config.time_step`, carrying the
    /// remainder to the next call. At most `config.max_substeps` steps run
    /// per call; time beyond that is dropped. Returns the number of steps.
    pub fn step_fixed(&mut self, elapsed: f64) -> Result<u32> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(PhysicsError::InvalidTimestep(elapsed));
        }
        let step = self.config.time_step;
        if !step.is_finite() || step <= 0.0 {
            return Err(PhysicsError::InvalidTimestep(step));
        }

        self.accumulator += elapsed;
        let mut steps = 0;
        while self.accumulator >= step && steps < self.config.max_substeps {
            self.update(step);
            self.accumulator -= step;
            steps += 1;
        }
        if self.accumulator >= step {
            warn!(
                "dropping {:.4}s of simulation time after {steps} steps",
                self.accumulator
            );
            self.accumulator %= step;
        }
        Ok(steps)
    }

    /// Time carried over to the next `step_fixed` call.
    pub fn accumulated_time(&self) -> f64 {
        self.accumulator
    }
}
