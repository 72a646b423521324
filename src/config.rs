//! Configuration for the world, contact resolution and body pooling.

use cgmath::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{PhysicsError, Result};

/// Parameters of the impulse contact solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContactConfig {
    /// Fraction of the penetration (beyond `slop`) removed per correction.
    pub correction_percent: f64,
    /// Penetration depth that is tolerated without positional correction.
    pub slop: f64,
    /// Restitution used for body-body contacts.
    pub restitution: f64,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            correction_percent: constants::CORRECTION_PERCENT,
            slop: constants::CORRECTION_SLOP,
            restitution: constants::DEFAULT_PAIR_RESTITUTION,
        }
    }
}

impl ContactConfig {
    /// Set the pair restitution.
    #[must_use]
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.restitution = restitution;
        self
    }

    /// Set the positional correction parameters.
    #[must_use]
    pub fn with_correction(mut self, percent: f64, slop: f64) -> Self {
        self.correction_percent = percent;
        self.slop = slop;
        self
    }

    /// Validate the contact parameters.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return Err(PhysicsError::invalid_config(format!(
                "correction percent {} not in [0, 1]",
                self.correction_percent
            )));
        }
        if !self.slop.is_finite() || self.slop < 0.0 {
            return Err(PhysicsError::invalid_config(format!(
                "slop {} must be finite and non-negative",
                self.slop
            )));
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(PhysicsError::invalid_config(format!(
                "restitution {} not in [0, 1]",
                self.restitution
            )));
        }
        Ok(())
    }
}

/// Main configuration of a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhysicsConfig {
    /// Gravity acceleration applied to every dynamic body (m/s²).
    pub gravity: Vector3<f64>,
    /// Height of the implicit ground plane.
    pub ground_level: f64,
    /// Fixed step used by [`World::step_fixed`](crate::World::step_fixed).
    pub time_step: f64,
    /// Upper bound on fixed steps taken by a single `step_fixed` call.
    pub max_substeps: u32,
    /// Whether `World::update` also runs the pairwise pass.
    pub resolve_pairs: bool,
    /// Leave sleeping bodies untouched in `World::update` instead of letting
    /// gravity wake them.
    pub freeze_sleeping: bool,
    /// Contact solver parameters.
    pub contact: ContactConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: constants::default_gravity(),
            ground_level: constants::DEFAULT_GROUND_LEVEL,
            time_step: constants::DEFAULT_TIME_STEP,
            max_substeps: constants::DEFAULT_MAX_SUBSTEPS,
            resolve_pairs: false,
            freeze_sleeping: false,
            contact: ContactConfig::default(),
        }
    }
}

impl PhysicsConfig {
    /// Configuration with the given gravity.
    #[must_use]
    pub fn with_gravity(mut self, gravity: Vector3<f64>) -> Self {
        self.gravity = gravity;
        self
    }

    /// Zero-G environment.
    #[must_use]
    pub fn zero_gravity(mut self) -> Self {
        self.gravity = Vector3::new(0.0, 0.0, 0.0);
        self
    }

    #[must_use]
    pub fn with_ground_level(mut self, ground_level: f64) -> Self {
        self.ground_level = ground_level;
        self
    }

    #[must_use]
    pub fn with_time_step(mut self, time_step: f64) -> Self {
        self.time_step = time_step;
        self
    }

    #[must_use]
    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps;
        self
    }

    /// Also resolve body-body contacts inside `World::update`.
    #[must_use]
    pub fn with_pair_resolution(mut self) -> Self {
        self.resolve_pairs = true;
        self
    }

    /// Sleeping bodies stay put until something else wakes them.
    #[must_use]
    pub fn with_sleeping_frozen(mut self) -> Self {
        self.freeze_sleeping = true;
        self
    }

    #[must_use]
    pub fn with_contact(mut self, contact: ContactConfig) -> Self {
        self.contact = contact;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(PhysicsError::InvalidTimestep(self.time_step));
        }
        if self.time_step > 1.0 {
            return Err(PhysicsError::invalid_config(
                "time step > 1 second is likely an error",
            ));
        }
        if self.max_substeps == 0 {
            return Err(PhysicsError::invalid_config("max substeps must be at least 1"));
        }
        if !(self.gravity.x.is_finite() && self.gravity.y.is_finite() && self.gravity.z.is_finite())
        {
            return Err(PhysicsError::invalid_config("gravity must be finite"));
        }
        if !self.ground_level.is_finite() {
            return Err(PhysicsError::invalid_config("ground level must be finite"));
        }
        self.contact.validate()
    }
}

/// Sizing of a [`BodyPool`](crate::BodyPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolConfig {
    /// Maximum bodies queued per shape key; releases beyond it are dropped.
    pub capacity_per_key: usize,
    /// Bodies created per warm shape by `preallocate`.
    pub preallocate_count: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity_per_key: constants::POOL_CAPACITY_PER_KEY,
            preallocate_count: constants::POOL_PREALLOCATE_COUNT,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn with_capacity(mut self, capacity_per_key: usize) -> Self {
        self.capacity_per_key = capacity_per_key;
        self
    }

    #[must_use]
    pub fn with_preallocate_count(mut self, preallocate_count: usize) -> Self {
        self.preallocate_count = preallocate_count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PhysicsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.gravity, Vector3::new(0.0, -9.81, 0.0));
        assert_eq!(config.ground_level, -1.0);
        assert!(!config.resolve_pairs);
        assert!(!config.freeze_sleeping);
    }

    #[test]
    fn test_invalid_timestep() {
        let config = PhysicsConfig::default().with_time_step(0.0);
        assert_eq!(config.validate(), Err(PhysicsError::InvalidTimestep(0.0)));

        let config = PhysicsConfig::default().with_time_step(f64::NAN);
        assert!(config.validate().is_err());

        let config = PhysicsConfig::default().with_time_step(2.0);
        assert!(matches!(
            config.validate(),
            Err(PhysicsError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_invalid_contact() {
        let config = PhysicsConfig::default()
            .with_contact(ContactConfig::default().with_correction(1.5, 0.01));
        assert!(config.validate().is_err());

        let contact = ContactConfig::default().with_restitution(-0.1);
        assert!(contact.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = PhysicsConfig::default()
            .zero_gravity()
            .with_ground_level(0.0)
            .with_pair_resolution()
            .with_sleeping_frozen();
        assert_eq!(config.gravity, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(config.ground_level, 0.0);
        assert!(config.resolve_pairs);
        assert!(config.freeze_sleeping);

        let pool = PoolConfig::default().with_capacity(3).with_preallocate_count(1);
        assert_eq!(pool.capacity_per_key, 3);
        assert_eq!(pool.preallocate_count, 1);
    }
}
