//! Unit system and default physical properties.
//!
//! 1 unit = 1 meter, masses are in kilograms and time in seconds.

use cgmath::Vector3;

/// Standard gravity magnitude in m/s².
pub const GRAVITY: f64 = 9.81;

/// Mass of a [`RigidBody::default`](crate::RigidBody) in kg.
pub const DEFAULT_MASS: f64 = 1.0;
/// Water density in kg/m³.
pub const DEFAULT_DENSITY: f64 = 1000.0;
pub const DEFAULT_FRICTION: f64 = 0.5;
pub const DEFAULT_RESTITUTION: f64 = 0.3;
/// Fraction of linear velocity retained per integration step.
pub const DEFAULT_LINEAR_DAMPING: f64 = 0.99;
/// Fraction of angular velocity retained per integration step.
pub const DEFAULT_ANGULAR_DAMPING: f64 = 0.99;

pub const DEFAULT_TIME_STEP: f64 = 1.0 / 60.0;
/// Most fixed steps taken per `World::step_fixed` call before time is dropped.
pub const DEFAULT_MAX_SUBSTEPS: u32 = 8;
/// Ground plane height used by a default [`World`](crate::World).
pub const DEFAULT_GROUND_LEVEL: f64 = -1.0;

/// Restitution used by pair resolution when the caller has no better value.
pub const DEFAULT_PAIR_RESTITUTION: f64 = 0.7;
/// Fraction of the penetration removed per positional correction.
pub const CORRECTION_PERCENT: f64 = 0.2;
/// Penetration tolerated before positional correction kicks in.
pub const CORRECTION_SLOP: f64 = 0.01;

/// Dimensions used by [`Shape::default_of`](crate::Shape::default_of).
pub const DEFAULT_SPHERE_RADIUS: f64 = 0.5;
pub const DEFAULT_BOX_SIZE: f64 = 1.0;
pub const DEFAULT_CYLINDER_RADIUS: f64 = 0.5;
pub const DEFAULT_CYLINDER_HEIGHT: f64 = 1.0;
pub const DEFAULT_PLANE_SIZE: f64 = 10.0;

pub const DEFAULT_SPHERE_SEGMENTS: u32 = 32;
pub const DEFAULT_CYLINDER_SEGMENTS: u32 = 16;

/// Half-thickness given to planes when they need a bounding box.
pub const PLANE_HALF_THICKNESS: f64 = 0.01;
/// Scale applied to mass for a plane's effectively infinite inertia.
pub const PLANE_INERTIA_SCALE: f64 = 1e6;

/// Maximum bodies kept per shape key in a [`BodyPool`](crate::BodyPool).
pub const POOL_CAPACITY_PER_KEY: usize = 50;
/// Bodies created per warm shape by [`BodyPool::preallocate`](crate::BodyPool::preallocate).
pub const POOL_PREALLOCATE_COUNT: usize = 20;

/// Default gravity vector, pointing down the Y axis.
pub fn default_gravity() -> Vector3<f64> {
    Vector3::new(0.0, -GRAVITY, 0.0)
}
