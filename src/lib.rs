//! A small rigid-body physics core.
//!
//! Bodies carry a [`Shape`], mass properties and material coefficients and
//! are advanced by a [`World`] with semi-implicit Euler integration. Contacts
//! against an implicit ground plane and (optionally) between bodies are
//! answered with impulses. An [`InertiaTensorCache`] and a [`BodyPool`]
//! avoid repeated work in scenes that spawn many similar bodies.
//!
//! ```no_run
//! use rigid_physics::{body_ref, PhysicsConfig, RigidBody, Shape, World};
//!
//! let mut world = World::new(PhysicsConfig::default());
//! let ball = body_ref(RigidBody::new(Shape::sphere(0.5, 32), 1.0));
//! world.add_body(&ball);
//! world.update(1.0 / 60.0);
//! ```

pub mod backend;
pub mod body_pool;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod handle;
pub mod inertia_cache;
pub mod rigid_body;
pub mod shape;
pub mod world;

pub use backend::{ImpulseBackend, PhysicsBackend};
pub use body_pool::{BodyPool, PoolStats, ShapePoolStats};
pub use collision::{CollisionInfo, CollisionSystem};
pub use config::{ContactConfig, PhysicsConfig, PoolConfig};
pub use error::{PhysicsError, Result};
pub use handle::{body_ref, BodyLock, BodyRef};
pub use inertia_cache::{CacheStats, InertiaTensorCache};
pub use rigid_body::RigidBody;
pub use shape::{Primitive, Shape, ShapeKey, ShapeKind};
pub use world::World;
