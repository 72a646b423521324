//! Contact detection and impulse resolution.
//!
//! Pair detection is a deliberate O(n²) scan over all distinct pairs; there
//! is no broad phase. Every body is approximated by its bounding sphere
//! (the real radius derived from its shape), which is exact for spheres.

use std::sync::{Arc, MutexGuard};

use cgmath::{InnerSpace, Point3, Vector3, Zero};
use log::{trace, warn};

use crate::config::ContactConfig;
use crate::handle::{BodyLock, BodyRef};
use crate::rigid_body::RigidBody;

/// One detected contact.
///
/// `body_b` is `None` for ground contacts; the ground is an immovable
/// implicit plane. `contact_normal` points from `body_a` toward `body_b`,
/// or away from the ground for ground contacts.
#[derive(Debug, Clone)]
pub struct CollisionInfo {
    pub body_a: BodyRef,
    pub body_b: Option<BodyRef>,
    pub contact_point: Point3<f64>,
    pub contact_normal: Vector3<f64>,
    pub penetration: f64,
}

impl CollisionInfo {
    pub fn is_ground_contact(&self) -> bool {
        self.body_b.is_none()
    }
}

/// Position and bounding radius of a body, or `None` if it is held elsewhere.
fn bounding_sphere(body: &BodyRef) -> Option<(Point3<f64>, f64)> {
    let Some(body) = body.try_lock_body() else {
        warn!("skipping pair test: body is locked");
        return None;
    };
    Some((body.position(), body.shape().bounding_radius()))
}

/// Sphere-sphere test between the bounding spheres of two bodies.
fn sphere_contact(a: &BodyRef, b: &BodyRef) -> Option<CollisionInfo> {
    let (pos_a, radius_a) = bounding_sphere(a)?;
    let (pos_b, radius_b) = bounding_sphere(b)?;

    let offset = pos_b - pos_a;
    let distance = offset.magnitude();
    let min_distance = radius_a + radius_b;
    if distance >= min_distance {
        return None;
    }

    // Coincident centres have no direction; separate along +Y.
    let normal = if distance > 0.0 {
        offset / distance
    } else {
        Vector3::unit_y()
    };

    Some(CollisionInfo {
        body_a: Arc::clone(a),
        body_b: Some(Arc::clone(b)),
        contact_point: pos_a + normal * radius_a,
        contact_normal: normal,
        penetration: min_distance - distance,
    })
}

/// Contact between a body's world bounding box and the plane `y = ground_y`.
fn ground_contact(body: &BodyRef, ground_y: f64) -> Option<CollisionInfo> {
    let (penetration, position) = {
        let Some(rigid) = body.try_lock_body() else {
            warn!("skipping ground test: body is locked");
            return None;
        };
        if !rigid.check_ground_collision(ground_y) {
            return None;
        }
        (rigid.ground_penetration(ground_y), rigid.position())
    };

    Some(CollisionInfo {
        body_a: Arc::clone(body),
        body_b: None,
        contact_point: Point3::new(position.x, ground_y, position.z),
        contact_normal: Vector3::unit_y(),
        penetration: penetration.max(0.0),
    })
}

/// Resolve one contact with a single normal impulse plus Baumgarte-style
/// positional correction.
///
/// The combined restitution is `restitution²`. Separating contacts are left
/// alone. A ground contact treats the plane as an immovable first body.
pub fn resolve_contact(info: &CollisionInfo, restitution: f64, config: &ContactConfig) {
    type Guard<'a> = Option<MutexGuard<'a, RigidBody>>;

    let (mut first, mut second): (Guard<'_>, Guard<'_>) = match &info.body_b {
        Some(b) if Arc::ptr_eq(b, &info.body_a) => return,
        Some(b) => match (info.body_a.try_lock_body(), b.try_lock_body()) {
            (Some(a), Some(b)) => (Some(a), Some(b)),
            _ => {
                warn!("skipping contact: body is locked");
                return;
            }
        },
        None => match info.body_a.try_lock_body() {
            Some(a) => (None, Some(a)),
            None => {
                warn!("skipping ground contact: body is locked");
                return;
            }
        },
    };

    let inverse_mass =
        |body: &Guard<'_>| body.as_ref().map_or(0.0, |b| b.inverse_mass());
    let velocity =
        |body: &Guard<'_>| body.as_ref().map_or(Vector3::zero(), |b| b.linear_velocity());

    let inv_first = inverse_mass(&first);
    let inv_second = inverse_mass(&second);
    let total_inverse_mass = inv_first + inv_second;
    if total_inverse_mass <= 0.0 {
        return;
    }

    let normal = info.contact_normal;
    let vel_first = velocity(&first);
    let vel_second = velocity(&second);
    let velocity_along_normal = (vel_second - vel_first).dot(normal);
    if velocity_along_normal > 0.0 {
        return;
    }

    let e = restitution * restitution;
    let impulse_scalar = -(1.0 + e) * velocity_along_normal / total_inverse_mass;
    let impulse = normal * impulse_scalar;
    trace!(
        "contact impulse {impulse_scalar:.4} (penetration {:.4})",
        info.penetration
    );

    let correction = normal
        * (config.correction_percent * (info.penetration - config.slop).max(0.0)
            / total_inverse_mass);

    if let Some(body) = first.as_mut() {
        if inv_first > 0.0 {
            body.set_linear_velocity(vel_first - impulse * inv_first);
            let position = body.position() - correction * inv_first;
            body.set_position(position);
        }
    }
    if let Some(body) = second.as_mut() {
        if inv_second > 0.0 {
            body.set_linear_velocity(vel_second + impulse * inv_second);
            let position = body.position() + correction * inv_second;
            body.set_position(position);
        }
    }
}

/// Detects and resolves body-body and body-ground contacts.
#[derive(Debug, Clone, Default)]
pub struct CollisionSystem {
    config: ContactConfig,
}

impl CollisionSystem {
    pub fn new(config: ContactConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ContactConfig {
        &self.config
    }

    /// All contacts between distinct pairs of `bodies`.
    pub fn check_collisions(&self, bodies: &[BodyRef]) -> Vec<CollisionInfo> {
        let mut collisions = Vec::new();
        for (i, a) in bodies.iter().enumerate() {
            for b in &bodies[i + 1..] {
                if Arc::ptr_eq(a, b) {
                    continue;
                }
                if let Some(info) = sphere_contact(a, b) {
                    collisions.push(info);
                }
            }
        }
        trace!(
            "pair pass: {} bodies, {} contacts",
            bodies.len(),
            collisions.len()
        );
        collisions
    }

    /// Contact of `body` with the ground plane, if any.
    pub fn check_ground_collision(&self, body: &BodyRef, ground_y: f64) -> Option<CollisionInfo> {
        ground_contact(body, ground_y)
    }

    /// Resolve one contact with an explicit restitution.
    pub fn resolve_collision(&self, info: &CollisionInfo, restitution: f64) {
        resolve_contact(info, restitution, &self.config);
    }

    /// Resolve contacts in order with the configured pair restitution.
    pub fn resolve_collisions(&self, collisions: &[CollisionInfo]) {
        for info in collisions {
            self.resolve_collision(info, self.config.restitution);
        }
    }

    /// Detect and resolve all pair contacts; returns what was detected.
    pub fn step_pairs(&self, bodies: &[BodyRef]) -> Vec<CollisionInfo> {
        let collisions = self.check_collisions(bodies);
        self.resolve_collisions(&collisions);
        collisions
    }

    /// Test every body against the ground plane and resolve each contact
    /// with the body's own restitution and friction. Returns the contacts
    /// that were resolved, as detected before resolution.
    pub fn check_ground_collisions(&self, bodies: &[BodyRef], ground_y: f64) -> Vec<CollisionInfo> {
        let mut resolved = Vec::new();
        for body in bodies {
            let Some(info) = ground_contact(body, ground_y) else {
                continue;
            };
            let Some(mut rigid) = body.try_lock_body() else {
                warn!("skipping ground contact: body is locked");
                continue;
            };
            if rigid.resolve_ground_collision(ground_y) {
                resolved.push(info);
            }
        }
        resolved
    }
}
