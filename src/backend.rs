//! Pluggable integration and contact strategy used by [`World`](crate::World).

use cgmath::Vector3;

use crate::collision::{self, CollisionInfo};
use crate::config::ContactConfig;
use crate::rigid_body::RigidBody;

/// The four operations a world step is built from.
///
/// The world owns detection and ordering; a backend decides how forces are
/// accumulated, how a body is advanced, and how contacts are answered.
pub trait PhysicsBackend {
    fn apply_force(&self, body: &mut RigidBody, force: Vector3<f64>);

    fn integrate(&self, body: &mut RigidBody, dt: f64);

    /// Resolve contact of `body` with the plane `y = ground_y`. Returns
    /// `true` if the body was moved.
    fn resolve_ground_contact(&self, body: &mut RigidBody, ground_y: f64) -> bool;

    fn resolve_pair_contact(&self, contact: &CollisionInfo, config: &ContactConfig);
}

/// Semi-implicit Euler integration with impulse-based contacts.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImpulseBackend;

impl PhysicsBackend for ImpulseBackend {
    fn apply_force(&self, body: &mut RigidBody, force: Vector3<f64>) {
        body.add_force(force);
    }

    fn integrate(&self, body: &mut RigidBody, dt: f64) {
        body.integrate(dt);
    }

    fn resolve_ground_contact(&self, body: &mut RigidBody, ground_y: f64) -> bool {
        body.check_ground_collision(ground_y) && body.resolve_ground_collision(ground_y)
    }

    fn resolve_pair_contact(&self, contact: &CollisionInfo, config: &ContactConfig) {
        collision::resolve_contact(contact, config.restitution, config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Shape;
    use cgmath::Point3;

    #[test]
    fn test_impulse_backend_forwards_to_body() {
        let backend = ImpulseBackend;
        let mut body = RigidBody::new(Shape::sphere(0.5, 16), 2.0);
        body.set_damping(1.0, 1.0);

        backend.apply_force(&mut body, Vector3::new(4.0, 0.0, 0.0));
        assert_eq!(body.force(), Vector3::new(4.0, 0.0, 0.0));

        backend.integrate(&mut body, 0.5);
        assert_eq!(body.linear_velocity(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(body.position(), Point3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_impulse_backend_ground_contact() {
        let backend = ImpulseBackend;
        let mut body = RigidBody::new(Shape::sphere(0.5, 16), 1.0)
            .with_position(Point3::new(0.0, 0.1, 0.0));

        assert!(backend.resolve_ground_contact(&mut body, 0.0));
        assert_eq!(body.position().y, 0.5);
        assert!(!backend.resolve_ground_contact(&mut body, -1.0));
    }
}
