use std::sync::Arc;

use cgmath::{
    EuclideanSpace, InnerSpace, Matrix, Matrix3, Matrix4, Point3, Quaternion, SquareMatrix,
    Vector3, Zero,
};
use log::{debug, trace, warn};

use crate::constants;
use crate::error::{PhysicsError, Result};
use crate::inertia_cache::InertiaTensorCache;
use crate::shape::Shape;

fn identity_rotation() -> Quaternion<f64> {
    Quaternion::new(1.0, 0.0, 0.0, 0.0)
}

/// One simulated object.
///
/// A body is either *static* (inverse mass 0, never integrated) or
/// *dynamic*. Non-positive mass always means static. Mass properties are
/// recomputed whenever the mass, shape or scale changes.
#[derive(Debug, Clone)]
pub struct RigidBody {
    shape: Shape,

    // Linear
    position: Point3<f64>,
    linear_velocity: Vector3<f64>,
    mass: f64,
    inverse_mass: f64,

    // Angular
    orientation: Quaternion<f64>,
    angular_velocity: Vector3<f64>,
    inertia_tensor: Matrix3<f64>,
    inverse_inertia_tensor: Matrix3<f64>,

    // Material
    density: f64,
    friction: f64,
    restitution: f64,
    linear_damping: f64,
    angular_damping: f64,

    // Cleared after every integration step
    force: Vector3<f64>,
    torque: Vector3<f64>,

    is_static: bool,
    gravity_enabled: bool,
    sleeping: bool,

    inertia_cache: Option<Arc<InertiaTensorCache>>,
}

impl RigidBody {
    /// Create a body at the origin. `mass <= 0` creates a static body.
    pub fn new(shape: Shape, mass: f64) -> Self {
        let mut body = Self {
            shape,
            position: Point3::new(0.0, 0.0, 0.0),
            linear_velocity: Vector3::zero(),
            mass,
            inverse_mass: 0.0,
            orientation: identity_rotation(),
            angular_velocity: Vector3::zero(),
            inertia_tensor: Matrix3::zero(),
            inverse_inertia_tensor: Matrix3::zero(),
            density: constants::DEFAULT_DENSITY,
            friction: constants::DEFAULT_FRICTION,
            restitution: constants::DEFAULT_RESTITUTION,
            linear_damping: constants::DEFAULT_LINEAR_DAMPING,
            angular_damping: constants::DEFAULT_ANGULAR_DAMPING,
            force: Vector3::zero(),
            torque: Vector3::zero(),
            is_static: !has_positive_mass(mass),
            gravity_enabled: true,
            sleeping: false,
            inertia_cache: None,
        };
        body.update_mass_properties();
        body
    }

    /// Like [`RigidBody::new`], but rejects invalid shapes and non-finite mass.
    pub fn try_new(shape: Shape, mass: f64) -> Result<Self> {
        shape.validate()?;
        if !mass.is_finite() {
            return Err(PhysicsError::InvalidMass(mass));
        }
        Ok(Self::new(shape, mass))
    }

    /// Route inertia computations through a shared cache.
    #[must_use]
    pub fn with_inertia_cache(mut self, cache: Arc<InertiaTensorCache>) -> Self {
        self.set_inertia_cache(Some(cache));
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: Point3<f64>) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_linear_velocity(mut self, velocity: Vector3<f64>) -> Self {
        self.set_linear_velocity(velocity);
        self
    }

    pub fn set_inertia_cache(&mut self, cache: Option<Arc<InertiaTensorCache>>) {
        self.inertia_cache = cache;
        self.update_mass_properties();
    }

    pub fn inertia_cache(&self) -> Option<&Arc<InertiaTensorCache>> {
        self.inertia_cache.as_ref()
    }

    /// Recompute inverse mass and the inertia tensors from mass and shape.
    fn update_mass_properties(&mut self) {
        self.inertia_tensor = match &self.inertia_cache {
            Some(cache) if has_positive_mass(self.mass) => {
                cache.get_or_compute(&self.shape, self.mass)
            }
            _ => self.shape.inertia_tensor(self.mass),
        };

        if self.is_static {
            self.inverse_mass = 0.0;
            self.inverse_inertia_tensor = Matrix3::zero();
        } else {
            self.inverse_mass = 1.0 / self.mass;
            self.inverse_inertia_tensor = self.inertia_tensor.invert().unwrap_or_else(Matrix3::zero);
        }
    }

    // Shape

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Replace the shape and recompute mass properties.
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.update_mass_properties();
    }

    pub fn scale(&self) -> Vector3<f64> {
        self.shape.scale()
    }

    /// Scale the shape and recompute mass properties.
    pub fn set_scale(&mut self, scale: Vector3<f64>) {
        self.shape.set_scale(scale);
        self.update_mass_properties();
    }

    // Mass and state transitions

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    /// Set the mass. Positive mass makes the body dynamic, anything else
    /// makes it static.
    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        if has_positive_mass(mass) {
            if self.is_static {
                debug!("body became dynamic with mass {mass}");
            }
            self.is_static = false;
            self.update_mass_properties();
        } else {
            self.enter_static();
        }
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Switch between static and dynamic. A body without positive mass
    /// cannot become dynamic.
    pub fn set_static(&mut self, is_static: bool) {
        if is_static {
            self.enter_static();
        } else if has_positive_mass(self.mass) {
            self.is_static = false;
            self.update_mass_properties();
        } else {
            warn!(
                "cannot make body dynamic: mass {} is not positive",
                self.mass
            );
        }
    }

    fn enter_static(&mut self) {
        if !self.is_static {
            debug!("body became static");
        }
        self.is_static = true;
        self.linear_velocity = Vector3::zero();
        self.angular_velocity = Vector3::zero();
        self.clear_accumulators();
        self.update_mass_properties();
    }

    pub fn inertia_tensor(&self) -> Matrix3<f64> {
        self.inertia_tensor
    }

    pub fn inverse_inertia_tensor(&self) -> Matrix3<f64> {
        self.inverse_inertia_tensor
    }

    /// Inverse inertia tensor rotated into world space.
    pub fn inverse_inertia_world(&self) -> Matrix3<f64> {
        let rotation = Matrix3::from(self.orientation);
        rotation * self.inverse_inertia_tensor * rotation.transpose()
    }

    // Kinematics

    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Teleport the body. Wakes it up.
    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
        self.wake_up();
    }

    pub fn rotation(&self) -> Quaternion<f64> {
        self.orientation
    }

    /// Set the orientation; the quaternion is normalised.
    pub fn set_rotation(&mut self, rotation: Quaternion<f64>) {
        if rotation.magnitude2() > 0.0 {
            self.orientation = rotation.normalize();
        }
    }

    pub fn linear_velocity(&self) -> Vector3<f64> {
        self.linear_velocity
    }

    /// Set the linear velocity. Ignored for static bodies.
    pub fn set_linear_velocity(&mut self, velocity: Vector3<f64>) {
        if self.is_static {
            return;
        }
        self.linear_velocity = velocity;
        self.wake_up();
    }

    pub fn angular_velocity(&self) -> Vector3<f64> {
        self.angular_velocity
    }

    /// Set the angular velocity (rad/s). Ignored for static bodies.
    pub fn set_angular_velocity(&mut self, velocity: Vector3<f64>) {
        if self.is_static {
            return;
        }
        self.angular_velocity = velocity;
        self.wake_up();
    }

    /// World transform: translation × rotation × shape scale.
    pub fn transform_matrix(&self) -> Matrix4<f64> {
        let scale = self.shape.scale();
        Matrix4::from_translation(self.position.to_vec())
            * Matrix4::from(self.orientation)
            * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
    }

    /// Velocity of a world-space point rigidly attached to the body.
    pub fn velocity_at_point(&self, point: Point3<f64>) -> Vector3<f64> {
        self.linear_velocity + self.angular_velocity.cross(point - self.position)
    }

    pub fn kinetic_energy(&self) -> f64 {
        if self.is_static {
            return 0.0;
        }
        let rotation = Matrix3::from(self.orientation);
        let inertia_world = rotation * self.inertia_tensor * rotation.transpose();
        0.5 * self.mass * self.linear_velocity.magnitude2()
            + 0.5 * self.angular_velocity.dot(inertia_world * self.angular_velocity)
    }

    // Material

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn set_density(&mut self, density: f64) {
        self.density = density.max(0.0);
    }

    /// Derive the mass from density × shape volume.
    pub fn mass_from_density(&mut self) {
        self.set_mass(self.density * self.shape.volume());
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn set_friction(&mut self, friction: f64) {
        self.friction = friction.clamp(0.0, 1.0);
    }

    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    pub fn set_restitution(&mut self, restitution: f64) {
        self.restitution = restitution.clamp(0.0, 1.0);
    }

    pub fn linear_damping(&self) -> f64 {
        self.linear_damping
    }

    pub fn angular_damping(&self) -> f64 {
        self.angular_damping
    }

    /// Set the fractions of linear and angular velocity kept per step.
    pub fn set_damping(&mut self, linear: f64, angular: f64) {
        self.linear_damping = linear.clamp(0.0, 1.0);
        self.angular_damping = angular.clamp(0.0, 1.0);
    }

    // Flags

    pub fn is_gravity_enabled(&self) -> bool {
        self.gravity_enabled
    }

    pub fn set_gravity_enabled(&mut self, enabled: bool) {
        self.gravity_enabled = enabled;
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn wake_up(&mut self) {
        if self.sleeping {
            trace!("body woke up");
        }
        self.sleeping = false;
    }

    /// Stop simulating the body until something wakes it. Velocities and
    /// accumulated forces are discarded.
    pub fn put_to_sleep(&mut self) {
        self.sleeping = true;
        self.linear_velocity = Vector3::zero();
        self.angular_velocity = Vector3::zero();
        self.clear_accumulators();
    }

    // Forces

    pub fn force(&self) -> Vector3<f64> {
        self.force
    }

    pub fn torque(&self) -> Vector3<f64> {
        self.torque
    }

    /// Accumulate a force at the centre of mass.
    pub fn add_force(&mut self, force: Vector3<f64>) {
        if self.is_static {
            return;
        }
        self.force += force;
        self.wake_up();
    }

    /// Accumulate a force at a world point, producing torque about the centre.
    pub fn add_force_at_point(&mut self, force: Vector3<f64>, point: Point3<f64>) {
        if self.is_static {
            return;
        }
        self.force += force;
        self.torque += (point - self.position).cross(force);
        self.wake_up();
    }

    pub fn add_torque(&mut self, torque: Vector3<f64>) {
        if self.is_static {
            return;
        }
        self.torque += torque;
        self.wake_up();
    }

    /// Instantaneous change of momentum at the centre of mass.
    pub fn apply_impulse(&mut self, impulse: Vector3<f64>) {
        if self.is_static {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
        self.wake_up();
    }

    pub fn apply_impulse_at_point(&mut self, impulse: Vector3<f64>, point: Point3<f64>) {
        if self.is_static {
            return;
        }
        self.linear_velocity += impulse * self.inverse_mass;
        let arm = point - self.position;
        self.angular_velocity += self.inverse_inertia_world() * arm.cross(impulse);
        self.wake_up();
    }

    pub fn clear_accumulators(&mut self) {
        self.force = Vector3::zero();
        self.torque = Vector3::zero();
    }

    /// Advance the body by `dt` with semi-implicit Euler.
    ///
    /// Damping is applied first, then velocity is updated from the
    /// accumulated force and the position from the *new* velocity. The
    /// orientation follows `q += ½·dt·(0, ω)·q` and is re-normalised.
    /// Static and sleeping bodies are left untouched.
    pub fn integrate(&mut self, dt: f64) {
        if self.is_static || self.sleeping {
            return;
        }

        self.linear_velocity *= self.linear_damping;
        self.angular_velocity *= self.angular_damping;

        self.linear_velocity += self.force * (self.inverse_mass * dt);
        self.position += self.linear_velocity * dt;

        self.angular_velocity += (self.inverse_inertia_tensor * self.torque) * dt;
        let spin = Quaternion::from_sv(0.0, self.angular_velocity) * self.orientation;
        let orientation = self.orientation + spin * (0.5 * dt);
        if orientation.magnitude2() > 0.0 {
            self.orientation = orientation.normalize();
        }

        self.clear_accumulators();
    }

    // Ground contact

    /// World-space bounding box `(min, max)` of the shape at the current
    /// position and orientation.
    pub fn world_bounding_box(&self) -> (Point3<f64>, Point3<f64>) {
        let half = self.shape.world_half_extents(self.orientation);
        (self.position - half, self.position + half)
    }

    /// Whether the lowest point of the world bounding box is at or below
    /// `ground_y`.
    pub fn check_ground_collision(&self, ground_y: f64) -> bool {
        let (min, _) = self.world_bounding_box();
        min.y <= ground_y
    }

    /// Depth of the world bounding box below `ground_y` (negative when above).
    pub fn ground_penetration(&self, ground_y: f64) -> f64 {
        let (min, _) = self.world_bounding_box();
        ground_y - min.y
    }

    /// Push the body out of the ground plane and bounce it.
    ///
    /// The body ends exactly on the plane, a downward vertical velocity is
    /// reflected and scaled by restitution, and horizontal velocity is
    /// scaled by `1 - friction`. Returns whether a contact was resolved.
    pub fn resolve_ground_collision(&mut self, ground_y: f64) -> bool {
        if self.is_static || self.sleeping {
            return false;
        }

        let half_height = self.shape.world_half_extents(self.orientation).y;
        if self.position.y - half_height > ground_y {
            return false;
        }

        self.position.y = ground_y + half_height;
        if self.linear_velocity.y < 0.0 {
            self.linear_velocity.y = -self.linear_velocity.y * self.restitution;
        }
        let keep = 1.0 - self.friction;
        self.linear_velocity.x *= keep;
        self.linear_velocity.z *= keep;

        self.wake_up();
        true
    }

    /// Return to the default state used when handing out pooled bodies:
    /// at the origin, unrotated, at rest, awake, with default material.
    /// Shape, mass and the inertia cache handle are kept.
    pub fn reset(&mut self) {
        self.position = Point3::new(0.0, 0.0, 0.0);
        self.orientation = identity_rotation();
        self.linear_velocity = Vector3::zero();
        self.angular_velocity = Vector3::zero();
        self.clear_accumulators();

        self.density = constants::DEFAULT_DENSITY;
        self.friction = constants::DEFAULT_FRICTION;
        self.restitution = constants::DEFAULT_RESTITUTION;
        self.linear_damping = constants::DEFAULT_LINEAR_DAMPING;
        self.angular_damping = constants::DEFAULT_ANGULAR_DAMPING;

        self.gravity_enabled = true;
        self.sleeping = false;
        self.is_static = !has_positive_mass(self.mass);
        self.update_mass_properties();
    }
}

fn has_positive_mass(mass: f64) -> bool {
    mass.is_finite() && mass > 0.0
}

impl Default for RigidBody {
    /// A dynamic unit box of [`constants::DEFAULT_MASS`] at the origin.
    fn default() -> Self {
        Self::new(Shape::default(), constants::DEFAULT_MASS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn unit_sphere_body() -> RigidBody {
        RigidBody::new(Shape::sphere(0.5, 16), 1.0)
    }

    #[test]
    fn test_default_body() {
        let body = RigidBody::default();
        assert_eq!(body.shape(), &Shape::cuboid(1.0, 1.0, 1.0));
        assert_eq!(body.mass(), 1.0);
        assert!(!body.is_static());
        assert_eq!(body.position(), Point3::new(0.0, 0.0, 0.0));
        // Unit cube of 1 kg: m(h² + d²)/12 on every axis.
        assert_relative_eq!(body.inertia_tensor().x.x, 1.0 / 6.0);
    }

    #[test]
    fn test_inverse_mass() {
        let body = RigidBody::new(Shape::cuboid(1.0, 1.0, 1.0), 4.0);
        assert!(!body.is_static());
        assert_relative_eq!(body.inverse_mass(), 0.25);

        let body = RigidBody::new(Shape::cuboid(1.0, 1.0, 1.0), 0.0);
        assert!(body.is_static());
        assert_eq!(body.inverse_mass(), 0.0);

        let body = RigidBody::new(Shape::cuboid(1.0, 1.0, 1.0), -2.0);
        assert!(body.is_static());
        assert_eq!(body.inverse_mass(), 0.0);
        assert_eq!(body.inverse_inertia_tensor(), Matrix3::zero());
    }

    #[test]
    fn test_state_transitions() {
        let mut body = unit_sphere_body();
        body.set_linear_velocity(Vector3::new(1.0, 2.0, 3.0));
        body.add_force(Vector3::new(0.0, 5.0, 0.0));

        body.set_static(true);
        assert!(body.is_static());
        assert_eq!(body.inverse_mass(), 0.0);
        assert_eq!(body.linear_velocity(), Vector3::zero());
        assert_eq!(body.force(), Vector3::zero());

        body.set_static(false);
        assert!(!body.is_static());
        assert_relative_eq!(body.inverse_mass(), 1.0);

        body.set_mass(0.0);
        assert!(body.is_static());
        body.set_static(false);
        assert!(body.is_static(), "massless body must stay static");

        body.set_mass(2.0);
        assert!(!body.is_static());
        assert_relative_eq!(body.inverse_mass(), 0.5);
    }

    #[test]
    fn test_static_bodies_ignore_forces() {
        let mut body = RigidBody::new(Shape::cuboid(1.0, 1.0, 1.0), 0.0);
        body.add_force(Vector3::new(1.0, 0.0, 0.0));
        body.add_torque(Vector3::new(1.0, 0.0, 0.0));
        body.apply_impulse(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(body.force(), Vector3::zero());
        assert_eq!(body.torque(), Vector3::zero());

        let before = body.position();
        body.integrate(1.0);
        assert_eq!(body.position(), before);
    }

    #[test]
    fn test_force_at_point_adds_torque() {
        let mut body = unit_sphere_body().with_position(Point3::new(1.0, 0.0, 0.0));
        body.add_force_at_point(Vector3::new(0.0, 1.0, 0.0), Point3::new(2.0, 0.0, 0.0));
        assert_eq!(body.force(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(body.torque(), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_forces_wake_sleeping_body() {
        let mut body = unit_sphere_body();
        body.put_to_sleep();
        assert!(body.is_sleeping());
        body.add_force(Vector3::new(0.0, 1.0, 0.0));
        assert!(!body.is_sleeping());
    }

    #[test]
    fn test_integrate_at_rest_is_noop() {
        for dt in [0.0, 1.0 / 60.0, 0.5, 10.0] {
            let mut body = unit_sphere_body().with_position(Point3::new(1.0, 2.0, 3.0));
            body.integrate(dt);
            assert_eq!(body.position(), Point3::new(1.0, 2.0, 3.0));
            assert_eq!(body.rotation(), Quaternion::new(1.0, 0.0, 0.0, 0.0));
        }
    }

    #[test]
    fn test_integrate_semi_implicit() {
        let mut body = unit_sphere_body();
        body.set_damping(1.0, 1.0);
        body.add_force(Vector3::new(2.0, 0.0, 0.0));
        body.integrate(0.5);

        // Velocity first, then position from the new velocity.
        assert_relative_eq!(body.linear_velocity().x, 1.0);
        assert_relative_eq!(body.position().x, 0.5);
        assert_eq!(body.force(), Vector3::zero());
    }

    #[test]
    fn test_integrate_applies_damping() {
        let mut body = unit_sphere_body();
        body.set_damping(0.5, 0.5);
        body.set_linear_velocity(Vector3::new(4.0, 0.0, 0.0));
        body.set_angular_velocity(Vector3::new(0.0, 2.0, 0.0));
        body.integrate(0.1);
        assert_relative_eq!(body.linear_velocity().x, 2.0);
        assert_relative_eq!(body.angular_velocity().y, 1.0);
    }

    #[test]
    fn test_integrate_rotation_stays_normalised() {
        let mut body = unit_sphere_body();
        body.set_damping(1.0, 1.0);
        body.set_angular_velocity(Vector3::new(0.3, 2.0, -1.0));
        for _ in 0..500 {
            body.integrate(1.0 / 60.0);
            assert_abs_diff_eq!(body.rotation().magnitude(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_torque_spins_body() {
        let mut body = unit_sphere_body();
        body.set_damping(1.0, 1.0);
        // I = 2/5 * 1 * 0.25 = 0.1
        body.add_torque(Vector3::new(0.0, 0.1, 0.0));
        body.integrate(1.0);
        assert_relative_eq!(body.angular_velocity().y, 1.0, epsilon = 1e-12);
        assert!(body.rotation().v.y > 0.0);
    }

    #[test]
    fn test_sleeping_body_not_integrated() {
        let mut body = unit_sphere_body();
        body.set_linear_velocity(Vector3::new(1.0, 0.0, 0.0));
        body.put_to_sleep();
        assert_eq!(body.linear_velocity(), Vector3::zero());
        body.integrate(1.0);
        assert_eq!(body.position(), Point3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_inertia_recomputed_on_mutation() {
        let mut body = RigidBody::new(Shape::sphere(0.5, 16), 5.0);
        assert_relative_eq!(body.inertia_tensor().x.x, 0.5, epsilon = 1e-12);

        body.set_mass(10.0);
        assert_relative_eq!(body.inertia_tensor().x.x, 1.0, epsilon = 1e-12);

        body.set_scale(Vector3::new(2.0, 2.0, 2.0));
        assert_relative_eq!(body.inertia_tensor().x.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(body.inverse_inertia_tensor().x.x, 0.25, epsilon = 1e-12);

        body.set_shape(Shape::cuboid(1.0, 1.0, 1.0));
        assert_relative_eq!(body.inertia_tensor().x.x, 10.0 * 2.0 / 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inertia_cache_is_consulted() {
        let cache = Arc::new(InertiaTensorCache::new());
        let body = RigidBody::new(Shape::cuboid(1.0, 1.0, 1.0), 10.0)
            .with_inertia_cache(Arc::clone(&cache));
        let other = RigidBody::new(Shape::cuboid(1.0, 1.0, 1.0), 10.0)
            .with_inertia_cache(Arc::clone(&cache));

        assert_eq!(body.inertia_tensor(), other.inertia_tensor());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_mass_from_density() {
        let mut body = RigidBody::new(Shape::cuboid(1.0, 2.0, 0.5), 1.0);
        body.set_density(500.0);
        body.mass_from_density();
        assert_relative_eq!(body.mass(), 500.0);
        assert_relative_eq!(body.inverse_mass(), 1.0 / 500.0);
    }

    #[test]
    fn test_material_clamping() {
        let mut body = unit_sphere_body();
        body.set_friction(1.5);
        body.set_restitution(-0.2);
        body.set_damping(2.0, -1.0);
        body.set_density(-5.0);
        assert_eq!(body.friction(), 1.0);
        assert_eq!(body.restitution(), 0.0);
        assert_eq!(body.linear_damping(), 1.0);
        assert_eq!(body.angular_damping(), 0.0);
        assert_eq!(body.density(), 0.0);
    }

    #[test]
    fn test_ground_collision_sphere() {
        let mut body = RigidBody::new(Shape::sphere(0.5, 16), 1.0)
            .with_position(Point3::new(0.0, 0.2, 0.0))
            .with_linear_velocity(Vector3::new(0.0, -4.0, 0.0));
        body.set_restitution(0.5);
        body.set_friction(0.0);

        assert!(body.check_ground_collision(0.0));
        assert_relative_eq!(body.ground_penetration(0.0), 0.3, epsilon = 1e-12);
        assert!(body.resolve_ground_collision(0.0));

        assert_eq!(body.position().y, 0.5);
        assert_relative_eq!(body.linear_velocity().y, 2.0);
        assert!(!body.check_ground_collision(-0.01));
    }

    #[test]
    fn test_ground_collision_friction() {
        let mut body = RigidBody::new(Shape::cuboid(1.0, 1.0, 1.0), 1.0)
            .with_position(Point3::new(0.0, -0.6, 0.0))
            .with_linear_velocity(Vector3::new(2.0, 0.0, -4.0));
        body.set_friction(0.25);
        assert!(body.resolve_ground_collision(-1.0));
        assert_eq!(body.position().y, -0.5);
        assert_relative_eq!(body.linear_velocity().x, 1.5);
        assert_relative_eq!(body.linear_velocity().z, -3.0);
    }

    #[test]
    fn test_ground_collision_uses_rotated_bounds() {
        use cgmath::{Deg, Rotation3};

        let mut body = RigidBody::new(Shape::cuboid(2.0, 2.0, 2.0), 1.0)
            .with_position(Point3::new(0.0, 1.2, 0.0));
        assert!(!body.check_ground_collision(0.0));

        body.set_rotation(Quaternion::from_angle_z(Deg(45.0_f64)));
        assert!(body.check_ground_collision(0.0));
        assert!(body.resolve_ground_collision(0.0));
        assert_relative_eq!(body.position().y, 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_body_above_ground_untouched() {
        let mut body = unit_sphere_body()
            .with_position(Point3::new(0.0, 3.0, 0.0))
            .with_linear_velocity(Vector3::new(1.0, -1.0, 0.0));
        assert!(!body.resolve_ground_collision(0.0));
        assert_eq!(body.linear_velocity(), Vector3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_apply_impulse_and_velocity_at_point() {
        let mut body = RigidBody::new(Shape::sphere(0.5, 16), 2.0);
        body.apply_impulse(Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(body.linear_velocity(), Vector3::new(1.0, 0.0, 0.0));

        body.set_angular_velocity(Vector3::new(0.0, 0.0, 1.0));
        let v = body.velocity_at_point(Point3::new(0.0, 1.0, 0.0));
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);

        let mut body = RigidBody::new(Shape::sphere(0.5, 16), 1.0);
        body.apply_impulse_at_point(Vector3::new(0.0, 0.1, 0.0), Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(body.linear_velocity().y, 0.1);
        assert_relative_eq!(body.angular_velocity().z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kinetic_energy() {
        let body = RigidBody::new(Shape::sphere(0.5, 16), 2.0)
            .with_linear_velocity(Vector3::new(3.0, 0.0, 0.0));
        assert_relative_eq!(body.kinetic_energy(), 9.0);
    }

    #[test]
    fn test_transform_matrix() {
        let mut body = RigidBody::new(Shape::cuboid(1.0, 1.0, 1.0), 1.0)
            .with_position(Point3::new(1.0, 2.0, 3.0));
        body.set_scale(Vector3::new(2.0, 1.0, 1.0));
        let m = body.transform_matrix();
        assert_eq!(m.w.x, 1.0);
        assert_eq!(m.w.y, 2.0);
        assert_eq!(m.w.z, 3.0);
        assert_eq!(m.x.x, 2.0);
        assert_eq!(m.y.y, 1.0);
    }

    #[test]
    fn test_reset() {
        let mut body = unit_sphere_body().with_position(Point3::new(5.0, 5.0, 5.0));
        body.set_linear_velocity(Vector3::new(1.0, 1.0, 1.0));
        body.set_friction(0.9);
        body.set_gravity_enabled(false);
        body.set_static(true);
        body.put_to_sleep();

        body.reset();
        assert_eq!(body.position(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(body.linear_velocity(), Vector3::zero());
        assert_eq!(body.friction(), constants::DEFAULT_FRICTION);
        assert!(body.is_gravity_enabled());
        assert!(!body.is_sleeping());
        assert!(!body.is_static());
        assert_relative_eq!(body.inverse_mass(), 1.0);
    }

    #[test]
    fn test_try_new() {
        assert!(RigidBody::try_new(Shape::sphere(1.0, 8), 1.0).is_ok());
        assert!(RigidBody::try_new(Shape::sphere(-1.0, 8), 1.0).is_err());
        assert_eq!(
            RigidBody::try_new(Shape::sphere(1.0, 8), f64::INFINITY).err(),
            Some(PhysicsError::InvalidMass(f64::INFINITY))
        );
    }
}
