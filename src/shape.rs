//! Collision/mass shapes and their analytic mass properties.
//!
//! Every shape is centred on its local origin with principal axes aligned to
//! the local frame, so inertia tensors are diagonal. All queries work on the
//! *scaled* dimensions (dimension × scale, per axis).

use std::f64::consts::PI;
use std::fmt;

use cgmath::{InnerSpace, Matrix3, Quaternion, SquareMatrix, Vector3, Zero};

use crate::constants::{
    DEFAULT_BOX_SIZE, DEFAULT_CYLINDER_HEIGHT, DEFAULT_CYLINDER_RADIUS, DEFAULT_CYLINDER_SEGMENTS,
    DEFAULT_PLANE_SIZE, DEFAULT_SPHERE_RADIUS, DEFAULT_SPHERE_SEGMENTS, PLANE_HALF_THICKNESS,
    PLANE_INERTIA_SCALE,
};
use crate::error::{PhysicsError, Result};

/// The kind of a shape, without its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Box,
    Sphere,
    Plane,
    Cylinder,
}

impl ShapeKind {
    /// Lowercase name used in keys and log messages.
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Plane => "plane",
            ShapeKind::Cylinder => "cylinder",
        }
    }

    /// Number of meaningful entries in a [`ShapeKey`]'s dimensions.
    fn dimension_count(self) -> usize {
        match self {
            ShapeKind::Box => 3,
            ShapeKind::Sphere => 1,
            ShapeKind::Plane | ShapeKind::Cylinder => 2,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-kind geometric parameters, in unscaled local units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Axis-aligned box with full extents.
    Box { width: f64, height: f64, depth: f64 },
    /// Sphere; `segments` only affects mesh generation.
    Sphere { radius: f64, segments: u32 },
    /// Finite plane in the local XZ plane.
    Plane {
        width: f64,
        depth: f64,
        normal: Vector3<f64>,
    },
    /// Cylinder aligned with the local Y axis.
    Cylinder {
        radius: f64,
        height: f64,
        segments: u32,
    },
}

/// A shape owned by exactly one [`RigidBody`](crate::RigidBody).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    primitive: Primitive,
    scale: Vector3<f64>,
}

impl Shape {
    fn from_primitive(primitive: Primitive) -> Self {
        Self {
            primitive,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Box with full width (X), height (Y) and depth (Z).
    pub fn cuboid(width: f64, height: f64, depth: f64) -> Self {
        Self::from_primitive(Primitive::Box {
            width,
            height,
            depth,
        })
    }

    pub fn sphere(radius: f64, segments: u32) -> Self {
        Self::from_primitive(Primitive::Sphere { radius, segments })
    }

    /// Horizontal plane with an upward normal.
    pub fn plane(width: f64, depth: f64) -> Self {
        Self::from_primitive(Primitive::Plane {
            width,
            depth,
            normal: Vector3::unit_y(),
        })
    }

    /// Cylinder aligned with the local Y axis.
    pub fn cylinder(radius: f64, height: f64, segments: u32) -> Self {
        Self::from_primitive(Primitive::Cylinder {
            radius,
            height,
            segments,
        })
    }

    /// A shape of the given kind with the stock dimensions: a unit box, a
    /// 0.5 m sphere, a 10 m plane or a 0.5 m × 1 m cylinder.
    pub fn default_of(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Box => Self::cuboid(DEFAULT_BOX_SIZE, DEFAULT_BOX_SIZE, DEFAULT_BOX_SIZE),
            ShapeKind::Sphere => Self::sphere(DEFAULT_SPHERE_RADIUS, DEFAULT_SPHERE_SEGMENTS),
            ShapeKind::Plane => Self::plane(DEFAULT_PLANE_SIZE, DEFAULT_PLANE_SIZE),
            ShapeKind::Cylinder => Self::cylinder(
                DEFAULT_CYLINDER_RADIUS,
                DEFAULT_CYLINDER_HEIGHT,
                DEFAULT_CYLINDER_SEGMENTS,
            ),
        }
    }

    pub fn primitive(&self) -> &Primitive {
        &self.primitive
    }

    pub fn kind(&self) -> ShapeKind {
        match self.primitive {
            Primitive::Box { .. } => ShapeKind::Box,
            Primitive::Sphere { .. } => ShapeKind::Sphere,
            Primitive::Plane { .. } => ShapeKind::Plane,
            Primitive::Cylinder { .. } => ShapeKind::Cylinder,
        }
    }

    pub fn scale(&self) -> Vector3<f64> {
        self.scale
    }

    /// Set the per-axis scale. Use [`RigidBody::set_scale`](crate::RigidBody::set_scale)
    /// on attached shapes so the body's inertia stays in sync.
    pub fn set_scale(&mut self, scale: Vector3<f64>) {
        self.scale = scale;
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vector3<f64>) -> Self {
        self.scale = scale;
        self
    }

    /// Mesh tessellation, if the shape has one.
    pub fn segments(&self) -> Option<u32> {
        match self.primitive {
            Primitive::Sphere { segments, .. } | Primitive::Cylinder { segments, .. } => {
                Some(segments)
            }
            Primitive::Box { .. } | Primitive::Plane { .. } => None,
        }
    }

    pub fn set_segments(&mut self, new_segments: u32) {
        match &mut self.primitive {
            Primitive::Sphere { segments, .. } | Primitive::Cylinder { segments, .. } => {
                *segments = new_segments;
            }
            Primitive::Box { .. } | Primitive::Plane { .. } => {}
        }
    }

    /// Replace the box dimensions. No-op on other kinds.
    pub fn set_dimensions(&mut self, new_width: f64, new_height: f64, new_depth: f64) {
        if let Primitive::Box {
            width,
            height,
            depth,
        } = &mut self.primitive
        {
            *width = new_width;
            *height = new_height;
            *depth = new_depth;
        }
    }

    /// Replace the radius of a sphere or cylinder.
    pub fn set_radius(&mut self, new_radius: f64) {
        match &mut self.primitive {
            Primitive::Sphere { radius, .. } | Primitive::Cylinder { radius, .. } => {
                *radius = new_radius;
            }
            Primitive::Box { .. } | Primitive::Plane { .. } => {}
        }
    }

    /// Replace the height of a cylinder.
    pub fn set_height(&mut self, new_height: f64) {
        if let Primitive::Cylinder { height, .. } = &mut self.primitive {
            *height = new_height;
        }
    }

    /// Replace a plane's extents.
    pub fn set_plane_size(&mut self, new_width: f64, new_depth: f64) {
        if let Primitive::Plane { width, depth, .. } = &mut self.primitive {
            *width = new_width;
            *depth = new_depth;
        }
    }

    /// Replace a plane's normal. The normal is stored normalised; a zero
    /// vector is ignored.
    pub fn set_normal(&mut self, new_normal: Vector3<f64>) {
        if let Primitive::Plane { normal, .. } = &mut self.primitive {
            if new_normal.magnitude2() > 0.0 {
                *normal = new_normal.normalize();
            }
        }
    }

    /// Plane normal, if this is a plane.
    pub fn normal(&self) -> Option<Vector3<f64>> {
        match self.primitive {
            Primitive::Plane { normal, .. } => Some(normal),
            _ => None,
        }
    }

    /// Scaled dimensions as `[x, y, z]`-like triple, laid out per kind:
    /// box `[w, h, d]`, sphere `[r, 0, 0]`, plane `[w, d, 0]`,
    /// cylinder `[r, h, 0]`.
    pub fn scaled_dimensions(&self) -> [f64; 3] {
        let s = self.scale;
        match self.primitive {
            Primitive::Box {
                width,
                height,
                depth,
            } => [width * s.x, height * s.y, depth * s.z],
            Primitive::Sphere { radius, .. } => [radius * s.x.max(s.y).max(s.z), 0.0, 0.0],
            Primitive::Plane { width, depth, .. } => [width * s.x, depth * s.z, 0.0],
            Primitive::Cylinder { radius, height, .. } => {
                [radius * s.x.max(s.z), height * s.y, 0.0]
            }
        }
    }

    pub fn volume(&self) -> f64 {
        let [a, b, c] = self.scaled_dimensions();
        match self.primitive {
            Primitive::Box { .. } => a * b * c,
            Primitive::Sphere { .. } => (4.0 / 3.0) * PI * a * a * a,
            Primitive::Plane { .. } => 0.0,
            Primitive::Cylinder { .. } => PI * a * a * b,
        }
    }

    /// Local inertia tensor for the given mass. Non-positive or non-finite
    /// mass yields the zero tensor.
    pub fn inertia_tensor(&self, mass: f64) -> Matrix3<f64> {
        if !(mass.is_finite() && mass > 0.0) {
            return Matrix3::zero();
        }

        let [a, b, c] = self.scaled_dimensions();
        let diagonal = match self.primitive {
            Primitive::Box { .. } => {
                let (w, h, d) = (a, b, c);
                Vector3::new(
                    mass * (h * h + d * d) / 12.0,
                    mass * (w * w + d * d) / 12.0,
                    mass * (w * w + h * h) / 12.0,
                )
            }
            Primitive::Sphere { .. } => {
                let i = (2.0 / 5.0) * mass * a * a;
                Vector3::new(i, i, i)
            }
            Primitive::Plane { .. } => {
                let i = PLANE_INERTIA_SCALE * mass;
                Vector3::new(i, i, i)
            }
            Primitive::Cylinder { .. } => {
                let (r, h) = (a, b);
                let side = mass * (3.0 * r * r + h * h) / 12.0;
                Vector3::new(side, mass * r * r / 2.0, side)
            }
        };
        Matrix3::from_diagonal(diagonal)
    }

    /// Half-extents of the local axis-aligned bounding box.
    pub fn half_extents(&self) -> Vector3<f64> {
        let [a, b, c] = self.scaled_dimensions();
        match self.primitive {
            Primitive::Box { .. } => Vector3::new(a, b, c) * 0.5,
            Primitive::Sphere { .. } => Vector3::new(a, a, a),
            Primitive::Plane { .. } => Vector3::new(a * 0.5, PLANE_HALF_THICKNESS, b * 0.5),
            Primitive::Cylinder { .. } => Vector3::new(a, b * 0.5, a),
        }
    }

    /// Local axis-aligned bounding box as `(min, max)`.
    pub fn bounding_box(&self) -> (Vector3<f64>, Vector3<f64>) {
        let half = self.half_extents();
        (-half, half)
    }

    /// Radius of the smallest origin-centred sphere enclosing the shape.
    pub fn bounding_radius(&self) -> f64 {
        let [a, b, c] = self.scaled_dimensions();
        match self.primitive {
            Primitive::Box { .. } => 0.5 * (a * a + b * b + c * c).sqrt(),
            Primitive::Sphere { .. } => a,
            Primitive::Plane { .. } => 0.5 * (a * a + b * b).sqrt(),
            Primitive::Cylinder { .. } => (a * a + 0.25 * b * b).sqrt(),
        }
    }

    /// Half-extents of the world-aligned box enclosing the local bounding
    /// box after rotating it by `orientation`. Spheres are rotation
    /// invariant and return their radius on every axis.
    pub fn world_half_extents(&self, orientation: Quaternion<f64>) -> Vector3<f64> {
        let half = self.half_extents();
        if let Primitive::Sphere { .. } = self.primitive {
            return half;
        }

        let rotation = Matrix3::from(orientation);
        let mut extents = Vector3::zero();
        for row in 0..3 {
            let mut sum = 0.0;
            for col in 0..3 {
                sum += rotation[col][row].abs() * half[col];
            }
            extents[row] = sum;
        }
        extents
    }

    /// Whether a point in local space lies inside (or on) the shape.
    pub fn contains_point(&self, point: Vector3<f64>) -> bool {
        let [a, b, _] = self.scaled_dimensions();
        match self.primitive {
            Primitive::Box { .. } | Primitive::Plane { .. } => {
                let half = self.half_extents();
                point.x.abs() <= half.x && point.y.abs() <= half.y && point.z.abs() <= half.z
            }
            Primitive::Sphere { .. } => point.magnitude() <= a,
            Primitive::Cylinder { .. } => {
                let radial = (point.x * point.x + point.z * point.z).sqrt();
                radial <= a && point.y.abs() <= b * 0.5
            }
        }
    }

    /// Key identifying this shape (scaled) together with a mass.
    pub fn key(&self, mass: f64) -> ShapeKey {
        ShapeKey::new(self.kind(), self.scaled_dimensions(), mass)
    }

    /// Reject negative or non-finite dimensions and scales.
    pub fn validate(&self) -> Result<()> {
        let shape = self.kind().name();
        let check = |dimension: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(PhysicsError::InvalidDimension {
                    shape,
                    dimension,
                    value,
                })
            }
        };

        match self.primitive {
            Primitive::Box {
                width,
                height,
                depth,
            } => {
                check("width", width)?;
                check("height", height)?;
                check("depth", depth)?;
            }
            Primitive::Sphere { radius, .. } => check("radius", radius)?,
            Primitive::Plane { width, depth, .. } => {
                check("width", width)?;
                check("depth", depth)?;
            }
            Primitive::Cylinder { radius, height, .. } => {
                check("radius", radius)?;
                check("height", height)?;
            }
        }
        check("scale.x", self.scale.x)?;
        check("scale.y", self.scale.y)?;
        check("scale.z", self.scale.z)
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::default_of(ShapeKind::Box)
    }
}

/// Deterministic key over shape kind, dimensions and mass.
///
/// Values are quantised to two decimals, so shapes that only differ below
/// that precision share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeKey {
    kind: ShapeKind,
    dimensions: [i64; 3],
    mass: i64,
}

fn quantize(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

impl ShapeKey {
    pub fn new(kind: ShapeKind, dimensions: [f64; 3], mass: f64) -> Self {
        Self {
            kind,
            dimensions: dimensions.map(quantize),
            mass: quantize(mass),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for value in &self.dimensions[..self.kind.dimension_count()] {
            write!(f, "_{:.2}", *value as f64 / 100.0)?;
        }
        write!(f, "_m{:.2}", self.mass as f64 / 100.0)
    }
}
