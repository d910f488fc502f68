//! Math utilities and types
//!
//! Provides the fundamental math types used by every query: vector and
//! matrix aliases over nalgebra, the rigid `Pose` type that places a
//! geometry in world space, and small scalar helpers.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// A rigid transform placing a geometry in a common space.
///
/// Unlike a full TRS transform there is no scale here: scale is a property
/// of the geometries that support it (convex hulls, meshes, height fields),
/// not of the placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Position in world space
    pub position: Vec3,

    /// Orientation quaternion
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl Pose {
    /// Create a new pose from position and rotation
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create the identity pose
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a pose with only a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Transform a point from local space into world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Rotate a vector from local space into world space
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Transform a world-space point into this pose's local space
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    /// Rotate a world-space vector into this pose's local space
    pub fn inverse_transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation.inverse() * vector
    }

    /// Get the inverse pose
    pub fn inverse(&self) -> Pose {
        let inv_rotation = self.rotation.inverse();
        Pose {
            position: inv_rotation * (-self.position),
            rotation: inv_rotation,
        }
    }

    /// Combine this pose with another (`self` applied after `other`)
    pub fn combine(&self, other: &Pose) -> Pose {
        Pose {
            position: self.position + self.rotation * other.position,
            rotation: self.rotation * other.rotation,
        }
    }

    /// Get one of the three rotated basis axes (0 = X, 1 = Y, 2 = Z)
    pub fn axis(&self, index: usize) -> Vec3 {
        let mut basis = Vec3::zeros();
        basis[index] = 1.0;
        self.rotation * basis
    }
}

/// Math utility functions
pub mod utils {
    use super::Vec3;

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min {
            min
        } else if value > max {
            max
        } else {
            value
        }
    }

}
