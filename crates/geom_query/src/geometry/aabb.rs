//! Axis-aligned bounding boxes
//!
//! Conservative bounds used by the broad phases: candidate gathering
//! against meshes and height fields, and swept-volume expansion.

use crate::foundation::math::{utils, Pose, Vec3};

/// An axis-aligned bounding box defined by its min and max corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from a center and half extents
    pub fn from_center_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// An inverted AABB that grows to fit the first point added to it
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
            max: Vec3::new(f32::MIN, f32::MIN, f32::MIN),
        }
    }

    /// Smallest AABB containing all the given points
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut bounds = Self::empty();
        for point in points {
            bounds.include(*point);
        }
        bounds
    }

    /// Center point of the box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half extents of the box
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Grow to include a point
    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    /// Grow to include another AABB
    pub fn merge(&mut self, other: &Aabb) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    /// Uniformly expanded copy
    pub fn expanded(&self, amount: f32) -> Aabb {
        let pad = Vec3::new(amount, amount, amount);
        Aabb {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Copy expanded to cover a translation of the box by `motion`
    pub fn swept(&self, motion: Vec3) -> Aabb {
        Aabb {
            min: self.min.inf(&(self.min + motion)),
            max: self.max.sup(&(self.max + motion)),
        }
    }

    /// Check if this box intersects another
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Check if a point lies inside (inclusive)
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Closest point inside the box to `point`
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            utils::clamp(point.x, self.min.x, self.max.x),
            utils::clamp(point.y, self.min.y, self.max.y),
            utils::clamp(point.z, self.min.z, self.max.z),
        )
    }

    /// Bounds of this box re-expressed in another space.
    ///
    /// `pose` maps this box's space into the target space; the result is the
    /// axis-aligned cover of the rotated box.
    pub fn transformed_by(&self, pose: &Pose) -> Aabb {
        let center = pose.transform_point(self.center());
        let extents = self.extents();
        // Absolute-value rotation matrix turns half extents into world cover
        let m = pose.rotation.to_rotation_matrix();
        let m = m.matrix();
        let cover = Vec3::new(
            m[(0, 0)].abs() * extents.x + m[(0, 1)].abs() * extents.y + m[(0, 2)].abs() * extents.z,
            m[(1, 0)].abs() * extents.x + m[(1, 1)].abs() * extents.y + m[(1, 2)].abs() * extents.z,
            m[(2, 0)].abs() * extents.x + m[(2, 1)].abs() * extents.y + m[(2, 2)].abs() * extents.z,
        );
        Aabb::from_center_extents(center, cover)
    }
}
