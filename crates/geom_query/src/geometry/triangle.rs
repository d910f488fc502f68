//! Triangle geometry
//!
//! Triangles serve double duty: raw query geometry handed to the batch
//! sweep API, and the unit of output from mesh/height-field candidate
//! enumeration. Each triangle carries per-edge activity flags (is the edge
//! a true silhouette edge or an internal mesh edge) and a double-sided
//! flag that drives raycast culling.

use super::aabb::Aabb;
use crate::foundation::math::{Pose, Vec3};
use bitflags::bitflags;

bitflags! {
    /// Feature flags attached to a triangle
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TriangleFlags: u8 {
        /// Edge v0-v1 is an active (silhouette) edge
        const EDGE01_ACTIVE = 1 << 0;
        /// Edge v1-v2 is an active (silhouette) edge
        const EDGE12_ACTIVE = 1 << 1;
        /// Edge v2-v0 is an active (silhouette) edge
        const EDGE20_ACTIVE = 1 << 2;
        /// Both faces of the triangle are solid
        const DOUBLE_SIDED = 1 << 3;

        /// All three edges active (the default for loose triangles)
        const ALL_EDGES_ACTIVE = Self::EDGE01_ACTIVE.bits()
            | Self::EDGE12_ACTIVE.bits()
            | Self::EDGE20_ACTIVE.bits();
    }
}

/// A triangle for collision queries
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
    /// Edge activity and sidedness flags
    pub flags: TriangleFlags,
}

impl Triangle {
    /// Creates a new triangle with all edges active
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self {
            v0,
            v1,
            v2,
            flags: TriangleFlags::ALL_EDGES_ACTIVE,
        }
    }

    /// Creates a new triangle with explicit flags
    pub fn with_flags(v0: Vec3, v1: Vec3, v2: Vec3, flags: TriangleFlags) -> Self {
        Self { v0, v1, v2, flags }
    }

    /// Calculates the normal of the triangle (right-hand rule).
    ///
    /// A zero-area triangle yields a zero vector rather than NaN.
    pub fn normal(&self) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let n = edge1.cross(&edge2);
        let len_sq = n.magnitude_squared();
        if len_sq > f32::EPSILON {
            n / len_sq.sqrt()
        } else {
            Vec3::zeros()
        }
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// The three edges as (start, end) pairs, in flag order
    pub fn edges(&self) -> [(Vec3, Vec3); 3] {
        [(self.v0, self.v1), (self.v1, self.v2), (self.v2, self.v0)]
    }

    /// Whether edge `index` (0 = v0v1, 1 = v1v2, 2 = v2v0) is active
    pub fn edge_active(&self, index: usize) -> bool {
        let flag = match index {
            0 => TriangleFlags::EDGE01_ACTIVE,
            1 => TriangleFlags::EDGE12_ACTIVE,
            _ => TriangleFlags::EDGE20_ACTIVE,
        };
        self.flags.contains(flag)
    }

    /// Whether both faces of this triangle are solid
    pub fn double_sided(&self) -> bool {
        self.flags.contains(TriangleFlags::DOUBLE_SIDED)
    }

    /// Tight bounds of the triangle
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&[self.v0, self.v1, self.v2])
    }

    /// Copy of this triangle with a pose applied to its vertices
    pub fn transformed_by(&self, pose: &Pose) -> Triangle {
        Triangle {
            v0: pose.transform_point(self.v0),
            v1: pose.transform_point(self.v1),
            v2: pose.transform_point(self.v2),
            flags: self.flags,
        }
    }

    /// Möller-Trumbore ray-triangle intersection algorithm
    /// Returns (t, u, v) barycentric coordinates if hit, None otherwise
    ///
    /// See: "Fast, Minimum Storage Ray/Triangle Intersection" by Möller & Trumbore.
    /// Near-parallel rays are treated as misses. With `cull_backface` set,
    /// hits on the back side of the winding are rejected.
    pub fn intersect_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        cull_backface: bool,
    ) -> Option<(f32, f32, f32)> {
        const EPSILON: f32 = 0.000_001;

        // Calculate edges from v0
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        // Calculate determinant
        let h = direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Ray parallel to triangle?
        if a.abs() < EPSILON {
            return None;
        }
        // Back side of the winding faces away from the ray
        if cull_backface && a < 0.0 {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - self.v0;
        let u = f * s.dot(&h);

        // Hit outside triangle on u axis?
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * direction.dot(&q);

        // Hit outside triangle on v axis?
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        // Calculate t (distance along ray)
        let t = f * edge2.dot(&q);

        if t >= 0.0 {
            Some((t, u, v))
        } else {
            None // Behind ray origin
        }
    }

    /// Get the closest point on the triangle to a given point.
    ///
    /// Voronoi-region walk over vertex, edge, and face regions.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let v0_to_point = point - self.v0;

        let d1 = edge1.dot(&v0_to_point);
        let d2 = edge2.dot(&v0_to_point);

        // Vertex region outside v0
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.v0;
        }

        // Vertex region outside v1
        let v1_to_point = point - self.v1;
        let d3 = edge1.dot(&v1_to_point);
        let d4 = edge2.dot(&v1_to_point);
        if d3 >= 0.0 && d4 <= d3 {
            return self.v1;
        }

        // Vertex region outside v2
        let v2_to_point = point - self.v2;
        let d5 = edge1.dot(&v2_to_point);
        let d6 = edge2.dot(&v2_to_point);
        if d6 >= 0.0 && d5 <= d6 {
            return self.v2;
        }

        // Edge regions
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let t = d1 / (d1 - d3);
            return self.v0 + edge1 * t;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.v0 + edge2 * w;
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.v1 + (self.v2 - self.v1) * w;
        }

        // Inside the face region
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.v0 + edge1 * v + edge2 * w
    }

    /// Signed distance from a point to the triangle plane
    pub fn plane_distance(&self, point: Vec3) -> f32 {
        self.normal().dot(&(point - self.v0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_ray_hits_face() {
        let tri = unit_triangle();
        let (t, u, v) = tri
            .intersect_ray(Vec3::new(0.25, 0.25, 1.0), Vec3::new(0.0, 0.0, -1.0), false)
            .unwrap();
        assert_relative_eq!(t, 1.0, epsilon = 1e-5);
        assert_relative_eq!(u, 0.25, epsilon = 1e-5);
        assert_relative_eq!(v, 0.25, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_misses_outside() {
        let tri = unit_triangle();
        assert!(tri
            .intersect_ray(Vec3::new(0.9, 0.9, 1.0), Vec3::new(0.0, 0.0, -1.0), false)
            .is_none());
    }

    #[test]
    fn test_backface_culling() {
        let tri = unit_triangle();
        // Approaching from below hits the back of the CCW winding
        let origin = Vec3::new(0.25, 0.25, -1.0);
        let dir = Vec3::new(0.0, 0.0, 1.0);
        assert!(tri.intersect_ray(origin, dir, true).is_none());
        assert!(tri.intersect_ray(origin, dir, false).is_some());
    }

    #[test]
    fn test_parallel_ray_is_miss() {
        let tri = unit_triangle();
        assert!(tri
            .intersect_ray(Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 0.0, 0.0), false)
            .is_none());
    }

    #[test]
    fn test_closest_point_regions() {
        let tri = unit_triangle();
        // Face region
        let p = tri.closest_point(Vec3::new(0.2, 0.2, 5.0));
        assert_relative_eq!((p - Vec3::new(0.2, 0.2, 0.0)).magnitude(), 0.0, epsilon = 1e-5);
        // Vertex region
        let p = tri.closest_point(Vec3::new(-1.0, -1.0, 0.0));
        assert_relative_eq!((p - Vec3::zeros()).magnitude(), 0.0, epsilon = 1e-5);
        // Edge region
        let p = tri.closest_point(Vec3::new(0.5, -2.0, 0.0));
        assert_relative_eq!((p - Vec3::new(0.5, 0.0, 0.0)).magnitude(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_triangle_normal_is_zero() {
        let tri = Triangle::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(tri.normal().magnitude(), 0.0);
    }

    #[test]
    fn test_edge_flags() {
        let tri = Triangle::with_flags(
            Vec3::zeros(),
            Vec3::x(),
            Vec3::y(),
            TriangleFlags::EDGE01_ACTIVE | TriangleFlags::DOUBLE_SIDED,
        );
        assert!(tri.edge_active(0));
        assert!(!tri.edge_active(1));
        assert!(!tri.edge_active(2));
        assert!(tri.double_sided());
    }
}
