//! Convex hull geometry
//!
//! Cooked hull data: the vertex cloud plus outward face planes. The
//! vertices feed the support mapping used by the convex narrow phase; the
//! face planes drive the convex raycast (enter/exit plane classification).

use super::aabb::Aabb;
use super::shape::GeometryError;
use crate::foundation::math::Vec3;
use std::sync::Arc;

/// Tolerance for convexity validation, relative to the hull extent
const CONVEXITY_SLOP: f32 = 1.0e-3;

/// One face plane of a convex hull, in hull-local space.
///
/// Points on the plane satisfy `normal . p == distance`; the hull interior
/// is the `normal . p < distance` side.
#[derive(Debug, Clone, Copy)]
pub struct HullFace {
    /// Outward unit normal
    pub normal: Vec3,
    /// Plane offset along the normal
    pub distance: f32,
}

/// Cooked convex hull data, shared between shapes via `Arc`
#[derive(Debug)]
pub struct ConvexHullData {
    vertices: Vec<Vec3>,
    faces: Vec<HullFace>,
    local_bounds: Aabb,
}

impl ConvexHullData {
    /// Cook hull data from vertices and per-face vertex index loops.
    ///
    /// Face winding must be counter-clockwise seen from outside; normals
    /// are computed from the winding and validated to face away from the
    /// centroid. Every vertex must lie on or behind every face plane
    /// (within a small slop proportional to the hull extent).
    pub fn new(
        vertices: Vec<Vec3>,
        face_indices: &[Vec<u32>],
    ) -> Result<Arc<Self>, GeometryError> {
        if vertices.len() < 4 {
            return Err(GeometryError::DegenerateHull(format!(
                "need at least 4 vertices, got {}",
                vertices.len()
            )));
        }
        if face_indices.len() < 4 {
            return Err(GeometryError::DegenerateHull(format!(
                "need at least 4 faces, got {}",
                face_indices.len()
            )));
        }

        let local_bounds = Aabb::from_points(&vertices);
        let extent = (local_bounds.max - local_bounds.min).amax().max(1.0);
        let centroid =
            vertices.iter().fold(Vec3::zeros(), |acc, v| acc + v) / vertices.len() as f32;

        let mut faces = Vec::with_capacity(face_indices.len());
        for loop_indices in face_indices {
            if loop_indices.len() < 3 {
                return Err(GeometryError::DegenerateHull(
                    "face with fewer than 3 vertices".to_string(),
                ));
            }
            for &index in loop_indices {
                if index as usize >= vertices.len() {
                    return Err(GeometryError::IndexOutOfBounds {
                        index,
                        count: vertices.len(),
                    });
                }
            }

            // Newell's method handles polygons whose first corner is collinear
            let mut normal = Vec3::zeros();
            for i in 0..loop_indices.len() {
                let a = vertices[loop_indices[i] as usize];
                let b = vertices[loop_indices[(i + 1) % loop_indices.len()] as usize];
                normal += Vec3::new(
                    (a.y - b.y) * (a.z + b.z),
                    (a.z - b.z) * (a.x + b.x),
                    (a.x - b.x) * (a.y + b.y),
                );
            }
            let len = normal.magnitude();
            if len < f32::EPSILON {
                return Err(GeometryError::DegenerateHull(
                    "zero-area face".to_string(),
                ));
            }
            let normal = normal / len;
            let anchor = vertices[loop_indices[0] as usize];
            let distance = normal.dot(&anchor);
            if normal.dot(&centroid) > distance {
                return Err(GeometryError::DegenerateHull(
                    "face normal points into the hull (check winding)".to_string(),
                ));
            }
            faces.push(HullFace { normal, distance });
        }

        // Convexity: every vertex behind every face plane
        let slop = CONVEXITY_SLOP * extent;
        for face in &faces {
            for vertex in &vertices {
                if face.normal.dot(vertex) > face.distance + slop {
                    return Err(GeometryError::DegenerateHull(
                        "vertex outside a face plane (hull is not convex)".to_string(),
                    ));
                }
            }
        }

        Ok(Arc::new(Self {
            vertices,
            faces,
            local_bounds,
        }))
    }

    /// Convenience: cook an axis-aligned cuboid hull
    pub fn cuboid(half_extents: Vec3) -> Result<Arc<Self>, GeometryError> {
        let h = half_extents;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        let faces = vec![
            vec![0, 3, 2, 1], // -Z
            vec![4, 5, 6, 7], // +Z
            vec![0, 1, 5, 4], // -Y
            vec![2, 3, 7, 6], // +Y
            vec![0, 4, 7, 3], // -X
            vec![1, 2, 6, 5], // +X
        ];
        Self::new(vertices, &faces)
    }

    /// Hull vertices in local space
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Outward face planes in local space
    pub fn faces(&self) -> &[HullFace] {
        &self.faces
    }

    /// Tight local bounds of the vertex cloud
    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    /// Farthest scaled vertex along `dir` (both in hull-local space)
    pub fn support_local(&self, dir: Vec3, scale: Vec3) -> Vec3 {
        let mut best = self.vertices[0].component_mul(&scale);
        let mut best_dot = best.dot(&dir);
        for vertex in &self.vertices[1..] {
            let scaled = vertex.component_mul(&scale);
            let dot = scaled.dot(&dir);
            if dot > best_dot {
                best_dot = dot;
                best = scaled;
            }
        }
        best
    }
}
