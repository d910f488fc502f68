//! Triangle mesh geometry and the candidate index seam
//!
//! The spatial acceleration structure over a mesh's triangles is an
//! external collaborator: the engine only consumes the [`CandidateIndex`]
//! trait, which narrows a query volume or ray down to candidate triangle
//! ids. A [`LinearIndex`] (per-triangle bounds scan) ships in-tree so the
//! engine and its tests run without the external structure; middleware
//! integrations substitute their own tree.

use super::aabb::Aabb;
use super::shape::GeometryError;
use super::triangle::{Triangle, TriangleFlags};
use crate::foundation::math::Vec3;
use std::collections::HashMap;
use std::sync::Arc;

/// Candidate enumeration over a mesh's triangles.
///
/// Both visitors are synchronous and re-entrant; returning `false` from
/// the callback aborts the traversal early ("first hit found, stop").
/// Coordinates are in the mesh's unscaled data space; the ray direction is
/// deliberately not required to be unit length so callers can fold a
/// nonuniform inverse scale into it while keeping the same t range.
pub trait CandidateIndex: Send + Sync {
    /// Visit ids of triangles whose bounds overlap `bounds`
    fn for_each_in_bounds(&self, bounds: &Aabb, visit: &mut dyn FnMut(u32) -> bool);

    /// Visit ids of triangles whose bounds the ray `origin + t * dir`,
    /// `t` in `[0, max_t]`, may pass through
    fn for_each_along_ray(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_t: f32,
        visit: &mut dyn FnMut(u32) -> bool,
    );
}

/// Trivial candidate index: scans every triangle's bounds.
///
/// Correct for any mesh size, efficient only for small ones.
#[derive(Debug)]
pub struct LinearIndex {
    tri_bounds: Vec<Aabb>,
}

impl LinearIndex {
    /// Build from per-triangle bounds
    pub fn new(tri_bounds: Vec<Aabb>) -> Self {
        Self { tri_bounds }
    }
}

/// Slab test of a (possibly non-unit) ray against an AABB over `[0, max_t]`
fn ray_overlaps_bounds(bounds: &Aabb, origin: Vec3, dir: Vec3, max_t: f32) -> bool {
    let mut t_min = 0.0f32;
    let mut t_max = max_t;
    for axis in 0..3 {
        let d = dir[axis];
        let o = origin[axis];
        if d.abs() < 1.0e-12 {
            if o < bounds.min[axis] || o > bounds.max[axis] {
                return false;
            }
        } else {
            let inv = 1.0 / d;
            let mut t0 = (bounds.min[axis] - o) * inv;
            let mut t1 = (bounds.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return false;
            }
        }
    }
    true
}

impl CandidateIndex for LinearIndex {
    fn for_each_in_bounds(&self, bounds: &Aabb, visit: &mut dyn FnMut(u32) -> bool) {
        for (id, tri_bounds) in self.tri_bounds.iter().enumerate() {
            if tri_bounds.intersects(bounds) && !visit(id as u32) {
                return;
            }
        }
    }

    fn for_each_along_ray(
        &self,
        origin: Vec3,
        dir: Vec3,
        max_t: f32,
        visit: &mut dyn FnMut(u32) -> bool,
    ) {
        for (id, tri_bounds) in self.tri_bounds.iter().enumerate() {
            if ray_overlaps_bounds(tri_bounds, origin, dir, max_t) && !visit(id as u32) {
                return;
            }
        }
    }
}

/// Cooked triangle mesh data, shared between shapes via `Arc`
pub struct TriangleMeshData {
    vertices: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
    tri_flags: Vec<TriangleFlags>,
    local_bounds: Aabb,
    index: Box<dyn CandidateIndex>,
}

impl std::fmt::Debug for TriangleMeshData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriangleMeshData")
            .field("vertices", &self.vertices.len())
            .field("triangles", &self.indices.len())
            .field("local_bounds", &self.local_bounds)
            .finish()
    }
}

impl TriangleMeshData {
    /// Cook mesh data with the in-tree [`LinearIndex`].
    ///
    /// Edge activity is derived from adjacency: an edge used by exactly
    /// one triangle is a silhouette edge and stays active, an edge shared
    /// by two triangles is internal and is deactivated. `double_sided`
    /// marks every triangle as solid from both sides.
    pub fn new(
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
        double_sided: bool,
    ) -> Result<Arc<Self>, GeometryError> {
        Self::cook(vertices, indices, double_sided, |tri_bounds| {
            Box::new(LinearIndex::new(tri_bounds))
        })
    }

    /// Cook mesh data with a caller-provided candidate index.
    ///
    /// The builder receives the per-triangle bounds in data space.
    pub fn with_index(
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
        double_sided: bool,
        build_index: impl FnOnce(Vec<Aabb>) -> Box<dyn CandidateIndex>,
    ) -> Result<Arc<Self>, GeometryError> {
        Self::cook(vertices, indices, double_sided, build_index)
    }

    fn cook(
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
        double_sided: bool,
        build_index: impl FnOnce(Vec<Aabb>) -> Box<dyn CandidateIndex>,
    ) -> Result<Arc<Self>, GeometryError> {
        if indices.is_empty() {
            return Err(GeometryError::EmptyMesh);
        }
        for tri in &indices {
            for &i in tri {
                if i as usize >= vertices.len() {
                    return Err(GeometryError::IndexOutOfBounds {
                        index: i,
                        count: vertices.len(),
                    });
                }
            }
        }

        // Count edge sharing to find silhouette edges
        let mut edge_use: HashMap<(u32, u32), u32> = HashMap::new();
        for tri in &indices {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                *edge_use.entry(key).or_insert(0) += 1;
            }
        }

        let mut tri_flags = Vec::with_capacity(indices.len());
        let mut tri_bounds = Vec::with_capacity(indices.len());
        for tri in &indices {
            let mut flags = TriangleFlags::empty();
            let edge_bits = [
                TriangleFlags::EDGE01_ACTIVE,
                TriangleFlags::EDGE12_ACTIVE,
                TriangleFlags::EDGE20_ACTIVE,
            ];
            for (slot, (a, b)) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
                .into_iter()
                .enumerate()
            {
                let key = (a.min(b), a.max(b));
                if edge_use[&key] == 1 {
                    flags |= edge_bits[slot];
                }
            }
            if double_sided {
                flags |= TriangleFlags::DOUBLE_SIDED;
            }
            tri_flags.push(flags);
            tri_bounds.push(Aabb::from_points(&[
                vertices[tri[0] as usize],
                vertices[tri[1] as usize],
                vertices[tri[2] as usize],
            ]));
        }

        let mut local_bounds = Aabb::empty();
        for bounds in &tri_bounds {
            local_bounds.merge(bounds);
        }

        let index = build_index(tri_bounds);
        Ok(Arc::new(Self {
            vertices,
            indices,
            tri_flags,
            local_bounds,
            index,
        }))
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Mesh vertices in data space
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Tight bounds of the unscaled data
    pub fn local_bounds(&self) -> Aabb {
        self.local_bounds
    }

    /// The candidate index collaborator
    pub fn index(&self) -> &dyn CandidateIndex {
        self.index.as_ref()
    }

    /// Fetch triangle `id` with the shape's scale applied
    pub fn triangle(&self, id: u32, scale: Vec3) -> Triangle {
        let [i0, i1, i2] = self.indices[id as usize];
        Triangle::with_flags(
            self.vertices[i0 as usize].component_mul(&scale),
            self.vertices[i1 as usize].component_mul(&scale),
            self.vertices[i2 as usize].component_mul(&scale),
            self.tri_flags[id as usize],
        )
    }
}
