//! Geometry sum type and shape kinds
//!
//! A [`Geometry`] is a tagged description of a shape in its own local
//! space; pairing it with a [`Pose`] places it in a common space for
//! queries. Geometries are immutable once constructed and referenced, not
//! owned, by the query engine: mesh-like payloads sit behind `Arc` so many
//! worker threads can query the same data concurrently.

use super::aabb::Aabb;
use super::convex::ConvexHullData;
use super::heightfield::HeightFieldData;
use super::trimesh::TriangleMeshData;
use crate::foundation::math::{Pose, Vec3};
use std::sync::Arc;

/// Errors from constructing a geometry
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// Radius must be finite and positive
    #[error("radius must be finite and positive, got {0}")]
    InvalidRadius(f32),

    /// Half height must be finite and non-negative
    #[error("half height must be finite and non-negative, got {0}")]
    InvalidHalfHeight(f32),

    /// Every half extent must be finite and positive
    #[error("half extents must be finite and positive, got ({0}, {1}, {2})")]
    InvalidHalfExtents(f32, f32, f32),

    /// Every scale component must be finite and positive
    #[error("scale components must be finite and positive, got ({0}, {1}, {2})")]
    InvalidScale(f32, f32, f32),

    /// Convex hull data does not describe a usable hull
    #[error("degenerate convex hull: {0}")]
    DegenerateHull(String),

    /// Triangle mesh has no triangles
    #[error("triangle mesh has no triangles")]
    EmptyMesh,

    /// A mesh index referenced a vertex that does not exist
    #[error("vertex index {index} out of bounds for {count} vertices")]
    IndexOutOfBounds {
        /// The offending index
        index: u32,
        /// Number of vertices in the mesh
        count: usize,
    },

    /// Height field grids need at least a 2x2 sample lattice
    #[error("height field needs at least 2x2 samples, got {rows}x{columns}")]
    BadGridDimensions {
        /// Sample rows
        rows: u32,
        /// Sample columns
        columns: u32,
    },

    /// Sample storage does not match the advertised grid dimensions
    #[error("expected {expected} height samples, got {got}")]
    SampleCountMismatch {
        /// rows * columns
        expected: usize,
        /// Actual sample count
        got: usize,
    },

    /// A height sample was NaN or infinite
    #[error("height sample at index {0} is not finite")]
    NonFiniteSample(usize),
}

/// The closed set of shape kinds, ranked for dispatch canonicalization.
///
/// The numeric rank fixes the canonical operand order of pairwise queries:
/// a pair is always dispatched with the lower-ranked kind first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeKind {
    /// Sphere
    Sphere = 0,
    /// Half-space bounded by a plane
    Plane = 1,
    /// Capsule (segment plus radius)
    Capsule = 2,
    /// Oriented box
    Box = 3,
    /// Convex hull
    ConvexHull = 4,
    /// Triangle mesh
    TriangleMesh = 5,
    /// Height field
    HeightField = 6,
}

impl ShapeKind {
    /// Whether this kind is backed by a triangle soup and a candidate index
    pub fn is_mesh_like(self) -> bool {
        matches!(self, Self::TriangleMesh | Self::HeightField)
    }

    /// Whether this kind has a support mapping (usable by the convex solver)
    pub fn is_convex(self) -> bool {
        matches!(
            self,
            Self::Sphere | Self::Capsule | Self::Box | Self::ConvexHull
        )
    }
}

/// A shape description in local space.
///
/// Construct through the validating constructors; the variants are public
/// so dispatch sites can pattern-match exhaustively.
#[derive(Debug, Clone)]
pub enum Geometry {
    /// A sphere centered on the pose position
    Sphere {
        /// Sphere radius
        radius: f32,
    },
    /// A solid half-space. The surface passes through the pose position
    /// with outward normal `rotation * +Y`; everything behind the normal
    /// is solid.
    Plane,
    /// A capsule along the local Y axis: a segment from `-half_height` to
    /// `+half_height` inflated by `radius`. `half_height == 0` degenerates
    /// to a sphere.
    Capsule {
        /// Half length of the core segment
        half_height: f32,
        /// Capsule radius
        radius: f32,
    },
    /// An oriented box with the given half extents
    Box {
        /// Half extents along the local axes
        half_extents: Vec3,
    },
    /// A convex hull with a nonuniform scale applied to its vertices
    ConvexHull {
        /// Shared cooked hull data
        data: Arc<ConvexHullData>,
        /// Nonuniform vertex scale (componentwise, all positive)
        scale: Vec3,
    },
    /// A triangle mesh with a nonuniform scale applied to its vertices
    TriangleMesh {
        /// Shared cooked mesh data
        data: Arc<TriangleMeshData>,
        /// Nonuniform vertex scale (componentwise, all positive)
        scale: Vec3,
    },
    /// A regular-grid height field
    HeightField {
        /// Shared sample grid
        data: Arc<HeightFieldData>,
        /// Spacing between sample rows (local X)
        row_scale: f32,
        /// Spacing between sample columns (local Z)
        column_scale: f32,
        /// Multiplier applied to stored heights (local Y)
        height_scale: f32,
    },
}

fn check_scale(scale: Vec3) -> Result<(), GeometryError> {
    let ok = scale.iter().all(|c| c.is_finite() && *c > 0.0);
    if ok {
        Ok(())
    } else {
        Err(GeometryError::InvalidScale(scale.x, scale.y, scale.z))
    }
}

impl Geometry {
    /// Create a sphere geometry
    pub fn sphere(radius: f32) -> Result<Self, GeometryError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::InvalidRadius(radius));
        }
        Ok(Self::Sphere { radius })
    }

    /// Create a half-space geometry
    pub fn plane() -> Self {
        Self::Plane
    }

    /// Create a capsule geometry. A zero half height is allowed and
    /// behaves exactly like a sphere.
    pub fn capsule(half_height: f32, radius: f32) -> Result<Self, GeometryError> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GeometryError::InvalidRadius(radius));
        }
        if !half_height.is_finite() || half_height < 0.0 {
            return Err(GeometryError::InvalidHalfHeight(half_height));
        }
        Ok(Self::Capsule {
            half_height,
            radius,
        })
    }

    /// Create a box geometry from half extents
    pub fn cuboid(half_extents: Vec3) -> Result<Self, GeometryError> {
        let ok = half_extents.iter().all(|c| c.is_finite() && *c > 0.0);
        if !ok {
            return Err(GeometryError::InvalidHalfExtents(
                half_extents.x,
                half_extents.y,
                half_extents.z,
            ));
        }
        Ok(Self::Box { half_extents })
    }

    /// Create a convex hull geometry referencing shared cooked data
    pub fn convex_hull(data: Arc<ConvexHullData>, scale: Vec3) -> Result<Self, GeometryError> {
        check_scale(scale)?;
        Ok(Self::ConvexHull { data, scale })
    }

    /// Create a triangle mesh geometry referencing shared cooked data
    pub fn triangle_mesh(data: Arc<TriangleMeshData>, scale: Vec3) -> Result<Self, GeometryError> {
        check_scale(scale)?;
        Ok(Self::TriangleMesh { data, scale })
    }

    /// Create a height field geometry referencing a shared sample grid
    pub fn height_field(
        data: Arc<HeightFieldData>,
        row_scale: f32,
        column_scale: f32,
        height_scale: f32,
    ) -> Result<Self, GeometryError> {
        check_scale(Vec3::new(row_scale, height_scale, column_scale))?;
        Ok(Self::HeightField {
            data,
            row_scale,
            column_scale,
            height_scale,
        })
    }

    /// The kind tag of this geometry
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Sphere { .. } => ShapeKind::Sphere,
            Self::Plane => ShapeKind::Plane,
            Self::Capsule { .. } => ShapeKind::Capsule,
            Self::Box { .. } => ShapeKind::Box,
            Self::ConvexHull { .. } => ShapeKind::ConvexHull,
            Self::TriangleMesh { .. } => ShapeKind::TriangleMesh,
            Self::HeightField { .. } => ShapeKind::HeightField,
        }
    }

    /// Local-space bounds of this geometry.
    ///
    /// Planes are unbounded; their "bounds" are a very large box so they
    /// can still participate in conservative broad tests.
    pub fn local_bounds(&self) -> Aabb {
        const HUGE: f32 = 1.0e8;
        match self {
            Self::Sphere { radius } => {
                Aabb::from_center_extents(Vec3::zeros(), Vec3::new(*radius, *radius, *radius))
            }
            Self::Plane => {
                Aabb::from_center_extents(Vec3::zeros(), Vec3::new(HUGE, HUGE, HUGE))
            }
            Self::Capsule {
                half_height,
                radius,
            } => Aabb::from_center_extents(
                Vec3::zeros(),
                Vec3::new(*radius, half_height + radius, *radius),
            ),
            Self::Box { half_extents } => Aabb::from_center_extents(Vec3::zeros(), *half_extents),
            Self::ConvexHull { data, scale } => {
                let local = data.local_bounds();
                Aabb::new(local.min.component_mul(scale), local.max.component_mul(scale))
            }
            Self::TriangleMesh { data, scale } => {
                let local = data.local_bounds();
                Aabb::new(local.min.component_mul(scale), local.max.component_mul(scale))
            }
            Self::HeightField {
                data,
                row_scale,
                column_scale,
                height_scale,
            } => Aabb::new(
                Vec3::new(0.0, data.min_height() * height_scale, 0.0),
                Vec3::new(
                    (data.rows() - 1) as f32 * row_scale,
                    data.max_height() * height_scale,
                    (data.columns() - 1) as f32 * column_scale,
                ),
            ),
        }
    }

    /// World-space bounds of this geometry under a pose
    pub fn bounds(&self, pose: &Pose) -> Aabb {
        self.local_bounds().transformed_by(pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_validation() {
        assert!(Geometry::sphere(1.0).is_ok());
        assert!(Geometry::sphere(0.0).is_err());
        assert!(Geometry::sphere(f32::NAN).is_err());
        assert!(Geometry::capsule(0.0, 0.5).is_ok());
        assert!(Geometry::capsule(-1.0, 0.5).is_err());
        assert!(Geometry::cuboid(Vec3::new(1.0, 0.0, 1.0)).is_err());
    }

    #[test]
    fn test_kind_ranks_are_stable() {
        assert!(ShapeKind::Sphere < ShapeKind::Plane);
        assert!(ShapeKind::Box < ShapeKind::ConvexHull);
        assert!(ShapeKind::TriangleMesh < ShapeKind::HeightField);
        assert!(ShapeKind::TriangleMesh.is_mesh_like());
        assert!(!ShapeKind::TriangleMesh.is_convex());
        assert!(ShapeKind::Capsule.is_convex());
    }

    #[test]
    fn test_capsule_bounds() {
        let capsule = Geometry::capsule(2.0, 0.5).unwrap();
        let bounds = capsule.local_bounds();
        assert_eq!(bounds.max, Vec3::new(0.5, 2.5, 0.5));
    }

    #[test]
    fn test_world_bounds_follow_pose() {
        let sphere = Geometry::sphere(1.0).unwrap();
        let pose = Pose::from_position(Vec3::new(10.0, 0.0, 0.0));
        let bounds = sphere.bounds(&pose);
        assert!(bounds.contains_point(Vec3::new(10.9, 0.0, 0.0)));
        assert!(!bounds.contains_point(Vec3::new(12.0, 0.0, 0.0)));
    }
}
