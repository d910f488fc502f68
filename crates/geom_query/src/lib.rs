//! # Geom Query
//!
//! The geometric query engine of a physics middleware: given two shapes
//! (a tagged geometry plus a world pose), it answers three questions —
//! do they overlap, does a ray hit one, and does one shape swept along a
//! direction hit the other (with time-of-impact, contact point and
//! normal).
//!
//! ## Features
//!
//! - **Shape model**: sphere, plane, capsule, box, convex hull, triangle
//!   mesh and height field behind one sum type
//! - **Overlap**: symmetric pairwise tests with a caller-persisted
//!   coherence hint for temporally coherent convex queries
//! - **Raycast**: closed-form and candidate-index-driven ray queries with
//!   selectable output fields
//! - **Sweep**: continuous collision with minimum time-of-impact, contact
//!   point and normal
//! - **Candidate index seam**: the mesh spatial structure is a trait;
//!   bring your own tree or use the in-tree linear scan
//!
//! ## Quick Start
//!
//! ```rust
//! use geom_query::prelude::*;
//!
//! let sphere = Geometry::sphere(1.0)?;
//! let ground = Geometry::plane();
//!
//! let overlapping = overlap(
//!     &sphere,
//!     &Pose::from_position(Vec3::new(0.0, 0.5, 0.0)),
//!     &ground,
//!     &Pose::identity(),
//! );
//! assert!(overlapping);
//!
//! let hit = sweep(
//!     Vec3::new(0.0, -1.0, 0.0),
//!     10.0,
//!     &sphere,
//!     &Pose::from_position(Vec3::new(0.0, 5.0, 0.0)),
//!     &ground,
//!     &Pose::identity(),
//!     SweepFlags::empty(),
//! )
//! .expect("falls onto the plane");
//! assert!((hit.distance - 4.0).abs() < 1.0e-4);
//! # Ok::<(), geom_query::geometry::GeometryError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod geometry;
pub mod query;

pub use config::{ConfigError, QueryTuning};

/// Common imports for engine users
pub mod prelude {
    pub use crate::config::QueryTuning;
    pub use crate::foundation::math::{Pose, Quat, Vec3};
    pub use crate::geometry::{
        Aabb, CandidateIndex, ConvexHullData, Geometry, GeometryError, HeightFieldData,
        ShapeKind, Triangle, TriangleFlags, TriangleMeshData,
    };
    pub use crate::query::{
        find_overlapping_triangles, overlap, overlap_with, raycast, sweep,
        sweep_vs_triangle_batch, HintState, HitFields, OverlapHint, RayHit, SweepFlags, SweepHit,
    };
}
