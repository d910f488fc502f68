//! Query subsystems: overlap, raycast and sweep
//!
//! The three questions the engine answers about posed shapes:
//!
//! - [`overlap`] - do two shapes intersect right now
//! - [`raycast`] - does a ray hit a shape, and where
//! - [`sweep`] - does a shape translated along a direction hit another,
//!   and at what time of impact
//!
//! plus [`find_overlapping_triangles`] for paginated enumeration against
//! meshes and height fields, and [`sweep_vs_triangle_batch`] for callers
//! that gathered their own triangles.
//!
//! # Module Organization
//!
//! - [`distance`] - Closed-form primitive math (distances, SAT tests)
//! - [`gjk`] - Support mappings, the convex distance solver, linear sweep
//! - [`overlap`] - Pairwise overlap dispatch and mesh candidate paths
//! - [`raycast`] - Per-shape ray queries
//! - [`sweep`] - Continuous-collision queries
//!
//! All queries are pure functions of their inputs plus an optional
//! caller-owned [`OverlapHint`]; immutable shape data can be queried from
//! many threads concurrently, while a hint must belong to one query at a
//! time.

pub mod distance;
pub mod gjk;
pub mod overlap;
pub mod raycast;
pub mod sweep;

// Re-export the public query surface
pub use gjk::{HintState, OverlapHint};
pub use overlap::{
    find_overlapping_triangles, find_overlapping_triangles_with, overlap, overlap_with,
};
pub use raycast::{raycast, raycast_with, HitFields, RayHit};
pub use sweep::{
    sweep, sweep_vs_triangle_batch, sweep_vs_triangle_batch_with, sweep_with, SweepFlags, SweepHit,
};
