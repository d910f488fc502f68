//! Shape data model
//!
//! Everything a query consumes: the [`Geometry`] sum type and the cooked
//! payloads behind its mesh-like variants.
//!
//! # Module Organization
//!
//! - [`aabb`] - Axis-aligned bounds for broad-phase volumes
//! - [`triangle`] - Triangles with edge-activity flags
//! - [`shape`] - The `Geometry` sum type and `ShapeKind` tags
//! - [`convex`] - Cooked convex hull data (vertices + face planes)
//! - [`trimesh`] - Cooked triangle meshes and the candidate-index seam
//! - [`heightfield`] - Regular-grid height fields

pub mod aabb;
pub mod convex;
pub mod heightfield;
pub mod shape;
pub mod triangle;
pub mod trimesh;

// Re-export commonly used types
pub use aabb::Aabb;
pub use convex::{ConvexHullData, HullFace};
pub use heightfield::{HeightFieldData, HeightFieldView};
pub use shape::{Geometry, GeometryError, ShapeKind};
pub use triangle::{Triangle, TriangleFlags};
pub use trimesh::{CandidateIndex, LinearIndex, TriangleMeshData};
