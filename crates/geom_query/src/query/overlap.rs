//! Overlap subsystem
//!
//! Boolean "do these two posed shapes intersect" queries. Dispatch is a
//! `match` over the ordered kind pair: when the natural argument order is
//! not canonical (kind(A) > kind(B)) the operands are swapped before
//! dispatch. Overlap is symmetric, so the boolean is returned as-is; the
//! coherence hint's axis is mirrored across the swap so its contract
//! (axis points from A toward B) holds for the caller's operand order.
//!
//! Anything involving a mesh or height field transforms the other shape
//! into the index's local frame, gathers candidates with a conservative
//! AABB, and runs an exact per-triangle test, short-circuiting on the
//! first hit ("any overlap" semantics).

use super::distance;
use super::gjk::{self, OverlapHint, SupportShape};
use crate::config::QueryTuning;
use crate::foundation::math::{Pose, Vec3};
use crate::geometry::{Aabb, Geometry, HeightFieldView, ShapeKind, Triangle};
use log::warn;

/// Test whether two posed geometries overlap
pub fn overlap(geom_a: &Geometry, pose_a: &Pose, geom_b: &Geometry, pose_b: &Pose) -> bool {
    overlap_with(geom_a, pose_a, geom_b, pose_b, None, &QueryTuning::default())
}

/// [`overlap`] with a coherence hint and explicit tuning.
///
/// The hint is read at call start and conditionally overwritten at call
/// end; persist it across frames for the same shape pair to accelerate
/// convex-vs-convex and convex-vs-mesh queries.
pub fn overlap_with(
    geom_a: &Geometry,
    pose_a: &Pose,
    geom_b: &Geometry,
    pose_b: &Pose,
    hint: Option<&mut OverlapHint>,
    tuning: &QueryTuning,
) -> bool {
    if geom_a.kind() <= geom_b.kind() {
        return overlap_canonical(geom_a, pose_a, geom_b, pose_b, hint, tuning);
    }
    // Swap into canonical order; the hint axis flips with the operands
    match hint {
        Some(hint) => {
            hint.axis = -hint.axis;
            let result =
                overlap_canonical(geom_b, pose_b, geom_a, pose_a, Some(hint), tuning);
            hint.axis = -hint.axis;
            result
        }
        None => overlap_canonical(geom_b, pose_b, geom_a, pose_a, None, tuning),
    }
}

/// Returned by unsupported-pair dispatch; callers must not invoke these
fn unsupported(a: ShapeKind, b: ShapeKind) -> bool {
    debug_assert!(false, "unsupported overlap pair {a:?} vs {b:?}");
    warn!("overlap called for unsupported pair {a:?} vs {b:?}");
    false
}

#[allow(clippy::too_many_lines)]
fn overlap_canonical(
    geom_a: &Geometry,
    pose_a: &Pose,
    geom_b: &Geometry,
    pose_b: &Pose,
    mut hint: Option<&mut OverlapHint>,
    tuning: &QueryTuning,
) -> bool {
    use Geometry as G;
    match (geom_a, geom_b) {
        // --- sphere vs the primitives -----------------------------------
        (G::Sphere { radius: r0 }, G::Sphere { radius: r1 }) => {
            let distance_squared = (pose_a.position - pose_b.position).magnitude_squared();
            let radius_sum = r0 + r1;
            distance_squared <= radius_sum * radius_sum
        }
        (G::Sphere { radius }, G::Plane) => {
            plane_signed_distance(pose_b, pose_a.position) <= *radius
        }
        (G::Sphere { radius: r0 }, G::Capsule { .. }) => {
            let (a, b, r1) = capsule_segment(geom_b, pose_b);
            let radius_sum = r0 + r1;
            distance::point_segment_distance_sq(pose_a.position, a, b)
                <= radius_sum * radius_sum
        }
        (G::Sphere { radius }, G::Box { half_extents }) => {
            distance::point_obb_distance_sq(pose_a.position, pose_b, *half_extents)
                <= radius * radius
        }

        // --- plane vs the convex shapes ---------------------------------
        (G::Plane, G::Capsule { .. }) => {
            let (a, b, radius) = capsule_segment(geom_b, pose_b);
            plane_signed_distance(pose_a, a).min(plane_signed_distance(pose_a, b)) <= radius
        }
        (G::Plane, G::Box { .. } | G::ConvexHull { .. }) => {
            // The support point toward the plane decides
            let normal = plane_normal(pose_a);
            let support = SupportShape::from_geometry(geom_b, pose_b)
                .expect("boxes and hulls have support mappings")
                .support(-normal);
            plane_signed_distance(pose_a, support) <= 0.0
        }
        (G::Plane, G::TriangleMesh { data, scale }) => {
            // Any scaled vertex behind the plane, plane taken into mesh space
            let local_normal = pose_b.inverse_transform_vector(plane_normal(pose_a));
            let local_anchor = pose_b.inverse_transform_point(pose_a.position);
            data.vertices().iter().any(|v| {
                local_normal.dot(&(v.component_mul(scale) - local_anchor)) <= 0.0
            })
        }
        (G::Plane, G::HeightField { .. }) => {
            let view = heightfield_view(geom_b);
            let local_normal = pose_b.inverse_transform_vector(plane_normal(pose_a));
            let local_anchor = pose_b.inverse_transform_point(pose_a.position);
            for row in 0..view.data.rows() {
                for col in 0..view.data.columns() {
                    let v = view.vertex(row, col);
                    if local_normal.dot(&(v - local_anchor)) <= 0.0 {
                        return true;
                    }
                }
            }
            false
        }

        // --- capsule / box closed forms ---------------------------------
        (G::Capsule { .. }, G::Capsule { .. }) => {
            let (a0, b0, r0) = capsule_segment(geom_a, pose_a);
            let (a1, b1, r1) = capsule_segment(geom_b, pose_b);
            let radius_sum = r0 + r1;
            distance::segment_segment_distance_sq(a0, b0, a1, b1) <= radius_sum * radius_sum
        }
        (G::Box { half_extents: ha }, G::Box { half_extents: hb }) => {
            distance::obb_obb_sat(pose_a, *ha, pose_b, *hb)
        }

        // --- remaining convex pairs: the support-mapping solver ---------
        (
            G::Sphere { .. } | G::Capsule { .. } | G::Box { .. } | G::ConvexHull { .. },
            G::ConvexHull { .. },
        )
        | (G::Capsule { .. }, G::Box { .. }) => {
            let a = SupportShape::from_geometry(geom_a, pose_a)
                .expect("convex geometry has a support mapping");
            let b = SupportShape::from_geometry(geom_b, pose_b)
                .expect("convex geometry has a support mapping");
            gjk::gjk_overlap(&a, &b, hint, tuning)
        }

        // --- convex vs mesh / height field ------------------------------
        (
            G::Sphere { .. } | G::Capsule { .. } | G::Box { .. } | G::ConvexHull { .. },
            G::TriangleMesh { data, scale },
        ) => {
            let local_pose = pose_b.inverse().combine(pose_a);
            let tester = LocalTester::new(geom_a, &local_pose);
            let query_bounds = geom_a.bounds(&local_pose);
            let inv_scale = Vec3::new(1.0 / scale.x, 1.0 / scale.y, 1.0 / scale.z);
            let unscaled = Aabb::new(
                query_bounds.min.component_mul(&inv_scale),
                query_bounds.max.component_mul(&inv_scale),
            );
            let mut found = false;
            data.index().for_each_in_bounds(&unscaled, &mut |id| {
                let tri = data.triangle(id, *scale);
                if tester.test(&tri, hint.as_deref_mut(), tuning) {
                    found = true;
                    return false; // Any-overlap: stop at the first hit
                }
                true
            });
            found
        }
        (
            G::Sphere { .. } | G::Capsule { .. } | G::Box { .. } | G::ConvexHull { .. },
            G::HeightField { .. },
        ) => {
            let view = heightfield_view(geom_b);
            let local_pose = pose_b.inverse().combine(pose_a);
            let query_bounds = geom_a.bounds(&local_pose);

            // Cheap accept before any cell walk: the surface point sampled
            // directly beneath the query center is on a real triangle
            if let G::Sphere { radius } = geom_a {
                let c = local_pose.position;
                if let Some(height) = view.sample_height(c.x, c.z) {
                    let on_surface = Vec3::new(c.x, height, c.z);
                    if (c - on_surface).magnitude_squared() <= radius * radius {
                        return true;
                    }
                }
            }

            let tester = LocalTester::new(geom_a, &local_pose);
            let mut found = false;
            view.for_each_in_bounds(&query_bounds, &mut |id| {
                if tester.test(&view.triangle(id), hint.as_deref_mut(), tuning) {
                    found = true;
                    return false;
                }
                true
            });
            found
        }

        // --- documented capability gaps ---------------------------------
        (G::Plane, G::Plane)
        | (G::TriangleMesh { .. }, G::TriangleMesh { .. } | G::HeightField { .. })
        | (G::HeightField { .. }, G::HeightField { .. }) => {
            unsupported(geom_a.kind(), geom_b.kind())
        }

        // Non-canonical orders cannot reach this point
        _ => unreachable!("operands are in canonical kind order"),
    }
}

/// Signed distance of a world point above the plane's surface
fn plane_signed_distance(plane_pose: &Pose, point: Vec3) -> f32 {
    plane_normal(plane_pose).dot(&(point - plane_pose.position))
}

/// Outward plane normal: the pose's +Y axis
fn plane_normal(plane_pose: &Pose) -> Vec3 {
    plane_pose.transform_vector(Vec3::y())
}

/// World-space core segment and radius of a capsule geometry
fn capsule_segment(geom: &Geometry, pose: &Pose) -> (Vec3, Vec3, f32) {
    match geom {
        Geometry::Capsule {
            half_height,
            radius,
        } => {
            let axis = pose.transform_vector(Vec3::new(0.0, *half_height, 0.0));
            (pose.position - axis, pose.position + axis, *radius)
        }
        _ => unreachable!("caller matched a capsule"),
    }
}

/// Borrow a height-field geometry as its scaled view
fn heightfield_view(geom: &Geometry) -> HeightFieldView<'_> {
    match geom {
        Geometry::HeightField {
            data,
            row_scale,
            column_scale,
            height_scale,
        } => HeightFieldView {
            data,
            row_scale: *row_scale,
            column_scale: *column_scale,
            height_scale: *height_scale,
        },
        _ => unreachable!("caller matched a height field"),
    }
}

/// Exact narrow test of a convex query against one local-space triangle
enum LocalTester<'a> {
    Sphere {
        center: Vec3,
        radius: f32,
    },
    Capsule {
        a: Vec3,
        b: Vec3,
        radius: f32,
    },
    Box {
        pose: Pose,
        half_extents: Vec3,
    },
    Hull {
        shape: SupportShape<'a>,
    },
}

impl<'a> LocalTester<'a> {
    /// `local_pose` places the query geometry in the mesh's local frame
    fn new(geom: &'a Geometry, local_pose: &Pose) -> Self {
        match geom {
            Geometry::Sphere { radius } => Self::Sphere {
                center: local_pose.position,
                radius: *radius,
            },
            Geometry::Capsule { .. } => {
                let (a, b, radius) = capsule_segment(geom, local_pose);
                Self::Capsule { a, b, radius }
            }
            Geometry::Box { half_extents } => Self::Box {
                pose: *local_pose,
                half_extents: *half_extents,
            },
            Geometry::ConvexHull { .. } => Self::Hull {
                shape: SupportShape::from_geometry(geom, local_pose)
                    .expect("hulls have support mappings"),
            },
            _ => unreachable!("mesh queries are restricted to convex shapes"),
        }
    }

    fn test(
        &self,
        tri: &Triangle,
        hint: Option<&mut OverlapHint>,
        tuning: &QueryTuning,
    ) -> bool {
        match self {
            Self::Sphere { center, radius } => {
                distance::point_triangle_distance_sq(*center, tri) <= radius * radius
            }
            Self::Capsule { a, b, radius } => {
                distance::segment_triangle_distance_sq(*a, *b, tri) <= radius * radius
            }
            Self::Box { pose, half_extents } => {
                let local_tri = Triangle::new(
                    pose.inverse_transform_point(tri.v0),
                    pose.inverse_transform_point(tri.v1),
                    pose.inverse_transform_point(tri.v2),
                );
                distance::triangle_box_sat(&local_tri, *half_extents)
            }
            Self::Hull { shape } => {
                gjk::gjk_overlap(shape, &SupportShape::from_triangle(tri), hint, tuning)
            }
        }
    }
}

/// Paginated enumeration of mesh/height-field triangles overlapped by a
/// convex query shape.
///
/// Matches are produced in candidate order; `start_index` skips that many
/// matches before writing, `results.len()` caps the page, and `overflow`
/// reports that at least one further match exists past the page.
pub fn find_overlapping_triangles(
    query: &Geometry,
    query_pose: &Pose,
    target: &Geometry,
    target_pose: &Pose,
    results: &mut [u32],
    start_index: usize,
) -> (usize, bool) {
    find_overlapping_triangles_with(
        query,
        query_pose,
        target,
        target_pose,
        results,
        start_index,
        &QueryTuning::default(),
    )
}

/// [`find_overlapping_triangles`] with explicit tuning
pub fn find_overlapping_triangles_with(
    query: &Geometry,
    query_pose: &Pose,
    target: &Geometry,
    target_pose: &Pose,
    results: &mut [u32],
    start_index: usize,
    tuning: &QueryTuning,
) -> (usize, bool) {
    if !query.kind().is_convex() || !target.kind().is_mesh_like() {
        debug_assert!(
            false,
            "find_overlapping_triangles needs a convex query and a mesh-like target"
        );
        warn!(
            "find_overlapping_triangles rejected: {:?} vs {:?}",
            query.kind(),
            target.kind()
        );
        return (0, false);
    }

    let local_pose = target_pose.inverse().combine(query_pose);
    let tester = LocalTester::new(query, &local_pose);
    let query_bounds = query.bounds(&local_pose);

    let mut matched = 0usize;
    let mut written = 0usize;
    let mut overflow = false;
    let mut handle = |id: u32, tri: &Triangle| -> bool {
        if !tester.test(tri, None, tuning) {
            return true;
        }
        if matched >= start_index {
            if written < results.len() {
                results[written] = id;
                written += 1;
            } else {
                overflow = true;
                return false; // Page full and a further match exists
            }
        }
        matched += 1;
        true
    };

    match target {
        Geometry::TriangleMesh { data, scale } => {
            let inv_scale = Vec3::new(1.0 / scale.x, 1.0 / scale.y, 1.0 / scale.z);
            let unscaled = Aabb::new(
                query_bounds.min.component_mul(&inv_scale),
                query_bounds.max.component_mul(&inv_scale),
            );
            data.index().for_each_in_bounds(&unscaled, &mut |id| {
                let tri = data.triangle(id, *scale);
                handle(id, &tri)
            });
        }
        Geometry::HeightField { .. } => {
            let view = heightfield_view(target);
            view.for_each_in_bounds(&query_bounds, &mut |id| {
                let tri = view.triangle(id);
                handle(id, &tri)
            });
        }
        _ => unreachable!("target kind checked above"),
    }

    (written, overflow)
}
