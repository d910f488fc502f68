//! Closed-form primitive distance and intersection tests
//!
//! Pure functions with no side effects. Everything here works on raw
//! points, segments, triangles and boxes; shape-pair policy (which test to
//! run, what to do with the result) lives in the overlap/raycast/sweep
//! modules.

use crate::foundation::math::{utils, Pose, Vec3};
use crate::geometry::Triangle;

/// Closest point on segment `ab` to `p`, with its parameter in [0, 1]
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> (Vec3, f32) {
    let ab = b - a;
    let len_sq = ab.magnitude_squared();
    if len_sq < f32::EPSILON {
        return (a, 0.0); // Degenerate segment collapses to a point
    }
    let t = utils::clamp((p - a).dot(&ab) / len_sq, 0.0, 1.0);
    (a + ab * t, t)
}

/// Squared distance from `p` to segment `ab`
pub fn point_segment_distance_sq(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let (closest, _) = closest_point_on_segment(p, a, b);
    (p - closest).magnitude_squared()
}

/// Closest points between segments `p1q1` and `p2q2`.
///
/// Returns (point on first, point on second, s, t) with both parameters
/// in [0, 1]. Handles degenerate (point-like) segments and the parallel
/// case. See Ericson, Real-Time Collision Detection, 5.1.9.
pub fn segment_segment_closest(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3, f32, f32) {
    const EPSILON: f32 = 1.0e-10;

    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.magnitude_squared();
    let e = d2.magnitude_squared();
    let f = d2.dot(&r);

    let (mut s, mut t);
    if a <= EPSILON && e <= EPSILON {
        // Both segments are points
        return (p1, p2, 0.0, 0.0);
    }
    if a <= EPSILON {
        s = 0.0;
        t = utils::clamp(f / e, 0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e <= EPSILON {
            t = 0.0;
            s = utils::clamp(-c / a, 0.0, 1.0);
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            // Parallel segments pick s = 0 and rely on the t clamp
            s = if denom > EPSILON {
                utils::clamp((b * f - c * e) / denom, 0.0, 1.0)
            } else {
                0.0
            };
            t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = utils::clamp(-c / a, 0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = utils::clamp((b - c) / a, 0.0, 1.0);
            }
        }
    }

    let c1 = p1 + d1 * s;
    let c2 = p2 + d2 * t;
    (c1, c2, s, t)
}

/// Squared distance between segments `p1q1` and `p2q2`
pub fn segment_segment_distance_sq(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> f32 {
    let (c1, c2, _, _) = segment_segment_closest(p1, q1, p2, q2);
    (c1 - c2).magnitude_squared()
}

/// Squared distance from a point to a triangle
pub fn point_triangle_distance_sq(p: Vec3, tri: &Triangle) -> f32 {
    let closest = tri.closest_point(p);
    (p - closest).magnitude_squared()
}

/// Squared distance from segment `ab` to a triangle.
///
/// Zero when the segment pierces the triangle; otherwise the minimum over
/// the segment against each triangle edge and each endpoint against the
/// face.
pub fn segment_triangle_distance_sq(a: Vec3, b: Vec3, tri: &Triangle) -> f32 {
    // Piercing test: Möller-Trumbore with the unnormalized segment
    // direction gives t in segment units
    if let Some((t, _, _)) = tri.intersect_ray(a, b - a, false) {
        if t <= 1.0 {
            return 0.0;
        }
    }

    let mut best = point_triangle_distance_sq(a, tri).min(point_triangle_distance_sq(b, tri));
    for (ea, eb) in tri.edges() {
        best = best.min(segment_segment_distance_sq(a, b, ea, eb));
    }
    best
}

/// Closest point inside (or on) an oriented box to a world point
pub fn closest_point_on_obb(p: Vec3, pose: &Pose, half_extents: Vec3) -> Vec3 {
    let local = pose.inverse_transform_point(p);
    let clamped = Vec3::new(
        utils::clamp(local.x, -half_extents.x, half_extents.x),
        utils::clamp(local.y, -half_extents.y, half_extents.y),
        utils::clamp(local.z, -half_extents.z, half_extents.z),
    );
    pose.transform_point(clamped)
}

/// Squared distance from a world point to an oriented box (0 inside)
pub fn point_obb_distance_sq(p: Vec3, pose: &Pose, half_extents: Vec3) -> f32 {
    (p - closest_point_on_obb(p, pose, half_extents)).magnitude_squared()
}

/// Project three points onto an axis, returning the covered interval
fn project_triangle(axis: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> (f32, f32) {
    let p0 = axis.dot(&v0);
    let p1 = axis.dot(&v1);
    let p2 = axis.dot(&v2);
    (p0.min(p1).min(p2), p0.max(p1).max(p2))
}

/// Projection radius of an axis-aligned box with the given half extents
fn box_projection_radius(axis: Vec3, half: Vec3) -> f32 {
    half.x * axis.x.abs() + half.y * axis.y.abs() + half.z * axis.z.abs()
}

/// Separating-axis test between a triangle and an axis-aligned box
/// centered at the origin.
///
/// The triangle must already be translated into box-centered space. Tests
/// the 13 candidate axes: 9 edge-cross axes (triangle edge x box axis),
/// the 3 box axes against the triangle's AABB, and the triangle's face
/// normal via the extreme-corner plane test. The shapes intersect iff no
/// axis separates them. Degenerate cross axes are skipped, so a zero-area
/// triangle still resolves through the remaining axes.
pub fn triangle_box_sat(tri: &Triangle, half: Vec3) -> bool {
    let v0 = tri.v0;
    let v1 = tri.v1;
    let v2 = tri.v2;
    let edges = [v1 - v0, v2 - v1, v0 - v2];

    // 9 edge-cross axes: box axis e_i x triangle edge f_j
    for (i, unit) in [Vec3::x(), Vec3::y(), Vec3::z()].iter().enumerate() {
        for edge in &edges {
            let axis = unit.cross(edge);
            if axis.magnitude_squared() < 1.0e-12 {
                continue; // Edge parallel to the box axis, no information
            }
            let (tri_min, tri_max) = project_triangle(axis, v0, v1, v2);
            let r = box_projection_radius(axis, half);
            if tri_min > r || tri_max < -r {
                return false;
            }
        }
        // Box face axis doubles as the triangle AABB test on this axis
        let (tri_min, tri_max) = project_triangle(*unit, v0, v1, v2);
        if tri_min > half[i] || tri_max < -half[i] {
            return false;
        }
    }

    // Triangle face plane against the most extreme box corner per sign
    let normal = edges[0].cross(&(v2 - v0));
    let d = normal.dot(&v0);
    let r = box_projection_radius(normal, half);
    if d > r || d < -r {
        return false;
    }

    true
}

/// Separating-axis test between two oriented boxes (15 axes: 3 + 3 face
/// axes and 9 edge-cross axes).
pub fn obb_obb_sat(pose_a: &Pose, half_a: Vec3, pose_b: &Pose, half_b: Vec3) -> bool {
    let axes_a = [pose_a.axis(0), pose_a.axis(1), pose_a.axis(2)];
    let axes_b = [pose_b.axis(0), pose_b.axis(1), pose_b.axis(2)];
    let delta = pose_b.position - pose_a.position;

    let separated_on = |axis: Vec3| -> bool {
        if axis.magnitude_squared() < 1.0e-12 {
            return false;
        }
        let ra = half_a.x * axes_a[0].dot(&axis).abs()
            + half_a.y * axes_a[1].dot(&axis).abs()
            + half_a.z * axes_a[2].dot(&axis).abs();
        let rb = half_b.x * axes_b[0].dot(&axis).abs()
            + half_b.y * axes_b[1].dot(&axis).abs()
            + half_b.z * axes_b[2].dot(&axis).abs();
        delta.dot(&axis).abs() > ra + rb
    };

    for axis in axes_a {
        if separated_on(axis) {
            return false;
        }
    }
    for axis in axes_b {
        if separated_on(axis) {
            return false;
        }
    }
    for a in axes_a {
        for b in axes_b {
            if separated_on(a.cross(&b)) {
                return false;
            }
        }
    }
    true
}
