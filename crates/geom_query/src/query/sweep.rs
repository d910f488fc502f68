//! Sweep subsystem (continuous collision)
//!
//! A sweep moves shape A along a unit direction over a distance and
//! reports the first time of impact against shape B, with the contact
//! point and normal at that time. The reported distance is always the
//! minimum positive time across all candidate triangles and features,
//! ties break first-found, and the normal is the winner's normal at its
//! own impact time. `distance == 0` with `normal == -dir` encodes
//! "already overlapping at the start".
//!
//! Narrow-phase strategy per swept shape:
//! - sphere/capsule: a moving sphere solved against the triangle's
//!   closest feature (face, then active edges, then vertices); capsules
//!   reduce to a moving sphere at their effective center and endpoints,
//!   so a degenerate capsule reuses the sphere path verbatim
//! - box: the 13-axis separating-axis interval sweep
//! - convex hull (and mixed convex pairs): conservative advancement on
//!   the support-mapping solver

use super::distance;
use super::gjk::{self, SupportShape};
use super::overlap;
use crate::config::QueryTuning;
use crate::foundation::math::{Pose, Vec3};
use crate::geometry::{Aabb, Geometry, HeightFieldView, Triangle, TriangleFlags};
use bitflags::bitflags;
use log::warn;

bitflags! {
    /// Sweep behavior flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SweepFlags: u8 {
        /// Test static overlap at t = 0 first and report it as a hit with
        /// distance 0 and normal `-dir`
        const CHECK_INITIAL_OVERLAP = 1 << 0;
    }
}

/// First contact found by a sweep
#[derive(Debug, Clone, Copy)]
pub struct SweepHit {
    /// Impact time expressed as a distance in `[0, swept length]`
    pub distance: f32,
    /// Impact point on the target surface
    pub position: Vec3,
    /// Contact normal at the impact, opposing the sweep
    pub normal: Vec3,
    /// Triangle index for batch/mesh/height-field targets, 0 otherwise
    pub face_index: u32,
}

/// Sweep `geom_a` (sphere, capsule, box or convex hull) along unit `dir`
/// over `distance` against `geom_b`.
pub fn sweep(
    dir: Vec3,
    distance: f32,
    geom_a: &Geometry,
    pose_a: &Pose,
    geom_b: &Geometry,
    pose_b: &Pose,
    flags: SweepFlags,
) -> Option<SweepHit> {
    sweep_with(
        dir,
        distance,
        geom_a,
        pose_a,
        geom_b,
        pose_b,
        flags,
        &QueryTuning::default(),
    )
}

/// [`sweep`] with explicit tuning
pub fn sweep_with(
    dir: Vec3,
    distance: f32,
    geom_a: &Geometry,
    pose_a: &Pose,
    geom_b: &Geometry,
    pose_b: &Pose,
    flags: SweepFlags,
    tuning: &QueryTuning,
) -> Option<SweepHit> {
    // Setup: validate the motion and the swept shape kind
    if (dir.magnitude_squared() - 1.0).abs() >= tuning.unit_dir_epsilon {
        warn!(
            "sweep rejected: |dir|^2 = {} is not within {} of 1",
            dir.magnitude_squared(),
            tuning.unit_dir_epsilon
        );
        return None;
    }
    if !(distance > 0.0) {
        warn!("sweep rejected: distance = {distance}");
        return None;
    }
    if !geom_a.kind().is_convex() {
        debug_assert!(false, "swept geometry must be convex, got {:?}", geom_a.kind());
        warn!("sweep rejected: swept geometry {:?}", geom_a.kind());
        return None;
    }

    // Initial-overlap check, when requested
    if flags.contains(SweepFlags::CHECK_INITIAL_OVERLAP)
        && overlap::overlap_with(geom_a, pose_a, geom_b, pose_b, None, tuning)
    {
        return Some(SweepHit {
            distance: 0.0,
            position: pose_a.position,
            normal: -dir,
            face_index: 0,
        });
    }

    match geom_b {
        Geometry::Plane => sweep_vs_plane(dir, distance, geom_a, pose_a, pose_b),
        Geometry::TriangleMesh { data, scale } => {
            // Broad phase: the whole sweep volume, in the mesh's frame
            let local_dir = pose_b.inverse_transform_vector(dir);
            let local_pose = pose_b.inverse().combine(pose_a);
            let swept_bounds = geom_a.bounds(&local_pose).swept(local_dir * distance);
            let inv_scale = Vec3::new(1.0 / scale.x, 1.0 / scale.y, 1.0 / scale.z);
            let unscaled = Aabb::new(
                swept_bounds.min.component_mul(&inv_scale),
                swept_bounds.max.component_mul(&inv_scale),
            );
            let mover = TriangleSweeper::new(geom_a, &local_pose, local_dir, distance, tuning);
            let mut best: Option<SweepHit> = None;
            data.index().for_each_in_bounds(&unscaled, &mut |id| {
                let tri = data.triangle(id, *scale);
                accumulate(&mut best, mover.test(&tri), id);
                true
            });
            Some(to_world(best?, pose_b))
        }
        Geometry::HeightField { .. } => {
            let view = heightfield_view(geom_b);
            let local_dir = pose_b.inverse_transform_vector(dir);
            let local_pose = pose_b.inverse().combine(pose_a);
            let swept_bounds = geom_a.bounds(&local_pose).swept(local_dir * distance);
            let mover = TriangleSweeper::new(geom_a, &local_pose, local_dir, distance, tuning);
            let mut best: Option<SweepHit> = None;
            view.for_each_in_bounds(&swept_bounds, &mut |id| {
                let mut tri = view.triangle(id);
                tri.flags |= TriangleFlags::DOUBLE_SIDED;
                accumulate(&mut best, mover.test(&tri), id);
                true
            });
            Some(to_world(best?, pose_b))
        }
        _ => sweep_convex_pair(dir, distance, geom_a, pose_a, geom_b, pose_b, tuning),
    }
}

/// Sweep a convex shape against a batch of world-space triangles.
///
/// Edge-activity and double-sided flags are carried on each [`Triangle`].
/// `cached_index_hint` names a triangle to test first: a hit there at
/// distance 0 short-circuits the whole batch.
pub fn sweep_vs_triangle_batch(
    dir: Vec3,
    distance: f32,
    geom: &Geometry,
    pose: &Pose,
    triangles: &[Triangle],
    cached_index_hint: Option<u32>,
) -> Option<SweepHit> {
    sweep_vs_triangle_batch_with(
        dir,
        distance,
        geom,
        pose,
        triangles,
        cached_index_hint,
        &QueryTuning::default(),
    )
}

/// [`sweep_vs_triangle_batch`] with explicit tuning
pub fn sweep_vs_triangle_batch_with(
    dir: Vec3,
    distance: f32,
    geom: &Geometry,
    pose: &Pose,
    triangles: &[Triangle],
    cached_index_hint: Option<u32>,
    tuning: &QueryTuning,
) -> Option<SweepHit> {
    if (dir.magnitude_squared() - 1.0).abs() >= tuning.unit_dir_epsilon {
        warn!("triangle batch sweep rejected: direction is not unit length");
        return None;
    }
    if !(distance > 0.0) {
        warn!("triangle batch sweep rejected: distance = {distance}");
        return None;
    }
    if !geom.kind().is_convex() {
        debug_assert!(false, "swept geometry must be convex, got {:?}", geom.kind());
        return None;
    }

    let mover = TriangleSweeper::new(geom, pose, dir, distance, tuning);

    // A coherent hint can settle the whole batch at once
    if let Some(hinted) = cached_index_hint {
        if let Some(tri) = triangles.get(hinted as usize) {
            if let Some(hit) = mover.test(tri) {
                if hit.distance <= 0.0 {
                    return Some(SweepHit {
                        face_index: hinted,
                        ..hit
                    });
                }
            }
        }
    }

    let mut best: Option<SweepHit> = None;
    for (id, tri) in triangles.iter().enumerate() {
        accumulate(&mut best, mover.test(tri), id as u32);
    }
    best
}

/// Keep the earlier hit; strictly-later candidates lose (first-found ties)
fn accumulate(best: &mut Option<SweepHit>, candidate: Option<SweepHit>, id: u32) {
    if let Some(mut hit) = candidate {
        hit.face_index = id;
        match best {
            Some(current) if current.distance <= hit.distance => {}
            _ => *best = Some(hit),
        }
    }
}

/// Map a hit computed in a mesh's local frame back to world space
fn to_world(mut hit: SweepHit, pose: &Pose) -> SweepHit {
    hit.position = pose.transform_point(hit.position);
    hit.normal = pose.transform_vector(hit.normal);
    hit
}

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

// ---------------------------------------------------------------------------
// Convex-pair sweeps
// ---------------------------------------------------------------------------

fn sweep_convex_pair(
    dir: Vec3,
    distance: f32,
    geom_a: &Geometry,
    pose_a: &Pose,
    geom_b: &Geometry,
    pose_b: &Pose,
    tuning: &QueryTuning,
) -> Option<SweepHit> {
    match (geom_a, geom_b) {
        (Geometry::Sphere { radius: r0 }, Geometry::Sphere { radius: r1 }) => {
            sweep_sphere_sphere(pose_a.position, *r0, dir, distance, pose_b.position, *r1)
        }
        (Geometry::Box { half_extents: ha }, Geometry::Box { half_extents: hb }) => {
            sweep_box_box(pose_a, *ha, dir, distance, pose_b, *hb, tuning)
        }
        _ => {
            let a = SupportShape::from_geometry(geom_a, pose_a)?;
            let b = SupportShape::from_geometry(geom_b, pose_b)?;
            let hit = gjk::gjk_sweep(&a, dir, distance, &b, tuning)?;
            Some(SweepHit {
                distance: hit.distance,
                position: hit.position,
                normal: hit.normal,
                face_index: 0,
            })
        }
    }
}

/// Moving sphere against static sphere: a ray against the radius sum
fn sweep_sphere_sphere(
    center_a: Vec3,
    r0: f32,
    dir: Vec3,
    distance: f32,
    center_b: Vec3,
    r1: f32,
) -> Option<SweepHit> {
    let radius_sum = r0 + r1;
    let oc = center_a - center_b;
    let c = oc.magnitude_squared() - radius_sum * radius_sum;
    if c <= 0.0 {
        return Some(SweepHit {
            distance: 0.0,
            position: center_b + (center_a - center_b) * (r1 / radius_sum.max(f32::EPSILON)),
            normal: -dir,
            face_index: 0,
        });
    }
    let b = oc.dot(&dir);
    if b >= 0.0 {
        return None; // Moving apart
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    if t < 0.0 || t > distance {
        return None;
    }
    let hit_center = center_a + dir * t;
    let normal = (hit_center - center_b).normalize();
    Some(SweepHit {
        distance: t,
        position: center_b + normal * r1,
        normal,
        face_index: 0,
    })
}

/// Closed-form sweep of any convex shape against a half-space
fn sweep_vs_plane(
    dir: Vec3,
    distance: f32,
    geom_a: &Geometry,
    pose_a: &Pose,
    plane_pose: &Pose,
) -> Option<SweepHit> {
    let normal = plane_pose.transform_vector(Vec3::y());
    let shape = SupportShape::from_geometry(geom_a, pose_a)
        .expect("swept geometry is convex");
    // Deepest point toward the plane decides both contact and timing
    let support = shape.support(-normal) - normal * shape.margin();
    let s = normal.dot(&(support - plane_pose.position));
    if s <= 0.0 {
        return Some(SweepHit {
            distance: 0.0,
            position: support,
            normal: -dir,
            face_index: 0,
        });
    }
    let denom = normal.dot(&dir);
    if denom >= 0.0 {
        return None; // Moving along or away from the surface
    }
    let t = s / -denom;
    if t > distance {
        return None;
    }
    Some(SweepHit {
        distance: t,
        position: support + dir * t,
        normal,
        face_index: 0,
    })
}

// ---------------------------------------------------------------------------
// Per-triangle narrow phase
// ---------------------------------------------------------------------------

/// A convex shape prepared for repeated per-triangle sweep tests, in the
/// same frame as the triangles
enum TriangleSweeper<'a> {
    Sphere {
        center: Vec3,
        radius: f32,
        dir: Vec3,
        max_t: f32,
    },
    Capsule {
        a: Vec3,
        b: Vec3,
        radius: f32,
        dir: Vec3,
        max_t: f32,
    },
    Box {
        pose: Pose,
        half_extents: Vec3,
        dir: Vec3,
        max_t: f32,
    },
    Hull {
        shape: SupportShape<'a>,
        dir: Vec3,
        max_t: f32,
        tuning: &'a QueryTuning,
    },
}

impl<'a> TriangleSweeper<'a> {
    fn new(
        geom: &'a Geometry,
        pose: &Pose,
        dir: Vec3,
        max_t: f32,
        tuning: &'a QueryTuning,
    ) -> Self {
        match geom {
            Geometry::Sphere { radius } => Self::Sphere {
                center: pose.position,
                radius: *radius,
                dir,
                max_t,
            },
            Geometry::Capsule {
                half_height,
                radius,
            } => {
                let axis = pose.transform_vector(Vec3::new(0.0, *half_height, 0.0));
                Self::Capsule {
                    a: pose.position - axis,
                    b: pose.position + axis,
                    radius: *radius,
                    dir,
                    max_t,
                }
            }
            Geometry::Box { half_extents } => Self::Box {
                pose: *pose,
                half_extents: *half_extents,
                dir,
                max_t,
            },
            Geometry::ConvexHull { .. } => Self::Hull {
                shape: SupportShape::from_geometry(geom, pose)
                    .expect("hulls have support mappings"),
                dir,
                max_t,
                tuning,
            },
            _ => unreachable!("swept geometry kind was validated"),
        }
    }

    fn test(&self, tri: &Triangle) -> Option<SweepHit> {
        match self {
            Self::Sphere {
                center,
                radius,
                dir,
                max_t,
            } => sweep_sphere_triangle(*center, *radius, *dir, *max_t, tri),
            Self::Capsule {
                a,
                b,
                radius,
                dir,
                max_t,
            } => sweep_capsule_triangle(*a, *b, *radius, *dir, *max_t, tri),
            Self::Box {
                pose,
                half_extents,
                dir,
                max_t,
            } => sweep_box_triangle(pose, *half_extents, *dir, *max_t, tri),
            Self::Hull {
                shape,
                dir,
                max_t,
                tuning,
            } => {
                if backface_cull(tri, *dir) {
                    return None;
                }
                let hit = gjk::gjk_sweep(shape, *dir, *max_t, &SupportShape::from_triangle(tri), tuning)?;
                Some(SweepHit {
                    distance: hit.distance,
                    position: hit.position,
                    normal: hit.normal,
                    face_index: 0,
                })
            }
        }
    }
}

/// One-sided triangles facing away from the approach are skipped
fn backface_cull(tri: &Triangle, dir: Vec3) -> bool {
    !tri.double_sided() && tri.normal().dot(&dir) >= 0.0
}

/// Swept sphere against one triangle: classify the closest feature and
/// solve a ray problem against it.
fn sweep_sphere_triangle(
    center: Vec3,
    radius: f32,
    dir: Vec3,
    max_t: f32,
    tri: &Triangle,
) -> Option<SweepHit> {
    if backface_cull(tri, dir) {
        return None;
    }
    let mut normal = tri.normal();
    if normal.magnitude_squared() < 0.5 {
        return None; // Zero-area triangle contributes no surface
    }
    // Work on the side of the plane the sphere starts on
    let mut plane_dist = normal.dot(&(center - tri.v0));
    if plane_dist < 0.0 {
        normal = -normal;
        plane_dist = -plane_dist;
    }

    // Already touching
    if distance::point_triangle_distance_sq(center, tri) <= radius * radius {
        return Some(SweepHit {
            distance: 0.0,
            position: tri.closest_point(center),
            normal: -dir,
            face_index: 0,
        });
    }

    let mut best: Option<SweepHit> = None;

    // Face contact: the plane shifted out by the radius
    let denom = normal.dot(&dir);
    if denom < 0.0 {
        let t = (plane_dist - radius) / -denom;
        if t >= 0.0 && t <= max_t {
            let contact = center + dir * t - normal * radius;
            if (tri.closest_point(contact) - contact).magnitude_squared() < 1.0e-8 {
                best = Some(SweepHit {
                    distance: t,
                    position: contact,
                    normal,
                    face_index: 0,
                });
            }
        }
    }

    // Edge contacts: the ray against a cylinder around each active edge
    if best.is_none() {
        for (index, (ea, eb)) in tri.edges().into_iter().enumerate() {
            if !tri.edge_active(index) {
                continue;
            }
            if let Some((t, contact)) = ray_vs_edge_cylinder(center, dir, ea, eb, radius) {
                if t <= max_t && best.as_ref().map_or(true, |b| t < b.distance) {
                    let at_impact = center + dir * t;
                    best = Some(SweepHit {
                        distance: t,
                        position: contact,
                        normal: (at_impact - contact) / radius,
                        face_index: 0,
                    });
                }
            }
        }

        // Vertex contacts, for corners with at least one active edge
        let vertex_active = [
            tri.edge_active(0) || tri.edge_active(2),
            tri.edge_active(0) || tri.edge_active(1),
            tri.edge_active(1) || tri.edge_active(2),
        ];
        for (vertex, active) in [tri.v0, tri.v1, tri.v2].into_iter().zip(vertex_active) {
            if !active {
                continue;
            }
            if let Some(t) = ray_vs_vertex_sphere(center, dir, vertex, radius) {
                if t <= max_t && best.as_ref().map_or(true, |b| t < b.distance) {
                    let at_impact = center + dir * t;
                    best = Some(SweepHit {
                        distance: t,
                        position: vertex,
                        normal: (at_impact - vertex) / radius,
                        face_index: 0,
                    });
                }
            }
        }
    }

    best
}

/// First positive time the moving point `center + t dir` is at `radius`
/// from segment `ab`, with the contact point on the segment
fn ray_vs_edge_cylinder(
    origin: Vec3,
    dir: Vec3,
    a: Vec3,
    b: Vec3,
    radius: f32,
) -> Option<(f32, Vec3)> {
    let axis = b - a;
    let axis_len_sq = axis.magnitude_squared();
    if axis_len_sq < f32::EPSILON {
        return ray_vs_vertex_sphere(origin, dir, a, radius).map(|t| (t, a));
    }
    let axis_len = axis_len_sq.sqrt();
    let axis_dir = axis / axis_len;

    let m = origin - a;
    let m_perp = m - axis_dir * m.dot(&axis_dir);
    let d_perp = dir - axis_dir * dir.dot(&axis_dir);

    let a2 = d_perp.magnitude_squared();
    if a2 < 1.0e-10 {
        return None; // Motion parallel to the edge; caps handle the rest
    }
    let b2 = m_perp.dot(&d_perp);
    let c2 = m_perp.magnitude_squared() - radius * radius;
    if c2 < 0.0 {
        return None; // Starts inside the infinite cylinder
    }
    let discriminant = b2 * b2 - a2 * c2;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b2 - discriminant.sqrt()) / a2;
    if t < 0.0 {
        return None;
    }
    let along = (m + dir * t).dot(&axis_dir);
    if !(0.0..=axis_len).contains(&along) {
        return None; // Contact past the segment ends
    }
    Some((t, a + axis_dir * along))
}

/// First positive time the moving point reaches `radius` from `vertex`
fn ray_vs_vertex_sphere(origin: Vec3, dir: Vec3, vertex: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - vertex;
    let c = oc.magnitude_squared() - radius * radius;
    if c < 0.0 {
        return None; // Starts inside
    }
    let b = oc.dot(&dir);
    if b >= 0.0 {
        return None;
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    if t >= 0.0 {
        Some(t)
    } else {
        None
    }
}

/// Swept capsule against one triangle, reduced to moving spheres at the
/// capsule's effective center and its endpoints.
///
/// The effective center is the core point closest to the triangle plane;
/// a degenerate capsule (`a == b`) makes all three candidates identical
/// and reproduces the sphere sweep exactly.
fn sweep_capsule_triangle(
    a: Vec3,
    b: Vec3,
    radius: f32,
    dir: Vec3,
    max_t: f32,
    tri: &Triangle,
) -> Option<SweepHit> {
    if backface_cull(tri, dir) {
        return None;
    }
    // Touching already: the whole core segment decides, not just a sample
    if distance::segment_triangle_distance_sq(a, b, tri) <= radius * radius {
        let (core, _) = distance::closest_point_on_segment(tri.centroid(), a, b);
        return Some(SweepHit {
            distance: 0.0,
            position: tri.closest_point(core),
            normal: -dir,
            face_index: 0,
        });
    }

    let normal = tri.normal();
    let da = normal.dot(&(a - tri.v0)).abs();
    let db = normal.dot(&(b - tri.v0)).abs();
    let effective = if (da - db).abs() <= 1.0e-6 {
        (a + b) * 0.5
    } else if da < db {
        a
    } else {
        b
    };

    let mut best: Option<SweepHit> = None;
    for center in [effective, a, b] {
        if let Some(hit) = sweep_sphere_triangle(center, radius, dir, max_t, tri) {
            if best.as_ref().map_or(true, |b| hit.distance < b.distance) {
                best = Some(hit);
            }
        }
    }
    best
}

/// Swept box against one triangle: 13-axis separating-axis interval sweep
/// in box-local space.
///
/// For every candidate axis the triangle's projected interval slides with
/// the relative motion; the collision time is the largest entry time
/// provided it does not exceed the smallest exit time.
fn sweep_box_triangle(
    pose: &Pose,
    half: Vec3,
    dir: Vec3,
    max_t: f32,
    tri: &Triangle,
) -> Option<SweepHit> {
    if backface_cull(tri, dir) {
        return None;
    }
    let v = [
        pose.inverse_transform_point(tri.v0),
        pose.inverse_transform_point(tri.v1),
        pose.inverse_transform_point(tri.v2),
    ];
    let d = pose.inverse_transform_vector(dir);
    let edges = [v[1] - v[0], v[2] - v[1], v[0] - v[2]];

    let mut t_first = f32::MIN;
    let mut t_last = f32::MAX;
    let mut hit_axis = Vec3::zeros();

    let mut feed = |axis: Vec3| -> bool {
        let len_sq = axis.magnitude_squared();
        if len_sq < 1.0e-12 {
            return true; // Degenerate axis carries no information
        }
        let axis = axis / len_sq.sqrt();
        let r = half.x * axis.x.abs() + half.y * axis.y.abs() + half.z * axis.z.abs();
        let p0 = axis.dot(&v[0]);
        let p1 = axis.dot(&v[1]);
        let p2 = axis.dot(&v[2]);
        let tri_min = p0.min(p1).min(p2);
        let tri_max = p0.max(p1).max(p2);
        // In box space the triangle moves against the sweep
        let speed = -d.dot(&axis);
        if speed.abs() < 1.0e-9 {
            return tri_min <= r && tri_max >= -r; // Static on this axis
        }
        let t0 = (-r - tri_max) / speed;
        let t1 = (r - tri_min) / speed;
        let (enter, exit) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        if enter > t_first {
            t_first = enter;
            // Normal points from the triangle toward the box
            hit_axis = axis * speed.signum();
        }
        t_last = t_last.min(exit);
        t_first <= t_last
    };

    // 3 box face axes, the triangle normal, 9 edge-cross axes
    for axis in [Vec3::x(), Vec3::y(), Vec3::z()] {
        if !feed(axis) {
            return None;
        }
    }
    if !feed(edges[0].cross(&(v[2] - v[0]))) {
        return None;
    }
    for unit in [Vec3::x(), Vec3::y(), Vec3::z()] {
        for edge in &edges {
            if !feed(unit.cross(edge)) {
                return None;
            }
        }
    }

    if t_last < 0.0 || t_first > max_t {
        return None;
    }
    if t_first <= 0.0 {
        // Overlapping before any motion
        let contact = tri.closest_point(pose.inverse_transform_point(pose.position));
        return Some(SweepHit {
            distance: 0.0,
            position: pose.transform_point(contact),
            normal: -dir,
            face_index: 0,
        });
    }

    // Contact at the winning time: the triangle point nearest the box
    // center, with the winning axis as the normal
    let center_at_impact = pose.position + dir * t_first;
    Some(SweepHit {
        distance: t_first,
        position: tri.closest_point(center_at_impact),
        normal: pose.transform_vector(hit_axis),
        face_index: 0,
    })
}

// ---------------------------------------------------------------------------
// Box vs box
// ---------------------------------------------------------------------------

fn obb_corners(pose: &Pose, half: Vec3) -> [Vec3; 8] {
    let mut corners = [Vec3::zeros(); 8];
    let mut i = 0;
    for sx in [-1.0f32, 1.0] {
        for sy in [-1.0f32, 1.0] {
            for sz in [-1.0f32, 1.0] {
                corners[i] =
                    pose.transform_point(Vec3::new(half.x * sx, half.y * sy, half.z * sz));
                i += 1;
            }
        }
    }
    corners
}

fn obb_edges(pose: &Pose, half: Vec3) -> Vec<(Vec3, Vec3)> {
    let mut edges = Vec::with_capacity(12);
    for axis in 0..3 {
        let (u, w) = ((axis + 1) % 3, (axis + 2) % 3);
        for su in [-1.0f32, 1.0] {
            for sw in [-1.0f32, 1.0] {
                let mut lo = Vec3::zeros();
                lo[axis] = -half[axis];
                lo[u] = half[u] * su;
                lo[w] = half[w] * sw;
                let mut hi = lo;
                hi[axis] = half[axis];
                edges.push((pose.transform_point(lo), pose.transform_point(hi)));
            }
        }
    }
    edges
}

/// Slab raycast against an OBB, entry time and world entry normal only.
/// Rays starting inside report nothing (initial overlap is handled by the
/// caller's static test).
fn ray_vs_obb(origin: Vec3, dir: Vec3, pose: &Pose, half: Vec3) -> Option<(f32, Vec3)> {
    let o = pose.inverse_transform_point(origin);
    let d = pose.inverse_transform_vector(dir);
    let mut t_enter = f32::MIN;
    let mut t_exit = f32::MAX;
    let mut axis = 0usize;
    let mut sign = 1.0f32;
    for i in 0..3 {
        if d[i].abs() < 1.0e-9 {
            if o[i].abs() > half[i] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d[i];
        let mut t0 = (-half[i] - o[i]) * inv;
        let mut t1 = (half[i] - o[i]) * inv;
        let mut s = -1.0f32;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            s = 1.0;
        }
        if t0 > t_enter {
            t_enter = t0;
            axis = i;
            sign = s;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }
    if t_enter < 0.0 {
        return None;
    }
    let mut normal = Vec3::zeros();
    normal[axis] = sign;
    Some((t_enter, pose.transform_vector(normal)))
}

/// Box-vs-box sweep: minimum over vertex-vs-face raycasts both ways and
/// edge-vs-edge closest approach with a small fattening tolerance.
fn sweep_box_box(
    pose_a: &Pose,
    half_a: Vec3,
    dir: Vec3,
    max_dist: f32,
    pose_b: &Pose,
    half_b: Vec3,
    tuning: &QueryTuning,
) -> Option<SweepHit> {
    if distance::obb_obb_sat(pose_a, half_a, pose_b, half_b) {
        return Some(SweepHit {
            distance: 0.0,
            position: distance::closest_point_on_obb(pose_a.position, pose_b, half_b),
            normal: -dir,
            face_index: 0,
        });
    }

    let mut best: Option<SweepHit> = None;
    let mut consider = |t: f32, position: Vec3, normal: Vec3| {
        if t >= 0.0 && t <= max_dist && best.as_ref().map_or(true, |b| t < b.distance) {
            best = Some(SweepHit {
                distance: t,
                position,
                normal,
                face_index: 0,
            });
        }
    };

    // Vertices of A against B's faces
    for corner in obb_corners(pose_a, half_a) {
        if let Some((t, normal)) = ray_vs_obb(corner, dir, pose_b, half_b) {
            consider(t, corner + dir * t, normal);
        }
    }
    // Vertices of B against A's faces, swept backwards
    for corner in obb_corners(pose_b, half_b) {
        if let Some((t, enter_normal)) = ray_vs_obb(corner, -dir, pose_a, half_a) {
            consider(t, corner, -enter_normal);
        }
    }
    // Edge against edge at closest approach
    let edges_a = obb_edges(pose_a, half_a);
    let edges_b = obb_edges(pose_b, half_b);
    for (a0, a1) in &edges_a {
        let ea = a1 - a0;
        for (b0, b1) in &edges_b {
            let eb = b1 - b0;
            let axis = ea.cross(&eb);
            let len_sq = axis.magnitude_squared();
            if len_sq < 1.0e-12 {
                continue;
            }
            let axis = axis / len_sq.sqrt();
            let closing = axis.dot(&dir);
            if closing.abs() < 1.0e-9 {
                continue;
            }
            let t = axis.dot(&(b0 - a0)) / closing;
            if t < 0.0 || t > max_dist {
                continue;
            }
            // Verify the edges really meet there, within the fattening
            let a0_t = a0 + dir * t;
            let a1_t = a1 + dir * t;
            let (pa, pb, _, _) = distance::segment_segment_closest(a0_t, a1_t, *b0, *b1);
            if (pa - pb).magnitude_squared() <= tuning.edge_fattening * tuning.edge_fattening {
                let normal = if closing > 0.0 { -axis } else { axis };
                consider(t, pb, normal);
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use crate::geometry::{ConvexHullData, HeightFieldData, TriangleMeshData};
    use approx::assert_relative_eq;

    fn at(x: f32, y: f32, z: f32) -> Pose {
        Pose::from_position(Vec3::new(x, y, z))
    }

    fn unit_scale() -> Vec3 {
        Vec3::new(1.0, 1.0, 1.0)
    }

    #[test]
    fn test_sweep_preconditions() {
        let sphere = Geometry::sphere(1.0).unwrap();
        let target = Geometry::sphere(1.0).unwrap();
        // Zero distance
        assert!(sweep(
            Vec3::x(),
            0.0,
            &sphere,
            &at(-5.0, 0.0, 0.0),
            &target,
            &Pose::identity(),
            SweepFlags::empty()
        )
        .is_none());
        // Non-unit direction
        assert!(sweep(
            Vec3::new(2.0, 0.0, 0.0),
            10.0,
            &sphere,
            &at(-5.0, 0.0, 0.0),
            &target,
            &Pose::identity(),
            SweepFlags::empty()
        )
        .is_none());
    }

    #[test]
    fn test_sphere_sphere_sweep() {
        let a = Geometry::sphere(1.0).unwrap();
        let b = Geometry::sphere(1.0).unwrap();
        let hit = sweep(
            Vec3::x(),
            10.0,
            &a,
            &at(-5.0, 0.0, 0.0),
            &b,
            &Pose::identity(),
            SweepFlags::empty(),
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-4);
        assert_relative_eq!(hit.position.x, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_initial_overlap_flag() {
        let a = Geometry::sphere(1.0).unwrap();
        let b = Geometry::sphere(1.0).unwrap();
        let hit = sweep(
            Vec3::x(),
            10.0,
            &a,
            &at(0.5, 0.0, 0.0),
            &b,
            &Pose::identity(),
            SweepFlags::CHECK_INITIAL_OVERLAP,
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 0.0);
        assert_relative_eq!((hit.normal + Vec3::x()).magnitude(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sweep_vs_plane() {
        let cuboid = Geometry::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let plane = Geometry::plane();
        let hit = sweep(
            -Vec3::y(),
            100.0,
            &cuboid,
            &at(0.0, 5.0, 0.0),
            &plane,
            &Pose::identity(),
            SweepFlags::empty(),
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal.y, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_sphere_vs_triangle_face() {
        let tri = Triangle::new(
            Vec3::new(-2.0, 0.0, -2.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, -2.0),
        );
        let sphere = Geometry::sphere(0.5).unwrap();
        let hit = sweep_vs_triangle_batch(
            -Vec3::y(),
            10.0,
            &sphere,
            &at(0.5, 4.0, -0.5),
            &[tri],
            None,
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 3.5, epsilon = 1e-4);
        assert_relative_eq!(hit.normal.y, 1.0, epsilon = 1e-4);
        assert_relative_eq!(hit.position.y, 0.0, epsilon = 1e-4);
        assert_eq!(hit.face_index, 0);
    }

    #[test]
    fn test_sphere_vs_triangle_edge_and_vertex() {
        let tri = Triangle::new(
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        let sphere = Geometry::sphere(0.5).unwrap();
        // Dropping beyond the x=0 edge: contact on the edge, not the face
        let hit = sweep_vs_triangle_batch(
            -Vec3::y(),
            10.0,
            &sphere,
            &at(0.3, 4.0, 0.0),
            &[tri],
            None,
        )
        .unwrap();
        assert!(hit.distance > 3.5 && hit.distance < 4.0);
        assert_relative_eq!(hit.position.x, 0.0, epsilon = 1e-4);

        // Dropping past the (0,0,1) corner: vertex contact
        let hit = sweep_vs_triangle_batch(
            -Vec3::y(),
            10.0,
            &sphere,
            &at(0.2, 4.0, 1.2),
            &[tri],
            None,
        )
        .unwrap();
        assert_relative_eq!(hit.position.x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(hit.position.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_capsule_degenerate_matches_sphere() {
        let cuboid = Geometry::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let capsule = Geometry::capsule(0.0, 0.5).unwrap();
        let sphere = Geometry::sphere(0.5).unwrap();
        let pose = at(-5.0, 0.3, 0.2);
        let hit_capsule = sweep(
            Vec3::x(),
            10.0,
            &capsule,
            &pose,
            &cuboid,
            &Pose::identity(),
            SweepFlags::empty(),
        )
        .unwrap();
        let hit_sphere = sweep(
            Vec3::x(),
            10.0,
            &sphere,
            &pose,
            &cuboid,
            &Pose::identity(),
            SweepFlags::empty(),
        )
        .unwrap();
        assert_relative_eq!(hit_capsule.distance, hit_sphere.distance, epsilon = 1e-3);
    }

    #[test]
    fn test_capsule_degenerate_matches_sphere_on_triangles() {
        let tri = Triangle::new(
            Vec3::new(-2.0, 0.0, -2.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, -2.0),
        );
        let capsule = Geometry::capsule(0.0, 0.4).unwrap();
        let sphere = Geometry::sphere(0.4).unwrap();
        let pose = at(0.3, 3.0, -0.6);
        let hit_capsule =
            sweep_vs_triangle_batch(-Vec3::y(), 10.0, &capsule, &pose, &[tri], None).unwrap();
        let hit_sphere =
            sweep_vs_triangle_batch(-Vec3::y(), 10.0, &sphere, &pose, &[tri], None).unwrap();
        assert_relative_eq!(hit_capsule.distance, hit_sphere.distance, epsilon = 1e-5);
        assert_relative_eq!(
            (hit_capsule.position - hit_sphere.position).magnitude(),
            0.0,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_box_sweep_vs_triangle() {
        let tri = Triangle::new(
            Vec3::new(-2.0, 0.0, -2.0),
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(2.0, 0.0, -2.0),
        );
        let cuboid = Geometry::cuboid(Vec3::new(0.5, 0.5, 0.5)).unwrap();
        let hit = sweep_vs_triangle_batch(
            -Vec3::y(),
            10.0,
            &cuboid,
            &at(0.5, 4.0, -0.5),
            &[tri],
            None,
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 3.5, epsilon = 1e-3);
        assert_relative_eq!(hit.normal.y, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_box_sweep_vs_box() {
        let a = Geometry::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let b = Geometry::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let hit = sweep(
            Vec3::x(),
            20.0,
            &a,
            &at(-6.0, 0.0, 0.0),
            &b,
            &Pose::identity(),
            SweepFlags::empty(),
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-3);
        assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_box_sweep_vs_rotated_box_edge_contact() {
        let a = Geometry::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let b = Geometry::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        // B rotated 45 degrees about Y presents an edge toward A
        let pose_b = Pose::new(
            Vec3::new(5.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_4),
        );
        let hit = sweep(
            Vec3::x(),
            20.0,
            &a,
            &at(-5.0, 0.0, 0.0),
            &b,
            &pose_b,
            SweepFlags::empty(),
        )
        .unwrap();
        // A's face meets B's vertical edge at x = 5 - sqrt(2)
        let expected = 5.0 - std::f32::consts::SQRT_2 - 1.0 - (-5.0);
        assert_relative_eq!(hit.distance, expected, epsilon = 1e-2);
    }

    #[test]
    fn test_convex_hull_sweep() {
        let hull = Geometry::convex_hull(
            ConvexHullData::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap(),
            unit_scale(),
        )
        .unwrap();
        let target = Geometry::sphere(1.0).unwrap();
        let hit = sweep(
            Vec3::x(),
            20.0,
            &hull,
            &at(-6.0, 0.0, 0.0),
            &target,
            &Pose::identity(),
            SweepFlags::empty(),
        )
        .unwrap();
        // Leading face starts at x = -5, the sphere surface at x = -1
        assert_relative_eq!(hit.distance, 4.0, epsilon = 1e-2);
    }

    #[test]
    fn test_sweep_vs_mesh_picks_first_triangle() {
        // Ground quad with a raised shelf above one half
        let data = TriangleMeshData::new(
            vec![
                Vec3::new(-4.0, 0.0, -4.0),
                Vec3::new(4.0, 0.0, -4.0),
                Vec3::new(4.0, 0.0, 4.0),
                Vec3::new(-4.0, 0.0, 4.0),
                Vec3::new(-4.0, 2.0, -4.0),
                Vec3::new(0.0, 2.0, -4.0),
                Vec3::new(0.0, 2.0, 4.0),
                Vec3::new(-4.0, 2.0, 4.0),
            ],
            vec![[0, 2, 1], [0, 3, 2], [4, 6, 5], [4, 7, 6]],
            false,
        )
        .unwrap();
        let mesh = Geometry::triangle_mesh(data, unit_scale()).unwrap();
        let sphere = Geometry::sphere(0.5).unwrap();
        // Over the shelf: hits the shelf first
        let hit = sweep(
            -Vec3::y(),
            20.0,
            &sphere,
            &at(-2.0, 6.0, 0.5),
            &mesh,
            &Pose::identity(),
            SweepFlags::empty(),
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 3.5, epsilon = 1e-3);
        assert_relative_eq!(hit.position.y, 2.0, epsilon = 1e-3);

        // Off the shelf: falls through to the ground
        let hit = sweep(
            -Vec3::y(),
            20.0,
            &sphere,
            &at(2.0, 6.0, 0.5),
            &mesh,
            &Pose::identity(),
            SweepFlags::empty(),
        )
        .unwrap();
        assert_relative_eq!(hit.distance, 5.5, epsilon = 1e-3);
    }

    #[test]
    fn test_sweep_vs_heightfield() {
        let data = HeightFieldData::new(5, 5, vec![0.0; 25]).unwrap();
        let hf = Geometry::height_field(data, 1.0, 1.0, 1.0).unwrap();
        let capsule = Geometry::capsule(0.5, 0.3).unwrap();
        let hit = sweep(
            -Vec3::y(),
            10.0,
            &capsule,
            &at(2.0, 4.0, 2.0),
            &hf,
            &Pose::identity(),
            SweepFlags::empty(),
        )
        .unwrap();
        // Capsule bottom starts at 4 - 0.5 - 0.3 = 3.2 above the surface
        assert_relative_eq!(hit.distance, 3.2, epsilon = 1e-3);
        assert_relative_eq!(hit.normal.y, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_batch_hint_short_circuits_at_zero() {
        let touching = Triangle::new(
            Vec3::new(-1.0, 0.4, -1.0),
            Vec3::new(1.0, 0.4, 1.0),
            Vec3::new(1.0, 0.4, -1.0),
        );
        let far = Triangle::new(
            Vec3::new(-1.0, -5.0, -1.0),
            Vec3::new(1.0, -5.0, 1.0),
            Vec3::new(1.0, -5.0, -1.0),
        );
        let sphere = Geometry::sphere(0.5).unwrap();
        let hit = sweep_vs_triangle_batch(
            -Vec3::y(),
            10.0,
            &sphere,
            &at(0.0, 0.5, 0.0),
            &[far, touching],
            Some(1),
        )
        .unwrap();
        assert_eq!(hit.face_index, 1);
        assert_relative_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_batch_reports_minimum_toi() {
        let near = Triangle::new(
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(1.0, 1.0, -1.0),
        );
        let far = Triangle::new(
            Vec3::new(-1.0, -2.0, -1.0),
            Vec3::new(1.0, -2.0, 1.0),
            Vec3::new(1.0, -2.0, -1.0),
        );
        let sphere = Geometry::sphere(0.25).unwrap();
        let hit = sweep_vs_triangle_batch(
            -Vec3::y(),
            20.0,
            &sphere,
            &at(0.0, 5.0, 0.0),
            &[far, near],
            None,
        )
        .unwrap();
        assert_eq!(hit.face_index, 1);
        assert_relative_eq!(hit.distance, 3.75, epsilon = 1e-4);
    }

    #[test]
    fn test_backface_culled_sweep_misses() {
        // One-sided triangle facing away from the approach
        let tri = Triangle::new(
            Vec3::new(-1.0, 0.0, -1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
        );
        let sphere = Geometry::sphere(0.5).unwrap();
        assert!(sweep_vs_triangle_batch(
            Vec3::y(),
            10.0,
            &sphere,
            &at(0.0, -4.0, 0.0),
            &[tri],
            None
        )
        .is_none());
    }
}
