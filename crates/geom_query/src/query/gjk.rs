//! Convex narrow phase: support mappings and GJK
//!
//! Any shape expressible as a support function (sphere, capsule, box,
//! convex hull, single triangle) can be tested against any other through
//! the iterative separating-axis refinement implemented here: minimum
//! distance with witness points, boolean overlap with a caller-persisted
//! coherence hint, and a linear sweep by conservative advancement.
//!
//! Spheres and capsules enter the solver as their point/segment cores
//! plus a radius margin, which keeps the simplex well conditioned and
//! makes the capsule-degenerates-to-sphere case exact.

use crate::config::QueryTuning;
use crate::foundation::math::{Pose, Vec3};
use crate::geometry::{ConvexHullData, Geometry, Triangle};

/// Squared length below which a simplex point counts as the origin
const ORIGIN_EPSILON: f32 = 1.0e-12;

/// A world-posed convex shape viewed through its support mapping
#[derive(Clone)]
pub enum SupportShape<'a> {
    /// Sphere core: a point with a radius margin
    Point {
        /// Sphere center
        center: Vec3,
        /// Margin radius
        radius: f32,
    },
    /// Capsule core: a segment with a radius margin
    Segment {
        /// First core endpoint
        a: Vec3,
        /// Second core endpoint
        b: Vec3,
        /// Margin radius
        radius: f32,
    },
    /// Oriented box
    Obb {
        /// World pose
        pose: Pose,
        /// Box half extents
        half_extents: Vec3,
    },
    /// Convex hull with nonuniform scale
    Hull {
        /// Cooked hull data
        data: &'a ConvexHullData,
        /// World pose
        pose: Pose,
        /// Vertex scale
        scale: Vec3,
    },
    /// A single world-space triangle
    Triangle {
        /// First vertex
        v0: Vec3,
        /// Second vertex
        v1: Vec3,
        /// Third vertex
        v2: Vec3,
    },
}

impl<'a> SupportShape<'a> {
    /// View a geometry through its support mapping, if it has one
    pub fn from_geometry(geom: &'a Geometry, pose: &Pose) -> Option<Self> {
        match geom {
            Geometry::Sphere { radius } => Some(Self::Point {
                center: pose.position,
                radius: *radius,
            }),
            Geometry::Capsule {
                half_height,
                radius,
            } => {
                let axis = pose.transform_vector(Vec3::new(0.0, *half_height, 0.0));
                Some(Self::Segment {
                    a: pose.position - axis,
                    b: pose.position + axis,
                    radius: *radius,
                })
            }
            Geometry::Box { half_extents } => Some(Self::Obb {
                pose: *pose,
                half_extents: *half_extents,
            }),
            Geometry::ConvexHull { data, scale } => Some(Self::Hull {
                data,
                pose: *pose,
                scale: *scale,
            }),
            Geometry::Plane | Geometry::TriangleMesh { .. } | Geometry::HeightField { .. } => None,
        }
    }

    /// View a world-space triangle through its support mapping
    pub fn from_triangle(tri: &Triangle) -> Self {
        Self::Triangle {
            v0: tri.v0,
            v1: tri.v1,
            v2: tri.v2,
        }
    }

    /// Farthest core point along `dir` (world space, margin excluded)
    pub fn support(&self, dir: Vec3) -> Vec3 {
        match self {
            Self::Point { center, .. } => *center,
            Self::Segment { a, b, .. } => {
                if (b - a).dot(&dir) >= 0.0 {
                    *b
                } else {
                    *a
                }
            }
            Self::Obb { pose, half_extents } => {
                let local = pose.inverse_transform_vector(dir);
                let corner = Vec3::new(
                    half_extents.x.copysign(local.x),
                    half_extents.y.copysign(local.y),
                    half_extents.z.copysign(local.z),
                );
                pose.transform_point(corner)
            }
            Self::Hull { data, pose, scale } => {
                let local = pose.inverse_transform_vector(dir);
                pose.transform_point(data.support_local(local, *scale))
            }
            Self::Triangle { v0, v1, v2 } => {
                let d0 = v0.dot(&dir);
                let d1 = v1.dot(&dir);
                let d2 = v2.dot(&dir);
                if d0 >= d1 && d0 >= d2 {
                    *v0
                } else if d1 >= d2 {
                    *v1
                } else {
                    *v2
                }
            }
        }
    }

    /// Margin radius inflating the core
    pub fn margin(&self) -> f32 {
        match self {
            Self::Point { radius, .. } | Self::Segment { radius, .. } => *radius,
            _ => 0.0,
        }
    }

    /// A deterministic interior point, used to seed search directions
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Point { center, .. } => *center,
            Self::Segment { a, b, .. } => (a + b) * 0.5,
            Self::Obb { pose, .. } | Self::Hull { pose, .. } => pose.position,
            Self::Triangle { v0, v1, v2 } => (v0 + v1 + v2) / 3.0,
        }
    }

    /// Copy of this shape translated by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        let mut out = self.clone();
        match &mut out {
            Self::Point { center, .. } => *center += offset,
            Self::Segment { a, b, .. } => {
                *a += offset;
                *b += offset;
            }
            Self::Obb { pose, .. } | Self::Hull { pose, .. } => pose.position += offset,
            Self::Triangle { v0, v1, v2 } => {
                *v0 += offset;
                *v1 += offset;
                *v2 += offset;
            }
        }
        out
    }
}

/// Coherence state carried by an [`OverlapHint`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HintState {
    /// The pair was separated when the hint was written
    #[default]
    Disjoint,
    /// The pair was overlapping when the hint was written
    Overlapping,
}

/// Caller-persisted coherence cache for convex overlap queries.
///
/// Read at call start (the stored axis seeds the solver), conditionally
/// overwritten at call end. Content is only meaningful for the same shape
/// pair across time steps; a stale hint costs iterations, never
/// correctness. Must not be shared by two concurrent queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapHint {
    /// Last known separating axis (or closing direction), from A toward B
    pub axis: Vec3,
    /// Outcome of the query that wrote the hint
    pub state: HintState,
}

/// Result of a GJK distance query
#[derive(Debug, Clone, Copy)]
pub struct GjkOutput {
    /// Separation between the margined surfaces; `<= 0` means overlap
    pub distance: f32,
    /// Unit direction from A's witness toward B's (valid when the cores
    /// are separated)
    pub axis: Vec3,
    /// Witness point on A's margined surface
    pub point_a: Vec3,
    /// Witness point on B's margined surface
    pub point_b: Vec3,
    /// Solver iterations spent
    pub iterations: u32,
    /// The cores themselves intersect (deep overlap, no axis available)
    pub core_overlap: bool,
}

impl GjkOutput {
    /// Whether the margined shapes overlap
    pub fn overlapping(&self) -> bool {
        self.core_overlap || self.distance <= 0.0
    }
}

#[derive(Clone, Copy)]
struct SimplexVertex {
    /// Minkowski difference point: support_a(d) - support_b(-d)
    w: Vec3,
    /// The contributing support point on A
    sa: Vec3,
}

fn support_vertex(a: &SupportShape, b: &SupportShape, dir: Vec3) -> SimplexVertex {
    let sa = a.support(dir);
    let sb = b.support(-dir);
    SimplexVertex { w: sa - sb, sa }
}

/// Closest point to the origin on a segment, as (point, weight of `b`)
fn origin_on_segment(a: Vec3, b: Vec3) -> (Vec3, f32) {
    let ab = b - a;
    let len_sq = ab.magnitude_squared();
    if len_sq < ORIGIN_EPSILON {
        return (a, 0.0);
    }
    let t = (-a.dot(&ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Closest point to the origin on a triangle, with barycentric weights
fn origin_on_triangle(a: Vec3, b: Vec3, c: Vec3) -> (Vec3, [f32; 3]) {
    let ab = b - a;
    let ac = c - a;
    let ap = -a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return (a, [1.0, 0.0, 0.0]);
    }

    let bp = -b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return (b, [0.0, 1.0, 0.0]);
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return (a + ab * v, [1.0 - v, v, 0.0]);
    }

    let cp = -c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return (c, [0.0, 0.0, 1.0]);
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return (a + ac * w, [1.0 - w, 0.0, w]);
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return (b + (c - b) * w, [0.0, 1.0 - w, w]);
    }

    let total = va + vb + vc;
    if total.abs() < ORIGIN_EPSILON {
        // Degenerate (collinear) triangle: best of the three edges
        let (p_ab, t_ab) = origin_on_segment(a, b);
        let (p_bc, t_bc) = origin_on_segment(b, c);
        let (p_ca, t_ca) = origin_on_segment(c, a);
        let candidates = [
            (p_ab, [1.0 - t_ab, t_ab, 0.0]),
            (p_bc, [0.0, 1.0 - t_bc, t_bc]),
            (p_ca, [t_ca, 0.0, 1.0 - t_ca]),
        ];
        return candidates
            .into_iter()
            .min_by(|(p, _), (q, _)| {
                p.magnitude_squared()
                    .partial_cmp(&q.magnitude_squared())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or((a, [1.0, 0.0, 0.0]));
    }

    let denom = 1.0 / total;
    let v = vb * denom;
    let w = vc * denom;
    (a + ab * v + ac * w, [1.0 - v - w, v, w])
}

/// Reduce the simplex to the feature supporting the closest point to the
/// origin. Returns (closest point, contains_origin).
fn closest_and_reduce(simplex: &mut Vec<SimplexVertex>, weights: &mut Vec<f32>) -> (Vec3, bool) {
    const WEIGHT_EPSILON: f32 = 1.0e-6;
    match simplex.len() {
        1 => {
            weights.clear();
            weights.push(1.0);
            (simplex[0].w, simplex[0].w.magnitude_squared() <= ORIGIN_EPSILON)
        }
        2 => {
            let (point, t) = origin_on_segment(simplex[0].w, simplex[1].w);
            let kept: Vec<(SimplexVertex, f32)> = [(simplex[0], 1.0 - t), (simplex[1], t)]
                .into_iter()
                .filter(|(_, w)| *w > WEIGHT_EPSILON)
                .collect();
            replace(simplex, weights, kept);
            (point, point.magnitude_squared() <= ORIGIN_EPSILON)
        }
        3 => {
            let (point, bary) = origin_on_triangle(simplex[0].w, simplex[1].w, simplex[2].w);
            let kept: Vec<(SimplexVertex, f32)> = simplex
                .iter()
                .copied()
                .zip(bary)
                .filter(|(_, w)| *w > WEIGHT_EPSILON)
                .collect();
            replace(simplex, weights, kept);
            (point, point.magnitude_squared() <= ORIGIN_EPSILON)
        }
        _ => {
            // Tetrahedron: test the origin against each outward face plane
            let faces = [[0usize, 1, 2], [0, 2, 3], [0, 3, 1], [1, 3, 2]];
            let mut best: Option<(f32, Vec3, [usize; 3], [f32; 3])> = None;
            let mut outside_any = false;
            for face in faces {
                let [i, j, k] = face;
                let a = simplex[i].w;
                let b = simplex[j].w;
                let c = simplex[k].w;
                let opposite = simplex[(0..4).find(|n| !face.contains(n)).unwrap_or(0)].w;
                let mut n = (b - a).cross(&(c - a));
                if n.dot(&(opposite - a)) > 0.0 {
                    n = -n; // Orient outward, away from the opposite vertex
                }
                if n.magnitude_squared() < ORIGIN_EPSILON {
                    continue;
                }
                if n.dot(&-a) > 0.0 {
                    outside_any = true;
                    let (point, bary) = origin_on_triangle(a, b, c);
                    let dist_sq = point.magnitude_squared();
                    let better = best.map_or(true, |(d, _, _, _)| dist_sq < d);
                    if better {
                        best = Some((dist_sq, point, face, bary));
                    }
                }
            }

            if !outside_any {
                weights.clear();
                weights.extend_from_slice(&[0.25; 4]);
                return (Vec3::zeros(), true);
            }

            let (_, point, face, bary) = best.expect("an outside face was recorded");
            let kept: Vec<(SimplexVertex, f32)> = face
                .iter()
                .zip(bary)
                .filter(|(_, w)| *w > WEIGHT_EPSILON)
                .map(|(&i, w)| (simplex[i], w))
                .collect();
            replace(simplex, weights, kept);
            (point, point.magnitude_squared() <= ORIGIN_EPSILON)
        }
    }
}

fn replace(simplex: &mut Vec<SimplexVertex>, weights: &mut Vec<f32>, kept: Vec<(SimplexVertex, f32)>) {
    simplex.clear();
    weights.clear();
    if kept.is_empty() {
        return;
    }
    let total: f32 = kept.iter().map(|(_, w)| w).sum();
    for (vertex, weight) in kept {
        simplex.push(vertex);
        weights.push(weight / total);
    }
}

/// Minimum distance between two support-mapped shapes.
///
/// `seed` is an optional initial search direction (from a coherence
/// hint); a good seed lets a temporally coherent query converge in O(1)
/// iterations.
pub fn gjk_distance(
    a: &SupportShape,
    b: &SupportShape,
    seed: Option<Vec3>,
    tuning: &QueryTuning,
) -> GjkOutput {
    let margin_total = a.margin() + b.margin();

    let mut dir = seed.unwrap_or_else(|| b.center() - a.center());
    if dir.magnitude_squared() < ORIGIN_EPSILON {
        dir = Vec3::x();
    }

    let mut simplex = vec![support_vertex(a, b, dir)];
    let mut weights = vec![1.0f32];
    let mut iterations = 0u32;

    loop {
        iterations += 1;
        let (v, contains) = closest_and_reduce(&mut simplex, &mut weights);
        if contains {
            return GjkOutput {
                distance: -margin_total,
                axis: Vec3::zeros(),
                point_a: (a.center() + b.center()) * 0.5,
                point_b: (a.center() + b.center()) * 0.5,
                iterations,
                core_overlap: true,
            };
        }

        let v_len_sq = v.magnitude_squared();
        let new = support_vertex(a, b, -v);
        // No meaningful progress toward the origin: converged
        let progress = v_len_sq - v.dot(&new.w);
        if progress <= tuning.gjk_tolerance * v_len_sq || iterations >= tuning.gjk_max_iterations {
            return finish(v, &simplex, &weights, margin_total, a, b, iterations);
        }
        simplex.push(new);
    }
}

fn finish(
    v: Vec3,
    simplex: &[SimplexVertex],
    weights: &[f32],
    margin_total: f32,
    a: &SupportShape,
    b: &SupportShape,
    iterations: u32,
) -> GjkOutput {
    let core_dist = v.magnitude();
    if core_dist * core_dist <= ORIGIN_EPSILON {
        return GjkOutput {
            distance: -margin_total,
            axis: Vec3::zeros(),
            point_a: (a.center() + b.center()) * 0.5,
            point_b: (a.center() + b.center()) * 0.5,
            iterations,
            core_overlap: true,
        };
    }
    let axis = -v / core_dist; // v = pa - pb, so -v points from A toward B
    let mut pa = Vec3::zeros();
    for (vertex, weight) in simplex.iter().zip(weights) {
        pa += vertex.sa * *weight;
    }
    let pb = pa - v;
    GjkOutput {
        distance: core_dist - margin_total,
        axis,
        point_a: pa + axis * a.margin(),
        point_b: pb - axis * b.margin(),
        iterations,
        core_overlap: false,
    }
}

/// Boolean overlap with coherence-hint seeding and write-back
pub fn gjk_overlap(
    a: &SupportShape,
    b: &SupportShape,
    hint: Option<&mut OverlapHint>,
    tuning: &QueryTuning,
) -> bool {
    let seed = hint.as_ref().and_then(|h| {
        if h.axis.magnitude_squared() > ORIGIN_EPSILON {
            Some(h.axis)
        } else {
            None
        }
    });
    let out = gjk_distance(a, b, seed, tuning);
    let overlapping = out.overlapping();
    if let Some(hint) = hint {
        if !out.core_overlap {
            hint.axis = out.axis;
        }
        hint.state = if overlapping {
            HintState::Overlapping
        } else {
            HintState::Disjoint
        };
    }
    overlapping
}

/// A contact found by the linear sweep
#[derive(Debug, Clone, Copy)]
pub struct GjkSweepHit {
    /// Impact distance along the sweep direction, in `[0, max_dist]`
    pub distance: f32,
    /// Impact point on the target's surface
    pub position: Vec3,
    /// Contact normal on the target, opposing the sweep
    pub normal: Vec3,
}

/// Linear sweep of `a` along unit `dir` over `[0, max_dist]` against `b`,
/// by conservative advancement on the distance solver.
///
/// An overlap at the start reports distance 0 with normal `-dir`.
pub fn gjk_sweep(
    a: &SupportShape,
    dir: Vec3,
    max_dist: f32,
    b: &SupportShape,
    tuning: &QueryTuning,
) -> Option<GjkSweepHit> {
    let mut t = 0.0f32;
    let mut moved = a.clone();
    let mut seed = None;

    for _ in 0..tuning.sweep_max_iterations {
        let out = gjk_distance(&moved, b, seed, tuning);
        if out.overlapping() || out.distance <= tuning.contact_epsilon {
            if t <= 0.0 {
                // Touching or overlapping before any motion
                return Some(GjkSweepHit {
                    distance: 0.0,
                    position: if out.core_overlap {
                        out.point_a
                    } else {
                        out.point_b
                    },
                    normal: -dir,
                });
            }
            return Some(GjkSweepHit {
                distance: t,
                position: out.point_b,
                normal: -out.axis,
            });
        }
        seed = Some(out.axis);

        // Closing speed along the witness axis bounds safe advancement
        let closing = dir.dot(&out.axis);
        if closing <= tuning.parallel_epsilon {
            return None; // Not approaching
        }
        t += out.distance / closing;
        if t > max_dist {
            return None;
        }
        moved = a.translated(dir * t);
    }

    // Iteration cap: the gap is already below any meaningful resolution
    let out = gjk_distance(&moved, b, seed, tuning);
    Some(GjkSweepHit {
        distance: t,
        position: out.point_b,
        normal: if out.core_overlap { -dir } else { -out.axis },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sphere(center: Vec3, radius: f32) -> SupportShape<'static> {
        SupportShape::Point { center, radius }
    }

    fn obb(position: Vec3, half: Vec3) -> SupportShape<'static> {
        SupportShape::Obb {
            pose: Pose::from_position(position),
            half_extents: half,
        }
    }

    #[test]
    fn test_sphere_sphere_distance() {
        let tuning = QueryTuning::default();
        let a = sphere(Vec3::zeros(), 1.0);
        let b = sphere(Vec3::new(5.0, 0.0, 0.0), 1.0);
        let out = gjk_distance(&a, &b, None, &tuning);
        assert!(!out.overlapping());
        assert_relative_eq!(out.distance, 3.0, epsilon = 1e-4);
        assert_relative_eq!(out.axis.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(out.point_a.x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(out.point_b.x, 4.0, epsilon = 1e-3);
    }

    #[test]
    fn test_box_box_distance() {
        let tuning = QueryTuning::default();
        let a = obb(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = obb(Vec3::new(4.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let out = gjk_distance(&a, &b, None, &tuning);
        assert!(!out.overlapping());
        assert_relative_eq!(out.distance, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn test_overlapping_boxes() {
        let tuning = QueryTuning::default();
        let a = obb(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let b = obb(Vec3::new(1.5, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let out = gjk_distance(&a, &b, None, &tuning);
        assert!(out.overlapping());
    }

    #[test]
    fn test_capsule_degenerates_to_sphere() {
        let tuning = QueryTuning::default();
        let cap = SupportShape::Segment {
            a: Vec3::new(2.0, 1.0, 0.0),
            b: Vec3::new(2.0, 1.0, 0.0),
            radius: 0.5,
        };
        let sph = sphere(Vec3::new(2.0, 1.0, 0.0), 0.5);
        let target = obb(Vec3::new(-2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let d_cap = gjk_distance(&cap, &target, None, &tuning);
        let d_sph = gjk_distance(&sph, &target, None, &tuning);
        assert_relative_eq!(d_cap.distance, d_sph.distance, epsilon = 1e-5);
    }

    #[test]
    fn test_hint_seeding_is_monotonic() {
        let tuning = QueryTuning::default();
        let hull_data = ConvexHullData::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let a = SupportShape::Hull {
            data: &hull_data,
            pose: Pose::from_position(Vec3::new(0.0, 0.3, 0.0)),
            scale: Vec3::new(1.0, 1.0, 1.0),
        };
        let b = SupportShape::Hull {
            data: &hull_data,
            pose: Pose::from_position(Vec3::new(3.7, 1.1, 0.4)),
            scale: Vec3::new(1.0, 1.0, 1.0),
        };
        let cold = gjk_distance(&a, &b, None, &tuning);
        assert!(!cold.overlapping());
        let warm = gjk_distance(&a, &b, Some(cold.axis), &tuning);
        assert!(!warm.overlapping());
        assert_relative_eq!(warm.distance, cold.distance, epsilon = 1e-3);
        assert!(warm.iterations <= cold.iterations);
    }

    #[test]
    fn test_hint_state_write_back() {
        let tuning = QueryTuning::default();
        let a = sphere(Vec3::zeros(), 1.0);
        let b = sphere(Vec3::new(1.5, 0.0, 0.0), 1.0);
        let mut hint = OverlapHint::default();
        assert!(gjk_overlap(&a, &b, Some(&mut hint), &tuning));
        assert_eq!(hint.state, HintState::Overlapping);

        let far = sphere(Vec3::new(10.0, 0.0, 0.0), 1.0);
        assert!(!gjk_overlap(&a, &far, Some(&mut hint), &tuning));
        assert_eq!(hint.state, HintState::Disjoint);
        assert_relative_eq!(hint.axis.x, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_sweep_sphere_into_box() {
        let tuning = QueryTuning::default();
        let a = sphere(Vec3::new(-5.0, 0.0, 0.0), 1.0);
        let b = obb(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let hit = gjk_sweep(&a, Vec3::x(), 10.0, &b, &tuning).unwrap();
        // Surfaces meet after 3 units of travel
        assert_relative_eq!(hit.distance, 3.0, epsilon = 1e-2);
        assert_relative_eq!(hit.normal.x, -1.0, epsilon = 1e-2);
        assert_relative_eq!(hit.position.x, -1.0, epsilon = 1e-2);
    }

    #[test]
    fn test_sweep_miss_when_not_approaching() {
        let tuning = QueryTuning::default();
        let a = sphere(Vec3::new(-5.0, 0.0, 0.0), 1.0);
        let b = obb(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        assert!(gjk_sweep(&a, -Vec3::x(), 10.0, &b, &tuning).is_none());
        assert!(gjk_sweep(&a, Vec3::y(), 10.0, &b, &tuning).is_none());
    }

    #[test]
    fn test_sweep_initial_overlap_convention() {
        let tuning = QueryTuning::default();
        let a = sphere(Vec3::new(0.5, 0.0, 0.0), 1.0);
        let b = obb(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let hit = gjk_sweep(&a, Vec3::x(), 10.0, &b, &tuning).unwrap();
        assert_relative_eq!(hit.distance, 0.0);
        assert_relative_eq!((hit.normal + Vec3::x()).magnitude(), 0.0, epsilon = 1e-6);
    }
}
