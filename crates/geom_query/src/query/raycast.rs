//! Raycast subsystem
//!
//! Per-shape ray queries producing 0..N hits with selectable output
//! fields. Every shape kind has a dedicated closed-form or
//! candidate-index-driven implementation; the uniform policy for a ray
//! starting inside a solid shape is distance 0 with normal `-dir`.

use crate::config::QueryTuning;
use crate::foundation::math::{Pose, Vec3};
use crate::geometry::{Geometry, HeightFieldView, Triangle};
use bitflags::bitflags;
use log::warn;

bitflags! {
    /// Which [`RayHit`] fields a query computed (and which the caller
    /// asked for). Fields that fall out of a test as a byproduct may be
    /// populated even when not requested.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct HitFields: u8 {
        /// `distance` is valid
        const DISTANCE = 1 << 0;
        /// `position` is valid
        const POSITION = 1 << 1;
        /// `normal` is valid
        const NORMAL = 1 << 2;
        /// `u`/`v` are valid (mesh and height-field hits)
        const UV = 1 << 3;
        /// `face_index` is valid (mesh, height-field and hull hits)
        const FACE_INDEX = 1 << 4;

        /// The usual request: distance, position and normal
        const DEFAULT = Self::DISTANCE.bits() | Self::POSITION.bits() | Self::NORMAL.bits();
    }
}

/// One ray intersection
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    /// Distance along the ray to the impact
    pub distance: f32,
    /// Impact point in world space
    pub position: Vec3,
    /// Surface normal at the impact point
    pub normal: Vec3,
    /// Face (hull) or triangle (mesh/height-field) index
    pub face_index: u32,
    /// Barycentric u at the impact (mesh/height-field)
    pub u: f32,
    /// Barycentric v at the impact (mesh/height-field)
    pub v: f32,
    /// Which of the fields above are valid
    pub fields: HitFields,
}

impl Default for RayHit {
    fn default() -> Self {
        Self {
            distance: 0.0,
            position: Vec3::zeros(),
            normal: Vec3::zeros(),
            face_index: 0,
            u: 0.0,
            v: 0.0,
            fields: HitFields::empty(),
        }
    }
}

/// Cast a ray against a posed geometry.
///
/// `dir` must be unit length and `max_distance` positive; a violated
/// precondition returns 0 hits (asserting in validation builds). The hit
/// capacity is `hits.len()`; only mesh and height-field targets can
/// produce more than one hit. With `first_hit` the traversal stops at the
/// first accepted intersection, otherwise the closest hit is written to
/// `hits[0]`.
pub fn raycast(
    origin: Vec3,
    dir: Vec3,
    geom: &Geometry,
    pose: &Pose,
    max_distance: f32,
    wanted: HitFields,
    hits: &mut [RayHit],
    first_hit: bool,
) -> usize {
    raycast_with(
        origin,
        dir,
        geom,
        pose,
        max_distance,
        wanted,
        hits,
        first_hit,
        &QueryTuning::default(),
    )
}

/// [`raycast`] with explicit tuning
pub fn raycast_with(
    origin: Vec3,
    dir: Vec3,
    geom: &Geometry,
    pose: &Pose,
    max_distance: f32,
    wanted: HitFields,
    hits: &mut [RayHit],
    first_hit: bool,
    tuning: &QueryTuning,
) -> usize {
    if (dir.magnitude_squared() - 1.0).abs() >= tuning.unit_dir_epsilon {
        warn!(
            "raycast rejected: |dir|^2 = {} is not within {} of 1",
            dir.magnitude_squared(),
            tuning.unit_dir_epsilon
        );
        return 0;
    }
    if !(max_distance > 0.0) {
        warn!("raycast rejected: max_distance = {max_distance}");
        return 0;
    }
    if hits.is_empty() {
        return 0;
    }

    match geom {
        Geometry::Sphere { radius } => write_single(
            hits,
            sphere_raycast(origin, dir, pose.position, *radius, max_distance),
        ),
        Geometry::Plane => {
            write_single(hits, plane_raycast(origin, dir, pose, max_distance, tuning))
        }
        Geometry::Capsule {
            half_height,
            radius,
        } => write_single(
            hits,
            capsule_raycast(origin, dir, pose, *half_height, *radius, max_distance, tuning),
        ),
        Geometry::Box { half_extents } => write_single(
            hits,
            box_raycast(origin, dir, pose, *half_extents, max_distance),
        ),
        Geometry::ConvexHull { data, scale } => write_single(
            hits,
            convex_raycast(origin, dir, pose, data, *scale, max_distance, tuning),
        ),
        Geometry::TriangleMesh { data, scale } => {
            let local_origin = pose.inverse_transform_point(origin);
            let local_dir = pose.inverse_transform_vector(dir);
            let inv_scale = Vec3::new(1.0 / scale.x, 1.0 / scale.y, 1.0 / scale.z);
            let mut collector = HitCollector::new(hits, first_hit, wanted);
            data.index().for_each_along_ray(
                local_origin.component_mul(&inv_scale),
                local_dir.component_mul(&inv_scale),
                max_distance,
                &mut |id| {
                    let tri = data.triangle(id, *scale);
                    collector.test_triangle(&tri, id, local_origin, local_dir, max_distance)
                },
            );
            collector.finish(pose)
        }
        Geometry::HeightField {
            data,
            row_scale,
            column_scale,
            height_scale,
        } => {
            let view = HeightFieldView {
                data,
                row_scale: *row_scale,
                column_scale: *column_scale,
                height_scale: *height_scale,
            };
            let local_origin = pose.inverse_transform_point(origin);
            let local_dir = pose.inverse_transform_vector(dir);
            let segment = crate::geometry::Aabb::from_points(&[
                local_origin,
                local_origin + local_dir * max_distance,
            ]);
            let mut collector = HitCollector::new(hits, first_hit, wanted);
            view.for_each_in_bounds(&segment, &mut |id| {
                // Height-field surfaces are solid from both sides
                let mut tri = view.triangle(id);
                tri.flags |= crate::geometry::TriangleFlags::DOUBLE_SIDED;
                collector.test_triangle(&tri, id, local_origin, local_dir, max_distance)
            });
            collector.finish(pose)
        }
    }
}

fn write_single(hits: &mut [RayHit], hit: Option<RayHit>) -> usize {
    match hit {
        Some(mut hit) => {
            hit.fields |= HitFields::DISTANCE | HitFields::POSITION | HitFields::NORMAL;
            hits[0] = hit;
            1
        }
        None => 0,
    }
}

/// Accumulates mesh/height-field triangle hits in local space
struct HitCollector<'h> {
    hits: &'h mut [RayHit],
    count: usize,
    first_hit: bool,
    wanted: HitFields,
}

impl<'h> HitCollector<'h> {
    fn new(hits: &'h mut [RayHit], first_hit: bool, wanted: HitFields) -> Self {
        Self {
            hits,
            count: 0,
            first_hit,
            wanted,
        }
    }

    /// Test one candidate; returns whether traversal should continue
    fn test_triangle(
        &mut self,
        tri: &Triangle,
        id: u32,
        origin: Vec3,
        dir: Vec3,
        max_distance: f32,
    ) -> bool {
        let double_sided = tri.double_sided();
        let Some((t, u, v)) = tri.intersect_ray(origin, dir, !double_sided) else {
            return true;
        };
        if t > max_distance {
            return true;
        }
        let mut normal = tri.normal();
        if double_sided && normal.dot(&dir) > 0.0 {
            normal = -normal;
        }
        let hit = RayHit {
            distance: t,
            position: origin + dir * t,
            normal,
            face_index: id,
            u,
            v,
            fields: self.wanted | HitFields::all(),
        };
        if self.count < self.hits.len() {
            self.hits[self.count] = hit;
            self.count += 1;
        } else {
            // Buffer full: the farthest kept hit yields to a closer one
            let (worst, worst_t) = self.hits[..self.count]
                .iter()
                .map(|h| h.distance)
                .enumerate()
                .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
                .unwrap_or((0, f32::MAX));
            if t < worst_t {
                self.hits[worst] = hit;
            }
        }
        !self.first_hit
    }

    /// Transform collected hits to world space; closest lands in slot 0
    fn finish(self, pose: &Pose) -> usize {
        if self.count == 0 {
            return 0;
        }
        let closest = self.hits[..self.count]
            .iter()
            .map(|h| h.distance)
            .enumerate()
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map_or(0, |(i, _)| i);
        if closest != 0 {
            self.hits.swap(0, closest);
        }
        for hit in &mut self.hits[..self.count] {
            hit.position = pose.transform_point(hit.position);
            hit.normal = pose.transform_vector(hit.normal);
        }
        self.count
    }
}

fn sphere_raycast(
    origin: Vec3,
    dir: Vec3,
    center: Vec3,
    radius: f32,
    max_distance: f32,
) -> Option<RayHit> {
    let oc = origin - center;
    let c = oc.magnitude_squared() - radius * radius;
    if c <= 0.0 {
        // Origin inside the sphere
        return Some(inside_hit(origin, dir));
    }
    let b = oc.dot(&dir);
    if b > 0.0 {
        return None; // Pointing away
    }
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    if t < 0.0 || t > max_distance {
        return None;
    }
    let position = origin + dir * t;
    Some(RayHit {
        distance: t,
        position,
        normal: (position - center) / radius,
        ..RayHit::default()
    })
}

fn plane_raycast(
    origin: Vec3,
    dir: Vec3,
    pose: &Pose,
    max_distance: f32,
    tuning: &QueryTuning,
) -> Option<RayHit> {
    let normal = pose.transform_vector(Vec3::y());
    let s = normal.dot(&(origin - pose.position));
    if s <= 0.0 {
        // Origin inside the solid half-space
        return Some(inside_hit(origin, dir));
    }
    let denom = normal.dot(&dir);
    if denom >= -tuning.parallel_epsilon {
        return None; // Parallel to or moving away from the surface
    }
    let t = -s / denom;
    if t > max_distance {
        return None;
    }
    Some(RayHit {
        distance: t,
        position: origin + dir * t,
        normal,
        ..RayHit::default()
    })
}

fn capsule_raycast(
    origin: Vec3,
    dir: Vec3,
    pose: &Pose,
    half_height: f32,
    radius: f32,
    max_distance: f32,
    tuning: &QueryTuning,
) -> Option<RayHit> {
    let o = pose.inverse_transform_point(origin);
    let d = pose.inverse_transform_vector(dir);
    let top = Vec3::new(0.0, half_height, 0.0);
    let bottom = Vec3::new(0.0, -half_height, 0.0);

    if super::distance::point_segment_distance_sq(o, bottom, top) <= radius * radius {
        return Some(inside_hit(origin, dir));
    }

    let mut best: Option<(f32, Vec3)> = None; // (t, local normal)

    // Cylindrical side wall
    let a = d.x * d.x + d.z * d.z;
    if a > tuning.parallel_epsilon {
        let b = o.x * d.x + o.z * d.z;
        let c = o.x * o.x + o.z * o.z - radius * radius;
        let discriminant = b * b - a * c;
        if discriminant >= 0.0 {
            let t = (-b - discriminant.sqrt()) / a;
            if t >= 0.0 {
                let y = o.y + t * d.y;
                if y.abs() <= half_height {
                    let hit = o + d * t;
                    best = Some((t, Vec3::new(hit.x, 0.0, hit.z) / radius));
                }
            }
        }
    }

    // End caps as spheres around the core endpoints
    for cap in [top, bottom] {
        let oc = o - cap;
        let c = oc.magnitude_squared() - radius * radius;
        let b = oc.dot(&d);
        let discriminant = b * b - c;
        if discriminant >= 0.0 {
            let t = -b - discriminant.sqrt();
            if t >= 0.0 && best.map_or(true, |(bt, _)| t < bt) {
                let hit = o + d * t;
                best = Some((t, (hit - cap) / radius));
            }
        }
    }

    let (t, local_normal) = best?;
    if t > max_distance {
        return None;
    }
    Some(RayHit {
        distance: t,
        position: origin + dir * t,
        normal: pose.transform_vector(local_normal),
        ..RayHit::default()
    })
}

fn box_raycast(
    origin: Vec3,
    dir: Vec3,
    pose: &Pose,
    half_extents: Vec3,
    max_distance: f32,
) -> Option<RayHit> {
    let o = pose.inverse_transform_point(origin);
    let d = pose.inverse_transform_vector(dir);

    let mut t_enter = f32::MIN;
    let mut t_exit = f32::MAX;
    let mut enter_axis = 0usize;
    let mut enter_sign = 1.0f32;
    for axis in 0..3 {
        if d[axis].abs() < 1.0e-9 {
            if o[axis].abs() > half_extents[axis] {
                return None; // Parallel outside the slab
            }
            continue;
        }
        let inv = 1.0 / d[axis];
        let mut t0 = (-half_extents[axis] - o[axis]) * inv;
        let mut t1 = (half_extents[axis] - o[axis]) * inv;
        let mut sign = -1.0f32;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
            sign = 1.0;
        }
        if t0 > t_enter {
            t_enter = t0;
            enter_axis = axis;
            enter_sign = sign;
        }
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 {
        if t_exit < 0.0 {
            return None;
        }
        // Origin inside the box
        return Some(inside_hit(origin, dir));
    }
    if t_enter > max_distance {
        return None;
    }

    let mut local_normal = Vec3::zeros();
    local_normal[enter_axis] = enter_sign;
    Some(RayHit {
        distance: t_enter,
        position: origin + dir * t_enter,
        normal: pose.transform_vector(local_normal),
        ..RayHit::default()
    })
}

fn convex_raycast(
    origin: Vec3,
    dir: Vec3,
    pose: &Pose,
    data: &crate::geometry::ConvexHullData,
    scale: Vec3,
    max_distance: f32,
    tuning: &QueryTuning,
) -> Option<RayHit> {
    let o = pose.inverse_transform_point(origin);
    let d = pose.inverse_transform_vector(dir);

    let mut t_enter = 0.0f32;
    let mut t_exit = f32::MAX;
    let mut enter_face: Option<(usize, Vec3)> = None;
    let mut inside_all = true;

    for (face_index, face) in data.faces().iter().enumerate() {
        // Scaled hull plane: normal gets the inverse scale, then renormalize
        let scaled = Vec3::new(
            face.normal.x / scale.x,
            face.normal.y / scale.y,
            face.normal.z / scale.z,
        );
        let inv_len = 1.0 / scaled.magnitude();
        let normal = scaled * inv_len;
        let plane_d = face.distance * inv_len;

        let s = normal.dot(&o) - plane_d;
        if s > 0.0 {
            inside_all = false;
        }
        let denom = normal.dot(&d);
        if denom.abs() < tuning.parallel_epsilon {
            if s > 0.0 {
                return None; // Parallel to a plane that excludes the origin
            }
            continue;
        }
        let t = -s / denom;
        if denom < 0.0 {
            // The ray enters through this plane
            if t > t_enter {
                t_enter = t;
                enter_face = Some((face_index, normal));
            }
        } else {
            t_exit = t_exit.min(t);
        }
        if t_enter > t_exit {
            return None;
        }
    }

    if inside_all {
        return Some(inside_hit(origin, dir));
    }
    let (face_index, local_normal) = enter_face?;
    if t_enter > max_distance {
        return None;
    }
    Some(RayHit {
        distance: t_enter,
        position: origin + dir * t_enter,
        normal: pose.transform_vector(local_normal),
        face_index: face_index as u32,
        fields: HitFields::FACE_INDEX,
        ..RayHit::default()
    })
}

/// The uniform inside-the-shape policy: distance 0, normal opposing the ray
fn inside_hit(origin: Vec3, dir: Vec3) -> RayHit {
    RayHit {
        distance: 0.0,
        position: origin,
        normal: -dir,
        ..RayHit::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Quat;
    use crate::geometry::{ConvexHullData, HeightFieldData, TriangleMeshData};
    use approx::assert_relative_eq;

    fn one_hit() -> [RayHit; 1] {
        [RayHit::default()]
    }

    #[test]
    fn test_non_unit_direction_rejected() {
        let sphere = Geometry::sphere(1.0).unwrap();
        let mut hits = one_hit();
        let count = raycast(
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::new(1.5, 0.0, 0.0),
            &sphere,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 0);
    }

    #[test]
    fn test_zero_max_distance_rejected() {
        let sphere = Geometry::sphere(1.0).unwrap();
        let mut hits = one_hit();
        let count = raycast(
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::x(),
            &sphere,
            &Pose::identity(),
            0.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 0);
    }

    #[test]
    fn test_sphere_hit_and_inside() {
        let sphere = Geometry::sphere(1.0).unwrap();
        let mut hits = one_hit();
        let count = raycast(
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::x(),
            &sphere,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 1);
        assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-5);
        assert_relative_eq!(hits[0].normal.x, -1.0, epsilon = 1e-5);

        // Origin inside: zero distance, normal opposes the ray
        let count = raycast(
            Vec3::new(0.2, 0.0, 0.0),
            Vec3::x(),
            &sphere,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 1);
        assert_relative_eq!(hits[0].distance, 0.0);
        assert_relative_eq!(hits[0].normal.x, -1.0);
    }

    #[test]
    fn test_plane_raycast() {
        let plane = Geometry::plane();
        let mut hits = one_hit();
        // Plane through origin, normal +Y; ray falling from above
        let count = raycast(
            Vec3::new(0.0, 5.0, 0.0),
            -Vec3::y(),
            &plane,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 1);
        assert_relative_eq!(hits[0].distance, 5.0, epsilon = 1e-5);
        assert_relative_eq!(hits[0].normal.y, 1.0, epsilon = 1e-5);

        // Below the surface counts as inside
        let count = raycast(
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::x(),
            &plane,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 1);
        assert_relative_eq!(hits[0].distance, 0.0);

        // Parallel above the surface misses
        let count = raycast(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::x(),
            &plane,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 0);
    }

    #[test]
    fn test_box_raycast_face_normal() {
        let cuboid = Geometry::cuboid(Vec3::new(1.0, 2.0, 3.0)).unwrap();
        let pose = Pose::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2),
        );
        let mut hits = one_hit();
        let count = raycast(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::x(),
            &cuboid,
            &pose,
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 1);
        // Rotated 90 degrees about Y: local Z faces world X
        assert_relative_eq!(hits[0].distance, 7.0, epsilon = 1e-4);
        assert_relative_eq!(hits[0].normal.x, -1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_capsule_raycast_side_and_cap() {
        let capsule = Geometry::capsule(1.0, 0.5).unwrap();
        let mut hits = one_hit();
        // Side-on
        let count = raycast(
            Vec3::new(-5.0, 0.5, 0.0),
            Vec3::x(),
            &capsule,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 1);
        assert_relative_eq!(hits[0].distance, 4.5, epsilon = 1e-4);
        assert_relative_eq!(hits[0].normal.x, -1.0, epsilon = 1e-4);

        // Down the axis into the top cap
        let count = raycast(
            Vec3::new(0.0, 5.0, 0.0),
            -Vec3::y(),
            &capsule,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 1);
        assert_relative_eq!(hits[0].distance, 3.5, epsilon = 1e-4);
        assert_relative_eq!(hits[0].normal.y, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_convex_raycast() {
        let hull = ConvexHullData::cuboid(Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let geom = Geometry::convex_hull(hull, Vec3::new(2.0, 1.0, 1.0)).unwrap();
        let mut hits = one_hit();
        let count = raycast(
            Vec3::new(-10.0, 0.0, 0.0),
            Vec3::x(),
            &geom,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 1);
        // Scaled to half extent 2 along X
        assert_relative_eq!(hits[0].distance, 8.0, epsilon = 1e-4);
        assert_relative_eq!(hits[0].normal.x, -1.0, epsilon = 1e-4);
        assert!(hits[0].fields.contains(HitFields::FACE_INDEX));

        // Inside the hull
        let count = raycast(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::x(),
            &geom,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            true,
        );
        assert_eq!(count, 1);
        assert_relative_eq!(hits[0].distance, 0.0);
        assert_relative_eq!(hits[0].normal.x, -1.0);
    }

    fn quad_mesh() -> Geometry {
        let data = TriangleMeshData::new(
            vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(-1.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 3, 2]],
            false,
        )
        .unwrap();
        Geometry::triangle_mesh(data, Vec3::new(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_mesh_raycast_reports_uv_and_face() {
        let mesh = quad_mesh();
        let mut hits = one_hit();
        let count = raycast(
            Vec3::new(0.5, 3.0, -0.5),
            -Vec3::y(),
            &mesh,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT | HitFields::UV | HitFields::FACE_INDEX,
            &mut hits,
            false,
        );
        assert_eq!(count, 1);
        assert_relative_eq!(hits[0].distance, 3.0, epsilon = 1e-5);
        assert_eq!(hits[0].face_index, 0);
        assert!(hits[0].fields.contains(HitFields::UV));
        assert_relative_eq!(hits[0].normal.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_mesh_one_sided_culling() {
        let mesh = quad_mesh();
        let mut hits = one_hit();
        // From below, the quad's back face: culled on a one-sided mesh
        let count = raycast(
            Vec3::new(0.0, -3.0, 0.0),
            Vec3::y(),
            &mesh,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            false,
        );
        assert_eq!(count, 0);

        let data = TriangleMeshData::new(
            vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(-1.0, 0.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 3, 2]],
            true,
        )
        .unwrap();
        let two_sided = Geometry::triangle_mesh(data, Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let count = raycast(
            Vec3::new(0.0, -3.0, 0.0),
            Vec3::y(),
            &two_sided,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            false,
        );
        assert_eq!(count, 1);
        // Normal flipped to oppose the ray
        assert_relative_eq!(hits[0].normal.y, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_mesh_multi_hit_closest_first() {
        // Two stacked quads; a vertical ray crosses both
        let data = TriangleMeshData::new(
            vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(-1.0, 0.0, 1.0),
                Vec3::new(-1.0, 2.0, -1.0),
                Vec3::new(1.0, 2.0, -1.0),
                Vec3::new(1.0, 2.0, 1.0),
                Vec3::new(-1.0, 2.0, 1.0),
            ],
            vec![[0, 2, 1], [0, 3, 2], [4, 6, 5], [4, 7, 6]],
            true,
        )
        .unwrap();
        let mesh = Geometry::triangle_mesh(data, Vec3::new(1.0, 1.0, 1.0)).unwrap();
        let mut hits = [RayHit::default(); 4];
        let count = raycast(
            Vec3::new(0.5, 5.0, -0.5),
            -Vec3::y(),
            &mesh,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            false,
        );
        assert_eq!(count, 2);
        assert_relative_eq!(hits[0].distance, 3.0, epsilon = 1e-5);
        let mut distances: Vec<f32> = hits[..count].iter().map(|h| h.distance).collect();
        distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_relative_eq!(distances[1], 5.0, epsilon = 1e-5);
    }

    #[test]
    fn test_heightfield_raycast() {
        let data = HeightFieldData::new(3, 3, vec![0.0; 9]).unwrap();
        let hf = Geometry::height_field(data, 1.0, 1.0, 1.0).unwrap();
        let mut hits = one_hit();
        let count = raycast(
            Vec3::new(1.0, 4.0, 1.2),
            -Vec3::y(),
            &hf,
            &Pose::identity(),
            100.0,
            HitFields::DEFAULT,
            &mut hits,
            false,
        );
        assert_eq!(count, 1);
        assert_relative_eq!(hits[0].distance, 4.0, epsilon = 1e-4);
        assert_relative_eq!(hits[0].normal.y, 1.0, epsilon = 1e-4);
    }
}
