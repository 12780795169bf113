//! Pairwise collision predicates.
//!
//! Every supported shape pair has an explicit test; pairs with no
//! implementation fail with [`SpatialError::CollisionUnsupported`] rather
//! than silently reporting no collision.
//!
//! Strategy per pair:
//! - box/box: separating-axis theorem over the 15 candidate axes
//! - sphere/box: clamp the sphere centre into the box's local frame
//! - capsule/anything: closest point on the capsule's spine segment, then a
//!   sphere test with the capsule radius
//! - mesh/{box, sphere, capsule, point}: per-triangle SAT and
//!   closest-point-on-triangle tests
//!
//! Touching counts as colliding. Geometries are expected to already be in a
//! common coordinate system (their poses are world poses).

use super::{Geometry, GeometryKind, Triangle};
use crate::error::{Result, SpatialError};
use crate::vector::Vector3;

/// Tolerance for contact between zero-extent shapes (point/point and
/// point/mesh), millimetres.
const CONTACT_EPSILON: f64 = 1e-8;

/// Do the two geometries intersect?
///
/// Symmetric in its arguments. Unsupported pairs (mesh/mesh and anything
/// involving a point cloud) return an error naming both kinds.
pub fn collides(a: &Geometry, b: &Geometry) -> Result<bool> {
    if let Some(hit) = collides_ordered(a, b) {
        return Ok(hit);
    }
    if let Some(hit) = collides_ordered(b, a) {
        return Ok(hit);
    }
    Err(SpatialError::CollisionUnsupported {
        a: a.kind_name(),
        b: b.kind_name(),
    })
}

/// One direction of the dispatch table; `None` means this ordering has no
/// test (the caller retries swapped before giving up).
fn collides_ordered(a: &Geometry, b: &Geometry) -> Option<bool> {
    use GeometryKind::*;
    match (&a.kind, &b.kind) {
        (Box { half_extents: ha }, Box { half_extents: hb }) => {
            Some(obb_obb_overlap(&Obb::new(a, *ha), &Obb::new(b, *hb)))
        }
        (Box { half_extents }, Sphere { radius }) => {
            let obb = Obb::new(a, *half_extents);
            Some(obb.distance_to_point(b.pose.translation) <= *radius)
        }
        (Box { half_extents }, Capsule { radius, length }) => {
            let obb = Obb::new(a, *half_extents);
            let (p0, p1) = capsule_segment(b, *radius, *length);
            Some(obb.distance_to_segment(p0, p1) <= *radius)
        }
        (Box { half_extents }, Point) => {
            let obb = Obb::new(a, *half_extents);
            Some(obb.distance_to_point(b.pose.translation) <= CONTACT_EPSILON)
        }
        (Box { half_extents }, Mesh { triangles }) => {
            let obb = Obb::new(a, *half_extents);
            Some(
                world_triangles(b, triangles).any(|t| obb.overlaps_triangle(&t)),
            )
        }
        (Sphere { radius: ra }, Sphere { radius: rb }) => {
            Some(a.pose.translation.distance(&b.pose.translation) <= ra + rb)
        }
        (Sphere { radius: rs }, Capsule { radius: rc, length }) => {
            let (p0, p1) = capsule_segment(b, *rc, *length);
            let closest = closest_point_on_segment(p0, p1, a.pose.translation);
            Some(closest.distance(&a.pose.translation) <= rs + rc)
        }
        (Sphere { radius }, Point) => {
            Some(a.pose.translation.distance(&b.pose.translation) <= *radius)
        }
        (Sphere { radius }, Mesh { triangles }) => {
            let c = a.pose.translation;
            Some(
                world_triangles(b, triangles)
                    .any(|t| closest_point_on_triangle(c, &t).distance(&c) <= *radius),
            )
        }
        (Capsule { radius: ra, length: la }, Capsule { radius: rb, length: lb }) => {
            let (a0, a1) = capsule_segment(a, *ra, *la);
            let (b0, b1) = capsule_segment(b, *rb, *lb);
            Some(segment_segment_distance(a0, a1, b0, b1) <= ra + rb)
        }
        (Capsule { radius, length }, Point) => {
            let (p0, p1) = capsule_segment(a, *radius, *length);
            let closest = closest_point_on_segment(p0, p1, b.pose.translation);
            Some(closest.distance(&b.pose.translation) <= *radius)
        }
        (Capsule { radius, length }, Mesh { triangles }) => {
            let (p0, p1) = capsule_segment(a, *radius, *length);
            Some(
                world_triangles(b, triangles)
                    .any(|t| segment_triangle_distance(p0, p1, &t) <= *radius),
            )
        }
        (Point, Point) => {
            Some(a.pose.translation.distance(&b.pose.translation) <= CONTACT_EPSILON)
        }
        (Point, Mesh { triangles }) => {
            let p = a.pose.translation;
            Some(
                world_triangles(b, triangles)
                    .any(|t| closest_point_on_triangle(p, &t).distance(&p) <= CONTACT_EPSILON),
            )
        }
        _ => None,
    }
}

/// An oriented box: centre, unit axes, half-extents.
struct Obb {
    center: Vector3,
    axes: [Vector3; 3],
    half: [f64; 3],
}

impl Obb {
    fn new(g: &Geometry, half_extents: Vector3) -> Self {
        let q = g.pose.quaternion();
        Self {
            center: g.pose.translation,
            axes: [
                q.rotate_vector(Vector3::X),
                q.rotate_vector(Vector3::Y),
                q.rotate_vector(Vector3::Z),
            ],
            half: [half_extents.x, half_extents.y, half_extents.z],
        }
    }

    /// Map a world point into box-local coordinates.
    fn to_local(&self, p: Vector3) -> Vector3 {
        let d = p - self.center;
        Vector3::new(
            d.dot(&self.axes[0]),
            d.dot(&self.axes[1]),
            d.dot(&self.axes[2]),
        )
    }

    fn distance_to_point(&self, p: Vector3) -> f64 {
        aabb_point_distance(self.to_local(p), self.half)
    }

    fn distance_to_segment(&self, p0: Vector3, p1: Vector3) -> f64 {
        segment_aabb_distance(self.to_local(p0), self.to_local(p1), self.half)
    }

    fn overlaps_triangle(&self, t: &Triangle) -> bool {
        triangle_aabb_overlap(
            &Triangle::new(self.to_local(t.a), self.to_local(t.b), self.to_local(t.c)),
            self.half,
        )
    }
}

/// Mesh triangles mapped into world coordinates by the geometry's pose.
fn world_triangles<'a>(
    g: &'a Geometry,
    triangles: &'a [Triangle],
) -> impl Iterator<Item = Triangle> + 'a {
    triangles.iter().map(move |t| {
        Triangle::new(
            g.pose.transform_point(t.a),
            g.pose.transform_point(t.b),
            g.pose.transform_point(t.c),
        )
    })
}

/// Endpoints of a capsule's spine segment in world coordinates.
fn capsule_segment(g: &Geometry, radius: f64, length: f64) -> (Vector3, Vector3) {
    let axis = g.pose.quaternion().rotate_vector(Vector3::Z);
    let half = (length / 2.0 - radius).max(0.0);
    let c = g.pose.translation;
    (c - axis * half, c + axis * half)
}

/// Separating-axis test between two oriented boxes, 15 axes. An epsilon is
/// folded into the absolute rotation terms to keep near-parallel edge pairs
/// from producing spurious separating axes.
fn obb_obb_overlap(a: &Obb, b: &Obb) -> bool {
    let mut r = [[0.0f64; 3]; 3];
    let mut abs_r = [[0.0f64; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            r[i][j] = a.axes[i].dot(&b.axes[j]);
            abs_r[i][j] = r[i][j].abs() + 1e-12;
        }
    }
    let d = b.center - a.center;
    let t = [d.dot(&a.axes[0]), d.dot(&a.axes[1]), d.dot(&a.axes[2])];

    // A's face normals.
    for i in 0..3 {
        let rb = b.half[0] * abs_r[i][0] + b.half[1] * abs_r[i][1] + b.half[2] * abs_r[i][2];
        if t[i].abs() > a.half[i] + rb {
            return false;
        }
    }
    // B's face normals.
    for j in 0..3 {
        let ra = a.half[0] * abs_r[0][j] + a.half[1] * abs_r[1][j] + a.half[2] * abs_r[2][j];
        let proj = (t[0] * r[0][j] + t[1] * r[1][j] + t[2] * r[2][j]).abs();
        if proj > ra + b.half[j] {
            return false;
        }
    }
    // Edge cross products A_i x B_j.
    for i in 0..3 {
        let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
        for j in 0..3 {
            let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
            let ra = a.half[i1] * abs_r[i2][j] + a.half[i2] * abs_r[i1][j];
            let rb = b.half[j1] * abs_r[i][j2] + b.half[j2] * abs_r[i][j1];
            let proj = (t[i2] * r[i1][j] - t[i1] * r[i2][j]).abs();
            if proj > ra + rb {
                return false;
            }
        }
    }
    true
}

/// Distance from a point to an origin-centred AABB with half-extents `h`.
fn aabb_point_distance(p: Vector3, h: [f64; 3]) -> f64 {
    let dx = (p.x.abs() - h[0]).max(0.0);
    let dy = (p.y.abs() - h[1]).max(0.0);
    let dz = (p.z.abs() - h[2]).max(0.0);
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Does a segment intersect an origin-centred AABB? Slab test with the
/// parameter clamped to the segment.
fn segment_intersects_aabb(p0: Vector3, p1: Vector3, h: [f64; 3]) -> bool {
    let d = p1 - p0;
    let (mut tmin, mut tmax) = (0.0f64, 1.0f64);
    for (p, dir, half) in [(p0.x, d.x, h[0]), (p0.y, d.y, h[1]), (p0.z, d.z, h[2])] {
        if dir.abs() < 1e-12 {
            if p < -half || p > half {
                return false;
            }
        } else {
            let mut t1 = (-half - p) / dir;
            let mut t2 = (half - p) / dir;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            tmin = tmin.max(t1);
            tmax = tmax.min(t2);
            if tmin > tmax {
                return false;
            }
        }
    }
    true
}

/// Distance from a segment to an origin-centred AABB. Zero when they
/// intersect; otherwise the closest pair is realised at a segment endpoint
/// or between the segment and a box edge.
fn segment_aabb_distance(p0: Vector3, p1: Vector3, h: [f64; 3]) -> f64 {
    if segment_intersects_aabb(p0, p1, h) {
        return 0.0;
    }
    let mut best = aabb_point_distance(p0, h).min(aabb_point_distance(p1, h));
    for (e0, e1) in aabb_edges(h) {
        best = best.min(segment_segment_distance(p0, p1, e0, e1));
    }
    best
}

/// The 12 edges of an origin-centred AABB.
fn aabb_edges(h: [f64; 3]) -> Vec<(Vector3, Vector3)> {
    let mut edges = Vec::with_capacity(12);
    let signs = [-1.0, 1.0];
    // Four edges along each axis, one per sign combination of the others.
    for &s1 in &signs {
        for &s2 in &signs {
            edges.push((
                Vector3::new(-h[0], s1 * h[1], s2 * h[2]),
                Vector3::new(h[0], s1 * h[1], s2 * h[2]),
            ));
            edges.push((
                Vector3::new(s1 * h[0], -h[1], s2 * h[2]),
                Vector3::new(s1 * h[0], h[1], s2 * h[2]),
            ));
            edges.push((
                Vector3::new(s1 * h[0], s2 * h[1], -h[2]),
                Vector3::new(s1 * h[0], s2 * h[1], h[2]),
            ));
        }
    }
    edges
}

/// Closest point to `p` on the segment `[a, b]`.
fn closest_point_on_segment(a: Vector3, b: Vector3, p: Vector3) -> Vector3 {
    let ab = b - a;
    let denom = ab.norm2();
    if denom < 1e-18 {
        return a;
    }
    let t = ((p - a).dot(&ab) / denom).clamp(0.0, 1.0);
    a + ab * t
}

/// Minimum distance between two segments `[p1, q1]` and `[p2, q2]`.
fn segment_segment_distance(p1: Vector3, q1: Vector3, p2: Vector3, q2: Vector3) -> f64 {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm2();
    let e = d2.norm2();
    let f = d2.dot(&r);

    let (s, t);
    if a < 1e-18 && e < 1e-18 {
        return r.norm();
    }
    if a < 1e-18 {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(&r);
        if e < 1e-18 {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s_tmp = if denom.abs() > 1e-18 {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let tnom = b * s_tmp + f;
            let t_tmp = if tnom < 0.0 {
                s_tmp = (-c / a).clamp(0.0, 1.0);
                0.0
            } else if tnom > e {
                s_tmp = ((b - c) / a).clamp(0.0, 1.0);
                1.0
            } else {
                tnom / e
            };
            s = s_tmp;
            t = t_tmp;
        }
    }
    let c1 = p1 + d1 * s;
    let c2 = p2 + d2 * t;
    c1.distance(&c2)
}

/// Closest point to `p` on a triangle (Voronoi-region walk).
fn closest_point_on_triangle(p: Vector3, t: &Triangle) -> Vector3 {
    let ab = t.b - t.a;
    let ac = t.c - t.a;
    let ap = p - t.a;
    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return t.a;
    }

    let bp = p - t.b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return t.b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return t.a + ab * v;
    }

    let cp = p - t.c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return t.c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return t.a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return t.b + (t.c - t.b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    t.a + ab * v + ac * w
}

/// Does the segment `[p, q]` pass through the triangle?
fn segment_intersects_triangle(p: Vector3, q: Vector3, t: &Triangle) -> bool {
    let d = q - p;
    let e1 = t.b - t.a;
    let e2 = t.c - t.a;
    let pv = d.cross(&e2);
    let det = e1.dot(&pv);
    // Parallel segments are handled by the distance fallback.
    if det.abs() < 1e-12 {
        return false;
    }
    let inv = 1.0 / det;
    let tv = p - t.a;
    let u = tv.dot(&pv) * inv;
    if !(0.0..=1.0).contains(&u) {
        return false;
    }
    let qv = tv.cross(&e1);
    let v = d.dot(&qv) * inv;
    if v < 0.0 || u + v > 1.0 {
        return false;
    }
    let s = e2.dot(&qv) * inv;
    (0.0..=1.0).contains(&s)
}

/// Minimum distance between a segment and a triangle.
fn segment_triangle_distance(p0: Vector3, p1: Vector3, t: &Triangle) -> f64 {
    if segment_intersects_triangle(p0, p1, t) {
        return 0.0;
    }
    let mut best = closest_point_on_triangle(p0, t)
        .distance(&p0)
        .min(closest_point_on_triangle(p1, t).distance(&p1));
    for (e0, e1) in [(t.a, t.b), (t.b, t.c), (t.c, t.a)] {
        best = best.min(segment_segment_distance(p0, p1, e0, e1));
    }
    best
}

/// SAT between a triangle (already in box-local coordinates) and an
/// origin-centred AABB: 3 box axes, the triangle normal, and 9 edge cross
/// products. Degenerate cross axes are skipped.
fn triangle_aabb_overlap(t: &Triangle, h: [f64; 3]) -> bool {
    let edges = [t.b - t.a, t.c - t.b, t.a - t.c];
    let mut axes: Vec<Vector3> = Vec::with_capacity(13);
    axes.extend([Vector3::X, Vector3::Y, Vector3::Z]);
    axes.push(edges[0].cross(&edges[1]));
    for basis in [Vector3::X, Vector3::Y, Vector3::Z] {
        for e in edges {
            axes.push(basis.cross(&e));
        }
    }
    for axis in axes {
        if axis.norm2() < 1e-18 {
            continue;
        }
        let pa = t.a.dot(&axis);
        let pb = t.b.dot(&axis);
        let pc = t.c.dot(&axis);
        let r = h[0] * axis.x.abs() + h[1] * axis.y.abs() + h[2] * axis.z.abs();
        if pa.min(pb).min(pc) > r || pa.max(pb).max(pc) < -r {
            return false;
        }
    }
    true
}
