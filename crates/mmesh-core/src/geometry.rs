//! Planar geometry predicates used by the mesh store and the cut-cell classifier.
//!
//! Conventions:
//! - Triangles are `[Point; 3]` in counter-clockwise order.
//! - Tolerances are distances, not squared distances.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Distance below which two geometric features are treated as touching.
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// A point (or vector) in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Scalar 2D cross product (z component of the 3D cross product).
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).norm()
    }

    /// Unit vector in the same direction. Returns the zero vector for zero input.
    pub fn normalized(self) -> Point {
        let n = self.norm();
        if n == 0.0 { self } else { self * (1.0 / n) }
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Twice the signed area of `(a, b, c)`; positive when counter-clockwise.
pub fn orient2d(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

pub fn triangle_area(t: &[Point; 3]) -> f64 {
    0.5 * orient2d(t[0], t[1], t[2]).abs()
}

/// Signed shoelace area of a closed polygon.
pub fn polygon_area(poly: &[Point]) -> f64 {
    if poly.len() < 3 {
        return 0.0;
    }
    let mut twice = 0.0;
    for i in 0..poly.len() {
        let j = (i + 1) % poly.len();
        twice += poly[i].cross(poly[j]);
    }
    0.5 * twice
}

/// Signed distance of `p` from the directed line `a -> b`; positive on the left.
fn signed_distance(a: Point, b: Point, p: Point) -> f64 {
    let len = a.distance(b);
    if len == 0.0 {
        return 0.0;
    }
    orient2d(a, b, p) / len
}

/// Whether `p` lies in the closed triangle, grown by `tol`.
pub fn point_in_triangle(p: Point, t: &[Point; 3], tol: f64) -> bool {
    (0..3).all(|k| signed_distance(t[k], t[(k + 1) % 3], p) >= -tol)
}

/// Whether two triangles overlap with positive area.
///
/// Separating-axis test over the six edges. Triangles that only share an edge
/// or a vertex do not overlap.
pub fn triangles_overlap(a: &[Point; 3], b: &[Point; 3], tol: f64) -> bool {
    let separated_by = |s: &[Point; 3], o: &[Point; 3]| {
        (0..3).any(|k| {
            let (c0, c1) = (s[k], s[(k + 1) % 3]);
            o.iter().all(|&p| signed_distance(c0, c1, p) <= tol)
        })
    };
    !(separated_by(a, b) || separated_by(b, a))
}

/// Clip a convex polygon against a counter-clockwise triangle (Sutherland–Hodgman).
///
/// Returns an empty polygon when the intersection has no area.
pub fn clip_polygon(subject: &[Point], clip: &[Point; 3]) -> Vec<Point> {
    let mut output: Vec<Point> = subject.to_vec();

    for k in 0..3 {
        if output.is_empty() {
            break;
        }
        let (c0, c1) = (clip[k], clip[(k + 1) % 3]);
        let input = std::mem::take(&mut output);
        let n = input.len();

        for idx in 0..n {
            let cur = input[idx];
            let prev = input[(idx + n - 1) % n];
            let d_cur = orient2d(c0, c1, cur);
            let d_prev = orient2d(c0, c1, prev);

            if d_cur >= 0.0 {
                if d_prev < 0.0 {
                    output.push(lerp(prev, cur, d_prev / (d_prev - d_cur)));
                }
                output.push(cur);
            } else if d_prev >= 0.0 {
                output.push(lerp(prev, cur, d_prev / (d_prev - d_cur)));
            }
        }
    }

    output.dedup_by(|a, b| a.distance(*b) <= DEFAULT_TOLERANCE);
    if output.len() > 1 && output[0].distance(output[output.len() - 1]) <= DEFAULT_TOLERANCE {
        output.pop();
    }

    if output.len() < 3 || polygon_area(&output) <= DEFAULT_TOLERANCE * DEFAULT_TOLERANCE {
        return Vec::new();
    }
    output
}

fn lerp(a: Point, b: Point, t: f64) -> Point {
    a + (b - a) * t
}

/// Parameter interval `[t0, t1]` of the segment `a -> b` lying inside a
/// counter-clockwise triangle.
///
/// A point counts as inside when its signed distance to every edge is at least
/// `tol`: a positive `tol` demands a strict interior crossing, a negative one
/// accepts grazing contact. Returns `None` for an empty or zero-length result.
pub fn clip_segment(a: Point, b: Point, t: &[Point; 3], tol: f64) -> Option<(f64, f64)> {
    let seg_len = a.distance(b);
    if seg_len == 0.0 {
        return None;
    }

    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for k in 0..3 {
        let (c0, c1) = (t[k], t[(k + 1) % 3]);
        let fa = signed_distance(c0, c1, a) - tol;
        let fb = signed_distance(c0, c1, b) - tol;
        let df = fb - fa;

        if df.abs() <= f64::EPSILON * (fa.abs() + fb.abs()).max(1.0) {
            if fa < 0.0 {
                return None;
            }
            continue;
        }

        let s = -fa / df;
        if df > 0.0 {
            t0 = t0.max(s);
        } else {
            t1 = t1.min(s);
        }
        if t0 >= t1 {
            return None;
        }
    }

    if (t1 - t0) * seg_len <= DEFAULT_TOLERANCE {
        return None;
    }
    Some((t0, t1))
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point,
    pub max: Point,
}

impl Aabb {
    pub fn from_points(points: &[Point]) -> Self {
        let mut bb = Aabb {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        };
        for &p in points {
            bb.min.x = bb.min.x.min(p.x);
            bb.min.y = bb.min.y.min(p.y);
            bb.max.x = bb.max.x.max(p.x);
            bb.max.y = bb.max.y.max(p.y);
        }
        bb
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Point {
        self.max - self.min
    }

    pub fn intersects(&self, other: &Aabb, tol: f64) -> bool {
        self.min.x <= other.max.x + tol
            && other.min.x <= self.max.x + tol
            && self.min.y <= other.max.y + tol
            && other.min.y <= self.max.y + tol
    }

    pub fn contains(&self, p: Point, tol: f64) -> bool {
        p.x >= self.min.x - tol
            && p.x <= self.max.x + tol
            && p.y >= self.min.y - tol
            && p.y <= self.max.y + tol
    }
}
