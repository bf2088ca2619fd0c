//! Quadrature rules on triangles, segments and convex polygons.
//!
//! Rules carry physical points and weights. Weights may be negative: cut-cell
//! rules are built by inclusion–exclusion and subtract covered regions.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::QuadratureError;
use crate::geometry::{polygon_area, Point};

pub const MAX_TRIANGLE_DEGREE: usize = 4;
pub const MAX_SEGMENT_DEGREE: usize = 5;

/// Barycentric points and weights on the reference triangle, weights summing to 1.
struct TriangleScheme {
    degree: usize,
    points: Vec<[f64; 3]>,
    weights: Vec<f64>,
}

static TRIANGLE_SCHEMES: Lazy<Vec<TriangleScheme>> = Lazy::new(|| {
    let third = 1.0 / 3.0;
    let (a, wa) = (0.445_948_490_915_965, 0.223_381_589_678_011);
    let (b, wb) = (0.091_576_213_509_771, 0.109_951_743_655_322);
    vec![
        TriangleScheme {
            degree: 1,
            points: vec![[third, third, third]],
            weights: vec![1.0],
        },
        TriangleScheme {
            degree: 2,
            points: vec![
                [2.0 / 3.0, 1.0 / 6.0, 1.0 / 6.0],
                [1.0 / 6.0, 2.0 / 3.0, 1.0 / 6.0],
                [1.0 / 6.0, 1.0 / 6.0, 2.0 / 3.0],
            ],
            weights: vec![third; 3],
        },
        TriangleScheme {
            degree: 4,
            points: vec![
                [1.0 - 2.0 * a, a, a],
                [a, 1.0 - 2.0 * a, a],
                [a, a, 1.0 - 2.0 * a],
                [1.0 - 2.0 * b, b, b],
                [b, 1.0 - 2.0 * b, b],
                [b, b, 1.0 - 2.0 * b],
            ],
            weights: vec![wa, wa, wa, wb, wb, wb],
        },
    ]
});

/// Gauss–Legendre nodes on `[0, 1]` with weights summing to 1.
static GAUSS_LEGENDRE: Lazy<Vec<(Vec<f64>, Vec<f64>)>> = Lazy::new(|| {
    let s3 = (1.0_f64 / 3.0).sqrt();
    let s35 = (3.0_f64 / 5.0).sqrt();
    vec![
        (vec![0.5], vec![1.0]),
        (vec![0.5 * (1.0 - s3), 0.5 * (1.0 + s3)], vec![0.5, 0.5]),
        (
            vec![0.5 * (1.0 - s35), 0.5, 0.5 * (1.0 + s35)],
            vec![5.0 / 18.0, 8.0 / 18.0, 5.0 / 18.0],
        ),
    ]
});

/// A quadrature rule in physical coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadratureRule {
    pub points: Vec<Point>,
    pub weights: Vec<f64>,
}

impl QuadratureRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Sum of weights: the measure of the integration domain.
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    pub fn push(&mut self, p: Point, w: f64) {
        self.points.push(p);
        self.weights.push(w);
    }

    /// Append `other` with its weights multiplied by `factor`.
    pub fn append_scaled(&mut self, other: &QuadratureRule, factor: f64) {
        self.points.extend_from_slice(&other.points);
        self.weights.extend(other.weights.iter().map(|w| w * factor));
    }

    pub fn iter(&self) -> impl Iterator<Item = (Point, f64)> + '_ {
        self.points.iter().copied().zip(self.weights.iter().copied())
    }

    pub fn integrate(&self, f: impl Fn(Point) -> f64) -> f64 {
        self.iter().map(|(p, w)| w * f(p)).sum()
    }
}

/// Rule on a triangle, exact for polynomials up to `degree`.
pub fn triangle_rule(t: &[Point; 3], degree: usize) -> Result<QuadratureRule, QuadratureError> {
    let scheme = TRIANGLE_SCHEMES
        .iter()
        .find(|s| s.degree >= degree)
        .ok_or(QuadratureError::UnsupportedDegree {
            shape: "triangle",
            degree,
            max: MAX_TRIANGLE_DEGREE,
        })?;

    let area = 0.5 * (t[1] - t[0]).cross(t[2] - t[0]).abs();
    let mut rule = QuadratureRule::new();
    for (bary, w) in scheme.points.iter().zip(&scheme.weights) {
        let p = t[0] * bary[0] + t[1] * bary[1] + t[2] * bary[2];
        rule.push(p, w * area);
    }
    Ok(rule)
}

/// Rule on a convex polygon (fan triangulation from the first corner).
pub fn polygon_rule(poly: &[Point], degree: usize) -> Result<QuadratureRule, QuadratureError> {
    let mut rule = QuadratureRule::new();
    if poly.len() < 3 || polygon_area(poly).abs() == 0.0 {
        return Ok(rule);
    }
    for k in 1..poly.len() - 1 {
        let tri = [poly[0], poly[k], poly[k + 1]];
        let sub = triangle_rule(&tri, degree)?;
        rule.append_scaled(&sub, 1.0);
    }
    Ok(rule)
}

/// Gauss–Legendre rule on the segment `a -> b`, exact up to `degree`.
pub fn segment_rule(a: Point, b: Point, degree: usize) -> Result<QuadratureRule, QuadratureError> {
    let n = degree / 2 + 1;
    let (nodes, weights) = GAUSS_LEGENDRE
        .get(n.saturating_sub(1))
        .ok_or(QuadratureError::UnsupportedDegree {
            shape: "segment",
            degree,
            max: MAX_SEGMENT_DEGREE,
        })?;

    let len = a.distance(b);
    let mut rule = QuadratureRule::new();
    for (s, w) in nodes.iter().zip(weights) {
        rule.push(a + (b - a) * *s, w * len);
    }
    Ok(rule)
}
