//! Quadrature on cut geometry.
//!
//! - visible part of a cut cell: the cell minus the union of all higher parts,
//!   by inclusion–exclusion over subsets of cutting parts
//! - interface: pieces of a cutting part's boundary facet inside a cut cell
//! - overlap: intersection of a cut cell with one cutting cell

use mmesh_core::geometry::{clip_polygon, clip_segment, orient2d, Point};
use mmesh_core::quadrature::{polygon_rule, segment_rule, triangle_rule};
use mmesh_core::{QuadratureError, QuadratureRule};

/// Upper bound on distinct parts cutting a single cell.
pub const MAX_CUTTING_PARTS: usize = 12;

/// Rule over `cell` minus the union of the triangles in `cutting`.
///
/// `cutting` holds one group per cutting part. Triangles within a group must
/// not overlap each other (cells of a single conforming mesh). The result has
/// negative weights wherever inclusion–exclusion subtracts a region.
pub fn visible_cell_rule(
    cell: &[Point; 3],
    cutting: &[Vec<[Point; 3]>],
    degree: usize,
) -> Result<QuadratureRule, QuadratureError> {
    let mut rule = triangle_rule(cell, degree)?;

    for mask in 1u32..(1u32 << cutting.len()) {
        let sign = if mask.count_ones() % 2 == 1 { -1.0 } else { 1.0 };

        let mut polygons: Vec<Vec<Point>> = vec![cell.to_vec()];
        for (g, group) in cutting.iter().enumerate() {
            if mask & (1 << g) == 0 {
                continue;
            }
            let mut next = Vec::new();
            for poly in &polygons {
                for tri in group {
                    let clipped = clip_polygon(poly, tri);
                    if !clipped.is_empty() {
                        next.push(clipped);
                    }
                }
            }
            polygons = next;
            if polygons.is_empty() {
                break;
            }
        }

        for poly in &polygons {
            rule.append_scaled(&polygon_rule(poly, degree)?, sign);
        }
    }

    Ok(rule)
}

/// Rule over `cell ∩ other`, empty when they do not overlap.
pub fn overlap_rule(
    cell: &[Point; 3],
    other: &[Point; 3],
    degree: usize,
) -> Result<QuadratureRule, QuadratureError> {
    let poly = clip_polygon(cell, other);
    if poly.is_empty() {
        return Ok(QuadratureRule::new());
    }
    polygon_rule(&poly, degree)
}

/// Parameter interval of the boundary facet `a -> b` owned by `cell`.
///
/// A facet crossing the interior of `cell` is owned on the closed cell. A
/// facet running along an edge of `cell` is owned only when `cell` lies on
/// the side `normal` points to, so a facet on a shared edge goes to exactly
/// one of the two neighbours.
pub fn facet_interval(a: Point, b: Point, normal: Point, cell: &[Point; 3], tol: f64) -> Option<(f64, f64)> {
    let d = b - a;
    let len2 = d.dot(d);
    if len2 == 0.0 {
        return None;
    }

    for k in 0..3 {
        let (c0, c1) = (cell[k], cell[(k + 1) % 3]);
        let edge_len = c0.distance(c1);
        let on_edge_line = |p: Point| orient2d(c0, c1, p).abs() <= tol * edge_len;
        if !(on_edge_line(a) && on_edge_line(b)) {
            continue;
        }

        let opposite = cell[(k + 2) % 3];
        if normal.dot(opposite - a) <= 0.0 {
            return None;
        }
        let (s0, s1) = ((c0 - a).dot(d) / len2, (c1 - a).dot(d) / len2);
        let (t0, t1) = (s0.min(s1).max(0.0), s0.max(s1).min(1.0));
        return ((t1 - t0) * len2.sqrt() > tol).then_some((t0, t1));
    }

    clip_segment(a, b, cell, tol)?;
    clip_segment(a, b, cell, 0.0)
}

/// Rule over the part of facet `a -> b` owned by `cell` (see
/// [`facet_interval`]) and outside every triangle in `excluded`.
pub fn interface_segment_rule(
    a: Point,
    b: Point,
    normal: Point,
    cell: &[Point; 3],
    excluded: &[[Point; 3]],
    degree: usize,
    tol: f64,
) -> Result<QuadratureRule, QuadratureError> {
    let mut rule = QuadratureRule::new();
    let Some(inside) = facet_interval(a, b, normal, cell, tol) else {
        return Ok(rule);
    };

    let removed: Vec<(f64, f64)> = excluded
        .iter()
        .filter_map(|t| clip_segment(a, b, t, 0.0))
        .collect();

    let len = a.distance(b);
    for (s0, s1) in subtract_intervals(inside, removed) {
        if (s1 - s0) * len <= tol {
            continue;
        }
        let sub = segment_rule(a + (b - a) * s0, a + (b - a) * s1, degree)?;
        rule.append_scaled(&sub, 1.0);
    }
    Ok(rule)
}

/// `base` minus the union of `removed`, as sorted disjoint intervals.
pub fn subtract_intervals(base: (f64, f64), mut removed: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    removed.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut out = Vec::new();
    let mut cursor = base.0;
    for (r0, r1) in removed {
        if r1 <= cursor {
            continue;
        }
        if r0 >= base.1 {
            break;
        }
        if r0 > cursor {
            out.push((cursor, r0));
        }
        cursor = cursor.max(r1);
        if cursor >= base.1 {
            return out;
        }
    }
    if cursor < base.1 {
        out.push((cursor, base.1));
    }
    out
}
