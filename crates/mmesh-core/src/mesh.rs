use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

use crate::error::MeshError;
use crate::geometry::{orient2d, Aabb, Point};

/// A facet (edge) on the mesh boundary, owned by exactly one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFacet {
    /// Endpoints, ordered so the owning cell lies on the left.
    pub vertices: [usize; 2],
    pub cell: usize,
    /// Outward unit normal.
    pub normal: Point,
}

/// A 2D triangle mesh.
///
/// Cells are stored counter-clockwise. Boundary facets are derived once at
/// construction and never change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    vertices: Vec<Point>,
    cells: Vec<[usize; 3]>,
    boundary: Vec<BoundaryFacet>,
}

impl Mesh {
    /// Build a mesh from raw vertices and cells.
    ///
    /// Clockwise cells are flipped. Degenerate cells and edges shared by more
    /// than two cells are rejected.
    pub fn new(vertices: Vec<Point>, mut cells: Vec<[usize; 3]>) -> Result<Mesh, MeshError> {
        if cells.is_empty() {
            return Err(MeshError::Empty);
        }

        for (c, cell) in cells.iter_mut().enumerate() {
            for &v in cell.iter() {
                if v >= vertices.len() {
                    return Err(MeshError::VertexOutOfRange {
                        cell: c,
                        vertex: v,
                        num_vertices: vertices.len(),
                    });
                }
            }
            let o = orient2d(vertices[cell[0]], vertices[cell[1]], vertices[cell[2]]);
            if o.abs() <= f64::EPSILON * scale_of(&vertices, cell) {
                return Err(MeshError::DegenerateCell { cell: c, area: 0.5 * o.abs() });
            }
            if o < 0.0 {
                cell.swap(1, 2);
            }
        }

        let boundary = compute_boundary(&vertices, &cells)?;
        Ok(Mesh { vertices, cells, boundary })
    }

    /// Unit square `[0,1]^2` split into `nx * ny` squares, each cut along its
    /// "right" diagonal.
    pub fn unit_square(nx: usize, ny: usize) -> Result<Mesh, MeshError> {
        Self::rectangle(Point::new(0.0, 0.0), Point::new(1.0, 1.0), nx, ny)
    }

    pub fn rectangle(p0: Point, p1: Point, nx: usize, ny: usize) -> Result<Mesh, MeshError> {
        if nx == 0 || ny == 0 {
            return Err(MeshError::InvalidParameters(format!(
                "rectangle resolution must be positive (got {nx}x{ny})"
            )));
        }
        if p1.x <= p0.x || p1.y <= p0.y {
            return Err(MeshError::InvalidParameters(
                "rectangle corners must satisfy p0 < p1".to_string(),
            ));
        }

        let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                vertices.push(Point::new(
                    p0.x + (p1.x - p0.x) * i as f64 / nx as f64,
                    p0.y + (p1.y - p0.y) * j as f64 / ny as f64,
                ));
            }
        }

        let mut cells = Vec::with_capacity(2 * nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let v0 = j * (nx + 1) + i;
                let v1 = v0 + 1;
                let v2 = v0 + (nx + 1);
                let v3 = v2 + 1;
                cells.push([v0, v1, v3]);
                cells.push([v0, v2, v3]);
            }
        }

        Mesh::new(vertices, cells)
    }

    /// Structured annulus around `center`, with `n_radial` layers and
    /// `n_angular` sectors.
    pub fn annulus(
        center: Point,
        r_inner: f64,
        r_outer: f64,
        n_radial: usize,
        n_angular: usize,
    ) -> Result<Mesh, MeshError> {
        if !(r_inner > 0.0 && r_outer > r_inner) {
            return Err(MeshError::InvalidParameters(format!(
                "annulus radii must satisfy 0 < r_inner < r_outer (got {r_inner}, {r_outer})"
            )));
        }
        if n_radial == 0 || n_angular < 3 {
            return Err(MeshError::InvalidParameters(format!(
                "annulus needs n_radial >= 1 and n_angular >= 3 (got {n_radial}, {n_angular})"
            )));
        }

        let mut vertices = Vec::with_capacity((n_radial + 1) * n_angular);
        for k in 0..=n_radial {
            let r = r_inner + (r_outer - r_inner) * k as f64 / n_radial as f64;
            for m in 0..n_angular {
                let theta = 2.0 * std::f64::consts::PI * m as f64 / n_angular as f64;
                vertices.push(Point::new(center.x + r * theta.cos(), center.y + r * theta.sin()));
            }
        }

        let mut cells = Vec::with_capacity(2 * n_radial * n_angular);
        for k in 0..n_radial {
            for m in 0..n_angular {
                let m1 = (m + 1) % n_angular;
                let a = k * n_angular + m;
                let b = k * n_angular + m1;
                let c = (k + 1) * n_angular + m;
                let d = (k + 1) * n_angular + m1;
                // Alternate the diagonal so the mesh has no preferred direction.
                if (k + m) % 2 == 0 {
                    cells.push([a, b, d]);
                    cells.push([a, d, c]);
                } else {
                    cells.push([a, b, c]);
                    cells.push([b, d, c]);
                }
            }
        }

        Mesh::new(vertices, cells)
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn cells(&self) -> &[[usize; 3]] {
        &self.cells
    }

    pub fn vertex(&self, v: usize) -> Point {
        self.vertices[v]
    }

    pub fn cell(&self, c: usize) -> [usize; 3] {
        self.cells[c]
    }

    pub fn boundary_facets(&self) -> &[BoundaryFacet] {
        &self.boundary
    }

    pub fn facet_points(&self, f: &BoundaryFacet) -> (Point, Point) {
        (self.vertices[f.vertices[0]], self.vertices[f.vertices[1]])
    }

    /// Corner coordinates of cell `c`, counter-clockwise.
    pub fn cell_points(&self, c: usize) -> [Point; 3] {
        let [a, b, d] = self.cells[c];
        [self.vertices[a], self.vertices[b], self.vertices[d]]
    }

    pub fn midpoint(&self, c: usize) -> Point {
        let [a, b, d] = self.cell_points(c);
        (a + b + d) * (1.0 / 3.0)
    }

    pub fn area(&self, c: usize) -> f64 {
        let [a, b, d] = self.cell_points(c);
        0.5 * orient2d(a, b, d)
    }

    pub fn circumradius(&self, c: usize) -> f64 {
        let [a, b, d] = self.cell_points(c);
        let (la, lb, lc) = (b.distance(d), a.distance(d), a.distance(b));
        la * lb * lc / (4.0 * self.area(c))
    }

    pub fn bounding_box(&self, c: usize) -> Aabb {
        Aabb::from_points(&self.cell_points(c))
    }

    pub fn total_area(&self) -> f64 {
        (0..self.num_cells()).map(|c| self.area(c)).sum()
    }

    /// Barycentric coordinates of `p` with respect to cell `c`.
    pub fn barycentric(&self, c: usize, p: Point) -> [f64; 3] {
        let [p0, p1, p2] = self.cell_points(c);
        let d = orient2d(p0, p1, p2);
        [
            orient2d(p, p1, p2) / d,
            orient2d(p0, p, p2) / d,
            orient2d(p0, p1, p) / d,
        ]
    }

    /// Gradients of the three linear (P1) basis functions on cell `c`.
    pub fn basis_gradients(&self, c: usize) -> [Point; 3] {
        let [p0, p1, p2] = self.cell_points(c);
        let d = orient2d(p0, p1, p2);
        [
            Point::new(p1.y - p2.y, p2.x - p1.x) * (1.0 / d),
            Point::new(p2.y - p0.y, p0.x - p2.x) * (1.0 / d),
            Point::new(p0.y - p1.y, p1.x - p0.x) * (1.0 / d),
        ]
    }

    /// Cells incident to each vertex.
    pub fn vertex_cells(&self) -> Vec<Vec<usize>> {
        let mut out = vec![Vec::new(); self.vertices.len()];
        for (c, cell) in self.cells.iter().enumerate() {
            for &v in cell {
                out[v].push(c);
            }
        }
        out
    }

    /// Deterministic hash over coordinates (bit patterns) and connectivity,
    /// returned as fixed-width 16-char lowercase hex.
    pub fn fingerprint(&self) -> String {
        let mut h = Xxh3::new();
        h.update(&(self.vertices.len() as u64).to_le_bytes());
        for p in &self.vertices {
            h.update(&p.x.to_bits().to_le_bytes());
            h.update(&p.y.to_bits().to_le_bytes());
        }
        h.update(&(self.cells.len() as u64).to_le_bytes());
        for cell in &self.cells {
            for &v in cell {
                h.update(&(v as u64).to_le_bytes());
            }
        }
        format!("{:016x}", h.digest())
    }
}

fn scale_of(vertices: &[Point], cell: &[usize; 3]) -> f64 {
    let (a, b, c) = (vertices[cell[0]], vertices[cell[1]], vertices[cell[2]]);
    let l = a.distance(b).max(b.distance(c)).max(a.distance(c));
    (l * l).max(f64::MIN_POSITIVE)
}

fn compute_boundary(vertices: &[Point], cells: &[[usize; 3]]) -> Result<Vec<BoundaryFacet>, MeshError> {
    // Keyed by sorted endpoints so iteration order is deterministic.
    let mut edges: BTreeMap<(usize, usize), Vec<(usize, [usize; 2])>> = BTreeMap::new();
    for (c, cell) in cells.iter().enumerate() {
        for k in 0..3 {
            let a = cell[k];
            let b = cell[(k + 1) % 3];
            edges.entry((a.min(b), a.max(b))).or_default().push((c, [a, b]));
        }
    }

    let mut boundary = Vec::new();
    for ((lo, hi), owners) in edges {
        match owners.as_slice() {
            [(cell, [a, b])] => {
                let d = vertices[*b] - vertices[*a];
                // The owning cell is on the left of a -> b, so the right normal points out.
                let normal = Point::new(d.y, -d.x).normalized();
                boundary.push(BoundaryFacet { vertices: [*a, *b], cell: *cell, normal });
            }
            [_, _] => {}
            _ => return Err(MeshError::NonManifoldEdge(lo, hi)),
        }
    }
    Ok(boundary)
}
