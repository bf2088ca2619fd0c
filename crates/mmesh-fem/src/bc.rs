use std::collections::BTreeMap;

use mmesh_core::geometry::Point;
use tracing::debug;

use crate::error::FemError;
use crate::form::Source;
use crate::function_space::MultiMeshFunctionSpace;
use crate::la::SparseMatrix;

/// Which boundary vertices a condition applies to.
#[derive(Debug, Clone, Copy, Default)]
pub enum BoundaryPredicate {
    /// Every vertex on a boundary facet.
    #[default]
    OnBoundary,
    /// Called with the vertex and whether it lies on a boundary facet.
    Custom(fn(Point, bool) -> bool),
}

impl BoundaryPredicate {
    pub fn inside(&self, x: Point, on_boundary: bool) -> bool {
        match self {
            BoundaryPredicate::OnBoundary => on_boundary,
            BoundaryPredicate::Custom(f) => f(x, on_boundary),
        }
    }
}

/// Dirichlet condition `u = g` on the exposed boundary of every part.
#[derive(Debug, Clone)]
pub struct MultiMeshDirichletBC<'s, 'a> {
    space: &'s MultiMeshFunctionSpace<'a>,
    value: Source,
    boundary: BoundaryPredicate,
    /// Skip boundary vertices lying inside another part.
    pub exclude_overlapped_boundaries: bool,
}

impl<'s, 'a> MultiMeshDirichletBC<'s, 'a> {
    pub fn new(space: &'s MultiMeshFunctionSpace<'a>, value: Source, boundary: BoundaryPredicate) -> Self {
        Self {
            space,
            value,
            boundary,
            exclude_overlapped_boundaries: true,
        }
    }

    /// Constrained dofs and their prescribed values.
    pub fn boundary_values(&self) -> BTreeMap<usize, f64> {
        let multimesh = self.space.multimesh();
        let inactive = self.space.inactive_dofs();
        let mut out = BTreeMap::new();

        for part in 0..self.space.num_parts() {
            let mesh = multimesh.part(part);
            let offset = self.space.part_offset(part);
            let mut on_boundary = vec![false; mesh.num_vertices()];
            for facet in mesh.boundary_facets() {
                for v in facet.vertices {
                    on_boundary[v] = true;
                }
            }

            for (v, &on) in on_boundary.iter().enumerate() {
                let x = mesh.vertex(v);
                if !self.boundary.inside(x, on) {
                    continue;
                }
                let dof = offset + v;
                if inactive.binary_search(&dof).is_ok() {
                    continue;
                }
                if self.exclude_overlapped_boundaries
                    && (0..self.space.num_parts()).any(|q| q != part && multimesh.collides(q, x))
                {
                    continue;
                }
                out.insert(dof, self.value.eval(x));
            }
        }
        out
    }

    /// Impose the condition on a linear system. Returns the number of
    /// constrained dofs.
    pub fn apply(&self, a: &mut SparseMatrix, b: &mut [f64]) -> Result<usize, FemError> {
        let dim = self.space.dim();
        if a.size(0) != dim {
            return Err(FemError::DimensionMismatch { expected: dim, found: a.size(0) });
        }
        if b.len() != dim {
            return Err(FemError::DimensionMismatch { expected: dim, found: b.len() });
        }

        let values = self.boundary_values();
        let rows: Vec<usize> = values.keys().copied().collect();
        a.ident_rows(&rows);
        for (&dof, &g) in &values {
            b[dof] = g;
        }
        debug!(constrained = rows.len(), "applied multimesh Dirichlet condition");
        Ok(rows.len())
    }
}
