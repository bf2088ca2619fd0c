use std::ops::Range;

use mmesh_core::geometry::Point;
use mmesh_cut::{CellKind, MultiMesh};
use tracing::debug;

use crate::error::FemError;
use crate::la::SparseMatrix;

/// Continuous P1 space on every part, numbered part by part.
///
/// Dof `offset(p) + v` is the nodal value at vertex `v` of part `p`.
#[derive(Debug, Clone)]
pub struct MultiMeshFunctionSpace<'a> {
    multimesh: &'a MultiMesh,
    degree: usize,
    offsets: Vec<usize>,
    dim: usize,
}

impl<'a> MultiMeshFunctionSpace<'a> {
    pub fn new(multimesh: &'a MultiMesh, degree: usize) -> Result<Self, FemError> {
        if !multimesh.is_built() {
            return Err(FemError::MultiMeshNotBuilt);
        }
        if degree != 1 {
            return Err(FemError::UnsupportedDegree(degree));
        }

        let mut offsets = Vec::with_capacity(multimesh.num_parts());
        let mut dim = 0;
        for mesh in multimesh.parts() {
            offsets.push(dim);
            dim += mesh.num_vertices();
        }
        debug!(dim, parts = offsets.len(), "created multimesh function space");

        Ok(Self { multimesh, degree, offsets, dim })
    }

    pub fn multimesh(&self) -> &'a MultiMesh {
        self.multimesh
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_parts(&self) -> usize {
        self.offsets.len()
    }

    pub fn part_offset(&self, part: usize) -> usize {
        self.offsets[part]
    }

    /// Global dofs of `part`.
    pub fn part_dofs(&self, part: usize) -> Range<usize> {
        let start = self.offsets[part];
        start..start + self.multimesh.part(part).num_vertices()
    }

    pub fn part_ranges(&self) -> Vec<Range<usize>> {
        (0..self.num_parts()).map(|p| self.part_dofs(p)).collect()
    }

    pub fn cell_dofs(&self, part: usize, cell: usize) -> [usize; 3] {
        let off = self.offsets[part];
        self.multimesh.part(part).cell(cell).map(|v| off + v)
    }

    /// Part and coordinate of a global dof.
    pub fn dof_coordinate(&self, dof: usize) -> Option<(usize, Point)> {
        (0..self.num_parts())
            .find(|&p| self.part_dofs(p).contains(&dof))
            .map(|p| (p, self.multimesh.part(p).vertex(dof - self.offsets[p])))
    }

    /// Dofs that belong to no active (non-covered) cell of their part, ascending.
    pub fn inactive_dofs(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for part in 0..self.num_parts() {
            let mesh = self.multimesh.part(part);
            let mut active = vec![false; mesh.num_vertices()];
            for c in 0..mesh.num_cells() {
                if self.multimesh.cell_kind(part, c) != Some(CellKind::Covered) {
                    for v in mesh.cell(c) {
                        active[v] = true;
                    }
                }
            }
            out.extend(
                active
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| !**a)
                    .map(|(v, _)| self.offsets[part] + v),
            );
        }
        out
    }

    /// Replace rows of inactive dofs by identity rows with zero right-hand side.
    /// Returns the number of locked dofs.
    pub fn lock_inactive_dofs(&self, a: &mut SparseMatrix, b: &mut [f64]) -> Result<usize, FemError> {
        if a.size(0) != self.dim || b.len() != self.dim {
            return Err(FemError::DimensionMismatch {
                expected: self.dim,
                found: if a.size(0) != self.dim { a.size(0) } else { b.len() },
            });
        }
        let inactive = self.inactive_dofs();
        a.ident_rows(&inactive);
        for &dof in &inactive {
            b[dof] = 0.0;
        }
        debug!(locked = inactive.len(), "locked inactive dofs");
        Ok(inactive.len())
    }
}
