use mmesh_core::quadrature::triangle_rule;
use mmesh_cut::CellKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FemError;
use crate::form::{InterfaceTensor, LoadForm, NitscheForm, Side};
use crate::function_space::MultiMeshFunctionSpace;
use crate::la::{SparseMatrix, TripletMatrix};

/// Polynomial degree used for the load vector on uncut cells.
const LOAD_DEGREE: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyStats {
    pub uncut_cells: usize,
    pub cut_cells: usize,
    pub interface_points: usize,
    pub overlap_points: usize,
    pub nnz: usize,
}

fn flatten3(local: [[f64; 3]; 3]) -> [f64; 9] {
    let mut out = [0.0; 9];
    for i in 0..3 {
        out[i * 3..i * 3 + 3].copy_from_slice(&local[i]);
    }
    out
}

fn flatten6(local: InterfaceTensor) -> [f64; 36] {
    let mut out = [0.0; 36];
    for i in 0..6 {
        out[i * 6..i * 6 + 6].copy_from_slice(&local[i]);
    }
    out
}

/// Assemble the bilinear form over every part: cell terms on uncut and cut
/// cells, then interface and overlap terms coupling each cut cell to the
/// cells of higher parts that cut it. Covered cells contribute nothing.
pub fn assemble_matrix(space: &MultiMeshFunctionSpace<'_>, form: &NitscheForm) -> (SparseMatrix, AssemblyStats) {
    let multimesh = space.multimesh();
    let mut stats = AssemblyStats::default();
    let mut a = TripletMatrix::new(space.dim(), space.dim());

    for part in 0..space.num_parts() {
        let mesh = multimesh.part(part);

        for cell in multimesh.uncut_cells(part) {
            let dofs = space.cell_dofs(part, cell);
            let local = form.cell_tensor(mesh, cell, mesh.area(cell));
            a.add_block(&dofs, &dofs, &flatten3(local));
            stats.uncut_cells += 1;
        }

        for cell in multimesh.cut_cells(part) {
            let dofs = space.cell_dofs(part, cell);
            // Gradients are constant, so the visible measure is enough.
            if let Some(rule) = multimesh.quadrature_rule_cut_cell(part, cell) {
                let local = form.cell_tensor(mesh, cell, rule.total_weight());
                a.add_block(&dofs, &dofs, &flatten3(local));
            }
            stats.cut_cells += 1;

            let minus = Side { mesh, cell };
            for ir in multimesh.interface_rules(part, cell) {
                if multimesh.cell_kind(ir.cutting_part, ir.cutting_cell) == Some(CellKind::Covered) {
                    continue;
                }
                let plus = Side { mesh: multimesh.part(ir.cutting_part), cell: ir.cutting_cell };
                let local = form.interface_tensor(plus, minus, ir.normal, &ir.rule);
                let coupled = coupled_dofs(space, ir.cutting_part, ir.cutting_cell, dofs);
                a.add_block(&coupled, &coupled, &flatten6(local));
                stats.interface_points += ir.rule.len();
            }

            if form.overlap_weight == 0.0 {
                continue;
            }
            for or in multimesh.overlap_rules(part, cell) {
                if multimesh.cell_kind(or.cutting_part, or.cutting_cell) == Some(CellKind::Covered) {
                    continue;
                }
                let plus = Side { mesh: multimesh.part(or.cutting_part), cell: or.cutting_cell };
                let local = form.overlap_tensor(plus, minus, &or.rule);
                let coupled = coupled_dofs(space, or.cutting_part, or.cutting_cell, dofs);
                a.add_block(&coupled, &coupled, &flatten6(local));
                stats.overlap_points += or.rule.len();
            }
        }
    }

    let a = a.into_csr();
    stats.nnz = a.nnz();
    debug!(
        dim = space.dim(),
        nnz = stats.nnz,
        uncut = stats.uncut_cells,
        cut = stats.cut_cells,
        interface_points = stats.interface_points,
        overlap_points = stats.overlap_points,
        "assembled multimesh matrix"
    );
    (a, stats)
}

fn coupled_dofs(space: &MultiMeshFunctionSpace<'_>, part: usize, cell: usize, minus: [usize; 3]) -> [usize; 6] {
    let plus = space.cell_dofs(part, cell);
    [plus[0], plus[1], plus[2], minus[0], minus[1], minus[2]]
}

/// Assemble `L(v)` over the visible region of every part.
pub fn assemble_vector(space: &MultiMeshFunctionSpace<'_>, form: &LoadForm) -> Result<Vec<f64>, FemError> {
    let multimesh = space.multimesh();
    let mut b = vec![0.0; space.dim()];

    for part in 0..space.num_parts() {
        let mesh = multimesh.part(part);
        for cell in multimesh.uncut_cells(part) {
            let rule = triangle_rule(&mesh.cell_points(cell), LOAD_DEGREE)?;
            let local = form.cell_vector(mesh, cell, &rule);
            for (dof, v) in space.cell_dofs(part, cell).into_iter().zip(local) {
                b[dof] += v;
            }
        }
        for cell in multimesh.cut_cells(part) {
            let Some(rule) = multimesh.quadrature_rule_cut_cell(part, cell) else { continue };
            let local = form.cell_vector(mesh, cell, rule);
            for (dof, v) in space.cell_dofs(part, cell).into_iter().zip(local) {
                b[dof] += v;
            }
        }
    }

    debug!(dim = b.len(), "assembled multimesh vector");
    Ok(b)
}
