//! The multimesh Poisson forms and their local element tensors.
//!
//! ```text
//! a(u, v) = Σ ∫_dX ∇u·∇v
//!         - ∫_dI avg(∇u)·jump(v, n) - ∫_dI avg(∇v)·jump(u, n)
//!         + β / avg(h) ∫_dI jump(u) jump(v)
//!         + γ ∫_dO jump(∇u)·jump(∇v)
//! L(v)    = Σ ∫_dX f v
//! ```
//!
//! On an interface the `+` side is the cutting (higher) part and `-` the cut
//! part; `n` is the outward normal of the cutting part and `h = 2 R`.

use mmesh_core::geometry::Point;
use mmesh_core::{Mesh, QuadratureRule};
use serde::{Deserialize, Serialize};

/// A scalar coefficient: constant or evaluated pointwise.
#[derive(Debug, Clone, Copy)]
pub enum Source {
    Constant(f64),
    Function(fn(Point) -> f64),
}

impl Source {
    pub fn eval(&self, p: Point) -> f64 {
        match self {
            Source::Constant(c) => *c,
            Source::Function(f) => f(p),
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Constant(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NitscheForm {
    /// β: interface penalty.
    pub penalty: f64,
    /// γ: weight of the overlap gradient-jump term.
    pub overlap_weight: f64,
}

impl Default for NitscheForm {
    fn default() -> Self {
        Self { penalty: 10.0, overlap_weight: 1.0 }
    }
}

/// One side of an interface: a mesh cell.
#[derive(Debug, Clone, Copy)]
pub struct Side<'m> {
    pub mesh: &'m Mesh,
    pub cell: usize,
}

/// Local tensor over `[+ dofs, - dofs]`, row = test, column = trial.
pub type InterfaceTensor = [[f64; 6]; 6];

impl NitscheForm {
    /// `∫ ∇φ_i·∇φ_j` over a region of measure `weight` inside `cell`.
    pub fn cell_tensor(&self, mesh: &Mesh, cell: usize, weight: f64) -> [[f64; 3]; 3] {
        let g = mesh.basis_gradients(cell);
        let mut out = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                out[i][j] = weight * g[i].dot(g[j]);
            }
        }
        out
    }

    pub fn interface_tensor(
        &self,
        plus: Side<'_>,
        minus: Side<'_>,
        normal: Point,
        rule: &QuadratureRule,
    ) -> InterfaceTensor {
        let grad_p = plus.mesh.basis_gradients(plus.cell);
        let grad_m = minus.mesh.basis_gradients(minus.cell);
        let h_avg = plus.mesh.circumradius(plus.cell) + minus.mesh.circumradius(minus.cell);
        let sigma = self.penalty / h_avg;

        let mut avg_dn = [0.0; 6];
        for k in 0..3 {
            avg_dn[k] = 0.5 * grad_p[k].dot(normal);
            avg_dn[k + 3] = 0.5 * grad_m[k].dot(normal);
        }

        let mut out = [[0.0; 6]; 6];
        for (x, w) in rule.iter() {
            let phi_p = plus.mesh.barycentric(plus.cell, x);
            let phi_m = minus.mesh.barycentric(minus.cell, x);
            let mut jump = [0.0; 6];
            for k in 0..3 {
                jump[k] = phi_p[k];
                jump[k + 3] = -phi_m[k];
            }

            for i in 0..6 {
                for j in 0..6 {
                    out[i][j] += w
                        * (-avg_dn[j] * jump[i] - avg_dn[i] * jump[j] + sigma * jump[i] * jump[j]);
                }
            }
        }
        out
    }

    pub fn overlap_tensor(&self, plus: Side<'_>, minus: Side<'_>, rule: &QuadratureRule) -> InterfaceTensor {
        let grad_p = plus.mesh.basis_gradients(plus.cell);
        let grad_m = minus.mesh.basis_gradients(minus.cell);
        let mut jump_grad = [Point::default(); 6];
        for k in 0..3 {
            jump_grad[k] = grad_p[k];
            jump_grad[k + 3] = -grad_m[k];
        }

        // Gradients are constant per cell, so only the measure matters.
        let measure = self.overlap_weight * rule.total_weight();
        let mut out = [[0.0; 6]; 6];
        for i in 0..6 {
            for j in 0..6 {
                out[i][j] = measure * jump_grad[i].dot(jump_grad[j]);
            }
        }
        out
    }
}

/// `L(v) = ∫ f v`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadForm {
    pub source: Source,
}

impl LoadForm {
    pub fn new(source: Source) -> Self {
        Self { source }
    }

    pub fn cell_vector(&self, mesh: &Mesh, cell: usize, rule: &QuadratureRule) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (x, w) in rule.iter() {
            let f = self.source.eval(x);
            let phi = mesh.barycentric(cell, x);
            for k in 0..3 {
                out[k] += w * f * phi[k];
            }
        }
        out
    }
}
