#![allow(dead_code)]

use mmesh_core::geometry::Point;
use mmesh_core::Mesh;
use mmesh_cut::MultiMesh;
use mmesh_fem::{
    assemble_matrix, assemble_vector, solve, BoundaryPredicate, LoadForm, MultiMeshDirichletBC,
    MultiMeshFunctionSpace, NitscheForm, SolveInfo, SolverOptions, Source,
};

pub fn single_square(n: usize) -> MultiMesh {
    let mut mm = MultiMesh::new();
    mm.add(Mesh::unit_square(n, n).unwrap());
    mm.build().unwrap();
    mm
}

/// Unit square with one rectangle on top, edges off the background grid.
pub fn square_with_patch() -> MultiMesh {
    let mut mm = MultiMesh::new();
    mm.add(Mesh::unit_square(8, 8).unwrap());
    mm.add(Mesh::rectangle(Point::new(0.23, 0.27), Point::new(0.81, 0.74), 6, 5).unwrap());
    mm.build().unwrap();
    mm
}

/// Same patch with its left edge on the background grid line x = 0.25.
pub fn square_with_aligned_patch() -> MultiMesh {
    let mut mm = MultiMesh::new();
    mm.add(Mesh::unit_square(8, 8).unwrap());
    mm.add(Mesh::rectangle(Point::new(0.25, 0.27), Point::new(0.81, 0.74), 6, 5).unwrap());
    mm.build().unwrap();
    mm
}

/// Solve `-Δu = 1` with `u = 0` on the exposed boundary and inactive dofs locked.
pub fn solve_poisson(space: &MultiMeshFunctionSpace<'_>, options: SolverOptions) -> (Vec<f64>, SolveInfo) {
    let (mut a, _) = assemble_matrix(space, &NitscheForm::default());
    let mut b = assemble_vector(space, &LoadForm::new(Source::Constant(1.0))).unwrap();
    let bc = MultiMeshDirichletBC::new(space, Source::Constant(0.0), BoundaryPredicate::OnBoundary);
    bc.apply(&mut a, &mut b).unwrap();
    space.lock_inactive_dofs(&mut a, &mut b).unwrap();

    let mut x = Vec::new();
    let info = solve(&a, &mut x, &b, options).unwrap();
    (x, info)
}

/// 1D Laplacian stencil, symmetric positive definite.
pub fn laplacian_1d(n: usize) -> mmesh_fem::SparseMatrix {
    let mut t = mmesh_fem::TripletMatrix::new(n, n);
    for i in 0..n {
        t.add(i, i, 2.0);
        if i > 0 {
            t.add(i, i - 1, -1.0);
        }
        if i + 1 < n {
            t.add(i, i + 1, -1.0);
        }
    }
    t.into_csr()
}
