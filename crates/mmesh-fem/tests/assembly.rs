mod common;

use mmesh_fem::{
    assemble_matrix, assemble_vector, LoadForm, MultiMeshFunctionSpace, NestMatrix, NitscheForm, Source,
};

#[test]
fn single_part_matrix_is_the_standard_stiffness_matrix() {
    let mm = common::single_square(2);
    let space = MultiMeshFunctionSpace::new(&mm, 1).unwrap();
    let (a, stats) = assemble_matrix(&space, &NitscheForm::default());

    assert_eq!(stats.uncut_cells, 8);
    assert_eq!(stats.cut_cells, 0);
    assert_eq!(stats.interface_points, 0);
    // Center vertex of a 2x2 right-diagonal grid: 4 on the diagonal, -1 to
    // its four axis neighbours.
    assert!((a.get(4, 4) - 4.0).abs() < 1e-12);
    for n in [1, 3, 5, 7] {
        assert!((a.get(4, n) + 1.0).abs() < 1e-12);
    }
    assert!(a.get(4, 0).abs() < 1e-12);
}

#[test]
fn multimesh_matrix_is_symmetric_and_annihilates_constants() {
    let mm = common::square_with_patch();
    let space = MultiMeshFunctionSpace::new(&mm, 1).unwrap();
    let (a, stats) = assemble_matrix(&space, &NitscheForm::default());

    assert!(stats.cut_cells > 0);
    assert!(stats.interface_points > 0);
    assert!(stats.overlap_points > 0);
    assert_eq!(stats.nnz, a.nnz());
    assert!(a.is_symmetric(1e-10));

    let ones = vec![1.0; space.dim()];
    for (i, v) in a.mult(&ones).iter().enumerate() {
        assert!(v.abs() < 1e-9, "row {i} sums to {v}");
    }
}

#[test]
fn parts_are_coupled_only_through_interface_and_overlap_terms() {
    let mm = common::square_with_patch();
    let space = MultiMeshFunctionSpace::new(&mm, 1).unwrap();

    let (a, _) = assemble_matrix(&space, &NitscheForm::default());
    let nest = NestMatrix::from_split(&a, &space.part_ranges());
    assert!(nest.block(0, 1).is_some());
    assert!(nest.block(1, 0).is_some());

    let x: Vec<f64> = (0..space.dim()).map(|i| (i as f64 * 0.37).cos()).collect();
    let y = a.mult(&x);
    for (u, v) in nest.mult(&x).unwrap().iter().zip(&y) {
        assert!((u - v).abs() < 1e-10);
    }
}

#[test]
fn load_vector_integrates_over_the_visible_domain() {
    let mm = common::square_with_patch();
    let space = MultiMeshFunctionSpace::new(&mm, 1).unwrap();
    let b = assemble_vector(&space, &LoadForm::new(Source::Constant(1.0))).unwrap();

    let total: f64 = b.iter().sum();
    assert!((total - 1.0).abs() < 1e-10, "total load {total}");

    // Interior vertices of covered cells receive nothing.
    for dof in space.inactive_dofs() {
        assert_eq!(b[dof], 0.0);
    }
}

#[test]
fn load_vector_integrates_linear_sources_exactly() {
    let mm = common::square_with_patch();
    let space = MultiMeshFunctionSpace::new(&mm, 1).unwrap();
    let b = assemble_vector(&space, &LoadForm::new(Source::Function(|p| p.x))).unwrap();

    let total: f64 = b.iter().sum();
    assert!((total - 0.5).abs() < 1e-10, "integral of x over the unit square: {total}");
}
