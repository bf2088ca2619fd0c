mod common;

use mmesh_core::Mesh;
use mmesh_cut::MultiMesh;
use mmesh_fem::{FemError, MultiMeshFunctionSpace, SparseMatrix};

#[test]
fn dofs_are_numbered_part_by_part() {
    let mm = common::square_with_patch();
    let space = MultiMeshFunctionSpace::new(&mm, 1).unwrap();

    assert_eq!(space.num_parts(), 2);
    assert_eq!(space.dim(), 81 + 42);
    assert_eq!(space.part_dofs(0), 0..81);
    assert_eq!(space.part_dofs(1), 81..123);
    assert_eq!(space.cell_dofs(1, 0), mm.part(1).cell(0).map(|v| v + 81));

    let (part, x) = space.dof_coordinate(81).unwrap();
    assert_eq!(part, 1);
    assert_eq!(x, mm.part(1).vertex(0));
    assert!(space.dof_coordinate(123).is_none());
}

#[test]
fn unbuilt_multimesh_is_rejected() {
    let mut mm = MultiMesh::new();
    mm.add(Mesh::unit_square(2, 2).unwrap());
    assert_eq!(MultiMeshFunctionSpace::new(&mm, 1).unwrap_err(), FemError::MultiMeshNotBuilt);
}

#[test]
fn only_p1_is_supported() {
    let mm = common::single_square(2);
    assert_eq!(MultiMeshFunctionSpace::new(&mm, 2).unwrap_err(), FemError::UnsupportedDegree(2));
}

#[test]
fn vertices_of_covered_cells_only_are_inactive() {
    let mm = common::square_with_patch();
    let space = MultiMeshFunctionSpace::new(&mm, 1).unwrap();
    // The covered block spans x in [0.25, 0.75] and y in [0.375, 0.625];
    // only its three interior vertices lose every active cell.
    assert_eq!(space.inactive_dofs(), vec![39, 40, 41]);
}

#[test]
fn locking_inactive_dofs_sets_identity_rows() {
    let mm = common::square_with_patch();
    let space = MultiMeshFunctionSpace::new(&mm, 1).unwrap();
    let (mut a, _) = mmesh_fem::assemble_matrix(&space, &Default::default());
    let mut b = vec![1.0; space.dim()];

    let locked = space.lock_inactive_dofs(&mut a, &mut b).unwrap();
    assert_eq!(locked, 3);
    for dof in [39, 40, 41] {
        assert_eq!(a.get(dof, dof), 1.0);
        let (_, vals) = a.row(dof);
        assert_eq!(vals.iter().filter(|v| **v != 0.0).count(), 1);
        assert_eq!(b[dof], 0.0);
    }
    assert_eq!(b[0], 1.0);
}

#[test]
fn locking_checks_dimensions() {
    let mm = common::single_square(2);
    let space = MultiMeshFunctionSpace::new(&mm, 1).unwrap();
    let mut a = SparseMatrix::identity(3);
    let mut b = vec![0.0; 3];
    assert_eq!(
        space.lock_inactive_dofs(&mut a, &mut b).unwrap_err(),
        FemError::DimensionMismatch { expected: 9, found: 3 }
    );
}
