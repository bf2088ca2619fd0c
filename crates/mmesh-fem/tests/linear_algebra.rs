mod common;

use mmesh_fem::{FemError, NestMatrix, SparseMatrix, TripletMatrix};
use proptest::prelude::*;

#[test]
fn triplets_sum_duplicates_and_keep_diagonal() {
    let mut t = TripletMatrix::new(3, 3);
    t.add(0, 1, 2.0);
    t.add(0, 1, 3.0);
    t.add(2, 0, -1.0);
    let m = t.into_csr();

    assert_eq!(m.get(0, 1), 5.0);
    assert_eq!(m.get(2, 0), -1.0);
    assert_eq!(m.get(1, 2), 0.0);
    // Three structural diagonal entries plus two off-diagonal ones.
    assert_eq!(m.nnz(), 5);
    assert_eq!(m.diagonal(), vec![0.0, 0.0, 0.0]);
}

#[test]
fn add_block_is_row_major() {
    let mut t = TripletMatrix::new(2, 3);
    t.add_block(&[1, 0], &[0, 2], &[1.0, 2.0, 3.0, 4.0]);
    let m = t.into_csr();
    assert_eq!(m.to_dense(), vec![3.0, 0.0, 4.0, 1.0, 0.0, 2.0]);
}

#[test]
fn ident_rows_replaces_rows_only() {
    let mut m = common::laplacian_1d(4);
    m.ident_rows(&[0, 3]);
    assert_eq!(m.get(0, 0), 1.0);
    assert_eq!(m.get(0, 1), 0.0);
    assert_eq!(m.get(1, 0), -1.0);
    assert_eq!(m.get(3, 2), 0.0);
    assert_eq!(m.get(3, 3), 1.0);
    assert!(!m.is_symmetric(0.0));
}

#[test]
fn nest_mult_matches_monolithic_mult() {
    let m = common::laplacian_1d(7);
    let nest = NestMatrix::from_split(&m, &[0..3, 3..7]);
    assert_eq!(nest.num_block_rows(), 2);
    assert_eq!(nest.size(0), 7);
    assert_eq!(nest.size(1), 7);
    assert_eq!(nest.block_dofs(1), 3..7);

    let x: Vec<f64> = (0..7).map(|i| (i as f64).sin() + 0.5).collect();
    let y_nest = nest.mult(&x).unwrap();
    let y = m.mult(&x);
    for (a, b) in y_nest.iter().zip(&y) {
        assert!((a - b).abs() < 1e-14);
    }

    // Tridiagonal: each off-diagonal block holds exactly one coupling.
    assert_eq!(nest.block_nnz(), vec![7, 1, 1, 10]);
    assert_eq!(nest.split_vector(&x)[0], x[..3].to_vec());
}

#[test]
fn nest_rejects_non_square_block_count() {
    let blocks = vec![Some(SparseMatrix::identity(2)), None, None];
    assert_eq!(NestMatrix::new(blocks).unwrap_err(), FemError::NotPerfectSquare(3));
}

#[test]
fn nest_rejects_inconsistent_block_sizes() {
    let blocks = vec![
        Some(SparseMatrix::identity(2)),
        Some(SparseMatrix::zeros(2, 3)),
        Some(SparseMatrix::zeros(3, 2)),
        Some(SparseMatrix::identity(2)),
    ];
    let err = NestMatrix::new(blocks).unwrap_err();
    assert!(matches!(err, FemError::BlockSizeMismatch { row: 1, col: 1, .. }));
}

#[test]
fn nest_needs_a_block_in_every_row() {
    let blocks = vec![Some(SparseMatrix::identity(2)), None, None, None];
    assert!(matches!(NestMatrix::new(blocks), Err(FemError::EmptyBlockRow(1))));
}

#[test]
fn nest_needs_a_block_in_every_column() {
    let blocks = vec![Some(SparseMatrix::identity(2)), None, Some(SparseMatrix::zeros(3, 2)), None];
    assert!(matches!(NestMatrix::new(blocks), Err(FemError::EmptyBlockColumn(1))));
}

#[test]
fn nest_mult_checks_length() {
    let nest = NestMatrix::new(vec![Some(SparseMatrix::identity(2))]).unwrap();
    assert_eq!(
        nest.mult(&[1.0]).unwrap_err(),
        FemError::DimensionMismatch { expected: 2, found: 1 }
    );
}

fn triplets() -> impl Strategy<Value = (usize, Vec<(usize, usize, f64)>)> {
    (1usize..12).prop_flat_map(|n| {
        let entry = (0..n, 0..n, -10.0f64..10.0);
        (Just(n), proptest::collection::vec(entry, 0..60))
    })
}

proptest! {
    #[test]
    fn csr_matches_dense_accumulation((n, entries) in triplets()) {
        let mut dense = vec![0.0; n * n];
        let mut t = TripletMatrix::new(n, n);
        for &(i, j, v) in &entries {
            dense[i * n + j] += v;
            t.add(i, j, v);
        }
        let m = t.into_csr();
        for (a, b) in m.to_dense().iter().zip(&dense) {
            prop_assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn nest_mult_matches_for_any_split((n, entries) in triplets(), cut in 0usize..12) {
        let mut t = TripletMatrix::new(n, n);
        for &(i, j, v) in &entries {
            t.add(i, j, v);
        }
        let m = t.into_csr();
        let cut = cut.min(n);
        let nest = NestMatrix::from_split(&m, &[0..cut, cut..n]);

        let x: Vec<f64> = (0..n).map(|i| 1.0 + i as f64).collect();
        let y = m.mult(&x);
        for (a, b) in nest.mult(&x).unwrap().iter().zip(&y) {
            prop_assert!((a - b).abs() < 1e-9);
        }
    }
}
