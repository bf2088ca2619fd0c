mod common;

use mmesh_fem::{solve, SolverError, SolverMethod, SolverOptions, TripletMatrix, MAX_DENSE_LU_DIM};

fn options(method: SolverMethod) -> SolverOptions {
    SolverOptions { method, ..SolverOptions::default() }
}

#[test]
fn all_methods_agree_on_spd_system() {
    let n = 20;
    let a = common::laplacian_1d(n);
    let b: Vec<f64> = (0..n).map(|i| 1.0 + i as f64 * 0.1).collect();

    let mut reference = Vec::new();
    let info = solve(&a, &mut reference, &b, options(SolverMethod::Lu)).unwrap();
    assert_eq!(info.iterations, 0);
    assert!(info.relative_residual < 1e-12);

    for method in [SolverMethod::Bicgstab, SolverMethod::Cg] {
        let mut x = Vec::new();
        let info = solve(&a, &mut x, &b, options(method)).unwrap();
        assert_eq!(info.method, method);
        assert!(info.iterations > 0);
        let diff: f64 = x.iter().zip(&reference).map(|(xi, ri)| (xi - ri).powi(2)).sum::<f64>().sqrt();
        let scale: f64 = reference.iter().map(|r| r * r).sum::<f64>().sqrt();
        assert!(diff / scale < 1e-7, "{method}: relative error {}", diff / scale);
    }
}

#[test]
fn lu_pivots_on_zero_diagonal() {
    let mut t = TripletMatrix::new(2, 2);
    t.add(0, 1, 1.0);
    t.add(1, 0, 1.0);
    let a = t.into_csr();

    let mut x = Vec::new();
    solve(&a, &mut x, &[2.0, 3.0], SolverOptions::default()).unwrap();
    assert_eq!(x, vec![3.0, 2.0]);
}

#[test]
fn singular_matrix_is_reported() {
    let mut t = TripletMatrix::new(2, 2);
    t.add(0, 0, 1.0);
    t.add(0, 1, 1.0);
    t.add(1, 0, 2.0);
    t.add(1, 1, 2.0);
    let a = t.into_csr();

    let mut x = Vec::new();
    let err = solve(&a, &mut x, &[1.0, 2.0], SolverOptions::default()).unwrap_err();
    assert_eq!(err, SolverError::Singular { column: 1 });
}

#[test]
fn dimension_mismatch_is_reported() {
    let a = common::laplacian_1d(3);
    let mut x = Vec::new();
    let err = solve(&a, &mut x, &[1.0, 2.0], SolverOptions::default()).unwrap_err();
    assert_eq!(err, SolverError::DimensionMismatch { rows: 3, cols: 3, rhs: 2 });
}

#[test]
fn dense_lu_refuses_systems_above_its_limit() {
    let n = MAX_DENSE_LU_DIM + 1;
    let a = common::laplacian_1d(n);
    let b = vec![1.0; n];
    let mut x = Vec::new();
    let err = solve(&a, &mut x, &b, SolverOptions::default()).unwrap_err();
    assert_eq!(err, SolverError::TooLargeForDense { dim: n, max: MAX_DENSE_LU_DIM });
    assert!(err.to_string().contains("bicgstab"));
}

#[test]
fn iteration_limit_is_reported() {
    let a = common::laplacian_1d(50);
    let b = vec![1.0; 50];
    let mut x = Vec::new();
    let opts = SolverOptions {
        method: SolverMethod::Cg,
        max_iterations: 2,
        ..SolverOptions::default()
    };
    let err = solve(&a, &mut x, &b, opts).unwrap_err();
    assert!(matches!(err, SolverError::NotConverged { iterations: 2, .. }));
}

#[test]
fn method_names_parse() {
    assert_eq!("LU".parse::<SolverMethod>().unwrap(), SolverMethod::Lu);
    assert_eq!("default".parse::<SolverMethod>().unwrap(), SolverMethod::Lu);
    assert_eq!("bicgstab".parse::<SolverMethod>().unwrap(), SolverMethod::Bicgstab);
    assert_eq!(SolverMethod::Cg.to_string(), "cg");
    assert_eq!(
        "gmres".parse::<SolverMethod>().unwrap_err(),
        SolverError::UnknownMethod("gmres".to_string())
    );
}
