use mmesh_core::QuadratureError;
use thiserror::Error;

use crate::la::SolverError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FemError {
    #[error("multimesh must be built before creating a function space")]
    MultiMeshNotBuilt,

    #[error("unsupported polynomial degree {0}; only P1 is available")]
    UnsupportedDegree(usize),

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("nested matrix needs a square number of blocks, got {0}")]
    NotPerfectSquare(usize),

    #[error("block row {0} of nested matrix has no blocks to infer its size from")]
    EmptyBlockRow(usize),

    #[error("block column {0} of nested matrix has no blocks to infer its size from")]
    EmptyBlockColumn(usize),

    #[error("block ({row}, {col}) of nested matrix is {found_rows}x{found_cols}, expected {expected_rows}x{expected_cols}")]
    BlockSizeMismatch {
        row: usize,
        col: usize,
        expected_rows: usize,
        expected_cols: usize,
        found_rows: usize,
        found_cols: usize,
    },

    #[error(transparent)]
    Quadrature(#[from] QuadratureError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}
