//! Sparse and nested matrices, and the linear solvers used on assembled systems.

pub mod nest;
pub mod solver;
pub mod sparse;

pub use nest::NestMatrix;
pub use solver::{solve, SolveInfo, MAX_DENSE_LU_DIM, SolverError, SolverMethod, SolverOptions};
pub use sparse::{SparseMatrix, TripletMatrix};
