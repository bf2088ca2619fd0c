#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

P1 function spaces, Nitsche forms, assembly, boundary conditions and linear
solvers over a built `MultiMesh`.

Do NOT depend on this crate directly.
Use `mmesh-io` instead.
"#]

pub mod assemble;
pub mod bc;
pub mod error;
pub mod form;
pub mod function;
pub mod function_space;
pub mod la;
pub mod telemetry;

pub use assemble::{assemble_matrix, assemble_vector, AssemblyStats};
pub use bc::{BoundaryPredicate, MultiMeshDirichletBC};
pub use error::FemError;
pub use form::{LoadForm, NitscheForm, Source};
pub use function::{MultiMeshFunction, PartFunction};
pub use function_space::MultiMeshFunctionSpace;
pub use la::{solve, NestMatrix, MAX_DENSE_LU_DIM, SolveInfo, SolverError, SolverMethod, SolverOptions, SparseMatrix, TripletMatrix};
pub use telemetry::SolveTelemetry;
