//! `mmesh-io` is the single supported public entrypoint for the multimesh
//! engine: mesh generation and DOLFIN XML input, cut-cell classification,
//! Nitsche assembly and solves, XDMF output, and the marking demo pipeline.
//!
//! This crate intentionally contains **no** plotting and no MPI logic.

// -----------------------------------------------------------------------------
// Public API contract
// -----------------------------------------------------------------------------
//
// Consumers SHOULD import from `mmesh_io::prelude::*`.
// Anything not re-exported via the prelude is considered internal and may change
// without notice.

// Re-export the mesh model.
#[doc(hidden)]
pub mod core {
    pub use mmesh_core::geometry::{Aabb, Point, DEFAULT_TOLERANCE};
    pub use mmesh_core::markers::MeshFunction;
    pub use mmesh_core::quadrature::{polygon_rule, segment_rule, triangle_rule};
    pub use mmesh_core::{BoundaryFacet, Mesh, MeshError, QuadratureError, QuadratureRule};
}

// Re-export the multimesh container.
#[doc(hidden)]
pub mod cut {
    pub use mmesh_cut::{
        BoundingBoxTree, CellKind, InterfaceRule, MultiMesh, MultiMeshError, MultiMeshOptions, OverlapRule,
        PartSummary,
    };
}

// Re-export spaces, forms, assembly and solvers.
#[doc(hidden)]
pub mod fem {
    pub use mmesh_fem::{
        assemble_matrix, assemble_vector, solve, AssemblyStats, BoundaryPredicate, FemError, LoadForm,
        MultiMeshDirichletBC, MultiMeshFunction, MultiMeshFunctionSpace, NestMatrix, NitscheForm, PartFunction,
        SolveInfo, SolveTelemetry, SolverError, SolverMethod, SolverOptions, Source, SparseMatrix, TripletMatrix,
    };
}

/// Layered demo configuration (defaults, TOML file, environment).
pub mod config;

/// The annulus marking demo pipeline.
pub mod demo;

pub mod error;

/// DOLFIN XML mesh reader and writer.
pub mod mesh_xml;

/// Format version constants.
pub mod version;

/// XDMF output.
pub mod xdmf;

/// Convenience prelude for consumers.
///
/// This is the **only supported** import surface for external users.
pub mod prelude {
    pub use crate::config::DemoConfig;
    pub use crate::core::{Mesh, MeshFunction, Point};
    pub use crate::cut::{CellKind, MultiMesh, MultiMeshOptions, PartSummary};
    pub use crate::demo::{build_marked_multimesh, run_marking_demo, DemoError, DemoFailure, DemoOutcome, MarkedMultiMesh};
    pub use crate::error::{ConfigError, MeshIoError};
    pub use crate::fem::{
        assemble_matrix, assemble_vector, solve, BoundaryPredicate, LoadForm, MultiMeshDirichletBC,
        MultiMeshFunction, MultiMeshFunctionSpace, NitscheForm, PartFunction, SolveTelemetry, SolverMethod,
        SolverOptions, Source,
    };
    pub use crate::mesh_xml::{read_mesh, write_mesh};
    pub use crate::xdmf::XdmfFile;
}
