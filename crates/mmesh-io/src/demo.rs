//! The annulus marking demo: a background square with a donut mesh on top,
//! whose hole is removed from the background by marking cells covered.

use std::path::PathBuf;
use std::time::Instant;

use mmesh_core::markers::MeshFunction;
use mmesh_core::{Mesh, MeshError};
use mmesh_cut::{MultiMesh, MultiMeshError, MultiMeshOptions};
use mmesh_fem::{
    assemble_matrix, assemble_vector, solve, BoundaryPredicate, FemError, LoadForm, MultiMeshDirichletBC,
    MultiMeshFunction, MultiMeshFunctionSpace, NitscheForm, SolveTelemetry, SolverError, SolverOptions, Source,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DemoConfig;
use crate::error::{ConfigError, MeshIoError};
use crate::mesh_xml::read_mesh;
use crate::xdmf::XdmfFile;

/// Marker value of background cells moved into the hole.
pub const HOLE_MARKER: usize = 1;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    MeshIo(#[from] MeshIoError),

    #[error(transparent)]
    MultiMesh(#[from] MultiMeshError),

    #[error(transparent)]
    Fem(#[from] FemError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl DemoError {
    /// Stable machine-readable code for telemetry.
    pub fn code(&self) -> &'static str {
        match self {
            DemoError::Config(_) => "config",
            DemoError::Mesh(_) => "mesh",
            DemoError::MeshIo(_) => "mesh_io",
            DemoError::MultiMesh(_) => "multimesh",
            DemoError::Fem(_) => "fem",
            DemoError::Solver(SolverError::Singular { .. }) => "singular",
            DemoError::Solver(SolverError::NotConverged { .. }) => "not_converged",
            DemoError::Solver(SolverError::TooLargeForDense { .. }) => "too_large_for_lu",
            DemoError::Solver(_) => "solver",
        }
    }
}

/// A built multimesh with the hole marked.
#[derive(Debug)]
pub struct MarkedMultiMesh {
    pub multimesh: MultiMesh,
    /// Background cell markers; [`HOLE_MARKER`] for cells moved into the hole.
    pub markers: MeshFunction<usize>,
}

/// A failed run, with the telemetry gathered up to the failing step.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct DemoFailure {
    pub telemetry: SolveTelemetry,
    #[source]
    pub error: DemoError,
}

impl DemoFailure {
    pub fn code(&self) -> &'static str {
        self.error.code()
    }
}

#[derive(Debug)]
pub struct DemoOutcome {
    pub telemetry: SolveTelemetry,
    /// Written files, in part order.
    pub outputs: Vec<PathBuf>,
}

fn annulus_mesh(config: &DemoConfig) -> Result<Mesh, DemoError> {
    match &config.annulus_mesh {
        Some(path) => Ok(read_mesh(path)?),
        None => Ok(Mesh::annulus(
            config.center,
            config.inner_radius,
            config.outer_radius,
            config.annulus_radial,
            config.annulus_angular,
        )?),
    }
}

/// Build the two-part multimesh and mark background cells whose midpoint is
/// closer to the inner than to the outer circle as covered.
pub fn build_marked_multimesh(config: &DemoConfig) -> Result<MarkedMultiMesh, DemoError> {
    config.validate()?;

    let background = Mesh::unit_square(config.resolution, config.resolution)?;
    let annulus = annulus_mesh(config)?;

    let mut multimesh = MultiMesh::with_options(MultiMeshOptions {
        quadrature_degree: config.quadrature_degree,
        ..MultiMeshOptions::default()
    });
    multimesh.add(background);
    multimesh.add(annulus);
    multimesh.build()?;

    let mut markers = MeshFunction::new(multimesh.part(0), 0usize);
    let mut hole = Vec::new();
    let mut candidates = multimesh.cut_cells(0);
    candidates.extend(multimesh.uncut_cells(0));
    for cell in candidates {
        let r = multimesh.part(0).midpoint(cell).distance(config.center);
        if (config.inner_radius - r).abs() < (config.outer_radius - r).abs() {
            markers[cell] = HOLE_MARKER;
            hole.push(cell);
        }
    }
    hole.sort_unstable();
    multimesh.mark_covered(0, &hole)?;
    info!(cells = hole.len(), "marked background cells inside the hole as covered");

    Ok(MarkedMultiMesh { multimesh, markers })
}

/// Run the full pipeline and write `u0.xdmf`, `u1.xdmf` into the output directory.
///
/// Telemetry is returned on both paths; on failure it carries the error code.
pub fn run_marking_demo(config: &DemoConfig) -> Result<DemoOutcome, DemoFailure> {
    let started = Instant::now();
    let mut telemetry = SolveTelemetry::new("run");

    let result = run_inner(config, &mut telemetry);
    telemetry.elapsed_ms = started.elapsed().as_millis() as u64;
    match result {
        Ok(outputs) => {
            telemetry.ok = true;
            Ok(DemoOutcome { telemetry, outputs })
        }
        Err(error) => {
            warn!(code = error.code(), %error, "marking demo failed");
            telemetry.error_code = Some(error.code().to_string());
            Err(DemoFailure { telemetry, error })
        }
    }
}

fn run_inner(config: &DemoConfig, telemetry: &mut SolveTelemetry) -> Result<Vec<PathBuf>, DemoError> {
    let MarkedMultiMesh { multimesh, .. } = build_marked_multimesh(config)?;
    telemetry.parts = multimesh.num_parts();
    telemetry.part_summaries = multimesh.summary();
    telemetry.mesh_fingerprints = multimesh.parts().iter().map(Mesh::fingerprint).collect();

    let space = MultiMeshFunctionSpace::new(&multimesh, config.degree)?;
    telemetry.dofs = space.dim();
    let form = NitscheForm { penalty: config.penalty, overlap_weight: config.overlap_weight };
    let (mut a, stats) = assemble_matrix(&space, &form);
    telemetry.assembly = Some(stats);
    let mut b = assemble_vector(&space, &LoadForm::new(Source::Constant(1.0)))?;

    let bc = MultiMeshDirichletBC::new(&space, Source::Constant(0.0), BoundaryPredicate::OnBoundary);
    telemetry.bc_dofs = bc.apply(&mut a, &mut b)?;
    telemetry.inactive_dofs = space.lock_inactive_dofs(&mut a, &mut b)?;

    let mut uh = MultiMeshFunction::new(&space);
    let options = SolverOptions { method: config.solver, ..SolverOptions::default() };
    telemetry.solver = Some(solve(&a, uh.vector_mut(), &b, options)?);

    let mut outputs = Vec::with_capacity(multimesh.num_parts());
    for part in 0..multimesh.num_parts() {
        let path = config.output_dir.join(format!("u{part}.xdmf"));
        let mut file = XdmfFile::create(&path)?;
        file.write(&uh.part(part), 0.0)?;
        file.close()?;
        outputs.push(path);
    }
    info!(dofs = telemetry.dofs, files = outputs.len(), "marking demo finished");
    Ok(outputs)
}
