use serde::{Deserialize, Serialize};

use mmesh_cut::PartSummary;

use crate::assemble::AssemblyStats;
use crate::la::SolveInfo;

/// Machine-readable telemetry for one multimesh solve.
///
/// Notes:
/// - Contains *no* wall-clock timestamps; only the elapsed duration.
/// - Mesh fingerprints allow runs to be compared across machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveTelemetry {
    /// Operation category, e.g. "run".
    pub op: String,

    /// Whether the operation succeeded.
    pub ok: bool,

    /// Elapsed time (milliseconds).
    pub elapsed_ms: u64,

    /// Number of parts in the multimesh.
    pub parts: usize,

    /// Per-part classification counts and measures.
    pub part_summaries: Vec<PartSummary>,

    /// Fingerprint of each part's mesh, in part order.
    pub mesh_fingerprints: Vec<String>,

    /// Global number of degrees of freedom.
    pub dofs: usize,

    pub inactive_dofs: usize,

    /// Dofs constrained by Dirichlet conditions.
    pub bc_dofs: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly: Option<AssemblyStats>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolveInfo>,

    /// Optional machine-readable error code (when failed).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl SolveTelemetry {
    pub fn new(op: &str) -> Self {
        Self {
            op: op.to_string(),
            ok: false,
            elapsed_ms: 0,
            parts: 0,
            part_summaries: Vec::new(),
            mesh_fingerprints: Vec::new(),
            dofs: 0,
            inactive_dofs: 0,
            bc_dofs: 0,
            assembly: None,
            solver: None,
            error_code: None,
        }
    }

    pub fn total_cells(&self) -> usize {
        self.part_summaries.iter().map(|s| s.cells).sum()
    }

    pub fn total_visible_area(&self) -> f64 {
        self.part_summaries.iter().map(|s| s.visible_area).sum()
    }
}
