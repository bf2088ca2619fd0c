#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

Overlapping mesh parts: collision detection, cut-cell classification and
cut-cell / interface / overlap quadrature.

Do NOT depend on this crate directly.
Use `mmesh-io` instead.
"#]

pub mod collision;
pub mod error;
pub mod integrator;
pub mod multimesh;

pub use collision::BoundingBoxTree;
pub use error::MultiMeshError;
pub use multimesh::{CellKind, InterfaceRule, MultiMesh, MultiMeshOptions, OverlapRule, PartSummary};
