use mmesh_core::QuadratureError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MultiMeshError {
    #[error("multimesh has no parts")]
    Empty,

    #[error("multimesh has not been built; call build() first")]
    NotBuilt,

    #[error("part {part} out of range (multimesh has {num_parts} parts)")]
    PartOutOfRange { part: usize, num_parts: usize },

    #[error("cell {cell} out of range for part {part} ({num_cells} cells)")]
    CellOutOfRange {
        part: usize,
        cell: usize,
        num_cells: usize,
    },

    /// Inclusion–exclusion over more stacked parts than supported.
    #[error("cell {cell} of part {part} is cut by {count} parts (maximum {max})")]
    TooManyCuttingParts {
        part: usize,
        cell: usize,
        count: usize,
        max: usize,
    },

    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
}
