use thiserror::Error;

/// Errors raised while constructing or generating a mesh.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("mesh has no cells")]
    Empty,

    #[error("cell {cell} references vertex {vertex}, but the mesh only has {num_vertices} vertices")]
    VertexOutOfRange {
        cell: usize,
        vertex: usize,
        num_vertices: usize,
    },

    #[error("cell {cell} is degenerate (area {area:e})")]
    DegenerateCell { cell: usize, area: f64 },

    /// An edge shared by more than two cells.
    #[error("edge ({0}, {1}) is shared by more than two cells")]
    NonManifoldEdge(usize, usize),

    #[error("invalid mesh parameters: {0}")]
    InvalidParameters(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuadratureError {
    #[error("no {shape} quadrature scheme of degree {degree} (maximum {max})")]
    UnsupportedDegree {
        shape: &'static str,
        degree: usize,
        max: usize,
    },
}
