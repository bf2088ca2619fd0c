use std::path::PathBuf;

use mmesh_core::MeshError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeshIoError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML: {0}")]
    Xml(String),

    #[error("invalid DOLFIN mesh file: {0}")]
    Format(String),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl MeshIoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MeshIoError::Io { path: path.into(), source }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
