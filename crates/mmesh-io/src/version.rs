//! Format and layout version constants written into output files.

/// XDMF schema version emitted by [`crate::xdmf::XdmfFile`].
pub const XDMF_VERSION: &str = "3.0";

/// Only P1 is implemented; configuration rejects anything else.
pub const SUPPORTED_DEGREE: usize = 1;

/// Crate version, reported by `mmesh --version` and in telemetry.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
