//! Layered configuration for the marking demo.
//!
//! Priority (highest to lowest):
//! 1. CLI flags (merged by the binary on top of [`load`])
//! 2. `MMESH_*` environment variables
//! 3. Explicit config path, else `./mmesh.toml` when present
//! 4. Default values

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use mmesh_core::geometry::Point;
use mmesh_fem::SolverMethod;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::version::SUPPORTED_DEGREE;

/// Project-level config file picked up from the working directory.
pub const PROJECT_CONFIG: &str = "mmesh.toml";

/// Prefix of environment overrides, e.g. `MMESH_RESOLUTION=32`.
pub const ENV_PREFIX: &str = "MMESH_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Cells per side of the background unit square.
    pub resolution: usize,
    pub center: Point,
    pub inner_radius: f64,
    pub outer_radius: f64,
    /// Annulus mesh file; generated when absent.
    pub annulus_mesh: Option<PathBuf>,
    pub annulus_radial: usize,
    pub annulus_angular: usize,
    pub degree: usize,
    /// Interface penalty β.
    pub penalty: f64,
    /// Overlap weight γ.
    pub overlap_weight: f64,
    pub quadrature_degree: usize,
    pub solver: SolverMethod,
    pub output_dir: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            resolution: 16,
            center: Point::new(0.5, 0.5),
            inner_radius: 0.2,
            outer_radius: 0.41,
            annulus_mesh: None,
            annulus_radial: 4,
            annulus_angular: 64,
            degree: 1,
            penalty: 10.0,
            overlap_weight: 1.0,
            quadrature_degree: 2,
            solver: SolverMethod::Lu,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl DemoConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));
        if self.degree != SUPPORTED_DEGREE {
            return invalid(format!("degree {} is not supported; only P1 is available", self.degree));
        }
        if self.resolution == 0 {
            return invalid("resolution must be at least 1".to_string());
        }
        if !(self.inner_radius > 0.0) || !(self.outer_radius > 0.0) {
            return invalid(format!(
                "radii must be positive (inner {}, outer {})",
                self.inner_radius, self.outer_radius
            ));
        }
        if self.inner_radius >= self.outer_radius {
            return invalid(format!(
                "inner radius {} must be smaller than outer radius {}",
                self.inner_radius, self.outer_radius
            ));
        }
        if self.annulus_radial == 0 || self.annulus_angular < 3 {
            return invalid(format!(
                "annulus needs at least 1 radial layer and 3 sectors (got {} x {})",
                self.annulus_radial, self.annulus_angular
            ));
        }
        if !(self.penalty > 0.0) {
            return invalid(format!("penalty must be positive (got {})", self.penalty));
        }
        if !(self.overlap_weight >= 0.0) {
            return invalid(format!("overlap weight must be non-negative (got {})", self.overlap_weight));
        }
        Ok(())
    }
}

/// Defaults, then the config file, then the environment.
pub fn figment(config_path: Option<&Path>) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(DemoConfig::default()));

    match config_path {
        Some(path) => figment = figment.merge(Toml::file(path)),
        None => {
            let project = PathBuf::from(PROJECT_CONFIG);
            if project.exists() {
                figment = figment.merge(Toml::file(project));
            }
        }
    }

    figment.merge(Env::prefixed(ENV_PREFIX))
}

/// Load and validate the layered configuration.
///
/// An explicit `config_path` must exist.
pub fn load(config_path: Option<&Path>) -> Result<DemoConfig, ConfigError> {
    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::Invalid(format!("config file {} does not exist", path.display())));
        }
    }
    let config: DemoConfig = figment(config_path).extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
