#![doc = r#"
⚠️ INTERNAL CRATE – NOT A STABLE API

Geometry, triangle meshes and quadrature for the multimesh engine.

Do NOT depend on this crate directly.
Use `mmesh-io` instead.
"#]

pub mod error;
pub mod geometry;
pub mod markers;
pub mod mesh;
pub mod quadrature;

pub use error::{MeshError, QuadratureError};
pub use geometry::{Aabb, Point};
pub use markers::MeshFunction;
pub use mesh::{BoundaryFacet, Mesh};
pub use quadrature::QuadratureRule;
