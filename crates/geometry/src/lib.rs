// Aircraft component geometry: parameter normalization, category resolution,
// parametric generators, volume estimation, assembly and export.
// The HTTP layer lives in the server crate.

pub mod assembly;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod generators;
pub mod hull;
pub mod mesh;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod resolve;
pub mod settings;
pub mod validation;
pub mod volume;

pub use error::{GenerationError, MeshError, ValidationError};
pub use generators::{ComponentGenerator, GeneratorRegistry};
pub use mesh::Mesh;
pub use settings::GeneratorSettings;
