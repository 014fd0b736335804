//! Parametric component generators.
//!
//! Each generator turns a normalized parameter set into a closed, outward
//! wound mesh in the component's local frame (X longitudinal, Y spanwise,
//! Z up). Placement happens later in [`crate::assembly`].

use std::collections::HashMap;

use shared::{AeroParameters, ComponentCategory};

use crate::error::GenerationError;
use crate::mesh::Mesh;
use crate::settings::GeneratorSettings;

mod engine;
mod fuselage;
pub(crate) mod surface;
mod wing;

pub use engine::EngineGenerator;
pub use fuselage::FuselageGenerator;
pub use wing::WingGenerator;

/// Builds a mesh for one component category.
pub trait ComponentGenerator: Send + Sync {
    fn category(&self) -> ComponentCategory;

    fn generate(&self, params: &AeroParameters) -> Result<Mesh, GenerationError>;
}

/// Category → generator lookup.
///
/// [`GeneratorRegistry::new`] registers the three built-in generators;
/// callers may replace any of them with [`GeneratorRegistry::register`].
pub struct GeneratorRegistry {
    generators: HashMap<ComponentCategory, Box<dyn ComponentGenerator>>,
}

impl GeneratorRegistry {
    pub fn new(settings: GeneratorSettings) -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(WingGenerator::new(settings.clone())));
        registry.register(Box::new(FuselageGenerator::new(settings.clone())));
        registry.register(Box::new(EngineGenerator::new(settings)));
        registry
    }

    pub fn empty() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Register a generator, replacing any previous one for the same category.
    pub fn register(&mut self, generator: Box<dyn ComponentGenerator>) {
        self.generators.insert(generator.category(), generator);
    }

    pub fn get(&self, category: ComponentCategory) -> Option<&dyn ComponentGenerator> {
        self.generators.get(&category).map(|g| g.as_ref())
    }

    pub fn generate(
        &self,
        category: ComponentCategory,
        params: &AeroParameters,
    ) -> Result<Mesh, GenerationError> {
        let generator = self
            .get(category)
            .ok_or(GenerationError::Unregistered(category))?;
        let mesh = generator.generate(params)?;
        tracing::debug!(
            %category,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "generated component mesh"
        );
        Ok(mesh)
    }
}

impl Default for GeneratorRegistry {
    fn default() -> Self {
        Self::new(GeneratorSettings::default())
    }
}

/// Reject non-finite or non-positive dimensions before meshing.
pub(crate) fn require_positive(
    category: ComponentCategory,
    field: &'static str,
    value: f64,
) -> Result<f64, GenerationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GenerationError::InvalidDimension {
            category,
            field,
            value,
        })
    }
}
