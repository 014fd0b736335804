//! Engine nacelle generator.
//!
//! The nacelle is an annular tube along +Y centred on the origin: a tapered
//! outer skin and a straight inner duct, joined at the intake and exhaust lips.
//! Assembly rotates it onto the flight axis.

use shared::{AeroParameters, ComponentCategory};

use super::surface::{circle, Axis, Ring, SurfaceBuilder};
use super::{require_positive, ComponentGenerator};
use crate::error::GenerationError;
use crate::mesh::Mesh;
use crate::settings::GeneratorSettings;

/// Outer skin stations as (axial fraction, radius fraction).
const OUTER_PROFILE: [(f64, f64); 4] = [(0.0, 0.92), (1.0 / 3.0, 1.0), (2.0 / 3.0, 1.0), (1.0, 0.85)];

const MIN_INNER_RATIO: f64 = 0.05;
const MAX_INNER_RATIO: f64 = 0.8;

pub struct EngineGenerator {
    settings: GeneratorSettings,
}

impl EngineGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }
}

impl ComponentGenerator for EngineGenerator {
    fn category(&self) -> ComponentCategory {
        ComponentCategory::Engine
    }

    fn generate(&self, params: &AeroParameters) -> Result<Mesh, GenerationError> {
        let category = ComponentCategory::Engine;
        let length = require_positive(
            category,
            "engine_length",
            params.engine_length.unwrap_or(self.settings.default_engine_length),
        )?;
        let diameter = require_positive(
            category,
            "engine_diameter",
            params.engine_diameter.unwrap_or(self.settings.default_engine_diameter),
        )?;
        let radius = diameter / 2.0;
        let inner = radius
            * self
                .settings
                .nacelle_inner_ratio
                .clamp(MIN_INNER_RATIO, MAX_INNER_RATIO);
        let segments = self.settings.radial_segments.max(3);
        let start = -length / 2.0;

        let mut builder = SurfaceBuilder::new();
        let mut rings: Vec<Ring> = OUTER_PROFILE
            .iter()
            .map(|&(s, r)| builder.ring(&circle(Axis::Y, start + s * length, radius * r, segments)))
            .collect();
        // duct runs back from exhaust to intake to close the loop
        rings.push(builder.ring(&circle(Axis::Y, start + length, inner, segments)));
        rings.push(builder.ring(&circle(Axis::Y, start, inner, segments)));

        builder.stitch_all(&rings, true);
        builder
            .build()
            .map_err(|source| GenerationError::Mesh { category, source })
    }
}
