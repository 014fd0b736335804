//! Fuselage generator: a body of revolution along +X with optional tail surfaces.

use glam::{DAffine3, DQuat, DVec3};
use shared::{AeroParameters, ComponentCategory};

use super::surface::{circle, Axis, Ring, SurfaceBuilder};
use super::{require_positive, ComponentGenerator};
use crate::error::GenerationError;
use crate::mesh::Mesh;
use crate::settings::GeneratorSettings;

/// Longitudinal radius profile, as fractions of length and maximum radius.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BodyProfile {
    /// Length of the elliptic nose section
    nose: f64,
    /// Length of the tapering tail section
    tail: f64,
    /// Radius at the tail cap
    tail_radius: f64,
}

impl BodyProfile {
    fn for_kind(kind: Option<&str>) -> Self {
        let kind = kind.unwrap_or("commercial").to_lowercase();
        if kind.contains("fighter") {
            Self { nose: 0.3, tail: 0.2, tail_radius: 0.5 }
        } else if kind.contains("cargo") {
            Self { nose: 0.1, tail: 0.3, tail_radius: 0.35 }
        } else {
            Self { nose: 0.15, tail: 0.25, tail_radius: 0.25 }
        }
    }

    /// Radius fraction at chord position `t` in [0, 1].
    fn radius_at(&self, t: f64) -> f64 {
        if t < self.nose {
            let u = 1.0 - t / self.nose;
            (1.0 - u * u).max(0.0).sqrt()
        } else if t > 1.0 - self.tail {
            let u = (t - (1.0 - self.tail)) / self.tail;
            1.0 + (self.tail_radius - 1.0) * u
        } else {
            1.0
        }
    }
}

pub struct FuselageGenerator {
    settings: GeneratorSettings,
}

impl FuselageGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }
}

impl ComponentGenerator for FuselageGenerator {
    fn category(&self) -> ComponentCategory {
        ComponentCategory::Fuselage
    }

    fn generate(&self, params: &AeroParameters) -> Result<Mesh, GenerationError> {
        let category = ComponentCategory::Fuselage;
        let length = require_positive(
            category,
            "fuselage_length",
            params.fuselage_length.unwrap_or(self.settings.default_fuselage_length),
        )?;
        let diameter = require_positive(
            category,
            "fuselage_diameter",
            params.fuselage_diameter.unwrap_or(self.settings.default_fuselage_diameter),
        )?;
        let radius = diameter / 2.0;
        let profile = BodyProfile::for_kind(params.fuselage_type.as_deref());
        let stations = self.settings.fuselage_stations.max(2);
        let segments = self.settings.radial_segments.max(3);

        let mut builder = SurfaceBuilder::new();
        let nose = builder.point(DVec3::ZERO);
        let rings: Vec<Ring> = (1..=stations)
            .map(|i| {
                let t = i as f64 / stations as f64;
                let r = radius * profile.radius_at(t);
                builder.ring(&circle(Axis::X, t * length, r, segments))
            })
            .collect();

        builder.stitch_all(&rings, false);
        if let (Some(&first), Some(&last)) = (rings.first(), rings.last()) {
            builder.cap_start(nose, first);
            let tail = builder.ring_center(last);
            builder.cap_end(tail, last);
        }

        let body = builder
            .build()
            .map_err(|source| GenerationError::Mesh { category, source })?;

        let mut parts = vec![body];
        if params.has_vertical_stabilizer {
            parts.push(vertical_stabilizer(length, radius, &profile));
        }
        if params.has_horizontal_stabilizer {
            parts.push(horizontal_stabilizer(length, radius));
        }

        if parts.len() == 1 {
            return Ok(parts.remove(0));
        }
        Mesh::merge(&parts).map_err(|source| GenerationError::Mesh { category, source })
    }
}

/// Fin box standing on the tail cone.
fn vertical_stabilizer(length: f64, radius: f64, profile: &BodyProfile) -> Mesh {
    let chord = 0.15 * length;
    let height = 1.5 * radius;
    let thickness = 0.08 * radius;
    let root_z = radius * profile.radius_at(0.9) * 0.5;
    box_mesh(
        DVec3::new(chord, thickness, height),
        DVec3::new(0.9 * length, 0.0, root_z + height / 2.0),
    )
}

/// Tailplane box through the tail cone.
fn horizontal_stabilizer(length: f64, radius: f64) -> Mesh {
    box_mesh(
        DVec3::new(0.12 * length, 4.0 * radius, 0.06 * radius),
        DVec3::new(0.9 * length, 0.0, 0.0),
    )
}

fn box_mesh(size: DVec3, center: DVec3) -> Mesh {
    Mesh::unit_cube().transformed(DAffine3::from_scale_rotation_translation(
        size,
        DQuat::IDENTITY,
        center,
    ))
}
