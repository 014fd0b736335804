//! Wing panel generator.
//!
//! Produces the starboard half of the wing: a symmetric NACA 4-digit section
//! lofted from the root (y = 0) to the tip (y = span / 2), with linear taper,
//! leading-edge sweep and dihedral. The left half comes from mirroring during
//! assembly.

use glam::DVec3;
use shared::{AeroParameters, ComponentCategory};

use super::surface::{Ring, SurfaceBuilder};
use super::{require_positive, ComponentGenerator};
use crate::error::GenerationError;
use crate::mesh::Mesh;
use crate::settings::GeneratorSettings;

pub struct WingGenerator {
    settings: GeneratorSettings,
}

impl WingGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }
}

impl ComponentGenerator for WingGenerator {
    fn category(&self) -> ComponentCategory {
        ComponentCategory::Wing
    }

    fn generate(&self, params: &AeroParameters) -> Result<Mesh, GenerationError> {
        let category = ComponentCategory::Wing;
        let span = require_positive(category, "span", params.span)?;
        let root = require_positive(category, "root_chord", params.root_chord)?;
        let tip = require_positive(category, "tip_chord", params.tip_chord.unwrap_or(root))?;
        let thickness = require_positive(category, "thickness", params.thickness)? / 100.0;

        let section = airfoil_section(thickness, self.settings.airfoil_points.max(4));
        let stations = self.settings.span_stations.max(1);
        let semi_span = span / 2.0;
        let sweep = params.sweep_angle.to_radians().tan();
        let dihedral = params.dihedral.to_radians().tan();

        let mut builder = SurfaceBuilder::new();
        let rings: Vec<Ring> = (0..=stations)
            .map(|j| {
                let s = j as f64 / stations as f64;
                let y = semi_span * s;
                let chord = root + (tip - root) * s;
                let leading_edge = DVec3::new(y * sweep, y, y * dihedral);
                let points: Vec<DVec3> = section
                    .iter()
                    .map(|&(x, z)| leading_edge + DVec3::new(x * chord, 0.0, z * chord))
                    .collect();
                builder.ring(&points)
            })
            .collect();

        builder.stitch_all(&rings, false);
        if let (Some(&root_ring), Some(&tip_ring)) = (rings.first(), rings.last()) {
            let root_center = builder.ring_center(root_ring);
            builder.cap_start(root_center, root_ring);
            let tip_center = builder.ring_center(tip_ring);
            builder.cap_end(tip_center, tip_ring);
        }

        builder
            .build()
            .map_err(|source| GenerationError::Mesh { category, source })
    }
}

/// Half-thickness of a symmetric NACA 4-digit section at chord fraction `x`.
///
/// Uses the closed trailing-edge coefficient (-0.1036), so `y(1) = 0`.
fn naca_half_thickness(t: f64, x: f64) -> f64 {
    5.0 * t
        * (0.2969 * x.sqrt() - 0.1260 * x - 0.3516 * x * x + 0.2843 * x.powi(3)
            - 0.1036 * x.powi(4))
}

/// Closed loop of (chord, thickness) pairs in unit-chord coordinates.
///
/// Upper surface from trailing to leading edge, then lower surface back,
/// sharing the single leading- and trailing-edge points. Cosine spacing
/// clusters points at both edges.
fn airfoil_section(t: f64, n: u32) -> Vec<(f64, f64)> {
    let xs: Vec<f64> = (0..=n)
        .map(|i| 0.5 * (1.0 - (std::f64::consts::PI * i as f64 / n as f64).cos()))
        .collect();

    let upper = xs.iter().rev().map(|&x| (x, naca_half_thickness(t, x).max(0.0)));
    let lower = xs[1..n as usize]
        .iter()
        .map(|&x| (x, -naca_half_thickness(t, x).max(0.0)));
    upper.chain(lower).collect()
}
