//! Volume estimation with layered fallbacks.
//!
//! 1. closed meshes: enclosed volume from the signed tetrahedra sum
//! 2. open meshes: convex hull volume
//! 3. anything at or below [`NEAR_ZERO_VOLUME`]: closed-form estimate from the
//!    parameters
//!
//! The result is always finite and strictly positive.

use std::f64::consts::PI;

use shared::{AeroParameters, ComponentCategory, VolumeMethod};

use crate::hull::convex_hull_volume;
use crate::mesh::Mesh;

/// Measured volumes at or below this are treated as degenerate.
pub const NEAR_ZERO_VOLUME: f64 = 0.001;

/// Lower bound for any reported volume.
pub const MIN_VOLUME: f64 = 1e-9;

const FUSELAGE_FILL: f64 = 0.7;
const ENGINE_FILL: f64 = 0.5;
const WING_FILL: f64 = 0.65;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeEstimate {
    pub value: f64,
    pub method: VolumeMethod,
    /// Raw measurement, kept when the closed form replaced it
    pub measured: Option<f64>,
}

impl VolumeEstimate {
    pub fn is_fallback(&self) -> bool {
        self.method == VolumeMethod::ClosedForm
    }
}

/// Estimate the volume of a single component mesh.
pub fn estimate(mesh: &Mesh, category: ComponentCategory, params: &AeroParameters) -> VolumeEstimate {
    with_fallback(mesh, || closed_form(category, params))
}

/// Estimate the volume of a compiled aircraft.
///
/// The closed-form fallback sums the estimates of the categories present, or
/// uses the wing estimate when none are known.
pub fn estimate_assembly(
    mesh: &Mesh,
    categories: &[ComponentCategory],
    params: &AeroParameters,
) -> VolumeEstimate {
    with_fallback(mesh, || {
        if categories.is_empty() {
            closed_form(ComponentCategory::Wing, params)
        } else {
            categories.iter().map(|&c| closed_form(c, params)).sum()
        }
    })
}

/// Measured volume and how it was obtained, without the closed-form fallback.
pub fn measure(mesh: &Mesh) -> Option<(f64, VolumeMethod)> {
    if mesh.is_empty() {
        return None;
    }
    if mesh.is_watertight() {
        Some((mesh.signed_volume().abs(), VolumeMethod::Enclosed))
    } else {
        convex_hull_volume(mesh.vertices()).map(|v| (v, VolumeMethod::ConvexHull))
    }
}

/// Parametric estimate for a category.
///
/// Fuselage and engine formulas need both of their dimensions; without them the
/// wing formula is used.
pub fn closed_form(category: ComponentCategory, params: &AeroParameters) -> f64 {
    let body = match category {
        ComponentCategory::Fuselage => params.fuselage_dimensions().map(|d| (d, FUSELAGE_FILL)),
        ComponentCategory::Engine => params.engine_dimensions().map(|d| (d, ENGINE_FILL)),
        ComponentCategory::Wing => None,
    };

    match body {
        Some(((length, diameter), fill)) => {
            let radius = diameter / 2.0;
            PI * radius * radius * length * fill
        }
        None => {
            let chord = params.mean_chord();
            params.span * chord * (params.thickness / 100.0 * chord) * WING_FILL
        }
    }
}

fn with_fallback(mesh: &Mesh, fallback: impl FnOnce() -> f64) -> VolumeEstimate {
    let measured = measure(mesh);
    let estimate = match measured {
        Some((value, method)) if value.is_finite() && value > NEAR_ZERO_VOLUME => {
            VolumeEstimate {
                value,
                method,
                measured: Some(value),
            }
        }
        _ => {
            tracing::debug!(
                measured = ?measured.map(|(v, _)| v),
                "measured volume unusable, using closed form"
            );
            VolumeEstimate {
                value: fallback(),
                method: VolumeMethod::ClosedForm,
                measured: measured.map(|(v, _)| v),
            }
        }
    };

    VolumeEstimate {
        value: floor(estimate.value),
        ..estimate
    }
}

fn floor(value: f64) -> f64 {
    if value.is_finite() && value > MIN_VOLUME {
        value
    } else {
        MIN_VOLUME
    }
}
