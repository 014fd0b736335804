//! Generator settings

use serde::{Deserialize, Serialize};

/// Tessellation density and fallback dimensions for the built-in generators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Points per airfoil surface (upper and lower each)
    pub airfoil_points: u32,
    /// Spanwise stations along a wing panel
    pub span_stations: u32,
    /// Segments around bodies of revolution
    pub radial_segments: u32,
    /// Stations along the fuselage axis
    pub fuselage_stations: u32,
    /// Fuselage length when the parameters carry none
    pub default_fuselage_length: f64,
    /// Fuselage diameter when the parameters carry none
    pub default_fuselage_diameter: f64,
    /// Engine length when the parameters carry none
    pub default_engine_length: f64,
    /// Engine diameter when the parameters carry none
    pub default_engine_diameter: f64,
    /// Inner duct radius as a fraction of the nacelle radius
    pub nacelle_inner_ratio: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            airfoil_points: 24,
            span_stations: 8,
            radial_segments: 32,
            fuselage_stations: 24,
            default_fuselage_length: 10.0,
            default_fuselage_diameter: 2.0,
            default_engine_length: 3.0,
            default_engine_diameter: 1.2,
            nacelle_inner_ratio: 0.7,
        }
    }
}
