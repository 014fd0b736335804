//! Factory functions for creating test data.
//!
//! Provides helpers to construct parameter sets, raw parameter mappings and
//! compile requests used in unit and integration tests.

use glam::{DAffine3, DVec3};
use serde_json::json;
use shared::*;

use crate::generators::GeneratorRegistry;
use crate::mesh::Mesh;

// ── Parameter factories ─────────────────────────────────────────

/// Wing parameter set with optional taper.
pub fn wing_params(span: f64, root_chord: f64, tip_chord: Option<f64>) -> AeroParameters {
    AeroParameters {
        span,
        root_chord,
        tip_chord,
        ..AeroParameters::default()
    }
}

/// Parameter set that resolves to a fuselage.
pub fn fuselage_params(length: f64, diameter: f64) -> AeroParameters {
    AeroParameters {
        fuselage_type: Some("commercial".to_string()),
        fuselage_length: Some(length),
        fuselage_diameter: Some(diameter),
        ..AeroParameters::default()
    }
}

/// Parameter set that resolves to an engine.
pub fn engine_params(length: f64, diameter: f64) -> AeroParameters {
    AeroParameters {
        engine_length: Some(length),
        engine_diameter: Some(diameter),
        ..AeroParameters::default()
    }
}

/// Raw mapping as an external client would send it (camelCase keys).
pub fn raw_wing(span: f64, root_chord: f64) -> RawParameters {
    as_map(json!({
        "wingType": "straight",
        "span": span,
        "rootChord": root_chord,
        "thickness": 12.0
    }))
}

/// Raw mapping for a fuselage.
pub fn raw_fuselage(length: f64, diameter: f64) -> RawParameters {
    as_map(json!({
        "span": 1.0,
        "rootChord": 1.0,
        "thickness": 12.0,
        "fuselageType": "commercial",
        "fuselageLength": length,
        "fuselageDiameter": diameter
    }))
}

/// Raw mapping for an engine.
pub fn raw_engine(length: f64, diameter: f64) -> RawParameters {
    as_map(json!({
        "span": 1.0,
        "rootChord": 1.0,
        "thickness": 12.0,
        "engineLength": length,
        "engineDiameter": diameter
    }))
}

fn as_map(value: serde_json::Value) -> RawParameters {
    match value {
        serde_json::Value::Object(map) => map,
        _ => RawParameters::new(),
    }
}

// ── Mesh factories ──────────────────────────────────────────────

/// Axis-aligned box of the given size centred at `center`.
pub fn box_mesh(size: [f64; 3], center: [f64; 3]) -> Mesh {
    Mesh::unit_cube().transformed(DAffine3::from_scale_rotation_translation(
        DVec3::from_array(size),
        glam::DQuat::IDENTITY,
        DVec3::from_array(center),
    ))
}

// ── Compile request factories ───────────────────────────────────

/// A compile component built from a mesh, categorized by name.
pub fn component(name: &str, mesh: &Mesh) -> CompileComponent {
    CompileComponent {
        name: name.to_string(),
        category: None,
        geometry: mesh.to_record(),
        parameters: RawParameters::new(),
    }
}

/// Wing, fuselage and engine generated with the default registry, in that order.
pub fn generated_components() -> Vec<CompileComponent> {
    let registry = GeneratorRegistry::default();
    let parts = [
        ("Main Wing", ComponentCategory::Wing, wing_params(20.0, 3.0, Some(1.5))),
        ("Commercial Fuselage", ComponentCategory::Fuselage, fuselage_params(25.0, 3.5)),
        ("Engine Nacelle", ComponentCategory::Engine, engine_params(4.0, 1.8)),
    ];
    parts
        .into_iter()
        .filter_map(|(name, category, params)| {
            let mesh = registry.generate(category, &params).ok()?;
            Some(component(name, &mesh))
        })
        .collect()
}

/// Offsets with the wing and engine mounted off the centreline.
pub fn typical_offsets() -> AttachmentOffsets {
    AttachmentOffsets {
        wing: Offset3::new(10.0, 1.75, 0.0),
        engine: Offset3::new(8.0, 5.0, -1.0),
    }
}
