//! Parameter normalization.
//!
//! External clients name fields in camelCase; the canonical schema uses
//! snake_case. Keys are renamed through a fixed table, deserialized and range
//! checked. [`normalize_or_default`] never fails: it falls back to
//! [`AeroParameters::default`] and reports why.

use shared::{AeroParameters, RawParameters};

use crate::error::ValidationError;

/// External name → canonical name.
const KEY_RENAMES: &[(&str, &str)] = &[
    ("wingType", "wing_type"),
    ("rootChord", "root_chord"),
    ("tipChord", "tip_chord"),
    ("sweepAngle", "sweep_angle"),
    ("fuselageType", "fuselage_type"),
    ("fuselageLength", "fuselage_length"),
    ("fuselageDiameter", "fuselage_diameter"),
    ("engineLength", "engine_length"),
    ("engineDiameter", "engine_diameter"),
    ("hasVerticalStabilizer", "has_vertical_stabilizer"),
    ("hasHorizontalStabilizer", "has_horizontal_stabilizer"),
    ("positionX", "position_x"),
    ("positionY", "position_y"),
    ("positionZ", "position_z"),
];

/// Rename keys to their canonical names; unknown keys pass through.
pub fn canonical_keys(raw: &RawParameters) -> RawParameters {
    raw.iter()
        .map(|(key, value)| {
            let canonical = KEY_RENAMES
                .iter()
                .find(|(external, _)| *external == key.as_str())
                .map_or(key.as_str(), |&(_, canonical)| canonical);
            (canonical.to_string(), value.clone())
        })
        .collect()
}

/// Rename, deserialize and validate a raw parameter mapping.
pub fn normalize(raw: &RawParameters) -> Result<AeroParameters, ValidationError> {
    let canonical = serde_json::Value::Object(canonical_keys(raw));
    let params: AeroParameters =
        serde_json::from_value(canonical).map_err(|e| ValidationError::Malformed {
            message: e.to_string(),
        })?;
    validate(&params)?;
    Ok(params)
}

/// Like [`normalize`], but substitutes the default set on failure.
///
/// The error is returned alongside so the caller can record the fallback.
pub fn normalize_or_default(raw: &RawParameters) -> (AeroParameters, Option<ValidationError>) {
    match normalize(raw) {
        Ok(params) => (params, None),
        Err(e) => {
            tracing::warn!(error = %e, raw = ?raw, "parameter validation failed, using defaults");
            (AeroParameters::default(), Some(e))
        }
    }
}

/// Range checks on an already deserialized parameter set.
pub fn validate(params: &AeroParameters) -> Result<(), ValidationError> {
    if params.wing_type.trim().is_empty() {
        return Err(ValidationError::Empty { field: "wing_type" });
    }

    positive("span", params.span)?;
    positive("root_chord", params.root_chord)?;
    if let Some(tip) = params.tip_chord {
        positive("tip_chord", tip)?;
    }

    let thickness = params.thickness;
    if !thickness.is_finite() || thickness <= 0.0 || thickness > 100.0 {
        return Err(ValidationError::out_of_range("thickness", thickness, "0 < thickness <= 100"));
    }

    open_angle("sweep_angle", params.sweep_angle)?;
    open_angle("dihedral", params.dihedral)?;

    for (field, value) in [
        ("fuselage_length", params.fuselage_length),
        ("fuselage_diameter", params.fuselage_diameter),
        ("engine_length", params.engine_length),
        ("engine_diameter", params.engine_diameter),
    ] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(ValidationError::out_of_range(field, v, "finite and >= 0"));
            }
        }
    }

    for (field, v) in [
        ("position_x", params.position_x),
        ("position_y", params.position_y),
        ("position_z", params.position_z),
    ] {
        if !v.is_finite() {
            return Err(ValidationError::out_of_range(field, v, "finite"));
        }
    }

    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(field, value, "finite and > 0"))
    }
}

fn open_angle(field: &'static str, degrees: f64) -> Result<(), ValidationError> {
    if degrees.is_finite() && degrees.abs() < 90.0 {
        Ok(())
    } else {
        Err(ValidationError::out_of_range(field, degrees, "-90 < angle < 90"))
    }
}
