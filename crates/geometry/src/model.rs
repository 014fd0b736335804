//! Model record assembly.
//!
//! Wraps a finished mesh into an immutable [`ModelRecord`]: display name, fresh
//! id, timestamps, vertex normals, volume and the list of fallbacks taken on the
//! way. The transport form is validated before it is handed out.

use std::time::{SystemTime, UNIX_EPOCH};

use shared::{
    AeroParameters, ComponentCategory, Degradation, GeometryRecord, ModelMetadata, ModelRecord,
    Provenance,
};

use crate::error::MeshError;
use crate::mesh::Mesh;
use crate::validation::MeshValidator;
use crate::volume::{self, VolumeEstimate};

pub const AIRCRAFT_NAME: &str = "Complete Aircraft";

const DEFAULT_FUSELAGE_TYPE: &str = "commercial";

/// Record for a single generated component.
pub fn assemble_component(
    mesh: Mesh,
    category: ComponentCategory,
    params: AeroParameters,
    provenance: Provenance,
    prompt: Option<String>,
    mut degradations: Vec<Degradation>,
) -> Result<ModelRecord, MeshError> {
    let estimate = volume::estimate(&mesh, category, &params);
    note_volume_fallback(&estimate, &mut degradations);

    let draft = Draft {
        name: component_name(category, &params),
        params,
        provenance,
        source_prompt: prompt,
        category: Some(category),
        estimate,
        degradations,
    };
    finish(draft, mesh)
}

/// Record for a compiled aircraft.
///
/// `categories` are the component categories that made it into `mesh`;
/// `names` are the submitted component names, in order.
pub fn assemble_aircraft(
    mesh: Mesh,
    categories: &[ComponentCategory],
    params: AeroParameters,
    names: &[String],
    mut degradations: Vec<Degradation>,
) -> Result<ModelRecord, MeshError> {
    let estimate = volume::estimate_assembly(&mesh, categories, &params);
    note_volume_fallback(&estimate, &mut degradations);

    let draft = Draft {
        name: AIRCRAFT_NAME.to_string(),
        params,
        provenance: Provenance::Compilation,
        source_prompt: Some(compilation_summary(names)),
        category: None,
        estimate,
        degradations,
    };
    finish(draft, mesh)
}

/// Display name for a single component.
pub fn component_name(category: ComponentCategory, params: &AeroParameters) -> String {
    match category {
        ComponentCategory::Fuselage => {
            let kind = params
                .fuselage_type
                .as_deref()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(DEFAULT_FUSELAGE_TYPE);
            format!("{} Fuselage", capitalize(kind))
        }
        ComponentCategory::Engine => "Engine Nacelle".to_string(),
        ComponentCategory::Wing => format!("{} Wing", capitalize(&params.wing_type)),
    }
}

/// "Compiled aircraft from N components: a, b, c"
pub fn compilation_summary(names: &[String]) -> String {
    format!(
        "Compiled aircraft from {} components: {}",
        names.len(),
        names.join(", ")
    )
}

/// First letter upper case, the rest lower case.
fn capitalize(word: &str) -> String {
    let mut chars = word.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn note_volume_fallback(estimate: &VolumeEstimate, degradations: &mut Vec<Degradation>) {
    if estimate.is_fallback() {
        degradations.push(Degradation::ClosedFormVolume {
            measured: estimate.measured.unwrap_or(0.0),
        });
    }
}

struct Draft {
    name: String,
    params: AeroParameters,
    provenance: Provenance,
    source_prompt: Option<String>,
    category: Option<ComponentCategory>,
    estimate: VolumeEstimate,
    degradations: Vec<Degradation>,
}

fn finish(draft: Draft, mesh: Mesh) -> Result<ModelRecord, MeshError> {
    let geometry = mesh.ensure_normals().to_record();
    let problems = MeshValidator::new(&geometry).validate_all();
    if !problems.is_empty() {
        tracing::error!(name = %draft.name, ?problems, "assembled geometry failed validation");
        return Err(MeshError::Invalid { problems });
    }
    Ok(build_record(draft, geometry))
}

/// Record for an aircraft with no usable geometry: the unit-cube placeholder.
pub fn placeholder_aircraft(
    params: AeroParameters,
    names: &[String],
    mut degradations: Vec<Degradation>,
) -> ModelRecord {
    let mesh = crate::assembly::placeholder();
    let estimate = volume::estimate_assembly(&mesh, &[], &params);
    if !degradations.contains(&Degradation::PlaceholderGeometry) {
        degradations.push(Degradation::PlaceholderGeometry);
    }
    let geometry = mesh.ensure_normals().to_record();
    build_record(
        Draft {
            name: AIRCRAFT_NAME.to_string(),
            params,
            provenance: Provenance::Compilation,
            source_prompt: Some(compilation_summary(names)),
            category: None,
            estimate,
            degradations,
        },
        geometry,
    )
}

fn build_record(draft: Draft, geometry: GeometryRecord) -> ModelRecord {
    let now = now_millis();
    let record = ModelRecord {
        id: uuid::Uuid::new_v4().to_string(),
        name: draft.name,
        parameters: draft.params,
        geometry,
        metadata: ModelMetadata {
            created_at: now,
            updated_at: now,
            generated_from: draft.provenance,
            source_prompt: draft.source_prompt,
            category: draft.category,
            volume: draft.estimate.value,
            volume_method: draft.estimate.method,
            degraded: !draft.degradations.is_empty(),
            degradations: draft.degradations,
        },
    };

    tracing::info!(
        id = %record.id,
        name = %record.name,
        volume = record.metadata.volume,
        degraded = record.metadata.degraded,
        "model assembled"
    );
    record
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;
    use shared::VolumeMethod;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("swept"), "Swept");
        assert_eq!(capitalize("DELTA"), "Delta");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_component_names() {
        let mut params = AeroParameters::default();
        assert_eq!(component_name(ComponentCategory::Wing, &params), "Straight Wing");
        assert_eq!(
            component_name(ComponentCategory::Fuselage, &params),
            "Commercial Fuselage"
        );
        params.fuselage_type = Some("FIGHTER".into());
        assert_eq!(component_name(ComponentCategory::Fuselage, &params), "Fighter Fuselage");
        assert_eq!(component_name(ComponentCategory::Engine, &params), "Engine Nacelle");
    }

    #[test]
    fn test_component_record_fields() {
        let record = assemble_component(
            Mesh::unit_cube(),
            ComponentCategory::Wing,
            AeroParameters::default(),
            Provenance::Manual,
            Some("a plain wing".into()),
            Vec::new(),
        )
        .unwrap();

        assert_eq!(record.name, "Straight Wing");
        assert!(uuid::Uuid::parse_str(&record.id).is_ok());
        assert_eq!(record.metadata.created_at, record.metadata.updated_at);
        assert_eq!(record.metadata.generated_from, Provenance::Manual);
        assert_eq!(record.metadata.source_prompt.as_deref(), Some("a plain wing"));
        assert_eq!(record.metadata.category, Some(ComponentCategory::Wing));
        assert_eq!(record.metadata.volume_method, VolumeMethod::Enclosed);
        assert!(!record.metadata.degraded);
        assert_eq!(
            record.geometry.normals.as_ref().map(Vec::len),
            Some(record.geometry.vertices.len())
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let make = || {
            assemble_component(
                Mesh::unit_cube(),
                ComponentCategory::Engine,
                AeroParameters::default(),
                Provenance::Text,
                None,
                Vec::new(),
            )
            .unwrap()
            .id
        };
        assert_ne!(make(), make());
    }

    #[test]
    fn test_volume_fallback_marks_degraded() {
        let flat = Mesh::new(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![[0, 1, 2]]).unwrap();
        let record = assemble_component(
            flat,
            ComponentCategory::Wing,
            AeroParameters::default(),
            Provenance::Text,
            None,
            Vec::new(),
        )
        .unwrap();
        assert!(record.metadata.degraded);
        assert_eq!(record.metadata.volume_method, VolumeMethod::ClosedForm);
        assert!(matches!(
            record.metadata.degradations[..],
            [Degradation::ClosedFormVolume { .. }]
        ));
    }

    #[test]
    fn test_non_finite_geometry_rejected() {
        let bad = Mesh::new(
            vec![DVec3::ZERO, DVec3::new(f64::NAN, 0.0, 0.0), DVec3::Y],
            vec![[0, 1, 2]],
        )
        .unwrap();
        let err = assemble_component(
            bad,
            ComponentCategory::Wing,
            AeroParameters::default(),
            Provenance::Text,
            None,
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::Invalid { .. }));
    }

    #[test]
    fn test_aircraft_record() {
        let names = vec!["Main Wing".to_string(), "Body".to_string()];
        let record = assemble_aircraft(
            Mesh::unit_cube(),
            &[ComponentCategory::Wing, ComponentCategory::Fuselage],
            AeroParameters::default(),
            &names,
            vec![Degradation::PlaceholderGeometry],
        )
        .unwrap();
        assert_eq!(record.name, AIRCRAFT_NAME);
        assert_eq!(record.metadata.generated_from, Provenance::Compilation);
        assert_eq!(
            record.metadata.source_prompt.as_deref(),
            Some("Compiled aircraft from 2 components: Main Wing, Body")
        );
        assert_eq!(record.metadata.category, None);
        assert!(record.metadata.degraded);
    }

    #[test]
    fn test_placeholder_aircraft() {
        let record = placeholder_aircraft(AeroParameters::default(), &[], Vec::new());
        assert_eq!(record.name, AIRCRAFT_NAME);
        assert_eq!(record.geometry.indices.len(), 36);
        assert_eq!(record.metadata.degradations, vec![Degradation::PlaceholderGeometry]);
        assert!(record.metadata.volume > 0.0);
        assert_eq!(
            record.metadata.source_prompt.as_deref(),
            Some("Compiled aircraft from 0 components: ")
        );
    }
}
