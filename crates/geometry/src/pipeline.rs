//! End-to-end flows: single component generation and aircraft compilation.

use std::fmt::Display;

use shared::{
    AeroParameters, AttachmentOffsets, CompileComponent, ComponentCategory, Degradation,
    GeometryRecord, ModelRecord, Provenance, RawParameters,
};

use crate::assembly;
use crate::error::{GenerationError, MeshError};
use crate::generators::GeneratorRegistry;
use crate::mesh::Mesh;
use crate::model;
use crate::normalize::normalize_or_default;
use crate::resolve::{category_from_name, resolve};
use crate::validation::{MeshValidator, NORMAL_TOLERANCE};

/// Normalize, resolve, generate and assemble one component.
///
/// Invalid parameters fall back to defaults and are recorded as a degradation;
/// generator failures propagate.
pub fn generate_component(
    registry: &GeneratorRegistry,
    raw: &RawParameters,
    hint: Option<&str>,
    provenance: Provenance,
) -> Result<ModelRecord, GenerationError> {
    let mut degradations = Vec::new();
    let (params, error) = normalize_or_default(raw);
    if let Some(e) = error {
        degradations.push(Degradation::ParameterDefaults {
            reason: e.to_string(),
        });
    }

    let category = resolve(&params, hint);
    tracing::info!(%category, hint = ?hint, "generating component");

    let mesh = registry.generate(category, &params)?;
    model::assemble_component(
        mesh,
        category,
        params,
        provenance,
        hint.map(str::to_string),
        degradations,
    )
    .map_err(|source| GenerationError::Mesh { category, source })
}

/// A component ready for assembly.
struct Prepared {
    category: ComponentCategory,
    mesh: Mesh,
}

/// Compile submitted components into one aircraft record. Never fails.
///
/// Components with an unknown category or malformed geometry are skipped and
/// recorded. An advisor error yields zero offsets. With nothing left to
/// assemble the record carries the placeholder cube.
pub fn compile_aircraft<E: Display>(
    components: &[CompileComponent],
    offsets: Result<AttachmentOffsets, E>,
) -> ModelRecord {
    let mut degradations = Vec::new();

    let offsets = offsets.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "attachment advisor unavailable, using zero offsets");
        degradations.push(Degradation::AdvisorUnavailable {
            reason: e.to_string(),
        });
        AttachmentOffsets::default()
    });

    let mut prepared = Vec::with_capacity(components.len());
    for component in components {
        match prepare(component) {
            Ok(p) => prepared.push(p),
            Err(reason) => {
                tracing::warn!(name = %component.name, %reason, "skipping component");
                degradations.push(Degradation::MissingComponent {
                    name: component.name.clone(),
                    reason,
                });
            }
        }
    }

    let names: Vec<String> = components.iter().map(|c| c.name.clone()).collect();
    let params = compiled_parameters(components, &mut degradations);

    if prepared.is_empty() {
        return model::placeholder_aircraft(params, &names, degradations);
    }

    let mut categories: Vec<ComponentCategory> = Vec::with_capacity(prepared.len());
    for p in &prepared {
        if !categories.contains(&p.category) {
            categories.push(p.category);
        }
    }

    let parts: Vec<(ComponentCategory, Mesh)> =
        prepared.into_iter().map(|p| (p.category, p.mesh)).collect();
    let assembled = assembly::compile(&parts, &offsets).and_then(|mesh| {
        model::assemble_aircraft(mesh, &categories, params.clone(), &names, degradations.clone())
    });

    match assembled {
        Ok(record) => record,
        Err(e) => {
            tracing::error!(error = %e, "compiled geometry rejected, using placeholder");
            model::placeholder_aircraft(params, &names, degradations)
        }
    }
}

fn prepare(component: &CompileComponent) -> Result<Prepared, String> {
    let category = component
        .category
        .or_else(|| category_from_name(&component.name))
        .ok_or_else(|| "cannot determine component category".to_string())?;

    let validator = MeshValidator::new(&component.geometry);
    let problems = validator.structural_problems();
    if !problems.is_empty() {
        return Err(MeshError::Invalid { problems }.to_string());
    }

    // normals are recomputed for the compiled record, so bad ones are dropped
    let mesh = if validator.are_normals_normalized(NORMAL_TOLERANCE) {
        Mesh::from_record(&component.geometry)
    } else {
        tracing::debug!(name = %component.name, "discarding invalid normals");
        Mesh::from_record(&GeometryRecord {
            normals: None,
            ..component.geometry.clone()
        })
    }
    .map_err(|e| e.to_string())?;
    if mesh.is_empty() {
        return Err("no geometry".to_string());
    }

    Ok(Prepared { category, mesh })
}

/// Parameters of the first component, or defaults.
///
/// A first component that carries parameters which fail validation is noted;
/// one that carries none is not.
fn compiled_parameters(
    components: &[CompileComponent],
    degradations: &mut Vec<Degradation>,
) -> AeroParameters {
    let Some(first) = components.first() else {
        return AeroParameters::default();
    };
    if first.parameters.is_empty() {
        return AeroParameters::default();
    }

    let (params, error) = normalize_or_default(&first.parameters);
    if let Some(e) = error {
        degradations.push(Degradation::ParameterDefaults {
            reason: e.to_string(),
        });
    }
    params
}
