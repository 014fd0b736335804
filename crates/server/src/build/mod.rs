//! Blocking geometry work, run from handlers via `spawn_blocking`.

use std::fmt::Display;
use std::str::FromStr;

use geometry::export;
use geometry::mesh::Mesh;
use geometry::pipeline::{compile_aircraft, generate_component};
use geometry::{GenerationError, GeneratorRegistry, MeshError};
use serde_json::{json, Value};
use shared::{AttachmentOffsets, CompileRequest, ExportOptions, GenerateRequest, ModelRecord};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Stl,
    Obj,
    Glb,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Unsupported export format: {0}")]
    Unsupported(String),

    /// Known CAD exchange format without a writer here
    #[error("{0} export needs a B-rep CAD kernel and is not available, use STL")]
    NotImplemented(&'static str),
}

impl FromStr for ExportFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stl" => Ok(Self::Stl),
            "obj" => Ok(Self::Obj),
            "glb" => Ok(Self::Glb),
            "step" | "stp" => Err(FormatError::NotImplemented("STEP")),
            "iges" | "igs" => Err(FormatError::NotImplemented("IGES")),
            other => Err(FormatError::Unsupported(other.to_string())),
        }
    }
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Stl => "stl",
            Self::Obj => "obj",
            Self::Glb => "glb",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Stl => "application/sla",
            Self::Obj => "text/plain; charset=utf-8",
            Self::Glb => "model/gltf-binary",
        }
    }
}

pub enum ExportOutput {
    File {
        bytes: Vec<u8>,
        content_type: &'static str,
        filename: String,
    },
    Inspection(Value),
}

pub fn generate(
    registry: &GeneratorRegistry,
    request: &GenerateRequest,
) -> Result<ModelRecord, GenerationError> {
    generate_component(
        registry,
        &request.parameters,
        request.prompt.as_deref(),
        request.generated_from,
    )
}

pub fn compile<E: Display>(
    request: &CompileRequest,
    offsets: Result<AttachmentOffsets, E>,
) -> ModelRecord {
    compile_aircraft(&request.components, offsets)
}

pub fn export_model(
    record: &ModelRecord,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportOutput, MeshError> {
    let mesh = Mesh::from_record(&record.geometry)?;
    let filename = format!(
        "{}.{}",
        export::sanitize_name(&record.name),
        format.extension()
    );

    if options.inspect {
        let metadata = export::inspect(&mesh);
        let mut info = json!({
            "filename": filename,
            "metadata": metadata,
        });
        if format == ExportFormat::Stl {
            info["ascii"] = json!(!options.binary);
            if !options.binary {
                info["stl_text"] = json!(export::stl_ascii(&mesh, &record.name));
            }
        }
        return Ok(ExportOutput::Inspection(info));
    }

    let bytes = match format {
        ExportFormat::Stl if options.binary => export::stl_binary(&mesh, &record.name),
        ExportFormat::Stl => export::stl_ascii(&mesh, &record.name).into_bytes(),
        ExportFormat::Obj => export::obj(&mesh).into_bytes(),
        ExportFormat::Glb => export::glb(&[(record.name.as_str(), &mesh)]),
    };

    tracing::info!(
        name = %record.name,
        format = format.extension(),
        bytes = bytes.len(),
        "exported model"
    );

    Ok(ExportOutput::File {
        bytes,
        content_type: format.content_type(),
        filename,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geometry::fixtures::raw_engine;
    use shared::Provenance;

    fn record() -> ModelRecord {
        let request = GenerateRequest {
            parameters: raw_engine(3.0, 1.2),
            prompt: None,
            generated_from: Provenance::Text,
        };
        generate(&GeneratorRegistry::default(), &request).unwrap()
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("STL".parse::<ExportFormat>(), Ok(ExportFormat::Stl));
        assert_eq!("glb".parse::<ExportFormat>(), Ok(ExportFormat::Glb));
        assert_eq!(
            "dwg".parse::<ExportFormat>(),
            Err(FormatError::Unsupported("dwg".to_string()))
        );
        assert_eq!(
            "STEP".parse::<ExportFormat>(),
            Err(FormatError::NotImplemented("STEP"))
        );
        assert_eq!(
            "igs".parse::<ExportFormat>(),
            Err(FormatError::NotImplemented("IGES"))
        );
    }

    #[test]
    fn test_binary_stl_file() {
        let record = record();
        let triangles = record.geometry.indices.len() / 3;
        match export_model(&record, ExportFormat::Stl, &ExportOptions::default()).unwrap() {
            ExportOutput::File {
                bytes,
                content_type,
                filename,
            } => {
                assert_eq!(bytes.len(), 84 + triangles * 50);
                assert_eq!(content_type, "application/sla");
                assert_eq!(filename, "Engine_Nacelle.stl");
            }
            ExportOutput::Inspection(_) => panic!("expected a file"),
        }
    }

    #[test]
    fn test_ascii_stl_inspection_has_text() {
        let options = ExportOptions {
            binary: false,
            inspect: true,
        };
        match export_model(&record(), ExportFormat::Stl, &options).unwrap() {
            ExportOutput::Inspection(info) => {
                assert_eq!(info["ascii"], json!(true));
                assert!(info["stl_text"].as_str().unwrap().starts_with("solid Engine_Nacelle"));
                assert_eq!(info["metadata"]["is_watertight"], json!(true));
            }
            ExportOutput::File { .. } => panic!("expected an inspection"),
        }
    }

    #[test]
    fn test_binary_inspection_omits_text() {
        let options = ExportOptions {
            binary: true,
            inspect: true,
        };
        match export_model(&record(), ExportFormat::Stl, &options).unwrap() {
            ExportOutput::Inspection(info) => {
                assert_eq!(info["ascii"], json!(false));
                assert!(info.get("stl_text").is_none());
            }
            ExportOutput::File { .. } => panic!("expected an inspection"),
        }
    }

    #[test]
    fn test_malformed_geometry_rejected() {
        let mut record = record();
        record.geometry.indices.push(u32::MAX);
        record.geometry.indices.push(0);
        record.geometry.indices.push(1);
        let result = export_model(&record, ExportFormat::Obj, &ExportOptions::default());
        assert!(result.is_err());
    }
}
