use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::ai;
use crate::build::{self, ExportFormat, ExportOutput, FormatError};
use crate::simulation;
use crate::AppState;
use shared::{
    CompileRequest, ExportRequest, GenerateRequest, ModelRecord, SimulationReport,
    SimulationRequest,
};

/// Error reply: status code plus `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(id: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("Model not found: {id}"))
    }

    fn internal(e: impl std::fmt::Display) -> Self {
        tracing::error!("Task error: {}", e);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message }))).into_response()
    }
}

/// Health check
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "models": state.store.len(),
        "advisor": state.advisor.is_some(),
    }))
}

/// Parameters → component model
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ModelRecord>, ApiError> {
    let registry = state.registry.clone();
    let record = tokio::task::spawn_blocking(move || build::generate(&registry, &request))
        .await
        .map_err(ApiError::internal)?
        .map_err(|e| {
            tracing::warn!("Generation error: {}", e);
            ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        })?;

    state.store.insert(record.clone());
    Ok(Json(record))
}

/// Components → complete aircraft. Never fails on component content.
pub async fn compile(
    State(state): State<AppState>,
    Json(request): Json<CompileRequest>,
) -> Result<Json<ModelRecord>, ApiError> {
    let offsets = ai::request_offsets(
        state.advisor.as_deref(),
        &request,
        state.config.advisor_timeout(),
    )
    .await;

    let record = tokio::task::spawn_blocking(move || build::compile(&request, offsets))
        .await
        .map_err(ApiError::internal)?;

    state.store.insert(record.clone());
    Ok(Json(record))
}

pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModelRecord>, ApiError> {
    state
        .store
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(&id))
}

pub async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| ApiError::not_found(&id))
}

/// Model → STL / OBJ / GLB file, or a JSON summary with `options.inspect`
pub async fn export(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse().map_err(|e: FormatError| {
        let status = match e {
            FormatError::NotImplemented(_) => StatusCode::NOT_IMPLEMENTED,
            FormatError::Unsupported(_) => StatusCode::BAD_REQUEST,
        };
        ApiError::new(status, e.to_string())
    })?;

    // the stored record wins; an inline model covers an evicted or unknown id
    let stored = request
        .model_id
        .as_deref()
        .and_then(|id| state.store.get(id));
    let record = match (stored, request.model, request.model_id) {
        (Some(record), _, _) => record,
        (None, Some(model), _) => model,
        (None, None, Some(id)) => return Err(ApiError::not_found(&id)),
        (None, None, None) => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "Either model_id or model is required",
            ))
        }
    };
    let options = request.options;

    let output = tokio::task::spawn_blocking(move || build::export_model(&record, format, &options))
        .await
        .map_err(ApiError::internal)?
        .map_err(|e| {
            tracing::error!("Export error: {}", e);
            ApiError::new(StatusCode::BAD_REQUEST, e.to_string())
        })?;

    Ok(match output {
        ExportOutput::Inspection(info) => Json(info).into_response(),
        ExportOutput::File {
            bytes,
            content_type,
            filename,
        } => (
            [
                (header::CONTENT_TYPE, content_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
    })
}

/// Wing root structural check
pub async fn simulate_structural(Json(request): Json<SimulationRequest>) -> Json<SimulationReport> {
    Json(simulation::structural(&request))
}
