use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{BytesRejection, QueryRejection},
    },
};
use std::sync::Arc;

use super::validation::{optional_field, parse_json_body, require_field, require_non_empty};
use super::{
    ApiError, ApiResponse, AppState, FileContentRequest, GenerateModuleRequest, ListFilesRequest,
};
use crate::services::file_service::{
    AppendOutcome, GenerateOutcome, GenerateRequest, ListOutcome, ListRequest, WriteOutcome,
};

/// POST /api/write
pub async fn write_file(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<WriteOutcome>>, ApiError> {
    let payload: FileContentRequest = parse_json_body(&body?, false)?;
    let filename = require_non_empty(payload.filename.as_deref(), "filename")?;
    let content = require_field(payload.content.as_deref(), "content")?;

    let outcome = state.file_service().write_file(filename, content).await?;

    Ok(Json(ApiResponse::success(
        format!("File '{}' written successfully", outcome.filename),
        outcome,
    )))
}

/// POST /api/append
pub async fn append_file(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<AppendOutcome>>, ApiError> {
    let payload: FileContentRequest = parse_json_body(&body?, false)?;
    let filename = require_non_empty(payload.filename.as_deref(), "filename")?;
    let content = require_field(payload.content.as_deref(), "content")?;

    let outcome = state.file_service().append_file(filename, content).await?;

    let message = if outcome.file_existed {
        format!("Content appended to '{}'", outcome.filename)
    } else {
        format!("File '{}' created with content", outcome.filename)
    };

    Ok(Json(ApiResponse::success(message, outcome)))
}

/// POST /api/generate
pub async fn generate_module(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<GenerateOutcome>>, ApiError> {
    let payload: GenerateModuleRequest = parse_json_body(&body?, false)?;
    let module = require_non_empty(payload.module.as_deref(), "module")?;

    let outcome = state
        .file_service()
        .generate_module(GenerateRequest {
            module,
            module_type: optional_field(payload.module_type.as_deref()),
            filename: optional_field(payload.filename.as_deref()),
            overwrite: payload.overwrite,
        })
        .await?;

    Ok(Json(ApiResponse::success(
        format!(
            "Module '{}' generated at '{}'",
            outcome.module, outcome.filename
        ),
        outcome,
    )))
}

/// GET /api/list
pub async fn list_files_query(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListFilesRequest>, QueryRejection>,
) -> Result<Json<ApiResponse<ListOutcome>>, ApiError> {
    let Query(params) =
        query.map_err(|e| ApiError::validation(format!("Invalid query parameters: {e}")))?;
    list_files(&state, &params).await
}

/// POST /api/list
pub async fn list_files_body(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ApiResponse<ListOutcome>>, ApiError> {
    let params: ListFilesRequest = parse_json_body(&body?, true)?;
    list_files(&state, &params).await
}

async fn list_files(
    state: &AppState,
    params: &ListFilesRequest,
) -> Result<Json<ApiResponse<ListOutcome>>, ApiError> {
    let outcome = state
        .file_service()
        .list_files(ListRequest {
            directory: optional_field(params.directory.as_deref()),
            pattern: optional_field(params.pattern.as_deref()),
            recursive: params.recursive,
        })
        .await?;

    tracing::debug!(
        directory = %outcome.directory,
        count = outcome.count,
        recursive = outcome.recursive,
        "Files listed"
    );

    Ok(Json(ApiResponse::success(
        format!("Found {} file(s) in '{}'", outcome.count, outcome.directory),
        outcome,
    )))
}

/// Unknown paths under `/api`.
pub async fn unknown_endpoint() -> ApiError {
    ApiError::NotFound("Unknown API endpoint".to_string())
}
