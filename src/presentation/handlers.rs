// HTTP request handlers
use crate::domain::diagnostic::DiagnosticResult;
use crate::infrastructure::csv_ingest::parse_upload;
use crate::infrastructure::http_response::{DiagnosticResponse, json_response};
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::sync::Arc;

/// Form field carrying the uploaded batch.
pub const DATASET_FIELD: &str = "dataset";

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Result shape before any batch is submitted; every field is absent
pub async fn empty_result() -> Response {
    match json_response(StatusCode::OK, &DiagnosticResult::not_processed()) {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Diagnose an uploaded CSV batch
pub async fn diagnose(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    match run_diagnosis(&state, multipart).await {
        Ok((filename, result)) => {
            match json_response(StatusCode::OK, &DiagnosticResponse::new(filename, result)) {
                Ok(response) => response,
                Err(status) => status.into_response(),
            }
        }
        Err(e) => e.into_response(),
    }
}

async fn run_diagnosis(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<(String, DiagnosticResult), ApiError> {
    let (filename, bytes) = read_dataset_field(&mut multipart).await?;
    tracing::debug!("Received {} ({} bytes)", filename, bytes.len());

    let dataset = parse_upload(&filename, &bytes)?;
    drop(bytes);

    // Each upload gets its own pipeline run off the async workers.
    let service = state.diagnostic_service.clone();
    let result = tokio::task::spawn_blocking(move || service.diagnose(&dataset))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok((filename, result))
}

async fn read_dataset_field(multipart: &mut Multipart) -> Result<(String, Bytes), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(DATASET_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        return Ok((filename, bytes));
    }
    Err(ApiError::MissingField(DATASET_FIELD))
}
