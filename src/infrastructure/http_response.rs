// HTTP response utilities for JSON diagnostic reports
use crate::domain::diagnostic::DiagnosticResult;
use axum::{
    body::Body,
    http::{HeaderValue, Response, StatusCode, header},
};
use serde::Serialize;

/// Envelope returned for every processed upload.
#[derive(Debug, Serialize)]
pub struct DiagnosticResponse {
    pub analyzed_at: String,
    pub filename: String,
    pub result: DiagnosticResult,
}

impl DiagnosticResponse {
    pub fn new(filename: String, result: DiagnosticResult) -> Self {
        Self {
            analyzed_at: chrono::Utc::now().to_rfc3339(),
            filename,
            result,
        }
    }
}

/// Serialize a value to a JSON response with an explicit content length.
pub fn json_response<T: Serialize>(
    status: StatusCode,
    data: &T,
) -> Result<Response<Body>, StatusCode> {
    let body = serde_json::to_vec(data).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, HeaderValue::from(body.len()))
        .body(Body::from(body))
        .map_err(|e| {
            tracing::error!("Response build error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
