// API error mapping onto HTTP status codes
use crate::domain::error::DiagnosticError;
use crate::infrastructure::csv_ingest::IngestError;
use crate::infrastructure::http_response::json_response;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Diagnostic(#[from] DiagnosticError),

    #[error("form is missing the '{0}' file field")]
    MissingField(&'static str),

    #[error("invalid multipart upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("diagnostic task failed: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Ingest(IngestError::UnsupportedExtension { .. }) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ApiError::Ingest(_) | ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Diagnostic(DiagnosticError::InvalidConfig(_)) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Diagnostic(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            tracing::warn!("Rejected upload: {}", self);
            self.to_string()
        };

        match json_response(status, &json!({ "error": message })) {
            Ok(response) => response,
            Err(status) => status.into_response(),
        }
    }
}
