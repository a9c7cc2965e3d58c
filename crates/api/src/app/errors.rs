use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use pantry_core::DomainError;
use pantry_infra::{BlobStoreError, RepositoryError, ServiceError};

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Domain(e) => domain_error_to_response(e),
        ServiceError::Repository(RepositoryError::NotFound(key)) => json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("item '{key}' not found"),
        ),
        ServiceError::Repository(e) => {
            json_error(StatusCode::BAD_GATEWAY, "repository_error", e.to_string())
        }
        ServiceError::Blob(e @ BlobStoreError::Empty(_)) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
        }
        ServiceError::Blob(e) => json_error(StatusCode::BAD_GATEWAY, "blob_error", e.to_string()),
        ServiceError::Capture(e) => json_error(StatusCode::BAD_REQUEST, "capture_error", e.to_string()),
        e @ ServiceError::PartialRename { .. } => {
            tracing::error!(error = %e, "rename needs manual cleanup");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "partial_rename", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
