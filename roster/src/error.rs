//! # API Errors
//!
//! Every failure a request can produce, and how it is rendered to the client.
//! Bodies always have the shape `{"detail": ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

use roster_core::{
    error::{DocumentStoreError, SchemaViolation},
    id::IdError,
};

use crate::{config::ConfigError, validator::ValidationError};

/// Result type for request handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Path identifier is not a well-formed record identifier
    #[error("Student_id is invalid!")]
    InvalidIdentifier,

    /// A required top-level field is absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A required field inside `address` is absent
    #[error("Missing required address field: {0}")]
    MissingAddressField(&'static str),

    /// The store rejected the write; `info` is the first unsatisfied rule
    #[error("{message}")]
    SchemaViolation { message: String, info: JsonValue },

    /// No record has the requested identifier
    #[error("Student not found!")]
    NotFound,

    /// Request body is not a JSON object
    #[error("{0}")]
    InvalidBody(String),

    /// Query string parameters could not be decoded
    #[error("{0}")]
    InvalidQuery(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Anything else, carrying the failure's description
    #[error("{0}")]
    Unexpected(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ApiError::InvalidIdentifier => StatusCode::BAD_REQUEST,
            ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingAddressField(_) => StatusCode::BAD_REQUEST,
            ApiError::SchemaViolation { .. } => StatusCode::BAD_REQUEST,

            // 404 Not Found
            ApiError::NotFound => StatusCode::NOT_FOUND,

            // 422 Unprocessable Entity
            ApiError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            ApiError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(self) -> JsonValue {
        match self {
            ApiError::SchemaViolation { message, info } => serde_json::json!({
                "msg": message,
                "info": info,
            }),
            other => JsonValue::String(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: JsonValue,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self { detail: err.detail() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }

        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}

impl From<IdError> for ApiError {
    fn from(_: IdError) -> Self {
        ApiError::InvalidIdentifier
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::MissingField(field) => ApiError::MissingField(field),
            ValidationError::MissingAddressField(field) => ApiError::MissingAddressField(field),
        }
    }
}

impl From<SchemaViolation> for ApiError {
    fn from(violation: SchemaViolation) -> Self {
        let info = violation
            .first_rule()
            .and_then(|rule| serde_json::to_value(rule).ok())
            .unwrap_or(JsonValue::Null);

        ApiError::SchemaViolation {
            message: violation.message,
            info,
        }
    }
}

impl From<DocumentStoreError> for ApiError {
    fn from(err: DocumentStoreError) -> Self {
        match err {
            DocumentStoreError::SchemaViolation(violation) => violation.into(),
            other => ApiError::Unexpected(other.to_string()),
        }
    }
}

/// Failures that stop the service from starting or running.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] DocumentStoreError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("this build does not include the {0} backend")]
    BackendUnavailable(&'static str),
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InvalidIdentifier.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingField("name").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InvalidQuery("age".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Unexpected("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_plain_details() {
        assert_eq!(
            ErrorResponse::from(ApiError::InvalidIdentifier).detail,
            JsonValue::String("Student_id is invalid!".to_string())
        );
        assert_eq!(
            ErrorResponse::from(ApiError::MissingAddressField("country")).detail,
            JsonValue::String("Missing required address field: country".to_string())
        );
        assert_eq!(
            ErrorResponse::from(ApiError::NotFound).detail,
            JsonValue::String("Student not found!".to_string())
        );
    }

    #[test]
    fn test_schema_violation_surfaces_first_rule_only() {
        let violation = SchemaViolation::new(vec![
            doc! { "operatorName": "properties" },
            doc! { "operatorName": "required", "missingProperties": ["age"] },
        ]);

        let detail = ErrorResponse::from(ApiError::from(DocumentStoreError::from(violation))).detail;

        assert_eq!(
            detail,
            serde_json::json!({
                "msg": "Document failed validation",
                "info": { "operatorName": "properties" },
            })
        );
    }

    #[test]
    fn test_schema_violation_without_rules() {
        let detail = ErrorResponse::from(ApiError::from(SchemaViolation::new(vec![]))).detail;

        assert_eq!(detail, serde_json::json!({ "msg": "Document failed validation", "info": null }));
    }

    #[test]
    fn test_other_store_errors_are_opaque() {
        let err = ApiError::from(DocumentStoreError::ImmutableField("_id".to_string()));

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Performing a write on the path '_id' would modify an immutable field"
        );
    }

    #[test]
    fn test_identifier_errors_map_to_invalid_identifier() {
        let err = ApiError::from(IdError::Invalid("nope".to_string()));

        assert!(matches!(err, ApiError::InvalidIdentifier));
    }
}
