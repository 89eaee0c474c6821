//! API error types with IntoResponse
//!
//! Every error becomes `{"error": "<message>"}` with a matching status.
//! Storage and query failures are logged in full and reported generically.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::{DbError, ProviderError};
use crate::media::IngestError;
use crate::models::ValidationError;

/// Record store operation, for the generic failure message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOp {
    Fetch,
    Add,
    Update,
    Delete,
}

impl QueryOp {
    fn failure_message(self) -> &'static str {
        match self {
            Self::Fetch => "Failed to fetch schools",
            Self::Add => "Failed to add school",
            Self::Update => "Failed to update school",
            Self::Delete => "Failed to delete school",
        }
    }
}

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Body could not be decoded (400)
    BadRequest { message: String },

    /// Pool could not be obtained (500, logged)
    StorageUnavailable(ProviderError),

    /// Query failed (500, logged)
    Query { op: QueryOp, source: DbError },

    /// Upload carried no `image` field (400)
    NoFile,

    /// Multipart body could not be read (500)
    Multipart { message: String },

    /// Upload refused or host failed
    Upload(IngestError),
}

impl ApiError {
    /// Adapter for `map_err` on repository calls.
    pub fn query(op: QueryOp) -> impl FnOnce(DbError) -> Self {
        move |source| Self::Query { op, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            Self::StorageUnavailable(e) => {
                tracing::error!(error = %e, "database connection error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database connection failed".to_string(),
                )
            }
            Self::Query { op, source } => {
                // Log the actual error, return generic message
                tracing::error!(?op, error = %source, "query failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    op.failure_message().to_string(),
                )
            }
            Self::NoFile => (
                StatusCode::BAD_REQUEST,
                "No image file uploaded".to_string(),
            ),
            Self::Multipart { message } => {
                tracing::error!(%message, "upload parse error");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            Self::Upload(e) => {
                let status = match &e {
                    IngestError::NotImage { .. } | IngestError::TooLarge { .. } => {
                        StatusCode::BAD_REQUEST
                    }
                    IngestError::Staging(_) | IngestError::Host(_) => {
                        tracing::error!(error = %e, "upload error");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.to_string())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ProviderError> for ApiError {
    fn from(e: ProviderError) -> Self {
        Self::StorageUnavailable(e)
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        Self::Upload(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::BadRequest {
            message: e.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(e: MultipartRejection) -> Self {
        Self::Multipart {
            message: e.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::Upload(IngestError::TooLarge {
                max: crate::media::MAX_IMAGE_BYTES,
            });
        }
        Self::Multipart {
            message: e.body_text(),
        }
    }
}
