use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use service::errors::ServiceError;

/// Error body: `{error, message, detail?, invalidIds?}`
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Option<String>,
    pub invalid_ids: Option<Vec<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    invalid_ids: Option<&'a [String]>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, message: message.into(), detail, invalid_ids: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, None)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message, None)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message, None)
    }

    /// Map a service failure to a response. Internal detail is only kept
    /// when `expose_detail` is set (development).
    pub fn from_service(e: ServiceError, expose_detail: bool) -> Self {
        match e {
            ServiceError::Validation(m) => Self::bad_request(m),
            ServiceError::InvalidId(ids) => Self {
                status: StatusCode::BAD_REQUEST,
                message: format!("invalid id: {}", ids.join(", ")),
                detail: None,
                invalid_ids: Some(ids),
            },
            ServiceError::NotFound(m) => Self::new(StatusCode::NOT_FOUND, m, None),
            ServiceError::Conflict(m) => Self::new(StatusCode::CONFLICT, m, None),
            other => {
                error!(code = other.code(), err = %other, "request failed");
                let message = match other {
                    ServiceError::Storage(_) => "object storage request failed",
                    _ => "internal server error",
                };
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, expose_detail.then(|| other.to_string()))
            }
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.status.canonical_reason().unwrap_or("Error"),
            message: &self.message,
            detail: self.detail.as_deref(),
            invalid_ids: self.invalid_ids.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(r: JsonRejection) -> Self {
        warn!(err = %r.body_text(), "rejected json body");
        Self::bad_request(r.body_text())
    }
}

impl From<QueryRejection> for JsonApiError {
    fn from(r: QueryRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<PathRejection> for JsonApiError {
    fn from(r: PathRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<MultipartRejection> for JsonApiError {
    fn from(r: MultipartRejection) -> Self {
        Self::bad_request(r.body_text())
    }
}

impl From<MultipartError> for JsonApiError {
    fn from(e: MultipartError) -> Self {
        let status = e.status();
        let status = if status.is_client_error() { status } else { StatusCode::BAD_REQUEST };
        Self::new(status, e.body_text(), None)
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
