//! OCPI response envelope and error mapping
//!
//! Every OCPI endpoint answers `{data, status_code, status_message, timestamp}`.
//! Domain errors collapse to status code 2001 in the body while the HTTP
//! status keeps the finer taxonomy.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::DomainError;

/// Generic success
pub const STATUS_SUCCESS: u32 = 1000;
/// Invalid or missing parameters, rejected before any business logic ran
pub const STATUS_MALFORMED: u32 = 1001;
/// Business-rule, authentication or store failure
pub const STATUS_CORE_ERROR: u32 = 2001;

/// OCPI response envelope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OcpiResponse<T> {
    /// Payload; `null` on errors and on operations without a result
    pub data: Option<T>,
    pub status_code: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> OcpiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            status_code: STATUS_SUCCESS,
            status_message: Some("Success".into()),
            timestamp: Utc::now(),
        }
    }

    /// Success without payload, e.g. after a delete.
    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            data: None,
            status_code: STATUS_SUCCESS,
            status_message: Some(message.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn error(status_code: u32, message: impl Into<String>) -> Self {
        Self {
            data: None,
            status_code,
            status_message: Some(message.into()),
            timestamp: Utc::now(),
        }
    }
}

/// Error returned by OCPI handlers
#[derive(Debug)]
pub enum ApiError {
    /// Request failed structural checks before reaching the service
    Malformed(String),
    /// Route-level miss, e.g. an unsupported OCPI version
    NotFound(String),
    Domain(DomainError),
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self::Domain(e)
    }
}

/// Transport status for a domain error.
pub fn http_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        DomainError::Canceled => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Malformed(message) => (
                StatusCode::BAD_REQUEST,
                OcpiResponse::<()>::error(STATUS_MALFORMED, message),
            ),
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                OcpiResponse::<()>::error(STATUS_CORE_ERROR, message),
            ),
            Self::Domain(e) => (
                http_status(&e),
                OcpiResponse::<()>::error(STATUS_CORE_ERROR, e.to_string()),
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<OcpiResponse<T>>, ApiError>;
