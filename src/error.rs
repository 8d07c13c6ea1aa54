// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::jwks::KeySetError;
use crate::auth::AuthError;
use crate::database::manager::DatabaseError;
use crate::database::models::drink::DrinkError;

/// HTTP API error. The `String` payloads carry internal detail for the logs;
/// clients only ever see the fixed message for the status.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed,

    // 409 Conflict
    Conflict(String),

    // 422 Unprocessable Entity
    UnprocessableEntity(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 400/401 from the authorization checker
    Auth(AuthError),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(err) => err.status,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(_) => "Bad Request",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "resource not found",
            ApiError::MethodNotAllowed => "Method Not Allowed",
            ApiError::Conflict(_) => "duplicate_resource",
            ApiError::UnprocessableEntity(_) => "unprocessable",
            ApiError::InternalServerError(_) => "Server Error",
            ApiError::Auth(err) => err.description,
        }
    }

    /// Internal detail, for logging only
    pub fn detail(&self) -> &str {
        match self {
            ApiError::BadRequest(d)
            | ApiError::Forbidden(d)
            | ApiError::NotFound(d)
            | ApiError::Conflict(d)
            | ApiError::UnprocessableEntity(d)
            | ApiError::InternalServerError(d) => d,
            ApiError::MethodNotAllowed => "",
            ApiError::Auth(err) => err.code,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let status = self.status_code().as_u16();
        match self {
            ApiError::Auth(err) => json!({
                "success": false,
                "error": status,
                "code": err.code,
                "message": err.description
            }),
            _ => json!({
                "success": false,
                "error": status,
                "message": self.message()
            }),
        }
    }
}

impl ApiError {
    pub fn bad_request(detail: impl Into<String>) -> Self {
        ApiError::BadRequest(detail.into())
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        ApiError::Forbidden(detail.into())
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        ApiError::NotFound(detail.into())
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        ApiError::Conflict(detail.into())
    }

    pub fn unprocessable(detail: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(detail.into())
    }

    pub fn internal_server_error(detail: impl Into<String>) -> Self {
        ApiError::InternalServerError(detail.into())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl From<DrinkError> for ApiError {
    fn from(err: DrinkError) -> Self {
        ApiError::unprocessable(err.to_string())
    }
}

impl From<KeySetError> for ApiError {
    fn from(err: KeySetError) -> Self {
        tracing::error!("Signing key lookup failed: {}", err);
        ApiError::internal_server_error("signing keys unavailable")
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(msg) => ApiError::conflict(msg),
            DatabaseError::Constraint(msg) => ApiError::unprocessable(msg),
            DatabaseError::Sqlx(sqlx::Error::RowNotFound) => ApiError::not_found("row not found"),
            DatabaseError::Corrupt(e) => {
                tracing::error!("Unreadable drink row: {}", e);
                ApiError::internal_server_error("corrupt row")
            }
            other => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("database error")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.detail())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "{}", self);
        }
        (status, Json(self.to_json())).into_response()
    }
}
