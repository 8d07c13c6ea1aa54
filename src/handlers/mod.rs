// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token carrying the route's permission)

pub mod protected;
pub mod public;

use axum::http::Uri;

use crate::error::ApiError;

/// Fallback for paths no route matches
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("no route for {}", uri.path()))
}

/// Fallback for known paths hit with an unsupported method
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
