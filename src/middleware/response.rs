use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};

/// Wrapper for API responses that adds `"success": true` alongside the body's fields
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub body: T,
}

/// `{"drinks": [...]}`
#[derive(Debug, Serialize)]
pub struct DrinkList<T: Serialize> {
    pub drinks: Vec<T>,
}

/// `{"delete": <id>}`
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub delete: i32,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(body: T) -> Self {
        Self { body }
    }
}

impl<T: Serialize> ApiResponse<DrinkList<T>> {
    pub fn drinks(drinks: Vec<T>) -> Self {
        Self::success(DrinkList { drinks })
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = match serde_json::to_value(&self.body) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::error!("Response body must serialize to an object, got {}", other);
                return server_error();
            }
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return server_error();
            }
        };
        envelope.insert("success".to_string(), Value::Bool(true));

        (StatusCode::OK, Json(Value::Object(envelope))).into_response()
    }
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": 500,
            "message": "Server Error"
        })),
    )
        .into_response()
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
