pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, patch},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
pub use crate::state::AppState;

/// Build the HTTP router over the given application state
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        .route("/health", get(public::health))
        .route(
            "/drinks",
            get(public::drinks_list)
                .post(protected::drinks_create)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/drinks-detail",
            get(protected::drinks_detail).fallback(handlers::method_not_allowed),
        )
        .route(
            "/drinks/:id",
            patch(protected::drinks_update)
                .delete(protected::drinks_delete)
                .fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        // Global middleware
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}
