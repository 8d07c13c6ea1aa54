// handlers/public/drinks.rs - GET /drinks handler

use axum::extract::State;

use crate::database::models::DrinkShort;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult, DrinkList};
use crate::state::AppState;

/// GET /drinks - List every drink in the short projection (ingredient names hidden)
///
/// An empty catalog is reported as 404 rather than an empty list.
pub async fn list(State(state): State<AppState>) -> ApiResult<DrinkList<DrinkShort>> {
    let drinks = state.drinks.list_all().await?;
    if drinks.is_empty() {
        return Err(ApiError::not_found("no drinks"));
    }

    Ok(ApiResponse::drinks(drinks.iter().map(|d| d.short()).collect()))
}
