// handlers/protected/drinks.rs - Permission-gated drink handlers
//
// Each handler takes an `Authorized<P>` extractor first, so the token and the
// required permission are checked before the path id or body are looked at.

use axum::{
    body::Bytes,
    extract::{Path, State},
};
use serde_json::Value;
use tracing::{info, warn};

use crate::auth::perm;
use crate::database::models::{DrinkLong, DrinkPatch, NewDrink};
use crate::error::ApiError;
use crate::middleware::auth::Authorized;
use crate::middleware::response::{ApiResponse, ApiResult, Deleted, DrinkList};
use crate::state::AppState;

/// GET /drinks-detail - List every drink in the long projection
pub async fn detail(
    State(state): State<AppState>,
    _auth: Authorized<perm::GetDrinksDetail>,
) -> ApiResult<DrinkList<DrinkLong>> {
    let drinks = state.drinks.list_all().await?;
    if drinks.is_empty() {
        return Err(ApiError::not_found("no drinks"));
    }

    Ok(ApiResponse::drinks(drinks.iter().map(|d| d.long()).collect()))
}

/// POST /drinks - Create a drink from `{title, recipe}`
///
/// Any failure to build or store the drink is reported as 422.
pub async fn create(
    State(state): State<AppState>,
    auth: Authorized<perm::PostDrinks>,
    body: Bytes,
) -> ApiResult<DrinkList<DrinkLong>> {
    let unprocessable = |detail: String| {
        warn!("Rejected drink from {}: {}", auth.subject(), detail);
        ApiError::unprocessable(detail)
    };

    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| unprocessable(e.to_string()))?;
    let new_drink = NewDrink::from_payload(payload).map_err(|e| unprocessable(e.to_string()))?;
    let drink = state
        .drinks
        .insert(new_drink)
        .await
        .map_err(|e| unprocessable(e.to_string()))?;

    info!("Drink {} '{}' created by {}", drink.id, drink.title, auth.subject());
    Ok(ApiResponse::drinks(vec![drink.long()]))
}

/// PATCH /drinks/:id - Update title and/or recipe; unset fields are kept
pub async fn update(
    State(state): State<AppState>,
    auth: Authorized<perm::PatchDrinks>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<DrinkList<DrinkLong>> {
    let id = parse_id(&id)?;
    let mut drink = state
        .drinks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("drink {}", id)))?;

    let payload: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::bad_request(e.to_string()))?;
    DrinkPatch::from_payload(payload)?.apply(&mut drink);
    state.drinks.update(&drink).await?;

    info!("Drink {} updated by {}", drink.id, auth.subject());
    Ok(ApiResponse::drinks(vec![drink.long()]))
}

/// DELETE /drinks/:id - Remove a drink, returning only its id
pub async fn delete(
    State(state): State<AppState>,
    auth: Authorized<perm::DeleteDrinks>,
    Path(id): Path<String>,
) -> ApiResult<Deleted> {
    let id = parse_id(&id)?;
    let drink = state
        .drinks
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("drink {}", id)))?;

    state.drinks.delete(&drink).await?;

    info!("Drink {} deleted by {}", id, auth.subject());
    Ok(ApiResponse::success(Deleted { delete: id }))
}

/// Only integer ids are routable; anything else is a missing resource
fn parse_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("no drink route for id '{}'", raw)))
}
