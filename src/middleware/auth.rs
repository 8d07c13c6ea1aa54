use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
};

use crate::auth::perm::RequiredPermission;
use crate::auth::{check_permissions, AuthError, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Verified caller of a protected route. Extracting it runs the whole
/// authorization check for permission `P` before the handler body executes.
#[derive(Debug)]
pub struct Authorized<P> {
    pub claims: Claims,
    /// Bearer token exactly as supplied, for handlers that call other APIs on the
    /// caller's behalf
    pub token: String,
    _permission: PhantomData<P>,
}

impl<P> Authorized<P> {
    pub fn subject(&self) -> &str {
        self.claims.sub.as_deref().unwrap_or("unknown")
    }
}

#[async_trait]
impl<P> FromRequestParts<AppState> for Authorized<P>
where
    P: RequiredPermission + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;
        let claims = state.verifier.verify(token).await?;
        check_permissions(P::PERMISSION, &claims)?;

        Ok(Self {
            claims,
            token: token.to_string(),
            _permission: PhantomData,
        })
    }
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers.get(AUTHORIZATION).ok_or_else(AuthError::header_missing)?;

    let auth_str = auth_header.to_str().map_err(|_| {
        AuthError::invalid_header(
            "Authorization header must be bearer token.",
            StatusCode::UNAUTHORIZED,
        )
    })?;

    let parts: Vec<&str> = auth_str.split(' ').collect();
    match parts.as_slice() {
        ["Bearer", token] => Ok(*token),
        [scheme, _] => {
            tracing::debug!("Rejected authorization scheme '{}'", scheme);
            Err(AuthError::invalid_header(
                "Authorization header must start with \"Bearer\".",
                StatusCode::UNAUTHORIZED,
            ))
        }
        [_] => Err(AuthError::invalid_header("Token not found.", StatusCode::UNAUTHORIZED)),
        _ => Err(AuthError::invalid_header(
            "Authorization header must be bearer token.",
            StatusCode::UNAUTHORIZED,
        )),
    }
}
