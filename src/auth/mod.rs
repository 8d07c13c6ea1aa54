pub mod jwks;
pub mod verifier;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use jwks::{KeySet, KeySetError};
pub use verifier::TokenVerifier;

/// Authorization failure: a stable machine code, a human description and the HTTP status
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {description}")]
pub struct AuthError {
    pub code: &'static str,
    pub description: &'static str,
    pub status: StatusCode,
}

impl AuthError {
    pub fn new(code: &'static str, description: &'static str, status: StatusCode) -> Self {
        Self {
            code,
            description,
            status,
        }
    }

    pub fn header_missing() -> Self {
        Self::new(
            "authorization_header_missing",
            "Authorization header is expected.",
            StatusCode::UNAUTHORIZED,
        )
    }

    pub fn invalid_header(description: &'static str, status: StatusCode) -> Self {
        Self::new("invalid_header", description, status)
    }

    pub fn token_expired() -> Self {
        Self::new("token_expired", "Token expired.", StatusCode::UNAUTHORIZED)
    }

    pub fn invalid_claims(description: &'static str, status: StatusCode) -> Self {
        Self::new("invalid_claims", description, status)
    }

    pub fn unauthorized() -> Self {
        Self::new("unauthorized", "Permission not found.", StatusCode::UNAUTHORIZED)
    }
}

/// Permissions the drinks API checks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    GetDrinksDetail,
    PostDrinks,
    PatchDrinks,
    DeleteDrinks,
}

impl Permission {
    pub const ALL: [Permission; 4] = [
        Permission::GetDrinksDetail,
        Permission::PostDrinks,
        Permission::PatchDrinks,
        Permission::DeleteDrinks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::GetDrinksDetail => "get:drinks-detail",
            Permission::PostDrinks => "post:drinks",
            Permission::PatchDrinks => "patch:drinks",
            Permission::DeleteDrinks => "delete:drinks",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or(())
    }
}

/// Decoded payload of a verified bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub iss: Option<String>,
    /// String or array, as issued
    pub aud: Option<Value>,
    pub exp: Option<i64>,
    pub iat: Option<i64>,
    pub permissions: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Known permissions in the `permissions` claim; `None` when the claim is absent.
    /// Strings this API does not recognise are dropped.
    pub fn permission_set(&self) -> Option<HashSet<Permission>> {
        self.permissions
            .as_ref()
            .map(|list| list.iter().filter_map(|p| p.parse().ok()).collect())
    }
}

/// Require `permission` to be present in the token's `permissions` claim
pub fn check_permissions(permission: Permission, claims: &Claims) -> Result<(), AuthError> {
    let granted = claims.permission_set().ok_or_else(|| {
        AuthError::invalid_claims("Permissions not included in JWT.", StatusCode::BAD_REQUEST)
    })?;

    if !granted.contains(&permission) {
        return Err(AuthError::unauthorized());
    }
    Ok(())
}

/// Marker types naming the permission a route requires, for use with
/// [`crate::middleware::auth::Authorized`]
pub mod perm {
    use super::Permission;

    pub trait RequiredPermission {
        const PERMISSION: Permission;
    }

    macro_rules! required_permission {
        ($($name:ident),* $(,)?) => {
            $(
                #[derive(Debug)]
                pub struct $name;

                impl RequiredPermission for $name {
                    const PERMISSION: Permission = Permission::$name;
                }
            )*
        };
    }

    required_permission!(GetDrinksDetail, PostDrinks, PatchDrinks, DeleteDrinks);
}
