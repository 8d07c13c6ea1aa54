#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use drinks_api::{
    auth::{KeySet, TokenVerifier},
    config::SecurityConfig,
    database::{
        models::{Ingredient, NewDrink, Recipe},
        DrinkRepository, MemoryDrinkRepository,
    },
    AppState,
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

/// base64url HS256 secret shared by the test JWKS and the token minter
pub const SECRET: &str = "c2VjcmV0c2lnbmluZ2tleWZvcmRyaW5rc2FwaXRlc3Rz";
pub const KID: &str = "test-key";
pub const AUDIENCE: &str = "drinks";
pub const ISSUER: &str = "https://drinks.test/";

pub const ALL_PERMISSIONS: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

pub struct TestApp {
    pub router: Router,
    pub drinks: Arc<MemoryDrinkRepository>,
}

/// Router over an empty in-memory store, trusting a single static HS256 key
pub fn test_app() -> TestApp {
    let jwks = json!({"keys": [{"kty": "oct", "kid": KID, "alg": "HS256", "k": SECRET}]});
    let keys = KeySet::from_json(&jwks.to_string()).expect("test jwks");
    let verifier = TokenVerifier::new(keys, AUDIENCE, ISSUER, vec![Algorithm::HS256]);

    let drinks = Arc::new(MemoryDrinkRepository::new());
    let state = AppState::new(drinks.clone(), verifier);
    let security = SecurityConfig {
        cors_origins: Vec::new(),
    };

    TestApp {
        router: drinks_api::app(state, &security),
        drinks,
    }
}

impl TestApp {
    pub async fn seed(&self, title: &str) -> i32 {
        self.drinks
            .insert(NewDrink {
                title: title.to_string(),
                recipe: Recipe::new(vec![
                    Ingredient {
                        name: "espresso".to_string(),
                        color: "brown".to_string(),
                        parts: 1,
                    },
                    Ingredient {
                        name: "milk".to_string(),
                        color: "white".to_string(),
                        parts: 2,
                    },
                ]),
            })
            .await
            .expect("seed drink")
            .id
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }
}

/// Claims for a token valid for the next hour
pub fn claims(permissions: &[&str]) -> Value {
    json!({
        "sub": "auth0|barista",
        "aud": AUDIENCE,
        "iss": ISSUER,
        "iat": chrono::Utc::now().timestamp(),
        "exp": chrono::Utc::now().timestamp() + 3600,
        "permissions": permissions
    })
}

pub fn sign(claims: &Value) -> String {
    sign_with_kid(claims, Some(KID))
}

pub fn sign_with_kid(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_base64_secret(SECRET).expect("test secret");
    encode(&header, claims, &key).expect("sign token")
}

pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions))
}

pub fn manager_token() -> String {
    token(ALL_PERMISSIONS)
}
