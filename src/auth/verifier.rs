use axum::http::StatusCode;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use tracing::debug;

use crate::auth::{AuthError, Claims, KeySet};
use crate::config::AuthConfig;
use crate::error::ApiError;

/// Verifies bearer tokens against a key set, audience and issuer
pub struct TokenVerifier {
    keys: KeySet,
    audience: String,
    issuer: String,
    algorithms: Vec<Algorithm>,
}

impl TokenVerifier {
    pub fn new(
        keys: KeySet,
        audience: impl Into<String>,
        issuer: impl Into<String>,
        algorithms: Vec<Algorithm>,
    ) -> Self {
        Self {
            keys,
            audience: audience.into(),
            issuer: issuer.into(),
            algorithms,
        }
    }

    pub fn from_config(keys: KeySet, config: &AuthConfig) -> Self {
        Self::new(keys, &config.audience, config.issuer(), config.algorithms.clone())
    }

    /// Verify `token` and return its claims.
    ///
    /// Header problems (undecodable, no `kid`, unknown `kid`) are 401 `invalid_header`;
    /// expiry is 401 `token_expired`; audience or issuer mismatch is 401
    /// `invalid_claims`; every other verification failure is 400 `invalid_header`.
    /// Failing to obtain the key set at all is a server error.
    pub async fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let header = decode_header(token).map_err(|e| {
            debug!("Undecodable token header: {}", e);
            AuthError::invalid_header("Authorization malformed.", StatusCode::UNAUTHORIZED)
        })?;

        let kid = header.kid.ok_or_else(|| {
            AuthError::invalid_header("Authorization malformed.", StatusCode::UNAUTHORIZED)
        })?;

        let jwk = self.keys.find(&kid).await?.ok_or_else(|| {
            AuthError::invalid_header("Unable to find the appropriate key.", StatusCode::UNAUTHORIZED)
        })?;

        let unparseable = || {
            AuthError::invalid_header("Unable to parse authentication token.", StatusCode::BAD_REQUEST)
        };

        if !self.algorithms.contains(&header.alg) {
            debug!("Token algorithm {:?} is not accepted", header.alg);
            return Err(unparseable().into());
        }

        let key = DecodingKey::from_jwk(&jwk).map_err(|e| {
            debug!("Unusable key '{}': {}", kid, e);
            unparseable()
        })?;

        let mut validation = Validation::new(header.alg);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        match decode::<Claims>(token, &key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                debug!("Token rejected: {}", e);
                let err = match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::token_expired(),
                    ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::invalid_claims(
                        "Incorrect claims. Please, check the audience and issuer.",
                        StatusCode::UNAUTHORIZED,
                    ),
                    _ => unparseable(),
                };
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};

    const SECRET: &str = "c2VjcmV0c2lnbmluZ2tleWZvcmRyaW5rc2FwaXRlc3Rz";
    const ISSUER: &str = "https://drinks.test/";

    fn verifier() -> TokenVerifier {
        let jwks = json!({"keys": [{"kty": "oct", "kid": "k1", "alg": "HS256", "k": SECRET}]});
        let keys = KeySet::from_json(&jwks.to_string()).unwrap();
        TokenVerifier::new(keys, "drinks", ISSUER, vec![Algorithm::HS256])
    }

    fn token(kid: Option<&str>, claims: Value) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = kid.map(str::to_string);
        encode(&header, &claims, &EncodingKey::from_base64_secret(SECRET).unwrap()).unwrap()
    }

    fn claims(aud: &str, iss: &str, exp_offset: i64) -> Value {
        json!({
            "sub": "auth0|barista",
            "aud": aud,
            "iss": iss,
            "exp": chrono::Utc::now().timestamp() + exp_offset,
            "permissions": ["get:drinks-detail"]
        })
    }

    fn auth_error(result: Result<Claims, ApiError>) -> AuthError {
        match result {
            Err(ApiError::Auth(e)) => e,
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let c = verifier()
            .verify(&token(Some("k1"), claims("drinks", ISSUER, 3600)))
            .await
            .unwrap();
        assert_eq!(c.sub.as_deref(), Some("auth0|barista"));
        assert_eq!(c.permissions, Some(vec!["get:drinks-detail".to_string()]));
    }

    #[tokio::test]
    async fn expired_token() {
        let err = auth_error(
            verifier()
                .verify(&token(Some("k1"), claims("drinks", ISSUER, -3600)))
                .await,
        );
        assert_eq!(err, AuthError::token_expired());
    }

    #[tokio::test]
    async fn wrong_audience_or_issuer() {
        let v = verifier();
        let err = auth_error(v.verify(&token(Some("k1"), claims("tea", ISSUER, 3600))).await);
        assert_eq!((err.code, err.status), ("invalid_claims", StatusCode::UNAUTHORIZED));

        let err = auth_error(
            v.verify(&token(Some("k1"), claims("drinks", "https://evil.test/", 3600)))
                .await,
        );
        assert_eq!((err.code, err.status), ("invalid_claims", StatusCode::UNAUTHORIZED));
    }

    #[tokio::test]
    async fn header_problems_are_401_invalid_header() {
        let v = verifier();
        for t in [
            "not-a-jwt".to_string(),
            token(None, claims("drinks", ISSUER, 3600)),
            token(Some("unknown"), claims("drinks", ISSUER, 3600)),
        ] {
            let err = auth_error(v.verify(&t).await);
            assert_eq!((err.code, err.status), ("invalid_header", StatusCode::UNAUTHORIZED));
        }
    }

    #[tokio::test]
    async fn bad_signature_is_400_invalid_header() {
        let mut t = token(Some("k1"), claims("drinks", ISSUER, 3600));
        // Flip a character in the middle of the signature segment
        let idx = t.len() - 10;
        let replacement = if &t[idx..idx + 1] == "A" { "B" } else { "A" };
        t.replace_range(idx..idx + 1, replacement);

        let err = auth_error(verifier().verify(&t).await);
        assert_eq!((err.code, err.status), ("invalid_header", StatusCode::BAD_REQUEST));
    }
}
