use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{Jwk, JwkSet};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum KeySetError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid JWKS URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to read JWKS file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JWKS document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to fetch JWKS: {0}")]
    Fetch(#[from] reqwest::Error),
}

/// Minimum time between two fetches of a remote key set
const REFETCH_INTERVAL: Duration = Duration::from_secs(30);

enum Source {
    Static(JwkSet),
    Remote {
        url: Url,
        client: reqwest::Client,
        cached: RwLock<Option<Cached>>,
    },
}

struct Cached {
    set: JwkSet,
    fetched_at: Instant,
}

/// Public keys used to verify token signatures, looked up by key id
pub struct KeySet {
    source: Source,
}

impl KeySet {
    /// Fixed key set, never refreshed
    pub fn from_jwks(jwks: JwkSet) -> Self {
        Self {
            source: Source::Static(jwks),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, KeySetError> {
        Ok(Self::from_jwks(serde_json::from_str(text)?))
    }

    /// Key set fetched from `url` on first use and cached. A lookup miss refetches,
    /// at most once per `REFETCH_INTERVAL`.
    pub fn remote(url: Url) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            source: Source::Remote {
                url,
                client,
                cached: RwLock::new(None),
            },
        })
    }

    /// Pick the key source from config: a local file wins, then an explicit URL,
    /// then the provider's well-known endpoint
    pub fn from_config(config: &AuthConfig) -> Result<Self, KeySetError> {
        if let Some(path) = &config.jwks_path {
            info!("Loading signing keys from {}", path);
            return Self::from_json(&std::fs::read_to_string(path)?);
        }

        let url = match &config.jwks_url {
            Some(url) => Url::parse(url)?,
            None => Self::well_known_url(&config.domain)?,
        };
        info!("Signing keys will be fetched from {}", url);
        Self::remote(url)
    }

    pub fn well_known_url(domain: &str) -> Result<Url, KeySetError> {
        if domain.trim().is_empty() {
            return Err(KeySetError::ConfigMissing("AUTH0_DOMAIN"));
        }
        Ok(Url::parse(&format!("https://{}/", domain))?.join(".well-known/jwks.json")?)
    }

    /// Find the key with id `kid`. A remote set is refetched when the cached copy
    /// does not contain it, so rotated keys are picked up.
    pub async fn find(&self, kid: &str) -> Result<Option<Jwk>, KeySetError> {
        match &self.source {
            Source::Static(set) => Ok(set.find(kid).cloned()),
            Source::Remote {
                url,
                client,
                cached,
            } => {
                if let Some(current) = cached.read().await.as_ref() {
                    if let Some(key) = current.set.find(kid) {
                        return Ok(Some(key.clone()));
                    }
                    if current.fetched_at.elapsed() < REFETCH_INTERVAL {
                        debug!("No signing key with kid '{}'; keys fetched recently", kid);
                        return Ok(None);
                    }
                }

                let mut slot = cached.write().await;
                // Another request may have refreshed the set while we waited
                if let Some(current) = slot.as_ref() {
                    if current.fetched_at.elapsed() < REFETCH_INTERVAL {
                        return Ok(current.set.find(kid).cloned());
                    }
                }

                debug!("Fetching signing keys from {}", url);
                let fresh: JwkSet = client
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;

                let key = fresh.find(kid).cloned();
                if key.is_none() {
                    warn!("No signing key with kid '{}' at {}", kid, url);
                }
                *slot = Some(Cached {
                    set: fresh,
                    fetched_at: Instant::now(),
                });
                Ok(key)
            }
        }
    }
}
