use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    /// Seconds to wait for a pooled connection
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider domain; tokens must be issued by `https://<domain>/`
    pub domain: String,
    pub audience: String,
    pub algorithms: Vec<Algorithm>,
    /// Overrides `https://<domain>/.well-known/jwks.json`
    pub jwks_url: Option<String>,
    /// Local JWKS file, used instead of fetching
    pub jwks_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Empty means any origin
    pub cors_origins: Vec<String>,
}

impl AuthConfig {
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source (the process environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Server overrides
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("DRINKS_API_PORT").or_else(|| lookup("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Auth overrides
        if let Some(v) = lookup("AUTH0_DOMAIN") {
            self.auth.domain = v;
        }
        if let Some(v) = lookup("API_AUDIENCE") {
            self.auth.audience = v;
        }
        if let Some(v) = lookup("ALGORITHMS") {
            let parsed: Vec<Algorithm> = v
                .split(',')
                .filter_map(|s| Algorithm::from_str(s.trim()).ok())
                .collect();
            if !parsed.is_empty() {
                self.auth.algorithms = parsed;
            }
        }
        if let Some(v) = lookup("JWKS_URL") {
            self.auth.jwks_url = Some(v);
        }
        if let Some(v) = lookup("JWKS_PATH") {
            self.auth.jwks_path = Some(v);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    fn auth_defaults() -> AuthConfig {
        AuthConfig {
            domain: String::new(),
            audience: "drinks".to_string(),
            algorithms: vec![Algorithm::RS256],
            jwks_url: None,
            jwks_path: None,
        }
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
            },
            auth: Self::auth_defaults(),
            security: SecurityConfig {
                cors_origins: Vec::new(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
            },
            auth: Self::auth_defaults(),
            security: SecurityConfig {
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
            },
            auth: Self::auth_defaults(),
            security: SecurityConfig {
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}
