use std::time::Duration;

use sqlx::{error::ErrorKind, postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::database::models::drink::{DrinkError, NewDrink};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate value: {0}")]
    Conflict(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Stored record is unreadable: {0}")]
    Corrupt(#[from] DrinkError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a write failure, lifting constraint violations out of raw sqlx errors
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return DatabaseError::Conflict(db.message().to_string());
            }
            // 22001: string_data_right_truncation (value too long for column)
            if matches!(db.kind(), ErrorKind::CheckViolation | ErrorKind::NotNullViolation)
                || db.code().as_deref() == Some("22001")
            {
                return DatabaseError::Constraint(db.message().to_string());
            }
        }
        DatabaseError::Sqlx(err)
    }
}

// Column widths must match TITLE_MAX_CHARS and RECIPE_MAX_CHARS
const CREATE_TABLE_SQL: &str = "CREATE TABLE IF NOT EXISTS drinks (
    id SERIAL PRIMARY KEY,
    title VARCHAR(80) NOT NULL UNIQUE,
    recipe VARCHAR(180) NOT NULL
)";

/// Pool construction and schema management for the drinks database
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open a connection pool using the configured URL and limits
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let raw = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url.as_str())
            .await?;

        info!(
            "Connected to database {} (max {} connections)",
            url.path().trim_start_matches('/'),
            config.max_connections
        );
        Ok(pool)
    }

    /// Create the drinks table if it is missing
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_TABLE_SQL).execute(pool).await?;
        Ok(())
    }

    /// Drop all drinks, recreate the table and insert the seed record
    pub async fn reset(pool: &PgPool) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drinks")
            .execute(&mut *tx)
            .await?;
        sqlx::query(CREATE_TABLE_SQL).execute(&mut *tx).await?;

        let seed = NewDrink::seed();
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2)")
            .bind(&seed.title)
            .bind(seed.recipe.to_storage()?)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Reset drinks table with seed record '{}'", seed.title);
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
