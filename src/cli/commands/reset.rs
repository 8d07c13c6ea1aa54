use anyhow::Context;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

/// Wipe the drinks table and insert the seed record
pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    DatabaseManager::reset(&pool).await.context("failed to reset drinks table")?;
    pool.close().await;
    Ok(())
}
