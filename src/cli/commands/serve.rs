use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use tracing::{info, warn};

use crate::auth::{KeySet, TokenVerifier};
use crate::config::AppConfig;
use crate::database::{DatabaseManager, DrinkRepository, MemoryDrinkRepository, PgDrinkRepository};
use crate::state::AppState;

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep drinks in memory instead of PostgreSQL")]
    pub memory: bool,

    #[arg(long, help = "Drop all drinks and insert the seed record before serving")]
    pub reset_db: bool,
}

pub async fn handle(args: ServeArgs, config: AppConfig) -> anyhow::Result<()> {
    let drinks: Arc<dyn DrinkRepository> = if args.memory {
        warn!("Using in-memory storage; drinks are lost on exit");
        Arc::new(MemoryDrinkRepository::new())
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        DatabaseManager::ensure_schema(&pool)
            .await
            .context("failed to create drinks table")?;
        Arc::new(PgDrinkRepository::new(pool))
    };

    if args.reset_db {
        drinks.reset().await.context("failed to reset drinks")?;
    }

    let keys = KeySet::from_config(&config.auth).context("failed to configure signing keys")?;
    let verifier = TokenVerifier::from_config(keys, &config.auth);
    let state = AppState::new(drinks, verifier);
    let app = crate::app(state, &config.security);

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Drinks API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
