use clap::Parser;
use drinks_api::{cli::Cli, config::AppConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH0_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drinks_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Drinks API in {:?} mode", config.environment);

    let cli = Cli::parse();

    if let Err(e) = drinks_api::cli::run(cli, config).await {
        match std::env::var("CLI_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
