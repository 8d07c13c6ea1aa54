pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "drinks-api")]
#[command(about = "Drink catalog API with role-based JWT authorization")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Drop and recreate the drinks table with the seed record, then exit")]
    ResetDb,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::handle(args, config).await,
        Some(Commands::ResetDb) => commands::reset::handle(config).await,
        None => commands::serve::handle(Default::default(), config).await,
    }
}
