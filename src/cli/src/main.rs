//! Bazaar CLI - command-line interface for operating a Bazaar server.

mod client;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{health, seed};

/// Bazaar - multi-role marketplace server CLI
#[derive(Parser)]
#[command(
    name = "bazaar",
    version,
    about = "Bazaar - multi-role marketplace server CLI",
    long_about = "CLI tool for checking a Bazaar server and seeding it with demo data.",
    propagate_version = true
)]
pub struct Cli {
    /// API server URL
    #[arg(long, global = true, env = "BAZAAR_API_URL")]
    api_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health
    Health(health::HealthArgs),

    /// Seed the server with demo accounts and resources
    Seed(seed::SeedArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let api_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    let client = client::ApiClient::new(&api_url)?;

    match cli.command {
        Commands::Health(args) => health::execute(args, &client).await,
        Commands::Seed(args) => seed::execute(args, &client).await,
    }
}
