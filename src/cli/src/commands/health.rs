//! Health check command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::client::ApiClient;

#[derive(Args)]
pub struct HealthArgs {}

pub async fn execute(_args: HealthArgs, client: &ApiClient) -> Result<()> {
    let health = client.get("/health", None).await?;

    let status = health
        .get("status")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");

    let label = if status == "ok" {
        status.green().bold()
    } else {
        status.red().bold()
    };

    println!("{} {}", "Server:".bold(), client.base_url());
    println!("{} {}", "Status:".bold(), label);

    Ok(())
}
