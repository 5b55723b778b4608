//! CLI administration tool for content-edge.
//!
//! Drives the running service over its operational API: cache invalidation
//! after a publish and health checks, without crafting curl calls by hand.
//!
//! # Usage
//!
//! ```bash
//! # Expire the cached redirect list
//! cargo run --bin admin -- expire refresh-redirects
//!
//! # Expire cached personalization info
//! cargo run --bin admin -- expire refresh-personalize
//!
//! # Check service health
//! cargo run --bin admin -- health
//! ```
//!
//! # Environment Variables
//!
//! - `EDGE_BASE_URL` (optional): Service base URL, defaults to
//!   `http://localhost:3000`
//! - `EXPIRE_REMOTE_CACHE_SECRET` (required for `expire`): Shared secret
//! - `SECRET_SOURCE` (optional): `header` (default) or `query`, must match
//!   the service configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use serde_json::Value;
use std::env;

/// CLI tool for managing content-edge.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expire cached entries by tag
    Expire {
        /// Cache tag to expire (e.g. "refresh-redirects")
        tag: String,
    },

    /// Check service health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let base_url =
        env::var("EDGE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Expire { tag } => expire_tag(&client, &base_url, &tag).await,
        Commands::Health => health(&client, &base_url).await,
    }
}

async fn expire_tag(client: &reqwest::Client, base_url: &str, tag: &str) -> Result<()> {
    let secret = env::var("EXPIRE_REMOTE_CACHE_SECRET")
        .context("EXPIRE_REMOTE_CACHE_SECRET must be set")?;
    let secret_source = env::var("SECRET_SOURCE").unwrap_or_else(|_| "header".to_string());

    let url = format!("{}/api/expire-remote-cache", base_url);
    let mut request = client.post(&url).query(&[("tag", tag)]);
    request = match secret_source.as_str() {
        "query" => request.query(&[("secret", secret.as_str())]),
        _ => request.header("x-remote-cache-secret", &secret),
    };

    let response = request.send().await.context("Request failed")?;
    let status = response.status();
    let body: Value = response.json().await.context("Non-JSON response")?;
    let message = body["message"].as_str().unwrap_or("(no message)");

    if status.is_success() {
        println!("{} {}", "OK".green().bold(), message);
        Ok(())
    } else {
        println!("{} {} ({})", "FAILED".red().bold(), message, status);
        std::process::exit(1);
    }
}

async fn health(client: &reqwest::Client, base_url: &str) -> Result<()> {
    let url = format!("{}/health", base_url);
    let response = client.get(&url).send().await.context("Request failed")?;
    let status = response.status();
    let body: Value = response.json().await.context("Non-JSON response")?;

    let overall = body["status"].as_str().unwrap_or("unknown");
    let colored_overall = if overall == "healthy" {
        overall.green().bold()
    } else {
        overall.red().bold()
    };
    println!(
        "Service: {} (version {})",
        colored_overall,
        body["version"].as_str().unwrap_or("?")
    );

    if let Some(checks) = body["checks"].as_object() {
        for (name, check) in checks {
            let check_status = check["status"].as_str().unwrap_or("unknown");
            let marker = if check_status == "ok" {
                "ok".green()
            } else {
                "error".red()
            };
            let message = check["message"].as_str().unwrap_or("");
            println!("  {}: {} {}", name, marker, message);
        }
    }

    if !status.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
