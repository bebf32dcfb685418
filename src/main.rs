//! Hextech API - command-line client
//!
//! Talks to the backend through the same [`ApiClient`] the application uses:
//! prints the champion tier list or performs ad-hoc reads and writes.
//!
//! # Startup Sequence
//! 1. Parse arguments
//! 2. Load configuration from environment variables
//! 3. Initialize tracing (debug level when `DEBUG_API=true`)
//! 4. Build the client and run the command, cancelling it on Ctrl+C

use std::time::Duration;

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hextech_api::models::{filter_rows, Origin};
use hextech_api::{ApiClient, CancellationToken, ChampionsApi, ClientConfig, ReadOptions};

/// Hextech API client
#[derive(Parser, Debug)]
#[command(name = "hextech_api")]
#[command(about = "Query the Hextech backend through the shared API client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the champion tier list
    Stats {
        /// Keep rows whose name or role contains this text
        #[arg(short, long, default_value = "")]
        filter: String,
        /// Cache window in milliseconds (0 disables caching)
        #[arg(long, default_value_t = 60_000)]
        ttl_ms: u64,
    },
    /// GET a path and print the JSON response
    Get {
        path: String,
        /// Query parameter as key=value (repeatable)
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// POST a JSON body to a path and print the JSON response
    Post {
        path: String,
        /// Request body as JSON text
        #[arg(long)]
        body: Option<String>,
    },
}

/// Parses a `key=value` query parameter.
fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from environment variables
    let config = ClientConfig::from_env();

    // Defaults to "info", can be overridden with RUST_LOG env var
    let default_filter = if config.debug {
        "hextech_api=debug"
    } else {
        "hextech_api=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!(
        "Configuration loaded: base_url={}, timeout={}ms, debug={}, single_flight={}",
        config.base_url,
        config.timeout.as_millis(),
        config.debug,
        config.single_flight
    );

    let client = ApiClient::new(config).context("failed to build API client")?;

    let cancel = CancellationToken::new();
    let signal_handle = tokio::spawn(cancel_on_signal(cancel.clone()));

    let outcome = run(cli.command, client, cancel).await;
    signal_handle.abort();
    outcome
}

async fn run(command: Command, client: ApiClient, cancel: CancellationToken) -> anyhow::Result<()> {
    match command {
        Command::Stats { filter, ttl_ms } => {
            let api = ChampionsApi::new(client).with_ttl(Duration::from_millis(ttl_ms));
            let fetched = api
                .stats(Some(cancel))
                .await
                .context("failed to load champion stats")?;

            if let Origin::Cache { cached_at } = fetched.origin {
                info!("Serving tier list cached at {}", cached_at.with_timezone(&Local));
            }

            let rows = filter_rows(&fetched.value, &filter);
            println!(
                "{:<16} {:<10} {:>7} {:>7} {:>7} {:>8}",
                "Name", "Role", "Pick %", "Win %", "Ban %", "Matches"
            );
            for row in &rows {
                println!("{}", row);
            }
            info!("{} of {} champions shown", rows.len(), fetched.value.len());
        }
        Command::Get { path, params } => {
            let params: Map<String, Value> = params
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            let params = Value::Object(params);
            let options = ReadOptions::new().with_cancel(cancel);

            let value: Value = client
                .read(&path, Some(&params), &options)
                .await
                .with_context(|| format!("GET {} failed", path))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Post { path, body } => {
            let body: Option<Value> = match body {
                Some(text) => match serde_json::from_str(&text) {
                    Ok(value) => Some(value),
                    Err(e) => bail!("--body is not valid JSON: {}", e),
                },
                None => None,
            };

            let value: Value = client
                .write(&path, body.as_ref(), Some(&cancel))
                .await
                .with_context(|| format!("POST {} failed", path))?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

/// Cancels the in-flight command on Ctrl+C.
async fn cancel_on_signal(cancel: CancellationToken) {
    match signal::ctrl_c().await {
        Ok(()) => {
            warn!("Received Ctrl+C, cancelling request...");
            cancel.cancel();
        }
        Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("role=mid").unwrap(),
            ("role".to_string(), "mid".to_string())
        );
        assert_eq!(
            parse_param("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_cli_parse_stats_defaults() {
        let cli = Cli::parse_from(["hextech_api", "stats"]);
        match cli.command {
            Command::Stats { filter, ttl_ms } => {
                assert_eq!(filter, "");
                assert_eq!(ttl_ms, 60_000);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_get_params() {
        let cli = Cli::parse_from(["hextech_api", "get", "/api/items", "-p", "page=2", "--param", "role=mid"]);
        match cli.command {
            Command::Get { path, params } => {
                assert_eq!(path, "/api/items");
                assert_eq!(params.len(), 2);
                assert_eq!(params[1], ("role".to_string(), "mid".to_string()));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
