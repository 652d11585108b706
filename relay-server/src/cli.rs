use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use relay_core::{Config, Relay};

use crate::routes;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "relay-server", version, about = "Stores current weather in a Baserow table")]
pub struct Cli {
    /// Read environment variables from this file instead of `./.env`.
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Fetch and store one reading, print the result and exit.
    Fetch,
}

impl Cli {
    /// Variables already present in the process environment win over the file.
    pub fn load_env_file(&self) -> anyhow::Result<()> {
        match &self.env_file {
            Some(path) => {
                dotenvy::from_path(path)
                    .with_context(|| format!("Failed to load env file: {}", path.display()))?;
            }
            None => {
                // A missing ./.env is fine; a malformed one is not.
                match dotenvy::dotenv() {
                    Ok(_) => {}
                    Err(err) if err.not_found() => {}
                    Err(err) => return Err(err).context("Failed to load .env"),
                }
            }
        }
        Ok(())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::from_env().inspect_err(|err| tracing::error!("{err}"))?;
        let relay = Arc::new(Relay::from_config(&config));

        match self.command.unwrap_or(Command::Serve) {
            Command::Serve => {
                routes::serve(relay, routes::listen_addr(config.port)).await?;
            }
            Command::Fetch => match relay.fetch_and_store().await {
                Ok(stored) => {
                    println!("{}", serde_json::to_string_pretty(&stored)?);
                }
                Err(err) => {
                    println!("{}", serde_json::to_string_pretty(&err.to_body())?);
                    anyhow::bail!("fetch failed with status {}: {err}", err.status_code());
                }
            },
        }

        Ok(())
    }
}
