//! Binary crate for the weather relay HTTP server.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading `.env` files
//! - Logging setup
//! - Exposing the relay over HTTP

use clap::Parser;

mod cli;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.load_env_file()?;
    init_tracing();
    cmd.run().await
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
