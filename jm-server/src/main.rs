//! jm-server - HTTP entry point for the Jeanmichel posting bot
//!
//! Serves `GET /tweet` for the external scheduler. Each hit runs one
//! posting pass: read the counter and lexicon from storage, post the
//! next fragment, advance and persist the counter.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use libjeanmichel::error::BotError;
use libjeanmichel::{logging, poster, Config, Result, RunOutcome};

mod routes;

#[derive(Parser, Debug)]
#[command(name = "jm-server")]
#[command(version)]
#[command(about = "HTTP entry point for the Jeanmichel posting bot")]
#[command(long_about = "\
jm-server - HTTP entry point for the Jeanmichel posting bot

DESCRIPTION:
    jm-server exposes GET /tweet for an external scheduler. Each request
    carrying the scheduler identity header triggers one posting run:
    read the counter blob, read the lexicon blob, post the next fragment,
    advance the counter, write it back. Requests without the header get
    401; a failed run gets 400.

USAGE:
    # Serve on the configured bind address
    jm-server

    # Run a single posting pass without binding a socket
    jm-server --once

CONFIGURATION:
    Configuration file: ~/.config/jeanmichel/config.toml
    (override with JEANMICHEL_CONFIG or --config)

EXIT CODES:
    0 - Clean shutdown / successful run
    1 - Runtime error
    2 - Credential error
    3 - Invalid input
")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bind address (overrides config)
    #[arg(long, value_name = "ADDR:PORT")]
    bind: Option<String>,

    /// Run one posting pass and exit instead of serving
    #[arg(long)]
    once: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init(logging::LogFormat::Text, "debug");
    } else {
        logging::init_default();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    if cli.once {
        return match poster::run_once(&config).await? {
            RunOutcome::Posted { index, post_id, .. } => {
                info!("posted entry {} as {}", index, post_id);
                Ok(())
            }
            RunOutcome::Exhausted { entries } => {
                info!("nothing to post: all {} entries already sent", entries);
                Ok(())
            }
        };
    }

    let bind = cli.bind.unwrap_or_else(|| config.server.bind.clone());
    let app = routes::create_router(Arc::new(config));

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|e| BotError::InvalidInput(format!("Failed to bind {}: {}", bind, e)))?;
    info!("jm-server listening on {}", bind);

    axum::serve(listener, app)
        .await
        .map_err(|e| BotError::InvalidInput(format!("Server error: {}", e)))?;

    Ok(())
}
