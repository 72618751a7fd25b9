//! Squares - console front end.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use squares::{
    Board, Color, Console, HttpOracle, MatchDriver, MoveOracle, OfflineOracle, SquaresConfig,
};
use std::sync::Arc;
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    initialize_tracing();

    let cli = Cli::parse();
    let mut config = SquaresConfig::load(&cli.config).context("Failed to load configuration")?;
    if let Some(url) = cli.oracle_url {
        config.set_oracle_url(url);
    }

    match cli.command {
        Command::Play {
            offline,
            no_delay,
            seed,
        } => {
            if offline {
                config.disable_oracle();
            }
            if no_delay {
                config.disable_delay();
            }
            run_console(config, seed).await
        }
        Command::Probe { size } => run_probe(config, size).await,
    }
}

/// Logs go to stderr so stdout stays the game transcript.
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn,squares=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_oracle(config: &SquaresConfig) -> Arc<dyn MoveOracle> {
    if *config.oracle().enabled() {
        Arc::new(HttpOracle::new(config.oracle().url()))
    } else {
        info!("Oracle disabled, oracle sides will play random moves");
        Arc::new(OfflineOracle)
    }
}

/// Run the interactive console
#[instrument(skip(config))]
async fn run_console(config: SquaresConfig, seed: Option<u64>) -> Result<()> {
    let oracle = build_oracle(&config);
    let settings = config.driver_settings();
    info!(oracle = oracle.name(), ?settings, "Starting console");

    let driver = match seed {
        Some(seed) => MatchDriver::with_seed(oracle, settings, seed),
        None => MatchDriver::new(oracle, settings),
    };
    let mut console = Console::new(driver, std::io::stdout());
    console
        .run(tokio::io::BufReader::new(tokio::io::stdin()))
        .await
        .context("Console I/O failed")?;

    info!("Console closed");
    Ok(())
}

/// Send one request for an empty board
#[instrument(skip(config))]
async fn run_probe(config: SquaresConfig, size: usize) -> Result<()> {
    let oracle = HttpOracle::new(config.oracle().url());
    let board = Board::new(size).context("Invalid probe size")?;
    let timeout = *config.driver_settings().oracle_timeout();

    let result = tokio::time::timeout(timeout, oracle.request_move(&board, Color::White))
        .await
        .with_context(|| format!("Oracle did not answer within {:?}", timeout))?
        .context("Oracle request failed")?;

    println!("{} answered: {:?}", oracle.url(), result);
    Ok(())
}
