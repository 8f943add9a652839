//! Decoy leaderboard service
//!
//! Usage: `decoy-board <LISTEN_URL> <REAL_NAME> <ROOT_PATH>` or
//! `decoy-board --env-file .env`.

use clap::Parser;
use decoy_board::engine::AppEngine;
use decoy_board::infrastructure::logging::init_logging;
use decoy_board::{Config, StartupArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = StartupArgs::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // Guards flush file logs on drop, keep them for the whole run
    let _guards = init_logging(&config.logging)?;

    let startup = args.resolve().inspect_err(|e| tracing::error!("{}", e))?;

    let engine = AppEngine::new(config, startup);
    engine.run().await.inspect_err(|e| tracing::error!("{}", e))?;

    Ok(())
}
