//! # Poultry-Ledger
//!
//! Farm record keeper: opens the database in `PL_DATA_DIR`, restores the
//! last session and reads commands from standard input until `quit` or
//! Ctrl+C. The state is saved on every quiet period, every
//! `PL_SAVE_INTERVAL_SECS` and on shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use pl_runtime::{init_logging, Command, FarmRuntime, Flow, LogRenderer, RuntimeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env();
    init_logging(&config).context("Failed to initialize logging")?;

    let runtime = FarmRuntime::new(config, Arc::new(LogRenderer));
    runtime
        .start()
        .await
        .context("Failed to start Poultry-Ledger")?;

    info!("[pl-runtime] Poultry-Ledger is running. Type `help` for commands, Ctrl+C to stop.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl+C")?;
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read standard input")? else {
                    // Detached from a terminal: run until interrupted.
                    tokio::signal::ctrl_c().await?;
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => match runtime.execute(command).await {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => warn!("[pl-runtime] {}", e),
                    },
                    Err(e) => warn!("[pl-runtime] {}", e),
                }
            }
        }
    }

    // Graceful shutdown
    let outcome = runtime.shutdown().await;
    if !outcome.is_saved() {
        warn!("[pl-runtime] Final save failed, recent changes may be lost");
    }
    Ok(())
}
