mod backend;
mod config;
mod console;
mod delay;
mod services;
mod state;
mod view;

use std::future::Future;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::backend::{HttpDelayBackend, SyncError};
use crate::config::SyncConfig;
use crate::services::sync::DelaySync;
use crate::view::{render_range, render_snapshot};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Sync(#[from] SyncError),
    #[error("backend unreachable; last known delay {delay} ms")]
    Offline { delay: u32 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "cloudflash", about = "Blink delay sync client for the Cloud Flash backend")]
struct Cli {
    /// Backend base URL.
    #[arg(long, env = "CLOUDFLASH_BASE_URL")]
    base_url: Option<String>,

    /// Poll interval in milliseconds (overrides `CLOUDFLASH_POLL_INTERVAL_MS`).
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Log request failures and state changes at debug level.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print the current delay.
    Get,
    /// Set the delay (clamped into range).
    Set {
        #[arg(allow_negative_numbers = true)]
        delay: i64,
    },
    /// Step the delay up (slower).
    Inc {
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Step the delay down (faster).
    Dec {
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
    /// Print the configured range and step.
    Range,
    /// Poll and print every change until Ctrl-C.
    Watch,
    /// Interactive session: `+`, `-`, a number, `r`, `q` on stdin.
    Console,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let max_level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = SyncConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    if let Some(poll_ms) = cli.poll_ms {
        config = config.with_poll_interval_ms(poll_ms)?;
    }

    let backend = HttpDelayBackend::new(&config.base_url, config.timeouts)?;
    info!(endpoint = backend.endpoint(), range = %render_range(&config.range), "delay sync client configured");
    let sync = DelaySync::new(Arc::new(backend), config.range, config.initial_delay);

    match cli.command {
        Command::Get => one_shot(&sync, sync.fetch_current_delay().await),
        Command::Set { delay } => one_shot(&sync, sync.send_delay(delay).await),
        Command::Inc { times } => run_steps(&sync, times, true).await,
        Command::Dec { times } => run_steps(&sync, times, false).await,
        Command::Range => {
            println!("{}", render_range(&config.range));
            Ok(())
        }
        Command::Watch => run_watch(&sync, &config).await,
        Command::Console => run_console(&sync, &config).await,
    }
}

/// Steps start from the backend's value; if it can't be read they start from
/// the configured initial delay.
async fn run_steps(sync: &DelaySync, times: u32, up: bool) -> Result<(), CliError> {
    let _ = sync.fetch_current_delay().await;
    let mut last = Ok(sync.snapshot().delay);
    for _ in 0..times {
        last = if up { sync.increment().await } else { sync.decrement().await };
    }
    one_shot(sync, last)
}

fn one_shot(sync: &DelaySync, result: Result<u32, SyncError>) -> Result<(), CliError> {
    let snapshot = sync.snapshot();
    println!("{}", render_snapshot(&snapshot));
    match result {
        Ok(_) if snapshot.status.is_online() => Ok(()),
        _ => Err(CliError::Offline { delay: snapshot.delay }),
    }
}

async fn run_watch(sync: &DelaySync, config: &SyncConfig) -> Result<(), CliError> {
    let _ = sync.fetch_current_delay().await;
    sync.start_polling(config.poll_interval);

    let shutdown = wait_for_shutdown(tokio::signal::ctrl_c());
    let result = console::run_watch(sync, shutdown, &mut std::io::stdout()).await;

    sync.stop_polling();
    Ok(result?)
}

/// Resolves when `signal` fires, or right away (with a warning) if the
/// handler couldn't be installed.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, "ctrl-c handler unavailable; stopping watch");
    }
}

async fn run_console(sync: &DelaySync, config: &SyncConfig) -> Result<(), CliError> {
    println!("range {}", render_range(&sync.range()));
    let _ = sync.fetch_current_delay().await;
    sync.start_polling(config.poll_interval);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = console::run_console(sync, stdin, &mut std::io::stdout()).await;

    sync.stop_polling();
    Ok(result?)
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
