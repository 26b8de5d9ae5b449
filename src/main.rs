// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use ddns_sync::cli::Cli;
use ddns_sync::constants::{LOG_FORMAT_ENV, TOKIO_WORKER_THREADS};
use ddns_sync::runner;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level(), cli.log_file.as_deref()) {
        eprintln!("ddns-sync: {e:#}");
        return ExitCode::FAILURE;
    }

    // Build Tokio runtime with custom thread names
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("ddns-sync")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to build Tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Logs already go to stderr unless redirected to a file
    let logs_to_file = cli.log_file.is_some();

    match runtime.block_on(async_main(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_fatal() => {
            error!("{}", e);
            if logs_to_file {
                eprintln!("ddns-sync: {e}");
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
        Err(e) => {
            warn!("{}", e);
            ExitCode::SUCCESS
        }
    }
}

async fn async_main(cli: Cli) -> Result<(), ddns_sync::errors::SyncError> {
    info!("Starting ddns-sync");
    let config = cli.into_run_config()?;
    let format = config.output;

    match runner::run(config).await? {
        Some(outcome) => {
            let rendered = runner::render(&outcome, format)?;
            print!("{rendered}");
            if outcome.report.failed() > 0 {
                info!(
                    "{} update(s) failed, see warnings above",
                    outcome.report.failed()
                );
            }
        }
        None => debug!("Nothing to do"),
    }
    Ok(())
}

/// Initialize logging.
///
/// Respects `RUST_LOG` if set, otherwise uses `default_level` (from `-v`).
/// Respects `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing(default_level: &str, log_file: Option<&Path>) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());
    let json = log_format.eq_ignore_ascii_case("json");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    match (log_file, json) {
        (Some(path), json) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let builder = builder.with_ansi(false).with_writer(Mutex::new(file));
            if json {
                builder.json().init();
            } else {
                builder.compact().init();
            }
        }
        (None, true) => builder.with_writer(std::io::stderr).json().init(),
        (None, false) => builder
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .compact()
            .init(),
    }

    Ok(())
}
