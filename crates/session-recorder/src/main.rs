//! Session Recorder: console microphone recorder with pause/resume, writing
//! WAV files and a recordings catalog.

mod app;
mod app_command;
mod atomic_file;
mod catalog;
mod cli;
mod config;
mod console_input;
mod error;
mod inspect;
mod logging;
mod status_line;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    catalog::RecordingsCatalog,
    console_input::ConsoleInput,
    error::{AppError, Result as AppResult},
};

use crate::{
    cli::{Mode, USAGE, parse_args},
    config::Config,
    inspect::{describe_catalog, inspect_file},
    logging::init_logging,
};

use session_recorder_core::Recorder;

use std::{process::ExitCode, sync::Arc, time::Duration};

use tokio::sync::{mpsc, watch};
use tracing::{error, info};

/// How long shutdown waits for the console reader and blocking tasks.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Application entry point.
fn main() -> ExitCode {
    let mode = match parse_args(std::env::args().skip(1)) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            return ExitCode::from(2);
        }
    };

    if mode == Mode::Help {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Held until exit so buffered log lines are flushed.
    let _log_guard = match init_logging(&config.log_dir()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match mode {
        Mode::List => list(&config),
        Mode::Inspect(path) => inspect_file(&path).map(|summary| println!("{}", summary)),
        Mode::Record => record(config),
        Mode::Help => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "Session recorder failed");
            eprintln!("\n{}", e);
            ExitCode::FAILURE
        }
    }
}

fn list(config: &Config) -> AppResult<()> {
    let catalog = RecordingsCatalog::open(&config.storage.data_dir)?;
    println!("Catalog: {}\n", catalog.path().display());
    println!("{}", describe_catalog(&catalog.list()));
    Ok(())
}

fn record(config: Config) -> AppResult<()> {
    let catalog = Arc::new(RecordingsCatalog::open(&config.storage.data_dir)?);
    let recorder = Arc::new(Recorder::with_default_device(
        config.recorder_config(),
        catalog,
    )?);

    let runtime = tokio::runtime::Runtime::new()?;

    let result = runtime.block_on(async move {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let console = ConsoleInput::new(command_tx);
        let console_handle = tokio::spawn(async move {
            if let Err(e) = console.run(shutdown_rx).await {
                error!(error = ?e, "Console input error");
            }
        });

        let app = App {
            recorder,
            command_rx,
            shutdown_tx,
        };
        let result = app.run().await;

        match tokio::time::timeout(SHUTDOWN_GRACE, console_handle).await {
            Ok(Ok(())) => info!("Console input stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Console input task panicked"),
            Err(_) => info!("Console input did not stop within timeout, will be cleaned up on exit"),
        }

        result
    });

    // A stdin read may still be parked on a blocking thread.
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    result.map(|summary| {
        info!(
            file_id = %summary.session.file_id,
            duration_ms = summary.duration.as_millis(),
            "Session complete"
        );
    })
}
