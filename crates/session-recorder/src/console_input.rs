//! Console command reader.
//!
//! Reads one command per line from stdin and forwards it to the main
//! application over an async channel. Anything unrecognised prints the help
//! text.

use crate::{AppCommand, AppError, AppResult};

use std::panic::Location;

use error_location::ErrorLocation;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, watch},
};
use tracing::{debug, info, instrument};

/// Help shown at startup and after unrecognised input.
pub const HELP_TEXT: &str = "Commands: [p]ause  [r]esume  [s]top  [q]uit (same as stop)";

/// Maps one input line to a command. Blank and unknown input yield `None`.
pub fn parse_command(line: &str) -> Option<AppCommand> {
    match line.trim().to_ascii_lowercase().as_str() {
        "p" | "pause" => Some(AppCommand::Pause),
        "r" | "resume" => Some(AppCommand::Resume),
        "s" | "stop" | "q" | "quit" => Some(AppCommand::Stop),
        _ => None,
    }
}

/// Forwards stdin commands to the application.
pub struct ConsoleInput {
    command_tx: mpsc::Sender<AppCommand>,
}

impl ConsoleInput {
    /// Create a reader sending to `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { command_tx }
    }

    /// Run until shutdown is signalled or stdin closes.
    ///
    /// Once stdin closes the recording keeps going; Ctrl+C still stops it.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    debug!("Console input shutting down");
                    break;
                }
                line = lines.next_line() => match line? {
                    Some(line) => {
                        if self.handle_line(&line).await? == Some(AppCommand::Stop) {
                            break;
                        }
                    }
                    None => {
                        info!("Stdin closed, console commands unavailable");
                        break;
                    }
                },
            }
        }

        Ok(())
    }

    /// Parses and forwards one line, returning the command sent if any.
    #[instrument(skip(self))]
    pub async fn handle_line(&self, line: &str) -> AppResult<Option<AppCommand>> {
        if line.trim().is_empty() {
            return Ok(None);
        }

        let Some(command) = parse_command(line) else {
            println!("\n{}", HELP_TEXT);
            return Ok(None);
        };

        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(command = ?command, "Console command forwarded");
        Ok(Some(command))
    }
}
