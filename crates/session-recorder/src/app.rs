use crate::{
    AppCommand, AppResult,
    console_input::HELP_TEXT,
    status_line::{format_duration, format_size, status_line},
};

use session_recorder_core::{Recorder, RecordingSummary};

use std::{io::Write, sync::Arc, time::Duration};

use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};

/// Interval between status line redraws.
pub(crate) const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Console recording session.
///
/// Owns the recorder for one session: starts it, applies commands from the
/// console, redraws the status line and stops on `s`, `q` or Ctrl+C.
pub struct App {
    pub(crate) recorder: Arc<Recorder>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run one recording session to completion.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<RecordingSummary> {
        let recorder = Arc::clone(&self.recorder);
        let session = match tokio::task::spawn_blocking(move || recorder.start()).await? {
            Ok(session) => session,
            Err(e) => {
                let _ = self.shutdown_tx.send(true);
                return Err(e.into());
            }
        };

        println!("Recording to {}", session.file_path.display());
        println!("{}", HELP_TEXT);

        let mut ticker = tokio::time::interval(STATUS_INTERVAL);
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.draw_status(),

                result = &mut ctrl_c => {
                    match result {
                        Ok(()) => info!("Ctrl+C received, stopping"),
                        Err(e) => warn!(error = ?e, "Ctrl+C listener failed, stopping"),
                    }
                    break;
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::Pause => self.apply(cmd, || self.recorder.pause()),
                        AppCommand::Resume => self.apply(cmd, || self.recorder.resume()),
                        AppCommand::Stop => {
                            info!("Stop requested");
                            break;
                        }
                    }
                    self.draw_status();
                }
            }
        }

        let _ = self.shutdown_tx.send(true);

        let recorder = Arc::clone(&self.recorder);
        let summary = tokio::task::spawn_blocking(move || recorder.stop()).await??;

        println!();
        println!("Saved {}", summary.session.file_path.display());
        println!("Duration: {}", format_duration(summary.duration));
        println!(
            "Size: {} ({} bytes)",
            format_size(summary.file_size_bytes),
            summary.file_size_bytes
        );
        if summary.capture_failed {
            println!("Warning: the audio device did not shut down cleanly, see the log");
        }
        if summary.write_failures > 0 {
            println!(
                "Warning: {} audio batches could not be written",
                summary.write_failures
            );
        }

        Ok(summary)
    }

    fn apply<F>(&self, cmd: AppCommand, op: F)
    where
        F: FnOnce() -> session_recorder_core::CoreResult<()>,
    {
        if let Err(e) = op() {
            error!(command = ?cmd, error = ?e, "Command rejected");
            println!("\nCannot {:?} while {}", cmd, self.recorder.state());
        }
    }

    fn draw_status(&self) {
        let line = status_line(self.recorder.state(), self.recorder.duration());
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "{}", line);
        let _ = stdout.flush();
    }
}
