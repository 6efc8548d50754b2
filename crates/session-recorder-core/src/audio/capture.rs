use crate::{
    AudioFormat, CoreResult, RecorderError,
    audio::{CaptureBackend, FrameCallback},
};

use std::{
    panic::Location,
    sync::{
        Arc,
        mpsc::{self, RecvTimeoutError},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use error_location::ErrorLocation;
use tracing::{error, info, instrument, warn};

/// Runs one device session on a dedicated `audio-capture` thread.
///
/// The backend's stream handle is created and dropped on that thread, which
/// keeps `!Send` stream types (cpal on macOS and Windows) off the control
/// thread. Frames flow straight from the backend into `on_frames`; the
/// pipeline itself never buffers.
pub(crate) struct CapturePipeline {
    stop_tx: Option<mpsc::Sender<()>>,
    exited_rx: mpsc::Receiver<()>,
    handle: Option<JoinHandle<()>>,
}

impl CapturePipeline {
    /// Spawns the capture thread and blocks until the device reports open.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the device cannot be opened, or
    /// `CaptureThread` if the thread cannot be spawned or dies before
    /// reporting.
    #[track_caller]
    #[instrument(skip(backend, on_frames))]
    pub(crate) fn launch(
        backend: Arc<dyn CaptureBackend>,
        format: AudioFormat,
        on_frames: FrameCallback,
    ) -> CoreResult<Self> {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<CoreResult<()>>(1);
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (exited_tx, exited_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || {
                // Dropped when the thread ends, even by panic.
                let _exited = exited_tx;

                let session = match backend.open(format, on_frames) {
                    Ok(session) => session,
                    Err(e) => {
                        error!(error = ?e, "Failed to open capture device");
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                // A dropped sender counts as a stop signal too.
                let _ = stop_rx.recv();

                if let Err(e) = session.close() {
                    warn!(error = ?e, "Failed to close capture device cleanly");
                }
                info!("Capture thread exiting");
            })
            .map_err(|e| RecorderError::CaptureThread {
                reason: format!("Failed to spawn capture thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                stop_tx: Some(stop_tx),
                exited_rx,
                handle: Some(handle),
            }),
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(RecorderError::CaptureThread {
                    reason: "Capture thread exited before reporting device status".to_string(),
                    location: ErrorLocation::from(Location::caller()),
                })
            }
        }
    }

    /// Signals the capture thread to close the device and waits for it to
    /// exit, for at most `timeout`.
    ///
    /// On timeout the thread is detached and a warning is logged.
    ///
    /// # Errors
    ///
    /// Returns `CaptureThread` if the thread panicked.
    #[track_caller]
    #[instrument(skip(self))]
    pub(crate) fn stop(mut self, timeout: Duration) -> CoreResult<()> {
        drop(self.stop_tx.take());

        match self.exited_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if let Some(handle) = self.handle.take() {
                    handle.join().map_err(|_| RecorderError::CaptureThread {
                        reason: "Capture thread panicked".to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
                }
                info!("Capture pipeline stopped");
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = timeout.as_millis(),
                    "Capture thread did not exit in time, detaching it"
                );
                Ok(())
            }
        }
    }
}
