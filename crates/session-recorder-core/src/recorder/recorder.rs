use crate::{
    AudioFormat, CoreResult, RecorderError,
    audio::{CaptureBackend, CapturePipeline, CpalBackend, WavContainer},
    recorder::{
        ActiveSession, DurationTracker, PersistenceGateway, RecorderCommand, RecorderState,
        RecordingSummary, SessionInfo, Shared,
    },
};

use std::{
    fs::{self, File, OpenOptions},
    io::ErrorKind,
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, atomic::Ordering},
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use parking_lot::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Default upper bound on how long stop waits for the capture thread.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Recorder construction parameters.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Directory new recordings are written to. Must already exist.
    pub data_dir: PathBuf,
    /// PCM format of every session.
    pub format: AudioFormat,
    /// How long stop waits for the capture thread before detaching it.
    pub stop_timeout: Duration,
}

impl RecorderConfig {
    /// Default format and stop timeout, writing into `data_dir`.
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            format: AudioFormat::default(),
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }
}

/// Real-time recording controller.
///
/// Coordinates a capture thread, fed by a [`CaptureBackend`], with control
/// commands issued from any thread, streaming frames into a WAV file whose
/// header is finalized on stop.
///
/// # Thread Safety
///
/// All methods take `&self`; share the recorder through an `Arc`. Commands
/// are serialized by an internal mutex that is held for the whole command,
/// including the wait for the capture thread during [`stop`](Self::stop).
/// [`state`](Self::state) and [`duration`](Self::duration) only take a read
/// lock and never wait on a command.
pub struct Recorder {
    config: RecorderConfig,
    container: WavContainer,
    backend: Arc<dyn CaptureBackend>,
    gateway: Arc<dyn PersistenceGateway>,
    shared: Arc<Shared>,
    /// Doubles as the command gate.
    pipeline: Mutex<Option<CapturePipeline>>,
}

impl Recorder {
    /// Creates a recorder capturing through `backend`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the configured format cannot be written as
    /// PCM WAV.
    #[track_caller]
    #[instrument(skip(backend, gateway))]
    pub fn new(
        config: RecorderConfig,
        backend: Arc<dyn CaptureBackend>,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> CoreResult<Self> {
        config.format.validate()?;

        info!(
            data_dir = ?config.data_dir,
            sample_rate = config.format.sample_rate,
            channels = config.format.channels,
            bit_depth = config.format.bit_depth,
            "Recorder initialized"
        );

        Ok(Self {
            container: WavContainer::new(config.format),
            config,
            backend,
            gateway,
            shared: Arc::new(Shared::default()),
            pipeline: Mutex::new(None),
        })
    }

    /// Creates a recorder capturing from the default input device.
    #[track_caller]
    pub fn with_default_device(
        config: RecorderConfig,
        gateway: Arc<dyn PersistenceGateway>,
    ) -> CoreResult<Self> {
        Self::new(config, Arc::new(CpalBackend), gateway)
    }

    /// Starts a new session.
    ///
    /// Creates the output file with a placeholder header, opens the capture
    /// device, registers the recording with the persistence gateway and
    /// enters `Recording`. Nothing is left behind on failure: the file is
    /// removed, the device closed and the state unchanged.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless idle or stopped; `Io` if the file cannot be
    /// created; `DeviceError` if the device cannot be opened; `Persistence`
    /// if the record cannot be created.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn start(&self) -> CoreResult<SessionInfo> {
        let mut pipeline_slot = self.pipeline.lock();
        self.ensure_permitted(RecorderCommand::Start)?;

        let file_id = Uuid::new_v4();
        let (mut output, filename, file_path) = self.create_output(file_id)?;

        if let Err(e) = self.container.write_header(&mut output, 0) {
            drop(output);
            discard(&file_path);
            return Err(e);
        }

        // Retire the previous handler before the counters are reset, so a
        // detached device from the last session cannot touch either.
        let generation = self.shared.next_generation();
        self.shared.stats.reset();

        let pipeline = match CapturePipeline::launch(
            Arc::clone(&self.backend),
            self.config.format,
            self.shared.frame_handler(generation),
        ) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                drop(output);
                discard(&file_path);
                return Err(e);
            }
        };

        let record_id = match self.gateway.create_record(file_id, &filename, &file_path) {
            Ok(record_id) => record_id,
            Err(source) => {
                if let Err(e) = pipeline.stop(self.config.stop_timeout) {
                    error!(error = ?e, "Failed to stop capture after persistence failure");
                }
                drop(output);
                discard(&file_path);
                return Err(RecorderError::Persistence {
                    source,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        };

        let info = SessionInfo {
            file_id,
            filename,
            file_path,
            record_id,
            format: self.config.format,
        };

        {
            let mut context = self.shared.context.write();
            context.active = Some(ActiveSession {
                generation,
                info: info.clone(),
                output,
                timing: DurationTracker::start(Instant::now()),
            });
            context.last_duration = Duration::ZERO;
            context.state = RecorderState::Recording;
        }
        *pipeline_slot = Some(pipeline);

        info!(
            file_id = %info.file_id,
            record_id = info.record_id,
            file_path = ?info.file_path,
            "Recording started"
        );

        Ok(info)
    }

    /// Stops appending frames. Frames delivered while paused are dropped.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless recording.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn pause(&self) -> CoreResult<()> {
        let _gate = self.pipeline.lock();
        let mut context = self.shared.context.write();

        if context.state != RecorderState::Recording {
            return Err(RecorderError::InvalidTransition {
                command: RecorderCommand::Pause,
                state: context.state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if let Some(active) = context.active.as_mut() {
            active.timing.pause(Instant::now());
        }
        context.state = RecorderState::Paused;

        info!("Recording paused");
        Ok(())
    }

    /// Resumes appending frames, excluding the pause from the duration.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless paused.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn resume(&self) -> CoreResult<()> {
        let _gate = self.pipeline.lock();
        let mut context = self.shared.context.write();

        if context.state != RecorderState::Paused {
            return Err(RecorderError::InvalidTransition {
                command: RecorderCommand::Resume,
                state: context.state,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let paused_total = context
            .active
            .as_mut()
            .map(|active| {
                active.timing.resume(Instant::now());
                active.timing.paused_total()
            })
            .unwrap_or_default();
        context.state = RecorderState::Recording;

        info!(paused_total_ms = paused_total.as_millis(), "Recording resumed");
        Ok(())
    }

    /// Ends the session.
    ///
    /// Withdraws the output file from the capture callback, waits for the
    /// capture thread to exit, rewrites the header with the real payload
    /// size, closes the file and reports completion to the gateway. The
    /// recorder ends up `Stopped` even when finalization fails, so a new
    /// session can be started.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless recording or paused; `Io`,
    /// `CorruptContainer` or `ContainerTooLarge` if finalization fails (the
    /// gateway is then not told the recording completed); `Persistence` if
    /// the gateway rejects the completion.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&self) -> CoreResult<RecordingSummary> {
        let mut pipeline_slot = self.pipeline.lock();

        let (active, duration) = {
            let mut context = self.shared.context.write();
            let state = context.state;
            let now = Instant::now();

            match context.active.take() {
                Some(active) if state.is_active() => {
                    let duration = active.timing.active(now);
                    context.last_duration = duration;
                    (active, duration)
                }
                other => {
                    context.active = other;
                    return Err(RecorderError::InvalidTransition {
                        command: RecorderCommand::Stop,
                        state,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        };

        // The callback can no longer reach the file; wait for the device to
        // go quiet before touching the header.
        let capture_failed = match pipeline_slot.take() {
            Some(pipeline) => match pipeline.stop(self.config.stop_timeout) {
                Ok(()) => false,
                Err(e) => {
                    error!(error = ?e, "Capture pipeline did not stop cleanly");
                    true
                }
            },
            None => false,
        };

        let ActiveSession {
            info, mut output, ..
        } = active;

        let finalized = self.finalize_output(&mut output);
        drop(output);

        let result = finalized.and_then(|(payload_bytes, file_size_bytes)| {
            self.gateway
                .mark_completed(info.record_id, duration.as_secs(), file_size_bytes)
                .map_err(|source| RecorderError::Persistence {
                    source,
                    location: ErrorLocation::from(Location::caller()),
                })?;

            Ok(RecordingSummary {
                session: info.clone(),
                duration,
                file_size_bytes,
                payload_bytes,
                dropped_batches: self.shared.stats.dropped_batches.load(Ordering::Relaxed),
                write_failures: self.shared.stats.write_failures.load(Ordering::Relaxed),
                capture_failed,
            })
        });

        self.shared.context.write().state = RecorderState::Stopped;

        match &result {
            Ok(summary) => info!(
                file_id = %info.file_id,
                duration_ms = summary.duration.as_millis(),
                file_size_bytes = summary.file_size_bytes,
                dropped_batches = summary.dropped_batches,
                write_failures = summary.write_failures,
                capture_failed = summary.capture_failed,
                "Recording stopped"
            ),
            Err(e) => error!(file_id = %info.file_id, error = ?e, "Recording stopped with errors"),
        }

        result
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecorderState {
        self.shared.context.read().state
    }

    /// Active recording time.
    ///
    /// Zero before the first session, live while a session is open (pauses
    /// excluded, including one in progress), and the final duration of the
    /// last session once stopped.
    pub fn duration(&self) -> Duration {
        self.shared.context.read().duration(Instant::now())
    }

    /// Identity of the open session, if any.
    pub fn current_session(&self) -> Option<SessionInfo> {
        self.shared
            .context
            .read()
            .active
            .as_ref()
            .map(|active| active.info.clone())
    }

    /// Format every session is recorded in.
    pub fn format(&self) -> AudioFormat {
        self.config.format
    }

    #[track_caller]
    fn ensure_permitted(&self, command: RecorderCommand) -> CoreResult<()> {
        let state = self.state();
        if state.permits(command) {
            Ok(())
        } else {
            Err(RecorderError::InvalidTransition {
                command,
                state,
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }

    /// Creates `recording_<timestamp>.wav`, falling back to a name with the
    /// file id appended when a recording from the same second exists.
    #[track_caller]
    fn create_output(&self, file_id: Uuid) -> CoreResult<(File, String, PathBuf)> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let short_id = file_id.simple().to_string();
        let candidates = [
            format!("recording_{}.wav", stamp),
            format!("recording_{}_{}.wav", stamp, &short_id[..8]),
        ];

        let mut last_error = None;
        for filename in candidates {
            let file_path = self.config.data_dir.join(&filename);
            match OpenOptions::new()
                .read(true)
                .write(true)
                .create_new(true)
                .open(&file_path)
            {
                Ok(file) => return Ok((file, filename, file_path)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => last_error = Some(e),
                Err(e) => {
                    return Err(RecorderError::Io {
                        context: format!("creating {}", file_path.display()),
                        source: e,
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }

        Err(RecorderError::Io {
            context: "creating recording file".to_string(),
            source: last_error
                .unwrap_or_else(|| std::io::Error::from(ErrorKind::AlreadyExists)),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Rewrites the header and flushes the file. Returns the payload size and
    /// the final file size.
    #[track_caller]
    fn finalize_output(&self, output: &mut File) -> CoreResult<(u32, u64)> {
        let payload_bytes = self.container.finalize(output)?;

        output.sync_all().map_err(|e| RecorderError::Io {
            context: "syncing recording file".to_string(),
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let file_size_bytes = output
            .metadata()
            .map_err(|e| RecorderError::Io {
                context: "reading recording file size".to_string(),
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?
            .len();

        Ok((payload_bytes, file_size_bytes))
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        if self.state().is_active() {
            warn!("Recorder dropped with an open session, stopping it");
            if let Err(e) = self.stop() {
                error!(error = ?e, "Failed to stop recording on drop");
            }
        }
    }
}

/// Best-effort removal of a file from an aborted start.
fn discard(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = ?path, error = %e, "Failed to remove abandoned recording file");
    }
}
