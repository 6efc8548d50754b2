use crate::{
    AudioFormat, RecorderState,
    audio::FrameCallback,
    recorder::{DurationTracker, RecordId},
};

use std::{
    fs::File,
    io::Write,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use parking_lot::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

/// Identity of an open recording session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Random token correlating the file with its persisted record.
    pub file_id: Uuid,
    /// File name inside the data directory.
    pub filename: String,
    /// Full path of the WAV container.
    pub file_path: PathBuf,
    /// Id returned by the persistence gateway.
    pub record_id: RecordId,
    /// PCM parameters of the payload.
    pub format: AudioFormat,
}

/// Outcome of a successfully stopped session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSummary {
    /// The session that was stopped.
    pub session: SessionInfo,
    /// Active recording time, pauses excluded.
    pub duration: Duration,
    /// Size of the finished file, header included.
    pub file_size_bytes: u64,
    /// Sample bytes declared in the finalized header.
    pub payload_bytes: u32,
    /// Frame batches discarded because the recorder was not recording.
    pub dropped_batches: u64,
    /// Frame batches whose write to disk failed.
    pub write_failures: u64,
    /// The capture thread panicked or failed while closing the device. The
    /// file is still finalized; audio near the end may be missing.
    pub capture_failed: bool,
}

/// Everything that exists only while a session is open.
pub(crate) struct ActiveSession {
    /// Generation of the frame handler allowed to write to `output`.
    pub(crate) generation: u64,
    pub(crate) info: SessionInfo,
    pub(crate) output: File,
    pub(crate) timing: DurationTracker,
}

/// State shared between the control side and the capture callback.
#[derive(Default)]
pub(crate) struct SessionContext {
    pub(crate) state: RecorderState,
    pub(crate) active: Option<ActiveSession>,
    /// Duration frozen by the last stop.
    pub(crate) last_duration: Duration,
}

impl SessionContext {
    pub(crate) fn duration(&self, now: Instant) -> Duration {
        self.active
            .as_ref()
            .map(|active| active.timing.active(now))
            .unwrap_or(self.last_duration)
    }
}

#[derive(Default)]
pub(crate) struct CaptureStats {
    pub(crate) bytes_written: AtomicU64,
    pub(crate) dropped_batches: AtomicU64,
    pub(crate) write_failures: AtomicU64,
}

impl CaptureStats {
    pub(crate) fn reset(&self) {
        self.bytes_written.store(0, Ordering::Relaxed);
        self.dropped_batches.store(0, Ordering::Relaxed);
        self.write_failures.store(0, Ordering::Relaxed);
    }
}

/// Session context plus per-session capture counters.
#[derive(Default)]
pub(crate) struct Shared {
    pub(crate) context: RwLock<SessionContext>,
    pub(crate) stats: CaptureStats,
    /// Last generation handed out by [`Shared::next_generation`].
    generation: AtomicU64,
}

impl Shared {
    /// Reserves the generation for the next session's frame handler.
    pub(crate) fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Appends `bytes` to the output file if, and only if, the session is
    /// recording and `generation` is the session's own. Anything else is
    /// dropped on the floor.
    ///
    /// Frames from an earlier session's device (one whose capture thread was
    /// detached on stop) are ignored without touching the counters.
    ///
    /// Write errors are logged and counted; capture carries on.
    pub(crate) fn deliver(&self, generation: u64, bytes: &[u8]) {
        if generation != self.generation.load(Ordering::Acquire) {
            return;
        }

        let context = self.context.read();
        let active = context
            .active
            .as_ref()
            .filter(|active| active.generation == generation);

        match (context.state, active) {
            (RecorderState::Recording, Some(active)) => {
                let mut output = &active.output;
                match output.write_all(bytes) {
                    Ok(()) => {
                        self.stats
                            .bytes_written
                            .fetch_add(bytes.len() as u64, Ordering::Relaxed);
                    }
                    Err(e) => {
                        let failures = self.stats.write_failures.fetch_add(1, Ordering::Relaxed);
                        if failures == 0 {
                            error!(error = %e, "Failed to write audio data");
                        } else {
                            debug!(error = %e, failures = failures + 1, "Failed to write audio data");
                        }
                    }
                }
            }
            _ => {
                self.stats.dropped_batches.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Callback handed to the capture backend for the session of
    /// `generation`.
    pub(crate) fn frame_handler(self: &Arc<Self>, generation: u64) -> FrameCallback {
        let shared = Arc::clone(self);
        Arc::new(move |bytes: &[u8]| shared.deliver(generation, bytes))
    }
}
