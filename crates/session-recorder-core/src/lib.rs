//! Session Recorder Core Library
//!
//! Real-time recording controller built on CPAL: a start/pause/resume/stop
//! state machine that streams captured PCM into a WAV file whose header is
//! finalized once the recording length is known.
//!
//! # Example
//!
//! ```no_run
//! use session_recorder_core::{
//!     CoreResult, GatewayError, PersistenceGateway, RecordId, Recorder, RecorderConfig,
//! };
//!
//! use std::{path::Path, sync::Arc, thread::sleep, time::Duration};
//!
//! struct NoopGateway;
//!
//! impl PersistenceGateway for NoopGateway {
//!     fn create_record(
//!         &self,
//!         _file_id: uuid::Uuid,
//!         _filename: &str,
//!         _file_path: &Path,
//!     ) -> Result<RecordId, GatewayError> {
//!         Ok(1)
//!     }
//!
//!     fn mark_completed(&self, _id: RecordId, _secs: u64, _bytes: u64) -> Result<(), GatewayError> {
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> CoreResult<()> {
//!     let recorder =
//!         Recorder::with_default_device(RecorderConfig::new("recordings"), Arc::new(NoopGateway))?;
//!
//!     recorder.start()?;
//!     sleep(Duration::from_secs(3));
//!     recorder.pause()?;
//!     sleep(Duration::from_secs(1));
//!     recorder.resume()?;
//!     sleep(Duration::from_secs(3));
//!     let summary = recorder.stop()?;
//!
//!     println!("Saved {:?} ({:?})", summary.session.file_path, summary.duration);
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod recorder;

pub use {
    audio::{
        AudioFormat, CaptureBackend, CpalBackend, DEFAULT_BIT_DEPTH, DEFAULT_CHANNELS,
        DEFAULT_SAMPLE_RATE, DeviceSession, FrameCallback, MAX_PAYLOAD_BYTES, WAV_HEADER_SIZE,
        WavContainer, WavHeader,
    },
    error::{GatewayError, RecorderError, Result as CoreResult},
    recorder::{
        DEFAULT_STOP_TIMEOUT, DurationTracker, PersistenceGateway, RecordId, Recorder,
        RecorderCommand, RecorderConfig, RecorderState, RecordingSummary, SessionInfo,
        active_duration,
    },
};
