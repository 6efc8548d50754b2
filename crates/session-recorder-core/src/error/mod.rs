use crate::{RecorderCommand, RecorderState};

use error_location::ErrorLocation;
use thiserror::Error;

/// Boxed error returned by [`PersistenceGateway`](crate::PersistenceGateway) implementations.
pub type GatewayError = Box<dyn std::error::Error + Send + Sync>;

/// Recorder errors with source location tracking.
#[derive(Error, Debug)]
pub enum RecorderError {
    /// Command issued from a state that does not allow it.
    #[error("Cannot {command} while {state} {location}")]
    InvalidTransition {
        /// The rejected command.
        command: RecorderCommand,
        /// State the recorder was in when the command arrived.
        state: RecorderState,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio format parameters cannot describe a PCM stream.
    #[error("Invalid audio format: {reason} {location}")]
    InvalidFormat {
        /// Why the format was rejected.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device could not be opened or started.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Filesystem operation on the output container failed.
    #[error("IO error while {context}: {source} {location}")]
    Io {
        /// What the recorder was doing.
        context: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Container is shorter than its own header.
    #[error("Corrupt container: {length} bytes is shorter than the header {location}")]
    CorruptContainer {
        /// Observed stream length in bytes.
        length: u64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Header bytes do not describe a PCM WAV container.
    #[error("Invalid WAV header: {reason} {location}")]
    InvalidHeader {
        /// What did not match.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Payload no longer fits the 32-bit size fields of the header.
    #[error("Container too large: {length} bytes exceeds the WAV size limit {location}")]
    ContainerTooLarge {
        /// Observed stream length in bytes.
        length: u64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Persistence gateway rejected a call.
    #[error("Persistence failed: {source} {location}")]
    Persistence {
        /// Underlying gateway error.
        #[source]
        source: GatewayError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture thread could not be spawned or did not exit cleanly.
    #[error("Capture thread error: {reason} {location}")]
    CaptureThread {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`RecorderError`].
pub type Result<T> = std::result::Result<T, RecorderError>;
