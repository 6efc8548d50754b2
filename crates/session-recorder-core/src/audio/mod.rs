mod backend;
pub(crate) mod capture;
mod container;
mod format;

pub(crate) use capture::CapturePipeline;

pub use {
    backend::{CaptureBackend, CpalBackend, DeviceSession, FrameCallback},
    container::{MAX_PAYLOAD_BYTES, WAV_HEADER_SIZE, WavContainer, WavHeader},
    format::{AudioFormat, DEFAULT_BIT_DEPTH, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE},
};
