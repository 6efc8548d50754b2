use crate::{AudioFormat, CoreResult, RecorderError};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use cpal::{
    BufferSize, Device, SizedSample, Stream, StreamConfig, StreamError,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Receives each batch of captured frames as little-endian PCM bytes.
///
/// Invoked on the backend's audio thread; keep work minimal.
pub type FrameCallback = Arc<dyn Fn(&[u8]) + Send + Sync + 'static>;

/// An open device session. Frames stop arriving once it is closed.
///
/// Sessions are created, used and closed on the capture thread, so they do
/// not need to be `Send`.
pub trait DeviceSession {
    /// Stops delivery and releases the device.
    fn close(self: Box<Self>) -> CoreResult<()>;
}

/// Push-style audio source.
pub trait CaptureBackend: Send + Sync {
    /// Opens a capture device configured for `format` and starts delivering
    /// frames to `on_frames`.
    fn open(&self, format: AudioFormat, on_frames: FrameCallback)
    -> CoreResult<Box<dyn DeviceSession>>;
}

/// Sample types the cpal backend can turn into WAV payload bytes.
trait PcmSample: SizedSample + Send + 'static {
    fn extend_le(self, out: &mut Vec<u8>);
}

impl PcmSample for u8 {
    fn extend_le(self, out: &mut Vec<u8>) {
        out.push(self);
    }
}

impl PcmSample for i16 {
    fn extend_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl PcmSample for i32 {
    fn extend_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// Captures from the host's default input device through cpal.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalBackend;

struct CpalSession {
    stream: Stream,
}

impl CaptureBackend for CpalBackend {
    #[track_caller]
    #[instrument(skip(self, on_frames))]
    fn open(
        &self,
        format: AudioFormat,
        on_frames: FrameCallback,
    ) -> CoreResult<Box<dyn DeviceSession>> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(RecorderError::DeviceError {
                reason: "No microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = StreamConfig {
            channels: format.channels,
            sample_rate: format.sample_rate,
            buffer_size: BufferSize::Default,
        };

        // Report the first stream error loudly, later ones quietly.
        let reported = AtomicBool::new(false);
        let on_error = move |err: StreamError| {
            if reported.swap(true, Ordering::AcqRel) {
                debug!("Audio stream error: {}", err);
            } else {
                error!("Audio stream error: {}", err);
            }
        };

        let stream = match format.bit_depth {
            8 => build_stream::<u8>(&device, &config, on_frames, on_error),
            16 => build_stream::<i16>(&device, &config, on_frames, on_error),
            32 => build_stream::<i32>(&device, &config, on_frames, on_error),
            other => Err(RecorderError::DeviceError {
                reason: format!("Unsupported bit depth: {}", other),
                location: ErrorLocation::from(Location::caller()),
            }),
        }?;

        stream.play().map_err(|e| RecorderError::DeviceError {
            reason: format!("Failed to start stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(
            device_id = ?device.id(),
            sample_rate = format.sample_rate,
            channels = format.channels,
            bit_depth = format.bit_depth,
            "Capture device opened"
        );

        Ok(Box::new(CpalSession { stream }))
    }
}

impl DeviceSession for CpalSession {
    #[track_caller]
    fn close(self: Box<Self>) -> CoreResult<()> {
        let result = self.stream.pause().map_err(|e| RecorderError::DeviceError {
            reason: format!("Failed to stop stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        });

        // Dropping the stream joins cpal's callback thread on most hosts.
        drop(self);
        debug!("Capture device closed");

        result
    }
}

#[track_caller]
fn build_stream<T: PcmSample>(
    device: &Device,
    config: &StreamConfig,
    on_frames: FrameCallback,
    on_error: impl FnMut(StreamError) + Send + 'static,
) -> CoreResult<Stream> {
    let mut scratch = Vec::new();

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                scratch.clear();
                for &sample in data {
                    sample.extend_le(&mut scratch);
                }
                on_frames(&scratch);
            },
            on_error,
            None,
        )
        .map_err(|e| RecorderError::DeviceError {
            reason: format!("Failed to build stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
}
