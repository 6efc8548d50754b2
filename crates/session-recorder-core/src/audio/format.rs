use crate::{CoreResult, RecorderError};

use std::panic::Location;

use error_location::ErrorLocation;

/// Default sample rate. 16 kHz keeps multi-hour sessions small and is
/// plenty for speech.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;
/// Default channel count (mono).
pub const DEFAULT_CHANNELS: u16 = 1;
/// Default bits per sample.
pub const DEFAULT_BIT_DEPTH: u16 = 16;

/// PCM parameters of a recording, fixed for the recorder's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
    /// Bits per sample (8, 16 or 32).
    pub bit_depth: u16,
}

impl AudioFormat {
    /// Bytes of audio per second, without narrowing.
    pub fn bytes_per_second(&self) -> u64 {
        u64::from(self.sample_rate) * u64::from(self.channels) * u64::from(self.bit_depth) / 8
    }

    /// Bytes per frame (one sample for every channel), without narrowing.
    pub fn bytes_per_frame(&self) -> u32 {
        u32::from(self.channels) * u32::from(self.bit_depth) / 8
    }

    /// Header byte-rate field. Saturates for formats that fail
    /// [`validate`](Self::validate).
    pub fn byte_rate(&self) -> u32 {
        u32::try_from(self.bytes_per_second()).unwrap_or(u32::MAX)
    }

    /// Header block-align field. Saturates for formats that fail
    /// [`validate`](Self::validate).
    pub fn block_align(&self) -> u16 {
        u16::try_from(self.bytes_per_frame()).unwrap_or(u16::MAX)
    }

    /// Rejects formats that cannot be described by a PCM WAV header.
    #[track_caller]
    pub fn validate(&self) -> CoreResult<()> {
        let reason = if self.sample_rate == 0 {
            Some("sample rate must be greater than zero".to_string())
        } else if self.channels == 0 {
            Some("channel count must be greater than zero".to_string())
        } else if !matches!(self.bit_depth, 8 | 16 | 32) {
            Some(format!("unsupported bit depth {}", self.bit_depth))
        } else if self.bytes_per_frame() > u32::from(u16::MAX) {
            Some("block align does not fit in 16 bits".to_string())
        } else if self.bytes_per_second() > u64::from(u32::MAX) {
            Some("byte rate does not fit in 32 bits".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(RecorderError::InvalidFormat {
                reason,
                location: ErrorLocation::from(Location::caller()),
            }),
            None => Ok(()),
        }
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: DEFAULT_CHANNELS,
            bit_depth: DEFAULT_BIT_DEPTH,
        }
    }
}
