use crate::config::{default_bit_depth, default_channels, default_sample_rate};

use session_recorder_core::AudioFormat;

use serde::{Deserialize, Serialize};

/// PCM format new recordings are captured in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Samples per second per channel.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Interleaved channel count.
    #[serde(default = "default_channels")]
    pub channels: u16,
    /// Bits per sample (8, 16 or 32).
    #[serde(default = "default_bit_depth")]
    pub bit_depth: u16,
}

impl AudioConfig {
    /// The configured values as a core [`AudioFormat`].
    pub fn format(&self) -> AudioFormat {
        AudioFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
            bit_depth: self.bit_depth,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            bit_depth: default_bit_depth(),
        }
    }
}
