mod audio_config;
#[allow(clippy::module_inception)]
mod config;
mod recorder_settings;
mod storage_config;

pub(crate) use {
    audio_config::AudioConfig, config::Config, recorder_settings::RecorderSettings,
    storage_config::StorageConfig,
};

use session_recorder_core::{DEFAULT_BIT_DEPTH, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE};

pub(crate) const DEFAULT_STOP_TIMEOUT_MS: u64 = 5_000;

pub(crate) const ENV_DATA_DIR: &str = "DATA_DIR";
pub(crate) const ENV_SAMPLE_RATE: &str = "AUDIO_SAMPLE_RATE";
pub(crate) const ENV_CHANNELS: &str = "AUDIO_CHANNELS";
pub(crate) const ENV_BIT_DEPTH: &str = "AUDIO_BIT_DEPTH";

pub(crate) fn default_sample_rate() -> u32 {
    DEFAULT_SAMPLE_RATE
}

pub(crate) fn default_channels() -> u16 {
    DEFAULT_CHANNELS
}

pub(crate) fn default_bit_depth() -> u16 {
    DEFAULT_BIT_DEPTH
}

pub(crate) fn default_stop_timeout_ms() -> u64 {
    DEFAULT_STOP_TIMEOUT_MS
}
