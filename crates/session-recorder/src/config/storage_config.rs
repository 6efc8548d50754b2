use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where recordings, the catalog and logs live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for WAV files, `recordings.toml` and `logs/`.
    pub data_dir: PathBuf,
}
