//! TOML-backed recordings catalog.
//!
//! Implements the recorder's persistence gateway by keeping every recording
//! in `recordings.toml` inside the data directory. Each change rewrites the
//! whole file atomically.

use crate::{AppError, AppResult, atomic_file::write_atomic};

use session_recorder_core::{GatewayError, PersistenceGateway, RecordId};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// File name of the catalog inside the data directory.
pub const CATALOG_FILE_NAME: &str = "recordings.toml";

/// Lifecycle of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingStatus {
    /// File is still being written.
    Recording,
    /// File was finalized and its size and duration are known.
    Completed,
}

/// One recording known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingEntry {
    /// Catalog id, assigned in creation order.
    pub id: RecordId,
    /// Correlation token shared with the recorder session.
    pub file_id: Uuid,
    /// File name inside the data directory.
    pub filename: String,
    /// Full path of the WAV file.
    pub file_path: PathBuf,
    /// Active recording time in whole seconds. Zero until completed.
    #[serde(default)]
    pub duration_seconds: u64,
    /// Final file size including the header. Zero until completed.
    #[serde(default)]
    pub file_size_bytes: u64,
    /// Current lifecycle status.
    pub status: RecordingStatus,
    /// When the recording was started.
    pub created_at: DateTime<Utc>,
    /// When the recording was completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    last_id: RecordId,
    #[serde(default)]
    recordings: Vec<RecordingEntry>,
}

/// Recordings catalog stored as a TOML file.
pub struct RecordingsCatalog {
    path: PathBuf,
    contents: Mutex<CatalogFile>,
}

impl RecordingsCatalog {
    /// Opens the catalog in `data_dir`, starting empty if the file does not
    /// exist yet.
    #[track_caller]
    #[instrument]
    pub fn open(data_dir: &Path) -> AppResult<Self> {
        let path = data_dir.join(CATALOG_FILE_NAME);

        let contents = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| AppError::CatalogError {
                reason: format!("Failed to read {:?}: {}", path, e),
                location: ErrorLocation::from(Location::caller()),
            })?;
            toml::from_str(&raw).map_err(|e| AppError::CatalogError {
                reason: format!("Failed to parse {:?}: {}", path, e),
                location: ErrorLocation::from(Location::caller()),
            })?
        } else {
            debug!(path = ?path, "No catalog yet, starting empty");
            CatalogFile::default()
        };

        Ok(Self {
            path,
            contents: Mutex::new(contents),
        })
    }

    /// Path of the backing TOML file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All recordings, newest first.
    pub fn list(&self) -> Vec<RecordingEntry> {
        let mut recordings = self.contents.lock().recordings.clone();
        recordings.sort_by(|a, b| b.id.cmp(&a.id));
        recordings
    }

    /// Registers a recording in progress and returns its id.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn insert(&self, file_id: Uuid, filename: &str, file_path: &Path) -> AppResult<RecordId> {
        let mut contents = self.contents.lock();

        // Mutate a copy so a failed write leaves memory and disk in agreement.
        let mut updated = contents.clone();
        let id = updated.last_id + 1;
        updated.last_id = id;
        updated.recordings.push(RecordingEntry {
            id,
            file_id,
            filename: filename.to_string(),
            file_path: file_path.to_path_buf(),
            duration_seconds: 0,
            file_size_bytes: 0,
            status: RecordingStatus::Recording,
            created_at: Utc::now(),
            completed_at: None,
        });

        self.persist(&updated)?;
        *contents = updated;

        info!(id, file_id = %file_id, "Recording added to catalog");
        Ok(id)
    }

    /// Marks a recording completed with its final duration and size.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn complete(
        &self,
        id: RecordId,
        duration_seconds: u64,
        file_size_bytes: u64,
    ) -> AppResult<()> {
        let mut contents = self.contents.lock();

        let mut updated = contents.clone();
        let entry = updated
            .recordings
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| AppError::CatalogError {
                reason: format!("Unknown recording id {}", id),
                location: ErrorLocation::from(Location::caller()),
            })?;

        entry.duration_seconds = duration_seconds;
        entry.file_size_bytes = file_size_bytes;
        entry.status = RecordingStatus::Completed;
        entry.completed_at = Some(Utc::now());

        self.persist(&updated)?;
        *contents = updated;

        info!(id, duration_seconds, file_size_bytes, "Recording completed in catalog");
        Ok(())
    }

    #[track_caller]
    fn persist(&self, contents: &CatalogFile) -> AppResult<()> {
        let raw = toml::to_string_pretty(contents).map_err(|e| AppError::CatalogError {
            reason: format!("Failed to serialize catalog: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        write_atomic(&self.path, &raw).map_err(|e| AppError::CatalogError {
            reason: format!("Failed to write {:?}: {}", self.path, e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

impl PersistenceGateway for RecordingsCatalog {
    fn create_record(
        &self,
        file_id: Uuid,
        filename: &str,
        file_path: &Path,
    ) -> Result<RecordId, GatewayError> {
        Ok(self.insert(file_id, filename, file_path)?)
    }

    fn mark_completed(
        &self,
        record_id: RecordId,
        duration_seconds: u64,
        file_size_bytes: u64,
    ) -> Result<(), GatewayError> {
        Ok(self.complete(record_id, duration_seconds, file_size_bytes)?)
    }
}
