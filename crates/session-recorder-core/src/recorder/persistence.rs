use crate::GatewayError;

use std::path::Path;

use uuid::Uuid;

/// Identifier assigned by the persistence layer to a recording record.
pub type RecordId = i64;

/// Metadata store for recording sessions.
///
/// The recorder calls [`create_record`](Self::create_record) exactly once per
/// session during start and [`mark_completed`](Self::mark_completed) exactly
/// once during stop. Neither call is retried.
pub trait PersistenceGateway: Send + Sync {
    /// Registers a new in-progress recording and returns its id.
    fn create_record(
        &self,
        file_id: Uuid,
        filename: &str,
        file_path: &Path,
    ) -> Result<RecordId, GatewayError>;

    /// Marks a recording as finished with its final duration and size.
    fn mark_completed(
        &self,
        record_id: RecordId,
        duration_seconds: u64,
        file_size_bytes: u64,
    ) -> Result<(), GatewayError>;
}
