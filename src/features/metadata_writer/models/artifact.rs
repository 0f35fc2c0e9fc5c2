use axum::body::Bytes;
use uuid::Uuid;

use crate::features::entries::models::RawFile;

/// Everything the writer needs for one entry
#[derive(Debug, Clone)]
pub struct WriteRequest {
    pub file: RawFile,
    pub title: String,
    /// Comma-delimited; the writer splits it again
    pub tags: String,
}

/// Binary output of a metadata write
#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Whether a successful write should be handed back as a standalone
/// download or kept for a batch archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Immediate,
    Deferred,
}

/// Terminal result of writing one entry
#[derive(Debug, Clone)]
pub struct WriteResult {
    pub entry_id: Uuid,
    /// The artifact, or the message stored in the entry's error status
    pub outcome: Result<Artifact, String>,
    /// Set only for [`Delivery::Immediate`] successes
    pub download: Option<Artifact>,
}
