use axum::body::Bytes;

/// Finished ZIP container for one batch pass
#[derive(Debug, Clone)]
pub struct Archive {
    pub file_name: String,
    pub data: Bytes,
    /// Number of images inside
    pub entries: usize,
}

/// Result of a batch write pass
#[derive(Debug, Clone)]
pub struct BulkOutcome {
    /// Entries actually sent to the writer
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Absent when nothing succeeded
    pub archive: Option<Archive>,
}
