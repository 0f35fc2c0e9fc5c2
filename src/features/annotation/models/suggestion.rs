use uuid::Uuid;

use crate::features::entries::models::{AggregateStatus, RawFile};

/// One image sent for annotation, keyed by its entry id
#[derive(Debug, Clone)]
pub struct AnnotationItem {
    pub id: Uuid,
    pub file: RawFile,
}

/// A provider suggestion already correlated to an entry and normalised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationSuggestion {
    pub id: Uuid,
    /// Trimmed; `None` when the provider sent nothing usable
    pub title: Option<String>,
    /// Sanitised, de-duplicated and capped
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub matched: usize,
    pub missing: usize,
}

/// Result of one annotation round as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationReport {
    pub matched: usize,
    pub missing: usize,
    pub status: AggregateStatus,
}
