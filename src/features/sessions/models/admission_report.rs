use uuid::Uuid;

use crate::features::entries::models::AggregateStatus;
use crate::features::entries::services::AdmissionOutcome;

/// What one selection did to a session's store
#[derive(Debug, Clone)]
pub struct AdmissionReport {
    /// Ids of the new entries, in selection order
    pub added: Vec<Uuid>,
    pub unsupported: Vec<String>,
    pub duplicates: Vec<String>,
    pub over_capacity: Vec<String>,
    pub outcome: AdmissionOutcome,
    /// AI status after the selection was applied
    pub status: AggregateStatus,
}

impl AdmissionReport {
    pub fn skipped(&self) -> usize {
        self.unsupported.len() + self.duplicates.len() + self.over_capacity.len()
    }
}
