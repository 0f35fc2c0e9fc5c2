//! Selection guard: format filter, duplicate detection and capacity cap.

use std::collections::HashSet;

use crate::features::entries::models::{FileSignature, RawFile};

/// Partition of one selection into admitted files and the reasons the
/// rest were dropped
#[derive(Debug, Default)]
pub struct Admission {
    pub admitted: Vec<RawFile>,
    pub unsupported: Vec<String>,
    pub duplicates: Vec<String>,
    pub over_capacity: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    Duplicates,
    Capacity,
    UnsupportedFormat,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Nothing was offered
    Empty,
    AllAdmitted,
    PartiallyAdmitted,
    NoneAdmitted(RejectionReason),
}

impl Admission {
    pub fn skipped(&self) -> usize {
        self.unsupported.len() + self.duplicates.len() + self.over_capacity.len()
    }

    pub fn outcome(&self) -> AdmissionOutcome {
        let skipped = self.skipped();
        match (self.admitted.is_empty(), skipped) {
            (true, 0) => AdmissionOutcome::Empty,
            (false, 0) => AdmissionOutcome::AllAdmitted,
            (false, _) => AdmissionOutcome::PartiallyAdmitted,
            (true, _) => {
                let reason = if self.duplicates.len() == skipped {
                    RejectionReason::Duplicates
                } else if self.over_capacity.len() == skipped {
                    RejectionReason::Capacity
                } else if self.unsupported.len() == skipped {
                    RejectionReason::UnsupportedFormat
                } else {
                    RejectionReason::Mixed
                };
                AdmissionOutcome::NoneAdmitted(reason)
            }
        }
    }
}

/// Decide which of `candidates` may join a store that currently holds
/// `current_len` entries with `existing` signatures.
///
/// Checks run in order: supported format, duplicate signature (against the
/// store and earlier candidates of the same batch), then capacity.
pub fn admit(
    candidates: Vec<RawFile>,
    existing: &HashSet<FileSignature>,
    current_len: usize,
    capacity: usize,
) -> Admission {
    let mut admission = Admission::default();
    let mut seen: HashSet<FileSignature> = HashSet::new();
    let mut room = capacity.saturating_sub(current_len);

    for file in candidates {
        if !file.is_supported_format() {
            admission.unsupported.push(file.name);
            continue;
        }

        let signature = file.signature();
        if existing.contains(&signature) || !seen.insert(signature) {
            admission.duplicates.push(file.name);
            continue;
        }

        if room == 0 {
            admission.over_capacity.push(file.name);
            continue;
        }

        room -= 1;
        admission.admitted.push(file);
    }

    admission
}
