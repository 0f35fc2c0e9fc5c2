mod admission;

pub use admission::{admit, Admission, AdmissionOutcome, RejectionReason};
