mod admission_report;

pub use admission_report::AdmissionReport;
