mod bulk;

pub use bulk::{Archive, BulkOutcome};
