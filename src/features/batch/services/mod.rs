mod archive_builder;
mod batch_orchestrator;

pub use archive_builder::{archive_name, ArchiveBuilder};
pub use batch_orchestrator::BatchOrchestrator;
