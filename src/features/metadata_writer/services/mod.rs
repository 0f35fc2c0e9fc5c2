mod metadata_write_service;
mod metadata_writer_client;
mod naming;

pub use metadata_write_service::MetadataWriteService;
pub use metadata_writer_client::{HttpMetadataWriter, MetadataWriter};
pub use naming::download_name;
