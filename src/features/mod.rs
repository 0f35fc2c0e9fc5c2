pub mod annotation;
pub mod batch;
pub mod entries;
pub mod metadata_writer;
pub mod sessions;
