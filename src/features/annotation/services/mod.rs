mod annotation_client;
mod annotation_service;
mod merge;
mod tag_normalizer;

pub use annotation_client::{AnnotationProvider, HttpAnnotationClient};
pub use annotation_service::AnnotationService;
pub use merge::merge_annotations;
pub use tag_normalizer::{join_tags, normalize_tags};
