mod suggestion;

pub use suggestion::{AnnotationItem, AnnotationReport, AnnotationSuggestion, MergeReport};
