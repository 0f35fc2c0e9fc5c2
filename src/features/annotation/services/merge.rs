use std::collections::HashMap;

use uuid::Uuid;

use crate::features::annotation::models::{AnnotationSuggestion, MergeReport};
use crate::features::annotation::services::join_tags;
use crate::features::entries::models::{EntryStore, WriteStatus};

/// Apply suggestions to the store by entry id.
///
/// A title is replaced only by a non-empty one and tags only by a non-empty
/// list; entries without a suggestion keep their values. Every entry's
/// write status goes back to idle.
pub fn merge_annotations(
    store: &mut EntryStore,
    suggestions: &[AnnotationSuggestion],
) -> MergeReport {
    let by_id: HashMap<Uuid, &AnnotationSuggestion> =
        suggestions.iter().map(|s| (s.id, s)).collect();
    let mut report = MergeReport::default();

    for entry in store.iter_mut() {
        match by_id.get(&entry.id()) {
            Some(suggestion) => {
                if let Some(title) = suggestion
                    .title
                    .as_deref()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                {
                    entry.set_title(title);
                }
                if !suggestion.tags.is_empty() {
                    entry.set_tags(join_tags(&suggestion.tags));
                }
                report.matched += 1;
            }
            None => report.missing += 1,
        }
        entry.set_write_status(WriteStatus::Idle);
    }

    report
}
