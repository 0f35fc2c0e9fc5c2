use std::collections::HashSet;

use serde_json::Value;

use crate::features::annotation::dtos::TagsField;
use crate::shared::constants::{MAX_TAGS, TAG_SEPARATOR};
use crate::shared::validation::{sanitize_tag, TAG_DELIMITER_REGEX};

/// Normalise tags from either wire shape into a clean list
pub fn normalize_tags(field: &TagsField) -> Vec<String> {
    match field {
        TagsField::List(values) => normalize_tag_list(values.iter().filter_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })),
        TagsField::Text(text) => normalize_tag_list([text.as_str()]),
    }
}

/// Split on delimiters, sanitise, drop empties and case-insensitive
/// duplicates, then cap at [`MAX_TAGS`]
pub fn normalize_tag_list<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut tags = Vec::new();

    for chunk in raw {
        for piece in TAG_DELIMITER_REGEX.split(chunk.as_ref()) {
            let tag = sanitize_tag(piece);
            if tag.is_empty() || !seen.insert(tag.to_lowercase()) {
                continue;
            }
            tags.push(tag);
            if tags.len() == MAX_TAGS {
                return tags;
            }
        }
    }

    tags
}

/// Display form stored on an entry
pub fn join_tags(tags: &[String]) -> String {
    tags.join(TAG_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn list(values: Value) -> TagsField {
        match values {
            Value::Array(items) => TagsField::List(items),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_list_and_string_normalise_alike() {
        let from_list = normalize_tags(&list(json!(["  beach ", "sea", "", "Sunset"])));
        let from_text = normalize_tags(&TagsField::Text("beach,sea ,, Sunset".to_string()));
        assert_eq!(from_list, vec!["beach", "sea", "Sunset"]);
        assert_eq!(from_list, from_text);
    }

    #[test]
    fn test_mixed_delimiters_and_duplicates() {
        let tags = normalize_tags(&TagsField::Text("Sea; sea\nSEA, waves".to_string()));
        assert_eq!(tags, vec!["Sea", "waves"]);
    }

    #[test]
    fn test_non_string_list_items() {
        let tags = normalize_tags(&list(json!(["a", 2024, null, {"x": 1}, true])));
        assert_eq!(tags, vec!["a", "2024"]);
    }

    #[test]
    fn test_list_items_with_embedded_commas_are_split() {
        let tags = normalize_tags(&list(json!(["red, blue"])));
        assert_eq!(tags, vec!["red", "blue"]);
    }

    #[test]
    fn test_capped_at_max_tags() {
        let many: Vec<String> = (0..MAX_TAGS + 10).map(|i| format!("tag{}", i)).collect();
        let tags = normalize_tag_list(&many);
        assert_eq!(tags.len(), MAX_TAGS);
        assert_eq!(tags[0], "tag0");
    }

    #[test]
    fn test_all_blank_yields_empty() {
        assert!(normalize_tags(&TagsField::Text(" , ;\n ".to_string())).is_empty());
        assert!(normalize_tags(&list(json!([]))).is_empty());
    }

    #[test]
    fn test_join_tags() {
        assert_eq!(join_tags(&["a".to_string(), "b c".to_string()]), "a, b c");
        assert_eq!(join_tags(&[]), "");
    }
}
