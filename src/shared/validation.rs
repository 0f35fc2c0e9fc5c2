use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Delimiters accepted between tags in a single string
    /// - "sunset, beach; sea" -> ["sunset", " beach", " sea"]
    pub static ref TAG_DELIMITER_REGEX: Regex = Regex::new(r"[,;\r\n]+").unwrap();

    /// Characters never allowed inside a single tag (control chars and delimiters)
    pub static ref TAG_FORBIDDEN_REGEX: Regex = Regex::new(r"[\p{Cc},;]").unwrap();

    /// Runs of whitespace, collapsed to a single space
    pub static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").unwrap();

    /// Characters that cannot appear in a flat archive entry or download name
    pub static ref FILENAME_UNSAFE_REGEX: Regex = Regex::new(r#"[/\\:*?"<>|\p{Cc}]"#).unwrap();
}

/// Clean one tag: strip forbidden characters, collapse whitespace, trim
pub fn sanitize_tag(raw: &str) -> String {
    let stripped = TAG_FORBIDDEN_REGEX.replace_all(raw, " ");
    WHITESPACE_REGEX
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

/// Make a file name safe to use as a flat archive entry or download name
pub fn sanitize_file_name(raw: &str) -> String {
    let cleaned = FILENAME_UNSAFE_REGEX.replace_all(raw, "_");
    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}
