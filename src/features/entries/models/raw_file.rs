use axum::body::Bytes;

use crate::shared::constants::{SUPPORTED_EXTENSIONS, SUPPORTED_MIME_TYPES};

/// Duplicate-detection key: declared name, size and modification time.
///
/// This is not a content hash. Two distinct files that share all three
/// values are treated as the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileSignature {
    pub name: String,
    pub size: u64,
    pub last_modified: i64,
}

/// An uploaded image exactly as the client declared it
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub size: u64,
    /// Milliseconds since the Unix epoch, as reported by the client
    pub last_modified: i64,
    pub content_type: String,
    pub data: Bytes,
}

impl RawFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        last_modified: i64,
        data: Bytes,
    ) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            last_modified,
            content_type: content_type.into(),
            data,
        }
    }

    pub fn signature(&self) -> FileSignature {
        FileSignature {
            name: self.name.clone(),
            size: self.size,
            last_modified: self.last_modified,
        }
    }

    /// Lowercased extension, if the name has one
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Name without its final extension
    pub fn base_name(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem,
            _ => &self.name,
        }
    }

    /// Supported when either the declared MIME type or the extension is jpeg/png/webp
    pub fn is_supported_format(&self) -> bool {
        if SUPPORTED_MIME_TYPES.contains(&self.declared_mime().as_str()) {
            return true;
        }

        self.extension()
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// Canonical media type: the declared one when supported, otherwise
    /// inferred from the extension
    pub fn media_type(&self) -> &'static str {
        let declared = self.declared_mime();
        if let Some(known) = SUPPORTED_MIME_TYPES.iter().copied().find(|m| *m == declared) {
            return known;
        }

        match self.extension().as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("webp") => "image/webp",
            _ => "application/octet-stream",
        }
    }

    fn declared_mime(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase()
    }
}
