use std::collections::HashSet;
use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::Result;
use crate::features::batch::models::Archive;
use crate::shared::constants::ARCHIVE_PREFIX;
use crate::shared::validation::sanitize_file_name;

/// `tagged-images-YYYYMMDD-HHMMSS.zip`
pub fn archive_name(at: DateTime<Utc>) -> String {
    format!("{}-{}.zip", ARCHIVE_PREFIX, at.format("%Y%m%d-%H%M%S"))
}

/// Flat in-memory ZIP of written images
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    names: HashSet<String>,
    entries: usize,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            names: HashSet::new(),
            entries: 0,
        }
    }

    /// Add one file at the archive root; returns the name actually used.
    ///
    /// Clashing names get " (2)", " (3)", ... before the extension.
    pub fn add(&mut self, file_name: &str, data: &[u8]) -> Result<String> {
        let name = self.unique_name(&sanitize_file_name(file_name));

        // JPEG is already compressed
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        self.writer.start_file(name.as_str(), options)?;
        self.writer.write_all(data)?;

        self.names.insert(name.to_lowercase());
        self.entries += 1;
        Ok(name)
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn finish(self, file_name: String) -> Result<Archive> {
        let cursor = self.writer.finish()?;
        Ok(Archive {
            file_name,
            data: cursor.into_inner().into(),
            entries: self.entries,
        })
    }

    fn unique_name(&self, name: &str) -> String {
        if !self.names.contains(&name.to_lowercase()) {
            return name.to_string();
        }

        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (name, None),
        };

        (2..)
            .map(|n| match ext {
                Some(ext) => format!("{} ({}).{}", stem, n, ext),
                None => format!("{} ({})", stem, n),
            })
            .find(|candidate| !self.names.contains(&candidate.to_lowercase()))
            .unwrap_or_else(|| name.to_string())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
