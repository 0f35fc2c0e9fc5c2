use uuid::Uuid;

use super::{FileSignature, PreviewHandle, RawFile, WriteStatus};

/// One selected image with its editable metadata and write state.
///
/// `id` and `raw_file` are fixed at creation. Title and tag changes go
/// through setters so that a stale write result never survives an edit.
#[derive(Debug)]
pub struct FileEntry {
    id: Uuid,
    raw_file: RawFile,
    signature: FileSignature,
    title: String,
    tags: String,
    write_status: WriteStatus,
    preview: PreviewHandle,
}

/// Partial title/tag edit coming from the user
#[derive(Debug, Clone, Default)]
pub struct EntryEdit {
    pub title: Option<String>,
    pub tags: Option<String>,
}

impl FileEntry {
    /// Build an entry around a preview handle already registered for `id`
    pub fn new(id: Uuid, raw_file: RawFile, preview: PreviewHandle) -> Self {
        debug_assert_eq!(id, preview.entry_id());
        let signature = raw_file.signature();
        Self {
            id,
            raw_file,
            signature,
            title: String::new(),
            tags: String::new(),
            write_status: WriteStatus::Idle,
            preview,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn raw_file(&self) -> &RawFile {
        &self.raw_file
    }

    pub fn signature(&self) -> &FileSignature {
        &self.signature
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub fn write_status(&self) -> &WriteStatus {
        &self.write_status
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.write_status = WriteStatus::Idle;
    }

    pub fn set_tags(&mut self, tags: impl Into<String>) {
        self.tags = tags.into();
        self.write_status = WriteStatus::Idle;
    }

    pub fn apply_edit(&mut self, edit: EntryEdit) {
        if let Some(title) = edit.title {
            self.set_title(title);
        }
        if let Some(tags) = edit.tags {
            self.set_tags(tags);
        }
    }

    pub fn set_write_status(&mut self, status: WriteStatus) {
        self.write_status = status;
    }
}
