mod entry_store;
mod file_entry;
mod preview;
mod raw_file;
mod status;

pub use entry_store::EntryStore;
pub use file_entry::{EntryEdit, FileEntry};
pub use preview::{PreviewCache, PreviewData, PreviewHandle};
pub use raw_file::{FileSignature, RawFile};
pub use status::{AggregateStatus, WriteStatus};
