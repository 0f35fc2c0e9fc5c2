/// MIME types accepted at selection time
pub const SUPPORTED_MIME_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp"];

/// Extensions accepted when the declared MIME type is missing or generic
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Maximum size of a single uploaded image in bytes (50MB)
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// Maximum number of keywords kept from a suggestion
pub const MAX_TAGS: usize = 49;

/// Separator used for the display form of a tag list
pub const TAG_SEPARATOR: &str = ", ";

/// Suffix appended to the base name of every written image
pub const OUTPUT_SUFFIX: &str = "_tagged";

/// The writer always produces JPEG regardless of the input format
pub const OUTPUT_EXTENSION: &str = "jpg";
pub const OUTPUT_CONTENT_TYPE: &str = "image/jpeg";

/// Prefix of the batch archive file name
pub const ARCHIVE_PREFIX: &str = "tagged-images";
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Response headers carrying batch counts next to the archive
pub const SUCCEEDED_COUNT_HEADER: &str = "x-succeeded-count";
pub const FAILED_COUNT_HEADER: &str = "x-failed-count";

// =============================================================================
// USER-FACING MESSAGES
// =============================================================================

pub const MSG_NO_IMAGES: &str = "No images selected";
pub const MSG_NO_SUGGESTIONS: &str = "No suggestions were returned";
pub const MSG_ANNOTATION_FAILED: &str = "Failed to generate suggestions";
pub const MSG_WRITE_FAILED: &str = "Failed to write metadata";
pub const MSG_WRITE_NETWORK: &str = "Network error while writing metadata";
pub const MSG_INTERRUPTED: &str = "The operation was interrupted";
