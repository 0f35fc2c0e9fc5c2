use crate::features::entries::models::RawFile;
use crate::shared::constants::{OUTPUT_EXTENSION, OUTPUT_SUFFIX};
use crate::shared::validation::sanitize_file_name;

/// Download name for a written image: original base name, fixed suffix,
/// always `.jpg`
pub fn download_name(file: &RawFile) -> String {
    let base = sanitize_file_name(file.base_name());
    format!("{}{}.{}", base, OUTPUT_SUFFIX, OUTPUT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    fn named(name: &str) -> RawFile {
        RawFile::new(name, "image/png", 0, Bytes::from_static(b"x"))
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name(&named("beach.png")), "beach_tagged.jpg");
        assert_eq!(download_name(&named("IMG_0001.JPG")), "IMG_0001_tagged.jpg");
        assert_eq!(download_name(&named("a.b.webp")), "a.b_tagged.jpg");
        assert_eq!(download_name(&named("noext")), "noext_tagged.jpg");
        assert_eq!(download_name(&named("dir/evil.jpg")), "dir_evil_tagged.jpg");
    }
}
