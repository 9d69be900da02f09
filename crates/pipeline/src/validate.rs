//! Stateless checks on submitted file metadata.

use std::path::Path;

/// File extensions accepted for forwarding, lowercase, without the dot.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["epub", "fb2", "mobi", "pdf", "txt"];

/// Maximum accepted file size (25 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 25 * 1024 * 1024;

/// Check the filename's trailing extension against [`ALLOWED_EXTENSIONS`],
/// case-insensitively. Only the final extension counts: `archive.tar.pdf`
/// is a pdf as far as this check is concerned.
pub fn is_allowed_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
}

/// Check a declared size against [`MAX_FILE_SIZE_BYTES`].
///
/// The transport does not always report a size upfront; an undeclared size
/// is not a violation and the transfer proceeds.
pub fn exceeds_size(declared_size: Option<u64>) -> bool {
    declared_size.is_some_and(|size| size > MAX_FILE_SIZE_BYTES)
}

/// Human-readable allow-set for user-facing messages.
pub fn allowed_extensions_list() -> String {
    ALLOWED_EXTENSIONS.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_allowed_extension("Book.PDF"));
        assert!(is_allowed_extension("novel.ePub"));
        assert!(is_allowed_extension("plain.txt"));
    }

    #[test]
    fn disallowed_extensions_are_rejected() {
        assert!(!is_allowed_extension("notes.docx"));
        assert!(!is_allowed_extension("payload.exe"));
        assert!(!is_allowed_extension("noextension"));
        assert!(!is_allowed_extension(""));
    }

    #[test]
    fn only_the_trailing_extension_counts() {
        assert!(is_allowed_extension("archive.tar.pdf"));
        assert!(!is_allowed_extension("book.pdf.exe"));
    }

    #[test]
    fn size_ceiling() {
        assert!(!exceeds_size(Some(MAX_FILE_SIZE_BYTES)));
        assert!(exceeds_size(Some(MAX_FILE_SIZE_BYTES + 1)));
        assert!(!exceeds_size(Some(1)));
    }

    #[test]
    fn undeclared_size_is_not_a_violation() {
        assert!(!exceeds_size(None));
    }
}
