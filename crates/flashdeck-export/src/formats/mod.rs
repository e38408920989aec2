//! Text export formats.
//!
//! Each encoder is a pure function from cards and options to an
//! [`ExportResult`](crate::ExportResult): same input, byte-identical output.

mod csv;
mod json;
mod markdown;

pub use self::csv::{CSV_FILENAME, CSV_MIME, export_csv};
pub use self::json::{JSON_FILENAME, JSON_MIME, export_json};
pub use self::markdown::{MARKDOWN_MIME, export_markdown};

/// Longest file stem derived from a deck name.
pub const MAX_FILE_STEM: usize = 50;

/// Turn a deck name into a safe file stem.
///
/// Anything outside `[A-Za-z0-9_-]` becomes `_`, and the stem is cut to
/// [`MAX_FILE_STEM`] characters.
///
/// ```
/// use flashdeck_export::formats::safe_file_stem;
///
/// assert_eq!(safe_file_stem("My Deck! (2026)"), "My_Deck___2026_");
/// ```
pub fn safe_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_STEM)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("My Deck! (2026)"), "My_Deck___2026_");
        assert_eq!(safe_file_stem("already-safe_name"), "already-safe_name");
        assert_eq!(safe_file_stem("日本語"), "___");
    }

    #[test]
    fn test_safe_file_stem_truncates() {
        let long = "a".repeat(80);
        assert_eq!(safe_file_stem(&long).len(), MAX_FILE_STEM);
        let padded = format!("{}!", "b".repeat(49));
        assert_eq!(safe_file_stem(&padded), format!("{}_", "b".repeat(49)));
    }
}
