//! ZIP packaging of the collection database.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Result;

/// Archive member holding the collection database.
pub const COLLECTION_MEMBER: &str = "collection.anki2";

/// Archive member holding the media manifest.
pub const MEDIA_MEMBER: &str = "media";

/// Media manifest for a package with no media files.
pub const EMPTY_MEDIA_MANIFEST: &str = "{}";

/// Deflate level: fast, with most of the size benefit.
const COMPRESSION_LEVEL: i64 = 6;

/// Wraps a serialized collection into the final package bytes.
pub trait PackageWriter {
    /// Build the package from the database bytes.
    fn write(&self, collection: &[u8]) -> Result<Vec<u8>>;
}

/// Writes a standard `.apkg` ZIP archive in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPackageWriter;

impl PackageWriter for ZipPackageWriter {
    fn write(&self, collection: &[u8]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .compression_level(Some(COMPRESSION_LEVEL));

        zip.start_file(COLLECTION_MEMBER, options)?;
        zip.write_all(collection)?;

        zip.start_file(MEDIA_MEMBER, options)?;
        zip.write_all(EMPTY_MEDIA_MANIFEST.as_bytes())?;

        Ok(zip.finish()?.into_inner())
    }
}
