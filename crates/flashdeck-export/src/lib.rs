//! Client-side flashcard export.
//!
//! Turns a list of [`Card`]s into a downloadable file in one of four formats:
//!
//! - **Anki package** (`.apkg`): a SQLite collection zipped with an empty
//!   media manifest, importable by Anki desktop and mobile
//! - **CSV** for spreadsheets and other flashcard apps
//! - **Markdown** in the Obsidian spaced-repetition layout
//! - **JSON** for custom processing
//!
//! # Features
//!
//! - `apkg` (default): Enable `.apkg` generation. Without it the other
//!   formats still work and [`ExportFormat::Apkg`] fails with
//!   [`Error::FormatUnavailable`].
//!
//! # Example
//!
//! ```no_run
//! use flashdeck_export::{
//!     Card, DirectoryTarget, ExportFormat, ExportOptions, Exporter, trigger_download,
//! };
//!
//! # async fn example() -> flashdeck_export::Result<()> {
//! let cards = vec![
//!     Card::new("<b>el gato</b>", "the cat").with_tags(["spanish"]),
//!     Card::new("el perro", "the dog"),
//! ];
//! let options = ExportOptions::default().with_deck_name("Spanish");
//!
//! let result = Exporter::new()
//!     .export(ExportFormat::Apkg, &cards, &options)
//!     .await?;
//! let path = trigger_download(&result, &DirectoryTarget::new("exports"))?;
//! println!("Saved {}", path.display());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod formats;

mod card;
mod download;
mod export;
mod ids;
mod options;
mod registry;
mod sanitize;

#[cfg(feature = "apkg")]
mod sql;

#[cfg(feature = "apkg")]
pub mod collection;

#[cfg(feature = "apkg")]
pub mod package;

#[cfg(feature = "apkg")]
pub mod store;

#[cfg(feature = "apkg")]
mod apkg;

pub use card::{Card, CardDomain, CardType};
pub use download::{DirectoryTarget, SaveTarget, trigger_download};
pub use error::{Error, Result};
pub use export::{
    APKG_MIME, CancelToken, ExportControl, ExportResult, Exporter, Payload, ProgressFn,
};
pub use ids::{IdGenerator, field_checksum};
pub use options::{
    ApkgOptions, CsvOptions, ExportOptions, JsonOptions, MarkdownOptions, Separator,
};
pub use registry::{
    DEFAULT_DECK_NAME, EXPORT_FORMATS, ExportFormat, FormatInfo, OptionField, OptionKind,
};
pub use sanitize::to_plain_text;

#[cfg(feature = "apkg")]
pub use apkg::{
    ApkgBuilder, ApkgCard, ApkgPackage, MAX_APKG_CARDS, PROGRESS_BATCH, validate_card_count,
};

#[cfg(feature = "apkg")]
pub use ids::{GUID_LEN, guid};
