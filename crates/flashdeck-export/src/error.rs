//! Error types for flashdeck-export.
//!
//! Errors fall into four groups:
//!
//! 1. **Validation**: the request was rejected before any expensive work began
//!    ([`Error::NoCards`], [`Error::TooManyCards`], [`Error::InvalidOptions`]).
//! 2. **Engine initialisation**: the embedded database could not be opened
//!    ([`Error::EngineUnavailable`]). Usually transient; retrying helps.
//! 3. **Cancellation**: the caller asked the build to stop ([`Error::Cancelled`]).
//!    This is not a failure and should not be shown as one.
//! 4. **Packaging / storage**: everything else, propagated as-is.
//!
//! # Example
//!
//! ```no_run
//! use flashdeck_export::{Card, Error, ExportFormat, ExportOptions, Exporter};
//!
//! # async fn example(cards: Vec<Card>) {
//! let exporter = Exporter::new();
//! match exporter.export(ExportFormat::Apkg, &cards, &ExportOptions::default()).await {
//!     Ok(result) => println!("ready: {}", result.filename),
//!     Err(e) if e.is_cancelled() => {}
//!     Err(Error::TooManyCards { selected, .. }) => eprintln!("too many cards: {}", selected),
//!     Err(e) => eprintln!("export failed: {}", e),
//! }
//! # }
//! ```

use thiserror::Error;

use crate::registry::ExportFormat;

/// Result type for flashdeck-export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while exporting cards.
#[derive(Debug, Error)]
pub enum Error {
    /// The card list was empty.
    #[error("at least one card is required")]
    NoCards,

    /// The card list exceeds the package size cap.
    #[error("export limited to {limit} cards, you selected {selected}")]
    TooManyCards {
        /// Number of cards passed in.
        selected: usize,
        /// Maximum accepted.
        limit: usize,
    },

    /// An option value is outside its documented shape.
    #[error("invalid export options: {0}")]
    InvalidOptions(String),

    /// The format was compiled out of this build.
    #[error("export format '{0}' is not available in this build")]
    FormatUnavailable(ExportFormat),

    /// The embedded database engine could not be opened.
    #[error("export engine failed to load, reload and retry")]
    EngineUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The export was cancelled by the caller.
    #[error("export was cancelled")]
    Cancelled,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Options file parse error.
    #[error("TOML parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// SQLite error (apkg feature).
    #[cfg(feature = "apkg")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// ZIP error (apkg feature).
    #[cfg(feature = "apkg")]
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Whether this error is a caller-requested cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Whether the request was rejected before any work started.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::NoCards | Error::TooManyCards { .. } | Error::InvalidOptions(_)
        )
    }
}
