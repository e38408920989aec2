//! Typed export options.
//!
//! Each format reads only its own section, so an option can never leak from
//! one format into another. Options load from TOML:
//!
//! ```toml
//! [apkg]
//! deckName = "Japanese N5"
//!
//! [csv]
//! separator = "tab"
//! includeNotes = false
//!
//! [json]
//! prettyPrint = true
//! ```
//!
//! Missing keys take the defaults listed in [`EXPORT_FORMATS`](crate::EXPORT_FORMATS).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::DEFAULT_DECK_NAME;

/// Options for every format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Anki package options.
    pub apkg: ApkgOptions,
    /// CSV options.
    pub csv: CsvOptions,
    /// Markdown options.
    pub markdown: MarkdownOptions,
    /// JSON options.
    pub json: JsonOptions,
}

impl ExportOptions {
    /// Load options from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse options from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Use the same deck name for the Anki package and Markdown exports.
    pub fn with_deck_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.apkg.deck_name = name.clone();
        self.markdown.deck_name = name;
        self
    }
}

/// Anki package options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApkgOptions {
    /// Name of the single deck inside the package.
    pub deck_name: String,
}

impl Default for ApkgOptions {
    fn default() -> Self {
        Self {
            deck_name: DEFAULT_DECK_NAME.to_string(),
        }
    }
}

/// CSV options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CsvOptions {
    /// Field separator.
    pub separator: Separator,
    /// Emit a `tags` column.
    pub include_tags: bool,
    /// Emit a `notes` column.
    pub include_notes: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            separator: Separator::Comma,
            include_tags: true,
            include_notes: true,
        }
    }
}

/// CSV field separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Separator {
    /// `,`
    #[default]
    Comma,
    /// `\t`
    Tab,
}

impl Separator {
    /// The separator byte.
    pub fn as_byte(&self) -> u8 {
        match self {
            Separator::Comma => b',',
            Separator::Tab => b'\t',
        }
    }
}

impl std::str::FromStr for Separator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comma" | "," => Ok(Separator::Comma),
            "tab" | "\\t" | "\t" => Ok(Separator::Tab),
            _ => Err(format!("unknown separator '{}', expected comma or tab", s)),
        }
    }
}

/// Markdown options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarkdownOptions {
    /// Heading written at the top of the file.
    pub deck_name: String,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            deck_name: DEFAULT_DECK_NAME.to_string(),
        }
    }
}

/// JSON options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JsonOptions {
    /// Indent with two spaces instead of emitting compact JSON.
    pub pretty_print: bool,
}

/// Reject a deck name with no visible characters.
pub(crate) fn validate_deck_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidOptions("deck name must not be empty".into()));
    }
    Ok(())
}
