//! Export format registry.
//!
//! Each format carries the metadata a host needs to render a format picker:
//! label, description, file extension and the option fields the user may set.
//! Option defaults listed here are the same values the typed option structs in
//! [`ExportOptions`](crate::ExportOptions) fall back to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Deck name used when the caller does not provide one.
pub const DEFAULT_DECK_NAME: &str = "Flashcards Export";

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Anki package (.apkg).
    Apkg,
    /// Comma- or tab-separated values.
    Csv,
    /// Obsidian spaced-repetition Markdown.
    Markdown,
    /// JSON array.
    Json,
}

impl ExportFormat {
    /// All formats, in picker order.
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Apkg,
        ExportFormat::Csv,
        ExportFormat::Markdown,
        ExportFormat::Json,
    ];

    /// Stable identifier.
    pub fn id(&self) -> &'static str {
        match self {
            ExportFormat::Apkg => "apkg",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "markdown",
            ExportFormat::Json => "json",
        }
    }

    /// Registry entry for this format.
    pub fn info(&self) -> &'static FormatInfo {
        match self {
            ExportFormat::Apkg => &EXPORT_FORMATS[0],
            ExportFormat::Csv => &EXPORT_FORMATS[1],
            ExportFormat::Markdown => &EXPORT_FORMATS[2],
            ExportFormat::Json => &EXPORT_FORMATS[3],
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "apkg" | "anki" => Ok(ExportFormat::Apkg),
            "csv" => Ok(ExportFormat::Csv),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "json" => Ok(ExportFormat::Json),
            _ => Err(format!(
                "unknown export format '{}', expected one of: apkg, csv, markdown, json",
                s
            )),
        }
    }
}

/// Metadata for one export format.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormatInfo {
    /// Format this entry describes.
    pub format: ExportFormat,
    /// Human-readable name.
    pub label: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// File extension, including the dot.
    pub extension: &'static str,
    /// User-configurable options.
    pub options: &'static [OptionField],
}

/// A user-configurable option.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OptionField {
    /// Key used in option files.
    pub key: &'static str,
    /// Human-readable label.
    pub label: &'static str,
    /// Value kind and default.
    pub kind: OptionKind,
}

/// Kind of an option value, with its default.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OptionKind {
    /// Free text.
    Text {
        /// Default value.
        default: &'static str,
    },
    /// On/off switch.
    Boolean {
        /// Default value.
        default: bool,
    },
    /// One of a fixed set of choices.
    Select {
        /// Default choice value.
        default: &'static str,
        /// `(value, label)` pairs.
        choices: &'static [(&'static str, &'static str)],
    },
}

const DECK_NAME_FIELD: OptionField = OptionField {
    key: "deckName",
    label: "Deck name",
    kind: OptionKind::Text {
        default: DEFAULT_DECK_NAME,
    },
};

/// Every export format, in picker order.
pub static EXPORT_FORMATS: [FormatInfo; 4] = [
    FormatInfo {
        format: ExportFormat::Apkg,
        label: "Anki Package",
        description: "Import directly into Anki desktop or mobile",
        extension: ".apkg",
        options: &[DECK_NAME_FIELD],
    },
    FormatInfo {
        format: ExportFormat::Csv,
        label: "CSV",
        description: "Spreadsheets, Anki import, or other flashcard apps",
        extension: ".csv",
        options: &[
            OptionField {
                key: "separator",
                label: "Separator",
                kind: OptionKind::Select {
                    default: "comma",
                    choices: &[("comma", "Comma"), ("tab", "Tab")],
                },
            },
            OptionField {
                key: "includeTags",
                label: "Include tags",
                kind: OptionKind::Boolean { default: true },
            },
            OptionField {
                key: "includeNotes",
                label: "Include notes",
                kind: OptionKind::Boolean { default: true },
            },
        ],
    },
    FormatInfo {
        format: ExportFormat::Markdown,
        label: "Markdown",
        description: "Obsidian Spaced Repetition plugin format",
        extension: ".md",
        options: &[DECK_NAME_FIELD],
    },
    FormatInfo {
        format: ExportFormat::Json,
        label: "JSON",
        description: "Developer-friendly format for custom processing",
        extension: ".json",
        options: &[OptionField {
            key: "prettyPrint",
            label: "Pretty print",
            kind: OptionKind::Boolean { default: false },
        }],
    },
];
