//! JSON export.

use serde::Serialize;

use crate::card::{Card, CardDomain, CardType};
use crate::error::Result;
use crate::export::ExportResult;
use crate::options::JsonOptions;

/// MIME type of JSON exports.
pub const JSON_MIME: &str = "application/json";

/// File name of JSON exports.
pub const JSON_FILENAME: &str = "flashcards.json";

/// The fields of a card that leave the application.
#[derive(Serialize)]
struct ExportedCard<'a> {
    front: &'a str,
    back: &'a str,
    card_type: CardType,
    tags: &'a [String],
    notes: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<CardDomain>,
}

impl<'a> From<&'a Card> for ExportedCard<'a> {
    fn from(card: &'a Card) -> Self {
        Self {
            front: &card.front,
            back: &card.back,
            card_type: card.card_type,
            tags: &card.tags,
            notes: &card.notes,
            domain: card.domain,
        }
    }
}

/// Export cards as a JSON array.
///
/// Card sides are kept as HTML. Output is compact unless `pretty_print` is
/// set, in which case it is indented by two spaces.
pub fn export_json(cards: &[Card], options: &JsonOptions) -> Result<ExportResult> {
    let exported: Vec<ExportedCard<'_>> = cards.iter().map(ExportedCard::from).collect();

    let content = if options.pretty_print {
        serde_json::to_string_pretty(&exported)?
    } else {
        serde_json::to_string(&exported)?
    };

    Ok(ExportResult::text(content, JSON_MIME, JSON_FILENAME))
}
