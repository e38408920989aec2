//! Card records accepted by every exporter.
//!
//! Cards arrive either straight from a generation response or as persisted
//! library rows. Both deserialize into [`Card`]; bookkeeping columns such as
//! owner ids, timestamps, confidence scores and source quotes are dropped on
//! input, so no exporter can leak them.
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "id": "lib-1",
//!   "user_id": "user-1",
//!   "front": "What is the capital of France?",
//!   "back": "Paris",
//!   "card_type": "basic",
//!   "tags": ["geography"],
//!   "notes": "",
//!   "domain": "general",
//!   "created_at": "2026-02-27T00:00:00Z"
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A flashcard to export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    /// Question side, possibly containing HTML.
    pub front: String,

    /// Answer side, possibly containing HTML.
    pub back: String,

    /// Card style.
    #[serde(default)]
    pub card_type: CardType,

    /// Tags in caller order. Not deduplicated.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Free-text notes.
    #[serde(default)]
    pub notes: String,

    /// Subject domain, present on library cards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<CardDomain>,
}

impl Card {
    /// Create a basic card with no tags, notes or domain.
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            card_type: CardType::Basic,
            tags: Vec::new(),
            notes: String::new(),
            domain: None,
        }
    }

    /// Set the tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Set the domain.
    pub fn with_domain(mut self, domain: CardDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Set the card type.
    pub fn with_card_type(mut self, card_type: CardType) -> Self {
        self.card_type = card_type;
        self
    }
}

/// Card style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    /// Question / answer.
    #[default]
    Basic,
    /// Cloze deletion.
    Cloze,
}

/// Subject domain a card was generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardDomain {
    /// Language learning.
    #[serde(rename = "lang")]
    Language,
    /// General knowledge.
    #[serde(rename = "general")]
    General,
    /// Medicine.
    #[serde(rename = "med")]
    Medicine,
    /// Mathematics.
    #[serde(rename = "stem-m")]
    Mathematics,
    /// Computer science.
    #[serde(rename = "stem-cs")]
    ComputerScience,
    /// Finance.
    #[serde(rename = "fin")]
    Finance,
    /// Law.
    #[serde(rename = "law")]
    Law,
    /// Arts and humanities.
    #[serde(rename = "arts")]
    Arts,
    /// Practical skills.
    #[serde(rename = "skill")]
    Skill,
    /// Memorisation.
    #[serde(rename = "mem")]
    Memory,
}

impl CardDomain {
    /// Wire identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardDomain::Language => "lang",
            CardDomain::General => "general",
            CardDomain::Medicine => "med",
            CardDomain::Mathematics => "stem-m",
            CardDomain::ComputerScience => "stem-cs",
            CardDomain::Finance => "fin",
            CardDomain::Law => "law",
            CardDomain::Arts => "arts",
            CardDomain::Skill => "skill",
            CardDomain::Memory => "mem",
        }
    }
}

impl fmt::Display for CardDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
