//! .apkg package generation.
//!
//! Builds an Anki package entirely in-process: a collection database holding
//! one deck, one "Basic" note type and one note + card per exported card,
//! zipped together with an empty media manifest.
//!
//! Insertion runs in batches. Between batches the builder reports progress,
//! yields to the tokio scheduler and checks its [`CancelToken`], so a large
//! export never monopolises the runtime and can be abandoned part-way. The
//! database is released exactly once however the build ends.
//!
//! # Example
//!
//! ```no_run
//! use flashdeck_export::{ApkgBuilder, ApkgCard};
//!
//! # async fn example() -> flashdeck_export::Result<()> {
//! let tags = vec!["geography".to_string()];
//! let cards = vec![ApkgCard::new("Capital of France?", "Paris").with_tags(&tags)];
//!
//! let package = ApkgBuilder::new("Geography")
//!     .on_progress(|fraction| println!("{:.0}%", fraction * 100.0))
//!     .build(&cards)
//!     .await?;
//! std::fs::write("Geography.apkg", &package.data)?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::{debug, info};

use crate::card::Card;
use crate::collection::{CardRow, CollectionRow, NoteRow};
use crate::error::{Error, Result};
use crate::export::{CancelToken, ProgressFn};
use crate::ids::{IdGenerator, field_checksum, guid, now_millis};
use crate::package::{PackageWriter, ZipPackageWriter};
use crate::sql::SCHEMA;
use crate::store::{CollectionEngine, CollectionStore, SqliteEngine, StoreGuard};

/// Maximum cards in one package.
///
/// Every card costs two inserts; this keeps a build interactive on slow devices.
pub const MAX_APKG_CARDS: usize = 2000;

/// Cards inserted between progress reports and cancellation checks.
pub const PROGRESS_BATCH: usize = 100;

/// The parts of a card that go into a package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApkgCard<'a> {
    /// Front field HTML.
    pub front: &'a str,
    /// Back field HTML.
    pub back: &'a str,
    /// Tags, in order.
    pub tags: &'a [String],
}

impl<'a> ApkgCard<'a> {
    /// A card with no tags.
    pub fn new(front: &'a str, back: &'a str) -> Self {
        Self {
            front,
            back,
            tags: &[],
        }
    }

    /// Set the tags.
    pub fn with_tags(mut self, tags: &'a [String]) -> Self {
        self.tags = tags;
        self
    }
}

impl<'a> From<&'a Card> for ApkgCard<'a> {
    fn from(card: &'a Card) -> Self {
        Self {
            front: &card.front,
            back: &card.back,
            tags: &card.tags,
        }
    }
}

/// A finished package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApkgPackage {
    /// The `.apkg` file contents.
    pub data: Vec<u8>,
    /// Number of cards packaged.
    pub card_count: usize,
    /// Name of the deck inside the package.
    pub deck_name: String,
}

/// Builder for `.apkg` packages.
///
/// The engine and package writer default to SQLite and ZIP; both can be
/// replaced. Ids come from an [`IdGenerator`] that may be shared with other
/// builders so ids keep increasing across packages.
pub struct ApkgBuilder<E = SqliteEngine, W = ZipPackageWriter> {
    deck_name: String,
    engine: E,
    writer: W,
    ids: Arc<IdGenerator>,
    progress: Option<ProgressFn>,
    cancel: Option<CancelToken>,
}

impl ApkgBuilder {
    /// Create a builder for a deck with the given name.
    pub fn new(deck_name: impl Into<String>) -> Self {
        Self {
            deck_name: deck_name.into(),
            engine: SqliteEngine,
            writer: ZipPackageWriter,
            ids: Arc::new(IdGenerator::new()),
            progress: None,
            cancel: None,
        }
    }
}

impl<E: CollectionEngine, W: PackageWriter> ApkgBuilder<E, W> {
    /// Use a different database engine.
    pub fn engine<E2: CollectionEngine>(self, engine: E2) -> ApkgBuilder<E2, W> {
        ApkgBuilder {
            deck_name: self.deck_name,
            engine,
            writer: self.writer,
            ids: self.ids,
            progress: self.progress,
            cancel: self.cancel,
        }
    }

    /// Use a different package writer.
    pub fn package_writer<W2: PackageWriter>(self, writer: W2) -> ApkgBuilder<E, W2> {
        ApkgBuilder {
            deck_name: self.deck_name,
            engine: self.engine,
            writer,
            ids: self.ids,
            progress: self.progress,
            cancel: self.cancel,
        }
    }

    /// Draw ids from a shared generator.
    pub fn id_generator(mut self, ids: Arc<IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Report progress to `callback`.
    pub fn on_progress(mut self, callback: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Report progress to an already shared callback, or to nobody.
    pub fn progress(mut self, callback: Option<ProgressFn>) -> Self {
        self.progress = callback;
        self
    }

    /// Stop at the next checkpoint once `token` is cancelled.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Name of the deck being built.
    pub fn deck_name(&self) -> &str {
        &self.deck_name
    }

    /// Build the package.
    ///
    /// # Errors
    ///
    /// - [`Error::NoCards`] / [`Error::TooManyCards`] before anything is opened
    /// - [`Error::EngineUnavailable`] if the database cannot be opened
    /// - [`Error::Cancelled`] if the token fires at a checkpoint
    /// - storage or packaging errors as they occur
    pub async fn build(&self, cards: &[ApkgCard<'_>]) -> Result<ApkgPackage> {
        validate_card_count(cards.len())?;

        info!(deck = %self.deck_name, cards = cards.len(), "Building Anki package");

        let mut store = StoreGuard::new(self.engine.open()?);
        store.create_schema(SCHEMA)?;

        let deck_id = self.ids.next();
        let model_id = self.ids.next();
        let now_ms = now_millis();
        let now = now_ms / 1000;

        store.insert_collection(&CollectionRow::new(
            &self.deck_name,
            deck_id,
            model_id,
            now_ms,
        ))?;

        let total = cards.len();
        for (index, card) in cards.iter().enumerate() {
            let note_id = self.ids.next();
            let card_id = self.ids.next();

            store.insert_note(&NoteRow {
                id: note_id,
                guid: guid(),
                mid: model_id,
                modified: now,
                tags: NoteRow::tag_string(card.tags),
                flds: NoteRow::join_fields(card.front, card.back),
                sfld: card.front.to_string(),
                csum: field_checksum(card.front),
            })?;
            store.insert_card(&CardRow::new_card(
                card_id,
                note_id,
                deck_id,
                now,
                index as i64,
            ))?;

            let done = index + 1;
            if done % PROGRESS_BATCH == 0 && done < total {
                self.report(done as f64 / total as f64);
                tokio::task::yield_now().await;
                if self.is_cancelled() {
                    info!(deck = %self.deck_name, done, total, "Anki package build cancelled");
                    return Err(Error::Cancelled);
                }
            }
        }

        self.report(1.0);

        let collection = store.to_bytes()?;
        debug!(bytes = collection.len(), "Serialized collection");
        let data = self.writer.write(&collection)?;
        drop(store);

        info!(deck = %self.deck_name, bytes = data.len(), "Built Anki package");

        Ok(ApkgPackage {
            data,
            card_count: total,
            deck_name: self.deck_name.clone(),
        })
    }

    fn report(&self, fraction: f64) {
        if let Some(ref progress) = self.progress {
            progress(fraction);
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

/// Check a card count against the package limits.
pub fn validate_card_count(count: usize) -> Result<()> {
    if count == 0 {
        return Err(Error::NoCards);
    }
    if count > MAX_APKG_CARDS {
        return Err(Error::TooManyCards {
            selected: count,
            limit: MAX_APKG_CARDS,
        });
    }
    Ok(())
}
