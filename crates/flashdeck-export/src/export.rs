//! Export entry point.
//!
//! [`Exporter`] routes a format and a card list to the matching encoder and
//! hands back an [`ExportResult`] ready for
//! [`trigger_download`](crate::trigger_download).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use crate::card::Card;
use crate::error::Result;
use crate::formats::{export_csv, export_json, export_markdown};
use crate::ids::IdGenerator;
use crate::options::{ApkgOptions, ExportOptions};
use crate::registry::ExportFormat;

/// MIME type of Anki packages.
pub const APKG_MIME: &str = "application/octet-stream";

/// Progress callback, called with the completed fraction in `0.0..=1.0`.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Cooperative cancellation flag shared between a build and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every build holding this token to stop at its next checkpoint.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Exported file contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// UTF-8 text (CSV, Markdown, JSON).
    Text(String),
    /// Binary data (Anki packages).
    Binary(Vec<u8>),
}

impl Payload {
    /// The bytes to write to disk.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Payload::Text(text) => text.as_bytes(),
            Payload::Binary(data) => data,
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether the payload holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The text, if this is a text payload.
    pub fn into_text(self) -> Option<String> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Binary(_) => None,
        }
    }
}

/// A finished export: contents plus how to offer them for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// File contents.
    pub payload: Payload,
    /// MIME type for the download.
    pub mime_type: &'static str,
    /// Suggested file name, including the extension.
    pub filename: String,
}

impl ExportResult {
    /// A text export.
    pub fn text(content: String, mime_type: &'static str, filename: impl Into<String>) -> Self {
        Self {
            payload: Payload::Text(content),
            mime_type,
            filename: filename.into(),
        }
    }

    /// A binary export.
    pub fn binary(data: Vec<u8>, mime_type: &'static str, filename: impl Into<String>) -> Self {
        Self {
            payload: Payload::Binary(data),
            mime_type,
            filename: filename.into(),
        }
    }
}

/// Progress and cancellation hooks for one export.
///
/// Only the Anki package build reports progress or checks for cancellation;
/// text formats finish in a single step.
#[derive(Clone, Default)]
pub struct ExportControl {
    /// Called with the completed fraction.
    pub progress: Option<ProgressFn>,
    /// Checked between insert batches.
    pub cancel: Option<CancelToken>,
}

impl ExportControl {
    /// No progress reporting, no cancellation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report progress to `callback`.
    pub fn on_progress(mut self, callback: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Stop once `token` is cancelled.
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Runs exports.
///
/// All Anki packages built by one exporter draw ids from the same
/// [`IdGenerator`], so ids keep increasing from one package to the next.
///
/// ```no_run
/// use flashdeck_export::{Card, ExportFormat, ExportOptions, Exporter};
///
/// # async fn example() -> flashdeck_export::Result<()> {
/// let cards = vec![Card::new("Capital of France?", "Paris")];
/// let options = ExportOptions::default().with_deck_name("Geography");
///
/// let result = Exporter::new()
///     .export(ExportFormat::Markdown, &cards, &options)
///     .await?;
/// assert_eq!(result.filename, "Geography.md");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    ids: Arc<IdGenerator>,
}

impl Exporter {
    /// Create an exporter with its own id generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an exporter drawing ids from a shared generator.
    pub fn with_id_generator(ids: Arc<IdGenerator>) -> Self {
        Self { ids }
    }

    /// The id generator used for Anki packages.
    pub fn id_generator(&self) -> &Arc<IdGenerator> {
        &self.ids
    }

    /// Export `cards` in `format`.
    pub async fn export(
        &self,
        format: ExportFormat,
        cards: &[Card],
        options: &ExportOptions,
    ) -> Result<ExportResult> {
        self.export_with(format, cards, options, ExportControl::default())
            .await
    }

    /// Export `cards` in `format`, reporting progress and honouring cancellation.
    ///
    /// Each format reads only its own section of `options`.
    pub async fn export_with(
        &self,
        format: ExportFormat,
        cards: &[Card],
        options: &ExportOptions,
        control: ExportControl,
    ) -> Result<ExportResult> {
        info!(format = %format, cards = cards.len(), "Starting export");

        let result = match format {
            ExportFormat::Csv => export_csv(cards, &options.csv)?,
            ExportFormat::Markdown => export_markdown(cards, &options.markdown)?,
            ExportFormat::Json => export_json(cards, &options.json)?,
            ExportFormat::Apkg => self.export_apkg(cards, &options.apkg, control).await?,
        };

        info!(
            format = %format,
            filename = %result.filename,
            bytes = result.payload.len(),
            "Export finished"
        );
        Ok(result)
    }

    #[cfg(feature = "apkg")]
    async fn export_apkg(
        &self,
        cards: &[Card],
        options: &ApkgOptions,
        control: ExportControl,
    ) -> Result<ExportResult> {
        use crate::apkg::{ApkgBuilder, ApkgCard, validate_card_count};
        use crate::formats::safe_file_stem;
        use crate::options::validate_deck_name;

        validate_deck_name(&options.deck_name)?;
        validate_card_count(cards.len())?;

        let apkg_cards: Vec<ApkgCard<'_>> = cards.iter().map(ApkgCard::from).collect();

        let mut builder = ApkgBuilder::new(options.deck_name.as_str())
            .id_generator(Arc::clone(&self.ids))
            .progress(control.progress);
        if let Some(token) = control.cancel {
            builder = builder.cancel_token(token);
        }

        let package = builder.build(&apkg_cards).await?;
        let filename = format!("{}.apkg", safe_file_stem(&options.deck_name));
        Ok(ExportResult::binary(package.data, APKG_MIME, filename))
    }

    #[cfg(not(feature = "apkg"))]
    async fn export_apkg(
        &self,
        _cards: &[Card],
        _options: &ApkgOptions,
        _control: ExportControl,
    ) -> Result<ExportResult> {
        Err(crate::error::Error::FormatUnavailable(ExportFormat::Apkg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    #[cfg(feature = "apkg")]
    use std::sync::Mutex;

    fn cards(n: usize) -> Vec<Card> {
        (0..n)
            .map(|i| Card::new(format!("Q{}", i), format!("A{}", i)))
            .collect()
    }

    #[test]
    fn test_payload_bytes() {
        assert_eq!(Payload::Text("héllo".into()).as_bytes(), "héllo".as_bytes());
        assert_eq!(Payload::Binary(vec![1, 2, 3]).len(), 3);
        assert!(Payload::Binary(Vec::new()).is_empty());
        assert_eq!(Payload::Binary(vec![1]).into_text(), None);
    }

    #[test]
    fn test_cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn test_routes_text_formats() {
        let exporter = Exporter::new();
        let options = ExportOptions::default();
        let cards = cards(2);

        let csv = exporter.export(ExportFormat::Csv, &cards, &options).await.unwrap();
        assert_eq!(csv.filename, "flashcards.csv");
        assert_eq!(csv.mime_type, "text/csv;charset=utf-8");

        let md = exporter
            .export(ExportFormat::Markdown, &cards, &options)
            .await
            .unwrap();
        assert_eq!(md.filename, "Flashcards_Export.md");

        let json = exporter.export(ExportFormat::Json, &cards, &options).await.unwrap();
        assert_eq!(json.filename, "flashcards.json");
        assert!(matches!(json.payload, Payload::Text(_)));
    }

    #[tokio::test]
    async fn test_formats_read_only_their_own_options() {
        let mut options = ExportOptions::default();
        options.json.pretty_print = true;
        options.markdown.deck_name = "Notes".into();

        let csv = Exporter::new()
            .export(ExportFormat::Csv, &cards(1), &options)
            .await
            .unwrap();
        let text = csv.payload.into_text().unwrap();
        assert!(!text.contains("Notes"));
        assert!(!text.contains('{'));
    }

    #[tokio::test]
    async fn test_blank_markdown_deck_name_rejected() {
        let options = ExportOptions::default().with_deck_name("   ");
        let err = Exporter::new()
            .export(ExportFormat::Markdown, &cards(1), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
    }

    #[cfg(feature = "apkg")]
    #[tokio::test]
    async fn test_apkg_result() {
        let options = ExportOptions::default().with_deck_name("Biology 101");
        let result = Exporter::new()
            .export(ExportFormat::Apkg, &cards(3), &options)
            .await
            .unwrap();

        assert_eq!(result.filename, "Biology_101.apkg");
        assert_eq!(result.mime_type, APKG_MIME);
        assert!(matches!(result.payload, Payload::Binary(_)));
        assert!(result.payload.as_bytes().starts_with(b"PK"));
    }

    #[cfg(feature = "apkg")]
    #[tokio::test]
    async fn test_apkg_validation_before_work() {
        let exporter = Exporter::new();

        let blank = ExportOptions::default().with_deck_name("");
        let err = exporter
            .export(ExportFormat::Apkg, &cards(1), &blank)
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = exporter
            .export(ExportFormat::Apkg, &[], &ExportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoCards));

        let err = exporter
            .export(ExportFormat::Apkg, &cards(2001), &ExportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TooManyCards {
                selected: 2001,
                limit: 2000
            }
        ));

        assert_eq!(exporter.id_generator().last(), 0);
    }

    #[cfg(feature = "apkg")]
    #[tokio::test]
    async fn test_ids_increase_across_packages() {
        let exporter = Exporter::new();
        let options = ExportOptions::default();

        exporter
            .export(ExportFormat::Apkg, &cards(5), &options)
            .await
            .unwrap();
        let after_first = exporter.id_generator().last();

        exporter
            .export(ExportFormat::Apkg, &cards(5), &options)
            .await
            .unwrap();
        // deck + model + note and card per entry
        assert!(exporter.id_generator().last() >= after_first + 12);
    }

    #[cfg(feature = "apkg")]
    #[tokio::test]
    async fn test_progress_and_cancellation_pass_through() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let token = CancelToken::new();

        let control = {
            let seen = seen.clone();
            let canceller = token.clone();
            ExportControl::new()
                .on_progress(move |fraction| {
                    seen.lock().unwrap().push(fraction);
                    canceller.cancel();
                })
                .cancel_token(token)
        };

        let err = Exporter::new()
            .export_with(ExportFormat::Apkg, &cards(250), &ExportOptions::default(), control)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(*seen.lock().unwrap(), vec![0.4]);
    }

    #[cfg(not(feature = "apkg"))]
    #[tokio::test]
    async fn test_apkg_unavailable_without_feature() {
        let err = Exporter::new()
            .export(ExportFormat::Apkg, &cards(1), &ExportOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FormatUnavailable(ExportFormat::Apkg)));
    }
}
