//! CSV export.

use crate::card::Card;
use crate::error::Result;
use crate::export::ExportResult;
use crate::options::CsvOptions;
use crate::sanitize::to_plain_text;

/// Byte-order mark so spreadsheet applications detect UTF-8.
const BOM: char = '\u{feff}';

/// MIME type of CSV exports.
pub const CSV_MIME: &str = "text/csv;charset=utf-8";

/// File name of CSV exports.
pub const CSV_FILENAME: &str = "flashcards.csv";

/// Export cards as CSV.
///
/// The header row is `front,back` followed by `tags` and `notes` when enabled.
/// Card sides are converted to plain text; tags are joined with `;`. Fields
/// containing the separator, a quote or a newline are quoted with inner quotes
/// doubled. Rows are separated by `\n` with no trailing newline.
pub fn export_csv(cards: &[Card], options: &CsvOptions) -> Result<ExportResult> {
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(options.separator.as_byte())
        .terminator(::csv::Terminator::Any(b'\n'))
        .quote_style(::csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    let mut header = vec!["front", "back"];
    if options.include_tags {
        header.push("tags");
    }
    if options.include_notes {
        header.push("notes");
    }
    writer.write_record(&header)?;

    for card in cards {
        let mut row = vec![to_plain_text(&card.front), to_plain_text(&card.back)];
        if options.include_tags {
            row.push(card.tags.join(";"));
        }
        if options.include_notes {
            row.push(card.notes.clone());
        }
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let body = String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut content = String::with_capacity(body.len() + BOM.len_utf8());
    content.push(BOM);
    content.push_str(body.strip_suffix('\n').unwrap_or(&body));

    Ok(ExportResult::text(content, CSV_MIME, CSV_FILENAME))
}
