//! Markdown export in the Obsidian spaced-repetition layout.
//!
//! ```text
//! # Deck name
//! #flashcards
//!
//! Question
//! ?
//! Answer
//! <!--tags: tag1, tag2-->
//! ---
//! Next question
//! ?
//! Next answer
//! ```

use crate::card::Card;
use crate::error::Result;
use crate::export::ExportResult;
use crate::options::{MarkdownOptions, validate_deck_name};
use crate::sanitize::to_plain_text;

use super::safe_file_stem;

/// MIME type of Markdown exports.
pub const MARKDOWN_MIME: &str = "text/markdown;charset=utf-8";

/// Tag that marks the file as a flashcard deck for the plugin.
const DECK_MARKER: &str = "#flashcards";

/// Export cards as Markdown.
///
/// The file is named after the deck: `{safe stem}.md`.
pub fn export_markdown(cards: &[Card], options: &MarkdownOptions) -> Result<ExportResult> {
    validate_deck_name(&options.deck_name)?;

    let mut lines = vec![
        format!("# {}", options.deck_name),
        DECK_MARKER.to_string(),
        String::new(),
    ];

    for (i, card) in cards.iter().enumerate() {
        if i > 0 {
            lines.push("---".to_string());
        }

        lines.push(to_plain_text(&card.front));
        lines.push("?".to_string());
        lines.push(to_plain_text(&card.back));

        if !card.tags.is_empty() {
            lines.push(format!("<!--tags: {}-->", card.tags.join(", ")));
        }
    }

    let mut content = lines.join("\n");
    content.push('\n');

    let filename = format!("{}.md", safe_file_stem(&options.deck_name));
    Ok(ExportResult::text(content, MARKDOWN_MIME, filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(deck_name: &str) -> MarkdownOptions {
        MarkdownOptions {
            deck_name: deck_name.to_string(),
        }
    }

    fn content(cards: &[Card], deck_name: &str) -> String {
        export_markdown(cards, &options(deck_name))
            .unwrap()
            .payload
            .into_text()
            .unwrap()
    }

    fn separator_count(text: &str) -> usize {
        text.lines().filter(|l| *l == "---").count()
    }

    #[test]
    fn test_full_output() {
        let cards = vec![
            Card::new("What is 2+2?", "4").with_tags(["math", "arithmetic"]),
            Card::new("Q2", "A2"),
        ];
        assert_eq!(
            content(&cards, "Test Deck"),
            "# Test Deck\n#flashcards\n\nWhat is 2+2?\n?\n4\n<!--tags: math, arithmetic-->\n---\nQ2\n?\nA2\n"
        );
    }

    #[test]
    fn test_question_followed_by_marker() {
        let md = content(&[Card::new("What is 2+2?", "4")], "Test");
        let lines: Vec<_> = md.lines().collect();
        let q = lines.iter().position(|l| *l == "What is 2+2?").unwrap();
        assert_eq!(lines[q + 1], "?");
        assert_eq!(lines[q + 2], "4");
    }

    #[test]
    fn test_separator_counts() {
        let one = content(&[Card::new("Q1", "A1")], "Test");
        assert_eq!(separator_count(&one), 0);

        let two = content(&[Card::new("Q1", "A1"), Card::new("Q2", "A2")], "Test");
        assert_eq!(separator_count(&two), 1);
        assert!(two.contains("\n---\n"));
    }

    #[test]
    fn test_strips_html() {
        let card = Card::new(
            r#"<div class="fc-front"><span class="fc-word">Hello</span></div>"#,
            r#"<div class="fc-back"><p>World</p></div>"#,
        );
        let md = content(&[card], "Test");
        assert!(!md.contains("<div"));
        assert!(!md.contains("fc-"));
        assert!(md.contains("Hello\n?\nWorld"));
    }

    #[test]
    fn test_keeps_furigana() {
        let md = content(&[Card::new("<ruby>漢字<rt>かんじ</rt></ruby>", "kanji")], "日本語");
        assert!(md.contains("漢字(かんじ)\n?\nkanji"));
    }

    #[test]
    fn test_filename_from_deck_name() {
        let result = export_markdown(&[Card::new("Q", "A")], &options("My Deck! (2026)")).unwrap();
        assert_eq!(result.filename, "My_Deck___2026_.md");
        assert_eq!(result.mime_type, MARKDOWN_MIME);
    }

    #[test]
    fn test_blank_deck_name_rejected() {
        let err = export_markdown(&[Card::new("Q", "A")], &options("  ")).unwrap_err();
        assert!(err.is_validation());
    }
}
