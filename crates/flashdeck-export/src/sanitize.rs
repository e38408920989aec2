//! HTML to plain text conversion for the text exporters.
//!
//! Card sides are stored as light HTML. The CSV and Markdown exporters need
//! plain text, but ruby annotations (furigana) carry meaning and must survive
//! as `base(reading)`.
//!
//! ```
//! use flashdeck_export::to_plain_text;
//!
//! assert_eq!(to_plain_text("<ruby>漢字<rt>かんじ</rt></ruby>"), "漢字(かんじ)");
//! assert_eq!(to_plain_text("<p>one</p><p>two</p>"), "one\n\ntwo");
//! ```

use std::sync::LazyLock;

use regex::Regex;

static RUBY_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<rp\b[^>]*>.*?</rp>").expect("valid regex"));

static RUBY_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<rt\b[^>]*>(.*?)</rt>").expect("valid regex"));

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p>\s*<p\b[^>]*>").expect("valid regex"));

static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)</?(?:div|p|span|section|h[1-6]|ul|ol|li|ruby|rb|rt|rp|table|thead|tbody|tr|td|th|pre|code|blockquote|a|em|strong|b|i|u|s|sub|sup|hr|mark)\b[^>]*>",
    )
    .expect("valid regex")
});

static INLINE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\S\n]+").expect("valid regex"));

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Strip card HTML down to plain text.
///
/// - `<rt>` readings become `(reading)` after their base text; `<rp>`
///   fallbacks are dropped so they are not doubled
/// - `<br>` becomes a newline, adjacent paragraphs a blank line
/// - known formatting tags are removed, keeping their inner text
/// - whitespace is collapsed and the result trimmed
///
/// Unknown or malformed markup is left in place rather than guessed at.
pub fn to_plain_text(html: &str) -> String {
    // Readings first: generic stripping would throw away the <rt> contents.
    let text = RUBY_FALLBACK.replace_all(html, "");
    let text = RUBY_TEXT.replace_all(&text, "(${1})");

    let text = LINE_BREAK.replace_all(&text, "\n");
    let text = PARAGRAPH_BREAK.replace_all(&text, "\n\n");
    let text = MARKUP_TAG.replace_all(&text, "");
    let text = INLINE_SPACE.replace_all(&text, " ");
    let text = BLANK_LINES.replace_all(&text, "\n\n");

    text.trim().to_string()
}
