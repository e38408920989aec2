//! End-to-end tests: cards in, file on disk out.

use flashdeck_export::{
    Card, CardDomain, DirectoryTarget, ExportFormat, ExportOptions, Exporter, Separator,
    trigger_download,
};
use tempfile::TempDir;

fn cards() -> Vec<Card> {
    vec![
        Card::new(
            r#"<div class="fc-front"><span class="fc-word">Bonjour</span></div>"#,
            "<p>Hello</p><p>Good day</p>",
        )
        .with_tags(["french", "greetings"])
        .with_notes("Formal, \"polite\""),
        Card::new("Ça va?", "How are you?").with_domain(CardDomain::Language),
    ]
}

async fn export_to_disk(format: ExportFormat, options: &ExportOptions) -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let result = Exporter::new()
        .export(format, &cards(), options)
        .await
        .unwrap();
    let path = trigger_download(&result, &DirectoryTarget::new(dir.path())).unwrap();
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    (dir, name)
}

#[tokio::test]
async fn test_csv_file() {
    let (dir, name) = export_to_disk(ExportFormat::Csv, &ExportOptions::default()).await;
    assert_eq!(name, "flashcards.csv");

    let content = std::fs::read_to_string(dir.path().join(&name)).unwrap();
    let body = content.strip_prefix('\u{feff}').unwrap();
    assert!(body.starts_with("front,back,tags,notes\n"));
    // The multi-line answer stays inside one quoted field.
    assert!(body.contains(
        "\nBonjour,\"Hello\n\nGood day\",french;greetings,\"Formal, \"\"polite\"\"\"\n"
    ));
    assert!(content.ends_with("Ça va?,How are you?,,"));
}

#[tokio::test]
async fn test_tab_separated_without_extras() {
    let mut options = ExportOptions::default();
    options.csv.separator = Separator::Tab;
    options.csv.include_tags = false;
    options.csv.include_notes = false;

    let (dir, name) = export_to_disk(ExportFormat::Csv, &options).await;
    let content = std::fs::read_to_string(dir.path().join(name)).unwrap();
    assert!(content.starts_with("\u{feff}front\tback\n"));
    assert!(content.ends_with("Ça va?\tHow are you?"));
}

#[tokio::test]
async fn test_markdown_file() {
    let options = ExportOptions::default().with_deck_name("French Basics");
    let (dir, name) = export_to_disk(ExportFormat::Markdown, &options).await;
    assert_eq!(name, "French_Basics.md");

    let content = std::fs::read_to_string(dir.path().join(name)).unwrap();
    assert!(content.starts_with("# French Basics\n#flashcards\n\nBonjour\n?\nHello\n\nGood day\n"));
    assert!(content.contains("<!--tags: french, greetings-->\n---\nÇa va?\n?\nHow are you?\n"));
}

#[tokio::test]
async fn test_json_file() {
    let mut options = ExportOptions::default();
    options.json.pretty_print = true;

    let (dir, name) = export_to_disk(ExportFormat::Json, &options).await;
    let content = std::fs::read_to_string(dir.path().join(name)).unwrap();

    let parsed: Vec<Card> = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, cards());
}

#[cfg(feature = "apkg")]
#[tokio::test]
async fn test_apkg_file() {
    let options = ExportOptions::default().with_deck_name("French Basics");
    let (dir, name) = export_to_disk(ExportFormat::Apkg, &options).await;
    assert_eq!(name, "French_Basics.apkg");

    let bytes = std::fs::read(dir.path().join(name)).unwrap();
    assert!(bytes.starts_with(b"PK\x03\x04"));
}
