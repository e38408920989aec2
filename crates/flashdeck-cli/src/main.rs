//! Command-line host for flashdeck exports.
//!
//! Reads a JSON array of cards, exports it in the requested format and saves
//! the file into an output directory. Ctrl-C cancels a running Anki package
//! build.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use flashdeck_export::{
    CancelToken, Card, DirectoryTarget, EXPORT_FORMATS, ExportControl, ExportFormat,
    ExportOptions, Exporter, OptionKind, Separator, trigger_download,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Exit status for an export cancelled with Ctrl-C.
const EXIT_CANCELLED: u8 = 130;

/// Export flashcards to Anki packages, CSV, Markdown or JSON.
#[derive(Parser, Debug)]
#[command(name = "flashdeck")]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file holding an array of cards
    #[arg(required_unless_present = "list_formats")]
    input: Option<PathBuf>,

    /// Export format: apkg, csv, markdown or json
    #[arg(short, long, required_unless_present = "list_formats")]
    format: Option<ExportFormat>,

    /// Directory to save the export into
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// TOML file with export options
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Deck name for Anki packages and Markdown
    #[arg(long)]
    deck_name: Option<String>,

    /// CSV separator: comma or tab
    #[arg(long)]
    separator: Option<Separator>,

    /// Leave the tags column out of CSV exports
    #[arg(long, default_value_t = false)]
    no_tags: bool,

    /// Leave the notes column out of CSV exports
    #[arg(long, default_value_t = false)]
    no_notes: bool,

    /// Indent JSON exports
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// List the available formats and their options, then exit
    #[arg(long, default_value_t = false)]
    list_formats: bool,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Options from `--config`, overridden by flags.
    fn options(&self) -> flashdeck_export::Result<ExportOptions> {
        let mut options = match &self.config {
            Some(path) => ExportOptions::from_file(path)?,
            None => ExportOptions::default(),
        };

        if let Some(name) = &self.deck_name {
            options = options.with_deck_name(name.as_str());
        }
        if let Some(separator) = self.separator {
            options.csv.separator = separator;
        }
        if self.no_tags {
            options.csv.include_tags = false;
        }
        if self.no_notes {
            options.csv.include_notes = false;
        }
        if self.pretty {
            options.json.pretty_print = true;
        }

        Ok(options)
    }
}

fn read_cards(path: &Path) -> flashdeck_export::Result<Vec<Card>> {
    let content = std::fs::read_to_string(path)?;
    let cards: Vec<Card> = serde_json::from_str(&content)?;
    debug!(path = %path.display(), cards = cards.len(), "Loaded cards");
    Ok(cards)
}

fn list_formats() {
    for info in &EXPORT_FORMATS {
        println!("{:<10} {} ({})", info.format.id(), info.label, info.extension);
        println!("           {}", info.description);
        for field in info.options {
            let default = match &field.kind {
                OptionKind::Text { default } => default.to_string(),
                OptionKind::Boolean { default } => default.to_string(),
                OptionKind::Select { default, choices } => {
                    let values: Vec<&str> = choices.iter().map(|(value, _)| *value).collect();
                    format!("{} [{}]", default, values.join(", "))
                }
            };
            println!("           --{}: {} (default: {})", field.key, field.label, default);
        }
    }
}

async fn run(args: &Args, input: &Path, format: ExportFormat) -> flashdeck_export::Result<PathBuf> {
    let options = args.options()?;
    let cards = read_cards(input)?;

    let token = CancelToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Cancelling export");
                token.cancel();
            }
        });
    }

    let control = ExportControl::new()
        .on_progress(|fraction| {
            info!(percent = (fraction * 100.0).round() as u32, "Export progress");
        })
        .cancel_token(token);

    let result = Exporter::new()
        .export_with(format, &cards, &options, control)
        .await?;

    trigger_download(&result, &DirectoryTarget::new(&args.out))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing; RUST_LOG wins over -v
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if args.list_formats {
        list_formats();
        return ExitCode::SUCCESS;
    }

    // Both are required by clap unless --list-formats was given.
    let (Some(input), Some(format)) = (args.input.as_deref(), args.format) else {
        return ExitCode::FAILURE;
    };

    match run(&args, input, format).await {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) if e.is_cancelled() => ExitCode::from(EXIT_CANCELLED),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let args = Args::try_parse_from([
            "flashdeck",
            "cards.json",
            "--format",
            "csv",
            "--separator",
            "tab",
            "--no-notes",
            "--deck-name",
            "Biology",
        ])
        .unwrap();

        assert_eq!(args.format, Some(ExportFormat::Csv));
        let options = args.options().unwrap();
        assert_eq!(options.csv.separator, Separator::Tab);
        assert!(options.csv.include_tags);
        assert!(!options.csv.include_notes);
        assert_eq!(options.apkg.deck_name, "Biology");
        assert_eq!(options.markdown.deck_name, "Biology");
        assert!(!options.json.pretty_print);
    }

    #[test]
    fn test_format_aliases() {
        let args = Args::try_parse_from(["flashdeck", "cards.json", "-f", "md"]).unwrap();
        assert_eq!(args.format, Some(ExportFormat::Markdown));
    }

    #[test]
    fn test_input_and_format_required() {
        assert!(Args::try_parse_from(["flashdeck", "cards.json"]).is_err());
        assert!(Args::try_parse_from(["flashdeck", "--format", "json"]).is_err());
        assert!(Args::try_parse_from(["flashdeck", "--list-formats"]).is_ok());
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Args::try_parse_from(["flashdeck", "cards.json", "--format", "pdf"]).is_err());
    }

    #[test]
    fn test_verbosity_count() {
        let args = Args::try_parse_from(["flashdeck", "--list-formats", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }
}
