//! Pagewise terminal chat
//!
//! Ingests one parsed document, then answers questions read line by line
//! from stdin until `exit`, `quit` or end of input.

use anyhow::Context;
use clap::Parser;
use pagewise_common::{config::AppConfig, context::AnswerResult, document::ParsedDocument, telemetry, Runtime, VERSION};
use pagewise_ingestion::{DocumentIngestor, IngestionError};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

/// Ask questions about a parsed document
#[derive(Parser, Debug)]
#[command(name = "ask", version, about = "Interactive questions over one document")]
struct Args {
    /// Parsed document JSON
    #[arg(value_name = "PARSED_JSON")]
    input: PathBuf,

    /// Source name used in citations (defaults to the file stem)
    #[arg(long, value_name = "NAME")]
    source: Option<String>,

    /// Configuration file overriding the layered defaults
    #[arg(long, value_name = "PATH", env = "PAGEWISE_CONFIG")]
    config: Option<String>,
}

fn is_exit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit")
}

fn render(result: &AnswerResult) -> String {
    let mut out = format!("\nAnswer:\n{}\n", result.answer);
    if let Some(sources) = result.sources.as_str() {
        out.push_str(&format!("\nSources: {}\n", sources));
    }
    if let Some(note) = &result.note {
        out.push_str(&format!("Note: {}\n", note));
    }
    out
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "\nAsk a question (or type 'exit'): ")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;

    // stdout is reserved for output
    telemetry::init_tracing(&config.observability, std::io::stderr)?;

    info!("Starting Pagewise terminal chat v{}", VERSION);

    let raw = std::fs::read_to_string(&args.input).map_err(|source| IngestionError::Read {
        path: args.input.clone(),
        source,
    })?;
    let parsed = ParsedDocument::from_json(&raw)
        .with_context(|| format!("{} is not a parsed document", args.input.display()))?;

    let source_name = args.source.clone().unwrap_or_else(|| {
        args.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    });

    let ingestor = DocumentIngestor::new(&config.chunking)?;
    let runtime = Runtime::from_config(config)?;
    let report = ingestor.ingest(&runtime, parsed, &source_name).await?;
    println!(
        "Loaded {} ({} pages, {} chunks)",
        report.source_name, report.page_count, report.chunk_count
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if is_exit(question) {
            break;
        }

        match runtime.ask(question).await {
            Ok(result) => print!("{}", render(&result)),
            // capability failures end this question, not the session
            Err(e) => error!(error = %e, "Question failed"),
        }
    }

    println!();
    Ok(())
}
