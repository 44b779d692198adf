//! Pagewise ingestion CLI
//!
//! Loads one parsed document:
//! 1. Reads the parsed JSON (`{"blocks": [...]}`)
//! 2. Builds the document model, page structure and chunks
//! 3. Indexes the chunks
//! 4. Prints an ingestion report, optionally exporting structure and chunks

use anyhow::Context;
use clap::Parser;
use pagewise_common::{config::AppConfig, document::ParsedDocument, telemetry, Runtime, VERSION};
use pagewise_ingestion::{export_json, DocumentIngestor, IngestionError, IngestionReport};
use std::path::PathBuf;
use tracing::info;

/// Ingest a parsed document and report what was indexed
#[derive(Parser, Debug)]
#[command(name = "ingest", version, about = "Chunk and index a parsed document")]
struct Args {
    /// Parsed document JSON
    #[arg(value_name = "PARSED_JSON")]
    input: PathBuf,

    /// Source name used in citations (defaults to the file stem)
    #[arg(long, value_name = "NAME")]
    source: Option<String>,

    /// Write the page/section structure as JSON
    #[arg(long, value_name = "PATH")]
    structure_out: Option<PathBuf>,

    /// Write the produced chunks as JSON
    #[arg(long, value_name = "PATH")]
    chunks_out: Option<PathBuf>,

    /// Configuration file overriding the layered defaults
    #[arg(long, value_name = "PATH", env = "PAGEWISE_CONFIG")]
    config: Option<String>,
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

    // Logs go to stderr; stdout carries the report
    telemetry::init_tracing(&config.observability, std::io::stderr)?;

    info!("Starting Pagewise ingestion v{}", VERSION);

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
    let prepared = ingestor.prepare(parsed, &source_name)?;

    if let Some(path) = &args.structure_out {
        export_json(&prepared.document.structure, path)?;
    }
    if let Some(path) = &args.chunks_out {
        export_json(&prepared.chunks, path)?;
    }

    let runtime = Runtime::from_config(config)?;
    let loaded = runtime
        .replace_document(prepared.document, prepared.chunks)
        .await?;

    let report = IngestionReport::from_document(&loaded);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
