use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use docrag::{ingest, RawSettings};

#[derive(Parser, Debug)]
#[command(
    name = "docrag-ingest",
    about = "Ingest a PDF into a pgvector collection for retrieval"
)]
struct IngestCli {
    /// Path to the source PDF
    #[arg(long, env = "PDF_PATH")]
    pdf_path: Option<PathBuf>,

    /// Postgres connection string (postgres://...)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Collection name holding chunks and embeddings
    #[arg(long, env = "PG_VECTOR_COLLECTION_NAME")]
    collection: Option<String>,

    /// Google API key for embedding requests
    #[arg(long, env = "GOOGLE_API_KEY")]
    google_api_key: Option<String>,

    /// Embedding model identifier (defaults to models/embedding-001)
    #[arg(long, env = "GOOGLE_EMBEDDING_MODEL")]
    embedding_model: Option<String>,
}

fn main() -> Result<()> {
    let cli = IngestCli::parse();
    let settings = RawSettings {
        google_api_key: cli.google_api_key,
        database_url: cli.database_url,
        collection: cli.collection,
        pdf_path: cli.pdf_path,
        embedding_model: cli.embedding_model,
        llm_model: None,
    }
    .resolve_for_ingest()?;

    let report = ingest::run(&settings)?;
    println!(
        "Done: {} page{} processed, {} chunk{} stored.",
        report.pages,
        if report.pages == 1 { "" } else { "s" },
        report.chunks,
        if report.chunks == 1 { "" } else { "s" },
    );
    Ok(())
}
