//! End-to-end PDF ingestion: load, split, embed, store.

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::embedder::{GeminiEmbedder, DEFAULT_BATCH_SIZE, DEFAULT_TIMEOUT};
use crate::embeddings::EmbeddedChunkRecord;
use crate::pdf;
use crate::splitter::{Splitter, SplitterConfig};
use crate::store::{Collection, VectorStore};

/// Counts reported after a completed ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    /// Non-empty pages extracted from the PDF.
    pub pages: usize,
    /// Chunks embedded and inserted into the collection.
    pub chunks: usize,
}

/// Runs one full ingestion pass.
///
/// Any failure aborts the run; nothing is written to the store until every
/// chunk has an embedding. Progress lines are observational only.
pub fn run(settings: &Settings) -> Result<IngestReport> {
    let pdf_path = settings
        .pdf_path
        .as_deref()
        .context("PDF_PATH is required for ingestion")?;

    println!("Loading PDF from {}...", pdf_path.display());
    let pages = pdf::load_pdf(pdf_path)?;
    println!("Document loaded with {} pages", pages.len());

    let splitter = Splitter::new(SplitterConfig::default());
    let chunks = splitter.split_document(&pages);
    anyhow::ensure!(
        !chunks.is_empty(),
        "splitting produced zero chunks; the PDF has no extractable text"
    );
    println!("Document split into {} chunks", chunks.len());

    println!("Initializing Gemini embeddings...");
    let embedder = GeminiEmbedder::new(
        &settings.google_api_key,
        &settings.embedding_model,
        DEFAULT_TIMEOUT,
        DEFAULT_BATCH_SIZE,
    )?;
    let source = pdf_path.display().to_string();
    let mut records: Vec<EmbeddedChunkRecord> = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(embedder.batch_size()) {
        let inputs: Vec<&str> = batch.iter().map(|chunk| chunk.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&inputs)?;
        for (chunk, embedding) in batch.iter().zip(embeddings) {
            records.push(EmbeddedChunkRecord {
                source: source.clone(),
                page_number: chunk.page_number,
                chunk_index: chunk.chunk_index,
                text: chunk.text.clone(),
                embedding,
            });
        }
        println!("Embedded {}/{} chunks...", records.len(), chunks.len());
    }
    let dims = records[0].embedding.len();
    anyhow::ensure!(dims > 0, "embedding model returned empty vectors");

    println!("Connecting to pgvector store...");
    let collection = Collection::new(settings.collection.as_str())?;
    let mut store = VectorStore::connect(&settings.database_url, collection)?;
    store.prepare(dims)?;
    let inserted = store.insert_chunks(&records)?;
    println!(
        "Ingestion complete: {} chunks inserted into collection '{}'.",
        inserted, settings.collection
    );

    Ok(IngestReport {
        pages: pages.len(),
        chunks: inserted,
    })
}
