use anyhow::Result;
use clap::Parser;
use docrag::{embedder, GeminiEmbedder, RawSettings, Retriever, DEFAULT_TOP_K};

#[derive(Parser, Debug)]
#[command(
    name = "docrag-search",
    about = "Run a scored similarity search against an ingested collection"
)]
struct SearchCli {
    /// Query text to search for
    #[arg(long)]
    query: String,

    /// Number of chunks to return
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

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
    let cli = SearchCli::parse();
    let settings = RawSettings {
        google_api_key: cli.google_api_key,
        database_url: cli.database_url,
        collection: cli.collection,
        pdf_path: None,
        embedding_model: cli.embedding_model,
        llm_model: None,
    }
    .resolve()?;

    let gemini = GeminiEmbedder::new(
        &settings.google_api_key,
        &settings.embedding_model,
        embedder::DEFAULT_TIMEOUT,
        embedder::DEFAULT_BATCH_SIZE,
    )?;
    let mut retriever = Retriever::new(gemini, &settings.database_url, &settings.collection);

    println!("Searching for: '{}'", cli.query);
    let results = retriever.search_with_scores(&cli.query, cli.top_k.max(1))?;
    if results.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} result(s):", results.len());
    for (idx, result) in results.iter().enumerate() {
        println!(
            "\n--- Result {} (distance: {:.4}, relevance: {:.4}) ---",
            idx + 1,
            result.distance,
            result.relevance_score
        );
        println!("Content: {}", preview(&result.content, 200));
        println!("Metadata: {}", result.metadata);
    }
    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut shortened: String = text.chars().take(max_chars).collect();
    if shortened.len() < text.len() {
        shortened.push_str("...");
    }
    shortened
}
