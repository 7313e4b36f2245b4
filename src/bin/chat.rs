use std::io;

use anyhow::Result;
use clap::Parser;
use docrag::{
    answer, chat, embedder, ChatModel, GeminiEmbedder, RawSettings, Retriever, DEFAULT_TOP_K,
    REFUSAL_SENTENCE,
};

#[derive(Parser, Debug)]
#[command(
    name = "docrag-chat",
    about = "Answer questions from an ingested PDF collection"
)]
struct ChatCli {
    /// Postgres connection string (postgres://...)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Collection name holding chunks and embeddings
    #[arg(long, env = "PG_VECTOR_COLLECTION_NAME")]
    collection: Option<String>,

    /// Google API key for embedding and chat requests
    #[arg(long, env = "GOOGLE_API_KEY")]
    google_api_key: Option<String>,

    /// Embedding model identifier (defaults to models/embedding-001)
    #[arg(long, env = "GOOGLE_EMBEDDING_MODEL")]
    embedding_model: Option<String>,

    /// Chat model identifier (defaults to gemini-2.5-flash-lite)
    #[arg(long, env = "GOOGLE_LLM_MODEL")]
    llm_model: Option<String>,

    /// Number of chunks retrieved per question
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
}

fn main() -> Result<()> {
    let cli = ChatCli::parse();
    let top_k = cli.top_k.max(1);
    let settings = RawSettings {
        google_api_key: cli.google_api_key,
        database_url: cli.database_url,
        collection: cli.collection,
        pdf_path: None,
        embedding_model: cli.embedding_model,
        llm_model: cli.llm_model,
    }
    .resolve()?;

    let gemini = GeminiEmbedder::new(
        &settings.google_api_key,
        &settings.embedding_model,
        embedder::DEFAULT_TIMEOUT,
        embedder::DEFAULT_BATCH_SIZE,
    )?;
    let mut retriever = Retriever::new(gemini, &settings.database_url, &settings.collection);
    let model = ChatModel::new(
        &settings.google_api_key,
        &settings.llm_model,
        answer::DEFAULT_TIMEOUT,
    )?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    chat::run_loop(stdin.lock(), &mut stdout, |question| {
        let context = retriever.context(question, top_k)?;
        if context.is_empty() {
            return Ok(REFUSAL_SENTENCE.to_string());
        }
        model.answer(question, &context)
    })?;
    Ok(())
}
