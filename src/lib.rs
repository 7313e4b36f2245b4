#![warn(missing_docs)]
//! Core library entry points for the docrag PDF question-answering pipeline.

pub mod answer;
pub mod chat;
pub mod config;
pub mod embedder;
pub mod embeddings;
pub mod ingest;
pub mod pdf;
pub mod retrieval;
pub mod splitter;
pub mod store;

pub use answer::{build_prompt, ChatModel, REFUSAL_SENTENCE};
pub use chat::{is_exit_command, run_loop, EXIT_KEYWORDS};
pub use config::{RawSettings, Settings, SettingsError};
pub use embedder::GeminiEmbedder;
pub use embeddings::EmbeddedChunkRecord;
pub use ingest::IngestReport;
pub use pdf::{load_pdf, PageDocument, PdfError};
pub use retrieval::{join_context, relevance_score, Retriever, ScoredChunk, DEFAULT_TOP_K};
pub use splitter::{Splitter, SplitterConfig, TextChunk};
pub use store::{Collection, StoredChunk, VectorStore};
