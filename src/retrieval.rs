//! Query-time retrieval: similarity search plus context assembly.

use anyhow::{Context, Result};

use crate::embedder::GeminiEmbedder;
use crate::store::{Collection, VectorStore};

/// Chunks fetched per query when the caller does not override k.
pub const DEFAULT_TOP_K: usize = 10;

/// One retrieved chunk with its diagnostic scores.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// Chunk body text.
    pub content: String,
    /// Raw cosine distance reported by the vector store.
    pub distance: f64,
    /// `1 - distance`, rounded to 4 decimal places.
    pub relevance_score: f64,
    /// Metadata stored with the chunk at ingestion time.
    pub metadata: serde_json::Value,
}

/// Retrieval front-end owning the embedding client and the store handle.
///
/// Both clients are constructed once and reused across queries. The store
/// handle is bound to a collection and connects lazily on first use, so a
/// chat session survives a database that is down at startup. Switching
/// collection rebuilds only the store handle, never the embedding client.
pub struct Retriever {
    embedder: GeminiEmbedder,
    database_url: String,
    collection: String,
    store: Option<VectorStore>,
}

impl Retriever {
    /// Builds a retriever bound to one collection.
    pub fn new(embedder: GeminiEmbedder, database_url: &str, collection: &str) -> Self {
        Self {
            embedder,
            database_url: database_url.to_string(),
            collection: collection.to_string(),
            store: None,
        }
    }

    /// Collection the next query will search.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Rebinds the retriever to another collection, dropping the store handle.
    pub fn ensure_collection(&mut self, name: &str) {
        if self.collection != name {
            self.collection = name.to_string();
            self.store = None;
        }
    }

    /// Fetches the top-k chunks for a query and joins them into one context
    /// string.
    ///
    /// Zero matches yield `Ok("")`; callers must treat an empty context as
    /// "no answer possible", not as failure. A store error is reported with
    /// a hint that ingestion may not have been run.
    pub fn context(&mut self, query: &str, k: usize) -> Result<String> {
        let rows = self.fetch(query, k)?;
        if rows.is_empty() {
            return Ok(String::new());
        }
        let texts: Vec<&str> = rows.iter().map(|row| row.text.as_str()).collect();
        Ok(join_context(&texts))
    }

    /// Scored variant of retrieval for diagnostic use.
    pub fn search_with_scores(&mut self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let rows = self.fetch(query, k)?;
        Ok(rows
            .into_iter()
            .map(|row| ScoredChunk {
                content: row.text,
                distance: row.distance,
                relevance_score: relevance_score(row.distance),
                metadata: row.metadata,
            })
            .collect())
    }

    fn fetch(&mut self, query: &str, k: usize) -> Result<Vec<crate::store::StoredChunk>> {
        let embedding = self
            .embedder
            .embed_query(query)
            .context("failed to embed query")?;
        let collection = self.collection.clone();
        let store = self.store_handle()?;
        store.search(&embedding, k).with_context(|| {
            format!(
                "vector store lookup in collection '{collection}' failed; \
                 has ingestion been run?"
            )
        })
    }

    fn store_handle(&mut self) -> Result<&mut VectorStore> {
        if self.store.is_none() {
            let collection = Collection::new(self.collection.as_str())?;
            let store = VectorStore::connect(&self.database_url, collection).with_context(|| {
                format!(
                    "vector store for collection '{}' is unreachable; \
                     has ingestion been run?",
                    self.collection
                )
            })?;
            return Ok(self.store.insert(store));
        }
        self.store.as_mut().context("vector store handle missing")
    }

    #[cfg(test)]
    fn has_store_handle(&self) -> bool {
        self.store.is_some()
    }
}

/// Joins chunk texts with a blank line and strips surrounding whitespace.
pub fn join_context<S: AsRef<str>>(texts: &[S]) -> String {
    texts
        .iter()
        .map(|text| text.as_ref())
        .collect::<Vec<_>>()
        .join("\n\n")
        .trim()
        .to_string()
}

/// Relevance score displayed next to a raw distance: `1 - distance`,
/// rounded to 4 decimal places.
pub fn relevance_score(distance: f64) -> f64 {
    ((1.0 - distance) * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::DEFAULT_TIMEOUT;

    fn retriever_for(collection: &str) -> Retriever {
        let embedder =
            GeminiEmbedder::new("key", "embedding-001", DEFAULT_TIMEOUT, 8).expect("embedder");
        Retriever::new(embedder, "postgres://localhost/rag", collection)
    }

    #[test]
    fn switching_collection_rebinds_and_drops_the_store_handle() {
        let mut retriever = retriever_for("docs");
        assert_eq!(retriever.collection(), "docs");
        retriever.ensure_collection("reports");
        assert_eq!(retriever.collection(), "reports");
        assert!(!retriever.has_store_handle());
    }

    #[test]
    fn same_collection_is_a_no_op() {
        let mut retriever = retriever_for("docs");
        retriever.ensure_collection("docs");
        assert_eq!(retriever.collection(), "docs");
        assert!(!retriever.has_store_handle());
    }

    #[test]
    fn context_joins_chunks_with_a_blank_line() {
        let joined = join_context(&["first chunk", "second chunk", "third chunk"]);
        assert_eq!(joined, "first chunk\n\nsecond chunk\n\nthird chunk");
    }

    #[test]
    fn context_has_no_surrounding_whitespace() {
        let joined = join_context(&["  leading", "trailing \n"]);
        assert!(!joined.starts_with(char::is_whitespace));
        assert!(!joined.ends_with(char::is_whitespace));
        assert_eq!(joined, "leading\n\ntrailing");
    }

    #[test]
    fn empty_input_joins_to_empty_context() {
        let texts: [&str; 0] = [];
        assert_eq!(join_context(&texts), "");
    }

    #[test]
    fn relevance_is_one_minus_distance_rounded() {
        assert_eq!(relevance_score(0.25), 0.75);
        assert_eq!(relevance_score(0.123456), 0.8765);
        assert_eq!(relevance_score(0.0), 1.0);
        assert_eq!(relevance_score(1.0), 0.0);
    }

    #[test]
    fn relevance_rounds_half_away_from_zero() {
        // 1 - 0.11115 = 0.88885 -> 0.8889 under f64 rounding
        assert_eq!(relevance_score(0.11115), 0.8889);
    }
}
