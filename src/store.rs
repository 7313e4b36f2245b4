//! pgvector-backed chunk storage and similarity search.

use anyhow::{Context, Result};
use pgvector::Vector;
use postgres::types::Json;
use postgres::{Client, NoTls};

use crate::embeddings::EmbeddedChunkRecord;

/// Named partition of the vector store, mapped to one Postgres table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    name: String,
}

impl Collection {
    /// Builds a new collection identifier.
    pub fn new<S: Into<String>>(name: S) -> Result<Self> {
        let name = name.into().trim().to_string();
        anyhow::ensure!(!name.is_empty(), "collection name is required");
        Ok(Self { name })
    }

    /// Raw collection name as configured.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quoted table reference for SQL statements.
    pub fn qualified(&self) -> String {
        quote_ident(&self.name)
    }
}

/// Quotes Postgres identifiers, escaping embedded quotes.
pub fn quote_ident(input: &str) -> String {
    let escaped = input.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}

/// One chunk returned by a similarity search, ordered by ascending distance.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    /// Chunk body text as stored at ingestion time.
    pub text: String,
    /// Positional metadata recorded with the chunk.
    pub metadata: serde_json::Value,
    /// Cosine distance between the query and the stored embedding.
    pub distance: f64,
}

/// Synchronous handle over one pgvector collection.
///
/// Re-inserting into an existing collection appends; there is no content
/// dedup, so the operator owns collection lifecycle across runs.
pub struct VectorStore {
    client: Client,
    collection: Collection,
}

impl VectorStore {
    /// Connects to Postgres and binds the handle to a collection.
    pub fn connect(database_url: &str, collection: Collection) -> Result<Self> {
        let client = Client::connect(database_url, NoTls)
            .with_context(|| format!("failed to connect to Postgres at {database_url}"))?;
        Ok(Self { client, collection })
    }

    /// Collection this handle writes to and reads from.
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Ensures the vector extension and collection table exist.
    pub fn prepare(&mut self, dims: usize) -> Result<()> {
        anyhow::ensure!(dims > 0, "embedding dimension must be positive");
        self.client
            .execute("CREATE EXTENSION IF NOT EXISTS vector", &[])
            .context("failed to ensure pgvector extension")?;
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                text TEXT NOT NULL,
                metadata JSONB NOT NULL,
                embedding VECTOR({dims}) NOT NULL
            )",
            self.collection.qualified()
        );
        self.client
            .execute(&ddl, &[])
            .context("failed to create collection table")?;
        Ok(())
    }

    /// Appends embedded chunks to the collection in one transaction.
    pub fn insert_chunks(&mut self, records: &[EmbeddedChunkRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        let sql = insert_sql(&self.collection);
        let mut transaction = self.client.transaction()?;
        let statement = transaction.prepare(&sql)?;
        for record in records {
            let vector = Vector::from(record.embedding.clone());
            let metadata = Json(record.metadata());
            transaction
                .execute(&statement, &[&record.text, &metadata, &vector])
                .with_context(|| {
                    format!(
                        "failed to insert chunk {} from page {}",
                        record.chunk_index, record.page_number
                    )
                })?;
        }
        transaction.commit()?;
        Ok(records.len())
    }

    /// Returns up to `k` chunks nearest to the query embedding.
    pub fn search(&mut self, embedding: &[f32], k: usize) -> Result<Vec<StoredChunk>> {
        let sql = select_sql(&self.collection);
        let vector = Vector::from(embedding.to_vec());
        let limit = k.max(1) as i64;
        let rows = self
            .client
            .query(&sql, &[&vector, &limit])
            .with_context(|| {
                format!(
                    "similarity search in collection '{}' failed",
                    self.collection.name()
                )
            })?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let text: String = row.get("text");
            let Json(metadata): Json<serde_json::Value> = row.get("metadata");
            let distance: f64 = row.get("distance");
            out.push(StoredChunk {
                text,
                metadata,
                distance,
            });
        }
        Ok(out)
    }
}

fn insert_sql(collection: &Collection) -> String {
    format!(
        "INSERT INTO {} (text, metadata, embedding) VALUES ($1, $2, $3)",
        collection.qualified()
    )
}

fn select_sql(collection: &Collection) -> String {
    format!(
        "SELECT text, metadata, embedding <=> $1 AS distance \
         FROM {} \
         ORDER BY embedding <=> $1 ASC \
         LIMIT $2",
        collection.qualified()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_requires_a_name() {
        assert!(Collection::new("").is_err());
        assert!(Collection::new("   ").is_err());
        assert_eq!(Collection::new(" docs ").unwrap().name(), "docs");
    }

    #[test]
    fn identifiers_are_quoted_and_escaped() {
        assert_eq!(quote_ident("docs"), "\"docs\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        let collection = Collection::new("my collection").unwrap();
        assert_eq!(collection.qualified(), "\"my collection\"");
    }

    #[test]
    fn select_orders_by_distance_with_limit() {
        let collection = Collection::new("docs").unwrap();
        let sql = select_sql(&collection);
        assert!(sql.contains("embedding <=> $1 AS distance"));
        assert!(sql.contains("ORDER BY embedding <=> $1 ASC"));
        assert!(sql.contains("LIMIT $2"));
        assert!(sql.contains("\"docs\""));
    }

    #[test]
    fn insert_targets_the_collection_table() {
        let collection = Collection::new("docs").unwrap();
        let sql = insert_sql(&collection);
        assert!(sql.starts_with("INSERT INTO \"docs\""));
        assert!(sql.contains("(text, metadata, embedding)"));
    }
}
