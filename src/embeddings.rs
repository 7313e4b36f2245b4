//! Shared embedding data structures used across pipeline stages.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Output row produced by the embedding stage and consumed by the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedChunkRecord {
    /// Source document path.
    pub source: String,
    /// 1-based page the chunk was cut from.
    pub page_number: usize,
    /// Document-wide chunk identifier assigned during splitting.
    pub chunk_index: usize,
    /// Chunk body text submitted to the embedding model.
    pub text: String,
    /// Model embedding vector.
    pub embedding: Vec<f32>,
}

impl EmbeddedChunkRecord {
    /// Positional metadata stored alongside the chunk text.
    pub fn metadata(&self) -> serde_json::Value {
        json!({
            "source": self.source,
            "page_number": self.page_number,
            "chunk_index": self.chunk_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_carries_position_fields() {
        let record = EmbeddedChunkRecord {
            source: "report.pdf".into(),
            page_number: 3,
            chunk_index: 7,
            text: "body".into(),
            embedding: vec![0.1, 0.2],
        };
        let metadata = record.metadata();
        assert_eq!(metadata["source"], "report.pdf");
        assert_eq!(metadata["page_number"], 3);
        assert_eq!(metadata["chunk_index"], 7);
    }
}
