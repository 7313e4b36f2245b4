//! Fixed-window overlapping text splitter for page documents.

use crate::pdf::PageDocument;

/// Character window applied to each page when no override is given.
pub const DEFAULT_WINDOW: usize = 1000;
/// Characters shared between adjacent chunks when no override is given.
pub const DEFAULT_OVERLAP: usize = 150;

/// Splitter tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SplitterConfig {
    /// Maximum characters per chunk.
    pub window: usize,
    /// Characters of tail overlap carried into the next chunk.
    pub overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

/// A bounded span of page text, the unit of embedding and retrieval.
#[derive(Debug, Clone)]
pub struct TextChunk {
    /// Chunk body text.
    pub text: String,
    /// 1-based page the chunk was cut from.
    pub page_number: usize,
    /// Monotonic chunk identifier across the whole document.
    pub chunk_index: usize,
    /// Character offset of the chunk start within its page.
    pub char_start: usize,
    /// Exclusive character end offset within its page.
    pub char_end: usize,
}

/// Fixed-size overlapping window splitter.
///
/// Windows are measured in characters, never split inside a code point, and
/// cover the page text with no gaps: each chunk after the first starts
/// `window - overlap` characters past its predecessor.
#[derive(Debug, Clone, Copy)]
pub struct Splitter {
    config: SplitterConfig,
}

impl Splitter {
    /// Builds a splitter, clamping the overlap below the window size.
    pub fn new(config: SplitterConfig) -> Self {
        let window = config.window.max(1);
        let overlap = config.overlap.min(window.saturating_sub(1));
        Self {
            config: SplitterConfig { window, overlap },
        }
    }

    /// Returns the effective configuration.
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Splits every page of a document, numbering chunks document-wide.
    pub fn split_document(&self, pages: &[PageDocument]) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        for page in pages {
            self.split_page(page, &mut chunks);
        }
        chunks
    }

    /// Splits a single page, appending to an existing chunk list.
    pub fn split_page(&self, page: &PageDocument, chunks: &mut Vec<TextChunk>) {
        let text = page.text.as_str();
        if text.is_empty() {
            return;
        }

        // Byte offsets of every char boundary, plus the end of the text.
        let mut bounds: Vec<usize> = text.char_indices().map(|(idx, _)| idx).collect();
        bounds.push(text.len());
        let total_chars = bounds.len() - 1;

        let window = self.config.window;
        let step = window - self.config.overlap;
        let mut start = 0usize;
        loop {
            let end = (start + window).min(total_chars);
            chunks.push(TextChunk {
                text: text[bounds[start]..bounds[end]].to_string(),
                page_number: page.page_number,
                chunk_index: chunks.len(),
                char_start: start,
                char_end: end,
            });
            if end == total_chars {
                break;
            }
            start += step;
        }
    }
}
