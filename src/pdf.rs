//! PDF loading and per-page text extraction.

use std::fmt;
use std::path::{Path, PathBuf};

/// One page of extracted PDF text.
#[derive(Debug, Clone)]
pub struct PageDocument {
    /// 1-based page number in the source document.
    pub page_number: usize,
    /// Extracted text for the page, trimmed of surrounding whitespace.
    pub text: String,
}

/// Errors surfaced while loading a PDF.
#[derive(Debug)]
pub enum PdfError {
    /// The source path does not exist on disk.
    NotFound(PathBuf),
    /// The file could not be read.
    Io(std::io::Error),
    /// The PDF bytes could not be parsed into text.
    Extract(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "PDF file not found at {}", path.display()),
            Self::Io(err) => write!(f, "failed to read PDF file: {err}"),
            Self::Extract(reason) => write!(f, "PDF text extraction failed: {reason}"),
        }
    }
}

impl std::error::Error for PdfError {}

/// Loads a PDF from disk and returns its non-empty pages.
///
/// The path is checked before anything else so a missing file aborts the run
/// without touching any external service.
pub fn load_pdf(path: &Path) -> Result<Vec<PageDocument>, PdfError> {
    if !path.exists() {
        return Err(PdfError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(PdfError::Io)?;
    let text =
        pdf_extract::extract_text_from_mem(&bytes).map_err(|err| PdfError::Extract(err.to_string()))?;
    Ok(split_pages(&text))
}

/// Splits extracted text into pages on form feed separators.
///
/// Extractors emit `\x0C` between pages; text without separators is treated
/// as a single page. Pages with no visible text are dropped while their page
/// numbers are preserved.
pub fn split_pages(text: &str) -> Vec<PageDocument> {
    text.split('\x0C')
        .enumerate()
        .filter_map(|(idx, page)| {
            let trimmed = page.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(PageDocument {
                page_number: idx + 1,
                text: trimmed.to_string(),
            })
        })
        .collect()
}
