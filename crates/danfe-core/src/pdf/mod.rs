//! PDF text extraction module.

mod extractor;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixture;

pub use extractor::{PdfContent, PdfExtractor};

use crate::error::PdfError;

/// Whether a PDF carries extractable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// Little or no text, typically a scanned document.
    Scanned,
}

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text sources.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract plain text per page, preserving line breaks.
    fn extract_page_texts(&self) -> Result<Vec<String>>;

    /// Extract the whole document as one string, pages joined by newlines.
    fn extract_text(&self) -> Result<String> {
        let pages = self.extract_page_texts()?;
        Ok(flatten_pages(&pages))
    }
}

/// Join page texts with newlines, skipping empty pages and normalizing CRLF.
pub fn flatten_pages(pages: &[String]) -> String {
    pages
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.replace("\r\n", "\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_pages() {
        let pages = vec![
            "page one\r\nline two".to_string(),
            String::new(),
            "page three".to_string(),
        ];
        assert_eq!(flatten_pages(&pages), "page one\nline two\npage three");
        assert_eq!(flatten_pages(&[]), "");
    }
}
