//! lopdf-backed document loading with pdf-extract text layout.

use lopdf::Document;
use tracing::debug;

use super::{flatten_pages, PdfProcessor, PdfType, Result};
use crate::error::PdfError;

/// Text extractor over a document held in memory.
#[derive(Default)]
pub struct PdfExtractor {
    /// Bytes handed to pdf-extract; the decrypted copy for encrypted input.
    source: Option<Vec<u8>>,
    pages: u32,
    /// 0 reads every page.
    max_pages: usize,
}

/// Text read from a document, with its classification.
#[derive(Debug, Clone)]
pub struct PdfContent {
    pub pdf_type: PdfType,
    /// Pages joined by `\n`.
    pub text: String,
    pub pages: Vec<String>,
}

impl PdfExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read at most `max_pages` pages (0 = all).
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Extract every page and classify the document.
    ///
    /// Fewer than `min_text_length` non-whitespace characters means
    /// [`PdfType::Scanned`].
    pub fn extract_all(&self, min_text_length: usize) -> Result<PdfContent> {
        let pages = self.extract_page_texts()?;
        let text = flatten_pages(&pages);

        let visible = text.chars().filter(|c| !c.is_whitespace()).count();
        let pdf_type = if visible < min_text_length {
            PdfType::Scanned
        } else {
            PdfType::Text
        };
        debug!("{} pages, {} visible chars: {:?}", pages.len(), visible, pdf_type);

        Ok(PdfContent {
            pdf_type,
            text,
            pages,
        })
    }
}

/// Decrypt a document protected only by an empty user password and return
/// its re-serialized bytes.
fn decrypt_with_empty_password(doc: &mut Document) -> Result<Vec<u8>> {
    doc.decrypt("").map_err(|_| PdfError::Encrypted)?;

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfError::Parse(format!("re-serializing decrypted PDF: {}", e)))?;
    debug!("decrypted PDF with the empty password");
    Ok(bytes)
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let source = if doc.is_encrypted() {
            decrypt_with_empty_password(&mut doc)?
        } else {
            data.to_vec()
        };

        let pages = doc.get_pages().len() as u32;
        if pages == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("loaded PDF: {} pages, {} bytes", pages, source.len());
        self.source = Some(source);
        self.pages = pages;
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.pages
    }

    fn extract_page_texts(&self) -> Result<Vec<String>> {
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| PdfError::Parse("no document loaded".to_string()))?;

        let mut pages = pdf_extract::extract_text_from_mem_by_pages(source)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        if self.max_pages > 0 && pages.len() > self.max_pages {
            debug!("keeping {} of {} pages", self.max_pages, pages.len());
            pages.truncate(self.max_pages);
        }

        Ok(pages)
    }
}
