//! Error types for the danfe-core library.

use thiserror::Error;

/// Main error type for the danfe library.
#[derive(Error, Debug)]
pub enum DanfeError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Spreadsheet serialization error.
    #[error("report error: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to invoice extraction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExtractionError {
    /// The block parser found no line items.
    #[error("no line items found; document is not a recognized DANFE layout")]
    NoItems,

    /// The input text was empty.
    #[error("no text to parse")]
    NoText,
}

/// Result type for the danfe library.
pub type Result<T> = std::result::Result<T, DanfeError>;
