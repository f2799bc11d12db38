//! Core library for DANFE (NF-e) invoice conversion.
//!
//! This crate provides:
//! - PDF text extraction
//! - Header field extraction and line-item block parsing for the DANFE layout
//! - Localized number normalization
//! - A two-sheet styled spreadsheet report, written as `.xlsx`

pub mod convert;
pub mod error;
pub mod invoice;
pub mod models;
pub mod pdf;
pub mod report;

pub use convert::{convert_pdf, convert_text, extract_document_text, Conversion};
pub use error::{DanfeError, ExtractionError, PdfError, Result};
pub use invoice::rules::{extract_header, extract_items, format_localized_amount, parse_localized_decimal};
pub use invoice::{DanfeParser, ExtractionResult, InvoiceParser};
pub use models::config::DanfeConfig;
pub use models::invoice::{HeaderField, Invoice, InvoiceHeader, LineItem, UnitOfMeasure};
pub use pdf::{PdfContent, PdfExtractor, PdfProcessor, PdfType};
pub use report::{build_report, Report, ReportBuilder, ReportStyle};
