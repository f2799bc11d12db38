//! Invoice field extraction module.

mod parser;
pub mod rules;

pub use parser::{DanfeParser, ExtractionResult, InvoiceParser};

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
