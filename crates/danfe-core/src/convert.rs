//! End-to-end conversion of a DANFE PDF into a report.

use tracing::{info, warn};

use crate::error::{ExtractionError, Result};
use crate::invoice::{DanfeParser, ExtractionResult, InvoiceParser};
use crate::models::config::DanfeConfig;
use crate::pdf::{PdfExtractor, PdfProcessor, PdfType};
use crate::report::{Report, ReportBuilder};

/// A converted document: parsed invoice plus its finished report.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub extraction: ExtractionResult,
    pub report: Report,
    pub total_quantity: f64,
    pub total_net: f64,
}

impl Conversion {
    pub fn item_count(&self) -> usize {
        self.extraction.invoice.items.len()
    }
}

/// Extract the flattened text of a PDF held in memory.
pub fn extract_document_text(data: &[u8], config: &DanfeConfig) -> Result<String> {
    let mut extractor = PdfExtractor::new().with_max_pages(config.pdf.max_pages);
    extractor.load(data)?;

    let content = extractor.extract_all(config.pdf.min_text_length)?;
    if content.pdf_type == PdfType::Scanned {
        warn!(
            "PDF carries almost no text ({} pages); it is probably scanned",
            content.pages.len()
        );
        return Err(ExtractionError::NoText.into());
    }

    Ok(content.text)
}

/// Parse already-extracted text and build the report.
pub fn convert_text(text: &str, config: &DanfeConfig) -> Result<Conversion> {
    let parser = DanfeParser::from_config(&config.extraction);
    let extraction = parser.parse(text)?;

    let (report, total_quantity, total_net) =
        ReportBuilder::default().build(&extraction.invoice.header, &extraction.invoice.items);

    info!(
        "Converted NF-e {}: {} items",
        extraction.invoice.header.invoice_number,
        extraction.invoice.items.len()
    );

    Ok(Conversion {
        extraction,
        report,
        total_quantity,
        total_net,
    })
}

/// Read, parse and lay out a DANFE PDF held in memory.
pub fn convert_pdf(data: &[u8], config: &DanfeConfig) -> Result<Conversion> {
    let text = extract_document_text(data, config)?;
    convert_text(&text, config)
}
