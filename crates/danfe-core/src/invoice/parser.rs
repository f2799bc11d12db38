//! DANFE parser combining header extraction and item block parsing.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::Invoice;
use crate::error::ExtractionError;

use super::rules::{extract_header, BlockParser, DenylistNoiseFilter, NoiseFilter};
use super::Result;

/// Result of invoice extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub invoice: Invoice,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for invoice parsing.
pub trait InvoiceParser {
    /// Parse an invoice from the flattened document text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

/// Parser for the supported DANFE layout.
pub struct DanfeParser {
    items: BlockParser,
    /// Whether to warn about header fields that were not found.
    warn_on_missing_header: bool,
}

impl DanfeParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            items: BlockParser::new(),
            warn_on_missing_header: true,
        }
    }

    /// Build a parser from the extraction section of the configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let filter = config
            .extra_noise_tokens
            .iter()
            .fold(DenylistNoiseFilter::new(), |f, token| f.with_token(token.clone()));

        Self::new()
            .with_window(config.lookahead_window)
            .with_noise_filter(filter)
            .with_missing_header_warnings(config.warn_on_missing_header)
    }

    /// Set the item lookahead window.
    pub fn with_window(mut self, window: usize) -> Self {
        self.items = self.items.with_window(window);
        self
    }

    /// Set the description noise filter.
    pub fn with_noise_filter(mut self, filter: impl NoiseFilter + Send + Sync + 'static) -> Self {
        self.items = self.items.with_noise_filter(filter);
        self
    }

    /// Set missing header field warnings.
    pub fn with_missing_header_warnings(mut self, warn: bool) -> Self {
        self.warn_on_missing_header = warn;
        self
    }
}

impl Default for DanfeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceParser for DanfeParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        if text.trim().is_empty() {
            return Err(ExtractionError::NoText);
        }

        info!("Parsing DANFE from {} characters of text", text.len());

        let header = extract_header(text);
        if self.warn_on_missing_header {
            for field in header.missing_fields() {
                warnings.push(format!("Header field not found: {}", field));
            }
        }

        let scan = self.items.scan(text);
        for dropped in &scan.dropped {
            if let Some(unit) = &dropped.unknown_unit {
                warn!(
                    "item {} at line {} dropped: unit {} is not recognized",
                    dropped.code,
                    dropped.line + 1,
                    unit
                );
                warnings.push(format!(
                    "Item {} (line {}) dropped: unit {} is not recognized",
                    dropped.code,
                    dropped.line + 1,
                    unit
                ));
            }
        }
        debug!(
            "{} items parsed, {} item-code lines without a data row",
            scan.items.len(),
            scan.dropped.len()
        );

        if scan.items.is_empty() {
            return Err(ExtractionError::NoItems);
        }

        let invoice = Invoice {
            header,
            items: scan.items,
        };

        info!(
            "Extracted NF-e {:?}: {} items, net total {:.2}",
            invoice.header.invoice_number,
            invoice.items.len(),
            invoice.total_net_value()
        );

        Ok(ExtractionResult {
            invoice,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "\
DANFE VACCINAR INDUSTRIA E COMERCIO LTDA
Nº 000.045.210
SÉRIE 1
DADOS DOS PRODUTOS / SERVIÇOS
211/1 TRESBOMM - ALOJAMENTO C/ AMOXI E TIAMU
VACCINAR
Lote: 5003 Data Fab.: 17/02/2026 Vcto: 19/03/2026 Fab: 3BS
23099010 050 5124 KG 18.032,20 0,12 0,00 2.163,86
";

    #[test]
    fn test_parse_document() {
        let result = DanfeParser::new().parse(DOCUMENT).unwrap();

        assert_eq!(result.invoice.header.invoice_number, "000.045.210");
        assert_eq!(result.invoice.items.len(), 1);
        assert_eq!(result.invoice.items[0].net_value, 2163.86);
        assert!(result.warnings.iter().any(|w| w.contains("Município")));
    }

    #[test]
    fn test_no_items_is_an_error() {
        let err = DanfeParser::new()
            .parse("DANFE EMPRESA\nNº 123\nSÉRIE 1\n")
            .unwrap_err();
        assert_eq!(err, ExtractionError::NoItems);
    }

    #[test]
    fn test_empty_text_is_an_error() {
        assert_eq!(DanfeParser::new().parse("  \n ").unwrap_err(), ExtractionError::NoText);
    }

    #[test]
    fn test_unknown_unit_warning() {
        let text = format!("{}9/1 OLEO\n23099010 050 5124 TON 1,00 1,00 0,00 1,00\n", DOCUMENT);
        let result = DanfeParser::new()
            .with_missing_header_warnings(false)
            .parse(&text)
            .unwrap();

        assert_eq!(result.invoice.items.len(), 1);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("TON"));
    }

    #[test]
    fn test_malformed_known_unit_row_is_not_warned() {
        let text = format!("{}5/1 RACAO\n23099010 050 5124 KG 1,00 2,00 0,00\n", DOCUMENT);
        let result = DanfeParser::new()
            .with_missing_header_warnings(false)
            .parse(&text)
            .unwrap();

        assert_eq!(result.invoice.items.len(), 1);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            lookahead_window: 15,
            extra_noise_tokens: vec!["TRESBOMM".to_string()],
            warn_on_missing_header: false,
        };
        let result = DanfeParser::from_config(&config).parse(DOCUMENT).unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(result.invoice.items[0].description, "");
    }
}
