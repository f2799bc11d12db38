//! Line-item block parser.
//!
//! PDF text extraction flattens the DANFE product table: the description and
//! lot lines of an item come first and its numeric data row (NCM, CST, CFOP,
//! unit, quantity, unit value, discount, net value) follows a few lines
//! later. The parser rebuilds items by anchoring a block on each item-code
//! line (`211/1 DESCRIPTION...`) and scanning a bounded window of following
//! lines for the data row.
//!
//! ```text
//! 211/1 TRESBOMM - ALOJAMENTO C/ AMOXI E TIAMU      <- opens the block
//! VACCINAR                                          <- description (noise)
//! Lote: 5003 Data Fab.: 17/02/2026 Vcto: 19/03/2026 <- metadata
//! 23099010 050 5124 KG 18.032,20 0,12 0,00 2.163,86 <- closes the block
//! ```

use regex::Captures;
use tracing::{debug, trace};

use crate::models::invoice::{LineItem, UnitOfMeasure};

use super::numbers::parse_localized_decimal;
use super::patterns::{
    first_capture, DATA_ROW, DATA_ROW_ANY_UNIT, ITEM_START, LOT, MANUFACTURE_DATE,
    METADATA_LINE, NCM_PREFIX, VALIDITY_DATE,
};

/// Default number of lines, counting the item-code line, searched for a data row.
pub const DEFAULT_LOOKAHEAD_WINDOW: usize = 15;

/// Decides whether a description fragment is boilerplate.
pub trait NoiseFilter {
    /// Returns true when `line` must not be part of a product description.
    fn is_noise(&self, line: &str) -> bool;
}

impl<F> NoiseFilter for F
where
    F: Fn(&str) -> bool,
{
    fn is_noise(&self, line: &str) -> bool {
        self(line)
    }
}

/// Noise filter driven by a list of line prefixes and exact lines.
#[derive(Debug, Clone)]
pub struct DenylistNoiseFilter {
    prefixes: Vec<String>,
    exact_lines: Vec<String>,
}

impl DenylistNoiseFilter {
    /// Filter with the tokens seen on the supported layout.
    pub fn new() -> Self {
        Self {
            prefixes: ["Lote:", "FAB:", "VAL:", "QTD:", "LOTE:", "ANIMAL FEED"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exact_lines: ["VACCINAR", "CARGILL"].iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Filter with no tokens at all (classification codes are still dropped).
    pub fn empty() -> Self {
        Self {
            prefixes: Vec::new(),
            exact_lines: Vec::new(),
        }
    }

    /// Treat lines starting with `prefix` as noise.
    pub fn with_token(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    /// Treat lines equal to `line` as noise.
    pub fn with_exact_line(mut self, line: impl Into<String>) -> Self {
        self.exact_lines.push(line.into());
        self
    }
}

impl Default for DenylistNoiseFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl NoiseFilter for DenylistNoiseFilter {
    fn is_noise(&self, line: &str) -> bool {
        self.prefixes.iter().any(|p| line.starts_with(p.as_str()))
            || self.exact_lines.iter().any(|l| line == l)
            || NCM_PREFIX.is_match(line)
    }
}

/// An item-code line whose block never reached a data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedBlock {
    /// Zero-based line index of the item-code line.
    pub line: usize,
    /// Item code from that line.
    pub code: String,
    /// Unit token of a data-shaped row in the window whose unit is not recognized.
    pub unknown_unit: Option<String>,
}

/// Everything a scan produced: items plus the blocks that did not close.
#[derive(Debug, Clone, Default)]
pub struct ItemScan {
    pub items: Vec<LineItem>,
    pub dropped: Vec<DroppedBlock>,
}

/// Bounded-lookahead parser turning flattened DANFE text into line items.
pub struct BlockParser {
    window: usize,
    noise: Box<dyn NoiseFilter + Send + Sync>,
}

impl BlockParser {
    /// Create a parser with the default window and denylist.
    pub fn new() -> Self {
        Self {
            window: DEFAULT_LOOKAHEAD_WINDOW,
            noise: Box::new(DenylistNoiseFilter::new()),
        }
    }

    /// Set the lookahead window (lines counted from the item-code line).
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Replace the description noise filter.
    pub fn with_noise_filter(mut self, filter: impl NoiseFilter + Send + Sync + 'static) -> Self {
        self.noise = Box::new(filter);
        self
    }

    /// Lookahead window in use.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Parse items only.
    pub fn parse(&self, text: &str) -> Vec<LineItem> {
        self.scan(text).items
    }

    /// Parse items and report blocks that were dropped.
    pub fn scan(&self, text: &str) -> ItemScan {
        let lines: Vec<&str> = text.split('\n').map(str::trim).collect();
        let mut scan = ItemScan::default();
        let mut i = 0;

        while i < lines.len() {
            let Some(start) = ITEM_START.captures(lines[i]) else {
                i += 1;
                continue;
            };

            let code = start[1].to_string();
            let mut description_parts = vec![start[2].trim()];
            let mut block_lines = vec![lines[i]];
            let mut data_row = None;
            let mut unknown_unit = None;

            let mut j = i + 1;
            while j < lines.len() && j < i + self.window {
                let next = lines[j];
                block_lines.push(next);

                if let Some(caps) = DATA_ROW.captures(next) {
                    if let Some(unit) = UnitOfMeasure::from_token(&caps[4]) {
                        data_row = Some((caps, unit));
                        break;
                    }
                }

                // Only rows whose unit token is outside the closed set count here
                if unknown_unit.is_none() {
                    unknown_unit = DATA_ROW_ANY_UNIT
                        .captures(next)
                        .map(|caps| caps[4].to_string())
                        .filter(|token| UnitOfMeasure::from_token(token).is_none());
                }

                if !next.is_empty() && !METADATA_LINE.is_match(next) {
                    trace!("item {}: description line {:?}", code, next);
                    description_parts.push(next);
                } else {
                    trace!("item {}: skipped line {:?}", code, next);
                }
                j += 1;
            }

            match data_row {
                Some((caps, unit)) => {
                    let block_text = block_lines.join("\n");
                    let item = self.build_item(code, &description_parts, &block_text, &caps, unit);
                    debug!(
                        "item {} ({} lines): {} {} net {}",
                        item.code,
                        block_lines.len(),
                        item.quantity,
                        item.unit,
                        item.net_value
                    );
                    scan.items.push(item);
                    // Resume right after the data row, not after the window
                    i = j + 1;
                }
                None => {
                    debug!(
                        "line {}: item code {} has no data row within {} lines, dropped",
                        i + 1,
                        code,
                        self.window
                    );
                    scan.dropped.push(DroppedBlock {
                        line: i,
                        code,
                        unknown_unit,
                    });
                    i += 1;
                }
            }
        }

        scan
    }

    fn build_item(
        &self,
        code: String,
        description_parts: &[&str],
        block_text: &str,
        data: &Captures<'_>,
        unit: UnitOfMeasure,
    ) -> LineItem {
        let description = description_parts
            .iter()
            .filter(|p| !p.is_empty() && !self.noise.is_noise(p))
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        LineItem {
            code,
            description,
            lot: first_capture(&LOT, block_text),
            manufacture_date: first_capture(&MANUFACTURE_DATE, block_text),
            validity_date: first_capture(&VALIDITY_DATE, block_text),
            ncm: data[1].to_string(),
            cst: data[2].to_string(),
            cfop: data[3].to_string(),
            unit,
            quantity: parse_localized_decimal(&data[5]),
            unit_value: parse_localized_decimal(&data[6]),
            discount_value: parse_localized_decimal(&data[7]),
            net_value: parse_localized_decimal(&data[8]),
        }
    }
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract line items with the default window and noise filter.
pub fn extract_items(text: &str) -> Vec<LineItem> {
    BlockParser::new().parse(text)
}
