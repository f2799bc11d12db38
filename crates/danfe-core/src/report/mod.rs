//! Two-sheet spreadsheet report for a parsed DANFE.
//!
//! [`ReportBuilder`] turns an [`InvoiceHeader`](crate::InvoiceHeader) and its
//! line items into a [`Report`]: a finished, read-only grid of typed, styled
//! cells. Writing the grid to an `.xlsx` file lives in [`xlsx`].

mod builder;
mod style;
pub mod xlsx;

pub use builder::{build_report, ReportBuilder, ITEM_COLUMNS};
pub use style::{HAlign, ReportStyle, Rgb};

/// A finished report: named sheets in workbook order.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    sheets: Vec<Sheet>,
}

impl Report {
    pub(crate) fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// One worksheet of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    cells: Vec<Cell>,
    merges: Vec<MergeRange>,
    column_widths: Vec<(u16, f64)>,
    row_heights: Vec<(u32, f64)>,
    frozen_rows: u32,
}

impl Sheet {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: Vec::new(),
            merges: Vec::new(),
            column_widths: Vec::new(),
            row_heights: Vec::new(),
            frozen_rows: 0,
        }
    }

    pub(crate) fn put(&mut self, row: u32, col: u16, value: CellValue, style: CellStyle) {
        self.cells.push(Cell {
            row,
            col,
            value,
            style,
        });
    }

    pub(crate) fn merge(&mut self, range: MergeRange) {
        self.merges.push(range);
    }

    pub(crate) fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.push((col, width));
    }

    pub(crate) fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.push((row, height));
    }

    pub(crate) fn freeze_rows(&mut self, rows: u32) {
        self.frozen_rows = rows;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All cells in the order they were emitted (row-major).
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at a zero-based position.
    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    /// The merge range whose top-left cell is at `(row, col)`.
    pub fn merge_at(&self, row: u32, col: u16) -> Option<&MergeRange> {
        self.merges
            .iter()
            .find(|m| m.first_row == row && m.first_col == col)
    }

    /// Whether `(row, col)` is covered by a merge without being its anchor.
    pub fn is_merged_away(&self, row: u32, col: u16) -> bool {
        self.merges
            .iter()
            .any(|m| m.contains(row, col) && !(m.first_row == row && m.first_col == col))
    }

    pub fn column_widths(&self) -> &[(u16, f64)] {
        &self.column_widths
    }

    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths
            .iter()
            .find(|(c, _)| *c == col)
            .map(|(_, w)| *w)
    }

    pub fn row_heights(&self) -> &[(u32, f64)] {
        &self.row_heights
    }

    /// Number of leading rows frozen in place.
    pub fn frozen_rows(&self) -> u32 {
        self.frozen_rows
    }

    /// Index of the last row holding a cell.
    pub fn last_row(&self) -> Option<u32> {
        self.cells.iter().map(|c| c.row).max()
    }
}

/// A single styled cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row: u32,
    pub col: u16,
    pub value: CellValue,
    pub style: CellStyle,
}

/// Typed cell content.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    /// Formatting only.
    Blank,
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Rendering directives for one cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CellStyle {
    pub font_name: String,
    pub font_size: f64,
    pub bold: bool,
    pub font_color: Option<Rgb>,
    pub fill: Option<Rgb>,
    pub align: HAlign,
    pub vertical_center: bool,
    pub wrap: bool,
    pub number_format: Option<String>,
    /// Thin border color, when bordered.
    pub border: Option<Rgb>,
}

/// An inclusive, zero-based merged range. Its content is the anchor cell's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl MergeRange {
    /// A merge spanning columns `first_col..=last_col` of one row.
    pub fn row_span(row: u32, first_col: u16, last_col: u16) -> Self {
        Self {
            first_row: row,
            first_col,
            last_row: row,
            last_col,
        }
    }

    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }
}
