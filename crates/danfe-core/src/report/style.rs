//! Presentation settings for the report.

/// A 24-bit RGB color (`0x1F4E79`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    General,
    Left,
    Center,
    Right,
}

/// Immutable styling configuration handed to [`ReportBuilder`](super::ReportBuilder).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStyle {
    pub font_name: String,
    pub body_font_size: f64,
    pub title_font_size: f64,
    pub total_font_size: f64,

    /// Title, label and column-header background.
    pub dark: Rgb,
    /// Banded row background.
    pub light: Rgb,
    /// Plain row background and text on dark cells.
    pub white: Rgb,
    pub border_color: Rgb,

    pub header_sheet_name: String,
    pub items_sheet_name: String,

    /// Label and value column widths of the header sheet.
    pub header_column_widths: [f64; 2],
    /// Widths of the 11 items-sheet columns.
    pub item_column_widths: [f64; 11],

    pub title_row_height: f64,
    pub field_row_height: f64,
    pub item_header_row_height: f64,

    pub quantity_format: String,
    pub unit_value_format: String,
    pub money_format: String,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            font_name: "Arial".to_string(),
            body_font_size: 10.0,
            title_font_size: 13.0,
            total_font_size: 11.0,
            dark: Rgb(0x1F4E79),
            light: Rgb(0xD6E4F0),
            white: Rgb(0xFFFFFF),
            border_color: Rgb(0xAAAAAA),
            header_sheet_name: "Cabeçalho NF-e".to_string(),
            items_sheet_name: "Itens NF-e".to_string(),
            header_column_widths: [28.0, 72.0],
            item_column_widths: [5.0, 10.0, 52.0, 9.0, 16.0, 16.0, 7.0, 16.0, 18.0, 20.0, 20.0],
            title_row_height: 30.0,
            field_row_height: 18.0,
            item_header_row_height: 36.0,
            quantity_format: "#,##0.00".to_string(),
            unit_value_format: "R$ #,##0.00000".to_string(),
            money_format: "R$ #,##0.00".to_string(),
        }
    }
}
