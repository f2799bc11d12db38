//! Report assembly.

use tracing::debug;

use crate::models::invoice::{HeaderField, InvoiceHeader, LineItem};

use super::style::{HAlign, ReportStyle};
use super::{CellStyle, CellValue, MergeRange, Report, Sheet};

/// Column titles of the items sheet.
pub const ITEM_COLUMNS: [&str; 11] = [
    "#",
    "Código",
    "Descrição do Produto",
    "Lote",
    "Data Fabricação",
    "Data Validade",
    "Unid.",
    "Quantidade",
    "Valor Unit. (R$)",
    "Valor Desconto (R$)",
    "Valor Líquido (R$)",
];

// Zero-based item-sheet columns with special handling
const COL_INDEX: u16 = 0;
const COL_DESCRIPTION: u16 = 2;
const COL_UNIT: u16 = 6;
const COL_QUANTITY: u16 = 7;
const COL_UNIT_VALUE: u16 = 8;
const COL_DISCOUNT: u16 = 9;
const COL_NET_VALUE: u16 = 10;

/// Builds a [`Report`] from extracted invoice data.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    style: ReportStyle,
}

impl ReportBuilder {
    pub fn new(style: ReportStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &ReportStyle {
        &self.style
    }

    /// Build the header and items sheets.
    ///
    /// Returns the report with the summed quantity and summed net value, both
    /// accumulated in item order.
    pub fn build(&self, header: &InvoiceHeader, items: &[LineItem]) -> (Report, f64, f64) {
        let header_sheet = self.header_sheet(header);
        let (items_sheet, total_quantity, total_net) = self.items_sheet(items);

        debug!(
            "Built report: {} items, quantity {:.2}, net {:.2}",
            items.len(),
            total_quantity,
            total_net
        );

        (
            Report::new(vec![header_sheet, items_sheet]),
            total_quantity,
            total_net,
        )
    }

    fn header_sheet(&self, header: &InvoiceHeader) -> Sheet {
        let s = &self.style;
        let mut sheet = Sheet::new(s.header_sheet_name.as_str());

        let title = format!(
            "NOTA FISCAL ELETRÔNICA – NF-e Nº {}",
            header.invoice_number
        );
        sheet.put(
            0,
            0,
            CellValue::Text(title),
            CellStyle {
                align: HAlign::Center,
                ..self.on_dark(s.title_font_size)
            },
        );
        sheet.merge(MergeRange::row_span(0, 0, 1));
        sheet.set_row_height(0, s.title_row_height);

        for (k, field) in HeaderField::ALL.iter().enumerate() {
            let row = k as u32 + 1;
            // Bands follow the 1-based sheet row number
            let band = if (row + 1) % 2 == 0 { s.light } else { s.white };

            sheet.put(
                row,
                0,
                CellValue::Text(field.label().to_string()),
                self.on_dark(s.body_font_size),
            );
            sheet.put(
                row,
                1,
                CellValue::Text(header.get(*field).to_string()),
                CellStyle {
                    fill: Some(band),
                    wrap: true,
                    ..self.body()
                },
            );
            sheet.set_row_height(row, s.field_row_height);
        }

        sheet.set_column_width(0, s.header_column_widths[0]);
        sheet.set_column_width(1, s.header_column_widths[1]);
        sheet
    }

    fn items_sheet(&self, items: &[LineItem]) -> (Sheet, f64, f64) {
        let s = &self.style;
        let mut sheet = Sheet::new(s.items_sheet_name.as_str());

        for (col, title) in ITEM_COLUMNS.iter().enumerate() {
            sheet.put(
                0,
                col as u16,
                CellValue::Text(title.to_string()),
                CellStyle {
                    align: HAlign::Center,
                    wrap: true,
                    ..self.on_dark(s.body_font_size)
                },
            );
        }
        sheet.set_row_height(0, s.item_header_row_height);

        let mut total_quantity = 0.0;
        let mut total_net = 0.0;

        for (n, item) in items.iter().enumerate() {
            let index = n + 1;
            let row = index as u32;
            let band = if index % 2 == 0 { s.light } else { s.white };

            let values = [
                CellValue::Number(index as f64),
                CellValue::Text(item.code.clone()),
                CellValue::Text(item.description.clone()),
                CellValue::Text(item.lot.clone()),
                CellValue::Text(item.manufacture_date.clone()),
                CellValue::Text(item.validity_date.clone()),
                CellValue::Text(item.unit.to_string()),
                CellValue::Number(item.quantity),
                CellValue::Number(item.unit_value),
                CellValue::Number(item.discount_value),
                CellValue::Number(item.net_value),
            ];

            for (col, value) in values.into_iter().enumerate() {
                let col = col as u16;
                let align = if col >= COL_QUANTITY {
                    HAlign::Right
                } else if col == COL_INDEX || col == COL_UNIT {
                    HAlign::Center
                } else {
                    HAlign::Left
                };

                sheet.put(
                    row,
                    col,
                    value,
                    CellStyle {
                        fill: Some(band),
                        align,
                        wrap: col == COL_DESCRIPTION,
                        number_format: self.number_format(col),
                        ..self.body()
                    },
                );
            }

            total_quantity += item.quantity;
            total_net += item.net_value;
        }

        let total_row = items.len() as u32 + 1;
        sheet.put(
            total_row,
            0,
            CellValue::Text("TOTAL GERAL".to_string()),
            CellStyle {
                align: HAlign::Center,
                ..self.on_dark(s.total_font_size)
            },
        );
        sheet.merge(MergeRange::row_span(total_row, 0, COL_UNIT));

        // The discount total is a fixed zero, not a sum of the column
        for (col, value) in [
            (COL_QUANTITY, total_quantity),
            (COL_DISCOUNT, 0.0),
            (COL_NET_VALUE, total_net),
        ] {
            sheet.put(
                total_row,
                col,
                CellValue::Number(value),
                CellStyle {
                    align: HAlign::Right,
                    number_format: self.number_format(col),
                    ..self.on_dark(s.total_font_size)
                },
            );
        }
        sheet.put(
            total_row,
            COL_UNIT_VALUE,
            CellValue::Blank,
            CellStyle {
                fill: Some(s.dark),
                ..self.body()
            },
        );

        for (col, width) in s.item_column_widths.iter().enumerate() {
            sheet.set_column_width(col as u16, *width);
        }
        sheet.freeze_rows(1);

        (sheet, total_quantity, total_net)
    }

    fn number_format(&self, col: u16) -> Option<String> {
        let s = &self.style;
        match col {
            COL_QUANTITY => Some(s.quantity_format.clone()),
            COL_UNIT_VALUE => Some(s.unit_value_format.clone()),
            COL_DISCOUNT | COL_NET_VALUE => Some(s.money_format.clone()),
            _ => None,
        }
    }

    /// Plain bordered body cell.
    fn body(&self) -> CellStyle {
        CellStyle {
            font_name: self.style.font_name.clone(),
            font_size: self.style.body_font_size,
            bold: false,
            font_color: None,
            fill: None,
            align: HAlign::General,
            vertical_center: true,
            wrap: false,
            number_format: None,
            border: Some(self.style.border_color),
        }
    }

    /// Bold white text on the dark fill.
    fn on_dark(&self, font_size: f64) -> CellStyle {
        CellStyle {
            font_size,
            bold: true,
            font_color: Some(self.style.white),
            fill: Some(self.style.dark),
            ..self.body()
        }
    }
}

/// Build the report with the default style.
pub fn build_report(header: &InvoiceHeader, items: &[LineItem]) -> (Report, f64, f64) {
    ReportBuilder::default().build(header, items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::UnitOfMeasure;
    use crate::report::Rgb;
    use pretty_assertions::assert_eq;

    fn item(code: &str, quantity: f64, discount: f64, net: f64) -> LineItem {
        LineItem {
            code: code.to_string(),
            description: format!("PRODUTO {}", code),
            lot: String::new(),
            manufacture_date: String::new(),
            validity_date: "19/03/2026".to_string(),
            ncm: "23099010".to_string(),
            cst: "050".to_string(),
            cfop: "5124".to_string(),
            unit: UnitOfMeasure::Kg,
            quantity,
            unit_value: 0.12,
            discount_value: discount,
            net_value: net,
        }
    }

    fn header() -> InvoiceHeader {
        InvoiceHeader {
            invoice_number: "000.045.210".to_string(),
            municipality: "PARA DE MINAS".to_string(),
            ..Default::default()
        }
    }

    fn text(sheet: &Sheet, row: u32, col: u16) -> &str {
        sheet.cell(row, col).and_then(|c| c.value.as_text()).unwrap()
    }

    fn number(sheet: &Sheet, row: u32, col: u16) -> f64 {
        sheet.cell(row, col).and_then(|c| c.value.as_number()).unwrap()
    }

    #[test]
    fn test_header_sheet_layout() {
        let (report, _, _) = build_report(&header(), &[]);
        let sheet = report.sheet("Cabeçalho NF-e").unwrap();

        assert_eq!(
            text(sheet, 0, 0),
            "NOTA FISCAL ELETRÔNICA – NF-e Nº 000.045.210"
        );
        assert_eq!(sheet.merges(), &[MergeRange::row_span(0, 0, 1)]);
        assert_eq!(sheet.last_row(), Some(13));

        assert_eq!(text(sheet, 1, 0), "NF-e Número");
        assert_eq!(text(sheet, 1, 1), "000.045.210");
        assert_eq!(text(sheet, 10, 0), "Município");
        assert_eq!(text(sheet, 10, 1), "PARA DE MINAS");
        assert_eq!(text(sheet, 13, 0), "Chave de Acesso");
        assert_eq!(text(sheet, 13, 1), "");

        // Sheet row 2 (index 1) is banded, row 3 is plain
        assert_eq!(sheet.cell(1, 1).unwrap().style.fill, Some(Rgb(0xD6E4F0)));
        assert_eq!(sheet.cell(2, 1).unwrap().style.fill, Some(Rgb(0xFFFFFF)));
        assert!(sheet.cell(1, 1).unwrap().style.wrap);
        assert!(sheet.cell(1, 0).unwrap().style.bold);

        assert_eq!(sheet.column_width(0), Some(28.0));
        assert_eq!(sheet.column_width(1), Some(72.0));
    }

    #[test]
    fn test_items_sheet_rows_and_totals() {
        let items = vec![
            item("211/1", 18032.20, 0.0, 2163.86),
            item("85/1", 40.0, 10.0, 3810.0),
            item("207/1", 1000.0, 0.0, 4250.0),
        ];
        let (report, total_quantity, total_net) = build_report(&header(), &items);

        assert_eq!(total_quantity, 18032.20 + 40.0 + 1000.0);
        assert_eq!(total_net, 2163.86 + 3810.0 + 4250.0);

        let sheet = report.sheet("Itens NF-e").unwrap();
        let titles: Vec<&str> = (0..11).map(|c| text(sheet, 0, c)).collect();
        assert_eq!(titles, ITEM_COLUMNS.to_vec());

        assert_eq!(number(sheet, 1, 0), 1.0);
        assert_eq!(text(sheet, 1, 1), "211/1");
        assert_eq!(text(sheet, 1, 5), "19/03/2026");
        assert_eq!(text(sheet, 1, 6), "KG");
        assert_eq!(number(sheet, 3, 10), 4250.0);

        // Total row merges A:G and leaves the discount total at zero
        assert_eq!(text(sheet, 4, 0), "TOTAL GERAL");
        assert!(sheet.merges().contains(&MergeRange::row_span(4, 0, 6)));
        assert_eq!(number(sheet, 4, 7), total_quantity);
        assert_eq!(number(sheet, 4, 9), 0.0);
        assert_eq!(number(sheet, 4, 10), total_net);
        assert_eq!(sheet.cell(4, 8).unwrap().value, CellValue::Blank);
        assert_eq!(sheet.last_row(), Some(4));
        assert_eq!(sheet.frozen_rows(), 1);
    }

    #[test]
    fn test_items_sheet_styles() {
        let items = vec![item("1/1", 1.0, 0.0, 1.0), item("2/1", 1.0, 0.0, 1.0)];
        let (report, _, _) = build_report(&header(), &items);
        let sheet = report.sheet("Itens NF-e").unwrap();

        let style = |row, col| &sheet.cell(row, col).unwrap().style;

        assert_eq!(style(1, 0).align, HAlign::Center);
        assert_eq!(style(1, 6).align, HAlign::Center);
        assert_eq!(style(1, 2).align, HAlign::Left);
        assert_eq!(style(1, 7).align, HAlign::Right);
        assert!(style(1, 2).wrap);
        assert!(!style(1, 3).wrap);

        assert_eq!(style(1, 7).number_format.as_deref(), Some("#,##0.00"));
        assert_eq!(style(1, 8).number_format.as_deref(), Some("R$ #,##0.00000"));
        assert_eq!(style(1, 10).number_format.as_deref(), Some("R$ #,##0.00"));
        assert_eq!(style(1, 1).number_format, None);

        assert_eq!(style(1, 0).fill, Some(Rgb(0xFFFFFF)));
        assert_eq!(style(2, 0).fill, Some(Rgb(0xD6E4F0)));

        assert_eq!(sheet.column_width(2), Some(52.0));
        assert_eq!(sheet.column_width(10), Some(20.0));
    }

    #[test]
    fn test_custom_style() {
        let style = ReportStyle {
            items_sheet_name: "Items".to_string(),
            header_column_widths: [30.0, 80.0],
            ..ReportStyle::default()
        };
        let (report, _, _) = ReportBuilder::new(style).build(&header(), &[]);

        let names: Vec<&str> = report.sheets().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["Cabeçalho NF-e", "Items"]);
        assert_eq!(report.sheets()[0].column_width(1), Some(80.0));
    }

    #[test]
    fn test_empty_items_still_has_total_row() {
        let (report, total_quantity, total_net) = build_report(&header(), &[]);
        let sheet = report.sheet("Itens NF-e").unwrap();

        assert_eq!(total_quantity, 0.0);
        assert_eq!(total_net, 0.0);
        assert_eq!(text(sheet, 1, 0), "TOTAL GERAL");
    }
}
