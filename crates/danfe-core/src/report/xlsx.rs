//! `.xlsx` output via rust_xlsxwriter.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, FormatPattern, Workbook, Worksheet};
use tracing::info;

use super::{CellStyle, CellValue, HAlign, Report, Sheet};
use crate::error::Result;

impl Report {
    /// Write the report as an `.xlsx` file, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut workbook = self.to_workbook()?;
        workbook.save(path)?;
        info!("Saved report to {}", path.display());
        Ok(())
    }

    /// Serialize the report to `.xlsx` bytes.
    pub fn save_to_buffer(&self) -> Result<Vec<u8>> {
        let mut workbook = self.to_workbook()?;
        Ok(workbook.save_to_buffer()?)
    }

    fn to_workbook(&self) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        for sheet in self.sheets() {
            let worksheet = workbook.add_worksheet();
            write_sheet(worksheet, sheet)?;
        }
        Ok(workbook)
    }
}

fn write_sheet(worksheet: &mut Worksheet, sheet: &Sheet) -> Result<()> {
    worksheet.set_name(sheet.name())?;

    for cell in sheet.cells() {
        if sheet.is_merged_away(cell.row, cell.col) {
            continue;
        }
        let format = to_format(&cell.style);

        if let Some(range) = sheet.merge_at(cell.row, cell.col) {
            let text = cell.value.as_text().unwrap_or("");
            worksheet.merge_range(
                range.first_row,
                range.first_col,
                range.last_row,
                range.last_col,
                text,
                &format,
            )?;
            if let CellValue::Number(n) = cell.value {
                worksheet.write_number_with_format(cell.row, cell.col, n, &format)?;
            }
            continue;
        }

        match &cell.value {
            CellValue::Text(s) => {
                worksheet.write_string_with_format(cell.row, cell.col, s, &format)?;
            }
            CellValue::Number(n) => {
                worksheet.write_number_with_format(cell.row, cell.col, *n, &format)?;
            }
            CellValue::Blank => {
                worksheet.write_blank(cell.row, cell.col, &format)?;
            }
        }
    }

    for (col, width) in sheet.column_widths() {
        worksheet.set_column_width(*col, *width)?;
    }
    for (row, height) in sheet.row_heights() {
        worksheet.set_row_height(*row, *height)?;
    }
    if sheet.frozen_rows() > 0 {
        worksheet.set_freeze_panes(sheet.frozen_rows(), 0)?;
    }

    Ok(())
}

fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new()
        .set_font_name(style.font_name.as_str())
        .set_font_size(style.font_size);

    if style.bold {
        format = format.set_bold();
    }
    if let Some(color) = style.font_color {
        format = format.set_font_color(Color::RGB(color.0));
    }
    if let Some(fill) = style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(fill.0));
    }
    format = match style.align {
        HAlign::General => format,
        HAlign::Left => format.set_align(FormatAlign::Left),
        HAlign::Center => format.set_align(FormatAlign::Center),
        HAlign::Right => format.set_align(FormatAlign::Right),
    };
    if style.vertical_center {
        format = format.set_align(FormatAlign::VerticalCenter);
    }
    if style.wrap {
        format = format.set_text_wrap();
    }
    if let Some(num_format) = &style.number_format {
        format = format.set_num_format(num_format.as_str());
    }
    if let Some(border) = style.border {
        format = format
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(border.0));
    }

    format
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::{InvoiceHeader, LineItem, UnitOfMeasure};
    use crate::report::build_report;
    use tempfile::TempDir;

    fn sample_report() -> Report {
        let header = InvoiceHeader {
            invoice_number: "000.045.210".to_string(),
            ..Default::default()
        };
        let items = vec![LineItem {
            code: "211/1".to_string(),
            description: "NUCLEO FRANGO".to_string(),
            lot: String::new(),
            manufacture_date: String::new(),
            validity_date: String::new(),
            ncm: "23099010".to_string(),
            cst: "050".to_string(),
            cfop: "5124".to_string(),
            unit: UnitOfMeasure::Kg,
            quantity: 18032.2,
            unit_value: 0.12,
            discount_value: 0.0,
            net_value: 2163.86,
        }];
        build_report(&header, &items).0
    }

    #[test]
    fn test_save_to_buffer_is_zip() {
        let bytes = sample_report().save_to_buffer().unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_save_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("NFe_000045210.xlsx");

        sample_report().save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() > 100);
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        assert!(sample_report().save(&path).is_err());
    }
}
