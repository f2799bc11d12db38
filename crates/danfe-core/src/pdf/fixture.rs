//! Minimal text PDFs built with lopdf, for tests.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use super::Result;
use crate::error::PdfError;

const PAGE_HEIGHT: i64 = 842;
const LEADING: i64 = 14;

/// One-page PDF with each entry of `lines` on its own line, top to bottom.
///
/// Text is WinAnsi-encoded Courier, so Latin-1 characters (`º`, `É`, `Ã`)
/// survive extraction. An empty slice gives a page without any text.
pub fn text_pdf(lines: &[&str]) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (n, line) in lines.iter().enumerate() {
        let y = PAGE_HEIGHT - 40 - LEADING * n as i64;
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 9.into()]),
            Operation::new("Td", vec![30.into(), y.into()]),
            Operation::new("Tj", vec![Object::String(latin1(line), StringFormat::Literal)]),
            Operation::new("ET", vec![]),
        ]);
    }
    let content = Content { operations }
        .encode()
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| PdfError::Parse(e.to_string()))?;
    Ok(bytes)
}

/// The sample document used across tests: a short header and one item block.
pub fn sample_danfe_pdf() -> Result<Vec<u8>> {
    text_pdf(&[
        "DANFE AGRO RACOES LTDA",
        "Nº 000.045.210",
        "SÉRIE 1",
        "DATA DA EMISSÃO 17/02/2026",
        "DADOS DOS PRODUTOS / SERVICOS",
        "211/1 TRESBOMM - ALOJAMENTO C/ AMOXI E TIAMU",
        "VACCINAR",
        "Lote: 5003 Data Fab.: 17/02/2026 Vcto: 19/03/2026",
        "23099010 050 5124 KG 18.032,20 0,12 0,00 2.163,86",
    ])
}

// Characters outside Latin-1 become '?'
fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{PdfExtractor, PdfProcessor};

    #[test]
    fn test_sample_pdf_loads() {
        let bytes = sample_danfe_pdf().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let mut extractor = PdfExtractor::new();
        extractor.load(&bytes).unwrap();
        assert_eq!(extractor.page_count(), 1);

        let text = extractor.extract_text().unwrap();
        assert!(text.contains("211/1 TRESBOMM"));
        assert!(text.contains("23099010 050 5124 KG 18.032,20 0,12 0,00 2.163,86"));
    }

    #[test]
    fn test_latin1() {
        assert_eq!(latin1("Nº"), vec![b'N', 0xBA]);
        assert_eq!(latin1("–"), vec![b'?']);
    }
}
