//! Common regex patterns for DANFE extraction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::invoice::UnitOfMeasure;

lazy_static! {
    // Header labels. Each pattern binds to the first occurrence of its label.
    pub static ref INVOICE_NUMBER: Regex = Regex::new(
        r"Nº\s+([\d.]+)"
    ).unwrap();

    pub static ref SERIES: Regex = Regex::new(
        r"SÉRIE\s+(\d+)"
    ).unwrap();

    pub static ref ISSUE_DATE: Regex = Regex::new(
        r"DATA DA EMISSÃO\s+(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref EXIT_DATE: Regex = Regex::new(
        r"DATA DA SAÍDA\s+(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // Issuer name is printed on the same line as the DANFE banner
    pub static ref ISSUER_NAME: Regex = Regex::new(
        r"DANFE(.+?)\n"
    ).unwrap();

    pub static ref ISSUER_TAX_ID: Regex = Regex::new(
        r"INSCRIÇÃO ESTADUAL DO SUBSTITUTO TRIBUTÁRIO CNPJ\s+([\d./\-]+)"
    ).unwrap();

    pub static ref RECIPIENT_NAME: Regex = Regex::new(
        r"NOME / RAZÃO SOCIAL\s+(.+?)\nDATA DA EMISSÃO"
    ).unwrap();

    pub static ref RECIPIENT_TAX_ID: Regex = Regex::new(
        r"CNPJ / CPF\s+([\d./\-]+)"
    ).unwrap();

    pub static ref MUNICIPALITY: Regex = Regex::new(
        r"MUNICÍPIO\s+(\w[\w\s]+?)\n"
    ).unwrap();

    pub static ref TOTAL_VALUE: Regex = Regex::new(
        r"Valor Total:\s*([\d.,]+)"
    ).unwrap();

    // 44 digits printed as eleven groups of four
    pub static ref ACCESS_KEY: Regex = Regex::new(
        r"(\d{4}(?: \d{4}){10})"
    ).unwrap();

    pub static ref OPERATION_NATURE: Regex = Regex::new(
        r"NATUREZA DA OPERAÇÃO\s+(.+?)\n"
    ).unwrap();

    pub static ref INSTALLMENT_DUE_DATE: Regex = Regex::new(
        r"Vencimento\s*\n:\s*\n(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // Item block anchors
    pub static ref ITEM_START: Regex = Regex::new(
        r"^(\d+/\d+)\s+(.+)"
    ).unwrap();

    // NCM, CST, CFOP, unit, then quantity / unit value / discount / net value
    pub static ref DATA_ROW: Regex = Regex::new(&format!(
        r"(\d{{8}})\s+(\d{{3}})\s+(\d{{4}})\s+({})\s+([\d.]+,\d+)\s+([\d.]+,\d+)\s+([\d.]+,\d+)\s+([\d.]+,\d+)",
        unit_alternation()
    )).unwrap();

    // Same shape with any unit token, used to report rows dropped for their unit
    pub static ref DATA_ROW_ANY_UNIT: Regex = Regex::new(
        r"(\d{8})\s+(\d{3})\s+(\d{4})\s+([A-Z]{1,4})\s+[\d.]+,\d+"
    ).unwrap();

    // Lines inside a block that carry metadata rather than description
    pub static ref METADATA_LINE: Regex = Regex::new(
        r"^(?:Lote:|FAB:|VAL:|QTD:|LOTE:|23\d{6})"
    ).unwrap();

    pub static ref NCM_PREFIX: Regex = Regex::new(
        r"^23\d{6}"
    ).unwrap();

    // Block sub-fields
    pub static ref LOT: Regex = Regex::new(
        r"Lote:\s*(\S+)"
    ).unwrap();

    pub static ref MANUFACTURE_DATE: Regex = Regex::new(
        r"Data Fab\.:\s*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    pub static ref VALIDITY_DATE: Regex = Regex::new(
        r"Vcto:\s*(\d{2}/\d{2}/\d{4})"
    ).unwrap();
}

/// `KG|UN|...`, one branch per recognized unit.
fn unit_alternation() -> String {
    UnitOfMeasure::ALL
        .iter()
        .map(|unit| unit.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

/// First capture group of `pattern` in `text`, trimmed; empty when absent.
pub fn first_capture(pattern: &Regex, text: &str) -> String {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_row_matches_known_units_only() {
        let row = "23099010 050 5124 KG 18.032,20 0,12 0,00 2.163,86";
        let caps = DATA_ROW.captures(row).unwrap();
        assert_eq!(&caps[4], "KG");
        assert_eq!(&caps[8], "2.163,86");

        let ton = "23099010 050 5124 TON 18,20 0,12 0,00 2,18";
        assert!(!DATA_ROW.is_match(ton));
        assert_eq!(&DATA_ROW_ANY_UNIT.captures(ton).unwrap()[4], "TON");
    }

    #[test]
    fn test_data_row_accepts_every_unit() {
        for unit in UnitOfMeasure::ALL {
            let row = format!("23099010 050 5124 {} 1,00 1,00 0,00 1,00", unit);
            let caps = DATA_ROW.captures(&row).unwrap();
            assert_eq!(UnitOfMeasure::from_token(&caps[4]), Some(unit));
        }
    }

    #[test]
    fn test_item_start() {
        let caps = ITEM_START.captures("211/1 TRESBOMM - ALOJAMENTO").unwrap();
        assert_eq!(&caps[1], "211/1");
        assert_eq!(&caps[2], "TRESBOMM - ALOJAMENTO");

        assert!(!ITEM_START.is_match("17/02/2026"));
        assert!(!ITEM_START.is_match("Lote: 5003"));
    }

    #[test]
    fn test_access_key() {
        let text = "CHAVE DE ACESSO\n3526 0212 3456 7800 0190 5500 1000 0123 4510 0012 3456\n";
        assert_eq!(
            first_capture(&ACCESS_KEY, text),
            "3526 0212 3456 7800 0190 5500 1000 0123 4510 0012 3456"
        );
    }

    #[test]
    fn test_first_capture_missing() {
        assert_eq!(first_capture(&SERIES, "nothing here"), "");
    }
}
