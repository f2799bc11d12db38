//! Invoice data models for DANFE documents.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A parsed DANFE: header fields plus itemized lines in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice-level metadata.
    pub header: InvoiceHeader,

    /// Line items, in the order their data rows appear in the text.
    pub items: Vec<LineItem>,
}

impl Invoice {
    /// Sum of item quantities, in item order.
    pub fn total_quantity(&self) -> f64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of item net values, in item order.
    pub fn total_net_value(&self) -> f64 {
        self.items.iter().map(|i| i.net_value).sum()
    }
}

/// Invoice header fields.
///
/// Every field is a plain string; a label missing from the document leaves
/// its field empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// NF-e number (e.g. `000.123.456`).
    pub invoice_number: String,
    /// Series.
    pub series: String,
    /// Issue date, `DD/MM/YYYY`.
    pub issue_date: String,
    /// Exit (shipping) date, `DD/MM/YYYY`.
    pub exit_date: String,
    /// Issuer company name.
    pub issuer_name: String,
    /// Issuer CNPJ.
    pub issuer_tax_id: String,
    /// Recipient company name.
    pub recipient_name: String,
    /// Recipient CNPJ / CPF.
    pub recipient_tax_id: String,
    /// Recipient municipality.
    pub municipality: String,
    /// Declared invoice total, still in localized form.
    pub total_value: String,
    /// 44-digit access key in groups of four.
    pub access_key: String,
    /// Nature of the operation (natureza da operação).
    pub operation_nature: String,
    /// Due date of the first installment (duplicata).
    pub installment_due_date: String,
}

impl InvoiceHeader {
    /// Get a field by name.
    pub fn get(&self, field: HeaderField) -> &str {
        match field {
            HeaderField::InvoiceNumber => &self.invoice_number,
            HeaderField::Series => &self.series,
            HeaderField::IssueDate => &self.issue_date,
            HeaderField::ExitDate => &self.exit_date,
            HeaderField::OperationNature => &self.operation_nature,
            HeaderField::IssuerName => &self.issuer_name,
            HeaderField::IssuerTaxId => &self.issuer_tax_id,
            HeaderField::RecipientName => &self.recipient_name,
            HeaderField::RecipientTaxId => &self.recipient_tax_id,
            HeaderField::Municipality => &self.municipality,
            HeaderField::TotalValue => &self.total_value,
            HeaderField::InstallmentDueDate => &self.installment_due_date,
            HeaderField::AccessKey => &self.access_key,
        }
    }

    /// Fields that were not found in the document.
    pub fn missing_fields(&self) -> Vec<HeaderField> {
        HeaderField::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_empty())
            .collect()
    }
}

/// The recognized header fields, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderField {
    InvoiceNumber,
    Series,
    IssueDate,
    ExitDate,
    OperationNature,
    IssuerName,
    IssuerTaxId,
    RecipientName,
    RecipientTaxId,
    Municipality,
    TotalValue,
    InstallmentDueDate,
    AccessKey,
}

impl HeaderField {
    /// All fields in the order they are laid out on the header sheet.
    pub const ALL: [HeaderField; 13] = [
        HeaderField::InvoiceNumber,
        HeaderField::Series,
        HeaderField::IssueDate,
        HeaderField::ExitDate,
        HeaderField::OperationNature,
        HeaderField::IssuerName,
        HeaderField::IssuerTaxId,
        HeaderField::RecipientName,
        HeaderField::RecipientTaxId,
        HeaderField::Municipality,
        HeaderField::TotalValue,
        HeaderField::InstallmentDueDate,
        HeaderField::AccessKey,
    ];

    /// Spreadsheet label.
    pub fn label(&self) -> &'static str {
        match self {
            HeaderField::InvoiceNumber => "NF-e Número",
            HeaderField::Series => "Série",
            HeaderField::IssueDate => "Data Emissão",
            HeaderField::ExitDate => "Data Saída",
            HeaderField::OperationNature => "Natureza da Operação",
            HeaderField::IssuerName => "Emitente",
            HeaderField::IssuerTaxId => "CNPJ Emitente",
            HeaderField::RecipientName => "Destinatário",
            HeaderField::RecipientTaxId => "CNPJ Destinatário",
            HeaderField::Municipality => "Município",
            HeaderField::TotalValue => "Valor Total da NF-e",
            HeaderField::InstallmentDueDate => "Vencimento Duplicata",
            HeaderField::AccessKey => "Chave de Acesso",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single itemized line of the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product code, `<number>/<number>`.
    pub code: String,

    /// Product description, joined from every description line of the block.
    pub description: String,

    /// Lot identifier, empty when absent.
    #[serde(default)]
    pub lot: String,

    /// Manufacture date (`DD/MM/YYYY`), empty when absent.
    #[serde(default)]
    pub manufacture_date: String,

    /// Validity/expiry date (`DD/MM/YYYY`), empty when absent.
    #[serde(default)]
    pub validity_date: String,

    /// NCM classification code (8 digits).
    pub ncm: String,

    /// CST tax situation code (3 digits).
    pub cst: String,

    /// CFOP fiscal operation code (4 digits).
    pub cfop: String,

    /// Unit of measure.
    pub unit: UnitOfMeasure,

    pub quantity: f64,
    pub unit_value: f64,
    pub discount_value: f64,

    /// Net value of the line. Not cross-checked against the other amounts.
    pub net_value: f64,
}

/// Units of measure recognized on the numeric data row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UnitOfMeasure {
    /// Kilogram.
    Kg,
    /// Unit.
    Un,
    /// Piece.
    Pc,
    /// Box.
    Cx,
    /// Sack.
    Sc,
    /// Litre.
    Lt,
}

impl UnitOfMeasure {
    /// Every recognized unit.
    pub const ALL: [UnitOfMeasure; 6] = [
        UnitOfMeasure::Kg,
        UnitOfMeasure::Un,
        UnitOfMeasure::Pc,
        UnitOfMeasure::Cx,
        UnitOfMeasure::Sc,
        UnitOfMeasure::Lt,
    ];

    /// The token as printed on the invoice.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitOfMeasure::Kg => "KG",
            UnitOfMeasure::Un => "UN",
            UnitOfMeasure::Pc => "PC",
            UnitOfMeasure::Cx => "CX",
            UnitOfMeasure::Sc => "SC",
            UnitOfMeasure::Lt => "LT",
        }
    }

    /// Parse a unit token. Only the exact uppercase tokens are accepted.
    pub fn from_token(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|unit| unit.as_str() == s)
    }
}

impl fmt::Display for UnitOfMeasure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, net_value: f64) -> LineItem {
        LineItem {
            code: "1/1".to_string(),
            description: "PRODUTO".to_string(),
            lot: String::new(),
            manufacture_date: String::new(),
            validity_date: String::new(),
            ncm: "23099010".to_string(),
            cst: "050".to_string(),
            cfop: "5124".to_string(),
            unit: UnitOfMeasure::Kg,
            quantity,
            unit_value: 0.0,
            discount_value: 0.0,
            net_value,
        }
    }

    #[test]
    fn test_unit_parsing() {
        assert_eq!(UnitOfMeasure::from_token("KG"), Some(UnitOfMeasure::Kg));
        assert_eq!(UnitOfMeasure::from_token(" LT "), Some(UnitOfMeasure::Lt));
        assert_eq!(UnitOfMeasure::from_token("kg"), None);
        assert_eq!(UnitOfMeasure::from_token("TON"), None);
        assert_eq!(UnitOfMeasure::Cx.to_string(), "CX");
    }

    #[test]
    fn test_header_get_and_missing_fields() {
        let header = InvoiceHeader {
            invoice_number: "000.012.345".to_string(),
            series: "1".to_string(),
            ..Default::default()
        };

        assert_eq!(header.get(HeaderField::InvoiceNumber), "000.012.345");
        assert_eq!(header.get(HeaderField::Municipality), "");

        let missing = header.missing_fields();
        assert_eq!(missing.len(), 11);
        assert!(!missing.contains(&HeaderField::Series));
    }

    #[test]
    fn test_header_labels_are_unique() {
        let mut labels: Vec<&str> = HeaderField::ALL.iter().map(|f| f.label()).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), HeaderField::ALL.len());
    }

    #[test]
    fn test_invoice_totals() {
        let invoice = Invoice {
            header: InvoiceHeader::default(),
            items: vec![item(10.5, 100.0), item(2.25, 50.5)],
        };
        assert_eq!(invoice.total_quantity(), 10.5 + 2.25);
        assert_eq!(invoice.total_net_value(), 100.0 + 50.5);
    }

    #[test]
    fn test_line_item_serializes_unit_uppercase() {
        let json = serde_json::to_value(item(1.0, 1.0)).unwrap();
        assert_eq!(json["unit"], "KG");
    }
}
