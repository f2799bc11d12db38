//! Header field extraction for DANFE documents.

use regex::Regex;
use tracing::trace;

use crate::models::invoice::{HeaderField, InvoiceHeader};

use super::patterns::*;

/// Extract every recognized header field from the full document text.
///
/// Each field is the first match of its label pattern; absent labels leave
/// the field empty.
pub fn extract_header(text: &str) -> InvoiceHeader {
    let field = |field: HeaderField| {
        let value = first_capture(pattern_for(field), text);
        trace!("header field {:?} = {:?}", field, value);
        value
    };

    InvoiceHeader {
        invoice_number: field(HeaderField::InvoiceNumber),
        series: field(HeaderField::Series),
        issue_date: field(HeaderField::IssueDate),
        exit_date: field(HeaderField::ExitDate),
        issuer_name: field(HeaderField::IssuerName),
        issuer_tax_id: field(HeaderField::IssuerTaxId),
        recipient_name: field(HeaderField::RecipientName),
        recipient_tax_id: field(HeaderField::RecipientTaxId),
        municipality: field(HeaderField::Municipality),
        total_value: field(HeaderField::TotalValue),
        access_key: field(HeaderField::AccessKey),
        operation_nature: field(HeaderField::OperationNature),
        installment_due_date: field(HeaderField::InstallmentDueDate),
    }
}

/// The label pattern used for a header field.
pub fn pattern_for(field: HeaderField) -> &'static Regex {
    match field {
        HeaderField::InvoiceNumber => &INVOICE_NUMBER,
        HeaderField::Series => &SERIES,
        HeaderField::IssueDate => &ISSUE_DATE,
        HeaderField::ExitDate => &EXIT_DATE,
        HeaderField::OperationNature => &OPERATION_NATURE,
        HeaderField::IssuerName => &ISSUER_NAME,
        HeaderField::IssuerTaxId => &ISSUER_TAX_ID,
        HeaderField::RecipientName => &RECIPIENT_NAME,
        HeaderField::RecipientTaxId => &RECIPIENT_TAX_ID,
        HeaderField::Municipality => &MUNICIPALITY,
        HeaderField::TotalValue => &TOTAL_VALUE,
        HeaderField::InstallmentDueDate => &INSTALLMENT_DUE_DATE,
        HeaderField::AccessKey => &ACCESS_KEY,
    }
}
