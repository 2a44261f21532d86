//! Statement format detection by signature substrings.
//!
//! The delimited branch tries formats most-specific first: a credit-card
//! statement also contains debit-like headers, so it must win before the
//! debit checks run. Detection never fails; anything unrecognized falls to
//! the generic parsers, which extract zero rows from alien documents.

use serde::Serialize;

/// How the caller obtained the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceHint {
    /// Text extracted from a PDF.
    PdfText,
    /// CSV/spreadsheet export or pasted table text.
    Delimited,
}

impl SourceHint {
    pub fn from_filename(name: &str) -> SourceHint {
        if name.to_lowercase().ends_with(".pdf") {
            SourceHint::PdfText
        } else {
            SourceHint::Delimited
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatementFormat {
    SabadellCreditCard,
    SabadellDebit,
    IngCsv,
    GenericCsv,
    IngPdf,
    SabadellPdf,
    UnknownPdf,
}

pub fn detect_format(text: &str, hint: SourceHint) -> StatementFormat {
    match hint {
        SourceHint::PdfText => {
            let lower = text.to_lowercase();
            if lower.contains("ing") {
                StatementFormat::IngPdf
            } else if lower.contains("sabadell") {
                StatementFormat::SabadellPdf
            } else {
                StatementFormat::UnknownPdf
            }
        }
        SourceHint::Delimited => {
            if is_sabadell_credit_card(text) {
                StatementFormat::SabadellCreditCard
            } else if is_sabadell_debit(text) {
                StatementFormat::SabadellDebit
            } else if is_ing_csv(text) {
                StatementFormat::IngCsv
            } else {
                StatementFormat::GenericCsv
            }
        }
    }
}

fn is_sabadell_credit_card(text: &str) -> bool {
    text.contains("MOVIMIENTOS DE CREDITO")
        || text.contains("Saldo dispuesto")
        || text.contains("Límite de")
        || text.contains("Forma pago mensual")
        || (text.contains("VISA") && text.contains("Límite"))
}

fn is_sabadell_debit(text: &str) -> bool {
    let comma_format = text.contains("F. Operativa")
        && text.contains("Concepto")
        && text.contains("F. Valor")
        && text.contains("Importe");
    let tab_format = text.contains("Fecha")
        && text.contains("Descripción")
        && text.contains("Importe")
        && text.contains("Saldo");
    comma_format || tab_format
}

fn is_ing_csv(text: &str) -> bool {
    let lower = text.to_lowercase();
    let preamble = lower.contains("movimientos de la cuenta") || lower.contains("número de cuenta");
    let header = lower
        .lines()
        .take(15)
        .any(|l| l.contains("f. valor") && l.contains("categoría") && l.contains("importe"));
    preamble && header
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_card_wins_over_debit() {
        let text = "Límite de crédito, 1.000,00 EUR\nMOVIMIENTOS DE CREDITO\nF. Operativa,Concepto,F. Valor,Importe";
        assert_eq!(
            detect_format(text, SourceHint::Delimited),
            StatementFormat::SabadellCreditCard
        );
    }

    #[test]
    fn test_sabadell_debit_signatures() {
        let comma = "Cuenta: ES12 3456\nF. Operativa,Concepto,F. Valor,Importe,Saldo";
        assert_eq!(
            detect_format(comma, SourceHint::Delimited),
            StatementFormat::SabadellDebit
        );

        let tab = "Fecha\tDescripción\tImporte\tSaldo\n06/11/2025\tRECIBO\t-39,89 €\t100,00 €";
        assert_eq!(
            detect_format(tab, SourceHint::Delimited),
            StatementFormat::SabadellDebit
        );
    }

    #[test]
    fn test_ing_named_column_export() {
        let text = "Movimientos de la Cuenta\nNúmero de cuenta: 1465 0100 91 1234567890\n\nF. VALOR,CATEGORÍA,SUBCATEGORÍA,DESCRIPCIÓN,COMENTARIO,IMAGEN,IMPORTE (€),SALDO (€)";
        assert_eq!(
            detect_format(text, SourceHint::Delimited),
            StatementFormat::IngCsv
        );
    }

    #[test]
    fn test_unrecognized_falls_to_generic() {
        assert_eq!(
            detect_format("Date,Description,Amount", SourceHint::Delimited),
            StatementFormat::GenericCsv
        );
    }

    #[test]
    fn test_pdf_bank_sniffing() {
        assert_eq!(
            detect_format("EXTRACTO ING DIRECT", SourceHint::PdfText),
            StatementFormat::IngPdf
        );
        assert_eq!(
            detect_format("Banco Sabadell extracto", SourceHint::PdfText),
            StatementFormat::SabadellPdf
        );
        assert_eq!(
            detect_format("ACME BANK 2024", SourceHint::PdfText),
            StatementFormat::UnknownPdf
        );
    }

    #[test]
    fn test_extension_hint() {
        assert_eq!(SourceHint::from_filename("extracto.PDF"), SourceHint::PdfText);
        assert_eq!(SourceHint::from_filename("movimientos.csv"), SourceHint::Delimited);
        assert_eq!(SourceHint::from_filename("export.xlsx"), SourceHint::Delimited);
    }
}
