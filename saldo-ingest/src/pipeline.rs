//! One-call ingestion: detect the format, run its parser, normalize.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use saldo_core::{RuleSet, Transaction};

use crate::detect::{detect_format, SourceHint, StatementFormat};
use crate::normalize::normalize_statement;
use crate::parsers;
use crate::types::{CreditCardMeta, ParseStats, ParsedStatement};

/// Everything the persistence layer needs from one uploaded document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    pub format: StatementFormat,
    pub bank: String,
    pub transactions: Vec<Transaction>,
    pub last_balance: Option<f64>,
    pub account_number: Option<String>,
    pub credit_card_meta: Option<CreditCardMeta>,
    pub stats: ParseStats,
}

/// Runs the whole read side for one document. `filename` only picks the
/// detection branch; `today` anchors date fallbacks and the statement year
/// for credit-card rows.
pub fn ingest(text: &str, filename: &str, rules: &RuleSet, today: NaiveDate) -> Result<IngestResult> {
    let hint = SourceHint::from_filename(filename);
    let format = detect_format(text, hint);

    let parsed: ParsedStatement = match format {
        StatementFormat::SabadellCreditCard => parsers::sabadell_credit::parse(text, today.year())?,
        StatementFormat::SabadellDebit => parsers::sabadell_debit::parse(text, today)?,
        StatementFormat::IngCsv => parsers::ing_csv::parse(text, today)?,
        StatementFormat::GenericCsv => parsers::generic_csv::parse(text, today)?,
        StatementFormat::IngPdf => parsers::generic_line::parse_lines(text, "ING")?,
        StatementFormat::SabadellPdf => parsers::generic_line::parse_lines(text, "Sabadell")?,
        StatementFormat::UnknownPdf => parsers::generic_line::parse_lines(text, "Unknown")?,
    };

    let transactions = normalize_statement(&parsed, rules);

    Ok(IngestResult {
        format,
        bank: parsed.bank,
        transactions,
        last_balance: parsed.last_balance,
        account_number: parsed.account_number,
        credit_card_meta: parsed.credit_card_meta,
        stats: parsed.stats,
    })
}
