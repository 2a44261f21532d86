//! Line-oriented parser for PDF statement text.
//!
//! Serves ING and Sabadell PDFs and is the last-resort fallback for
//! unrecognized documents. Each line with a date pattern is a transaction
//! candidate; the last amount on the line is taken as the transaction
//! amount, because statements often print the running balance after it.

use anyhow::Result;
use regex::Regex;
use saldo_core::amounts::parse_amount;
use saldo_core::dates::try_parse_date;

use crate::types::{ParsedStatement, RawLineItem, StatementKind};

pub fn parse_lines(text: &str, bank: &str) -> Result<ParsedStatement> {
    let date_re = Regex::new(r"\d{1,2}[-/]\d{1,2}[-/]\d{4}")?;
    let amount_re = Regex::new(r"[-+]?\d{1,3}(?:[.,]\d{3})*[.,]\d{2}|[-+]?\d+[.,]\d{2}")?;

    let mut out = ParsedStatement::new(bank, StatementKind::BankAccount);

    for line in text.lines() {
        let line = line.trim();
        let Some(date_match) = date_re.find(line) else {
            continue;
        };
        let Some(date) = try_parse_date(date_match.as_str()) else {
            out.stats.skipped_lines += 1;
            continue;
        };

        let Some(amount_match) = amount_re.find_iter(line).last() else {
            out.stats.skipped_lines += 1;
            continue;
        };
        let amount = parse_amount(amount_match.as_str());
        if amount == 0.0 {
            out.stats.skipped_lines += 1;
            continue;
        }

        // Description is whatever remains once dates and amounts go.
        let without_dates = date_re.replace_all(line, " ");
        let without_amounts = amount_re.replace_all(&without_dates, " ");
        let description = without_amounts
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if description.len() < 3 {
            out.stats.skipped_lines += 1;
            continue;
        }

        out.items.push(RawLineItem::new(date, description, amount));
    }

    Ok(out)
}
