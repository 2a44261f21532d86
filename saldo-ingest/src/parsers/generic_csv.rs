//! Positional fallback for delimited files no bank signature claims.
//!
//! The first line is assumed to be a header. Wide rows read as
//! `bank, date, category, description, amount[, type]`, which round-trips
//! the app's own export; narrow rows read as `date, description, amount`.

use anyhow::Result;
use chrono::NaiveDate;

use saldo_core::amounts::try_parse_amount;
use saldo_core::dates::try_parse_date;
use saldo_core::TxnType;

use crate::types::{ParsedStatement, RawLineItem, StatementKind};

pub fn parse(text: &str, today: NaiveDate) -> Result<ParsedStatement> {
    let mut out = ParsedStatement::new("CSV Import", StatementKind::BankAccount);

    let first_line_has_tabs = text.lines().next().map(|l| l.contains('\t')).unwrap_or(false);
    let delimiter = if first_line_has_tabs { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(text.as_bytes());

    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(_) => {
                out.stats.skipped_lines += 1;
                continue;
            }
        };
        if index == 0 {
            continue;
        }

        let fields: Vec<&str> = record.iter().map(str::trim).collect();
        let (date_raw, category, description, amount_raw, type_raw) = if fields.len() >= 5 {
            (fields[1], fields[2], fields[3], fields[4], fields.get(5).copied().unwrap_or(""))
        } else if fields.len() >= 3 {
            (fields[0], "", fields[1], fields[2], "")
        } else {
            continue;
        };

        if date_raw.is_empty() || description.is_empty() || amount_raw.is_empty() {
            out.stats.skipped_lines += 1;
            continue;
        }
        let Some(amount) = try_parse_amount(amount_raw).filter(|a| *a != 0.0) else {
            out.stats.skipped_lines += 1;
            continue;
        };
        let date = match try_parse_date(date_raw) {
            Some(d) => d,
            None => {
                out.stats.date_fallbacks += 1;
                today
            }
        };

        let mut item = RawLineItem::new(date, description, amount);
        if !category.is_empty() {
            item.source_category = Some(category.to_string());
        }
        item.explicit_type = match type_raw.to_lowercase().as_str() {
            "income" => Some(TxnType::Income),
            "expense" => Some(TxnType::Expense),
            _ => None,
        };
        out.items.push(item);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_wide_rows_keep_category_and_type() {
        let text = r#"Bank,Date,Category,Description,Amount,Type
Sabadell,05/03/2024,Gasolina,REPSOL AUTOPISTA,45.20,expense
Sabadell,04/03/2024,,INGRESO EXTRA,100.00,income
"#;
        let parsed = parse(text, day(2024, 3, 20)).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].source_category.as_deref(), Some("Gasolina"));
        assert_eq!(parsed.items[0].explicit_type, Some(TxnType::Expense));
        assert_eq!(parsed.items[1].source_category, None);
        assert_eq!(parsed.items[1].explicit_type, Some(TxnType::Income));
    }

    #[test]
    fn test_narrow_rows_parse_without_type() {
        let text = "Date,Description,Amount\n05/03/2024,COMPRA MERCADONA,\"-45,67\"\n";
        let parsed = parse(text, day(2024, 3, 20)).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].description, "COMPRA MERCADONA");
        assert_eq!(parsed.items[0].amount, -45.67);
        assert_eq!(parsed.items[0].explicit_type, None);
    }

    #[test]
    fn test_tab_separated_paste_parses() {
        let text = "Date\tDescription\tAmount\n05/03/2024\tCOMPRA LIDL\t-31,40\n";
        let parsed = parse(text, day(2024, 3, 20)).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].amount, -31.40);
    }

    #[test]
    fn test_header_and_malformed_rows_are_dropped() {
        let text = "Date,Description,Amount\nsolo dos,campos\n05/03/2024,,10.00\n05/03/2024,ALGO,cero\n";
        let parsed = parse(text, day(2024, 3, 20)).unwrap();
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.stats.skipped_lines, 2);
    }
}
