//! ING Spain account-movements CSV.
//!
//! The export shuffles its columns between app versions, so they are
//! resolved by header name rather than position. The account number sits
//! in the preamble above the header, and the bank's own CATEGORÍA column
//! is mapped onto the shared taxonomy where a sensible equivalent exists.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use saldo_core::amounts::try_parse_amount;
use saldo_core::dates::try_parse_date;
use saldo_core::TRANSFER_CATEGORY;

use crate::types::{ParsedStatement, RawLineItem, StatementKind};

/// How deep into the file the preamble and header can sit.
const HEADER_SCAN_LINES: usize = 15;

pub fn parse(text: &str, today: NaiveDate) -> Result<ParsedStatement> {
    let account_re = Regex::new(r"Número de cuenta:\s*([\d\s]+)")?;

    let mut out = ParsedStatement::new("ING", StatementKind::BankAccount);
    let lines: Vec<&str> = text.lines().collect();

    let mut header_idx = None;
    for (i, line) in lines.iter().take(HEADER_SCAN_LINES).enumerate() {
        if out.account_number.is_none() {
            if let Some(caps) = account_re.captures(line) {
                let digits: String = caps[1].split_whitespace().collect();
                if !digits.is_empty() {
                    out.account_number = Some(digits);
                }
            }
        }
        let lower = line.to_lowercase();
        if lower.contains("f. valor") && lower.contains("categoría") && lower.contains("importe") {
            header_idx = Some(i);
            break;
        }
    }
    let Some(header_idx) = header_idx else {
        return Ok(out);
    };

    let header_line = lines[header_idx];
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };
    let headers: Vec<String> = header_line
        .split(delimiter as char)
        .map(|h| h.trim().trim_matches('"').to_string())
        .collect();

    let date_col = find_column(&headers, &["f. valor", "fecha", "f.operativa"]);
    let category_col = find_column(&headers, &["categoría", "categoria"]);
    let description_col = find_column(&headers, &["descripción", "descripcion", "concepto"]);
    let amount_col = find_column(&headers, &["importe", "amount", "cantidad"]);
    let balance_col = find_column(&headers, &["saldo", "balance"]);

    let (Some(date_col), Some(amount_col)) = (date_col, amount_col) else {
        return Ok(out);
    };

    let data = lines[header_idx + 1..].join("\n");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(data.as_bytes());

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(_) => {
                out.stats.skipped_lines += 1;
                continue;
            }
        };

        let date_raw = record.get(date_col).unwrap_or("").trim();
        let amount_raw = record.get(amount_col).unwrap_or("").trim();
        if date_raw.is_empty() || amount_raw.is_empty() {
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
        if out.last_balance.is_none() {
            if let Some(balance) = balance_col
                .and_then(|c| record.get(c))
                .and_then(try_parse_amount)
            {
                out.last_balance = Some(balance);
            }
        }

        let description = description_col
            .and_then(|c| record.get(c))
            .map(str::trim)
            .filter(|d| !d.is_empty());
        let description = match description {
            Some(d) => d.to_string(),
            None => format!("Transaction {date_raw}"),
        };

        let mut item = RawLineItem::new(date, description, amount);
        item.balance = balance_col.and_then(|c| record.get(c)).and_then(try_parse_amount);
        item.source_category = category_col
            .and_then(|c| record.get(c))
            .and_then(map_ing_category)
            .map(String::from);
        out.items.push(item);
    }

    Ok(out)
}

fn find_column(headers: &[String], needles: &[&str]) -> Option<usize> {
    headers.iter().position(|h| {
        let lower = h.to_lowercase();
        needles.iter().any(|needle| lower.contains(needle))
    })
}

/// ING category names onto the shared taxonomy. Unmapped names fall through
/// to the description rules downstream.
fn map_ing_category(raw: &str) -> Option<&'static str> {
    let lower = raw.to_lowercase();
    if lower.contains("alimentación") || lower.contains("supermercado") {
        Some("Supermercado")
    } else if lower.contains("vehículo") || lower.contains("transporte") {
        Some("Transportes")
    } else if lower.contains("hogar") {
        Some("Hogar")
    } else if lower.contains("compras") {
        Some("Otras compras")
    } else if lower.contains("ocio") || lower.contains("viajes") {
        Some("Entretenimiento")
    } else if lower.contains("ingresos") {
        Some("Ingresos")
    } else if lower.contains("transferencia") {
        Some(TRANSFER_CATEGORY)
    } else {
        None
    }
}
