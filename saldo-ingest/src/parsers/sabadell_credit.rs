//! Banco Sabadell credit-card statements.
//!
//! Account metadata sits in labeled fields scattered around the document.
//! Transactions live between a `MOVIMIENTOS DE CREDITO` marker and the
//! first settlement marker, one row per line, with day/month dates only.
//! The caller supplies the statement year.
//!
//! Statement amounts are charges (positive means money spent), so rows are
//! emitted with the sign flipped to match the signed bank convention used
//! everywhere else. Negative statement rows are refunds and come out as
//! inflows.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use saldo_core::amounts::parse_amount;

use crate::parsers::split_fields;
use crate::types::{CreditCardMeta, ParsedStatement, RawLineItem, StatementKind};

pub fn parse(text: &str, statement_year: i32) -> Result<ParsedStatement> {
    let day_month_re = Regex::new(r"^\d{1,2}/\d{1,2}$")?;
    let numeric_re = Regex::new(r"^-?[\d.,]+$")?;

    let mut out = ParsedStatement::new("Sabadell", StatementKind::CreditCard);
    out.credit_card_meta = Some(scan_meta(text)?);

    let mut in_section = false;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.contains("MOVIMIENTOS DE CREDITO") {
            in_section = true;
            continue;
        }
        if line.contains("Saldo aplazado anterior")
            || line.contains("IMPORTE TOTAL A LIQUIDAR")
            || line.contains("MOVIMIENTOS DE DEBITO")
        {
            in_section = false;
            continue;
        }
        if !in_section {
            continue;
        }
        if line.contains("FECHA") && line.contains("CONCEPTO") {
            continue;
        }
        if line.contains("TOTAL OPERACIONES")
            || line.contains("Total operaciones")
            || line.contains("Importe total")
        {
            continue;
        }

        let fields = split_fields(line);
        if fields.len() < 4 || !day_month_re.is_match(&fields[0]) {
            continue;
        }
        let concept = fields[1].as_str();
        let location = fields[2].as_str();

        // The amount is the numeric field sitting right before an EUR
        // marker, or in the second-to-last slot when the marker is missing.
        let mut amount = None;
        for j in 3..fields.len() {
            if !numeric_re.is_match(&fields[j]) {
                continue;
            }
            let next_has_eur = fields.get(j + 1).map(|f| f.contains("EUR")).unwrap_or(false);
            if next_has_eur || j + 2 == fields.len() {
                amount = Some(parse_amount(&fields[j]));
                break;
            }
        }
        let Some(amount) = amount else {
            out.stats.skipped_lines += 1;
            continue;
        };
        if concept.is_empty() || amount == 0.0 {
            out.stats.skipped_lines += 1;
            continue;
        }
        let Some(date) = parse_day_month(&fields[0], statement_year) else {
            out.stats.skipped_lines += 1;
            continue;
        };

        let description = if location.is_empty() {
            concept.to_string()
        } else {
            format!("{concept} - {location}")
        };
        out.items.push(RawLineItem::new(date, description, -amount));
    }

    Ok(out)
}

fn parse_day_month(s: &str, year: i32) -> Option<NaiveDate> {
    let mut parts = s.split('/');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn scan_meta(text: &str) -> Result<CreditCardMeta> {
    let mut meta = CreditCardMeta::default();

    let limit_re = Regex::new(r#"Límite de crédito[,\s]+"?([\d.,]+)\s*EUR"#)?;
    if let Some(caps) = limit_re.captures(text) {
        meta.credit_limit = Some(parse_amount(&caps[1]));
    }
    let debt_re = Regex::new(r#"Saldo dispuesto:[,\s]+"?([\d.,]+)\s*EUR"#)?;
    if let Some(caps) = debt_re.captures(text) {
        meta.current_debt = Some(parse_amount(&caps[1]));
    }
    let available_re = Regex::new(r#"Saldo disponible:[,\s]+"?([\d.,]+)\s*EUR"#)?;
    if let Some(caps) = available_re.captures(text) {
        meta.available_credit = Some(parse_amount(&caps[1]));
    }
    let monthly_re = Regex::new(r"Fijo mensual de ([\d.,]+)\s*EUR")?;
    if let Some(caps) = monthly_re.captures(text) {
        meta.monthly_payment = Some(parse_amount(&caps[1]));
    }
    let contract_re = Regex::new(r"Contrato[,\s]+(\d+)")?;
    if let Some(caps) = contract_re.captures(text) {
        meta.contract_number = Some(caps[1].to_string());
    }
    let card_type_re = Regex::new(r"VISA[^\n,]*")?;
    if let Some(m) = card_type_re.find(text) {
        meta.card_type = Some(m.as_str().trim().to_string());
    }
    // Card numbers print masked, e.g. 5402________4016.
    let card_re = Regex::new(r"Tarjeta:[,\s]*([\d_]+)")?;
    if let Some(caps) = card_re.captures(text) {
        let number = &caps[1];
        let trailing_digits = number.chars().rev().take_while(|c| c.is_ascii_digit()).count();
        if trailing_digits >= 4 {
            meta.card_last4 = Some(format!("*{}", &number[number.len() - 4..]));
        }
    }
    Ok(meta)
}
