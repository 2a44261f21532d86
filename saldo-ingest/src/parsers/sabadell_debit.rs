//! Banco Sabadell checking-account exports.
//!
//! Two layouts ship under the same bank: the comma CSV download
//! (`F. Operativa,Concepto,F. Valor,Importe,Saldo,...`) and the tab table
//! pasted out of the web app (`Fecha  Descripción  Importe  Saldo`). Both
//! list rows newest first, so the first data row carries the freshest
//! running balance.

use anyhow::Result;
use chrono::NaiveDate;
use regex::Regex;

use saldo_core::amounts::try_parse_amount;
use saldo_core::dates::try_parse_date;

use crate::parsers::split_fields;
use crate::types::{ParsedStatement, RawLineItem, StatementKind};

pub fn parse(text: &str, today: NaiveDate) -> Result<ParsedStatement> {
    let account_re = Regex::new(r"ES\d{2}(?:\s*\d{4}){5}")?;
    let card_mask_re = Regex::new(r"\d{4}X+\d{4}")?;
    let trailing_location_re = Regex::new(r"(?i)-[A-Z\s]+$")?;

    let mut out = ParsedStatement::new("Sabadell", StatementKind::BankAccount);
    let lines: Vec<&str> = text.lines().collect();

    let mut header_idx = None;
    for (i, line) in lines.iter().enumerate() {
        if out.account_number.is_none() && line.contains("Cuenta:") {
            if let Some(m) = account_re.find(line) {
                out.account_number = Some(m.as_str().split_whitespace().collect());
            }
        }
        if line.contains("F. Operativa") && line.contains("Concepto") {
            header_idx = Some(i);
            break;
        }
        if line.contains("Fecha") && line.contains("Descripción") && line.contains("Importe") {
            header_idx = Some(i);
            break;
        }
    }
    let Some(header_idx) = header_idx else {
        return Ok(out);
    };
    let tab_layout = lines[header_idx].contains("Fecha");

    for line in &lines[header_idx + 1..] {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields = split_fields(line);

        if tab_layout {
            // Fecha, Descripción, Importe, Saldo
            if fields.len() < 3 {
                continue;
            }
            let description = fields[1].as_str();
            // Category tag rows the web app interleaves with transactions.
            if description == "Devolver" || description == "Ahorrar una parte" || description.len() < 3 {
                continue;
            }
            let Some(amount) = try_parse_amount(&fields[2]).filter(|a| *a != 0.0) else {
                out.stats.skipped_lines += 1;
                continue;
            };
            if fields[0].is_empty() {
                out.stats.skipped_lines += 1;
                continue;
            }
            let date = match try_parse_date(&fields[0]) {
                Some(d) => d,
                None => {
                    out.stats.date_fallbacks += 1;
                    today
                }
            };
            if out.last_balance.is_none() {
                if let Some(balance) = fields.get(3).and_then(|b| try_parse_amount(b)) {
                    out.last_balance = Some(balance);
                }
            }
            let mut item = RawLineItem::new(date, description, amount);
            item.balance = fields.get(3).and_then(|b| try_parse_amount(b));
            out.items.push(item);
        } else {
            // F. Operativa, Concepto, F. Valor, Importe, Saldo
            if fields.len() < 4 {
                continue;
            }
            // Balance first, even off rows whose amount ends up rejected.
            if out.last_balance.is_none() {
                if let Some(balance) = fields.get(4).and_then(|b| try_parse_amount(b)) {
                    out.last_balance = Some(balance);
                }
            }
            if fields[0].is_empty() || fields[1].is_empty() || fields[3].is_empty() {
                out.stats.skipped_lines += 1;
                continue;
            }
            let Some(amount) = try_parse_amount(&fields[3]).filter(|a| *a != 0.0) else {
                out.stats.skipped_lines += 1;
                continue;
            };
            let date = match try_parse_date(&fields[0]) {
                Some(d) => d,
                None => {
                    out.stats.date_fallbacks += 1;
                    today
                }
            };
            let description = clean_description(&fields[1], &card_mask_re, &trailing_location_re);
            let mut item = RawLineItem::new(date, description, amount);
            item.balance = fields.get(4).and_then(|b| try_parse_amount(b));
            out.items.push(item);
        }
    }

    // Balance capture assumes newest-first ordering; flag files that break it.
    if let (Some(first), Some(last)) = (out.items.first(), out.items.last()) {
        if first.date < last.date {
            out.stats.suspect_balance_order = true;
        }
    }

    Ok(out)
}

/// Strips card masks like `5402XXXXXXXX4016` and the trailing
/// `-LOCALIDAD` suffix Sabadell appends to card purchases.
fn clean_description(raw: &str, card_mask_re: &Regex, trailing_location_re: &Regex) -> String {
    let no_mask = card_mask_re.replace_all(raw, "");
    let no_location = trailing_location_re.replace(&no_mask, "");
    no_location.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const COMMA_EXPORT: &str = r#"Banco Sabadell
Cuenta: ES12 3456 7890 1234 5678 9012
F. Operativa,Concepto,F. Valor,Importe,Saldo,Referencia 1,Referencia 2
05/03/2024,COMPRA TARJ. 5402XXXXXXXX4016 MERCADONA-VILANOVA I LA,05/03/2024,"-45,67","1.234,56",1234,5678
04/03/2024,PAGO NOMINA EMPRESA SL,04/03/2024,"1.800,00","1.280,23",1234,5678
03/03/2024,RECIBO LUZ ENDESA,03/03/2024,"-60,10","-519,77",1234,5678
"#;

    #[test]
    fn test_comma_export() {
        let parsed = parse(COMMA_EXPORT, day(2024, 3, 20)).unwrap();
        assert_eq!(parsed.items.len(), 3);
        assert_eq!(parsed.items[0].date, day(2024, 3, 5));
        assert_eq!(parsed.items[0].amount, -45.67);
        assert_eq!(parsed.items[0].description, "COMPRA TARJ. MERCADONA");
        assert_eq!(parsed.items[1].amount, 1800.00);
        assert_eq!(parsed.items[2].description, "RECIBO LUZ ENDESA");
        assert_eq!(parsed.items[2].balance, Some(-519.77));
        assert_eq!(parsed.account_number.as_deref(), Some("ES1234567890123456789012"));
        assert!(!parsed.stats.suspect_balance_order);
    }

    #[test]
    fn test_balance_comes_from_first_row_only() {
        let parsed = parse(COMMA_EXPORT, day(2024, 3, 20)).unwrap();
        assert_eq!(parsed.last_balance, Some(1234.56));
    }

    #[test]
    fn test_oldest_first_file_is_flagged() {
        let reversed = r#"F. Operativa,Concepto,F. Valor,Importe,Saldo
03/03/2024,RECIBO LUZ ENDESA,03/03/2024,"-60,10","-519,77"
05/03/2024,COMPRA FARMACIA,05/03/2024,"-12,00","1.234,56"
"#;
        let parsed = parse(reversed, day(2024, 3, 20)).unwrap();
        assert!(parsed.stats.suspect_balance_order);
        // Still first-row capture, wrong or not; the flag is the signal.
        assert_eq!(parsed.last_balance, Some(-519.77));
    }

    #[test]
    fn test_tab_layout_skips_category_tag_rows() {
        let tab = "Fecha\tDescripción\tImporte\tSaldo\n\
05/03/2024\tBIZUM DE JUAN\t25,00\t500,00\n\
05/03/2024\tDevolver\t25,00\t500,00\n\
04/03/2024\tAhorrar una parte\t10,00\t475,00\n\
04/03/2024\tCOMPRA LIDL\t-31,40\t475,00\n";
        let parsed = parse(tab, day(2024, 3, 20)).unwrap();
        assert_eq!(parsed.items.len(), 2);
        assert_eq!(parsed.items[0].description, "BIZUM DE JUAN");
        assert_eq!(parsed.items[1].amount, -31.40);
        assert_eq!(parsed.last_balance, Some(500.00));
    }

    #[test]
    fn test_unparseable_date_falls_back_to_today() {
        let bad = r#"F. Operativa,Concepto,F. Valor,Importe,Saldo
pendiente,COMPRA GASOLINERA REPSOL,?,"-50,00","900,00"
"#;
        let today = day(2024, 3, 20);
        let parsed = parse(bad, today).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].date, today);
        assert_eq!(parsed.stats.date_fallbacks, 1);
    }

    #[test]
    fn test_zero_amount_rows_are_dropped() {
        let zero = r#"F. Operativa,Concepto,F. Valor,Importe,Saldo
05/03/2024,AJUSTE,05/03/2024,"0,00","100,00"
"#;
        let parsed = parse(zero, day(2024, 3, 20)).unwrap();
        assert!(parsed.items.is_empty());
        assert_eq!(parsed.stats.skipped_lines, 1);
    }
}
