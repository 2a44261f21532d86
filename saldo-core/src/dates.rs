//! Day-first date parsing and timezone-aware "today".
//!
//! All supported banks are European, so day-first is a fixed assumption
//! rather than something sniffed per file.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

/// Parse `DD/MM/YYYY`, `DD-MM-YYYY`, `DD.MM.YY` or ISO `YYYY-MM-DD`.
///
/// Two-digit years expand with a `20` prefix. Returns `None` for anything
/// that does not split into three numeric parts or names an impossible
/// date; callers that substitute "today" must count the substitution as a
/// parse anomaly.
pub fn try_parse_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.trim().split(['-', '/', '.']).collect();
    if parts.len() != 3 {
        return None;
    }

    // A four-digit first part is ISO year-first; everything else is day-first.
    let (d, m, y) = if parts[0].len() == 4 {
        (parts[2], parts[1], parts[0])
    } else {
        (parts[0], parts[1], parts[2])
    };

    let day: u32 = d.trim().parse().ok()?;
    let month: u32 = m.trim().parse().ok()?;
    let mut year: i32 = y.trim().parse().ok()?;
    if y.trim().len() == 2 {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Current calendar date in an IANA timezone like "Europe/Madrid".
pub fn today_in_tz(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}
