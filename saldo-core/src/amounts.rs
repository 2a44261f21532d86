//! Locale-aware amount parsing.
//!
//! Statement exports mix European ("1.234,56") and US ("1,234.56") number
//! formats, often with a currency symbol attached. Whichever separator sits
//! further right is the decimal point.

/// Parse an amount literal, returning `None` when nothing numeric remains.
pub fn try_parse_amount(raw: &str) -> Option<f64> {
    // Keep digits, signs and separators; drops currency symbols and spaces.
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | ','))
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let last_comma = cleaned.rfind(',').map(|i| i as i64).unwrap_or(-1);
    let last_dot = cleaned.rfind('.').map(|i| i as i64).unwrap_or(-1);

    let normalized = if last_comma > last_dot {
        // European: dots are thousands separators, comma is decimal.
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.replace(',', "")
    };

    normalized.parse::<f64>().ok()
}

/// Lenient variant: unparseable input becomes 0 so one bad field never
/// aborts a whole statement. Callers that must distinguish should use
/// [`try_parse_amount`].
pub fn parse_amount(raw: &str) -> f64 {
    try_parse_amount(raw).unwrap_or(0.0)
}
