use chrono::NaiveDate;
use saldo_core::TxnType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    CreditCard,
    BankAccount,
}

/// Raw parser output, before normalization. Discarded after one parse call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLineItem {
    pub date: NaiveDate,
    pub description: String,
    /// Signed, bank convention: positive inflow, negative outflow.
    pub amount: f64,
    /// Running balance, on formats that print one.
    pub balance: Option<f64>,
    /// Category already resolved by the source format; used as-is instead
    /// of running the rule table.
    pub source_category: Option<String>,
    /// Explicit income/expense column, where the export has one; otherwise
    /// the sign of `amount` decides.
    pub explicit_type: Option<TxnType>,
}

impl RawLineItem {
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: f64) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            balance: None,
            source_category: None,
            explicit_type: None,
        }
    }
}

/// Account-level fields scraped from a credit-card statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardMeta {
    pub credit_limit: Option<f64>,
    pub current_debt: Option<f64>,
    pub available_credit: Option<f64>,
    pub monthly_payment: Option<f64>,
    /// Masked, like "*4016".
    pub card_last4: Option<String>,
    /// Card label as printed, like "VISA CLASSIC".
    pub card_type: Option<String>,
    pub contract_number: Option<String>,
}

impl CreditCardMeta {
    /// Account balance implied by the statement: debt shows as negative.
    pub fn balance(&self) -> Option<f64> {
        self.current_debt.map(|debt| -debt)
    }

    /// Display name, like "VISA CLASSIC *4016".
    pub fn card_name(&self) -> String {
        let label = self.card_type.as_deref().unwrap_or("Credit Card");
        match self.card_last4.as_deref() {
            Some(last4) => format!("{label} {last4}"),
            None => label.to_string(),
        }
    }
}

/// Per-parse soft-anomaly counters. Silent defaults can mask data loss, so
/// every substitution and skip is counted and surfaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseStats {
    /// Rows whose date field failed to parse and got "today" instead.
    pub date_fallbacks: u32,
    /// Candidate rows dropped for bad amounts, short descriptions or
    /// malformed fields.
    pub skipped_lines: u32,
    /// Set when row dates run oldest-first, which breaks the
    /// first-row-balance capture assumption.
    pub suspect_balance_order: bool,
}

/// What one statement parser extracted from a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedStatement {
    pub bank: String,
    pub kind: StatementKind,
    pub items: Vec<RawLineItem>,
    /// Balance of the newest row, captured once.
    pub last_balance: Option<f64>,
    /// IBAN-like account number scraped from the preamble, when present.
    pub account_number: Option<String>,
    pub credit_card_meta: Option<CreditCardMeta>,
    pub stats: ParseStats,
}

impl ParsedStatement {
    pub fn new(bank: impl Into<String>, kind: StatementKind) -> Self {
        Self {
            bank: bank.into(),
            kind,
            items: Vec::new(),
            last_balance: None,
            account_number: None,
            credit_card_meta: None,
            stats: ParseStats::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_name_variants() {
        let meta = CreditCardMeta {
            card_type: Some("VISA CLASSIC".to_string()),
            card_last4: Some("*4016".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.card_name(), "VISA CLASSIC *4016");

        let bare = CreditCardMeta::default();
        assert_eq!(bare.card_name(), "Credit Card");
    }

    #[test]
    fn test_debt_is_negative_balance() {
        let meta = CreditCardMeta {
            current_debt: Some(432.10),
            ..Default::default()
        };
        assert_eq!(meta.balance(), Some(-432.10));
    }
}
