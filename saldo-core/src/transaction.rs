//! Canonical transaction entity shared by ingestion and forecasting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Money direction. Amounts are stored unsigned; the sign lives here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxnType {
    Income,
    Expense,
}

/// A persisted transaction row (bank-agnostic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: NaiveDate,
    /// Cleaned description (card masks and location suffixes stripped).
    pub description: String,
    /// Always >= 0; direction is carried by `txn_type`.
    pub amount: f64,
    #[serde(rename = "type")]
    pub txn_type: TxnType,
    pub category: String,
    /// Owned by the external account registry.
    #[serde(default)]
    pub account_id: Option<i64>,
    /// False excludes the row from budget and forecast totals
    /// (transfers, manual exclusions).
    #[serde(default = "default_computable")]
    pub computable: bool,
    #[serde(default)]
    pub source_bank: String,
}

fn default_computable() -> bool {
    true
}

impl Transaction {
    /// Amount with its sign restored (income positive, expense negative).
    pub fn signed_amount(&self) -> f64 {
        match self.txn_type {
            TxnType::Income => self.amount,
            TxnType::Expense => -self.amount,
        }
    }

    /// True when the row counts toward spending totals.
    pub fn counts_as_expense(&self) -> bool {
        self.computable && self.txn_type == TxnType::Expense
    }
}
