//! Raw line items to canonical transactions.
//!
//! Type comes from an explicit type column when the source had one,
//! otherwise from the amount sign. Amounts are stored unsigned. Category
//! honors a source-resolved category first, then the rule table. Transfers
//! and manually marked rows are excluded from totals at insert time.

use saldo_core::{RuleSet, Transaction, TxnType, REFUND_CATEGORY, TRANSFER_CATEGORY};

use crate::types::{ParsedStatement, StatementKind};

/// Manual "no computable" marker; rows so tagged never join totals.
pub const NC_CATEGORY: &str = "NC";

pub fn normalize_statement(parsed: &ParsedStatement, rules: &RuleSet) -> Vec<Transaction> {
    parsed
        .items
        .iter()
        .map(|item| {
            let txn_type = item.explicit_type.unwrap_or(if item.amount > 0.0 {
                TxnType::Income
            } else {
                TxnType::Expense
            });

            // Money coming back on a credit card is a refund, whatever the
            // description says.
            let category = if parsed.kind == StatementKind::CreditCard && txn_type == TxnType::Income {
                REFUND_CATEGORY.to_string()
            } else if let Some(resolved) = item.source_category.as_deref() {
                resolved.to_string()
            } else {
                rules.classify(&item.description).to_string()
            };

            let computable = !excluded_from_totals(&category, &item.description);

            Transaction {
                date: item.date,
                description: item.description.clone(),
                amount: item.amount.abs(),
                txn_type,
                category,
                account_id: None,
                computable,
                source_bank: parsed.bank.clone(),
            }
        })
        .collect()
}

/// Transfers and manually excluded rows stay out of budget math from the
/// moment they land, before pair detection even runs.
fn excluded_from_totals(category: &str, description: &str) -> bool {
    category == TRANSFER_CATEGORY
        || category == NC_CATEGORY
        || description.to_lowercase().contains("transferencia")
}
