//! Exact-duplicate detection at insert time.
//!
//! A candidate is a duplicate when its (date, description, amount, type)
//! tuple matches a persisted row in the same account scope, or an earlier
//! row in the same batch. Duplicates are skipped and counted, never merged.

use std::collections::HashSet;

use chrono::NaiveDate;
use saldo_core::{Transaction, TxnType};

#[derive(Debug, Default, PartialEq)]
pub struct DedupeOutcome {
    pub inserted: Vec<Transaction>,
    pub skipped_duplicates: u32,
}

fn key(t: &Transaction) -> (NaiveDate, String, u64, TxnType) {
    // Amounts compare on exact bits; parsed values that print the same
    // parse the same.
    (t.date, t.description.clone(), t.amount.to_bits(), t.txn_type)
}

pub fn filter_duplicates(existing: &[Transaction], candidates: Vec<Transaction>) -> DedupeOutcome {
    let mut seen: HashSet<_> = existing.iter().map(key).collect();
    let mut outcome = DedupeOutcome::default();
    for candidate in candidates {
        if seen.insert(key(&candidate)) {
            outcome.inserted.push(candidate);
        } else {
            outcome.skipped_duplicates += 1;
        }
    }
    outcome
}
