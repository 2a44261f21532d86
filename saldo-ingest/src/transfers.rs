//! Same-day opposite-direction pair detection.
//!
//! Two rows on the same date with matching amounts (under a cent apart)
//! and opposite types look like money moving between own accounts.
//! When both sides are already categorized as transfers the pair is
//! confirmed and excluded from totals automatically; otherwise it is only
//! surfaced for review.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use saldo_core::{Transaction, TRANSFER_CATEGORY};

const AMOUNT_TOLERANCE: f64 = 0.01;

/// Indices refer to the slice handed to [`detect_transfers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPair {
    pub date: NaiveDate,
    pub amount: f64,
    pub first: usize,
    pub second: usize,
}

#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReport {
    /// Both sides already categorized as transfers; safe to exclude.
    pub confirmed: Vec<TransferPair>,
    /// Same shape, but at least one side categorized as something else.
    pub potential: Vec<TransferPair>,
}

pub fn detect_transfers(transactions: &[Transaction]) -> TransferReport {
    let mut by_date: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
    for (i, t) in transactions.iter().enumerate() {
        by_date.entry(t.date).or_default().push(i);
    }
    let mut dates: Vec<NaiveDate> = by_date.keys().copied().collect();
    dates.sort();

    let mut report = TransferReport::default();
    let mut paired: HashSet<usize> = HashSet::new();
    for date in dates {
        let indices = &by_date[&date];
        for (pos, &a) in indices.iter().enumerate() {
            for &b in &indices[pos + 1..] {
                if paired.contains(&a) || paired.contains(&b) {
                    continue;
                }
                let (t1, t2) = (&transactions[a], &transactions[b]);
                if t1.txn_type == t2.txn_type || (t1.amount - t2.amount).abs() >= AMOUNT_TOLERANCE {
                    continue;
                }
                let pair = TransferPair { date, amount: t1.amount, first: a, second: b };
                if t1.category == TRANSFER_CATEGORY && t2.category == TRANSFER_CATEGORY {
                    paired.insert(a);
                    paired.insert(b);
                    report.confirmed.push(pair);
                } else {
                    report.potential.push(pair);
                }
            }
        }
    }
    report
}

/// Flags both sides of every confirmed pair as non-computable.
pub fn apply_confirmed(transactions: &mut [Transaction], report: &TransferReport) {
    for pair in &report.confirmed {
        for index in [pair.first, pair.second] {
            if let Some(t) = transactions.get_mut(index) {
                t.computable = false;
            }
        }
    }
}
