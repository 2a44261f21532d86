//! Recurring-payment detection.
//!
//! Prior months' computable expenses are grouped by a normalized
//! description signature plus category. A group that shows up in at least
//! two distinct months inside the lookback window is treated as a monthly
//! recurring payment; its expected day and amount are the medians of the
//! historical occurrences.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use saldo_core::Transaction;

use crate::stats::{median, round2, sample_stddev};

pub const DEFAULT_LOOKBACK_MONTHS: u32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpense {
    /// Most recent raw description seen for the group.
    pub description: String,
    pub category: String,
    /// Day of month the payment usually lands on.
    pub expected_day: u32,
    pub estimated_amount: f64,
    /// 0-100, grows with occurrences and stability.
    pub confidence: u32,
    pub months_appeared: u32,
}

/// Collapses a raw bank description into a grouping signature: uppercase,
/// separators to spaces, numeric tokens dropped (receipt and invoice
/// numbers change every month), first three words kept.
pub fn signature(description: &str) -> String {
    description
        .to_uppercase()
        .replace(['*', '#'], " ")
        .split_whitespace()
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .take(3)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn month_index(date: NaiveDate) -> i32 {
    date.year() * 12 + date.month0() as i32
}

pub fn detect_recurring(
    history: &[Transaction],
    today: NaiveDate,
    lookback_months: u32,
) -> Vec<RecurringExpense> {
    let current = month_index(today);
    let window_start = current - lookback_months as i32;

    let mut groups: HashMap<(String, String), Vec<&Transaction>> = HashMap::new();
    for t in history {
        if !t.counts_as_expense() {
            continue;
        }
        let month = month_index(t.date);
        if month < window_start || month >= current {
            continue;
        }
        groups
            .entry((signature(&t.description), t.category.clone()))
            .or_default()
            .push(t);
    }

    let mut out = Vec::new();
    for ((_, category), txns) in groups {
        let months: HashSet<i32> = txns.iter().map(|t| month_index(t.date)).collect();
        let months_appeared = months.len() as u32;
        if months_appeared < 2 {
            continue;
        }

        let amounts: Vec<f64> = txns.iter().map(|t| t.amount).collect();
        let days: Vec<f64> = txns.iter().map(|t| f64::from(t.date.day())).collect();
        let mean_amount = amounts.iter().sum::<f64>() / amounts.len() as f64;

        let mut confidence = months_appeared * 25;
        if sample_stddev(&amounts) < mean_amount * 0.1 {
            confidence += 20;
        }
        if sample_stddev(&days) < 3.0 {
            confidence += 15;
        }

        let description = txns
            .iter()
            .max_by_key(|t| t.date)
            .map(|t| t.description.clone())
            .unwrap_or_default();

        out.push(RecurringExpense {
            description,
            category,
            expected_day: median(&days).round() as u32,
            estimated_amount: round2(median(&amounts)),
            confidence: confidence.min(100),
            months_appeared,
        });
    }

    out.sort_by(|a, b| {
        a.expected_day
            .cmp(&b.expected_day)
            .then_with(|| a.description.cmp(&b.description))
    });
    out
}

/// Recurring payments still ahead of `today`: expected later this month
/// and with no matching charge in the current month yet.
pub fn pending_recurring(
    all: &[RecurringExpense],
    history: &[Transaction],
    today: NaiveDate,
) -> Vec<RecurringExpense> {
    let current = month_index(today);
    let seen_this_month: HashSet<(String, String)> = history
        .iter()
        .filter(|t| t.counts_as_expense() && month_index(t.date) == current)
        .map(|t| (signature(&t.description), t.category.clone()))
        .collect();

    all.iter()
        .filter(|r| r.expected_day > today.day())
        .filter(|r| !seen_this_month.contains(&(signature(&r.description), r.category.clone())))
        .cloned()
        .collect()
}
