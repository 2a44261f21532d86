//! Safe-to-spend arithmetic: how much of the balance is really free once
//! pending recurring payments and a safety buffer are set aside, and
//! whether a given purchase fits.

use serde::Serialize;

use crate::stats::round2;

pub const DEFAULT_SAFETY_BUFFER_PCT: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableToSpend {
    pub current_balance: f64,
    pub pending_payments: f64,
    pub safety_buffer: f64,
    pub safety_buffer_pct: f64,
    pub days_remaining: u32,
    /// Balance minus pending payments and buffer, floored at zero.
    pub total_available: f64,
    pub daily_recommended: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Affordability {
    pub requested_amount: f64,
    pub can_afford: bool,
    pub available: f64,
    pub remaining_after: f64,
    /// How much is missing when the purchase does not fit; 0 otherwise.
    pub shortfall: f64,
    pub daily_budget_after: f64,
}

pub fn available_to_spend(
    current_balance: f64,
    pending_payments: f64,
    safety_buffer_pct: f64,
    days_remaining: u32,
) -> AvailableToSpend {
    let safety_buffer = round2(current_balance * safety_buffer_pct / 100.0);
    let total_available = round2((current_balance - pending_payments - safety_buffer).max(0.0));
    AvailableToSpend {
        current_balance,
        pending_payments,
        safety_buffer,
        safety_buffer_pct,
        days_remaining,
        total_available,
        daily_recommended: per_day(total_available, days_remaining),
    }
}

pub fn check_affordability(available: &AvailableToSpend, amount: f64) -> Affordability {
    let remaining = available.total_available - amount;
    let remaining_after = round2(remaining.max(0.0));
    Affordability {
        requested_amount: amount,
        can_afford: available.total_available >= amount,
        available: available.total_available,
        remaining_after,
        shortfall: round2((-remaining).max(0.0)),
        daily_budget_after: per_day(remaining_after, available.days_remaining),
    }
}

fn per_day(amount: f64, days_remaining: u32) -> f64 {
    if days_remaining > 0 {
        round2(amount / f64::from(days_remaining))
    } else {
        amount
    }
}
