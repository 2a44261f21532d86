//! saldo-forecast: recurring-payment detection, monthly spending forecast,
//! and safe-to-spend helpers over normalized transaction history.

pub mod afford;
pub mod engine;
pub mod recurring;
mod stats;

pub use afford::{
    Affordability, AvailableToSpend, DEFAULT_SAFETY_BUFFER_PCT, available_to_spend,
    check_affordability,
};
pub use engine::{
    BudgetEvaluation, DailyPoint, ForecastConfig, ForecastResult, SpendingForecast,
    build_forecast, confidence_score, days_in_month, evaluate_budget,
};
pub use recurring::{RecurringExpense, detect_recurring, pending_recurring};
