//! Month forecast: daily cumulative projection with a confidence band,
//! budget evaluation and the headline "free to spend" number.
//!
//! Recomputed from full history on every call; nothing is cached between
//! invocations. Missing optional inputs (no budget, thin history) degrade
//! individual fields to zeros and empty lists; only the configured
//! minimum-months gate withholds the forecast entirely.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use saldo_core::Transaction;

use crate::recurring::{detect_recurring, month_index, pending_recurring, RecurringExpense};
use crate::stats::round2;

#[derive(Debug, Clone, Copy)]
pub struct ForecastConfig {
    /// Distinct prior months of spending history required to forecast.
    pub min_months_of_data: u32,
    /// Window for recurring-payment detection.
    pub recurring_lookback_months: u32,
    /// Window for the variable daily-rate estimate.
    pub variable_lookback_months: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            min_months_of_data: 2,
            recurring_lookback_months: crate::recurring::DEFAULT_LOOKBACK_MONTHS,
            variable_lookback_months: 3,
        }
    }
}

/// One day on the projection chart. Past days carry `actual`, future days
/// carry `predicted`/`predicted_high`; `prev_month1` is last month's
/// same-day cumulative spend, present only on days that had data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyPoint {
    pub day: u32,
    pub actual: Option<f64>,
    pub predicted: Option<f64>,
    pub predicted_high: Option<f64>,
    pub prev_month1: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetEvaluation {
    pub projected_total_spend: f64,
    pub projected_overspend: f64,
    pub will_exceed_budget: bool,
    /// Whole percent of budget already spent; 0 when no budget is set.
    pub budget_progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub confidence: u32,
    pub months_of_data: u32,
    pub day_of_month: u32,
    pub days_in_month: u32,
    pub days_remaining: u32,
    pub current_balance: f64,
    pub spent_so_far: f64,
    pub monthly_budget: f64,
    pub estimated_variable_spending: f64,
    pub total_predicted_remaining: f64,
    pub projected_total_spend: f64,
    pub projected_overspend: f64,
    pub will_exceed_budget: bool,
    pub budget_progress: f64,
    /// Balance minus everything still expected this month; negative means
    /// the month is already underwater.
    pub free_to_spend: f64,
    pub daily_projection: Vec<DailyPoint>,
    pub pending_recurring: Vec<RecurringExpense>,
    pub pending_recurring_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SpendingForecast {
    /// Too little history to say anything useful; distinct from a
    /// zero-value forecast.
    #[serde(rename_all = "camelCase")]
    InsufficientData { months_of_data: u32, min_required: u32 },
    Ready(ForecastResult),
}

pub fn build_forecast(
    history: &[Transaction],
    today: NaiveDate,
    current_balance: f64,
    monthly_budget: f64,
    config: &ForecastConfig,
) -> SpendingForecast {
    let current_month = month_index(today);

    let prior_months: HashSet<i32> = history
        .iter()
        .filter(|t| t.counts_as_expense() && month_index(t.date) < current_month)
        .map(|t| month_index(t.date))
        .collect();
    let months_of_data = prior_months.len() as u32;
    if months_of_data < config.min_months_of_data {
        return SpendingForecast::InsufficientData {
            months_of_data,
            min_required: config.min_months_of_data,
        };
    }

    let day_of_month = today.day();
    let days_in_month = days_in_month(today);
    let days_remaining = days_in_month - day_of_month;

    let spent_so_far = round2(
        history
            .iter()
            .filter(|t| t.counts_as_expense() && month_index(t.date) == current_month)
            .map(|t| t.amount)
            .sum(),
    );

    let all_recurring = detect_recurring(history, today, config.recurring_lookback_months);
    let pending = pending_recurring(&all_recurring, history, today);
    let pending_total = round2(pending.iter().map(|r| r.estimated_amount).sum());

    let estimated_variable = round2(estimate_variable_spending(
        history,
        today,
        days_remaining,
        config.variable_lookback_months,
    ));
    let total_predicted_remaining = round2(pending_total + estimated_variable);

    let budget = evaluate_budget(monthly_budget, spent_so_far, total_predicted_remaining);
    let confidence = confidence_score(months_of_data, all_recurring.len());

    let daily_projection = daily_projection(
        history,
        today,
        days_in_month,
        estimated_variable,
        &pending,
    );

    SpendingForecast::Ready(ForecastResult {
        confidence,
        months_of_data,
        day_of_month,
        days_in_month,
        days_remaining,
        current_balance,
        spent_so_far,
        monthly_budget,
        estimated_variable_spending: estimated_variable,
        total_predicted_remaining,
        projected_total_spend: budget.projected_total_spend,
        projected_overspend: budget.projected_overspend,
        will_exceed_budget: budget.will_exceed_budget,
        budget_progress: budget.budget_progress,
        free_to_spend: round2(current_balance - total_predicted_remaining),
        daily_projection,
        pending_recurring: pending,
        pending_recurring_total: pending_total,
    })
}

/// Budget arithmetic, shared with tests and callers that only have the
/// three aggregates.
pub fn evaluate_budget(
    monthly_budget: f64,
    spent_so_far: f64,
    total_predicted_remaining: f64,
) -> BudgetEvaluation {
    let projected_total_spend = round2(spent_so_far + total_predicted_remaining);
    let has_budget = monthly_budget > 0.0;
    let projected_overspend = if has_budget {
        round2((projected_total_spend - monthly_budget).max(0.0))
    } else {
        0.0
    };
    BudgetEvaluation {
        projected_total_spend,
        projected_overspend,
        will_exceed_budget: has_budget && projected_total_spend > monthly_budget,
        budget_progress: if has_budget {
            (100.0 * spent_so_far / monthly_budget).round()
        } else {
            0.0
        },
    }
}

/// 0-100 from months of history plus recurring coverage. Monotone
/// non-decreasing in months of history.
pub fn confidence_score(months_of_data: u32, recurring_count: usize) -> u32 {
    let mut confidence = (months_of_data * 15).min(40);
    confidence += (recurring_count as u32 * 5).min(30);
    confidence += 20;
    confidence.min(100)
}

/// Calendar length of the month `date` falls in.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // First of next month minus one day is always valid.
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(31)
}

/// Average spend of spending-days later in the month than today, over the
/// last few prior months, scaled to the days still remaining.
fn estimate_variable_spending(
    history: &[Transaction],
    today: NaiveDate,
    days_remaining: u32,
    lookback_months: u32,
) -> f64 {
    let current_month = month_index(today);
    let window_start = current_month - lookback_months as i32;

    let mut daily_totals: HashMap<NaiveDate, f64> = HashMap::new();
    for t in history {
        if !t.counts_as_expense() {
            continue;
        }
        let month = month_index(t.date);
        if month < window_start || month >= current_month {
            continue;
        }
        if t.date.day() <= today.day() {
            continue;
        }
        *daily_totals.entry(t.date).or_insert(0.0) += t.amount;
    }
    if daily_totals.is_empty() {
        return 0.0;
    }
    let avg_daily = daily_totals.values().sum::<f64>() / daily_totals.len() as f64;
    avg_daily * f64::from(days_remaining)
}

fn daily_projection(
    history: &[Transaction],
    today: NaiveDate,
    days_in_month: u32,
    estimated_variable: f64,
    pending: &[RecurringExpense],
) -> Vec<DailyPoint> {
    let current_month = month_index(today);
    let day_of_month = today.day();
    let days_remaining = days_in_month - day_of_month;

    // Current month, cumulative by day; only days with spending get a key.
    let mut per_day: HashMap<u32, f64> = HashMap::new();
    for t in history {
        if t.counts_as_expense() && month_index(t.date) == current_month {
            *per_day.entry(t.date.day()).or_insert(0.0) += t.amount;
        }
    }
    let mut cumulative_by_day: HashMap<u32, f64> = HashMap::new();
    let mut running = 0.0;
    for day in 1..=day_of_month {
        if let Some(v) = per_day.get(&day) {
            running += v;
            cumulative_by_day.insert(day, running);
        }
    }

    // Last month's curve for visual comparison, same sparse shape.
    let mut prev_per_day: HashMap<u32, f64> = HashMap::new();
    for t in history {
        if t.counts_as_expense() && month_index(t.date) == current_month - 1 {
            *prev_per_day.entry(t.date.day()).or_insert(0.0) += t.amount;
        }
    }
    let mut prev_cumulative: HashMap<u32, f64> = HashMap::new();
    let mut prev_running = 0.0;
    for day in 1..=31u32 {
        if let Some(v) = prev_per_day.get(&day) {
            prev_running += v;
            prev_cumulative.insert(day, prev_running);
        }
    }

    let daily_rate = if days_remaining > 0 {
        estimated_variable / f64::from(days_remaining)
    } else {
        0.0
    };

    let mut points = Vec::with_capacity(days_in_month as usize);
    let mut last_actual = 0.0;
    for day in 1..=days_in_month {
        let mut point = DailyPoint {
            day,
            actual: None,
            predicted: None,
            predicted_high: None,
            prev_month1: prev_cumulative.get(&day).map(|v| round2(*v)),
        };
        if day <= day_of_month {
            if let Some(v) = cumulative_by_day.get(&day) {
                last_actual = *v;
            }
            point.actual = Some(round2(last_actual));
        } else {
            let days_from_now = f64::from(day - day_of_month);
            let recurring_due: f64 = pending
                .iter()
                .filter(|r| r.expected_day <= day)
                .map(|r| r.estimated_amount)
                .sum();
            let predicted = last_actual + days_from_now * daily_rate + recurring_due;
            point.predicted = Some(round2(predicted));
            point.predicted_high = Some(round2(predicted * 1.15));
        }
        points.push(point);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use saldo_core::TxnType;

    fn txn(y: i32, m: u32, d: u32, description: &str, amount: f64) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            description: description.to_string(),
            amount,
            txn_type: TxnType::Expense,
            category: "Otros gastos".to_string(),
            account_id: None,
            computable: true,
            source_bank: "Sabadell".to_string(),
        }
    }

    fn history() -> Vec<Transaction> {
        vec![
            // January
            txn(2024, 1, 1, "ALQUILER PISO CENTRO", 800.00),
            txn(2024, 1, 22, "COMPRA EN MERCADONA", 50.00),
            txn(2024, 1, 25, "RECIBO MOVISTAR FIBRA", 40.00),
            txn(2024, 1, 28, "CUOTA GIMNASIO DIR", 30.00),
            // February
            txn(2024, 2, 1, "ALQUILER PISO CENTRO", 800.00),
            txn(2024, 2, 25, "RECIBO MOVISTAR FIBRA", 40.00),
            txn(2024, 2, 28, "CUOTA GIMNASIO DIR", 30.00),
            txn(2024, 2, 28, "COMPRA EN LIDL", 30.00),
            // March (current, partial)
            txn(2024, 3, 1, "ALQUILER PISO CENTRO", 800.00),
            txn(2024, 3, 10, "COMPRA EN MERCADONA", 45.50),
            txn(2024, 3, 18, "CUOTA GIMNASIO DIR", 30.00),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    fn ready(forecast: SpendingForecast) -> ForecastResult {
        match forecast {
            SpendingForecast::Ready(result) => result,
            SpendingForecast::InsufficientData { .. } => panic!("expected a full forecast"),
        }
    }

    #[test]
    fn test_gate_blocks_thin_history() {
        let thin = vec![
            txn(2024, 2, 5, "COMPRA EN MERCADONA", 20.00),
            txn(2024, 3, 5, "COMPRA EN MERCADONA", 20.00),
        ];
        let forecast = build_forecast(&thin, today(), 500.0, 0.0, &ForecastConfig::default());
        assert_eq!(
            forecast,
            SpendingForecast::InsufficientData { months_of_data: 1, min_required: 2 }
        );
    }

    #[test]
    fn test_insufficient_data_serializes_with_status_tag() {
        let forecast = SpendingForecast::InsufficientData { months_of_data: 1, min_required: 2 };
        let json = serde_json::to_value(&forecast).unwrap();
        assert_eq!(json["status"], "insufficientData");
        assert_eq!(json["monthsOfData"], 1);
        assert_eq!(json["minRequired"], 2);
    }

    #[test]
    fn test_budget_boundary() {
        let under = evaluate_budget(1000.0, 700.0, 250.0);
        assert_eq!(under.projected_total_spend, 950.0);
        assert!(!under.will_exceed_budget);
        assert_eq!(under.projected_overspend, 0.0);

        let over = evaluate_budget(1000.0, 700.0, 400.0);
        assert_eq!(over.projected_total_spend, 1100.0);
        assert!(over.will_exceed_budget);
        assert_eq!(over.projected_overspend, 100.0);
    }

    #[test]
    fn test_no_budget_degrades_to_zeroes() {
        let none = evaluate_budget(0.0, 700.0, 400.0);
        assert_eq!(none.projected_overspend, 0.0);
        assert!(!none.will_exceed_budget);
        assert_eq!(none.budget_progress, 0.0);
    }

    #[test]
    fn test_confidence_monotone_in_months() {
        for recurring in [0usize, 3, 12] {
            let mut last = 0;
            for months in 0..12u32 {
                let c = confidence_score(months, recurring);
                assert!(c >= last, "confidence dropped at {months} months");
                assert!(c <= 100);
                last = c;
            }
        }
    }

    #[test]
    fn test_full_forecast_numbers() {
        let result = ready(build_forecast(&history(), today(), 2000.0, 1000.0, &ForecastConfig::default()));

        assert_eq!(result.months_of_data, 2);
        assert_eq!(result.days_in_month, 31);
        assert_eq!(result.days_remaining, 11);
        assert_eq!(result.spent_so_far, 875.50);

        // Pending: phone on the 25th. Rent is past day 1, gym already seen.
        assert_eq!(result.pending_recurring.len(), 1);
        assert_eq!(result.pending_recurring[0].description, "RECIBO MOVISTAR FIBRA");
        assert_eq!(result.pending_recurring_total, 40.00);

        // Later-month daily totals in Jan+Feb: 50, 40, 30, 40, 60 -> avg 44.
        assert_eq!(result.estimated_variable_spending, 484.00);
        assert_eq!(result.total_predicted_remaining, 524.00);
        assert_eq!(result.projected_total_spend, 1399.50);
        assert!(result.will_exceed_budget);
        assert_eq!(result.projected_overspend, 399.50);
        assert_eq!(result.budget_progress, 88.0);
        assert_eq!(result.free_to_spend, 1476.00);

        // 2 months -> 30, 3 recurring groups -> 15, base 20.
        assert_eq!(result.confidence, 65);
    }

    #[test]
    fn test_daily_projection_shape() {
        let result = ready(build_forecast(&history(), today(), 2000.0, 1000.0, &ForecastConfig::default()));
        let points = &result.daily_projection;
        assert_eq!(points.len(), 31);

        // Past days: cumulative actual with carry-forward, no prediction.
        assert_eq!(points[0].actual, Some(800.00));
        assert_eq!(points[4].actual, Some(800.00));
        assert_eq!(points[9].actual, Some(845.50));
        assert_eq!(points[19].actual, Some(875.50));
        assert_eq!(points[19].predicted, None);

        // Future days: anchored at today's cumulative, rate 44/day, phone
        // bill lands on the 25th.
        assert_eq!(points[20].actual, None);
        assert_eq!(points[20].predicted, Some(919.50));
        assert_eq!(points[24].predicted, Some(1135.50));
        let high = points[24].predicted_high.unwrap();
        assert!((high - 1135.50 * 1.15).abs() < 0.01);

        // Month end meets the projected total.
        assert_eq!(points[30].predicted, Some(result.projected_total_spend));

        // Last month's sparse comparison curve.
        assert_eq!(points[0].prev_month1, Some(800.00));
        assert_eq!(points[1].prev_month1, None);
        assert_eq!(points[24].prev_month1, Some(840.00));
        assert_eq!(points[27].prev_month1, Some(900.00));
    }

    #[test]
    fn test_last_day_of_month_has_no_rate_blowup() {
        let result = ready(build_forecast(
            &history(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            2000.0,
            0.0,
            &ForecastConfig::default(),
        ));
        assert_eq!(result.days_remaining, 0);
        assert_eq!(result.estimated_variable_spending, 0.0);
        assert!(result.daily_projection.iter().all(|p| p.predicted.is_none()));
        assert!(result.free_to_spend.is_finite());
    }
}
