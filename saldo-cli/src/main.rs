use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use saldo_core::{
    apply_changes, dates, plan_recategorization, RuleSet, REFUND_CATEGORY, TRANSFER_CATEGORY,
};
use saldo_forecast::{
    available_to_spend, build_forecast, check_affordability, days_in_month, Affordability,
    AvailableToSpend, ForecastConfig, SpendingForecast, DEFAULT_SAFETY_BUFFER_PCT,
};
use saldo_ingest::{
    apply_confirmed, detect_transfers, filter_duplicates, ingest, ParseStats, StatementFormat,
    NC_CATEGORY,
};

mod store;

/// Categories the rule table can never produce; recat must not rewrite them.
const PROTECTED_CATEGORIES: [&str; 4] =
    [REFUND_CATEGORY, TRANSFER_CATEGORY, NC_CATEGORY, "Ingresos"];

#[derive(Parser, Debug)]
#[command(name = "saldo", version, about = "Bank statement ingestion and spending forecast")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement export and merge its rows into the local store
    Import {
        /// Statement file (bank CSV/XLS export or PDF-extracted text)
        file: PathBuf,

        /// Custom category rule table (JSON, as printed by `rules export`)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Print a machine-readable summary instead of text
        #[arg(long)]
        json: bool,
    },

    /// Forecast this month's spending from the stored history
    Forecast {
        /// Override the tracked balance
        #[arg(long)]
        balance: Option<f64>,

        /// Override the configured monthly budget
        #[arg(long)]
        budget: Option<f64>,

        /// Run as of this date (DD/MM/YYYY or ISO) instead of today
        #[arg(long)]
        today: Option<String>,

        /// Print the full forecast as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a purchase fits the available balance
    Afford {
        /// Purchase amount
        amount: f64,

        /// Safety buffer kept aside, as a percent of the balance
        #[arg(long, default_value_t = DEFAULT_SAFETY_BUFFER_PCT)]
        buffer: f64,

        #[arg(long)]
        json: bool,
    },

    /// Re-run the rule table over stored rows and preview category changes
    Recat {
        /// Write the changes back to the store
        #[arg(long)]
        apply: bool,

        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// Category rule table commands
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RulesCommand {
    /// Print the built-in rule table as JSON, ready to edit
    Export,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Import { file, rules, json } => import(&file, rules.as_deref(), json),
        Command::Forecast { balance, budget, today, json } => {
            forecast(balance, budget, today.as_deref(), json)
        }
        Command::Afford { amount, buffer, json } => afford(amount, buffer, json),
        Command::Recat { apply, rules } => recat(apply, rules.as_deref()),
        Command::Rules { command } => match command {
            RulesCommand::Export => {
                println!("{}", serde_json::to_string_pretty(&RuleSet::builtin())?);
                Ok(())
            }
        },
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportSummary<'a> {
    format: StatementFormat,
    bank: &'a str,
    parsed: usize,
    inserted: usize,
    skipped_duplicates: usize,
    confirmed_transfers: usize,
    potential_transfers: usize,
    last_balance: Option<f64>,
    account_number: Option<&'a str>,
    card: Option<String>,
    stats: ParseStats,
}

fn import(file: &Path, rules_path: Option<&Path>, json: bool) -> Result<()> {
    if !file.exists() {
        bail!("statement not found: {}", file.display());
    }
    let text = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("statement.csv");

    let rules = load_rules(rules_path)?;
    let mut config = store::read_config()?;
    let today = dates::today_in_tz(&config.timezone)?;

    let result =
        ingest(&text, filename, &rules, today).with_context(|| format!("parsing {}", file.display()))?;
    let parsed = result.transactions.len();

    let mut transactions = store::read_transactions()?;
    let outcome = filter_duplicates(&transactions, result.transactions);
    let inserted = outcome.inserted.len();
    transactions.extend(outcome.inserted);

    let report = detect_transfers(&transactions);
    apply_confirmed(&mut transactions, &report);
    store::write_transactions(&transactions)?;

    // A statement balance beats whatever we tracked before.
    let new_balance = result
        .last_balance
        .or_else(|| result.credit_card_meta.as_ref().and_then(|m| m.balance()));
    if let Some(balance) = new_balance {
        config.balance = Some(balance);
        store::write_config(&config)?;
    }

    if json {
        let summary = ImportSummary {
            format: result.format,
            bank: &result.bank,
            parsed,
            inserted,
            skipped_duplicates: outcome.skipped_duplicates as usize,
            confirmed_transfers: report.confirmed.len(),
            potential_transfers: report.potential.len(),
            last_balance: result.last_balance,
            account_number: result.account_number.as_deref(),
            card: result.credit_card_meta.as_ref().map(|m| m.card_name()),
            stats: result.stats,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Imported {} ({:?}, {})", file.display(), result.format, result.bank);
    println!(
        "  parsed {parsed} rows, inserted {inserted}, skipped {} duplicates",
        outcome.skipped_duplicates
    );
    if let Some(account) = &result.account_number {
        println!("  account {account}");
    }
    if let Some(meta) = &result.credit_card_meta {
        println!("  card {}", meta.card_name());
    }
    if let Some(balance) = new_balance {
        println!("  balance {balance:.2}");
    }
    if result.stats.skipped_lines > 0 {
        eprintln!("  warning: {} lines skipped as unparseable", result.stats.skipped_lines);
    }
    if result.stats.date_fallbacks > 0 {
        eprintln!("  warning: {} rows fell back to today's date", result.stats.date_fallbacks);
    }
    if result.stats.suspect_balance_order {
        eprintln!("  warning: rows run oldest-first; captured balance may be stale");
    }
    if !report.confirmed.is_empty() {
        println!("  {} transfer pair(s) excluded from totals", report.confirmed.len());
    }
    if !report.potential.is_empty() {
        println!("  {} possible transfer pair(s), still counted:", report.potential.len());
        for pair in &report.potential {
            let first = &transactions[pair.first];
            let second = &transactions[pair.second];
            println!(
                "    {}  {:>8.2}  {} / {}",
                pair.date, pair.amount, first.description, second.description
            );
        }
    }
    Ok(())
}

fn forecast(
    balance: Option<f64>,
    budget: Option<f64>,
    today_arg: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = store::read_config()?;
    let transactions = store::read_transactions()?;

    let today = match today_arg {
        Some(raw) => dates::try_parse_date(raw).with_context(|| format!("invalid date: {raw}"))?,
        None => dates::today_in_tz(&config.timezone)?,
    };
    let balance = balance.or(config.balance).unwrap_or(0.0);
    let budget = budget.unwrap_or(config.monthly_budget);

    let forecast = build_forecast(&transactions, today, balance, budget, &ForecastConfig::default());

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    match forecast {
        SpendingForecast::InsufficientData { months_of_data, min_required } => {
            println!(
                "Not enough history: {months_of_data} month(s) with spending, need {min_required}."
            );
            println!("Import more statements and try again.");
        }
        SpendingForecast::Ready(result) => {
            println!(
                "Day {}/{} ({} left), {} months of history, confidence {}%",
                result.day_of_month,
                result.days_in_month,
                result.days_remaining,
                result.months_of_data,
                result.confidence
            );
            println!("  spent so far         {:>10.2}", result.spent_so_far);
            println!(
                "  predicted remaining  {:>10.2}  (variable {:.2} + recurring {:.2})",
                result.total_predicted_remaining,
                result.estimated_variable_spending,
                result.pending_recurring_total
            );
            println!("  projected total      {:>10.2}", result.projected_total_spend);
            if result.monthly_budget > 0.0 {
                if result.will_exceed_budget {
                    println!(
                        "  budget {:.2}: {:.0}% spent, projected {:.2} over",
                        result.monthly_budget, result.budget_progress, result.projected_overspend
                    );
                } else {
                    println!(
                        "  budget {:.2}: {:.0}% spent, on track",
                        result.monthly_budget, result.budget_progress
                    );
                }
            }
            println!("  free to spend        {:>10.2}", result.free_to_spend);
            if !result.pending_recurring.is_empty() {
                println!("  still due this month:");
                for r in &result.pending_recurring {
                    println!(
                        "    day {:>2}  {:>8.2}  {}  ({}%)",
                        r.expected_day, r.estimated_amount, r.description, r.confidence
                    );
                }
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AffordOutput {
    available: AvailableToSpend,
    check: Affordability,
}

fn afford(amount: f64, buffer_pct: f64, json: bool) -> Result<()> {
    let config = store::read_config()?;
    let transactions = store::read_transactions()?;
    let today = dates::today_in_tz(&config.timezone)?;
    let balance = config.balance.unwrap_or(0.0);

    // Pending recurring come from the forecast when there is enough
    // history; otherwise only the buffer is held back.
    let (pending_total, days_remaining) = match build_forecast(
        &transactions,
        today,
        balance,
        config.monthly_budget,
        &ForecastConfig::default(),
    ) {
        SpendingForecast::Ready(result) => (result.pending_recurring_total, result.days_remaining),
        SpendingForecast::InsufficientData { .. } => (0.0, days_in_month(today) - today.day()),
    };

    let available = available_to_spend(balance, pending_total, buffer_pct, days_remaining);
    let check = check_affordability(&available, amount);

    if json {
        println!("{}", serde_json::to_string_pretty(&AffordOutput { available, check })?);
        return Ok(());
    }

    println!(
        "Balance {:.2}, pending recurring {:.2}, buffer {:.2} ({:.0}%)",
        available.current_balance,
        available.pending_payments,
        available.safety_buffer,
        available.safety_buffer_pct
    );
    println!(
        "Available to spend: {:.2} ({:.2}/day over {} days)",
        available.total_available, available.daily_recommended, available.days_remaining
    );
    if check.can_afford {
        println!(
            "{:.2} fits; {:.2} would remain ({:.2}/day)",
            check.requested_amount, check.remaining_after, check.daily_budget_after
        );
    } else {
        println!("{:.2} does not fit; short by {:.2}", check.requested_amount, check.shortfall);
    }
    Ok(())
}

fn recat(apply: bool, rules_path: Option<&Path>) -> Result<()> {
    let rules = load_rules(rules_path)?;
    let mut transactions = store::read_transactions()?;

    let mut changes = plan_recategorization(&rules, &transactions);
    changes.retain(|c| !PROTECTED_CATEGORIES.contains(&c.old.as_str()));

    if changes.is_empty() {
        println!("All categories already match the rule table.");
        return Ok(());
    }

    println!("{} row(s) would change:", changes.len());
    for change in changes.iter().take(20) {
        println!(
            "  {:>8.2}  {:<22} -> {:<22} {}",
            change.amount, change.old, change.new, change.description
        );
    }
    if changes.len() > 20 {
        println!("  ... and {} more", changes.len() - 20);
    }

    if apply {
        apply_changes(&mut transactions, &changes);
        store::write_transactions(&transactions)?;

        let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
        for change in &changes {
            *by_category.entry(change.new.as_str()).or_insert(0) += 1;
        }
        println!("Applied {} change(s):", changes.len());
        for (category, count) in by_category {
            println!("  {category}: {count}");
        }
    } else {
        println!("Run again with --apply to write these changes.");
    }
    Ok(())
}

fn load_rules(path: Option<&Path>) -> Result<RuleSet> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parse rule table {}", p.display()))
        }
        None => Ok(RuleSet::builtin()),
    }
}
