use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use saldo_core::Transaction;

pub fn saldo_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".saldo"))
}

pub fn ensure_saldo_home() -> Result<PathBuf> {
    let dir = saldo_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monthly_budget: f64,
    /// Tracked account balance, refreshed from each imported statement.
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Europe/Madrid".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            monthly_budget: 0.0,
            balance: None,
            timezone: default_timezone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_saldo_home()?.join("config.json"))
}

pub fn transactions_path() -> Result<PathBuf> {
    Ok(ensure_saldo_home()?.join("transactions.json"))
}

pub fn read_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

pub fn write_config(config: &Config) -> Result<()> {
    let p = config_path()?;
    let json = serde_json::to_string_pretty(config)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn read_transactions() -> Result<Vec<Transaction>> {
    let p = transactions_path()?;
    if !p.exists() {
        return Ok(Vec::new());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

pub fn write_transactions(rows: &[Transaction]) -> Result<()> {
    let p = transactions_path()?;
    let json = serde_json::to_string_pretty(rows)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}
