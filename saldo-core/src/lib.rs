//! saldo-core: canonical transaction model, locale-aware field parsing,
//! and the shared category rule table.

pub mod amounts;
pub mod dates;
pub mod recat;
pub mod rules;
pub mod transaction;

pub use recat::{apply_changes, plan_recategorization, CategoryChange};
pub use rules::{RuleSet, DEFAULT_CATEGORY, REFUND_CATEGORY, TRANSFER_CATEGORY};
pub use transaction::{Transaction, TxnType};
