//! Batch re-categorization over already persisted rows.
//!
//! Runs the current rule table against stored descriptions and reports only
//! the rows whose category would change. The caller decides which rows to
//! offer (and applies the changes), so categories the table cannot produce
//! stay untouched by filtering them out up front.

use serde::Serialize;

use crate::rules::RuleSet;
use crate::transaction::Transaction;

/// One row whose stored category differs from the freshly computed one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryChange {
    /// Position in the slice handed to [`plan_recategorization`].
    pub index: usize,
    pub description: String,
    pub amount: f64,
    pub old: String,
    pub new: String,
}

/// Diff stored categories against the rule table. Unchanged rows are not
/// reported and must not be rewritten by the caller.
pub fn plan_recategorization(rules: &RuleSet, rows: &[Transaction]) -> Vec<CategoryChange> {
    let mut changes = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        let new = rules.classify(&row.description);
        if new != row.category {
            changes.push(CategoryChange {
                index,
                description: row.description.clone(),
                amount: row.amount,
                old: row.category.clone(),
                new: new.to_string(),
            });
        }
    }
    changes
}

/// Apply a previously planned diff in place.
pub fn apply_changes(rows: &mut [Transaction], changes: &[CategoryChange]) {
    for change in changes {
        if let Some(row) = rows.get_mut(change.index) {
            row.category = change.new.clone();
        }
    }
}
