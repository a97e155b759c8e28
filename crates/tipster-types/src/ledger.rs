use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{BankEntry, Direction};

/// Balances closer to zero than this are treated as settled.
const SETTLED_EPSILON: f64 = 1e-9;

/// Per-user aggregate of the bank ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub user_id: String,
    pub total_in: f64,
    pub total_out: f64,
    pub balance: f64,
}

/// Derive balances from the full entry set: `sum(in) - sum(out)` per user,
/// ordered by user id.
pub fn balances(entries: &[BankEntry]) -> Vec<Balance> {
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for entry in entries {
        let slot = totals.entry(entry.user_id.as_str()).or_default();
        match entry.direction {
            Direction::In => slot.0 += entry.amount,
            Direction::Out => slot.1 += entry.amount,
        }
    }

    totals
        .into_iter()
        .map(|(user_id, (total_in, total_out))| Balance {
            user_id: user_id.to_string(),
            total_in,
            total_out,
            balance: total_in - total_out,
        })
        .collect()
}

/// Entries that bring every non-zero balance back to zero.
pub fn settlement(balances: &[Balance]) -> Vec<(String, Direction, f64)> {
    balances
        .iter()
        .filter(|b| b.balance.abs() > SETTLED_EPSILON)
        .map(|b| {
            let direction = if b.balance > 0.0 { Direction::Out } else { Direction::In };
            (b.user_id.clone(), direction, b.balance.abs())
        })
        .collect()
}
