//! Student point account.

use serde::{Deserialize, Serialize};

/// A student's point balance.
///
/// Mutated only through `AccountLedger` credit/debit; never written directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    pub user_id: String,
    /// May go negative: debits are not floored.
    pub balance: i64,
}

impl Account {
    /// Derives the stable account ID for a student.
    pub fn account_id_for(user_id: &str) -> String {
        format!("acc_{user_id}")
    }
}
