//! Charging for AI actions: free weekly use first, points after.
//!
//! # Invariants
//! - Charge only after the AI action succeeded; a failed AI call must never
//!   reach `charge_for_ai_action`.
//! - At most one of {free-use decrement, point debit} happens per charge.

use crate::clock::Clock;
use crate::repo::account_repo::AccountRepository;
use crate::repo::usage_repo::UsageRepository;
use crate::service::error::{EconomyError, EconomyResult};
use crate::service::ledger::AccountLedger;
use crate::service::quota::QuotaTracker;
use serde::Serialize;

/// How an AI action was paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Charge {
    FreeUse,
    Points { amount: i64, balance: i64 },
}

/// Composes quota and ledger into one charge decision.
pub struct UsageBiller<'a, A, U, C, K>
where
    A: AccountRepository,
    U: UsageRepository,
    C: Clock,
    K: Clock,
{
    ledger: &'a AccountLedger<A, K>,
    quota: &'a QuotaTracker<U, C>,
    ai_action_cost: i64,
}

impl<'a, A, U, C, K> UsageBiller<'a, A, U, C, K>
where
    A: AccountRepository,
    U: UsageRepository,
    C: Clock,
    K: Clock,
{
    pub fn new(
        ledger: &'a AccountLedger<A, K>,
        quota: &'a QuotaTracker<U, C>,
        ai_action_cost: i64,
    ) -> Self {
        Self {
            ledger,
            quota,
            ai_action_cost,
        }
    }

    /// Advisory check run before the AI call.
    ///
    /// Fails with `InsufficientFunds` when no free use is left and the
    /// balance cannot cover the cost. `charge_for_ai_action` does not repeat
    /// this check.
    pub fn precheck(&self, user_id: &str) -> EconomyResult<()> {
        let usage = self.quota.get_usage(user_id)?;
        let balance = self.ledger.get_balance(user_id)?;
        if usage.free_usage_count <= 0 && balance < self.ai_action_cost {
            return Err(EconomyError::InsufficientFunds {
                balance,
                required: self.ai_action_cost,
            });
        }
        Ok(())
    }

    /// Spends a free use if one is left, otherwise debits the action cost.
    pub fn charge_for_ai_action(&self, user_id: &str) -> EconomyResult<Charge> {
        if self.quota.consume_free_use(user_id)? {
            return Ok(Charge::FreeUse);
        }

        let balance = self.ledger.debit(user_id, self.ai_action_cost)?;
        Ok(Charge::Points {
            amount: self.ai_action_cost,
            balance,
        })
    }
}
