//! Student point ledger.
//!
//! # Responsibility
//! - Own every mutation of `Account.balance`.
//! - Lazily create accounts with the configured starting balance.
//!
//! # Invariants
//! - Credit and debit are single atomic storage updates.
//! - Credit is not idempotent; callers invoke it at most once per rewarded
//!   event.
//! - Debit is unconditional: it does not check `balance >= amount`. A
//!   negative result is logged as a warning, not refused.

use crate::clock::{Clock, SystemClock};
use crate::model::account::Account;
use crate::repo::account_repo::AccountRepository;
use crate::service::error::{EconomyError, EconomyResult};
use log::{info, warn};

/// Point balance owner for all students.
pub struct AccountLedger<R: AccountRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    initial_balance: i64,
}

impl<R: AccountRepository> AccountLedger<R> {
    /// Ledger stamped with wall-clock time.
    pub fn new(repo: R, initial_balance: i64) -> Self {
        Self::with_clock(repo, SystemClock, initial_balance)
    }
}

impl<R: AccountRepository, C: Clock> AccountLedger<R, C> {
    pub fn with_clock(repo: R, clock: C, initial_balance: i64) -> Self {
        Self {
            repo,
            clock,
            initial_balance,
        }
    }

    /// Creates the student's account if absent. Returns `true` on creation.
    pub fn ensure_account(&self, user_id: &str) -> EconomyResult<bool> {
        let created = self
            .repo
            .ensure_account(user_id, self.initial_balance, self.clock.now_ms())?;
        if created {
            info!(
                "event=account_init module=ledger status=ok user_id={user_id} balance={}",
                self.initial_balance
            );
        }
        Ok(created)
    }

    pub fn get_account(&self, user_id: &str) -> EconomyResult<Account> {
        self.repo
            .get_account(user_id)?
            .ok_or_else(|| EconomyError::NotFound {
                entity: "account",
                key: user_id.to_string(),
            })
    }

    pub fn get_balance(&self, user_id: &str) -> EconomyResult<i64> {
        Ok(self.get_account(user_id)?.balance)
    }

    /// Adds `amount` points and returns the new balance.
    pub fn credit(&self, user_id: &str, amount: i64) -> EconomyResult<i64> {
        ensure_positive(amount)?;
        let balance = self
            .repo
            .adjust_balance(user_id, amount, self.clock.now_ms())?;
        info!(
            "event=ledger_credit module=ledger status=ok user_id={user_id} amount={amount} balance={balance}"
        );
        Ok(balance)
    }

    /// Subtracts `amount` points and returns the new balance, even when it
    /// ends up negative.
    pub fn debit(&self, user_id: &str, amount: i64) -> EconomyResult<i64> {
        ensure_positive(amount)?;
        let balance = self
            .repo
            .adjust_balance(user_id, -amount, self.clock.now_ms())?;
        if balance < 0 {
            warn!(
                "event=ledger_debit module=ledger status=negative_balance user_id={user_id} amount={amount} balance={balance}"
            );
        } else {
            info!(
                "event=ledger_debit module=ledger status=ok user_id={user_id} amount={amount} balance={balance}"
            );
        }
        Ok(balance)
    }
}

fn ensure_positive(amount: i64) -> EconomyResult<()> {
    if amount <= 0 {
        return Err(EconomyError::InvalidAmount(amount));
    }
    Ok(())
}
