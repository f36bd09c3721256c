//! Account repository contract and SQLite implementation.
//!
//! # Invariants
//! - `user_id` is unique; `ensure_account` never creates a second row.
//! - `adjust_balance` is one `UPDATE ... RETURNING` statement, so concurrent
//!   adjustments for the same student never lose updates.

use crate::model::account::Account;
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Data access for student point balances.
pub trait AccountRepository {
    /// Inserts the account if absent. Returns `true` when a row was created.
    fn ensure_account(
        &self,
        user_id: &str,
        initial_balance: i64,
        now_ms: i64,
    ) -> RepoResult<bool>;
    fn get_account(&self, user_id: &str) -> RepoResult<Option<Account>>;
    /// Atomically adds `delta` (may be negative), stamps `updated_at` and
    /// returns the new balance.
    fn adjust_balance(&self, user_id: &str, delta: i64, now_ms: i64) -> RepoResult<i64>;
}

/// SQLite-backed account repository.
#[derive(Clone, Copy)]
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn ensure_account(
        &self,
        user_id: &str,
        initial_balance: i64,
        now_ms: i64,
    ) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO accounts (account_id, user_id, balance, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(user_id) DO NOTHING;",
            params![Account::account_id_for(user_id), user_id, initial_balance, now_ms],
        )?;
        Ok(inserted == 1)
    }

    fn get_account(&self, user_id: &str) -> RepoResult<Option<Account>> {
        let account = self
            .conn
            .query_row(
                "SELECT account_id, user_id, balance FROM accounts WHERE user_id = ?1;",
                [user_id],
                parse_account_row,
            )
            .optional()?;
        Ok(account)
    }

    fn adjust_balance(&self, user_id: &str, delta: i64, now_ms: i64) -> RepoResult<i64> {
        let balance = self
            .conn
            .query_row(
                "UPDATE accounts
                 SET
                    balance = balance + ?1,
                    updated_at = ?2
                 WHERE user_id = ?3
                 RETURNING balance;",
                params![delta, now_ms, user_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        balance.ok_or_else(|| RepoError::not_found("account", user_id))
    }
}

fn parse_account_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        account_id: row.get("account_id")?,
        user_id: row.get("user_id")?,
        balance: row.get("balance")?,
    })
}
