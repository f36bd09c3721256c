//! AI usage repository contract and SQLite implementation.
//!
//! # Invariants
//! - `decrement_free_use` only succeeds while the stored count is positive;
//!   the check and the write are one statement.
//! - `reset_usage` is compare-and-set on `last_reset_at`, so a reset observed
//!   by several concurrent readers is persisted once.

use crate::model::usage::AiUsage;
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Data access for weekly free AI usage counters.
pub trait UsageRepository {
    /// Inserts the usage row if absent. Returns `true` when a row was created.
    fn ensure_usage(&self, user_id: &str, free_uses: i64, now_ms: i64) -> RepoResult<bool>;
    fn get_usage(&self, user_id: &str) -> RepoResult<Option<AiUsage>>;
    /// Writes `next` only if the row still carries `expected_last_reset_at`.
    /// Returns `true` when this call applied the reset.
    fn reset_usage(&self, next: &AiUsage, expected_last_reset_at: i64) -> RepoResult<bool>;
    /// Decrements a positive count and returns what remains, or `None` when
    /// the count is already zero (or the row is missing).
    fn decrement_free_use(&self, user_id: &str) -> RepoResult<Option<i64>>;
}

/// SQLite-backed usage repository.
#[derive(Clone, Copy)]
pub struct SqliteUsageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUsageRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UsageRepository for SqliteUsageRepository<'_> {
    fn ensure_usage(&self, user_id: &str, free_uses: i64, now_ms: i64) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT INTO ai_usage (user_id, free_usage_count, last_reset_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO NOTHING;",
            params![user_id, free_uses, now_ms],
        )?;
        Ok(inserted == 1)
    }

    fn get_usage(&self, user_id: &str) -> RepoResult<Option<AiUsage>> {
        let usage = self
            .conn
            .query_row(
                "SELECT user_id, free_usage_count, last_reset_at
                 FROM ai_usage
                 WHERE user_id = ?1;",
                [user_id],
                parse_usage_row,
            )
            .optional()?;
        Ok(usage)
    }

    fn reset_usage(&self, next: &AiUsage, expected_last_reset_at: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE ai_usage
             SET free_usage_count = ?1, last_reset_at = ?2
             WHERE user_id = ?3 AND last_reset_at = ?4;",
            params![
                next.free_usage_count,
                next.last_reset_at,
                next.user_id.as_str(),
                expected_last_reset_at
            ],
        )?;
        Ok(changed == 1)
    }

    fn decrement_free_use(&self, user_id: &str) -> RepoResult<Option<i64>> {
        let remaining = self
            .conn
            .query_row(
                "UPDATE ai_usage
                 SET free_usage_count = free_usage_count - 1
                 WHERE user_id = ?1 AND free_usage_count > 0
                 RETURNING free_usage_count;",
                [user_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(remaining)
    }
}

fn parse_usage_row(row: &Row<'_>) -> rusqlite::Result<AiUsage> {
    Ok(AiUsage {
        user_id: row.get("user_id")?,
        free_usage_count: row.get("free_usage_count")?,
        last_reset_at: row.get("last_reset_at")?,
    })
}
