//! Weekly free AI usage tracker.
//!
//! # Responsibility
//! - Own every mutation of `AiUsage`.
//! - Apply the lazy weekly reset at the top of every read and write path.
//!
//! # Invariants
//! - No timer: resets are computed from `Clock::now_ms` when a record is
//!   touched.
//! - `consume_free_use` never drives the count below zero.

use crate::clock::Clock;
use crate::model::usage::{apply_reset_if_due, AiUsage, ResetRule};
use crate::repo::usage_repo::UsageRepository;
use crate::service::error::{EconomyError, EconomyResult};
use log::info;

/// Free-use counter owner for all students.
pub struct QuotaTracker<R: UsageRepository, C: Clock> {
    repo: R,
    clock: C,
    rule: ResetRule,
}

impl<R: UsageRepository, C: Clock> QuotaTracker<R, C> {
    pub fn new(repo: R, clock: C, rule: ResetRule) -> Self {
        Self { repo, clock, rule }
    }

    /// Creates the student's usage row with a full allotment if absent.
    pub fn ensure_usage(&self, user_id: &str) -> EconomyResult<bool> {
        let created = self
            .repo
            .ensure_usage(user_id, self.rule.free_uses, self.clock.now_ms())?;
        if created {
            info!(
                "event=usage_init module=quota status=ok user_id={user_id} free_uses={}",
                self.rule.free_uses
            );
        }
        Ok(created)
    }

    /// Returns the usage record after applying any due reset.
    pub fn get_usage(&self, user_id: &str) -> EconomyResult<AiUsage> {
        let current = self.load(user_id)?;
        let now_ms = self.clock.now_ms();

        let Some(next) = apply_reset_if_due(&current, now_ms, self.rule) else {
            return Ok(current);
        };

        if self.repo.reset_usage(&next, current.last_reset_at)? {
            info!(
                "event=usage_reset module=quota status=ok user_id={user_id} previous_reset_at={} free_uses={}",
                current.last_reset_at, next.free_usage_count
            );
            return Ok(next);
        }

        // Another request reset first; report what it stored.
        self.load(user_id)
    }

    /// Spends one free use. Returns `false` without mutating when none are
    /// left.
    pub fn consume_free_use(&self, user_id: &str) -> EconomyResult<bool> {
        let usage = self.get_usage(user_id)?;
        if usage.free_usage_count <= 0 {
            return Ok(false);
        }

        match self.repo.decrement_free_use(user_id)? {
            Some(remaining) => {
                info!(
                    "event=usage_consume module=quota status=ok user_id={user_id} remaining={remaining}"
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn load(&self, user_id: &str) -> EconomyResult<AiUsage> {
        self.repo
            .get_usage(user_id)?
            .ok_or_else(|| EconomyError::NotFound {
                entity: "ai_usage",
                key: user_id.to_string(),
            })
    }
}
