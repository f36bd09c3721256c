//! Weekly free AI usage record and its lazy reset rule.
//!
//! # Invariants
//! - `free_usage_count` never exceeds `ResetRule::free_uses` and never
//!   drops below zero.
//! - A reset happens only when strictly more than `period_ms` has elapsed
//!   since `last_reset_at`; it restores the full allotment regardless of the
//!   current count.

use serde::{Deserialize, Serialize};

/// A student's remaining free AI actions for the current period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiUsage {
    pub user_id: String,
    pub free_usage_count: i64,
    /// Unix epoch milliseconds of the last seed or reset.
    pub last_reset_at: i64,
}

/// Quota state derived from `free_usage_count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaState {
    HasFreeUses,
    Exhausted,
}

impl AiUsage {
    pub fn state(&self) -> QuotaState {
        if self.free_usage_count > 0 {
            QuotaState::HasFreeUses
        } else {
            QuotaState::Exhausted
        }
    }
}

/// Reset cadence and allotment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetRule {
    pub period_ms: i64,
    pub free_uses: i64,
}

/// Returns the reset record when a reset is due at `now_ms`, or `None`.
///
/// Pure: persisting the result is the caller's job.
pub fn apply_reset_if_due(record: &AiUsage, now_ms: i64, rule: ResetRule) -> Option<AiUsage> {
    let elapsed = now_ms.saturating_sub(record.last_reset_at);
    if elapsed <= rule.period_ms {
        return None;
    }

    Some(AiUsage {
        user_id: record.user_id.clone(),
        free_usage_count: rule.free_uses,
        last_reset_at: now_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::{apply_reset_if_due, AiUsage, QuotaState, ResetRule};
    use crate::config::WEEK_MS;

    const RULE: ResetRule = ResetRule {
        period_ms: WEEK_MS,
        free_uses: 1,
    };

    fn exhausted_at(last_reset_at: i64) -> AiUsage {
        AiUsage {
            user_id: "s-1".to_string(),
            free_usage_count: 0,
            last_reset_at,
        }
    }

    #[test]
    fn reset_applies_one_ms_past_the_period() {
        let record = exhausted_at(0);
        let reset = apply_reset_if_due(&record, WEEK_MS + 1, RULE).expect("reset due");
        assert_eq!(reset.free_usage_count, 1);
        assert_eq!(reset.last_reset_at, WEEK_MS + 1);
        assert_eq!(reset.state(), QuotaState::HasFreeUses);
    }

    #[test]
    fn no_reset_at_or_before_the_period() {
        let record = exhausted_at(0);
        assert!(apply_reset_if_due(&record, WEEK_MS - 1, RULE).is_none());
        assert!(apply_reset_if_due(&record, WEEK_MS, RULE).is_none());
    }

    #[test]
    fn reset_ignores_current_count() {
        let mut record = exhausted_at(0);
        record.free_usage_count = 1;
        let reset = apply_reset_if_due(&record, 3 * WEEK_MS, RULE).expect("reset due");
        assert_eq!(reset.free_usage_count, 1);
        assert_eq!(reset.last_reset_at, 3 * WEEK_MS);
    }

    #[test]
    fn clock_behind_last_reset_never_resets() {
        let record = exhausted_at(10 * WEEK_MS);
        assert!(apply_reset_if_due(&record, 0, RULE).is_none());
    }
}
