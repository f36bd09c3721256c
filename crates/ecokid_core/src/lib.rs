//! Student economy core for EcoKid.
//! This crate is the single source of truth for point, quota and comment
//! admission invariants.

pub mod ai;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use ai::{
    AiError, CommentVerifier, EasyWord, GeminiClient, ModerationRequest, ModerationVerdict,
    Summarizer, SummaryRequest, SummaryResult,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{AppConfig, ConfigError, EconomyPolicy, GeminiConfig, WEEK_MS};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::account::Account;
pub use model::article::Article;
pub use model::comment::{Comment, CommentId};
pub use model::usage::{apply_reset_if_due, AiUsage, QuotaState, ResetRule};
pub use repo::account_repo::{AccountRepository, SqliteAccountRepository};
pub use repo::article_repo::{ArticleRepository, SqliteArticleRepository};
pub use repo::comment_repo::{CommentRepository, SqliteCommentRepository};
pub use repo::usage_repo::{SqliteUsageRepository, UsageRepository};
pub use repo::{RepoError, RepoResult};
pub use service::admission::{AdmissionOutcome, CommentAdmission, CommentSubmission};
pub use service::billing::{Charge, UsageBiller};
pub use service::desk::{EconomyDesk, SummaryReceipt};
pub use service::error::{EconomyError, EconomyResult};
pub use service::ledger::AccountLedger;
pub use service::moderation::ModerationGate;
pub use service::quota::QuotaTracker;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
