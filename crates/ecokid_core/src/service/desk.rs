//! Caller-facing economy API over one SQLite connection.
//!
//! # Responsibility
//! - Wire ledger, quota, billing, moderation and admission with one policy.
//! - Offer the operations a UI or CLI calls, with the AI-first, bill-after
//!   ordering for summaries.
//!
//! # Invariants
//! - A failed summary call never bills.
//! - A billing failure after a successful summary is `BillingFailed`, so the
//!   caller does not retry and pay twice.

use crate::ai::{CommentVerifier, Summarizer, SummaryRequest, SummaryResult};
use crate::clock::Clock;
use crate::config::EconomyPolicy;
use crate::model::account::Account;
use crate::model::article::Article;
use crate::model::comment::Comment;
use crate::model::usage::{AiUsage, ResetRule};
use crate::repo::account_repo::SqliteAccountRepository;
use crate::repo::article_repo::{ArticleRepository, SqliteArticleRepository};
use crate::repo::comment_repo::{CommentRepository, SqliteCommentRepository};
use crate::repo::usage_repo::SqliteUsageRepository;
use crate::service::admission::{AdmissionOutcome, CommentAdmission, CommentSubmission};
use crate::service::billing::{Charge, UsageBiller};
use crate::service::error::{EconomyError, EconomyResult};
use crate::service::ledger::AccountLedger;
use crate::service::moderation::ModerationGate;
use crate::service::quota::QuotaTracker;
use log::{error, info};
use rusqlite::Connection;

/// What a student got for one summary request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryReceipt {
    pub summary: SummaryResult,
    pub charge: Charge,
}

/// Economy facade for one request-scoped connection.
pub struct EconomyDesk<'conn, V: CommentVerifier, S: Summarizer, C: Clock + Clone> {
    policy: EconomyPolicy,
    ledger: AccountLedger<SqliteAccountRepository<'conn>, C>,
    quota: QuotaTracker<SqliteUsageRepository<'conn>, C>,
    gate: ModerationGate<V>,
    summarizer: S,
    comments: SqliteCommentRepository<'conn>,
    articles: SqliteArticleRepository<'conn>,
    clock: C,
}

impl<'conn, V: CommentVerifier, S: Summarizer, C: Clock + Clone> EconomyDesk<'conn, V, S, C> {
    pub fn new(
        conn: &'conn Connection,
        policy: EconomyPolicy,
        verifier: V,
        summarizer: S,
        clock: C,
    ) -> Self {
        let rule = ResetRule {
            period_ms: policy.reset_period_ms,
            free_uses: policy.weekly_free_uses,
        };
        Self {
            ledger: AccountLedger::with_clock(
                SqliteAccountRepository::new(conn),
                clock.clone(),
                policy.initial_balance,
            ),
            quota: QuotaTracker::new(SqliteUsageRepository::new(conn), clock.clone(), rule),
            gate: ModerationGate::new(verifier, policy.min_comment_chars),
            summarizer,
            comments: SqliteCommentRepository::new(conn),
            articles: SqliteArticleRepository::new(conn),
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &EconomyPolicy {
        &self.policy
    }

    /// Creates the account and usage rows on first login; no-op afterwards.
    pub fn ensure_initialized(&self, user_id: &str) -> EconomyResult<()> {
        self.ledger.ensure_account(user_id)?;
        self.quota.ensure_usage(user_id)?;
        Ok(())
    }

    pub fn get_account(&self, user_id: &str) -> EconomyResult<Account> {
        self.ledger.get_account(user_id)
    }

    pub fn get_balance(&self, user_id: &str) -> EconomyResult<i64> {
        self.ledger.get_balance(user_id)
    }

    pub fn get_usage(&self, user_id: &str) -> EconomyResult<AiUsage> {
        self.quota.get_usage(user_id)
    }

    /// Summarizes an article, then charges a free use or points.
    pub fn request_ai_summary(
        &self,
        user_id: &str,
        article_id: &str,
    ) -> EconomyResult<SummaryReceipt> {
        let article = self.get_article(article_id)?;
        let biller = UsageBiller::new(&self.ledger, &self.quota, self.policy.ai_action_cost);
        biller.precheck(user_id)?;

        let summary = self
            .summarizer
            .summarize(&SummaryRequest {
                title: &article.title,
                content: &article.content,
            })
            .map_err(EconomyError::SummaryUnavailable)?;

        match biller.charge_for_ai_action(user_id) {
            Ok(charge) => {
                info!(
                    "event=ai_summary module=desk status=ok user_id={user_id} article_id={article_id} charge={charge:?}"
                );
                Ok(SummaryReceipt { summary, charge })
            }
            Err(err) => {
                error!(
                    "event=ai_summary module=desk status=billing_failed user_id={user_id} article_id={article_id} error={err}"
                );
                Err(EconomyError::BillingFailed(Box::new(err)))
            }
        }
    }

    pub fn submit_comment(&self, submission: &CommentSubmission) -> EconomyResult<AdmissionOutcome> {
        CommentAdmission::new(
            &self.ledger,
            &self.gate,
            self.comments,
            self.articles,
            self.clock.clone(),
            self.policy.comment_reward,
        )
        .submit(submission)
    }

    /// Lists admitted comments newest first.
    pub fn list_comments(&self, article_id: Option<&str>) -> EconomyResult<Vec<Comment>> {
        Ok(self.comments.list_comments(article_id)?)
    }

    pub fn get_article(&self, article_id: &str) -> EconomyResult<Article> {
        self.articles
            .get_article(article_id)?
            .ok_or_else(|| EconomyError::NotFound {
                entity: "article",
                key: article_id.to_string(),
            })
    }

    /// Stores article context (seeding and imports only).
    pub fn add_article(&self, article: &Article) -> EconomyResult<()> {
        self.articles.insert_article(article)?;
        Ok(())
    }
}
