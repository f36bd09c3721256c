//! Comment admission: moderation, persistence and reward.
//!
//! # Responsibility
//! - Run the moderation gate and store only passing comments.
//! - Credit the reward once per stored comment.
//!
//! # Invariants
//! - Rejected or failed moderation leaves no row and no ledger change.
//! - A stored comment whose credit failed is reported as `RewardFailed`,
//!   never as a plain error and never retried automatically.
//! - A submission id is stored at most once, so retried submissions cannot
//!   earn twice.

use crate::ai::CommentVerifier;
use crate::clock::Clock;
use crate::model::comment::{Comment, CommentId};
use crate::repo::account_repo::AccountRepository;
use crate::repo::article_repo::ArticleRepository;
use crate::repo::comment_repo::CommentRepository;
use crate::service::error::{EconomyError, EconomyResult};
use crate::service::ledger::AccountLedger;
use crate::service::moderation::ModerationGate;
use log::{error, info};
use uuid::Uuid;

/// One student comment attempt.
///
/// `submission_id` becomes the stored comment id; clients reuse it when
/// retrying the same attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentSubmission {
    pub submission_id: CommentId,
    pub user_id: String,
    pub article_id: String,
    pub content: String,
}

impl CommentSubmission {
    /// Creates a submission with a fresh id.
    pub fn new(
        user_id: impl Into<String>,
        article_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            user_id: user_id.into(),
            article_id: article_id.into(),
            content: content.into(),
        }
    }
}

/// Result of a submission that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Stored and rewarded.
    Admitted { comment: Comment, balance: i64 },
    /// The verifier's reason, unchanged.
    Rejected { reason: String },
    /// This submission id was already admitted earlier; nothing changed.
    AlreadyAdmitted { comment: Comment },
}

pub struct CommentAdmission<'a, A, M, R, V, C, K>
where
    A: AccountRepository,
    M: CommentRepository,
    R: ArticleRepository,
    V: CommentVerifier,
    C: Clock,
    K: Clock,
{
    ledger: &'a AccountLedger<A, K>,
    gate: &'a ModerationGate<V>,
    comments: M,
    articles: R,
    clock: C,
    reward: i64,
}

impl<'a, A, M, R, V, C, K> CommentAdmission<'a, A, M, R, V, C, K>
where
    A: AccountRepository,
    M: CommentRepository,
    R: ArticleRepository,
    V: CommentVerifier,
    C: Clock,
    K: Clock,
{
    pub fn new(
        ledger: &'a AccountLedger<A, K>,
        gate: &'a ModerationGate<V>,
        comments: M,
        articles: R,
        clock: C,
        reward: i64,
    ) -> Self {
        Self {
            ledger,
            gate,
            comments,
            articles,
            clock,
            reward,
        }
    }

    pub fn submit(&self, submission: &CommentSubmission) -> EconomyResult<AdmissionOutcome> {
        self.gate.check_length(&submission.content)?;

        if let Some(existing) = self.comments.get_comment(submission.submission_id)? {
            return self.replayed(submission, existing);
        }

        // Fail before the external call when the student cannot be rewarded.
        self.ledger.get_account(&submission.user_id)?;
        let article = self
            .articles
            .get_article(&submission.article_id)?
            .ok_or_else(|| EconomyError::NotFound {
                entity: "article",
                key: submission.article_id.clone(),
            })?;

        let verdict = self
            .gate
            .verify(&article.content, &article.keywords, &submission.content)?;
        if !verdict.passed {
            info!(
                "event=comment_submit module=admission status=rejected user_id={} article_id={}",
                submission.user_id, submission.article_id
            );
            return Ok(AdmissionOutcome::Rejected {
                reason: verdict.reason,
            });
        }

        let comment = Comment::admitted(
            submission.submission_id,
            submission.user_id.as_str(),
            submission.article_id.as_str(),
            submission.content.trim(),
            self.clock.now_ms(),
        );
        if !self.comments.insert_comment(&comment)? {
            // A concurrent duplicate inserted first and owns the reward.
            let existing = self
                .comments
                .get_comment(comment.id)?
                .unwrap_or(comment);
            return self.replayed(submission, existing);
        }

        match self.ledger.credit(&comment.user_id, self.reward) {
            Ok(balance) => {
                info!(
                    "event=comment_submit module=admission status=admitted user_id={} article_id={} comment_id={} balance={balance}",
                    comment.user_id, comment.article_id, comment.id
                );
                Ok(AdmissionOutcome::Admitted { comment, balance })
            }
            Err(err) => {
                error!(
                    "event=comment_reward module=admission status=reward_failed user_id={} comment_id={} amount={} error={err}",
                    comment.user_id, comment.id, self.reward
                );
                Err(EconomyError::RewardFailed {
                    comment: Box::new(comment),
                    source: Box::new(err),
                })
            }
        }
    }

    fn replayed(
        &self,
        submission: &CommentSubmission,
        existing: Comment,
    ) -> EconomyResult<AdmissionOutcome> {
        if existing.user_id != submission.user_id || existing.article_id != submission.article_id {
            return Err(EconomyError::SubmissionConflict(submission.submission_id));
        }
        info!(
            "event=comment_submit module=admission status=duplicate user_id={} comment_id={}",
            existing.user_id, existing.id
        );
        Ok(AdmissionOutcome::AlreadyAdmitted { comment: existing })
    }
}
