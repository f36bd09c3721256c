//! Error taxonomy for economy use-cases.

use crate::ai::AiError;
use crate::model::comment::{Comment, CommentId};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EconomyResult<T> = Result<T, EconomyError>;

#[derive(Debug)]
pub enum EconomyError {
    /// Account, usage row or article is missing; students must be
    /// initialized first.
    NotFound { entity: &'static str, key: String },
    /// Credit/debit amounts must be positive.
    InvalidAmount(i64),
    /// Comment shorter than the minimum; no call was made.
    TooShort { min_chars: usize, actual: usize },
    /// The verifier failed or answered unusably. Nothing stored; retryable
    /// unless the provider is not configured.
    ModerationUnavailable(AiError),
    /// The summarizer failed. Retryable; nothing billed.
    SummaryUnavailable(AiError),
    /// Advisory: no free uses left and balance below the action cost.
    InsufficientFunds { balance: i64, required: i64 },
    /// Comment was stored but the reward credit failed.
    RewardFailed {
        comment: Box<Comment>,
        source: Box<EconomyError>,
    },
    /// The AI action completed but charging for it failed.
    BillingFailed(Box<EconomyError>),
    /// A submission id is already used by a different student or article.
    SubmissionConflict(CommentId),
    Repo(RepoError),
}

impl EconomyError {
    /// Whether the caller may simply retry the same request.
    ///
    /// Provider outages are retryable; a missing API key is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ModerationUnavailable(err) | Self::SummaryUnavailable(err) => err.is_transient(),
            _ => false,
        }
    }

    /// The AI provider failure behind this error, if any.
    pub fn ai_error(&self) -> Option<&AiError> {
        match self {
            Self::ModerationUnavailable(err) | Self::SummaryUnavailable(err) => Some(err),
            _ => None,
        }
    }

    /// Stable machine-readable code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::TooShort { .. } => "too_short",
            Self::ModerationUnavailable(_) => "moderation_unavailable",
            Self::SummaryUnavailable(_) => "summary_unavailable",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::RewardFailed { .. } => "reward_failed",
            Self::BillingFailed(_) => "billing_failed",
            Self::SubmissionConflict(_) => "submission_conflict",
            Self::Repo(_) => "storage_error",
        }
    }
}

impl Display for EconomyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::InvalidAmount(amount) => write!(f, "amount must be positive, got {amount}"),
            Self::TooShort { min_chars, actual } => write!(
                f,
                "comment is too short: {actual} characters, at least {min_chars} required"
            ),
            Self::ModerationUnavailable(err) => write!(f, "moderation unavailable: {err}"),
            Self::SummaryUnavailable(err) => write!(f, "summary unavailable: {err}"),
            Self::InsufficientFunds { balance, required } => write!(
                f,
                "insufficient points: balance {balance}, {required} required"
            ),
            Self::RewardFailed { comment, source } => write!(
                f,
                "comment {} was saved but the reward was not applied: {source}",
                comment.id
            ),
            Self::BillingFailed(source) => write!(f, "ai action completed but billing failed: {source}"),
            Self::SubmissionConflict(id) => write!(f, "submission id already used: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EconomyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ModerationUnavailable(err) | Self::SummaryUnavailable(err) => Some(err),
            Self::RewardFailed { source, .. } => Some(source.as_ref()),
            Self::BillingFailed(source) => Some(source.as_ref()),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EconomyError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, key } => Self::NotFound { entity, key },
            other => Self::Repo(other),
        }
    }
}
