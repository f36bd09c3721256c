//! Admitted reflection comment.
//!
//! # Invariants
//! - Only comments that passed moderation are ever constructed for storage.
//! - Comments are immutable once stored.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type CommentId = Uuid;

/// A reflection comment that passed moderation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub user_id: String,
    pub article_id: String,
    pub content: String,
    pub is_passed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Validation errors for comment persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentValidationError {
    NotPassed,
    EmptyContent,
    MissingUserId,
    MissingArticleId,
}

impl Display for CommentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPassed => write!(f, "only passed comments can be stored"),
            Self::EmptyContent => write!(f, "comment content cannot be empty"),
            Self::MissingUserId => write!(f, "comment user_id cannot be empty"),
            Self::MissingArticleId => write!(f, "comment article_id cannot be empty"),
        }
    }
}

impl Error for CommentValidationError {}

impl Comment {
    /// Builds the record stored after a passing verdict.
    pub fn admitted(
        id: CommentId,
        user_id: impl Into<String>,
        article_id: impl Into<String>,
        content: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            article_id: article_id.into(),
            content: content.into(),
            is_passed: true,
            created_at,
        }
    }

    pub fn validate(&self) -> Result<(), CommentValidationError> {
        if !self.is_passed {
            return Err(CommentValidationError::NotPassed);
        }
        if self.content.trim().is_empty() {
            return Err(CommentValidationError::EmptyContent);
        }
        if self.user_id.trim().is_empty() {
            return Err(CommentValidationError::MissingUserId);
        }
        if self.article_id.trim().is_empty() {
            return Err(CommentValidationError::MissingArticleId);
        }
        Ok(())
    }
}
