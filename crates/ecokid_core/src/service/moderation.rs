//! Comment moderation gate in front of the external verifier.
//!
//! # Invariants
//! - Comments under the minimum length fail with `TooShort` before any
//!   external call.
//! - A rejection (`passed == false`) is a normal verdict; only provider
//!   failures become `ModerationUnavailable`.

use crate::ai::{CommentVerifier, ModerationRequest, ModerationVerdict};
use crate::service::error::{EconomyError, EconomyResult};
use log::{info, warn};
use std::time::Instant;

pub struct ModerationGate<V: CommentVerifier> {
    verifier: V,
    min_comment_chars: usize,
}

impl<V: CommentVerifier> ModerationGate<V> {
    pub fn new(verifier: V, min_comment_chars: usize) -> Self {
        Self {
            verifier,
            min_comment_chars,
        }
    }

    /// Length fast-fail. Surrounding whitespace does not count.
    pub fn check_length(&self, comment: &str) -> EconomyResult<()> {
        let actual = comment.trim().chars().count();
        if actual < self.min_comment_chars {
            return Err(EconomyError::TooShort {
                min_chars: self.min_comment_chars,
                actual,
            });
        }
        Ok(())
    }

    /// Asks the verifier for a verdict on `comment`.
    pub fn verify(
        &self,
        article_content: &str,
        article_keywords: &[String],
        comment: &str,
    ) -> EconomyResult<ModerationVerdict> {
        self.check_length(comment)?;

        let started_at = Instant::now();
        let request = ModerationRequest {
            article_content,
            article_keywords,
            comment: comment.trim(),
        };

        match self.verifier.verify(&request) {
            Ok(verdict) => {
                info!(
                    "event=moderation_verdict module=moderation status=ok passed={} duration_ms={}",
                    verdict.passed,
                    started_at.elapsed().as_millis()
                );
                Ok(verdict)
            }
            Err(err) => {
                warn!(
                    "event=moderation_verdict module=moderation status=unavailable duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(EconomyError::ModerationUnavailable(err))
            }
        }
    }
}
