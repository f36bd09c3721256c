//! External AI contracts: comment verification and article summaries.
//!
//! # Responsibility
//! - Define the request/response shapes exchanged with the language model.
//! - Define the traits core services call, so storage-side logic never
//!   depends on a concrete provider.
//!
//! # Invariants
//! - Provider failures of any kind surface as `AiError`; nothing is retried
//!   or swallowed here.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

/// Input for one moderation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationRequest<'a> {
    pub article_content: &'a str,
    pub article_keywords: &'a [String],
    pub comment: &'a str,
}

/// Pass/fail judgment with a student-facing reason. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub passed: bool,
    pub reason: String,
}

/// Input for one summary call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

/// Difficult word explained for young readers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EasyWord {
    pub word: String,
    pub meaning: String,
}

/// Simplified article summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub summary: String,
    pub easy_words: Vec<EasyWord>,
}

#[derive(Debug)]
pub enum AiError {
    MissingApiKey(String),
    Timeout,
    Transport(reqwest::Error),
    Status { code: u16, body: String },
    MalformedResponse(String),
}

impl AiError {
    /// Whether repeating the same call can succeed without a config change.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::MissingApiKey(_))
    }
}

impl Display for AiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingApiKey(env) => write!(f, "api key missing: set `{env}`"),
            Self::Timeout => write!(f, "ai provider timed out"),
            Self::Transport(err) => write!(f, "ai provider request failed: {err}"),
            Self::Status { code, body } => write!(f, "ai provider returned {code}: {body}"),
            Self::MalformedResponse(message) => {
                write!(f, "ai provider returned an unusable response: {message}")
            }
        }
    }
}

impl Error for AiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AiError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(value)
        }
    }
}

/// Judges whether a reflection comment meets the classroom policy.
pub trait CommentVerifier {
    fn verify(&self, request: &ModerationRequest<'_>) -> Result<ModerationVerdict, AiError>;
}

/// Produces simplified summaries of articles.
pub trait Summarizer {
    fn summarize(&self, request: &SummaryRequest<'_>) -> Result<SummaryResult, AiError>;
}

impl<V: CommentVerifier + ?Sized> CommentVerifier for &V {
    fn verify(&self, request: &ModerationRequest<'_>) -> Result<ModerationVerdict, AiError> {
        (**self).verify(request)
    }
}

impl<S: Summarizer + ?Sized> Summarizer for &S {
    fn summarize(&self, request: &SummaryRequest<'_>) -> Result<SummaryResult, AiError> {
        (**self).summarize(request)
    }
}
