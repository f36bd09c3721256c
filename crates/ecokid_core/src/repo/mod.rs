//! Repository contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define per-table data access contracts for the economy.
//! - Keep SQL inside the persistence boundary; services never see it.
//!
//! # Invariants
//! - Balance and free-use changes are single-statement atomic updates; no
//!   repository reads a value, computes a new one and writes it back.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

use crate::db::DbError;
use crate::model::comment::CommentValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account_repo;
pub mod article_repo;
pub mod comment_repo;
pub mod usage_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all economy tables.
#[derive(Debug)]
pub enum RepoError {
    Validation(CommentValidationError),
    Db(DbError),
    NotFound { entity: &'static str, key: String },
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<CommentValidationError> for RepoError {
    fn from(value: CommentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
