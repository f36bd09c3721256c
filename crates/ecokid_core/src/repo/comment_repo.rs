//! Comment repository contract and SQLite implementation.
//!
//! # Invariants
//! - Write paths call `Comment::validate()` before SQL mutations, so a
//!   non-passed comment can never be stored.
//! - Inserts are conflict-ignoring on `id`; a duplicate submission id is
//!   reported, not overwritten.

use crate::model::comment::{Comment, CommentId};
use crate::repo::{bool_to_int, int_to_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const COMMENT_SELECT_SQL: &str = "SELECT
    id,
    user_id,
    article_id,
    content,
    is_passed,
    created_at
FROM comments";

/// Data access for admitted comments.
pub trait CommentRepository {
    /// Returns `true` when the row was inserted, `false` when `comment.id`
    /// already exists.
    fn insert_comment(&self, comment: &Comment) -> RepoResult<bool>;
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>>;
    /// Lists comments newest first, optionally for one article.
    fn list_comments(&self, article_id: Option<&str>) -> RepoResult<Vec<Comment>>;
}

/// SQLite-backed comment repository.
#[derive(Clone, Copy)]
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn insert_comment(&self, comment: &Comment) -> RepoResult<bool> {
        comment.validate()?;

        let inserted = self.conn.execute(
            "INSERT INTO comments (id, user_id, article_id, content, is_passed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO NOTHING;",
            params![
                comment.id.to_string(),
                comment.user_id.as_str(),
                comment.article_id.as_str(),
                comment.content.as_str(),
                bool_to_int(comment.is_passed),
                comment.created_at,
            ],
        )?;

        Ok(inserted == 1)
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_row(row)?));
        }
        Ok(None)
    }

    fn list_comments(&self, article_id: Option<&str>) -> RepoResult<Vec<Comment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{COMMENT_SELECT_SQL}
             WHERE (?1 IS NULL OR article_id = ?1)
             ORDER BY created_at DESC, id ASC;"
        ))?;
        let mut rows = stmt.query(params![article_id])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_row(row)?);
        }
        Ok(comments)
    }
}

fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in comments.id"))
    })?;

    let comment = Comment {
        id,
        user_id: row.get("user_id")?,
        article_id: row.get("article_id")?,
        content: row.get("content")?,
        is_passed: int_to_bool(row.get("is_passed")?, "comments.is_passed")?,
        created_at: row.get("created_at")?,
    };
    comment.validate()?;
    Ok(comment)
}
