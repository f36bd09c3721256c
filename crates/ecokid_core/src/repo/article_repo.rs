//! Article repository: the read side moderation and summaries depend on.
//!
//! Article curation and editing live outside core; `insert_article` exists
//! for seeding and imports.

use crate::model::article::{parse_keywords, Article};
use crate::repo::{bool_to_int, int_to_bool, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

pub trait ArticleRepository {
    fn insert_article(&self, article: &Article) -> RepoResult<()>;
    fn get_article(&self, id: &str) -> RepoResult<Option<Article>>;
}

/// SQLite-backed article repository.
#[derive(Clone, Copy)]
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn insert_article(&self, article: &Article) -> RepoResult<()> {
        let keywords = serde_json::to_string(&article.keywords)
            .map_err(|err| RepoError::InvalidData(format!("unserializable keywords: {err}")))?;

        self.conn.execute(
            "INSERT INTO articles (id, title, content, url, keywords, is_approved, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                article.id.as_str(),
                article.title.as_str(),
                article.content.as_str(),
                article.url.as_str(),
                keywords,
                bool_to_int(article.is_approved),
                article.created_at,
            ],
        )?;
        Ok(())
    }

    fn get_article(&self, id: &str) -> RepoResult<Option<Article>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, content, url, keywords, is_approved, created_at
             FROM articles
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_article_row(row)?));
        }
        Ok(None)
    }
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let keywords: String = row.get("keywords")?;
    Ok(Article {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        url: row.get("url")?,
        keywords: parse_keywords(&keywords),
        is_approved: int_to_bool(row.get("is_approved")?, "articles.is_approved")?,
        created_at: row.get("created_at")?,
    })
}
