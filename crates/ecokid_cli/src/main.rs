//! Command-line front end for the EcoKid student economy.
//!
//! # Responsibility
//! - Map subcommands onto `EconomyDesk` operations for one student.
//! - Keep output plain text so classroom scripts can grep it.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use ecokid_core::db::open_db;
use ecokid_core::model::article::parse_keywords;
use ecokid_core::{
    default_log_level, init_logging, AdmissionOutcome, AiError, AppConfig, Article, Charge,
    Clock, CommentSubmission, CommentVerifier, EconomyDesk, EconomyError, GeminiClient,
    ModerationRequest, ModerationVerdict, Summarizer, SummaryRequest, SummaryResult, SystemClock,
};
use log::warn;
use std::path::PathBuf;
use uuid::Uuid;

const DEFAULT_DB_FILE_NAME: &str = "ecokid.sqlite3";

#[derive(Debug, Parser)]
#[command(name = "ecokid", version, about = "Student points, AI quota and comment admission")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path; overrides `database_path` from the config.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the student's account and AI usage rows if missing.
    Init {
        #[arg(long)]
        user: String,
    },
    /// Show the student's point balance.
    Balance {
        #[arg(long)]
        user: String,
    },
    /// Show remaining free AI uses (applies a due weekly reset).
    Usage {
        #[arg(long)]
        user: String,
    },
    /// Summarize an article and charge the student for it.
    Summarize {
        #[arg(long)]
        user: String,
        #[arg(long)]
        article: String,
    },
    /// Submit a reflection comment for moderation.
    Comment {
        #[arg(long)]
        user: String,
        #[arg(long)]
        article: String,
        #[arg(long)]
        text: String,
        /// Reuse the id printed by a failed attempt to retry it safely.
        #[arg(long)]
        submission_id: Option<Uuid>,
    },
    /// List admitted comments, newest first.
    Comments {
        #[arg(long)]
        article: Option<String>,
    },
    /// Store an article so students can summarize and comment on it.
    AddArticle {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long, default_value = "")]
        url: String,
        /// Comma-separated keywords.
        #[arg(long, default_value = "")]
        keywords: String,
    },
}

/// Gemini when an API key is configured, otherwise a stand-in that reports
/// the missing key only when an AI call is actually attempted.
enum AiBackend {
    Gemini(GeminiClient),
    Offline { api_key_env: String },
}

impl CommentVerifier for AiBackend {
    fn verify(&self, request: &ModerationRequest<'_>) -> Result<ModerationVerdict, AiError> {
        match self {
            Self::Gemini(client) => client.verify(request),
            Self::Offline { api_key_env } => Err(AiError::MissingApiKey(api_key_env.clone())),
        }
    }
}

impl Summarizer for AiBackend {
    fn summarize(&self, request: &SummaryRequest<'_>) -> Result<SummaryResult, AiError> {
        match self {
            Self::Gemini(client) => client.summarize(request),
            Self::Offline { api_key_env } => Err(AiError::MissingApiKey(api_key_env.clone())),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if let Some(log_dir) = &config.log_dir {
        let level = config.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let db_path = cli
        .db
        .clone()
        .or_else(|| config.database_path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME));
    let conn = open_db(&db_path)
        .with_context(|| format!("failed to open database `{}`", db_path.display()))?;

    let backend = match GeminiClient::from_config(&config.gemini) {
        Ok(client) => AiBackend::Gemini(client),
        Err(AiError::MissingApiKey(api_key_env)) => AiBackend::Offline { api_key_env },
        Err(err) => return Err(err.into()),
    };
    let desk = EconomyDesk::new(&conn, config.economy.clone(), &backend, &backend, SystemClock);

    run(&desk, cli.command)
}

fn run<V, S>(desk: &EconomyDesk<'_, V, S, SystemClock>, command: Command) -> Result<()>
where
    V: CommentVerifier,
    S: Summarizer,
{
    match command {
        Command::Init { user } => {
            desk.ensure_initialized(&user)?;
            let account = desk.get_account(&user)?;
            println!("initialized user={} account={}", account.user_id, account.account_id);
        }
        Command::Balance { user } => {
            println!("balance={}", desk.get_balance(&user)?);
        }
        Command::Usage { user } => {
            let usage = desk.get_usage(&user)?;
            println!(
                "free_uses={} last_reset_at={}",
                usage.free_usage_count, usage.last_reset_at
            );
        }
        Command::Summarize { user, article } => {
            let receipt = desk
                .request_ai_summary(&user, &article)
                .map_err(unconfigured_ai_or)?;
            println!("{}", receipt.summary.summary);
            for word in &receipt.summary.easy_words {
                println!("- {}: {}", word.word, word.meaning);
            }
            match receipt.charge {
                Charge::FreeUse => println!("charged=free_use"),
                Charge::Points { amount, balance } => {
                    println!("charged={amount} balance={balance}")
                }
            }
        }
        Command::Comment {
            user,
            article,
            text,
            submission_id,
        } => {
            let mut submission = CommentSubmission::new(user, article, text);
            if let Some(id) = submission_id {
                submission.submission_id = id;
            }
            submit_comment(desk, &submission)?;
        }
        Command::Comments { article } => {
            for comment in desk.list_comments(article.as_deref())? {
                println!(
                    "{} user={} article={} created_at={} {}",
                    comment.id, comment.user_id, comment.article_id, comment.created_at, comment.content
                );
            }
        }
        Command::AddArticle {
            id,
            title,
            content,
            url,
            keywords,
        } => {
            let article = Article {
                id,
                title,
                content,
                url,
                keywords: parse_keywords(&keywords),
                is_approved: true,
                created_at: SystemClock.now_ms(),
            };
            desk.add_article(&article)?;
            println!("article={} keywords={}", article.id, article.keywords.join(","));
        }
    }
    Ok(())
}

fn submit_comment<V, S>(
    desk: &EconomyDesk<'_, V, S, SystemClock>,
    submission: &CommentSubmission,
) -> Result<()>
where
    V: CommentVerifier,
    S: Summarizer,
{
    match desk.submit_comment(submission) {
        Ok(AdmissionOutcome::Admitted { comment, balance }) => {
            println!("admitted comment={} balance={balance}", comment.id);
        }
        Ok(AdmissionOutcome::AlreadyAdmitted { comment }) => {
            println!("already_admitted comment={}", comment.id);
        }
        Ok(AdmissionOutcome::Rejected { reason }) => {
            println!("rejected reason={reason}");
        }
        Err(EconomyError::RewardFailed { comment, source }) => {
            warn!(
                "event=cli_comment module=cli status=reward_failed comment_id={}",
                comment.id
            );
            println!(
                "saved comment={} but points are delayed: {source}",
                comment.id
            );
        }
        Err(err) if err.is_retryable() => {
            bail!(
                "{err} (retry with --submission-id {})",
                submission.submission_id
            );
        }
        Err(err) => return Err(unconfigured_ai_or(err)),
    }
    Ok(())
}

/// Turns a missing API key into a configuration error; other errors pass
/// through unchanged.
fn unconfigured_ai_or(err: EconomyError) -> anyhow::Error {
    if let Some(AiError::MissingApiKey(api_key_env)) = err.ai_error() {
        return anyhow!(
            "ai provider is not configured: export `{api_key_env}` or set `gemini.api_key_env` in the config file"
        );
    }
    err.into()
}
