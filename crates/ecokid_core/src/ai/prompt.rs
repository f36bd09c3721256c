//! Prompt construction and response validation for the language model.
//!
//! # Responsibility
//! - Encode the comment moderation policy into the verifier prompt.
//! - Describe the JSON response schemas sent with each request.
//! - Parse and validate model output before it reaches core services.
//!
//! # Invariants
//! - A verdict with an empty `reason` is malformed, not a pass or a fail.
//! - A summary with empty `summary` text is malformed.

use super::{AiError, EasyWord, ModerationRequest, ModerationVerdict, SummaryRequest, SummaryResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

static FENCED_JSON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid fence regex"));

const MAX_ERROR_SNIPPET_CHARS: usize = 120;

/// Builds the moderation prompt.
///
/// Article text is cut to `max_article_chars` characters.
pub fn build_verification_prompt(request: &ModerationRequest<'_>, max_article_chars: usize) -> String {
    let article = truncate_chars(request.article_content, max_article_chars);
    let keywords = if request.article_keywords.is_empty() {
        "(none)".to_string()
    } else {
        request.article_keywords.join(", ")
    };

    format!(
        r#"You review reflection comments that elementary school students (grades 4-6) write after reading an economics news article.

[Article]
{article}

[Article keywords]
{keywords}

[Student comment]
{comment}

Pass the comment only if ALL of the following hold:
1. It is not a verbatim copy or a close paraphrase of the article text.
2. It contains the student's own opinion, feeling, or intention (for example "I think", "I felt", "I will").
3. It is about the article's topic and relates to at least one of the keywords.
4. It is meaningful writing, not filler, repeated characters, or random text.
5. It is at least 20 characters long.

Respond with JSON only: {{"passed": boolean, "reason": string}}.
Write `reason` in the same language as the student comment, in one or two friendly sentences addressed to the student. When the comment fails, say which rule it missed and how to improve it."#,
        comment = request.comment,
    )
}

/// JSON response schema for verdicts.
pub fn verdict_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "passed": { "type": "BOOLEAN" },
            "reason": { "type": "STRING" }
        },
        "required": ["passed", "reason"]
    })
}

/// Builds the summary prompt.
pub fn build_summary_prompt(request: &SummaryRequest<'_>, max_article_chars: usize) -> String {
    format!(
        r#"Summarize the following news article in three short lines for elementary school students, then pick three difficult words from it and explain each one very simply.
Write in the same language as the article.

Title: {title}
Article: {content}

Respond with JSON only: {{"summary": string, "easy_words": [{{"word": string, "meaning": string}}]}}."#,
        title = request.title,
        content = truncate_chars(request.content, max_article_chars),
    )
}

/// JSON response schema for summaries.
pub fn summary_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": { "type": "STRING" },
            "easy_words": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "word": { "type": "STRING" },
                        "meaning": { "type": "STRING" }
                    },
                    "required": ["word", "meaning"]
                }
            }
        },
        "required": ["summary", "easy_words"]
    })
}

/// Pulls the generated text out of a `generateContent` response body.
pub fn extract_candidate_text(body: &Value) -> Result<String, AiError> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| AiError::MalformedResponse("no candidate content parts".to_string()))?;

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<String>();

    if text.trim().is_empty() {
        return Err(AiError::MalformedResponse("empty candidate text".to_string()));
    }
    Ok(text)
}

#[derive(Deserialize)]
struct VerdictPayload {
    passed: bool,
    reason: String,
}

/// Parses and validates verdict JSON produced by the model.
pub fn parse_verdict(text: &str) -> Result<ModerationVerdict, AiError> {
    let payload: VerdictPayload = serde_json::from_str(strip_code_fence(text)).map_err(|err| {
        AiError::MalformedResponse(format!("verdict is not valid JSON ({err}): {}", snippet(text)))
    })?;

    let reason = payload.reason.trim();
    if reason.is_empty() {
        return Err(AiError::MalformedResponse("verdict reason is empty".to_string()));
    }

    Ok(ModerationVerdict {
        passed: payload.passed,
        reason: reason.to_string(),
    })
}

#[derive(Deserialize)]
struct SummaryPayload {
    summary: String,
    #[serde(default)]
    easy_words: Vec<EasyWord>,
}

/// Parses and validates summary JSON produced by the model.
pub fn parse_summary(text: &str) -> Result<SummaryResult, AiError> {
    let payload: SummaryPayload = serde_json::from_str(strip_code_fence(text)).map_err(|err| {
        AiError::MalformedResponse(format!("summary is not valid JSON ({err}): {}", snippet(text)))
    })?;

    let summary = payload.summary.trim();
    if summary.is_empty() {
        return Err(AiError::MalformedResponse("summary text is empty".to_string()));
    }

    Ok(SummaryResult {
        summary: summary.to_string(),
        easy_words: payload
            .easy_words
            .into_iter()
            .filter(|entry| !entry.word.trim().is_empty())
            .collect(),
    })
}

fn strip_code_fence(text: &str) -> &str {
    FENCED_JSON_RE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map_or(text.trim(), |inner| inner.as_str())
}

fn truncate_chars(value: &str, max_chars: usize) -> &str {
    match value.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    }
}

fn snippet(text: &str) -> String {
    let normalized = text.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(MAX_ERROR_SNIPPET_CHARS).collect::<String>();
    if normalized.chars().count() > MAX_ERROR_SNIPPET_CHARS {
        truncated.push_str("...");
    }
    truncated
}
