//! Gemini `generateContent` client for verification and summaries.
//!
//! # Invariants
//! - Every request carries the client timeout; a slow provider surfaces as
//!   `AiError::Timeout`, never as a hang.
//! - The API key travels in the `x-goog-api-key` header and is never logged.

use super::prompt::{
    build_summary_prompt, build_verification_prompt, extract_candidate_text, parse_summary,
    parse_verdict, summary_schema, verdict_schema,
};
use super::{
    AiError, CommentVerifier, ModerationRequest, ModerationVerdict, Summarizer, SummaryRequest,
    SummaryResult,
};
use crate::config::GeminiConfig;
use log::{info, warn};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

const MAX_ERROR_BODY_CHARS: usize = 300;

/// Blocking Gemini client implementing both AI contracts.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    max_article_chars: usize,
}

impl GeminiClient {
    /// Builds a client from config, reading the API key from the environment.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, AiError> {
        let api_key = config
            .api_key_from_env()
            .ok_or_else(|| AiError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    /// Builds a client with an explicit API key.
    pub fn new(config: &GeminiConfig, api_key: impl Into<String>) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key: api_key.into(),
            max_article_chars: config.max_article_chars,
        })
    }

    fn generate(&self, action: &'static str, prompt: String, schema: Value) -> Result<String, AiError> {
        let started_at = Instant::now();
        let payload = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }],
            "generationConfig": {
                "temperature": 0.2,
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });

        let result = self.send(&payload);
        match &result {
            Ok(_) => info!(
                "event=ai_call module=ai status=ok action={action} duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=ai_call module=ai status=error action={action} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    fn send(&self, payload: &Value) -> Result<String, AiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AiError::Status {
                code: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body: Value = response
            .json()
            .map_err(|err| AiError::MalformedResponse(format!("response body is not JSON: {err}")))?;
        extract_candidate_text(&body)
    }
}

impl CommentVerifier for GeminiClient {
    fn verify(&self, request: &ModerationRequest<'_>) -> Result<ModerationVerdict, AiError> {
        let prompt = build_verification_prompt(request, self.max_article_chars);
        let text = self.generate("verify", prompt, verdict_schema())?;
        parse_verdict(&text)
    }
}

impl Summarizer for GeminiClient {
    fn summarize(&self, request: &SummaryRequest<'_>) -> Result<SummaryResult, AiError> {
        let prompt = build_summary_prompt(request, self.max_article_chars);
        let text = self.generate("summarize", prompt, summary_schema())?;
        parse_summary(&text)
    }
}
