#![allow(dead_code)]

use ecokid_core::{
    AiError, Article, CommentVerifier, EasyWord, ModerationRequest, ModerationVerdict, Summarizer,
    SummaryRequest, SummaryResult,
};
use std::cell::{Cell, RefCell};

pub const ARTICLE_ID: &str = "article-rates";
pub const STUDENT: &str = "student-0412";

/// A comment long enough to pass the length gate.
pub const GOOD_COMMENT: &str = "금리가 오르면 저축을 더 해야겠다고 생각했어요. 용돈을 아껴 볼래요.";

pub fn rates_article() -> Article {
    Article {
        id: ARTICLE_ID.to_string(),
        title: "한국은행, 기준금리 인상".to_string(),
        content: "한국은행이 물가를 잡기 위해 기준금리를 올렸어요. 은행 예금 이자도 함께 오를 전망이에요."
            .to_string(),
        url: "https://news.example.com/rates".to_string(),
        keywords: vec!["금리".to_string(), "저축".to_string(), "물가".to_string()],
        is_approved: true,
        created_at: 1_700_000_000_000,
    }
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Pass,
    Reject(&'static str),
    Unavailable,
    Unconfigured,
}

/// Verifier double that answers with a fixed script and records calls.
pub struct FakeVerifier {
    answer: Scripted,
    calls: Cell<usize>,
    last_keywords: RefCell<Vec<String>>,
}

impl FakeVerifier {
    pub fn new(answer: Scripted) -> Self {
        Self {
            answer,
            calls: Cell::new(0),
            last_keywords: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn last_keywords(&self) -> Vec<String> {
        self.last_keywords.borrow().clone()
    }
}

impl CommentVerifier for FakeVerifier {
    fn verify(&self, request: &ModerationRequest<'_>) -> Result<ModerationVerdict, AiError> {
        self.calls.set(self.calls.get() + 1);
        *self.last_keywords.borrow_mut() = request.article_keywords.to_vec();
        match &self.answer {
            Scripted::Pass => Ok(ModerationVerdict {
                passed: true,
                reason: "자신의 생각이 잘 드러났어요!".to_string(),
            }),
            Scripted::Reject(reason) => Ok(ModerationVerdict {
                passed: false,
                reason: (*reason).to_string(),
            }),
            Scripted::Unavailable => Err(AiError::Timeout),
            Scripted::Unconfigured => Err(AiError::MissingApiKey("GEMINI_API_KEY".to_string())),
        }
    }
}

/// Summarizer double that succeeds or times out.
pub struct FakeSummarizer {
    fail: bool,
    calls: Cell<usize>,
}

impl FakeSummarizer {
    pub fn working() -> Self {
        Self {
            fail: false,
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Summarizer for FakeSummarizer {
    fn summarize(&self, request: &SummaryRequest<'_>) -> Result<SummaryResult, AiError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(AiError::Status {
                code: 503,
                body: "overloaded".to_string(),
            });
        }
        Ok(SummaryResult {
            summary: format!("{} 요약", request.title),
            easy_words: vec![EasyWord {
                word: "금리".to_string(),
                meaning: "돈을 빌릴 때 내는 값".to_string(),
            }],
        })
    }
}
