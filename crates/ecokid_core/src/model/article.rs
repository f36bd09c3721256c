//! Read-only article context for moderation and summaries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A curated news article students read and comment on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub url: String,
    pub keywords: Vec<String>,
    pub is_approved: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Normalizes stored keyword text into a clean list.
///
/// Accepts a JSON array (current format) or a comma-separated string
/// (legacy imports and CLI input). Text that only looks like JSON, such as
/// `[속보] 금리, 저축`, is split on commas. Entries are trimmed and empty
/// entries dropped.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let items = json_keywords(trimmed)
        .unwrap_or_else(|| trimmed.split(',').map(str::to_string).collect());

    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Scalar array entries become keywords; nested arrays and objects are
/// skipped. `None` when the text is not a JSON array at all.
fn json_keywords(text: &str) -> Option<Vec<String>> {
    if !text.starts_with('[') {
        return None;
    }
    let values = serde_json::from_str::<Vec<Value>>(text).ok()?;
    Some(
        values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(text) => Some(text),
                Value::Number(number) => Some(number.to_string()),
                Value::Bool(flag) => Some(flag.to_string()),
                Value::Null | Value::Array(_) | Value::Object(_) => None,
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::parse_keywords;

    #[test]
    fn parses_json_arrays() {
        assert_eq!(
            parse_keywords(r#"["금리", " 저축 ", ""]"#),
            vec!["금리".to_string(), "저축".to_string()]
        );
    }

    #[test]
    fn parses_legacy_comma_lists() {
        assert_eq!(
            parse_keywords("inflation, savings,,  prices "),
            vec![
                "inflation".to_string(),
                "savings".to_string(),
                "prices".to_string()
            ]
        );
    }

    #[test]
    fn bracketed_headline_tags_fall_back_to_comma_split() {
        assert_eq!(
            parse_keywords("[속보] 금리, 저축"),
            vec!["[속보] 금리".to_string(), "저축".to_string()]
        );
    }

    #[test]
    fn mixed_json_arrays_keep_scalar_entries() {
        assert_eq!(
            parse_keywords(r#"["금리", 3, null, ["nested"]]"#),
            vec!["금리".to_string(), "3".to_string()]
        );
    }

    #[test]
    fn empty_text_yields_no_keywords() {
        assert!(parse_keywords("").is_empty());
        assert!(parse_keywords("[]").is_empty());
    }
}
