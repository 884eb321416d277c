//! Topic wire format
//!
//! Key is the UTF-8 bytes of the article ID; value is the JSON-encoded
//! [`Article`]. `content` is omitted from the JSON when empty.

use crate::article::{Article, ArticleError};
use thiserror::Error;

/// Wire encode/decode errors
#[derive(Debug, Error)]
pub enum WireError {
    /// Message carried no value
    #[error("message has no payload")]
    EmptyPayload,

    /// Value is not valid JSON for an article
    #[error("invalid article json: {0}")]
    Json(#[from] serde_json::Error),

    /// Value decoded but violates article invariants
    #[error("invalid article: {0}")]
    Invalid(#[from] ArticleError),
}

/// Partition key for an article
pub fn message_key(article: &Article) -> &[u8] {
    article.id.as_bytes()
}

/// Encode an article as a topic value
pub fn encode_article(article: &Article) -> Result<Vec<u8>, WireError> {
    Ok(serde_json::to_vec(article)?)
}

/// Decode a topic value into a validated article.
///
/// A missing payload, malformed JSON, or an article that fails validation
/// are all reported as errors; the consumer treats every one of them as a
/// poison message.
pub fn decode_article(payload: Option<&[u8]>) -> Result<Article, WireError> {
    let payload = payload.ok_or(WireError::EmptyPayload)?;
    let article: Article = serde_json::from_slice(payload)?;
    article.validate()?;
    Ok(article)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample() -> Article {
        Article {
            id: "vnexpress-abc".to_string(),
            title: "Title".to_string(),
            url: "https://vnexpress.net/abc.html".to_string(),
            source: "VnExpress".to_string(),
            published: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
            content: String::new(),
        }
    }

    #[test]
    fn test_empty_content_is_omitted() {
        let json: serde_json::Value =
            serde_json::from_slice(&encode_article(&sample()).unwrap()).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["published"], "2024-05-01T08:30:00Z");
        assert_eq!(json["id"], "vnexpress-abc");
    }

    #[test]
    fn test_decode_accepts_missing_content() {
        let raw = br#"{"id":"a","title":"T","url":"https://x.org/a","source":"s","published":"2024-05-01T08:30:00+07:00"}"#;
        let article = decode_article(Some(raw)).unwrap();
        assert_eq!(article.content, "");
        assert_eq!(
            article.published,
            Utc.with_ymd_and_hms(2024, 5, 1, 1, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_decode_rejects_poison() {
        assert!(matches!(decode_article(None), Err(WireError::EmptyPayload)));
        assert!(matches!(
            decode_article(Some(b"not json")),
            Err(WireError::Json(_))
        ));
        let empty_title = br#"{"id":"a","title":"","url":"https://x.org/a","source":"s","published":"2024-05-01T08:30:00Z"}"#;
        assert!(matches!(
            decode_article(Some(empty_title)),
            Err(WireError::Invalid(_))
        ));
    }

    #[test]
    fn test_key_is_id_bytes() {
        let article = sample();
        assert_eq!(message_key(&article), b"vnexpress-abc");
    }
}
