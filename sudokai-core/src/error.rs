use thiserror::Error;

/// Failure taxonomy for a solve request. Every variant renders as a message
/// fit for direct display; the UI shows it and the user retries manually.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("Invalid API key. Please check your OpenAI API key.")]
    Auth,
    #[error("API quota exceeded. Please try again later.")]
    RateLimit,
    #[error("Error parsing AI response: {0}")]
    ResponseFormat(String),
    #[error("The puzzle could not be solved. Please check if all numbers are entered correctly.")]
    Unsolvable,
    #[error("{0}")]
    Unknown(String),
}

impl SolveError {
    /// Reclassify a transport failure by its rendered message so the caller
    /// can show something actionable instead of a raw transport error.
    ///
    /// Substring matching is deliberate: the endpoint's error bodies carry
    /// the relevant wording, and structured error codes are not relied on.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("api key") {
            SolveError::Auth
        } else if lower.contains("quota") || lower.contains("rate limit") {
            SolveError::RateLimit
        } else if lower.contains("json") {
            SolveError::ResponseFormat(message.to_string())
        } else {
            SolveError::Unknown(message.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_mentions_classify_as_auth() {
        let err = SolveError::classify("HTTP 401: Incorrect API key provided: sk-***");
        assert_eq!(err, SolveError::Auth);
    }

    #[test]
    fn quota_and_rate_limit_classify_as_rate_limit() {
        assert_eq!(
            SolveError::classify("HTTP 429: Rate limit reached for gpt-4o"),
            SolveError::RateLimit
        );
        assert_eq!(
            SolveError::classify("HTTP 429: You exceeded your current quota"),
            SolveError::RateLimit
        );
    }

    #[test]
    fn json_mentions_classify_as_response_format() {
        let err = SolveError::classify("expected value at line 1 column 1 while decoding JSON");
        assert!(matches!(err, SolveError::ResponseFormat(_)));
    }

    #[test]
    fn everything_else_preserves_the_message() {
        let err = SolveError::classify("Network error: connection reset by peer");
        match err {
            SolveError::Unknown(msg) => assert!(msg.contains("connection reset by peer")),
            other => panic!("expected Unknown, got {other:?}"),
        }
    }
}
