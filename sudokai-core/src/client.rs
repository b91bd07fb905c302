//! Chat-completion transport.
//!
//! Blocking reqwest client (no async runtime required). The solve pipeline
//! talks to the [`ChatClient`] trait, so tests script replies without I/O.

use serde_json::json;

/// Interface for sending a chat-style prompt and receiving the reply text.
///
/// Implementors own transport, serialization, and vendor-specific API
/// details; consumers stay decoupled from any particular provider.
pub trait ChatClient {
    /// Send a `system` framing message followed by a `user` prompt and
    /// return the assistant's reply text.
    fn complete(&self, system: &str, user: &str) -> Result<String, ChatError>;
}

/// Transport-level failure, before any interpretation of the reply.
#[derive(Debug)]
pub enum ChatError {
    /// Connection failure before an HTTP status was received
    Network(String),
    /// Non-2xx HTTP status, with the response body
    Http(u16, String),
    /// Reply arrived but its envelope could not be read
    Parse(String),
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatError::Network(msg) => write!(f, "Network error: {}", msg),
            ChatError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ChatError::Parse(msg) => write!(f, "Parse error: {}", msg),
        }
    }
}

impl std::error::Error for ChatError {}

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI chat-completions client (blocking).
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Client against the default endpoint and model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_API_BASE, DEFAULT_MODEL, api_key)
    }

    /// Client against an explicit endpoint and model identifier.
    pub fn with_endpoint(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("sudokai/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        let api_base = api_base.into();
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

impl ChatClient for OpenAiClient {
    fn complete(&self, system: &str, user: &str) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "response_format": { "type": "json_object" },
        });

        // One request per call: no retries, no timeout override beyond the
        // transport default, no streaming.
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ChatError::Http(status, body));
        }

        let reply: serde_json::Value = response
            .json()
            .map_err(|e| ChatError::Parse(e.to_string()))?;
        reply["choices"][0]["message"]["content"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ChatError::Parse("missing message content in reply".into()))
    }
}
