//! LLM client, the only place the evaluator talks to the Messages API.
//!
//! Two collaborators use it: requirement decomposition and the triage critic.
//! Both are optional; without an API key the evaluator runs rule-based only.
//!
//! A call is exactly one request. Retrying is the caller's business and goes
//! through [`RetryPolicy`](crate::triage::RetryPolicy).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
/// Pinned so decomposition and critique stay comparable across runs.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    /// The request never produced a usable HTTP response.
    #[error("transport failed: {0}")]
    Transport(String),

    #[error("API returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response arrived but its content is not what was asked for.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessagesResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl MessagesResponse {
    /// Text of the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.kind == "text")
            .and_then(|b| b.text.as_deref())
    }

    /// Convenience for transports that answer with a fixed string.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock {
                kind: "text".to_string(),
                text: Some(text.into()),
            }],
            usage: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Transport
// ────────────────────────────────────────────────────────────────────────────

/// Sends one Messages request. Implementations must not retry.
#[async_trait]
pub trait MessagesTransport: Send + Sync {
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError>;
}

/// HTTPS transport against the public endpoint.
pub struct HttpTransport {
    client: Client,
    api_key: String,
}

impl HttpTransport {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl MessagesTransport for HttpTransport {
    async fn send(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError> {
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<MessagesResponse>()
            .await
            .map_err(|e| LlmError::Malformed(e.to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LlmClient {
    transport: Arc<dyn MessagesTransport>,
}

impl LlmClient {
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        Ok(Self::with_transport(Arc::new(HttpTransport::new(api_key)?)))
    }

    pub fn with_transport(transport: Arc<dyn MessagesTransport>) -> Self {
        Self { transport }
    }

    pub fn request(prompt: &str, system: &str) -> MessagesRequest {
        MessagesRequest {
            model: MODEL.to_string(),
            max_tokens: MAX_TOKENS,
            system: system.to_string(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        }
    }

    /// One request, no retry.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<MessagesResponse, LlmError> {
        let response = self.transport.send(&Self::request(prompt, system)).await?;
        if let Some(usage) = response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "LLM call succeeded"
            );
        }
        Ok(response)
    }

    /// Calls the model and parses its text as JSON. The prompt must ask for
    /// JSON only.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response
            .text()
            .ok_or_else(|| LlmError::Malformed("no text content".to_string()))?;
        serde_json::from_str(unfence(text)).map_err(|e| LlmError::Malformed(e.to_string()))
    }
}

/// Drops a surrounding markdown code fence, with or without a language tag.
fn unfence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest).trim_start();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
pub mod testing {
    //! Scripted transport for tests.

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replays queued replies in order and counts requests. Once the queue is
    /// empty every further request gets `fallback`.
    pub struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<String, u16>>>,
        fallback: Result<String, u16>,
        requests: AtomicUsize,
    }

    impl ScriptedTransport {
        pub fn new(replies: Vec<Result<String, u16>>, fallback: Result<String, u16>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                fallback,
                requests: AtomicUsize::new(0),
            }
        }

        /// Always answers with HTTP `status`.
        pub fn failing(status: u16) -> Self {
            Self::new(vec![], Err(status))
        }

        pub fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessagesTransport for ScriptedTransport {
        async fn send(&self, _request: &MessagesRequest) -> Result<MessagesResponse, LlmError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            match reply {
                Ok(text) => Ok(MessagesResponse::from_text(text)),
                Err(status) => Err(LlmError::Status {
                    status,
                    message: "scripted".to_string(),
                }),
            }
        }
    }
}
