//! LLM client abstraction.
//!
//! A generic interface for calling an OpenAI-compatible chat-completions
//! backend with a tool catalog, plus a fake client for testing. The daemon
//! depends only on the `LlmClient` trait, never on the transport.

use crate::tools::ToolSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// LLM errors.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// The provider refused the request as malformed (HTTP 400).
    #[error("model rejected the request: {0}")]
    Rejected(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("invalid response from model: {0}")]
    InvalidResponse(String),

    #[error("model returned an empty response")]
    Empty,
}

/// One structured call selected by the model. `arguments` is the raw JSON
/// payload, decoded later by the tool layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelToolCall {
    pub name: String,
    pub arguments: String,
}

/// What the model answered: zero or more structured calls, or free text.
#[derive(Debug, Clone, Default)]
pub struct ModelReply {
    pub content: Option<String>,
    pub tool_calls: Vec<ModelToolCall>,
}

/// Generic LLM client trait.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send one prompt with the tool catalog, requesting automatic tool
    /// selection, and return the model's reply.
    async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        tools: &[ToolSpec],
    ) -> Result<ModelReply, LlmError>;
}

/// Real client implementation over HTTP.
pub struct HttpLlmClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        tools: &[ToolSpec],
    ) -> Result<ModelReply, LlmError> {
        let url = format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'));

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
            "tools": tools.iter().map(ToolSpec::to_wire).collect::<Vec<_>>(),
            "tool_choice": "auto",
        });

        let mut request = self.client.post(&url).json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        tracing::debug!(model = %self.config.model, "sending chat-completion request");

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout(self.config.timeout_secs)
            } else {
                LlmError::Http(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let detail = response.text().await.unwrap_or_default();
            return Err(LlmError::Rejected(detail));
        }
        if !status.is_success() {
            return Err(LlmError::Http(format!("HTTP {status} from model backend")));
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        reply_from_completion(completion)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<RawToolCall>,
}

#[derive(Debug, Deserialize)]
struct RawToolCall {
    function: RawFunction,
}

#[derive(Debug, Deserialize)]
struct RawFunction {
    name: String,
    arguments: String,
}

fn reply_from_completion(completion: ChatCompletion) -> Result<ModelReply, LlmError> {
    let choice = completion.choices.into_iter().next().ok_or(LlmError::Empty)?;

    Ok(ModelReply {
        content: choice.message.content,
        tool_calls: choice
            .message
            .tool_calls
            .into_iter()
            .map(|tc| ModelToolCall {
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect(),
    })
}

/// Fake LLM client for testing.
pub struct FakeLlmClient {
    replies: std::sync::Mutex<Vec<Result<ModelReply, LlmError>>>,
    call_count: std::sync::Mutex<usize>,
}

impl FakeLlmClient {
    /// Create a fake client with pre-defined replies, served in order. The
    /// last reply repeats once the script runs out.
    pub fn new(replies: Vec<Result<ModelReply, LlmError>>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies),
            call_count: std::sync::Mutex::new(0),
        }
    }

    /// A client that always answers with one structured call.
    pub fn tool_call(name: &str, arguments: serde_json::Value) -> Self {
        Self::new(vec![Ok(ModelReply {
            content: None,
            tool_calls: vec![ModelToolCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            }],
        })])
    }

    /// A client that always answers with free text.
    pub fn text(content: &str) -> Self {
        Self::new(vec![Ok(ModelReply {
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
        })])
    }

    /// A client that always fails with the given error.
    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of chat calls made so far.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn chat(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _tools: &[ToolSpec],
    ) -> Result<ModelReply, LlmError> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(LlmError::Empty);
        }

        if replies.len() == 1 {
            replies[0].clone()
        } else {
            replies.remove(0)
        }
    }
}
