//! Shared types for Rolo - wire formats, the LLM client, and the tool catalog.
//!
//! Everything the daemon and the CLI both need lives here.

pub mod api;
pub mod llm;
pub mod tools;

pub use api::{ChatReply, ChatRequest, ChatStatus, ContactEntry, ContactsResponse, HealthResponse};
pub use llm::{FakeLlmClient, HttpLlmClient, LlmClient, LlmConfig, LlmError, ModelReply, ModelToolCall};
pub use tools::{catalog, ToolArgs, ToolError, ToolSpec};
