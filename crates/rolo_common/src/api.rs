//! HTTP wire types shared between the daemon and the CLI client.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub prompt: String,
}

/// Outcome class of a chat request.
///
/// `Success` means a tool was routed to the store (the store result itself
/// may still report a domain failure inside `message`). `Info` carries free
/// text from the model or a curated degradation message. `Fail` means the
/// request could not be routed at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Success,
    Info,
    Fail,
}

/// Envelope returned by `POST /api/chat`.
///
/// `action` names the tool the model selected, when one was selected, so the
/// caller can tell "which action was attempted" apart from "did it succeed".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub status: ChatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub message: Value,
}

impl ChatReply {
    pub fn success(action: impl Into<String>, message: Value) -> Self {
        Self {
            status: ChatStatus::Success,
            action: Some(action.into()),
            message,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            status: ChatStatus::Info,
            action: None,
            message: Value::String(text.into()),
        }
    }

    pub fn fail(action: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            status: ChatStatus::Fail,
            action: Some(action.into()),
            message: Value::String(text.into()),
        }
    }
}

/// One contact as exposed over the API. The surrogate id stays internal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEntry {
    pub name: String,
    pub phone: String,
}

/// Response of `GET /api/contacts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsResponse {
    pub status: String,
    pub data: Vec<ContactEntry>,
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub contacts: u64,
}
