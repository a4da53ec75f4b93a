//! Dispatch layer: prompt in, envelope out.
//!
//! Sends the prompt plus the tool catalog to the model, interprets the
//! reply (one structured call, or free text), routes the call to the
//! contact store, and wraps the outcome in a `ChatReply` envelope. Stateless
//! across requests; every failure is scoped to the one request that hit it.

use crate::store::{ContactStore, StoreError};
use rolo_common::api::ChatReply;
use rolo_common::llm::{LlmClient, LlmError};
use rolo_common::tools::{self, ToolArgs, ToolError};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, warn};

/// Fixed instruction restricting the model to phone-book management.
const SYSTEM_PROMPT: &str = "You are an assistant managing a phone book. You must strictly use \
    the provided tools to interact with the database. If you need to perform an action, trigger \
    the tool directly. Your only job is to manage contacts using the provided tools. Under no \
    circumstances should you answer questions unrelated to the phone book. If the user asks an \
    off-topic question, do not attempt to answer it.";

const REJECTED_HINT: &str =
    "AI model could not understand your message. Please try something simpler, e.g. Adam 504 276 319.";
const UNAVAILABLE_MESSAGE: &str = "Error connecting with AI model. Please try again later.";
const UNKNOWN_REQUEST_MESSAGE: &str = "Unknown request.";
const MALFORMED_MESSAGE: &str =
    "Could not read the request details. Please rephrase your request.";
const INTERNAL_MESSAGE: &str = "Internal error. Please try again.";

/// Routes model output to the contact store.
pub struct Dispatcher {
    llm: Arc<dyn LlmClient>,
    store: Arc<ContactStore>,
}

impl Dispatcher {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<ContactStore>) -> Self {
        Self { llm, store }
    }

    /// Handle one user prompt end to end.
    pub async fn dispatch(&self, prompt: &str) -> ChatReply {
        let reply = match self.llm.chat(SYSTEM_PROMPT, prompt, tools::catalog()).await {
            Ok(reply) => reply,
            Err(LlmError::Rejected(detail)) => {
                warn!(detail = %detail, "model rejected the request");
                return ChatReply::info(REJECTED_HINT);
            }
            Err(err) => {
                error!("model call failed: {err}");
                return ChatReply::info(UNAVAILABLE_MESSAGE);
            }
        };

        let Some(call) = reply.tool_calls.first().cloned() else {
            return ChatReply::info(reply.content.unwrap_or_default());
        };

        if reply.tool_calls.len() > 1 {
            warn!(
                dropped = reply.tool_calls.len() - 1,
                "model returned multiple tool calls; executing only the first"
            );
        }

        let args = match ToolArgs::parse(&call.name, &call.arguments) {
            Ok(args) => args,
            Err(ToolError::UnknownTool(name)) => {
                warn!(tool = %name, "model selected an unknown tool");
                return ChatReply::fail(name, UNKNOWN_REQUEST_MESSAGE);
            }
            Err(err @ ToolError::MalformedArguments { .. }) => {
                warn!(tool = %call.name, "rejecting tool call: {err}");
                return ChatReply::fail(call.name.clone(), MALFORMED_MESSAGE);
            }
        };

        let action = args.tool();
        let store = Arc::clone(&self.store);
        match tokio::task::spawn_blocking(move || run_tool(&store, args)).await {
            Ok(Ok(payload)) => ChatReply::success(action, payload),
            Ok(Err(err)) if err.is_domain() => {
                ChatReply::success(action, json!({"success": false, "error": err.to_string()}))
            }
            Ok(Err(err)) => {
                error!("store operation failed: {err}");
                ChatReply::info(INTERNAL_MESSAGE)
            }
            Err(err) => {
                error!("store task failed: {err}");
                ChatReply::info(INTERNAL_MESSAGE)
            }
        }
    }
}

/// Execute one validated tool invocation against the store.
fn run_tool(store: &ContactStore, args: ToolArgs) -> Result<Value, StoreError> {
    match args {
        ToolArgs::Add { name, phone } => store
            .create(&name, &phone)
            .map(|c| json!({"success": true, "name": c.name, "phone": c.phone})),
        ToolArgs::Get { name } => store
            .read(&name)
            .map(|c| json!({"success": true, "name": c.name, "phone": c.phone})),
        ToolArgs::Delete { name } => store
            .delete(&name)
            .map(|()| json!({"success": true, "name": name, "message": "Contact deleted successfully."})),
        ToolArgs::Update { name, new_phone } => store
            .update(&name, &new_phone)
            .map(|c| json!({"success": true, "name": c.name, "new_phone": c.phone})),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rolo_common::api::ChatStatus;
    use rolo_common::llm::{FakeLlmClient, ModelReply, ModelToolCall};
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, Arc<ContactStore>) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(ContactStore::open(dir.path().join("contacts.db")).unwrap());
        (dir, store)
    }

    fn dispatcher(llm: FakeLlmClient, store: Arc<ContactStore>) -> Dispatcher {
        Dispatcher::new(Arc::new(llm), store)
    }

    #[tokio::test]
    async fn structured_add_call_creates_contact() {
        let (_dir, store) = temp_store();
        let llm = FakeLlmClient::tool_call("add_contact", json!({"name": "Adam", "phone": "555"}));
        let d = dispatcher(llm, Arc::clone(&store));

        let reply = d.dispatch("add Adam 555").await;
        assert_eq!(reply.status, ChatStatus::Success);
        assert_eq!(reply.action.as_deref(), Some("add_contact"));
        assert_eq!(reply.message["success"], true);
        assert_eq!(reply.message["name"], "Adam");
        assert_eq!(reply.message["phone"], "555");

        assert_eq!(store.read("Adam").unwrap().phone, "555");
    }

    #[tokio::test]
    async fn free_text_reply_passes_through_without_store_access() {
        let (_dir, store) = temp_store();
        let llm = FakeLlmClient::text("I only manage the phone book.");
        let d = dispatcher(llm, Arc::clone(&store));

        let reply = d.dispatch("what's the weather?").await;
        assert_eq!(reply.status, ChatStatus::Info);
        assert!(reply.action.is_none());
        assert_eq!(reply.message, "I only manage the phone book.");
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_tool_fails_without_store_access() {
        let (_dir, store) = temp_store();
        let llm = FakeLlmClient::tool_call("send_email", json!({"to": "adam@example.com"}));
        let d = dispatcher(llm, Arc::clone(&store));

        let reply = d.dispatch("email Adam").await;
        assert_eq!(reply.status, ChatStatus::Fail);
        assert_eq!(reply.action.as_deref(), Some("send_email"));
        assert_eq!(reply.message, "Unknown request.");
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn malformed_arguments_fail_without_store_access() {
        let (_dir, store) = temp_store();
        let llm = FakeLlmClient::tool_call("add_contact", json!({"name": "Adam"}));
        let d = dispatcher(llm, Arc::clone(&store));

        let reply = d.dispatch("add Adam").await;
        assert_eq!(reply.status, ChatStatus::Fail);
        assert_eq!(reply.action.as_deref(), Some("add_contact"));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn duplicate_name_surfaces_as_domain_failure_payload() {
        let (_dir, store) = temp_store();
        store.create("Adam", "111").unwrap();

        let llm = FakeLlmClient::tool_call("add_contact", json!({"name": "Adam", "phone": "222"}));
        let d = dispatcher(llm, Arc::clone(&store));

        let reply = d.dispatch("add Adam again").await;
        assert_eq!(reply.status, ChatStatus::Success);
        assert_eq!(reply.action.as_deref(), Some("add_contact"));
        assert_eq!(reply.message["success"], false);
        assert_eq!(reply.message["error"], "Contact name 'Adam' already exists.");
    }

    #[tokio::test]
    async fn rejected_request_returns_rephrase_hint() {
        let (_dir, store) = temp_store();
        let llm = FakeLlmClient::always_error(LlmError::Rejected("bad request".into()));
        let d = dispatcher(llm, store);

        let reply = d.dispatch("???").await;
        assert_eq!(reply.status, ChatStatus::Info);
        let text = reply.message.as_str().unwrap();
        assert!(text.contains("try something simpler"));
    }

    #[tokio::test]
    async fn unreachable_model_returns_try_later() {
        let (_dir, store) = temp_store();
        let llm = FakeLlmClient::always_error(LlmError::Timeout(30));
        let d = dispatcher(llm, store);

        let reply = d.dispatch("add Adam 555").await;
        assert_eq!(reply.status, ChatStatus::Info);
        assert_eq!(reply.message, UNAVAILABLE_MESSAGE);
    }

    #[tokio::test]
    async fn multi_call_reply_executes_only_the_first() {
        let (_dir, store) = temp_store();
        let llm = FakeLlmClient::new(vec![Ok(ModelReply {
            content: None,
            tool_calls: vec![
                ModelToolCall {
                    name: "add_contact".into(),
                    arguments: json!({"name": "Adam", "phone": "1"}).to_string(),
                },
                ModelToolCall {
                    name: "add_contact".into(),
                    arguments: json!({"name": "Julia", "phone": "2"}).to_string(),
                },
            ],
        })]);
        let d = dispatcher(llm, Arc::clone(&store));

        let reply = d.dispatch("add Adam and Julia").await;
        assert_eq!(reply.status, ChatStatus::Success);
        assert_eq!(store.count().unwrap(), 1);
        assert!(store.read("Adam").is_ok());
        assert!(matches!(store.read("Julia"), Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_and_update_route_to_the_store() {
        let (_dir, store) = temp_store();
        store.create("Adam", "111").unwrap();
        store.create("Julia", "222").unwrap();

        let d = dispatcher(
            FakeLlmClient::tool_call("update_contact", json!({"name": "Adam", "new_phone": "333"})),
            Arc::clone(&store),
        );
        let reply = d.dispatch("change Adam's number to 333").await;
        assert_eq!(reply.message["new_phone"], "333");
        assert_eq!(store.read("Adam").unwrap().phone, "333");

        let d = dispatcher(
            FakeLlmClient::tool_call("delete_contact", json!({"name": "Julia"})),
            Arc::clone(&store),
        );
        let reply = d.dispatch("remove Julia").await;
        assert_eq!(reply.message["success"], true);
        assert_eq!(store.count().unwrap(), 1);
    }
}
