//! The tool catalog shown to the language model, and the strict decoder
//! that turns a model's argument payload into typed values.
//!
//! The catalog is a compiled-in constant: four operations, each with a
//! stable name, a description telling the model when to pick it, and a JSON
//! schema for its parameters. It is sent verbatim on every chat request.

use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

pub const ADD_CONTACT: &str = "add_contact";
pub const GET_CONTACT: &str = "get_contact";
pub const DELETE_CONTACT: &str = "delete_contact";
pub const UPDATE_CONTACT: &str = "update_contact";

/// One callable operation as declared to the model.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

impl ToolSpec {
    /// Render in the OpenAI chat-completions `tools` shape.
    pub fn to_wire(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

static CATALOG: Lazy<Vec<ToolSpec>> = Lazy::new(|| {
    vec![
        ToolSpec {
            name: ADD_CONTACT,
            description: "Add new contact to the phone book. Use when user asks to add someone.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the contact. e.g. Adam, Julia",
                    },
                    "phone": {
                        "type": "string",
                        "description": "Phone number, string of digits.",
                    },
                },
                "required": ["name", "phone"],
            }),
        },
        ToolSpec {
            name: GET_CONTACT,
            description: "Get a contact from the phone book. Use when user asks about someone.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the contact. e.g. Adam, Julia",
                    },
                    "phone": {
                        "type": "string",
                        "description": "The phone number, string of digits.",
                    },
                },
                "required": ["name"],
            }),
        },
        ToolSpec {
            name: DELETE_CONTACT,
            description: "Delete a contact from the phone book. Use when user wants to remove someone.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the contact to delete. e.g. Adam, Julia",
                    },
                },
                "required": ["name"],
            }),
        },
        ToolSpec {
            name: UPDATE_CONTACT,
            description: "Update an existing contact's phone number. Use when the user wants to \
                          change, edit, or update a phone number for someone already in the phone \
                          book. Make sure to use update_contact tool in such case.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Name of the contact to update. e.g. Adam, Julia",
                    },
                    "new_phone": {
                        "type": "string",
                        "description": "The new phone number to save.",
                    },
                },
                "required": ["name", "new_phone"],
            }),
        },
    ]
});

/// The full catalog, in declaration order.
pub fn catalog() -> &'static [ToolSpec] {
    &CATALOG
}

/// The catalog rendered for the wire, ready to drop into a request body.
pub fn catalog_wire() -> Vec<Value> {
    CATALOG.iter().map(ToolSpec::to_wire).collect()
}

/// Decoding failures at the model/store boundary.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("malformed arguments for '{tool}': {reason}")]
    MalformedArguments { tool: String, reason: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct AddContactArgs {
    name: String,
    phone: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct GetContactArgs {
    name: String,
    // Declared in the schema but unused; accepted so the decoder does not
    // reject payloads the catalog invites.
    #[serde(default)]
    #[allow(dead_code)]
    phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeleteContactArgs {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateContactArgs {
    name: String,
    new_phone: String,
}

/// A fully validated tool invocation, ready to route to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolArgs {
    Add { name: String, phone: String },
    Get { name: String },
    Delete { name: String },
    Update { name: String, new_phone: String },
}

impl ToolArgs {
    /// Decode a model's raw argument payload for the named tool.
    ///
    /// The payload is the JSON string carried inside the structured call.
    /// Missing, extra, or mistyped fields fail; so does an empty required
    /// string. Unknown tool names fail before any parsing.
    pub fn parse(tool: &str, raw: &str) -> Result<Self, ToolError> {
        let malformed = |e: serde_json::Error| ToolError::MalformedArguments {
            tool: tool.to_string(),
            reason: e.to_string(),
        };

        let args = match tool {
            ADD_CONTACT => {
                let a: AddContactArgs = serde_json::from_str(raw).map_err(malformed)?;
                ToolArgs::Add {
                    name: a.name,
                    phone: a.phone,
                }
            }
            GET_CONTACT => {
                let a: GetContactArgs = serde_json::from_str(raw).map_err(malformed)?;
                ToolArgs::Get { name: a.name }
            }
            DELETE_CONTACT => {
                let a: DeleteContactArgs = serde_json::from_str(raw).map_err(malformed)?;
                ToolArgs::Delete { name: a.name }
            }
            UPDATE_CONTACT => {
                let a: UpdateContactArgs = serde_json::from_str(raw).map_err(malformed)?;
                ToolArgs::Update {
                    name: a.name,
                    new_phone: a.new_phone,
                }
            }
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };

        args.check_non_empty(tool)?;
        Ok(args)
    }

    /// The tool name this invocation belongs to.
    pub fn tool(&self) -> &'static str {
        match self {
            ToolArgs::Add { .. } => ADD_CONTACT,
            ToolArgs::Get { .. } => GET_CONTACT,
            ToolArgs::Delete { .. } => DELETE_CONTACT,
            ToolArgs::Update { .. } => UPDATE_CONTACT,
        }
    }

    fn check_non_empty(&self, tool: &str) -> Result<(), ToolError> {
        let empty = |field: &str| ToolError::MalformedArguments {
            tool: tool.to_string(),
            reason: format!("field '{field}' must not be empty"),
        };

        match self {
            ToolArgs::Add { name, phone } => {
                if name.trim().is_empty() {
                    return Err(empty("name"));
                }
                if phone.trim().is_empty() {
                    return Err(empty("phone"));
                }
            }
            ToolArgs::Get { name } | ToolArgs::Delete { name } => {
                if name.trim().is_empty() {
                    return Err(empty("name"));
                }
            }
            ToolArgs::Update { name, new_phone } => {
                if name.trim().is_empty() {
                    return Err(empty("name"));
                }
                if new_phone.trim().is_empty() {
                    return Err(empty("new_phone"));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_four_tools_in_wire_shape() {
        let wire = catalog_wire();
        assert_eq!(wire.len(), 4);

        let names: Vec<&str> = wire
            .iter()
            .map(|t| t["function"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![ADD_CONTACT, GET_CONTACT, DELETE_CONTACT, UPDATE_CONTACT]
        );

        for tool in &wire {
            assert_eq!(tool["type"], "function");
            assert_eq!(tool["function"]["parameters"]["type"], "object");
            assert!(tool["function"]["parameters"]["required"].is_array());
        }
    }

    #[test]
    fn parse_add_contact() {
        let args = ToolArgs::parse(ADD_CONTACT, r#"{"name":"Adam","phone":"555-1234"}"#).unwrap();
        assert_eq!(
            args,
            ToolArgs::Add {
                name: "Adam".into(),
                phone: "555-1234".into()
            }
        );
        assert_eq!(args.tool(), ADD_CONTACT);
    }

    #[test]
    fn parse_get_contact_ignores_optional_phone() {
        let args = ToolArgs::parse(GET_CONTACT, r#"{"name":"Julia","phone":"123"}"#).unwrap();
        assert_eq!(args, ToolArgs::Get { name: "Julia".into() });

        let args = ToolArgs::parse(GET_CONTACT, r#"{"name":"Julia"}"#).unwrap();
        assert_eq!(args, ToolArgs::Get { name: "Julia".into() });
    }

    #[test]
    fn parse_update_contact() {
        let args =
            ToolArgs::parse(UPDATE_CONTACT, r#"{"name":"Adam","new_phone":"999"}"#).unwrap();
        assert_eq!(
            args,
            ToolArgs::Update {
                name: "Adam".into(),
                new_phone: "999".into()
            }
        );
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = ToolArgs::parse(ADD_CONTACT, r#"{"name":"Adam"}"#).unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));
    }

    #[test]
    fn extra_field_is_malformed() {
        let err =
            ToolArgs::parse(DELETE_CONTACT, r#"{"name":"Adam","nickname":"Ad"}"#).unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));
    }

    #[test]
    fn mistyped_field_is_malformed() {
        let err = ToolArgs::parse(ADD_CONTACT, r#"{"name":"Adam","phone":555}"#).unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));
    }

    #[test]
    fn garbage_payload_is_malformed() {
        let err = ToolArgs::parse(ADD_CONTACT, "not json").unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));
    }

    #[test]
    fn empty_required_string_is_malformed() {
        let err = ToolArgs::parse(ADD_CONTACT, r#"{"name":"  ","phone":"555"}"#).unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));

        let err = ToolArgs::parse(UPDATE_CONTACT, r#"{"name":"Adam","new_phone":""}"#).unwrap_err();
        assert!(matches!(err, ToolError::MalformedArguments { .. }));
    }

    #[test]
    fn unknown_tool_is_rejected_before_parsing() {
        let err = ToolArgs::parse("send_email", "not even json").unwrap_err();
        assert!(matches!(err, ToolError::UnknownTool(name) if name == "send_email"));
    }
}
