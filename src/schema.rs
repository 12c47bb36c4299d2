//! Tool input schemas and argument validation.
//!
//! The same schema text is advertised through `tools/list` and enforced on
//! every `tools/call` before the handler runs, so a malformed email address
//! is rejected before any mail channel I/O happens.

use jsonschema::{validator_for, Validator};
use once_cell::sync::Lazy;
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    #[error("{0}")]
    ValidationFailed(String),
}

/// Input schema for `ask_cv` (draft 2020-12).
pub const ASK_CV_SCHEMA: &str = r#"{
  "type": "object",
  "required": ["question"],
  "properties": {
    "question": {
      "type": "string",
      "description": "Free-text question about the CV"
    }
  }
}"#;

/// Input schema for `send_email` (draft 2020-12).
///
/// The `to` pattern rejects malformed addresses at validation time; anything
/// that passes still goes through the mail library's own address parser.
pub const SEND_EMAIL_SCHEMA: &str = r#"{
  "type": "object",
  "required": ["to", "subject", "body"],
  "properties": {
    "to": {
      "type": "string",
      "pattern": "^[^@\\s]+@[^@\\s]+\\.[^@\\s]+$",
      "description": "Recipient email address"
    },
    "subject": {
      "type": "string",
      "description": "Message subject"
    },
    "body": {
      "type": "string",
      "description": "Plain-text message body"
    }
  }
}"#;

static ASK_CV_VALIDATOR: Lazy<Validator> = Lazy::new(|| compile(ASK_CV_SCHEMA));
static SEND_EMAIL_VALIDATOR: Lazy<Validator> = Lazy::new(|| compile(SEND_EMAIL_SCHEMA));

fn compile(schema_str: &str) -> Validator {
    let schema_json: Value =
        serde_json::from_str(schema_str).expect("tool schema constants must be valid JSON");
    validator_for(&schema_json).expect("tool schema constants must compile")
}

/// The schema text for a registered tool, or `None` for unknown tools.
pub fn tool_schema(tool_name: &str) -> Option<&'static str> {
    match tool_name {
        "ask_cv" => Some(ASK_CV_SCHEMA),
        "send_email" => Some(SEND_EMAIL_SCHEMA),
        _ => None,
    }
}

/// The schema as a JSON value, for `tools/list` advertisement.
pub fn tool_schema_json(tool_name: &str) -> Option<Value> {
    let raw = tool_schema(tool_name)?;
    Some(serde_json::from_str(raw).expect("tool schema constants must be valid JSON"))
}

/// Validate a JSON instance against a JSON Schema (draft 2020-12).
/// Returns Ok(()) if valid, Err otherwise.
pub fn validate_json(schema_str: &str, instance_str: &str) -> Result<(), SchemaValidationError> {
    let schema_json: Value = serde_json::from_str(schema_str)?;
    let instance_json: Value = serde_json::from_str(instance_str)?;

    let validator = validator_for(&schema_json)
        .map_err(|e| SchemaValidationError::SchemaCompile(e.to_string()))?;

    validator
        .validate(&instance_json)
        .map_err(|err| SchemaValidationError::ValidationFailed(err.to_string()))
}

/// Validate tool arguments against the tool's input schema.
/// Returns `Ok(())` if valid, the first violation otherwise.
pub fn validate_arguments(
    tool_name: &str,
    arguments: &Value,
) -> Result<(), SchemaValidationError> {
    let validator = match tool_name {
        "ask_cv" => &*ASK_CV_VALIDATOR,
        "send_email" => &*SEND_EMAIL_VALIDATOR,
        other => {
            return Err(SchemaValidationError::SchemaCompile(format!(
                "no schema registered for tool {other}"
            )))
        }
    };

    validator
        .validate(arguments)
        .map_err(|err| SchemaValidationError::ValidationFailed(err.to_string()))
}
