use jsonschema::validator_for;
use serde_json::Value;

use cv_mcp_server::protocol::{ToolErrorCode, ToolErrorResponse};

#[test]
fn golden_tool_error_schema_validation() {
    // 1. Build a canonical error response
    let response = ToolErrorResponse::new(
        ToolErrorCode::InvalidArguments,
        "Arguments do not satisfy the tool schema",
    );

    let json_str = serde_json::to_string_pretty(&response).unwrap();
    let json_value: Value = serde_json::from_str(&json_str).unwrap();

    // 2. Schema (v0) — frozen
    let schema_str = r#"{
  "$schema": "https://json-schema.org/draft/2020-12/schema",
  "title": "Tool Error Response v0",
  "type": "object",
  "required": ["error"],
  "additionalProperties": false,
  "properties": {
    "error": {
      "type": "object",
      "required": ["code", "message"],
      "additionalProperties": false,
      "properties": {
        "code": {
          "type": "string",
          "enum": [
            "unknown_tool",
            "invalid_arguments",
            "delivery_failed",
            "transport_unavailable",
            "internal_error"
          ]
        },
        "message": {
          "type": "string",
          "minLength": 1
        }
      }
    }
  }
}"#;

    let schema_json: Value = serde_json::from_str(schema_str).unwrap();
    let validator = validator_for(&schema_json).unwrap();

    // 3. Validate against schema
    assert!(validator.is_valid(&json_value), "tool error JSON must satisfy v0 schema");

    // 4. Golden snapshot (byte-identical, stable)
    let expected = r#"{
  "error": {
    "code": "invalid_arguments",
    "message": "Arguments do not satisfy the tool schema"
  }
}"#;

    assert_eq!(json_str.trim(), expected.trim(), "tool error JSON snapshot mismatch");
}

#[test]
fn every_code_has_a_canonical_message_and_rpc_mapping() {
    let codes = [
        (ToolErrorCode::UnknownTool, -32602),
        (ToolErrorCode::InvalidArguments, -32602),
        (ToolErrorCode::DeliveryFailed, -32603),
        (ToolErrorCode::TransportUnavailable, -32603),
        (ToolErrorCode::InternalError, -32603),
    ];

    for (code, rpc_code) in codes {
        assert_eq!(code.json_rpc_code(), rpc_code);
        let canonical = ToolErrorResponse::canonical(code);
        assert!(!canonical.error.message.is_empty());
    }
}
