use cv_mcp_server::schema::{validate_arguments, validate_json, SEND_EMAIL_SCHEMA};

#[test]
fn json_schema_harness_validates_instance() {
    let instance = r#"{
      "to": "jane@example.com",
      "subject": "Hello",
      "body": "Plain text"
    }"#;

    validate_json(SEND_EMAIL_SCHEMA, instance).expect("schema validation failed");
}

#[test]
fn ask_cv_schema_accepts_and_rejects() {
    assert!(validate_arguments("ask_cv", &serde_json::json!({ "question": "companies" })).is_ok());
    assert!(validate_arguments("ask_cv", &serde_json::json!({})).is_err());
    assert!(validate_arguments("ask_cv", &serde_json::json!({ "question": 7 })).is_err());
    assert!(validate_arguments("ask_cv", &serde_json::Value::Null).is_err());
}

#[test]
fn send_email_schema_enforces_address_shape() {
    let valid = serde_json::json!({ "to": "a@b.co", "subject": "s", "body": "b" });
    assert!(validate_arguments("send_email", &valid).is_ok());

    for bad in ["bad-address", "a@b", "a @b.co", "@b.co"] {
        let args = serde_json::json!({ "to": bad, "subject": "s", "body": "b" });
        assert!(
            validate_arguments("send_email", &args).is_err(),
            "address {bad:?} should fail the schema pattern"
        );
    }
}

#[test]
fn unknown_tool_has_no_schema() {
    assert!(validate_arguments("nope", &serde_json::json!({})).is_err());
    assert!(cv_mcp_server::schema::tool_schema("nope").is_none());
}
