//! Unit tests for Langbase API types.

use super::*;
use serde_json::json;

#[test]
fn test_pipe_request_defaults_skip_empty_options() {
    let req = PipeRequest::new("legal-retrieval-v1", vec![Message::user("What is Article 21?")]);
    let value = serde_json::to_value(&req).unwrap();

    assert_eq!(value["name"], "legal-retrieval-v1");
    assert_eq!(value["messages"][0]["role"], "user");
    assert_eq!(value["stream"], false);
    assert!(value.get("memory").is_none());
    assert!(value.get("variables").is_none());
    assert!(value.get("json").is_none());
}

#[test]
fn test_pipe_request_retrieval_shape() {
    let req = PipeRequest::new("legal-retrieval-v1", vec![Message::system("Retrieve")])
        .with_memory("sc-judgments")
        .with_variable("max_results", "5");
    let value = serde_json::to_value(&req).unwrap();

    assert_eq!(value["memory"], json!([{ "name": "sc-judgments" }]));
    assert_eq!(value["variables"], json!({ "max_results": "5" }));
    assert_eq!(value["messages"][0]["role"], "system");
}

#[test]
fn test_pipe_request_json_output() {
    let req = PipeRequest::new("legal-formulation-v1", vec![]).with_json_output(true);
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["json"], true);
}

#[test]
fn test_pipe_response_ignores_extra_fields() {
    let response: PipeResponse = serde_json::from_value(json!({
        "success": true,
        "completion": "ok",
        "threadId": "t-1",
        "raw": { "model": "gpt-4o-mini" }
    }))
    .unwrap();
    assert!(response.success);
    assert_eq!(response.completion, "ok");
}

#[test]
fn test_create_pipe_request_builder() {
    let req = CreatePipeRequest::new("legal-formulation-v1")
        .with_description("IRAC formulation")
        .with_model("openai:gpt-4o-mini")
        .with_upsert(true)
        .with_json_output(true)
        .with_temperature(0.2)
        .with_max_tokens(3000)
        .with_messages(vec![Message::system("prompt")])
        .with_memory("sc-judgments");

    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["name"], "legal-formulation-v1");
    assert_eq!(value["json"], true);
    assert_eq!(value["upsert"], true);
    assert_eq!(value["max_tokens"], 3000);
    assert_eq!(value["memory"][0]["name"], "sc-judgments");
}

#[test]
fn test_create_pipe_response_minimal_fields() {
    let response: CreatePipeResponse = serde_json::from_value(json!({
        "name": "legal-retrieval-v1",
        "url": "https://langbase.com/tester/legal-retrieval-v1",
        "owner_login": "tester",
        "api_key": "pipe-key"
    }))
    .unwrap();
    assert_eq!(response.name, "legal-retrieval-v1");
}
