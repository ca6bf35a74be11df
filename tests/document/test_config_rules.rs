use serde_json::json;
use skein::core::decode::Operation;
use skein::core::document::{mutator, WorkflowDocument};

fn apply(document: &mut WorkflowDocument, value: serde_json::Value) {
    let operation: Operation = serde_json::from_value(value).expect("operation");
    mutator::apply_operation(document, operation);
}

#[test]
fn config_update_is_additive_not_a_replacement() {
    let mut document = WorkflowDocument::default();
    apply(
        &mut document,
        json!({
            "op": "addNode",
            "node": {"id": "a1", "kind": "action", "data": {"config": {"a": 1, "b": 2}}}
        }),
    );
    apply(
        &mut document,
        json!({
            "op": "updateNode",
            "nodeId": "a1",
            "data": {"config": {"b": 3, "c": 4}}
        }),
    );
    let config = &document.find_node("a1").expect("node a1").data.config;
    assert_eq!(config["a"], json!(1));
    assert_eq!(config["b"], json!(3));
    assert_eq!(config["c"], json!(4));
}

#[test]
fn composite_values_are_canonical_after_merge() {
    let mut document = WorkflowDocument::default();
    apply(
        &mut document,
        json!({
            "op": "addNode",
            "node": {"id": "a1", "kind": "action", "data": {"config": {"body": "{}"}}}
        }),
    );
    apply(
        &mut document,
        json!({
            "op": "updateNode",
            "nodeId": "a1",
            "data": {"config": {"body": {"amount": 5}, "mockData": [1, 2]}}
        }),
    );
    let config = &document.find_node("a1").expect("node a1").data.config;
    assert_eq!(config["body"], json!(r#"{"amount":5}"#));
    assert_eq!(config["mockData"], json!("[1,2]"));
}

#[test]
fn non_config_keys_keep_their_arrival_shape() {
    let mut document = WorkflowDocument::default();
    apply(
        &mut document,
        json!({
            "op": "addNode",
            "node": {
                "id": "a1",
                "kind": "action",
                "data": {"config": {"retries": 3, "url": "https://example.com"}}
            }
        }),
    );
    let config = &document.find_node("a1").expect("node a1").data.config;
    assert_eq!(config["retries"], json!(3));
    assert_eq!(config["url"], json!("https://example.com"));
}
