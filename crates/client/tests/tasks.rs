//! Integration tests for remote task operations.

mod common;

use ::common::StoreError;

use self::common::{client_with, MockResponse, MockTransport};

#[tokio::test]
async fn test_list_supported_tasks() {
    let transport = MockTransport::new();
    transport.respond(MockResponse::new(200).json_body(r#"{"tasks":["noop","restore"]}"#));

    let store = client_with(&transport);
    let tasks = store.list_supported_tasks().await.unwrap();
    assert_eq!(tasks, vec!["noop", "restore"]);
    assert_eq!(transport.requests()[0].path, "/silostore/task");
}

#[tokio::test]
async fn test_perform_task_returns_result_body() {
    let transport = MockTransport::new();
    transport.respond(MockResponse::new(200).body("task complete"));

    let store = client_with(&transport);
    let result = store.perform_task("noop", None).await.unwrap();
    assert_eq!(result, "task complete");

    let request = &transport.requests()[0];
    assert_eq!(request.method, http::Method::POST);
    assert_eq!(request.path, "/silostore/task/noop");
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn test_perform_task_sends_params_body() {
    let transport = MockTransport::new();
    transport.respond(MockResponse::new(200).body("ok"));

    let store = client_with(&transport);
    store
        .perform_task("restore", Some(r#"{"snapshot":"s1"}"#))
        .await
        .unwrap();
    assert_eq!(transport.requests()[0].body, br#"{"snapshot":"s1"}"#);
}

#[tokio::test]
async fn test_unsupported_task_maps_to_invalid_id() {
    let transport = MockTransport::new();
    for _ in 0..3 {
        transport.respond(MockResponse::new(400).body("task not supported: frobnicate"));
    }

    let store = client_with(&transport);
    let err = store.perform_task("frobnicate", None).await.unwrap_err();
    match err {
        StoreError::InvalidId { message, .. } => {
            assert_eq!(message, "task not supported: frobnicate");
        }
        other => panic!("expected invalid id, got {other}"),
    }
}
