//! Integration tests for content operations.

mod common;

use ::common::{Properties, StoreError};
use bytes::Bytes;
use futures::StreamExt;

use client::RequestBody;

use self::common::{client_with, client_with_store_id, MockResponse, MockTransport};

fn streaming_body(data: &'static [u8]) -> RequestBody {
    let chunks: Vec<std::io::Result<Bytes>> = vec![Ok(Bytes::from_static(data))];
    RequestBody::Stream {
        stream: futures::stream::iter(chunks).boxed(),
        size: data.len() as u64,
    }
}

#[tokio::test]
async fn test_add_content_returns_echoed_checksum() {
    let transport = MockTransport::new();
    transport.respond(MockResponse::new(201).header("content-md5", "abc123"));

    let store = client_with(&transport);
    let checksum = store
        .add_content(
            "photos",
            "cat.jpg",
            streaming_body(b"meow"),
            "image/jpeg",
            Some("abc123"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(checksum, "abc123");

    let request = &transport.requests()[0];
    assert_eq!(request.method, http::Method::PUT);
    assert_eq!(request.path, "/silostore/photos/cat.jpg");
    assert_eq!(request.body, b"meow");
    assert_eq!(request.header("content-type"), Some("image/jpeg"));
    assert_eq!(request.header("content-md5"), Some("abc123"));
    assert!(request.header("x-silo-client-version").is_some());
}

#[tokio::test]
async fn test_add_content_is_never_retried() {
    let transport = MockTransport::new();
    // Plenty of script left; the upload must stop after one attempt.
    transport
        .fail("connection reset")
        .respond(MockResponse::new(201).header("content-md5", "abc123"));

    let store = client_with(&transport);
    let err = store
        .add_content(
            "photos",
            "cat.jpg",
            streaming_body(b"meow"),
            "image/jpeg",
            None,
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Transport { .. }));
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_add_content_checksum_mismatch_on_successful_status() {
    let transport = MockTransport::new();
    transport.respond(MockResponse::new(201).header("content-md5", "server999"));

    let store = client_with(&transport);
    let err = store
        .add_content(
            "photos",
            "cat.jpg",
            streaming_body(b"meow"),
            "image/jpeg",
            Some("caller111"),
            None,
        )
        .await
        .unwrap_err();

    match err {
        StoreError::ChecksumMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected, "caller111");
            assert_eq!(actual, "server999");
        }
        other => panic!("expected checksum mismatch, got {other}"),
    }
    // The write itself went through exactly once.
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_add_content_falls_back_to_etag() {
    let transport = MockTransport::new();
    transport.respond(MockResponse::new(201).header("etag", "\"abc123\""));

    let store = client_with(&transport);
    let checksum = store
        .add_content(
            "photos",
            "cat.jpg",
            streaming_body(b"meow"),
            "image/jpeg",
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(checksum, "abc123");
}

#[tokio::test]
async fn test_add_content_sends_custom_properties() {
    let transport = MockTransport::new();
    transport.respond(MockResponse::new(201).header("content-md5", "abc123"));

    let store = client_with(&transport);
    let mut properties = Properties::new();
    properties.insert("department".to_string(), "imaging".to_string());
    store
        .add_content(
            "photos",
            "cat.jpg",
            streaming_body(b"meow"),
            "image/jpeg",
            None,
            Some(&properties),
        )
        .await
        .unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.header("x-silo-meta-department"), Some("imaging"));
}

#[tokio::test]
async fn test_copy_content_is_retried_and_sends_no_body() {
    let transport = MockTransport::new();
    transport
        .fail("connection reset")
        .respond(MockResponse::new(201).header("content-md5", "abc123"));

    let store = client_with_store_id(&transport, "7");
    let checksum = store
        .copy_content(Some("3"), "photos", "cat.jpg", "archive", "cat-2024.jpg")
        .await
        .unwrap();
    assert_eq!(checksum, "abc123");
    assert_eq!(transport.request_count(), 2);

    let request = &transport.requests()[1];
    assert_eq!(request.path, "/silostore/archive/cat-2024.jpg");
    assert!(request.body.is_empty());
    assert_eq!(request.header("x-silo-copy-source"), Some("/photos/cat.jpg"));
    assert_eq!(request.header("x-silo-copy-source-store"), Some("3"));
    assert!(request.query.clone().unwrap().contains("storeID=7"));
}

#[tokio::test]
async fn test_copy_content_rejects_unencodable_source() {
    let transport = MockTransport::new();
    let store = client_with(&transport);

    let err = store
        .copy_content(None, "photos", "cat\n.jpg", "archive", "cat.jpg")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidId { .. }));
    // Rejected before a sourceless copy request can go out.
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_move_content_copies_then_deletes_source() {
    let transport = MockTransport::new();
    transport
        .respond(MockResponse::new(201).header("content-md5", "abc123"))
        .respond(MockResponse::new(200));

    let store = client_with(&transport);
    let checksum = store
        .move_content(None, "photos", "cat.jpg", "archive", "cat.jpg")
        .await
        .unwrap();
    assert_eq!(checksum, "abc123");

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, http::Method::PUT);
    assert_eq!(requests[1].method, http::Method::DELETE);
    assert_eq!(requests[1].path, "/silostore/photos/cat.jpg");
}

#[tokio::test]
async fn test_get_content_properties_precedence() {
    let transport = MockTransport::new();
    transport.respond(
        MockResponse::new(200)
            .header("x-silo-meta-checksum", "explicit111")
            .header("etag", "\"fallback222\"")
            .header("content-length", "17")
            .header("content-type", "image/jpeg")
            .header("last-modified", "Fri, 05 Jan 2024 10:00:00 GMT"),
    );

    let store = client_with(&transport);
    let properties = store
        .get_content_properties("photos", "cat.jpg")
        .await
        .unwrap();

    assert_eq!(properties.get("checksum").unwrap(), "explicit111");
    assert_eq!(properties.get("size").unwrap(), "17");
    assert_eq!(properties.get("mimetype").unwrap(), "image/jpeg");
    assert_eq!(
        properties.get("modified").unwrap(),
        "Fri, 05 Jan 2024 10:00:00 GMT"
    );
}

#[tokio::test]
async fn test_get_content_rejects_inverted_range() {
    let transport = MockTransport::new();
    let store = client_with(&transport);

    let err = store
        .get_content("photos", "cat.jpg", 10, Some(5))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidId { .. }));
    // Rejected before any request goes out.
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_delete_content_not_found_carries_ids() {
    let transport = MockTransport::new();
    transport
        .respond(MockResponse::new(404).body("gone"))
        .respond(MockResponse::new(404).body("gone"))
        .respond(MockResponse::new(404).body("gone"));

    let store = client_with(&transport);
    let err = store.delete_content("photos", "cat.jpg").await.unwrap_err();

    let ctx = err.context();
    assert_eq!(ctx.operation, "delete_content");
    assert_eq!(ctx.space_id.as_deref(), Some("photos"));
    assert_eq!(ctx.content_id.as_deref(), Some("cat.jpg"));
}
