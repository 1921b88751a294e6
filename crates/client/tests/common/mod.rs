//! Scripted transport for driving the client without a server.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

use client::{RequestBody, StoreClient, Transport, TransportError, WireRequest, WireResponse};

/// One request as the transport saw it, with the body fully drained
/// (as a real transport would while writing it to the socket).
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

pub struct MockResponse {
    status: StatusCode,
    headers: HeaderMap,
    chunks: Vec<io::Result<Bytes>>,
}

impl MockResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status"),
            headers: HeaderMap::new(),
            chunks: Vec::new(),
        }
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.insert(name, value.parse().expect("valid header value"));
        self
    }

    pub fn body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.chunks = vec![Ok(Bytes::copy_from_slice(body.as_ref()))];
        self
    }

    pub fn json_body(self, body: &str) -> Self {
        self.header("content-type", "application/json").body(body)
    }

    /// Body delivered as the given chunks; `Err` entries simulate a
    /// connection dropping mid-body.
    pub fn chunks(mut self, chunks: Vec<io::Result<Bytes>>) -> Self {
        self.chunks = chunks;
        self
    }
}

enum ScriptItem {
    Respond(MockResponse),
    /// Fail the request before any response arrives.
    Fail(&'static str),
}

#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<ScriptItem>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: MockResponse) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptItem::Respond(response));
        self
    }

    pub fn fail(&self, message: &'static str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(ScriptItem::Fail(message));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let body = match request.body {
            RequestBody::Empty => Vec::new(),
            RequestBody::Bytes(bytes) => bytes.to_vec(),
            RequestBody::Stream { mut stream, .. } => {
                let mut drained = Vec::new();
                while let Some(chunk) = stream.next().await {
                    drained.extend_from_slice(&chunk.map_err(TransportError::Io)?);
                }
                drained
            }
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method: request.method,
            path: request.url.path().to_string(),
            query: request.url.query().map(str::to_string),
            headers: request.headers,
            body,
        });

        let item = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left for request");
        match item {
            ScriptItem::Fail(message) => Err(TransportError::Io(io::Error::new(
                io::ErrorKind::ConnectionReset,
                message,
            ))),
            ScriptItem::Respond(response) => Ok(WireResponse {
                status: response.status,
                headers: response.headers,
                body: futures::stream::iter(response.chunks).boxed(),
            }),
        }
    }
}

/// Client wired to the mock with zero backoff so tests run instantly.
pub fn client_with(transport: &MockTransport) -> StoreClient {
    StoreClient::builder(Url::parse("http://store.example/silostore").unwrap())
        .base_delay(Duration::ZERO)
        .recovery(5, Duration::ZERO)
        .transport(Arc::new(transport.clone()))
        .build()
        .unwrap()
}

pub fn client_with_store_id(transport: &MockTransport, store_id: &str) -> StoreClient {
    StoreClient::builder(Url::parse("http://store.example/silostore").unwrap())
        .store_id(store_id)
        .base_delay(Duration::ZERO)
        .recovery(5, Duration::ZERO)
        .transport(Arc::new(transport.clone()))
        .build()
        .unwrap()
}
