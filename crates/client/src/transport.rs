//! HTTP transport abstraction.
//!
//! The dispatcher and the resumable stream talk to the network through
//! the [`Transport`] trait so tests can script responses without a
//! server. [`ReqwestTransport`] is the production implementation.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use http::{HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Stream of body chunks, produced by responses and consumed by uploads.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Request body for an outgoing operation.
pub enum RequestBody {
    Empty,
    /// Replayable in-memory body.
    Bytes(Bytes),
    /// Single-pass body. Once the transport has started reading it, the
    /// request can never be safely re-sent.
    Stream { stream: ByteStream, size: u64 },
}

impl RequestBody {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        RequestBody::Bytes(bytes.into())
    }
}

pub struct WireRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl WireRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }
}

pub struct WireResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ByteStream,
}

impl WireResponse {
    /// Collect the whole body into memory.
    pub async fn bytes(mut self) -> io::Result<Bytes> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.into())
    }

    pub async fn text(self) -> io::Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub async fn json<T: DeserializeOwned>(self) -> io::Result<T> {
        let bytes = self.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Errors raised below the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header value: {0}")]
    Header(#[from] http::header::InvalidHeaderValue),

    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
}

/// Minimal request/response interface the protocol layer needs.
///
/// Object-safe so the resumable stream can hold an `Arc<dyn Transport>`
/// and re-issue ranged requests on its own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Bytes(bytes) => builder.body(bytes),
            RequestBody::Stream { stream, size } => builder
                .header(http::header::CONTENT_LENGTH, size)
                .body(reqwest::Body::wrap_stream(stream)),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
            .boxed();

        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}
