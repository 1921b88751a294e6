//! Remote operation dispatcher.
//!
//! [`StoreClient`] translates each domain operation into an HTTP call
//! against a fixed base URL, applies the header codec, and classifies
//! every non-success status into the shared error taxonomy. Most
//! operations are wrapped by the [`Retrier`]; the streaming upload is
//! the deliberate exception (see [`crate::retry::OpKind`]).
//!
//! The client holds only static configuration (base URL, store id,
//! retry settings) behind an `Arc`, so it is cheap to clone and safe
//! for concurrent independent calls.

mod content;
mod spaces;
mod tasks;
pub mod wire;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue};
use http::Method;
use url::Url;

use common::error::{ErrorContext, Result, StoreError};

use crate::headers::{CodecError, CLIENT_VERSION, CLIENT_VERSION_HEADER};
use crate::retry::{OpKind, Retrier, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use crate::stream::{RECOVERY_BASE_DELAY, RECOVERY_MAX_ATTEMPTS};
use crate::transport::{ReqwestTransport, Transport, TransportError, WireRequest, WireResponse};

/// Configuration failure while constructing a [`StoreClient`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("base url cannot carry path segments: {0}")]
    CannotBeBase(Url),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Client for a single remote content store.
#[derive(Clone)]
pub struct StoreClient {
    base: Url,
    store_id: Option<String>,
    transport: Arc<dyn Transport>,
    retrier: Retrier,
    pub(crate) recovery_retrier: Retrier,
}

impl StoreClient {
    /// Client with the default transport and retry settings.
    pub fn new(base: Url) -> std::result::Result<Self, BuildError> {
        Self::builder(base).build()
    }

    pub fn builder(base: Url) -> StoreClientBuilder {
        StoreClientBuilder {
            base,
            store_id: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
            recovery_attempts: RECOVERY_MAX_ATTEMPTS,
            recovery_base_delay: RECOVERY_BASE_DELAY,
            transport: None,
        }
    }

    /// Store id sent as the `storeID` query parameter, when configured.
    pub fn store_id(&self) -> Option<&str> {
        self.store_id.as_deref()
    }

    pub(crate) fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Build an operation URL from path segments plus query pairs.
    /// Segments are percent-encoded; `storeID` rides along when set.
    pub(crate) fn url(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .expect("base url validated at construction");
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        if self.store_id.is_some() || !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            if let Some(id) = &self.store_id {
                pairs.append_pair("storeID", id);
            }
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// Issue one request and classify the response.
    pub(crate) async fn send(
        &self,
        ctx: &ErrorContext,
        mut request: WireRequest,
    ) -> Result<WireResponse> {
        if request.method != Method::GET && request.method != Method::HEAD {
            request.headers.insert(
                HeaderName::from_static(CLIENT_VERSION_HEADER),
                HeaderValue::from_static(CLIENT_VERSION),
            );
        }
        tracing::debug!(
            op = ctx.operation,
            method = %request.method,
            url = %request.url,
            "dispatching request"
        );
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| StoreError::Transport {
                ctx: ctx.clone(),
                source: Box::new(e),
            })?;
        classify(ctx, response).await
    }

    /// Dispatch a replayable operation through the retrier. `make` is
    /// called once per attempt to rebuild the request.
    pub(crate) async fn dispatch<F>(
        &self,
        op: OpKind,
        ctx: &ErrorContext,
        mut make: F,
    ) -> Result<WireResponse>
    where
        F: FnMut() -> WireRequest,
    {
        self.retrier
            .execute(
                op,
                |attempt| {
                    let request = make();
                    let client = self.clone();
                    let ctx = ctx.clone();
                    async move {
                        if attempt > 0 {
                            tracing::debug!(op = ctx.operation, attempt, "re-sending request");
                        }
                        client.send(&ctx, request).await
                    }
                },
                |err| tracing::warn!(op = ctx.operation, error = %err, "attempt failed"),
            )
            .await
    }

    /// Dispatch a streaming write. The policy never resends it, so the
    /// single-pass body in `request` is consumed at most once.
    pub(crate) async fn dispatch_streaming(
        &self,
        ctx: &ErrorContext,
        request: WireRequest,
    ) -> Result<WireResponse> {
        let mut request = Some(request);
        self.retrier
            .execute(
                OpKind::StreamingWrite,
                |_| {
                    let request = request.take();
                    let client = self.clone();
                    let ctx = ctx.clone();
                    async move {
                        match request {
                            Some(request) => client.send(&ctx, request).await,
                            // Unreachable while the policy refuses to
                            // resend streaming writes.
                            None => Err(StoreError::Transport {
                                ctx: ctx.clone(),
                                source: Box::new(io::Error::new(
                                    io::ErrorKind::InvalidInput,
                                    "request body already consumed",
                                )),
                            }),
                        }
                    }
                },
                |err| tracing::warn!(op = ctx.operation, error = %err, "attempt failed"),
            )
            .await
    }

    pub(crate) fn codec_error(ctx: &ErrorContext, err: CodecError) -> StoreError {
        StoreError::InvalidId {
            ctx: ctx.clone(),
            message: err.to_string(),
        }
    }

    pub(crate) fn body_error(ctx: &ErrorContext, err: io::Error) -> StoreError {
        StoreError::Transport {
            ctx: ctx.clone(),
            source: Box::new(err),
        }
    }
}

/// Map a response status onto the error taxonomy. Success statuses are
/// 200, 201 and 206; everything else drains the body for a diagnostic
/// message and raises a typed error.
async fn classify(ctx: &ErrorContext, response: WireResponse) -> Result<WireResponse> {
    let status = response.status.as_u16();
    match status {
        200 | 201 | 206 => Ok(response),
        _ => {
            let message = response.text().await.unwrap_or_default();
            Err(match status {
                400 => StoreError::InvalidId {
                    ctx: ctx.clone(),
                    message,
                },
                401 | 403 => StoreError::Unauthorized(ctx.clone()),
                404 => StoreError::NotFound(ctx.clone()),
                409 => StoreError::ConflictingState {
                    ctx: ctx.clone(),
                    message,
                },
                501 => StoreError::NotImplemented(ctx.clone()),
                _ => StoreError::Server {
                    ctx: ctx.clone(),
                    status,
                    message,
                },
            })
        }
    }
}

/// Builder for [`StoreClient`].
pub struct StoreClientBuilder {
    base: Url,
    store_id: Option<String>,
    max_attempts: u32,
    base_delay: Duration,
    recovery_attempts: u32,
    recovery_base_delay: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl StoreClientBuilder {
    pub fn store_id(mut self, id: impl Into<String>) -> Self {
        self.store_id = Some(id.into());
        self
    }

    /// Attempt bound for general operations.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Base backoff delay for general operations.
    pub fn base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Retry settings for the resumable stream's read recovery.
    pub fn recovery(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.recovery_attempts = max_attempts;
        self.recovery_base_delay = base_delay;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> std::result::Result<StoreClient, BuildError> {
        if self.base.cannot_be_a_base() {
            return Err(BuildError::CannotBeBase(self.base));
        }
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        Ok(StoreClient {
            base: self.base,
            store_id: self.store_id,
            transport,
            retrier: Retrier::with_max_attempts(self.max_attempts, self.base_delay),
            recovery_retrier: Retrier::with_max_attempts(
                self.recovery_attempts,
                self.recovery_base_delay,
            ),
        })
    }
}
