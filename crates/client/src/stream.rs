//! Resumable ranged content reads.
//!
//! A [`ResumableContentStream`] wraps the body of a ranged GET. When a
//! read fails mid-body -- an error chunk, or the body ending before the
//! promised byte count -- it re-issues a fresh ranged request starting
//! at the first undelivered byte and keeps going, so the caller sees an
//! uninterrupted byte sequence with no duplication and no gap. Recovery
//! is an explicit loop with its own bounded, backed-off retrier; when
//! that is exhausted the read fails terminally rather than ever
//! surfacing truncated data as success.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, RANGE};
use http::Method;
use url::Url;

use crate::retry::{OpKind, Retrier};
use crate::transport::{ByteStream, Transport, WireRequest, WireResponse};

/// Attempt bound for read recovery.
pub const RECOVERY_MAX_ATTEMPTS: u32 = 5;
/// Base backoff delay for read recovery.
pub const RECOVERY_BASE_DELAY: Duration = Duration::from_secs(2);

/// Byte-range request value for `[start, end]`; open-ended when `end`
/// is `None`. Both bounds are inclusive.
pub(crate) fn range_header(start: u64, end: Option<u64>) -> String {
    match end {
        Some(end) => format!("bytes={start}-{end}"),
        None => format!("bytes={start}-"),
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}

/// Single-consumer byte stream over a ranged content read.
///
/// Not safe for concurrent reads; consume it fully (or drop it) before
/// reusing the underlying content. Dropping the stream abandons any
/// in-flight recovery.
pub struct ResumableContentStream {
    transport: Arc<dyn Transport>,
    url: Url,
    retrier: Retrier,
    current: ByteStream,
    /// Position of the first byte not yet delivered to the caller.
    next_byte_pos: u64,
    end_byte: Option<u64>,
    /// Bytes the current response still owes, per its Content-Length.
    bytes_outstanding: Option<u64>,
    /// Position at which the last recovery was issued. A second
    /// failure at the same position means the recovered body delivered
    /// nothing, so another cycle would loop forever.
    last_recovery_pos: Option<u64>,
    failed: bool,
}

impl std::fmt::Debug for ResumableContentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumableContentStream")
            .field("url", &self.url)
            .field("next_byte_pos", &self.next_byte_pos)
            .field("end_byte", &self.end_byte)
            .field("bytes_outstanding", &self.bytes_outstanding)
            .field("last_recovery_pos", &self.last_recovery_pos)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl ResumableContentStream {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        url: Url,
        retrier: Retrier,
        response: WireResponse,
        start_byte: u64,
        end_byte: Option<u64>,
    ) -> Self {
        let bytes_outstanding = content_length(&response.headers);
        Self {
            transport,
            url,
            retrier,
            current: response.body,
            next_byte_pos: start_byte,
            end_byte,
            bytes_outstanding,
            last_recovery_pos: None,
            failed: false,
        }
    }

    /// Position of the first byte the next chunk will start at.
    pub fn position(&self) -> u64 {
        self.next_byte_pos
    }

    /// Next chunk of content, or `None` at the end of the range.
    ///
    /// Transient failures are recovered internally; an error from this
    /// method is terminal and the stream stays failed.
    pub async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        if self.failed {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "content stream already failed",
            ));
        }
        loop {
            match self.current.next().await {
                Some(Ok(chunk)) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    self.next_byte_pos += chunk.len() as u64;
                    if let Some(outstanding) = &mut self.bytes_outstanding {
                        *outstanding = outstanding.saturating_sub(chunk.len() as u64);
                    }
                    return Ok(Some(chunk));
                }
                Some(Err(err)) => {
                    if let Err(err) = self.recover(err).await {
                        self.failed = true;
                        return Err(err);
                    }
                }
                None => match self.bytes_outstanding {
                    // The body ended short of what the response
                    // promised; never pass that off as a clean end.
                    Some(outstanding) if outstanding > 0 => {
                        let err = io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("body ended {outstanding} bytes early"),
                        );
                        if let Err(err) = self.recover(err).await {
                            self.failed = true;
                            return Err(err);
                        }
                    }
                    _ => return Ok(None),
                },
            }
        }
    }

    /// Collect the rest of the stream into memory.
    pub async fn read_to_end(mut self) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok(buf)
    }

    /// Adapt into a `futures` stream of chunks.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> {
        futures::stream::try_unfold(self, |mut stream| async move {
            match stream.next_chunk().await? {
                Some(chunk) => Ok::<_, io::Error>(Some((chunk, stream))),
                None => Ok(None),
            }
        })
    }

    /// Replace the current body with a fresh ranged response starting
    /// at `next_byte_pos`.
    async fn recover(&mut self, cause: io::Error) -> io::Result<()> {
        if self.last_recovery_pos == Some(self.next_byte_pos) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "no bytes delivered since recovery at byte {}: {cause}",
                    self.next_byte_pos
                ),
            ));
        }
        self.last_recovery_pos = Some(self.next_byte_pos);
        tracing::debug!(
            url = %self.url,
            position = self.next_byte_pos,
            error = %cause,
            "content read interrupted, recovering"
        );
        let transport = self.transport.clone();
        let url = self.url.clone();
        let position = self.next_byte_pos;
        let range = range_header(position, self.end_byte);

        let response = self
            .retrier
            .execute(
                OpKind::ContentRead,
                move |attempt| {
                    let transport = transport.clone();
                    let url = url.clone();
                    let range = range.clone();
                    async move {
                        if attempt > 0 {
                            tracing::debug!(%url, attempt, "retrying content recovery");
                        }
                        let mut request = WireRequest::new(Method::GET, url);
                        request.headers.insert(
                            RANGE,
                            HeaderValue::from_str(&range)
                                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
                        );
                        let response = transport
                            .send(request)
                            .await
                            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
                        match response.status.as_u16() {
                            206 => Ok(response),
                            // A 200 mid-content means the service
                            // ignored the range and restarted at byte
                            // zero, which would duplicate data.
                            200 if position == 0 => Ok(response),
                            200 => Err(io::Error::new(
                                io::ErrorKind::InvalidData,
                                "service ignored the range request",
                            )),
                            status => Err(io::Error::new(
                                io::ErrorKind::Other,
                                format!("recovery request returned status {status}"),
                            )),
                        }
                    }
                },
                |err| tracing::warn!(error = %err, "content recovery attempt failed"),
            )
            .await?;

        self.bytes_outstanding = content_length(&response.headers);
        self.current = response.body;
        Ok(())
    }
}
