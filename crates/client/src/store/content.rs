//! Content operations.

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE, RANGE};
use http::Method;

use common::error::{ErrorContext, Result, StoreError};
use common::Properties;

use crate::headers::{
    self, CodecError, CONTENT_MD5, COPY_SOURCE_HEADER, COPY_SOURCE_STORE_HEADER,
};
use crate::retry::OpKind;
use crate::store::StoreClient;
use crate::stream::{range_header, ResumableContentStream};
use crate::transport::{RequestBody, WireRequest};

impl StoreClient {
    /// Upload a content item and return the checksum echoed by the
    /// service.
    ///
    /// The body is a single-pass stream, so this operation is **never
    /// retried**: a failed attempt may already have consumed part of
    /// the body, and resending would transmit truncated data. When the
    /// caller supplies `checksum` and the service echoes a different
    /// one, the write counts as failed even on a success status.
    pub async fn add_content(
        &self,
        space_id: &str,
        content_id: &str,
        content: RequestBody,
        mimetype: &str,
        checksum: Option<&str>,
        properties: Option<&Properties>,
    ) -> Result<String> {
        let ctx = ErrorContext::content("add_content", space_id, content_id);

        let mut request = WireRequest::new(Method::PUT, self.url(&[space_id, content_id], &[]));
        request.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(mimetype)
                .map_err(|_| Self::codec_error(&ctx, CodecError::InvalidValue("mimetype".into())))?,
        );
        if let Some(checksum) = checksum {
            request.headers.insert(
                HeaderName::from_static(CONTENT_MD5),
                HeaderValue::from_str(checksum).map_err(|_| {
                    Self::codec_error(&ctx, CodecError::InvalidValue("checksum".into()))
                })?,
            );
        }
        if let Some(properties) = properties {
            let encoded =
                headers::encode_properties(properties).map_err(|e| Self::codec_error(&ctx, e))?;
            request.headers.extend(encoded);
        }
        request.body = content;

        let response = self.dispatch_streaming(&ctx, request).await?;
        let echoed = Self::require_checksum(&ctx, &response)?;

        if let Some(expected) = checksum {
            if expected != echoed {
                return Err(StoreError::ChecksumMismatch {
                    ctx,
                    expected: expected.to_string(),
                    actual: echoed,
                });
            }
        }
        Ok(echoed)
    }

    /// Server-side copy. No body is sent -- the source rides in headers
    /// -- so the operation is safe to retry. The echoed checksum is
    /// surfaced but not validated against any expectation.
    pub async fn copy_content(
        &self,
        src_store_id: Option<&str>,
        src_space_id: &str,
        src_content_id: &str,
        dest_space_id: &str,
        dest_content_id: &str,
    ) -> Result<String> {
        let ctx = ErrorContext::content("copy_content", dest_space_id, dest_content_id);
        let source = format!("/{src_space_id}/{src_content_id}");
        let source_value = HeaderValue::from_str(&source).map_err(|_| {
            Self::codec_error(&ctx, CodecError::InvalidValue("copy source".into()))
        })?;
        let store_value = match src_store_id {
            Some(store) => Some(HeaderValue::from_str(store).map_err(|_| {
                Self::codec_error(&ctx, CodecError::InvalidValue("copy source store".into()))
            })?),
            None => None,
        };

        let response = self
            .dispatch(OpKind::ContentWrite, &ctx, || {
                let mut request = WireRequest::new(
                    Method::PUT,
                    self.url(&[dest_space_id, dest_content_id], &[]),
                );
                request
                    .headers
                    .insert(HeaderName::from_static(COPY_SOURCE_HEADER), source_value.clone());
                if let Some(value) = &store_value {
                    request
                        .headers
                        .insert(HeaderName::from_static(COPY_SOURCE_STORE_HEADER), value.clone());
                }
                request
            })
            .await?;

        Self::require_checksum(&ctx, &response)
    }

    /// Copy then delete the source. Not atomic on the service.
    pub async fn move_content(
        &self,
        src_store_id: Option<&str>,
        src_space_id: &str,
        src_content_id: &str,
        dest_space_id: &str,
        dest_content_id: &str,
    ) -> Result<String> {
        let checksum = self
            .copy_content(
                src_store_id,
                src_space_id,
                src_content_id,
                dest_space_id,
                dest_content_id,
            )
            .await?;
        self.delete_content(src_space_id, src_content_id).await?;
        Ok(checksum)
    }

    /// Ranged read of a content item.
    ///
    /// Returns the item's properties and a stream that recovers from
    /// transient body failures by re-issuing ranged requests from the
    /// last delivered byte. Only the initial request is retried here;
    /// the stream runs its own recovery loop afterwards. `end_byte` is
    /// inclusive and must exceed `start_byte` when given.
    pub async fn get_content(
        &self,
        space_id: &str,
        content_id: &str,
        start_byte: u64,
        end_byte: Option<u64>,
    ) -> Result<(ResumableContentStream, Properties)> {
        let ctx = ErrorContext::content("get_content", space_id, content_id);
        if let Some(end) = end_byte {
            if end <= start_byte {
                return Err(StoreError::InvalidId {
                    ctx,
                    message: format!("end byte {end} must be greater than start byte {start_byte}"),
                });
            }
        }

        let url = self.url(&[space_id, content_id], &[]);
        let ranged = start_byte > 0 || end_byte.is_some();

        let response = self
            .dispatch(OpKind::ContentRead, &ctx, || {
                let mut request = WireRequest::new(Method::GET, url.clone());
                if ranged {
                    if let Ok(value) = HeaderValue::from_str(&range_header(start_byte, end_byte)) {
                        request.headers.insert(RANGE, value);
                    }
                }
                request
            })
            .await?;

        // A 200 on a ranged request means the service ignored the
        // range and is sending the whole body from byte zero, which
        // would deliver bytes the caller excluded.
        if ranged && response.status.as_u16() == 200 {
            return Err(StoreError::Server {
                ctx,
                status: 200,
                message: "service ignored the range request".to_string(),
            });
        }

        let properties = headers::decode_properties(&response.headers);
        let stream = ResumableContentStream::new(
            self.transport(),
            url,
            self.recovery_retrier.clone(),
            response,
            start_byte,
            end_byte,
        );
        Ok((stream, properties))
    }

    pub async fn delete_content(&self, space_id: &str, content_id: &str) -> Result<()> {
        let ctx = ErrorContext::content("delete_content", space_id, content_id);
        self.dispatch(OpKind::ContentWrite, &ctx, || {
            WireRequest::new(Method::DELETE, self.url(&[space_id, content_id], &[]))
        })
        .await?;
        Ok(())
    }

    pub async fn get_content_properties(
        &self,
        space_id: &str,
        content_id: &str,
    ) -> Result<Properties> {
        let ctx = ErrorContext::content("get_content_properties", space_id, content_id);
        let response = self
            .dispatch(OpKind::ContentRead, &ctx, || {
                WireRequest::new(Method::HEAD, self.url(&[space_id, content_id], &[]))
            })
            .await?;
        Ok(headers::decode_properties(&response.headers))
    }

    /// Partial update: only the supplied keys change on the service.
    pub async fn set_content_properties(
        &self,
        space_id: &str,
        content_id: &str,
        properties: &Properties,
    ) -> Result<()> {
        let ctx = ErrorContext::content("set_content_properties", space_id, content_id);
        let encoded =
            headers::encode_properties(properties).map_err(|e| Self::codec_error(&ctx, e))?;
        self.dispatch(OpKind::ContentWrite, &ctx, || {
            let mut request =
                WireRequest::new(Method::POST, self.url(&[space_id, content_id], &[]));
            request.headers = encoded.clone();
            request
        })
        .await?;
        Ok(())
    }

    fn require_checksum(
        ctx: &ErrorContext,
        response: &crate::transport::WireResponse,
    ) -> Result<String> {
        headers::response_checksum(&response.headers).ok_or_else(|| StoreError::Server {
            ctx: ctx.clone(),
            status: response.status.as_u16(),
            message: "response carried no checksum header".to_string(),
        })
    }
}
