//! Error taxonomy for remote store operations.

use std::fmt;

/// Operation name plus the identifiers it was acting on.
///
/// Attached to every [`StoreError`] so a failure can be traced back to a
/// concrete remote call without any surrounding context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorContext {
    pub operation: &'static str,
    pub space_id: Option<String>,
    pub content_id: Option<String>,
}

impl ErrorContext {
    pub fn op(operation: &'static str) -> Self {
        Self {
            operation,
            space_id: None,
            content_id: None,
        }
    }

    pub fn space(operation: &'static str, space_id: impl Into<String>) -> Self {
        Self {
            operation,
            space_id: Some(space_id.into()),
            content_id: None,
        }
    }

    pub fn content(
        operation: &'static str,
        space_id: impl Into<String>,
        content_id: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            space_id: Some(space_id.into()),
            content_id: Some(content_id.into()),
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation)?;
        if let Some(space) = &self.space_id {
            write!(f, " space={}", space)?;
        }
        if let Some(content) = &self.content_id {
            write!(f, " content={}", content)?;
        }
        Ok(())
    }
}

/// Errors raised by remote store operations.
///
/// Every non-success response is classified into exactly one variant at
/// the point of occurrence; callers receive a single typed error per
/// call. The retry layer does not inspect these kinds -- it retries
/// blindly within its bound, except for the streaming upload which is
/// never resent.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The space or content item does not exist (404).
    #[error("{0}: not found")]
    NotFound(ErrorContext),

    /// The caller is not permitted to perform the operation (401/403).
    #[error("{0}: unauthorized")]
    Unauthorized(ErrorContext),

    /// The request was rejected as invalid (400).
    #[error("{ctx}: invalid request: {message}")]
    InvalidId { ctx: ErrorContext, message: String },

    /// The operation conflicts with the current remote state (409).
    #[error("{ctx}: conflicting state: {message}")]
    ConflictingState { ctx: ErrorContext, message: String },

    /// The storage provider does not implement the operation (501).
    #[error("{0}: not implemented by the storage provider")]
    NotImplemented(ErrorContext),

    /// The checksum echoed by the service differs from the one the
    /// caller supplied. Raised even when the HTTP status reported
    /// success, and never retried.
    #[error("{ctx}: checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        ctx: ErrorContext,
        expected: String,
        actual: String,
    },

    /// Any other unexpected response.
    #[error("{ctx}: unexpected status {status}: {message}")]
    Server {
        ctx: ErrorContext,
        status: u16,
        message: String,
    },

    /// The request never produced a usable response.
    #[error("{ctx}: transport failure: {source}")]
    Transport {
        ctx: ErrorContext,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// The operation context the error was raised with.
    pub fn context(&self) -> &ErrorContext {
        match self {
            StoreError::NotFound(ctx)
            | StoreError::Unauthorized(ctx)
            | StoreError::NotImplemented(ctx) => ctx,
            StoreError::InvalidId { ctx, .. }
            | StoreError::ConflictingState { ctx, .. }
            | StoreError::ChecksumMismatch { ctx, .. }
            | StoreError::Server { ctx, .. }
            | StoreError::Transport { ctx, .. } => ctx,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
