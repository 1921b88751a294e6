//! Client access layer for a remote silo content store.
//!
//! A store exposes *spaces* containing *content items*, each with a byte
//! stream and key/value properties, over plain HTTP. This crate is the
//! resilient protocol layer a single client instance talks to that
//! service through:
//!
//! - [`StoreClient`]: dispatches every space/content/task operation and
//!   classifies response statuses into the shared error taxonomy
//! - [`Retrier`]: bounded, exponentially backed-off retry executor with
//!   an explicit [`RetryPolicy`]; streaming uploads are never resent
//!   because their body cannot be safely re-read
//! - [`ContentIterator`]: lazy paginated walk over a space's content ids
//! - [`ResumableContentStream`]: ranged read that transparently
//!   re-acquires the remainder after a transient body failure
//! - [`headers`]: bidirectional mapping between property/ACL maps and
//!   wire headers
//!
//! # Example
//!
//! ```rust,no_run
//! use client::StoreClient;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = StoreClient::new(Url::parse("http://localhost:8080/silostore")?)?;
//! let mut contents = store.get_space_contents("photos", None);
//! while let Some(id) = contents.try_next().await? {
//!     println!("{id}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod headers;
pub mod iter;
pub mod retry;
pub mod store;
pub mod stream;
pub mod transport;

pub use iter::{ContentIterator, DEFAULT_PAGE_SIZE};
pub use retry::{retry_delay, BlindRetryPolicy, OpKind, Retrier, RetryPolicy};
pub use store::{BuildError, StoreClient, StoreClientBuilder};
pub use stream::ResumableContentStream;
pub use transport::{
    ByteStream, ReqwestTransport, RequestBody, Transport, TransportError, WireRequest,
    WireResponse,
};
