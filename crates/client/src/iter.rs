//! Lazy paginated walk over a space's content ids.

use futures::Stream;

use common::error::{Result, StoreError};

use crate::store::StoreClient;

/// Page limit used by [`StoreClient::get_space_contents`].
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Produces a space's content ids one page at a time.
///
/// Holds a buffered page and a cursor; the next page is fetched only
/// when the previous page filled the limit, using the last id of the
/// previous page as the continuation marker. Ids arrive in strictly
/// increasing lexicographic order under a stable listing. The iterator
/// restarts only from the beginning -- build a new one to walk again.
pub struct ContentIterator {
    client: StoreClient,
    space_id: String,
    prefix: Option<String>,
    page_size: u64,
    page: Vec<String>,
    cursor: usize,
    started: bool,
    done: bool,
}

impl ContentIterator {
    /// Iterator with a custom page limit.
    pub fn with_page_size(
        client: StoreClient,
        space_id: String,
        prefix: Option<String>,
        page_size: u64,
    ) -> Self {
        Self {
            client,
            space_id,
            prefix,
            page_size,
            page: Vec::new(),
            cursor: 0,
            started: false,
            done: false,
        }
    }

    pub fn space_id(&self) -> &str {
        &self.space_id
    }

    /// Next content id, or `None` once the listing is exhausted.
    ///
    /// When the space size is an exact multiple of the page limit, the
    /// final full page triggers one more listing call that returns zero
    /// ids before iteration terminates. That extra round trip is
    /// documented behavior, observable in the call pattern.
    pub async fn try_next(&mut self) -> Result<Option<String>> {
        loop {
            if self.cursor < self.page.len() {
                let id = self.page[self.cursor].clone();
                self.cursor += 1;
                return Ok(Some(id));
            }
            if self.done {
                return Ok(None);
            }
            // A short page means the listing ended; only a full page
            // warrants another fetch.
            if self.started && (self.page.len() as u64) < self.page_size {
                self.done = true;
                return Ok(None);
            }

            let marker = self.page.last().cloned();
            let space = self
                .client
                .get_space(
                    &self.space_id,
                    self.prefix.as_deref(),
                    Some(self.page_size),
                    marker.as_deref(),
                )
                .await?;
            self.started = true;
            if space.contents.is_empty() {
                self.done = true;
                return Ok(None);
            }
            self.page = space.contents;
            self.cursor = 0;
        }
    }

    /// Adapt the iterator into a `futures` stream of ids.
    pub fn into_stream(self) -> impl Stream<Item = Result<String>> {
        futures::stream::try_unfold(self, |mut iter| async move {
            match iter.try_next().await? {
                Some(id) => Ok::<_, StoreError>(Some((id, iter))),
                None => Ok(None),
            }
        })
    }
}
