//! Space operations.

use http::Method;

use common::error::{ErrorContext, Result};
use common::{AclMap, Properties, Space};

use crate::headers;
use crate::iter::{ContentIterator, DEFAULT_PAGE_SIZE};
use crate::retry::OpKind;
use crate::store::wire::{ContentPage, SpaceListing};
use crate::store::StoreClient;
use crate::transport::WireRequest;

impl StoreClient {
    /// List the ids of all spaces in the store.
    pub async fn list_spaces(&self) -> Result<Vec<String>> {
        let ctx = ErrorContext::op("list_spaces");
        let response = self
            .dispatch(OpKind::SpaceRead, &ctx, || {
                WireRequest::new(Method::GET, self.url(&["spaces"], &[]))
            })
            .await?;
        let listing: SpaceListing = response
            .json()
            .await
            .map_err(|e| Self::body_error(&ctx, e))?;
        Ok(listing.spaces)
    }

    /// Fetch a space: its properties from response headers plus one
    /// page of content ids from the body.
    ///
    /// `marker` restarts the listing after the given content id;
    /// `max_results` bounds the page (the service applies its own cap).
    pub async fn get_space(
        &self,
        space_id: &str,
        prefix: Option<&str>,
        max_results: Option<u64>,
        marker: Option<&str>,
    ) -> Result<Space> {
        let ctx = ErrorContext::space("get_space", space_id);
        let mut query = Vec::new();
        if let Some(prefix) = prefix {
            query.push(("prefix", prefix.to_string()));
        }
        if let Some(max_results) = max_results {
            query.push(("maxResults", max_results.to_string()));
        }
        if let Some(marker) = marker {
            query.push(("marker", marker.to_string()));
        }

        let response = self
            .dispatch(OpKind::SpaceRead, &ctx, || {
                WireRequest::new(Method::GET, self.url(&[space_id], &query))
            })
            .await?;

        let properties = headers::decode_properties(&response.headers);
        let page: ContentPage = response
            .json()
            .await
            .map_err(|e| Self::body_error(&ctx, e))?;

        Ok(Space {
            id: space_id.to_string(),
            properties,
            contents: page.contents,
        })
    }

    /// Lazy iterator over every content id in a space.
    pub fn get_space_contents(&self, space_id: &str, prefix: Option<String>) -> ContentIterator {
        ContentIterator::with_page_size(self.clone(), space_id.to_string(), prefix, DEFAULT_PAGE_SIZE)
    }

    pub async fn create_space(&self, space_id: &str) -> Result<()> {
        let ctx = ErrorContext::space("create_space", space_id);
        self.dispatch(OpKind::SpaceWrite, &ctx, || {
            WireRequest::new(Method::PUT, self.url(&[space_id], &[]))
        })
        .await?;
        Ok(())
    }

    pub async fn delete_space(&self, space_id: &str) -> Result<()> {
        let ctx = ErrorContext::space("delete_space", space_id);
        self.dispatch(OpKind::SpaceWrite, &ctx, || {
            WireRequest::new(Method::DELETE, self.url(&[space_id], &[]))
        })
        .await?;
        Ok(())
    }

    /// Space properties without the content listing.
    pub async fn get_space_properties(&self, space_id: &str) -> Result<Properties> {
        let ctx = ErrorContext::space("get_space_properties", space_id);
        let response = self
            .dispatch(OpKind::SpaceRead, &ctx, || {
                WireRequest::new(Method::HEAD, self.url(&[space_id], &[]))
            })
            .await?;
        Ok(headers::decode_properties(&response.headers))
    }

    /// Partial update: only the supplied keys change on the service.
    pub async fn set_space_properties(
        &self,
        space_id: &str,
        properties: &Properties,
    ) -> Result<()> {
        let ctx = ErrorContext::space("set_space_properties", space_id);
        let encoded =
            headers::encode_properties(properties).map_err(|e| Self::codec_error(&ctx, e))?;
        self.dispatch(OpKind::SpaceWrite, &ctx, || {
            let mut request = WireRequest::new(Method::POST, self.url(&[space_id], &[]));
            request.headers = encoded.clone();
            request
        })
        .await?;
        Ok(())
    }

    pub async fn get_space_acls(&self, space_id: &str) -> Result<AclMap> {
        let ctx = ErrorContext::space("get_space_acls", space_id);
        let response = self
            .dispatch(OpKind::SpaceRead, &ctx, || {
                WireRequest::new(Method::HEAD, self.url(&["acl", space_id], &[]))
            })
            .await?;
        Ok(headers::decode_acls(&response.headers))
    }

    /// Full replace: principals not present in `acls` lose access.
    pub async fn set_space_acls(&self, space_id: &str, acls: &AclMap) -> Result<()> {
        let ctx = ErrorContext::space("set_space_acls", space_id);
        let encoded = headers::encode_acls(acls).map_err(|e| Self::codec_error(&ctx, e))?;
        self.dispatch(OpKind::SpaceWrite, &ctx, || {
            let mut request = WireRequest::new(Method::POST, self.url(&["acl", space_id], &[]));
            request.headers = encoded.clone();
            request
        })
        .await?;
        Ok(())
    }
}
