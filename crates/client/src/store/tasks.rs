//! Remote task operations.

use http::Method;

use common::error::{ErrorContext, Result};

use crate::retry::OpKind;
use crate::store::wire::TaskListing;
use crate::store::StoreClient;
use crate::transport::{RequestBody, WireRequest};

impl StoreClient {
    /// Names of the tasks the storage provider supports.
    pub async fn list_supported_tasks(&self) -> Result<Vec<String>> {
        let ctx = ErrorContext::op("list_supported_tasks");
        let response = self
            .dispatch(OpKind::Task, &ctx, || {
                WireRequest::new(Method::GET, self.url(&["task"], &[]))
            })
            .await?;
        let listing: TaskListing = response
            .json()
            .await
            .map_err(|e| Self::body_error(&ctx, e))?;
        Ok(listing.tasks)
    }

    /// Run a named task and return the raw result body.
    ///
    /// A task the provider does not support comes back as a 400 and
    /// surfaces as [`common::StoreError::InvalidId`] with the service's
    /// message.
    pub async fn perform_task(&self, task_name: &str, params: Option<&str>) -> Result<String> {
        let ctx = ErrorContext::op("perform_task");
        let response = self
            .dispatch(OpKind::Task, &ctx, || {
                let mut request = WireRequest::new(Method::POST, self.url(&["task", task_name], &[]));
                if let Some(params) = params {
                    request.body = RequestBody::from_bytes(params.as_bytes().to_vec());
                }
                request
            })
            .await?;
        response.text().await.map_err(|e| Self::body_error(&ctx, e))
    }
}
