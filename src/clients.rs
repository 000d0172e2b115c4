use std::sync::Arc;

use serde_json::Value;

use crate::{executor::Method, RequestExecutor, Result};

/// Client-account operations. Unlike other resources, these endpoints are not
/// scoped beneath a client ID: they enumerate the clients the API key can
/// act for.
#[derive(Clone, Debug)]
pub struct Clients {
    executor: Arc<RequestExecutor>,
    platform_url: String,
}

impl Clients {
    pub(crate) fn new(executor: Arc<RequestExecutor>, platform_url: impl Into<String>) -> Self {
        Self {
            executor,
            platform_url: platform_url.into(),
        }
    }

    fn base_url(&self) -> String {
        format!("{}/api/v1/client", self.platform_url)
    }

    /// Lists clients associated with the API key, one page at a time. The
    /// payload nests the client records under `_embedded.clients`.
    pub async fn list(&self, page_size: u32, page: u32) -> Result<Value> {
        let url = self.base_url();
        let size = page_size.to_string();
        let page = page.to_string();
        let params = [("size", size.as_str()), ("page", page.as_str())];
        let response = self
            .executor
            .make_request(Method::Get, &url, Some(&params), None, None)
            .await?;
        response.json()
    }

    /// Fetches the details of one client.
    pub async fn get(&self, client_id: u64) -> Result<Value> {
        let url = format!("{}/{client_id}", self.base_url());
        let response = self
            .executor
            .make_request(Method::Get, &url, None, None, None)
            .await?;
        response.json()
    }
}
