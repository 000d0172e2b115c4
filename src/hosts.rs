use serde_json::{json, Value};

use crate::{Result, SearchFilter, SearchParams, Subject};

/// Host operations: search across the client's host inventory and bulk tag
/// assignment driven by a filter set.
#[derive(Clone, Debug)]
pub struct Hosts {
    subject: Subject,
}

impl Hosts {
    pub(crate) fn new(subject: Subject) -> Self {
        Self { subject }
    }

    /// Fetches a single page of host search results.
    pub async fn search_page(
        &self,
        client_id: u64,
        page: u32,
        params: &SearchParams,
    ) -> Result<Value> {
        self.subject.search_page(client_id, page, params).await
    }

    /// Fetches all pages of host search results as one sorted list.
    pub async fn search(&self, client_id: u64, params: &SearchParams) -> Result<Vec<Value>> {
        self.subject.search(client_id, params).await
    }

    /// Count of hosts matched by the filter set.
    pub async fn count(&self, client_id: u64, filters: &[SearchFilter]) -> Result<u64> {
        self.subject.count(client_id, filters).await
    }

    /// Adds a tag to every host matched by the filter set. Returns the job ID.
    pub async fn add_tag(
        &self,
        client_id: u64,
        filters: &[SearchFilter],
        tag_id: u64,
    ) -> Result<u64> {
        self.tag_op(client_id, filters, tag_id, false).await
    }

    /// Removes a tag from every host matched by the filter set. Returns the
    /// job ID.
    pub async fn remove_tag(
        &self,
        client_id: u64,
        filters: &[SearchFilter],
        tag_id: u64,
    ) -> Result<u64> {
        self.tag_op(client_id, filters, tag_id, true).await
    }

    async fn tag_op(
        &self,
        client_id: u64,
        filters: &[SearchFilter],
        tag_id: u64,
        is_remove: bool,
    ) -> Result<u64> {
        let body = json!({
            "tagId": tag_id,
            "isRemove": is_remove,
            "filterRequest": {
                "filters": filters
            }
        });
        self.subject.post_for_id(client_id, "/tag", &body).await
    }
}
