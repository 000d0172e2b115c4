use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::{
    executor::Method, PageAggregator, Projection, RequestExecutor, Result, RiskSenseError,
    SearchFilter, SortDirection,
};

/// Parameters for one paginated search, shared by every page of the fan-out.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchParams {
    pub filters: Vec<SearchFilter>,
    pub projection: Projection,
    /// Results per page; the platform caps this at 1000.
    pub page_size: u32,
    pub sort_field: String,
    pub sort_dir: SortDirection,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            projection: Projection::Basic,
            page_size: 150,
            sort_field: "id".to_owned(),
            sort_dir: SortDirection::Asc,
        }
    }
}

impl SearchParams {
    /// Default parameters with the given filter set.
    pub fn filtered(filters: impl Into<Vec<SearchFilter>>) -> Self {
        Self {
            filters: filters.into(),
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
struct SortSpec<'a> {
    field: &'a str,
    direction: SortDirection,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    filters: &'a [SearchFilter],
    projection: Projection,
    sort: [SortSpec<'a>; 1],
    page: u32,
    size: u32,
}

/// Total-count and page-count info for a search, read from the platform's
/// `page` envelope.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageInfo {
    pub total_elements: u64,
    pub total_pages: u32,
}

/// Search plumbing shared by every API resource: single-page search, a
/// page-info probe, and the aggregate-all-pages convenience built on
/// [`PageAggregator`].
///
/// Resource handles wrap a `Subject` and add their endpoint-specific calls.
#[derive(Clone, Debug)]
pub struct Subject {
    executor: Arc<RequestExecutor>,
    platform_url: String,
    name: &'static str,
}

impl Subject {
    pub(crate) fn new(
        executor: Arc<RequestExecutor>,
        platform_url: impl Into<String>,
        name: &'static str,
    ) -> Self {
        Self {
            executor,
            platform_url: platform_url.into(),
            name,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Endpoint root for this subject scoped to one client:
    /// `{platform}/api/v1/client/{client_id}/{subject}`.
    pub(crate) fn base_url(&self, client_id: u64) -> String {
        format!(
            "{}/api/v1/client/{client_id}/{}",
            self.platform_url, self.name
        )
    }

    /// Key under `_embedded` holding this subject's items, e.g. `"hosts"`.
    fn items_key(&self) -> String {
        format!("{}s", self.name)
    }

    /// Fetches a single page of search results as the raw JSON payload.
    pub async fn search_page(
        &self,
        client_id: u64,
        page: u32,
        params: &SearchParams,
    ) -> Result<Value> {
        let url = format!("{}/search", self.base_url(client_id));
        let body = serde_json::to_value(SearchBody {
            filters: &params.filters,
            projection: params.projection,
            sort: [SortSpec {
                field: &params.sort_field,
                direction: params.sort_dir,
            }],
            page,
            size: params.page_size,
        })
        .map_err(|err| RiskSenseError::Decode(format!("invalid search body: {err}")))?;

        let response = self
            .executor
            .make_request(Method::Post, &url, None, Some(&body), None)
            .await?;
        response.json()
    }

    /// Probes page zero and reads the total element and page counts from the
    /// response's `page` envelope.
    pub async fn page_info(&self, client_id: u64, params: &SearchParams) -> Result<PageInfo> {
        let payload = self.search_page(client_id, 0, params).await?;
        let page = payload
            .get("page")
            .ok_or_else(|| RiskSenseError::Decode("missing page envelope in search response".to_owned()))?;

        let total_elements = page
            .get("totalElements")
            .and_then(Value::as_u64)
            .ok_or_else(|| RiskSenseError::Decode("missing page.totalElements".to_owned()))?;
        let total_pages = page
            .get("totalPages")
            .and_then(Value::as_u64)
            .ok_or_else(|| RiskSenseError::Decode("missing page.totalPages".to_owned()))?;

        Ok(PageInfo {
            total_elements,
            total_pages: total_pages as u32,
        })
    }

    /// Count of records matched by the filter set.
    pub async fn count(&self, client_id: u64, filters: &[SearchFilter]) -> Result<u64> {
        let params = SearchParams::filtered(filters.to_vec());
        Ok(self.page_info(client_id, &params).await?.total_elements)
    }

    /// Fetches every page of results and returns one combined list, sorted by
    /// the requested field and direction. Pages are fetched concurrently
    /// under the executor's worker budget; individual failed pages are
    /// skipped, except a page-size error which aborts the whole search.
    pub async fn search(&self, client_id: u64, params: &SearchParams) -> Result<Vec<Value>> {
        let aggregator = PageAggregator::new(self.executor.options().num_workers);
        self.search_with(&aggregator, client_id, params).await
    }

    /// As [`search`](Self::search), with a caller-configured aggregator
    /// (progress observer, failure policy, worker budget).
    pub async fn search_with(
        &self,
        aggregator: &PageAggregator,
        client_id: u64,
        params: &SearchParams,
    ) -> Result<Vec<Value>> {
        let info = self.page_info(client_id, params).await?;
        let items_key = self.items_key();
        aggregator
            .aggregate(
                info.total_pages,
                &items_key,
                &params.sort_field,
                params.sort_dir,
                |page| self.search_page(client_id, page, params),
            )
            .await
    }

    /// POSTs a body to a path beneath this subject's base URL and returns the
    /// `id` field of the JSON response (job ID or created-record ID).
    pub(crate) async fn post_for_id(
        &self,
        client_id: u64,
        path: &str,
        body: &Value,
    ) -> Result<u64> {
        let url = format!("{}{path}", self.base_url(client_id));
        let response = self
            .executor
            .make_request(Method::Post, &url, None, Some(body), None)
            .await?;
        let payload: Value = response.json()?;
        payload
            .get("id")
            .and_then(Value::as_u64)
            .ok_or_else(|| RiskSenseError::Decode("missing id in response".to_owned()))
    }
}
