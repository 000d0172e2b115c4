use std::cmp::Ordering;
use std::fmt;
use std::future::Future;

use futures_util::stream::{self, StreamExt};
use serde_json::Value;

use crate::{Result, RiskSenseError, SortDirection};

/// Top-level key under which paginated search responses nest their items.
pub(crate) const EMBEDDED_KEY: &str = "_embedded";

type ProgressFn = Box<dyn Fn(usize, usize) + Send + Sync>;

/// What to do when a single page fetch fails.
///
/// A page-size error always aborts the aggregation regardless of policy:
/// it indicates a page size that is structurally invalid for every page,
/// not a transient per-page problem.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Drop the failing page's contribution and keep going. One flaky page
    /// must not abort a multi-thousand-item search.
    #[default]
    SkipFailedPages,
    /// Abort the aggregation on the first failing page.
    FailFast,
}

/// Fetches every page of a paginated result set concurrently and combines
/// the pages into one sorted item list.
///
/// Page futures are all submitted up front and run under a bounded worker
/// budget, so wall time is bounded by the slowest page plus contention, not
/// the page sum. Completion order is irrelevant: a single stable sort by the
/// requested field runs after the last page lands, so the returned order is
/// deterministic.
pub struct PageAggregator {
    workers: usize,
    policy: FailurePolicy,
    progress: Option<ProgressFn>,
}

impl fmt::Debug for PageAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageAggregator")
            .field("workers", &self.workers)
            .field("policy", &self.policy)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl PageAggregator {
    /// Creates an aggregator with the given concurrent-fetch budget.
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            policy: FailurePolicy::default(),
            progress: None,
        }
    }

    /// Sets the per-page failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attaches a progress observer, called once per completed page with
    /// `(completed, total)`. Display is the observer's concern; the
    /// aggregator itself performs no I/O beyond the page fetches.
    pub fn with_progress(
        mut self,
        observer: impl Fn(usize, usize) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(observer));
        self
    }

    /// Fetches pages `[0, num_pages)` via `fetch`, flattens each page's
    /// `_embedded.<items_key>` array, and returns all items sorted by
    /// `sort_field` in `sort_dir` order.
    ///
    /// A page payload without the nested key contributes nothing. Failing
    /// pages are handled per the configured [`FailurePolicy`], except that
    /// [`RiskSenseError::PageSize`] always aborts immediately and errors
    /// outside the request-failure family (caller or decode bugs) always
    /// propagate.
    pub async fn aggregate<F, Fut>(
        &self,
        num_pages: u32,
        items_key: &str,
        sort_field: &str,
        sort_dir: SortDirection,
        fetch: F,
    ) -> Result<Vec<Value>>
    where
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let total = num_pages as usize;
        let mut completions = stream::iter((0..num_pages).map(|page| {
            let fetched = fetch(page);
            async move { (page, fetched.await) }
        }))
        .buffer_unordered(self.workers);

        let mut items: Vec<Value> = Vec::new();
        let mut completed = 0usize;

        while let Some((page, outcome)) = completions.next().await {
            completed += 1;
            match outcome {
                Ok(payload) => {
                    if let Some(page_items) = payload
                        .get(EMBEDDED_KEY)
                        .and_then(|embedded| embedded.get(items_key))
                        .and_then(Value::as_array)
                    {
                        items.extend(page_items.iter().cloned());
                    }
                }
                Err(err @ RiskSenseError::PageSize(_)) => return Err(err),
                Err(err) if err.is_request_failure() => {
                    if self.policy == FailurePolicy::FailFast {
                        return Err(err);
                    }
                    #[cfg(feature = "tracing")]
                    tracing::warn!("skipping page {page}: {err}");
                    #[cfg(not(feature = "tracing"))]
                    let _ = (page, err);
                }
                Err(err) => return Err(err),
            }

            if let Some(progress) = &self.progress {
                progress(completed, total);
            }
        }

        items.sort_by(|a, b| {
            let ordering = compare_by_field(a, b, sort_field);
            match sort_dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        Ok(items)
    }
}

/// Compares two result items by the value under `field`.
///
/// Missing fields sort first; mixed-type values order by type
/// (null < bool < number < string < array < object), matching nothing the
/// platform guarantees but keeping the sort total over arbitrary payloads.
fn compare_by_field(a: &Value, b: &Value, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare_values(x, y),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or(f64::NAN)
            .total_cmp(&y.as_f64().unwrap_or(f64::NAN)),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use serde_json::json;

    use super::{compare_by_field, compare_values};

    #[test]
    fn numbers_compare_numerically() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!(2.5), &json!(2)), Ordering::Greater);
        assert_eq!(compare_values(&json!(3), &json!(3.0)), Ordering::Equal);
    }

    #[test]
    fn strings_compare_lexicographically() {
        assert_eq!(
            compare_values(&json!("alpha"), &json!("beta")),
            Ordering::Less
        );
    }

    #[test]
    fn missing_field_sorts_first() {
        let with_id = json!({"id": 1});
        let without_id = json!({"hostname": "web-1"});
        assert_eq!(
            compare_by_field(&without_id, &with_id, "id"),
            Ordering::Less
        );
        assert_eq!(
            compare_by_field(&with_id, &without_id, "id"),
            Ordering::Greater
        );
    }

    #[test]
    fn mixed_types_order_by_type_rank() {
        assert_eq!(compare_values(&json!(null), &json!(false)), Ordering::Less);
        assert_eq!(compare_values(&json!(7), &json!("7")), Ordering::Less);
    }
}
