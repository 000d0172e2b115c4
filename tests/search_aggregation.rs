use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use risksense_http::{FailurePolicy, PageAggregator, RiskSenseError, SortDirection};
use serde_json::{json, Value};

fn host_page(ids: &[u64]) -> Value {
    let hosts: Vec<Value> = ids
        .iter()
        .map(|id| json!({"id": id, "hostname": format!("host-{id}")}))
        .collect();
    json!({"_embedded": {"hosts": hosts}})
}

fn ids(items: &[Value]) -> Vec<u64> {
    items
        .iter()
        .map(|item| item["id"].as_u64().expect("item must have numeric id"))
        .collect()
}

#[tokio::test]
async fn all_pages_concatenate_into_one_list() {
    let pages = vec![host_page(&[1, 2]), host_page(&[3, 4]), host_page(&[5, 6])];
    let aggregator = PageAggregator::new(4);

    let items = aggregator
        .aggregate(3, "hosts", "id", SortDirection::Asc, |page| {
            let payload = pages[page as usize].clone();
            async move { Ok(payload) }
        })
        .await
        .expect("aggregation must succeed");

    assert_eq!(items.len(), 6);
    assert_eq!(ids(&items), vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn failed_page_is_skipped_and_the_rest_survive() {
    let pages = vec![host_page(&[1, 2]), Value::Null, host_page(&[5, 6])];
    let aggregator = PageAggregator::new(4);

    let items = aggregator
        .aggregate(3, "hosts", "id", SortDirection::Asc, |page| {
            let payload = pages[page as usize].clone();
            async move {
                if page == 1 {
                    Err(RiskSenseError::Http {
                        status: 500,
                        body: "boom".to_owned(),
                    })
                } else {
                    Ok(payload)
                }
            }
        })
        .await
        .expect("one flaky page must not abort the search");

    assert_eq!(items.len(), 4);
    assert_eq!(ids(&items), vec![1, 2, 5, 6]);
}

#[tokio::test]
async fn page_size_error_aborts_the_whole_aggregation() {
    let aggregator = PageAggregator::new(4);

    let err = aggregator
        .aggregate(3, "hosts", "id", SortDirection::Asc, |page| async move {
            if page == 2 {
                Err(RiskSenseError::PageSize(
                    "Maximum page size must be less than or equal to 1000.".to_owned(),
                ))
            } else {
                Ok(host_page(&[page as u64]))
            }
        })
        .await
        .expect_err("page size error must fail fast");

    assert!(matches!(err, RiskSenseError::PageSize(_)));
}

#[tokio::test]
async fn fail_fast_policy_aborts_on_any_page_failure() {
    let aggregator = PageAggregator::new(4).with_failure_policy(FailurePolicy::FailFast);

    let err = aggregator
        .aggregate(3, "hosts", "id", SortDirection::Asc, |page| async move {
            if page == 1 {
                Err(RiskSenseError::Http {
                    status: 502,
                    body: "bad gateway".to_owned(),
                })
            } else {
                Ok(host_page(&[page as u64]))
            }
        })
        .await
        .expect_err("fail-fast must abort on the first failed page");

    match err {
        RiskSenseError::Http { status, .. } => assert_eq!(status, 502),
        other => panic!("expected Http, got {other:?}"),
    }
}

#[tokio::test]
async fn caller_errors_propagate_even_when_skipping_failures() {
    let aggregator = PageAggregator::new(4);

    let err = aggregator
        .aggregate(2, "hosts", "id", SortDirection::Asc, |page| async move {
            if page == 0 {
                Err(RiskSenseError::Decode("mangled payload".to_owned()))
            } else {
                Ok(host_page(&[1]))
            }
        })
        .await
        .expect_err("decode errors are not skippable");

    assert!(matches!(err, RiskSenseError::Decode(_)));
}

#[tokio::test]
async fn sort_is_deterministic_regardless_of_completion_order() {
    // Pages complete out of submission order: page 0 is the slowest.
    let pages = vec![host_page(&[3]), host_page(&[1]), host_page(&[2])];
    let aggregator = PageAggregator::new(3);

    let fetch = |page: u32| {
        let payload = pages[page as usize].clone();
        async move {
            let delay_ms = match page {
                0 => 60,
                1 => 5,
                _ => 25,
            };
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            Ok(payload)
        }
    };

    let ascending = aggregator
        .aggregate(3, "hosts", "id", SortDirection::Asc, &fetch)
        .await
        .expect("aggregation must succeed");
    assert_eq!(ids(&ascending), vec![1, 2, 3]);

    let descending = aggregator
        .aggregate(3, "hosts", "id", SortDirection::Desc, &fetch)
        .await
        .expect("aggregation must succeed");
    assert_eq!(ids(&descending), vec![3, 2, 1]);
}

#[tokio::test]
async fn aggregation_is_idempotent_for_a_deterministic_fetch() {
    let pages = vec![host_page(&[4, 2]), host_page(&[3, 1])];
    let aggregator = PageAggregator::new(2);

    let fetch = |page: u32| {
        let payload = pages[page as usize].clone();
        async move { Ok(payload) }
    };

    let first = aggregator
        .aggregate(2, "hosts", "id", SortDirection::Asc, &fetch)
        .await
        .expect("aggregation must succeed");
    let second = aggregator
        .aggregate(2, "hosts", "id", SortDirection::Asc, &fetch)
        .await
        .expect("aggregation must succeed");

    assert_eq!(first, second);
    assert_eq!(ids(&first), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn page_without_embedded_key_contributes_nothing() {
    let pages = vec![
        host_page(&[1]),
        json!({"page": {"totalElements": 1}}),
        json!({"_embedded": {"tags": [{"id": 99}]}}),
    ];
    let aggregator = PageAggregator::new(2);

    let items = aggregator
        .aggregate(3, "hosts", "id", SortDirection::Asc, |page| {
            let payload = pages[page as usize].clone();
            async move { Ok(payload) }
        })
        .await
        .expect("aggregation must succeed");

    assert_eq!(ids(&items), vec![1]);
}

#[tokio::test]
async fn progress_observer_sees_every_completed_page() {
    let observed = Arc::new(AtomicUsize::new(0));
    let last_total = Arc::new(AtomicUsize::new(0));
    let aggregator = PageAggregator::new(2).with_progress({
        let observed = Arc::clone(&observed);
        let last_total = Arc::clone(&last_total);
        move |completed, total| {
            observed.store(completed, Ordering::SeqCst);
            last_total.store(total, Ordering::SeqCst);
        }
    });

    aggregator
        .aggregate(4, "hosts", "id", SortDirection::Asc, |page| async move {
            Ok(host_page(&[page as u64]))
        })
        .await
        .expect("aggregation must succeed");

    assert_eq!(observed.load(Ordering::SeqCst), 4);
    assert_eq!(last_total.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn zero_pages_yield_an_empty_list() {
    let aggregator = PageAggregator::new(4);

    let items = aggregator
        .aggregate(0, "hosts", "id", SortDirection::Asc, |_page| async move {
            Ok(host_page(&[1]))
        })
        .await
        .expect("empty aggregation must succeed");

    assert!(items.is_empty());
}
