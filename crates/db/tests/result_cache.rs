//! Cache behaviour through the public API, with a hand-driven clock.

use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use meeple_db::cache::{ManualClock, ResultCache};

#[tokio::test]
async fn repeated_identical_requests_execute_once_inside_ttl() {
    let clock = Arc::new(ManualClock::new());
    let cache = ResultCache::new(Duration::from_secs(300), clock);
    let executions = AtomicUsize::new(0);

    for _ in 0..5 {
        let rows: Result<Vec<String>, Infallible> = cache
            .get_or_compute("search:abc", || async {
                executions.fetch_add(1, Ordering::SeqCst);
                Ok(vec!["wingspan".to_string()])
            })
            .await;
        assert_eq!(rows.unwrap(), vec!["wingspan".to_string()]);
    }
    assert_eq!(executions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ttl_expiry_triggers_exactly_one_recompute() {
    let clock = Arc::new(ManualClock::new());
    let cache = ResultCache::new(Duration::from_secs(300), clock.clone());
    let executions = AtomicUsize::new(0);

    let lookup = || {
        let executions = &executions;
        cache.get_or_compute("k", move || async move {
            executions.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(vec![1])
        })
    };

    let _ = lookup().await;
    clock.advance(Duration::from_secs(301));
    let _ = lookup().await;
    let _ = lookup().await;
    assert_eq!(executions.load(Ordering::SeqCst), 2);
}

/// Clear, then repeat an identical search: exactly one fresh execution.
#[tokio::test]
async fn clear_then_identical_request_executes_once() {
    let clock = Arc::new(ManualClock::new());
    let cache = ResultCache::new(Duration::from_secs(300), clock);
    let executions = AtomicUsize::new(0);

    let lookup = || {
        let executions = &executions;
        cache.get_or_compute("search:abc", move || async move {
            executions.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Infallible>(vec![7])
        })
    };

    let _ = lookup().await;
    assert_eq!(executions.load(Ordering::SeqCst), 1);

    cache.clear().await;
    let _ = lookup().await;
    let _ = lookup().await;
    assert_eq!(executions.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn clear_is_safe_concurrently_with_lookups() {
    let clock = Arc::new(ManualClock::new());
    let cache = Arc::new(ResultCache::<i64>::new(Duration::from_secs(300), clock));

    let mut handles = Vec::new();
    for i in 0..16 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            if i % 4 == 0 {
                cache.clear().await;
                Vec::new()
            } else {
                cache
                    .get_or_compute(&format!("k{}", i % 3), move || async move {
                        Ok::<_, Infallible>(vec![i])
                    })
                    .await
                    .unwrap()
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}
