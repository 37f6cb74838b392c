// tests/batch_update_pool.rs

use std::collections::BTreeSet;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pytoolbox::packages::{run_pool, UpdateReport};
use pytoolbox_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("pkg{i}")).collect()
}

fn ok_report(name: String) -> UpdateReport {
    UpdateReport {
        name,
        success: true,
        stdout: String::new(),
        stderr: String::new(),
    }
}

#[tokio::test]
async fn every_package_is_processed_exactly_once() -> TestResult {
    with_timeout(async {
        init_tracing();

        let reports = run_pool(names(9), 3, |name| async move { ok_report(name) }).await;

        let seen: BTreeSet<String> = reports.iter().map(|r| r.name.clone()).collect();
        assert_eq!(reports.len(), 9);
        assert_eq!(seen.len(), 9);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn concurrency_never_exceeds_the_pool_size() -> TestResult {
    with_timeout(async {
        init_tracing();

        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let op = {
            let current = Arc::clone(&current);
            let peak = Arc::clone(&peak);
            move |name: String| {
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                    ok_report(name)
                }
            }
        };

        let reports = run_pool(names(12), 3, op).await;

        assert_eq!(reports.len(), 12);
        assert!(peak.load(Ordering::SeqCst) <= 3);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn oversized_pool_is_clamped_to_the_package_count() -> TestResult {
    with_timeout(async {
        init_tracing();

        let reports = run_pool(names(2), 64, |name| async move { ok_report(name) }).await;
        assert_eq!(reports.len(), 2);

        Ok(())
    })
    .await
}

#[tokio::test]
async fn empty_input_yields_no_reports() -> TestResult {
    with_timeout(async {
        init_tracing();

        let reports = run_pool(Vec::new(), 4, |name| async move { ok_report(name) }).await;
        assert!(reports.is_empty());

        Ok(())
    })
    .await
}

#[tokio::test]
async fn failures_are_collected_not_dropped() -> TestResult {
    with_timeout(async {
        init_tracing();

        let op = |name: String| async move {
            let success = !name.ends_with('3');
            UpdateReport {
                name,
                success,
                stdout: String::new(),
                stderr: String::new(),
            }
        };

        let reports = run_pool(names(6), 2, op).await;
        let failed: Vec<_> = reports.iter().filter(|r| !r.success).collect();

        assert_eq!(reports.len(), 6);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "pkg3");

        Ok(())
    })
    .await
}
