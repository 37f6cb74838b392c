// src/packages/batch.rs

//! Bounded-concurrency fan-out for batch package updates.
//!
//! A fixed-size worker pool pulls indices from a shared atomic counter over
//! the package list and runs one update per name. Results are collected as
//! workers finish, so their order is not the input order.
//!
//! The per-package operation is a caller-supplied async closure, which lets
//! tests drive the pool without touching a real package manager.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::packages::{self, PackageManager};
use crate::relay::Relay;

/// Default worker pool size for batch updates.
pub const DEFAULT_JOBS: usize = 4;

/// Outcome of one package's update within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateReport {
    pub name: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run `op` over `names` with at most `jobs` concurrent invocations.
pub async fn run_pool<F, Fut>(names: Vec<String>, jobs: usize, op: F) -> Vec<UpdateReport>
where
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = UpdateReport> + Send,
{
    if names.is_empty() {
        return Vec::new();
    }

    let total = names.len();
    let jobs = jobs.clamp(1, total);
    info!(total, jobs, "starting batch update pool");

    let names = Arc::new(names);
    let next_index = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::channel::<UpdateReport>(total);

    for worker in 0..jobs {
        let names = Arc::clone(&names);
        let next_index = Arc::clone(&next_index);
        let tx = tx.clone();
        let op = op.clone();

        tokio::spawn(async move {
            loop {
                let index = next_index.fetch_add(1, Ordering::SeqCst);
                let Some(name) = names.get(index) else {
                    debug!(worker, "worker done; no more packages");
                    break;
                };

                let report = op(name.clone()).await;
                if tx.send(report).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    let mut reports = Vec::with_capacity(total);
    while let Some(report) = rx.recv().await {
        reports.push(report);
    }
    reports
}

/// Update every named package through the relay, `jobs` at a time.
pub async fn batch_update(
    relay: Arc<Relay>,
    manager: PackageManager,
    names: Vec<String>,
    jobs: usize,
) -> Vec<UpdateReport> {
    let op = move |name: String| {
        let relay = Arc::clone(&relay);
        async move {
            match packages::update(&relay, manager, &name).await {
                Ok(result) => UpdateReport {
                    name,
                    success: result.success,
                    stdout: result.stdout,
                    stderr: result.stderr,
                },
                Err(err) => UpdateReport {
                    name,
                    success: false,
                    stdout: String::new(),
                    stderr: err.to_string(),
                },
            }
        }
    };

    run_pool(names, jobs, op).await
}
