//! Scan scheduler
//!
//! Background task that runs one scan pass over every registered repository,
//! sleeps, and repeats forever.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::app::feed_registry::FeedRegistry;
use crate::app::scanner_service::{ScanSummary, ScannerService};
use crate::domain::ports::GitHubClient;

/// Totals of one pass over all repositories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub scanned: usize,
    pub failed: usize,
    pub new_issues: usize,
    pub new_comments: usize,
}

/// Run a single pass over the repositories registered right now.
///
/// Repositories registered while the pass runs are picked up next time.
pub async fn run_once<GC>(scanner: &ScannerService<GC>, registry: &FeedRegistry) -> PassReport
where
    GC: GitHubClient,
{
    let repos = registry.snapshot();
    tracing::debug!(repositories = repos.len(), "Starting scan pass");

    let mut report = PassReport::default();
    for outcome in scanner.run_pass(&repos).await {
        match outcome {
            Ok(ScanSummary {
                new_issues,
                new_comments,
                ..
            }) => {
                report.scanned += 1;
                report.new_issues += new_issues;
                report.new_comments += new_comments;
            }
            Err(_) => report.failed += 1,
        }
    }

    tracing::info!(
        scanned = report.scanned,
        failed = report.failed,
        new_issues = report.new_issues,
        new_comments = report.new_comments,
        "Scan pass finished"
    );
    report
}

/// Spawn the perpetual scan loop. The sleep starts only after a full pass,
/// so passes never overlap.
pub fn spawn_scheduler<GC>(
    scanner: Arc<ScannerService<GC>>,
    registry: Arc<FeedRegistry>,
    interval: Duration,
) -> JoinHandle<()>
where
    GC: GitHubClient + 'static,
{
    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "Scheduler started");
        loop {
            run_once(&scanner, &registry).await;
            tokio::time::sleep(interval).await;
        }
    })
}
