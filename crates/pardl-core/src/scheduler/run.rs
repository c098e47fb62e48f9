//! Batch orchestration: validate, admit, spawn, pace, drain.
//!
//! `run_batch` is one finite pass. Items 1..=N are submitted in order, each
//! behind an admission slot and a fixed stagger; completions arrive in any
//! order. Per-item failures land in the summary without disturbing siblings.
//! Observed cancellation stops admission; the drain still waits for every
//! already-spawned unit so no slot or file handle is left dangling.

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinSet;

use crate::config::PardlConfig;
use crate::control::CancelFlag;
use crate::dest;
use crate::fetcher::{FetchError, Fetcher, WorkItem};

use super::admission::AdmissionPool;
use super::progress::{self, ProgressUpdate};

/// Fatal configuration problem, reported before any work starts.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Resolved inputs for one batch run.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Number of items to download (indices 1..=count).
    pub count: u32,
    /// Maximum number of downloads in flight.
    pub parallelism: usize,
    /// Directory receiving one file per successful item.
    pub output_dir: PathBuf,
    /// URL fetched for every item.
    pub source_url: String,
    /// Output extension override; derived from the URL when unset.
    pub file_ext: Option<String>,
}

impl BatchRequest {
    /// Rejects requests that must not start any work.
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.count == 0 {
            return Err(BatchError::InvalidConfig(
                "count must be at least 1".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(BatchError::InvalidConfig(
                "parallelism must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.source_url)
            .map_err(|e| BatchError::InvalidConfig(format!("source url: {}", e)))?;
        Ok(())
    }

    fn destination_for(&self, index: u32) -> PathBuf {
        dest::destination_for(
            &self.output_dir,
            index,
            &self.source_url,
            self.file_ext.as_deref(),
        )
    }
}

/// Terminal result of one spawned unit.
#[derive(Debug)]
pub struct ItemOutcome {
    pub index: u32,
    pub result: Result<u64, FetchError>,
}

/// Aggregate result of one batch run.
#[derive(Debug)]
pub struct BatchSummary {
    pub total: u32,
    /// Units actually spawned; equals `total` unless cancellation stopped admission.
    pub spawned: u32,
    pub succeeded: u32,
    /// Non-cancellation per-item failures, by index.
    pub failures: Vec<(u32, FetchError)>,
    /// True when a component observed the cancellation flag.
    pub cancelled: bool,
}

impl BatchSummary {
    pub fn fully_succeeded(&self) -> bool {
        !self.cancelled && self.failures.is_empty() && self.succeeded == self.total
    }

    pub fn first_failure(&self) -> Option<&(u32, FetchError)> {
        self.failures.first()
    }
}

/// Runs one batch to completion: generate, admit, spawn, drain.
///
/// Returns `Err` only for configuration problems found before any work
/// starts; per-item failures and cancellation are reported in the summary.
pub async fn run_batch(
    req: &BatchRequest,
    cfg: &PardlConfig,
    fetcher: Arc<dyn Fetcher>,
    progress_tx: Option<Sender<ProgressUpdate>>,
    cancel: CancelFlag,
) -> Result<BatchSummary, BatchError> {
    req.validate()?;

    let pool = AdmissionPool::new(req.parallelism);
    let stagger = Duration::from_millis(cfg.stagger_ms);
    let completed = Arc::new(Mutex::new(0u32));
    let mut units: JoinSet<ItemOutcome> = JoinSet::new();
    let mut spawned = 0u32;
    let mut admission_cancelled = false;

    for index in 1..=req.count {
        let slot = match pool.acquire(&cancel).await {
            Ok(slot) => slot,
            Err(_) => {
                tracing::info!(index, "cancellation observed; no further items admitted");
                admission_cancelled = true;
                break;
            }
        };

        let item = WorkItem {
            index,
            url: req.source_url.clone(),
            dest: req.destination_for(index),
        };
        let fetcher = Arc::clone(&fetcher);
        let cancel = cancel.clone();
        let completed = Arc::clone(&completed);
        let progress_tx = progress_tx.clone();
        let (total, parallelism) = (req.count, req.parallelism);

        units.spawn(async move {
            // The slot lives for the unit's whole lifetime and returns to
            // the pool on every exit path.
            let _slot = slot;

            let fetch_item = item.clone();
            let fetch_cancel = cancel.clone();
            let joined =
                tokio::task::spawn_blocking(move || fetcher.fetch(&fetch_item, &fetch_cancel))
                    .await;
            let result = match joined {
                Ok(result) => result,
                Err(join_err) => Err(FetchError::Storage(io::Error::new(
                    io::ErrorKind::Other,
                    format!("fetch task failed: {}", join_err),
                ))),
            };

            match &result {
                Ok(bytes) => {
                    // Bump and report under one lock so updates leave in
                    // completion order.
                    let mut done = completed.lock().unwrap();
                    *done += 1;
                    tracing::debug!(index = item.index, bytes = *bytes, "item downloaded");
                    if let Some(tx) = &progress_tx {
                        progress::send_nonblocking(
                            tx,
                            ProgressUpdate {
                                total,
                                parallelism,
                                completed: *done,
                            },
                        );
                    }
                }
                Err(FetchError::Cancelled) => {
                    tracing::debug!(index = item.index, "item cancelled");
                }
                Err(err) => {
                    tracing::warn!(index = item.index, "item failed: {}", err);
                }
            }

            ItemOutcome {
                index: item.index,
                result,
            }
        });
        spawned += 1;

        // Fixed stagger between submissions; bounds the issue rate
        // independent of the pool capacity.
        tokio::time::sleep(stagger).await;
    }

    // Drain: every spawned unit reaches a terminal status before we return,
    // cancelled or not. Units never spawned are never waited for.
    let mut succeeded = 0u32;
    let mut failures: Vec<(u32, FetchError)> = Vec::new();
    let mut unit_cancelled = false;
    while let Some(joined) = units.join_next().await {
        match joined {
            Ok(ItemOutcome { result: Ok(_), .. }) => succeeded += 1,
            Ok(ItemOutcome {
                result: Err(FetchError::Cancelled),
                ..
            }) => unit_cancelled = true,
            Ok(ItemOutcome {
                index,
                result: Err(err),
            }) => failures.push((index, err)),
            Err(join_err) => tracing::error!("download unit join: {}", join_err),
        }
    }
    failures.sort_by_key(|(index, _)| *index);

    Ok(BatchSummary {
        total: req.count,
        spawned,
        succeeded,
        failures,
        cancelled: admission_cancelled || unit_cancelled,
    })
}
