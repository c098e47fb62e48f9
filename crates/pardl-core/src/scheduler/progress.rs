//! Per-completion progress reporting.
//!
//! Consumers receive one update per successfully completed item over a
//! bounded channel; a slow or gone consumer never blocks the download path.

use tokio::sync::mpsc::Sender;

/// Snapshot delivered once per successfully completed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Batch size N.
    pub total: u32,
    /// Configured parallelism limit P.
    pub parallelism: usize,
    /// Cumulative successes, including the item this update reports.
    pub completed: u32,
}

/// Delivers `update` without ever blocking the reporting unit. A full or
/// closed channel drops the update and logs it; the item still counts as
/// succeeded.
pub(crate) fn send_nonblocking(tx: &Sender<ProgressUpdate>, update: ProgressUpdate) {
    if let Err(err) = tx.try_send(update) {
        tracing::warn!(completed = update.completed, "progress update dropped: {}", err);
    }
}
