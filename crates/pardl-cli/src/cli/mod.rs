//! CLI for the pardl batch downloader.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use pardl_core::config;
use pardl_core::control::CancelFlag;
use pardl_core::fetcher::{Fetcher, HttpFetcher};
use pardl_core::scheduler::{self, BatchRequest, BatchSummary, ProgressUpdate};

/// Bounded-parallel batch downloader: fetch N copies of a source URL into
/// numbered output files, at most P at a time.
#[derive(Debug, Parser)]
#[command(name = "pardl")]
#[command(about = "pardl: bounded-parallel batch downloader", long_about = None)]
pub struct Cli {
    /// Number of resources to download.
    pub count: u32,

    /// Maximum downloads in flight at once (defaults from config.toml).
    #[arg(short, long, value_name = "N")]
    pub parallelism: Option<usize>,

    /// Directory receiving one file per item; created if missing.
    #[arg(short, long, default_value = "outputs")]
    pub output: PathBuf,

    /// Source URL fetched for every item (defaults from config.toml).
    #[arg(long)]
    pub url: Option<String>,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        Cli::parse().run().await
    }

    async fn run(self) -> Result<()> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let request = BatchRequest {
            count: self.count,
            parallelism: self.parallelism.unwrap_or(cfg.parallelism),
            output_dir: self.output,
            source_url: self.url.unwrap_or_else(|| cfg.source_url.clone()),
            file_ext: cfg.file_extension.clone(),
        };

        let cancel = CancelFlag::new();
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received; cancelling batch");
                interrupt.cancel();
            }
        });

        let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel::<ProgressUpdate>(16);
        let printer = tokio::spawn(async move {
            while let Some(update) = progress_rx.recv().await {
                println!(
                    "[{}/{}] downloaded ({} parallel at most)",
                    update.completed, update.total, update.parallelism
                );
            }
        });

        let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::from_config(&cfg));
        let summary =
            scheduler::run_batch(&request, &cfg, fetcher, Some(progress_tx), cancel).await?;
        let _ = printer.await;

        report(&summary);
        Ok(())
    }
}

/// One summary line per terminal condition. Cancellation wins over per-item
/// failures; per-item failures never turn into a process error.
fn report(summary: &BatchSummary) {
    if summary.cancelled {
        println!(
            "Cancelled by user: {} of {} downloaded.",
            summary.succeeded, summary.total
        );
    } else if let Some((index, err)) = summary.first_failure() {
        println!(
            "Downloaded {} of {}; item {} failed: {}",
            summary.succeeded, summary.total, index, err
        );
    } else {
        println!("Downloaded {} file(s).", summary.succeeded);
    }
}

#[cfg(test)]
mod tests;
