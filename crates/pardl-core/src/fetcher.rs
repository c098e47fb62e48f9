//! Per-item resource fetching: one HTTP GET streamed to one output file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use curl::easy::Easy;
use thiserror::Error;

use crate::config::PardlConfig;
use crate::control::CancelFlag;

/// One unit of work: fetch `url` and write the body to `dest`.
///
/// Owned by exactly one executing unit until it reaches a terminal result;
/// each item has a distinct destination path.
#[derive(Debug, Clone)]
pub struct WorkItem {
    /// 1-based position in the batch; also names the output file.
    pub index: u32,
    pub url: String,
    pub dest: PathBuf,
}

/// Error from a single fetch. Isolated to that item; siblings keep running.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The cancellation flag was observed before or during the transfer.
    #[error("cancelled")]
    Cancelled,
    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    Status { status: u32 },
    /// Transport-level failure: timeout, connection reset, DNS, TLS.
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    /// Local I/O failure while creating or writing the output file.
    #[error("storage: {0}")]
    Storage(#[from] io::Error),
}

/// A source of resource bytes. The scheduler only sees this trait; tests
/// substitute deterministic stubs for the HTTP implementation.
pub trait Fetcher: Send + Sync {
    /// Fetches one item to `item.dest`, returning the bytes written.
    /// Blocking; the scheduler runs it on a blocking thread.
    fn fetch(&self, item: &WorkItem, cancel: &CancelFlag) -> Result<u64, FetchError>;
}

/// HTTP fetcher backed by libcurl, streaming the response body straight to
/// disk without buffering the whole payload.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    connect_timeout: Duration,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            connect_timeout,
            timeout,
        }
    }

    pub fn from_config(cfg: &PardlConfig) -> Self {
        Self::new(
            Duration::from_secs(cfg.connect_timeout_secs),
            Duration::from_secs(cfg.fetch_timeout_secs),
        )
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, item: &WorkItem, cancel: &CancelFlag) -> Result<u64, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        if let Some(parent) = item.dest.parent() {
            // Idempotent and safe when several items race to create it.
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&item.dest)?;
        let mut written: u64 = 0;
        let mut write_error: Option<io::Error> = None;

        let mut easy = Easy::new();
        easy.url(&item.url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.fail_on_error(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(Duration::from_secs(60))?;
        easy.timeout(self.timeout)?;
        easy.progress(true)?;

        let performed = {
            let mut transfer = easy.transfer();
            let flag = cancel.clone();
            // curl calls this on a bounded interval even when no data flows;
            // returning false aborts the transfer.
            transfer.progress_function(move |_, _, _, _| !flag.is_cancelled())?;
            transfer.write_function(|data| {
                if let Err(e) = out.write_all(data) {
                    write_error = Some(e);
                    return Ok(0); // abort the transfer
                }
                written += data.len() as u64;
                Ok(data.len())
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if e.is_aborted_by_callback() && cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            if let Some(io_err) = write_error {
                return Err(FetchError::Storage(io_err));
            }
            if e.is_http_returned_error() {
                let status = easy.response_code().unwrap_or(0);
                return Err(FetchError::Status { status });
            }
            return Err(FetchError::Transport(e));
        }

        let status = easy.response_code()?;
        if !(200..300).contains(&status) {
            return Err(FetchError::Status { status });
        }
        Ok(written)
    }
}
