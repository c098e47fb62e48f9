//! Batch scheduler.
//!
//! Drives one batch: items 1..=N are admitted through a fixed-capacity pool,
//! fetched concurrently, and drained to a summary. Progress is reported once
//! per completed item; cancellation stops admission and lets in-flight items
//! reach their own terminal status.

mod admission;
mod progress;
mod run;


pub use admission::{AdmissionPool, AdmissionSlot};
pub use progress::ProgressUpdate;
pub use run::{run_batch, BatchError, BatchRequest, BatchSummary, ItemOutcome};
