//! Admission pool bounding how many downloads run at once.
//!
//! A fixed pool of P slots. `acquire` waits for a free slot but re-checks the
//! cancellation flag on a bounded interval, so a cancelled batch stops
//! admitting promptly instead of waiting for the next slot to free up.
//! Slots return to the pool on drop, on every exit path.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::control::{CancelFlag, Cancelled};

/// How long a waiting `acquire` sleeps on the slot queue before re-checking
/// the cancellation flag.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed-capacity admission pool. At most `capacity` slots are outstanding
/// at any instant.
#[derive(Debug)]
pub struct AdmissionPool {
    slots: Arc<Semaphore>,
    capacity: usize,
}

/// One admission slot. Returned to the pool exactly once, when dropped.
#[derive(Debug)]
pub struct AdmissionSlot {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionPool {
    /// Creates a pool with `capacity` slots. Clamped to at least 1; callers
    /// validate user input before building a pool.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently held.
    pub fn available(&self) -> usize {
        self.slots.available_permits()
    }

    /// Waits for a free slot. Fails with `Cancelled` instead of granting one
    /// when the flag is observed set, including while already waiting.
    pub async fn acquire(&self, cancel: &CancelFlag) -> Result<AdmissionSlot, Cancelled> {
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            let waited =
                tokio::time::timeout(CANCEL_POLL_INTERVAL, Arc::clone(&self.slots).acquire_owned())
                    .await;
            match waited {
                Ok(Ok(permit)) => return Ok(AdmissionSlot { _permit: permit }),
                // The pool is never closed; a closed semaphore can only mean
                // teardown, so treat it like cancellation.
                Ok(Err(_)) => return Err(Cancelled),
                Err(_) => continue, // poll interval elapsed; re-check the flag
            }
        }
    }
}
