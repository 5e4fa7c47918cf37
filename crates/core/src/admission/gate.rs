//! Semaphore backed admission gate.

use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

use super::error::AdmissionError;

/// Upper bound for the gate capacity.
pub const MAX_CAPACITY: usize = 100;

/// Bounded pool of download slots.
///
/// Waiters are served in FIFO order by the underlying semaphore.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    semaphore: Option<Arc<Semaphore>>,
}

/// An occupied slot. The slot is released when this value is dropped.
#[derive(Debug)]
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct AdmissionPermit {
    _permit: Option<OwnedSemaphorePermit>,
}

impl AdmissionGate {
    /// Creates a gate with the given number of slots.
    ///
    /// Capacity is clamped to [`MAX_CAPACITY`]. A capacity of `0` creates a
    /// gate that never blocks.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_CAPACITY);

        Self {
            capacity,
            semaphore: (capacity > 0).then(|| Arc::new(Semaphore::new(capacity))),
        }
    }

    /// Creates a gate that admits everyone immediately.
    pub fn unlimited() -> Self {
        Self::new(0)
    }

    /// Configured number of slots (`0` means unlimited).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether this gate limits concurrency at all.
    pub fn is_limited(&self) -> bool {
        self.semaphore.is_some()
    }

    /// Number of slots currently held.
    pub fn occupied(&self) -> usize {
        match &self.semaphore {
            Some(semaphore) => self.capacity - semaphore.available_permits(),
            None => 0,
        }
    }

    /// Waits for a free slot or for `cancel` to fire, whichever comes first.
    ///
    /// Cancellation is checked again after a slot is granted, so an already
    /// cancelled caller never walks away holding a slot.
    pub async fn acquire(
        &self,
        cancel: &CancellationToken,
    ) -> Result<AdmissionPermit, AdmissionError> {
        let Some(semaphore) = &self.semaphore else {
            if cancel.is_cancelled() {
                return Err(AdmissionError::Cancelled);
            }

            return Ok(AdmissionPermit { _permit: None });
        };

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AdmissionError::Cancelled),
            permit = Arc::clone(semaphore).acquire_owned() => {
                permit.map_err(|_| AdmissionError::Closed)?
            }
        };

        if cancel.is_cancelled() {
            drop(permit);
            return Err(AdmissionError::Cancelled);
        }

        Ok(AdmissionPermit {
            _permit: Some(permit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, assert_ready_err, assert_ready_ok, task};

    #[test]
    fn test_capacity_is_clamped() {
        assert_eq!(AdmissionGate::new(500).capacity(), MAX_CAPACITY);
        assert_eq!(AdmissionGate::new(7).capacity(), 7);
        assert!(!AdmissionGate::unlimited().is_limited());
    }

    #[test]
    fn test_n_slots_then_blocks() {
        let gate = AdmissionGate::new(2);
        let token = CancellationToken::new();

        let mut first = task::spawn(gate.acquire(&token));
        let first = assert_ready_ok!(first.poll());
        let mut second = task::spawn(gate.acquire(&token));
        let _second = assert_ready_ok!(second.poll());
        assert_eq!(gate.occupied(), 2);

        let mut third = task::spawn(gate.acquire(&token));
        assert_pending!(third.poll());

        drop(first);
        assert!(third.is_woken());
        let _third = assert_ready_ok!(third.poll());
        assert_eq!(gate.occupied(), 2);
    }

    #[test]
    fn test_unlimited_never_blocks() {
        let gate = AdmissionGate::unlimited();
        let token = CancellationToken::new();

        let mut permits = Vec::new();
        for _ in 0..1000 {
            let mut acquire = task::spawn(gate.acquire(&token));
            permits.push(assert_ready_ok!(acquire.poll()));
        }
        assert_eq!(gate.occupied(), 0);
    }

    #[test]
    fn test_cancelled_caller_gets_no_slot() {
        let gate = AdmissionGate::new(1);
        let token = CancellationToken::new();
        token.cancel();

        let mut acquire = task::spawn(gate.acquire(&token));
        let result = assert_ready!(acquire.poll());
        assert_eq!(result.unwrap_err(), AdmissionError::Cancelled);
        assert_eq!(gate.occupied(), 0);

        let unlimited = AdmissionGate::unlimited();
        let mut acquire = task::spawn(unlimited.acquire(&token));
        assert_ready_err!(acquire.poll());
    }

    #[tokio::test]
    async fn test_cancel_unblocks_waiter() {
        let gate = Arc::new(AdmissionGate::new(1));
        let token = CancellationToken::new();
        let _held = gate.acquire(&token).await.unwrap();

        let waiter_token = token.child_token();
        let waiter = {
            let gate = Arc::clone(&gate);
            let waiter_token = waiter_token.clone();
            tokio::spawn(async move { gate.acquire(&waiter_token).await.map(|_| ()) })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        waiter_token.cancel();
        let result = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish promptly")
            .unwrap();

        assert_eq!(result, Err(AdmissionError::Cancelled));
        assert_eq!(gate.occupied(), 1);
    }
}
