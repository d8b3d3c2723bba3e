//! Admission gate bounding the number of tasks in flight.
//!
//! A slot is taken when a task is created and given back once its build
//! concludes. Admission never waits: a full gate answers "busy" immediately.

mod permit;

pub use permit::AdmissionPermit;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Bounded counter of admitted tasks.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    in_use: AtomicUsize,
}

impl AdmissionGate {
    /// Create a gate admitting at most `capacity` tasks at once (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            in_use: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Free slots (capacity - in_use).
    pub fn available(&self) -> usize {
        self.capacity.saturating_sub(self.in_use())
    }

    /// Take one slot if any is free. Never blocks.
    /// Each `true` must be matched by exactly one `release`.
    pub fn try_acquire(&self) -> bool {
        let mut current = self.in_use.load(Ordering::Relaxed);
        loop {
            if current >= self.capacity {
                return false;
            }
            match self.in_use.compare_exchange_weak(
                current,
                current + 1,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Give back one slot taken by `try_acquire`.
    pub fn release(&self) {
        let prev = self
            .in_use
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |n| n.checked_sub(1));
        debug_assert!(prev.is_ok(), "admission gate released more often than acquired");
        if prev.is_err() {
            tracing::error!("admission gate released with no slot held");
        }
    }

    /// Take one slot as a permit that gives it back when dropped.
    pub fn try_admit(self: &Arc<Self>) -> Option<AdmissionPermit> {
        if self.try_acquire() {
            Some(AdmissionPermit::new(Arc::clone(self)))
        } else {
            None
        }
    }
}
