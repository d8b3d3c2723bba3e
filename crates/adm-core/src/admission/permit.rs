//! RAII permit that releases its admission slot when dropped.

use std::sync::Arc;

use super::AdmissionGate;

/// One admitted slot. Owned by a task until its build concludes; dropping it
/// is the only way the slot goes back, so it is released exactly once.
#[derive(Debug)]
pub struct AdmissionPermit {
    gate: Arc<AdmissionGate>,
}

impl AdmissionPermit {
    pub(super) fn new(gate: Arc<AdmissionGate>) -> Self {
        Self { gate }
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.gate.release();
    }
}
