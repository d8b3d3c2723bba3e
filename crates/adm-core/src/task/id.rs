//! Task identifiers.
//!
//! 16 bytes from the OS randomness source rendered as lowercase hex, which is
//! safe in URL paths and file names.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes per identifier (128 bits).
pub const ID_BYTES: usize = 16;

/// Opaque task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for TaskId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Source of task identifiers. Abstracted so tests can simulate a failing
/// randomness source.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Result<TaskId, rand::Error>;
}

/// Identifiers from the operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomIds;

impl IdGenerator for OsRandomIds {
    fn generate(&self) -> Result<TaskId, rand::Error> {
        let mut bytes = [0u8; ID_BYTES];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(TaskId(hex::encode(bytes)))
    }
}
