//! Archive container files.
//!
//! One zip per task, named `<task id>.zip`, under the archive directory.
//! Members are appended in order and the central directory is written on
//! `finish`.

mod writer;

pub use writer::{Container, ContainerWriter, PackError};

use std::path::{Path, PathBuf};

/// Container file extension.
pub const ARCHIVE_SUFFIX: &str = ".zip";

/// Path of the container for `task_id` under `archive_dir`.
pub fn archive_path(archive_dir: &Path, task_id: &str) -> PathBuf {
    archive_dir.join(format!("{}{}", task_id, ARCHIVE_SUFFIX))
}
