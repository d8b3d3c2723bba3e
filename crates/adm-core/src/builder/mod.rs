//! Archive builder: runs the fetch → pack pipeline for one task and moves it
//! to its terminal state.
//!
//! URLs are processed once, in order, on the calling thread. Per-URL failures
//! are appended to the task's errors as they happen and never stop the run.
//! The task's admission permit is released when the run returns, whatever
//! the outcome.

mod stage;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::archive::{self, Container, ContainerWriter};
use crate::fetch::Fetch;
use crate::task::{BuildJob, TaskStatus};

/// Summary of one build, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub status: TaskStatus,
    /// Members written to the container.
    pub members: usize,
    /// Entries appended to the task's errors by this build.
    pub failures: usize,
    pub artifact_path: Option<PathBuf>,
}

#[derive(Clone)]
pub struct ArchiveBuilder {
    archive_dir: PathBuf,
    fetcher: Arc<dyn Fetch>,
}

impl ArchiveBuilder {
    pub fn new(archive_dir: impl Into<PathBuf>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            archive_dir: archive_dir.into(),
            fetcher,
        }
    }

    /// Build the archive for a frozen task. Blocking: network and disk I/O run
    /// on the current thread.
    pub fn run(&self, mut job: BuildJob) -> BuildOutcome {
        let path = archive::archive_path(&self.archive_dir, job.task.id().as_str());
        tracing::info!(task = %job.task.id(), urls = job.urls.len(), "building archive");

        match self.open_container(&path) {
            Ok(writer) => self.pack_into(job, path, writer),
            Err(e) => {
                tracing::error!(
                    task = %job.task.id(),
                    path = %path.display(),
                    error = %e,
                    "archive creation failed"
                );
                job.task.record_error(format!("archive creation failed: {}", e));
                job.task.finish(TaskStatus::Failed, None);
                job.release_permit();
                BuildOutcome {
                    status: TaskStatus::Failed,
                    members: 0,
                    failures: 1,
                    artifact_path: None,
                }
            }
        }
    }

    /// Fetch every URL into an opened container, finalize it and settle the task.
    fn pack_into<C: Container>(
        &self,
        mut job: BuildJob,
        path: PathBuf,
        mut writer: C,
    ) -> BuildOutcome {
        let task = Arc::clone(&job.task);
        let fetcher = self.fetcher.as_ref();
        let members = job
            .urls
            .iter()
            .enumerate()
            .map(|(i, url)| stage::fetch(fetcher, i, url))
            .filter_map(|fetched| fetched.map_err(|msg| task.record_error(msg)).ok())
            .filter(|item| {
                stage::pack(&mut writer, item)
                    .map_err(|msg| task.record_error(msg))
                    .is_ok()
            })
            .count();
        // Each URL ends as a member or as exactly one error entry.
        let mut failures = job.urls.len() - members;

        let finalized = writer.finish().map_err(|e| {
            tracing::error!(task = %task.id(), error = %e, "archive finalize failed");
            failures += 1;
            task.record_error(format!("archive error: finalize {} ({})", path.display(), e));
        });

        let status = if members > 0 && finalized.is_ok() {
            TaskStatus::Done
        } else {
            TaskStatus::Failed
        };
        task.finish(status, Some(&path));
        job.release_permit();

        tracing::info!(
            task = %task.id(),
            status = %status,
            members,
            failures,
            "archive build finished"
        );

        BuildOutcome {
            status,
            members,
            failures,
            artifact_path: Some(path),
        }
    }

    fn open_container(&self, path: &Path) -> std::io::Result<ContainerWriter> {
        fs::create_dir_all(&self.archive_dir)?;
        ContainerWriter::create(path)
    }
}
