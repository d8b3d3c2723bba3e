//! Per-task state machine.
//!
//! `created -> processing -> done | failed`. Every field lives behind one
//! mutex so a reader never sees a torn combination (e.g. `done` without an
//! archive path).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use crate::admission::AdmissionPermit;
use crate::error::TaskError;

use super::{TaskId, UrlPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Created,
    Processing,
    Done,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Processing => "processing",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consistent snapshot of a task, as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskView {
    pub id: TaskId,
    pub status: TaskStatus,
    pub urls: Vec<String>,
    pub errors: Vec<String>,
    /// Only present once the task is `done`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<PathBuf>,
}

#[derive(Debug)]
struct TaskInner {
    status: TaskStatus,
    urls: Vec<String>,
    errors: Vec<String>,
    artifact_path: Option<PathBuf>,
    permit: Option<AdmissionPermit>,
}

/// One archive-build job.
#[derive(Debug)]
pub struct Task {
    id: TaskId,
    created_at: Instant,
    inner: Mutex<TaskInner>,
}

/// A task frozen for building: its URL list and the admission permit the
/// build gives back when it drops this value.
#[derive(Debug)]
pub struct BuildJob {
    pub task: Arc<Task>,
    pub urls: Vec<String>,
    permit: Option<AdmissionPermit>,
}

impl BuildJob {
    /// Give the admission slot back now instead of at drop.
    pub fn release_permit(&mut self) {
        self.permit.take();
    }
}

impl Task {
    pub(crate) fn new(id: TaskId, permit: AdmissionPermit) -> Self {
        Self {
            id,
            created_at: Instant::now(),
            inner: Mutex::new(TaskInner {
                status: TaskStatus::Created,
                urls: Vec::new(),
                errors: Vec::new(),
                artifact_path: None,
                permit: Some(permit),
            }),
        }
    }

    // A poisoned lock only means a builder panicked mid-update; the fields
    // are still individually valid.
    fn lock(&self) -> MutexGuard<'_, TaskInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn status(&self) -> TaskStatus {
        self.lock().status
    }

    /// Container path, recorded once the task is terminal and the container
    /// was opened (also for `failed` tasks with an empty archive).
    pub fn artifact_path(&self) -> Option<PathBuf> {
        self.lock().artifact_path.clone()
    }

    pub fn view(&self) -> TaskView {
        let inner = self.lock();
        TaskView {
            id: self.id.clone(),
            status: inner.status,
            urls: inner.urls.clone(),
            errors: inner.errors.clone(),
            artifact_path: match inner.status {
                TaskStatus::Done => inner.artifact_path.clone(),
                _ => None,
            },
        }
    }

    /// Append the URLs `policy` accepts, in order, until the task is full.
    /// Returns how many were accepted.
    pub(crate) fn add_urls(
        &self,
        candidates: &[String],
        policy: &UrlPolicy,
    ) -> Result<usize, TaskError> {
        let mut inner = self.lock();
        self.ensure_created(&inner)?;
        Ok(self.push_accepted(&mut inner, candidates, policy))
    }

    /// `created -> processing`: freezes the URL list and hands it, with the
    /// admission permit, to the builder. Fails if the task already left `created`.
    pub(crate) fn begin_processing(self: &Arc<Self>) -> Result<BuildJob, TaskError> {
        let mut inner = self.lock();
        self.ensure_created(&inner)?;
        Ok(self.freeze(&mut inner))
    }

    /// Add URLs and freeze in one step. A submission that finds the task
    /// already frozen leaves it untouched.
    pub(crate) fn submit(
        self: &Arc<Self>,
        candidates: &[String],
        policy: &UrlPolicy,
    ) -> Result<(usize, BuildJob), TaskError> {
        let mut inner = self.lock();
        self.ensure_created(&inner)?;
        let accepted = self.push_accepted(&mut inner, candidates, policy);
        Ok((accepted, self.freeze(&mut inner)))
    }

    fn ensure_created(&self, inner: &TaskInner) -> Result<(), TaskError> {
        if inner.status != TaskStatus::Created {
            return Err(TaskError::InvalidState {
                id: self.id.clone(),
                status: inner.status,
            });
        }
        Ok(())
    }

    fn push_accepted(
        &self,
        inner: &mut TaskInner,
        candidates: &[String],
        policy: &UrlPolicy,
    ) -> usize {
        let mut accepted = 0;
        for url in candidates {
            if inner.urls.len() >= policy.max_files() {
                break;
            }
            if policy.allows(url) {
                inner.urls.push(url.clone());
                accepted += 1;
            } else {
                tracing::debug!(task = %self.id, url = %url, "dropping url with disallowed suffix");
            }
        }
        accepted
    }

    fn freeze(self: &Arc<Self>, inner: &mut TaskInner) -> BuildJob {
        inner.status = TaskStatus::Processing;
        BuildJob {
            task: Arc::clone(self),
            urls: inner.urls.clone(),
            permit: inner.permit.take(),
        }
    }

    pub(crate) fn record_error(&self, message: String) {
        let mut inner = self.lock();
        debug_assert_eq!(inner.status, TaskStatus::Processing);
        inner.errors.push(message);
    }

    /// `processing -> done | failed`. The status and the archive path change
    /// under one lock acquisition.
    pub(crate) fn finish(&self, status: TaskStatus, artifact_path: Option<&Path>) {
        debug_assert!(status.is_terminal());
        let mut inner = self.lock();
        if inner.status != TaskStatus::Processing {
            tracing::error!(
                task = %self.id,
                status = %inner.status,
                "finish on task not processing"
            );
            return;
        }
        inner.status = status;
        inner.artifact_path = artifact_path.map(Path::to_path_buf);
    }
}
