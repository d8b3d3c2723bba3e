//! Task engine facade used by the front ends.
//!
//! Submitting URLs freezes the task and dispatches its build onto the tokio
//! blocking pool; the caller gets the `processing` view back immediately and
//! polls for the terminal state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::admission::AdmissionGate;
use crate::builder::{ArchiveBuilder, BuildOutcome};
use crate::config::AdmConfig;
use crate::error::TaskError;
use crate::fetch::{CurlFetcher, Fetch};
use crate::task::{BuildJob, TaskId, TaskRegistry, TaskStatus, TaskView, UrlPolicy};

pub struct ArchiveService {
    registry: TaskRegistry,
    builder: ArchiveBuilder,
}

impl ArchiveService {
    /// Service with the libcurl fetcher configured from `cfg`.
    pub fn from_config(cfg: &AdmConfig) -> Self {
        let fetcher: Arc<dyn Fetch> = Arc::new(CurlFetcher::new(&cfg.fetch_config()));
        Self::with_fetcher(cfg, fetcher)
    }

    pub fn with_fetcher(cfg: &AdmConfig, fetcher: Arc<dyn Fetch>) -> Self {
        let gate = Arc::new(AdmissionGate::new(cfg.max_active_tasks));
        Self {
            registry: TaskRegistry::new(gate, UrlPolicy::from_config(cfg)),
            builder: ArchiveBuilder::new(cfg.archive_dir.clone(), fetcher),
        }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn gate(&self) -> &AdmissionGate {
        self.registry.gate()
    }

    pub fn create_task(&self) -> Result<TaskId, TaskError> {
        self.registry.create_task().map(|t| t.id().clone())
    }

    /// Add URLs to a `created` task and start its build.
    ///
    /// Must be called within a tokio runtime. Of several concurrent
    /// submissions exactly one is applied; the others get `InvalidState` and
    /// contribute no URLs.
    pub fn submit_urls(&self, id: &str, urls: &[String]) -> Result<TaskView, TaskError> {
        let (view, _handle) = self.submit_urls_tracked(id, urls)?;
        Ok(view)
    }

    /// Like `submit_urls`, also returning the handle of the dispatched build.
    pub fn submit_urls_tracked(
        &self,
        id: &str,
        urls: &[String],
    ) -> Result<(TaskView, JoinHandle<BuildOutcome>), TaskError> {
        let job = self.registry.submit(id, urls)?;
        let task = Arc::clone(&job.task);
        let handle = self.dispatch(job);
        Ok((task.view(), handle))
    }

    pub fn get_task_view(&self, id: &str) -> Result<TaskView, TaskError> {
        Ok(self.registry.get_task(id)?.view())
    }

    /// Archive path of a `done` task.
    pub fn resolve_artifact_path(&self, id: &str) -> Result<PathBuf, TaskError> {
        let view = self.get_task_view(id)?;
        match (view.status, view.artifact_path) {
            (TaskStatus::Done, Some(path)) => Ok(path),
            (status, _) => Err(TaskError::NotReady { id: view.id, status }),
        }
    }

    /// Build every task left in `created` for at least `max_idle` with the
    /// URLs it has, so abandoned tasks give their admission slot back.
    /// Returns how many builds were dispatched.
    pub fn reap_idle(&self, max_idle: Duration) -> usize {
        let mut dispatched = 0;
        for task in self.registry.idle_tasks(max_idle) {
            // Lost races with a concurrent submission are fine: that build runs instead.
            if let Ok(job) = task.begin_processing() {
                tracing::info!(task = %task.id(), "building idle task");
                self.dispatch(job);
                dispatched += 1;
            }
        }
        dispatched
    }

    fn dispatch(&self, job: BuildJob) -> JoinHandle<BuildOutcome> {
        let builder = self.builder.clone();
        tokio::task::spawn_blocking(move || builder.run(job))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;

    struct EchoFetcher;

    impl Fetch for EchoFetcher {
        fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            if url.contains("unreachable") {
                Err(FetchError::Http(502))
            } else {
                Ok(url.as_bytes().to_vec())
            }
        }
    }

    fn service(dir: &std::path::Path) -> ArchiveService {
        let cfg = AdmConfig {
            archive_dir: dir.to_path_buf(),
            max_active_tasks: 2,
            ..AdmConfig::default()
        };
        ArchiveService::with_fetcher(&cfg, Arc::new(EchoFetcher))
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn submit_freezes_and_builds() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let id = svc.create_task().unwrap();

        let submitted = urls(&["http://h/a.pdf", "http://h/unreachable.pdf"]);
        let (view, handle) = svc.submit_urls_tracked(id.as_str(), &submitted).unwrap();
        assert_eq!(view.status, TaskStatus::Processing);
        assert_eq!(view.urls.len(), 2);

        let outcome = handle.await.unwrap();
        assert_eq!(outcome.status, TaskStatus::Done);

        let view = svc.get_task_view(id.as_str()).unwrap();
        assert_eq!(view.status, TaskStatus::Done);
        assert_eq!(view.errors.len(), 1);
        assert_eq!(svc.gate().in_use(), 0);
        assert_eq!(
            svc.resolve_artifact_path(id.as_str()).unwrap(),
            dir.path().join(format!("{}.zip", id))
        );
    }

    #[tokio::test]
    async fn late_submission_is_invalid_and_leaves_state() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let id = svc.create_task().unwrap();
        let (_, handle) = svc
            .submit_urls_tracked(id.as_str(), &urls(&["http://h/a.pdf"]))
            .unwrap();
        handle.await.unwrap();
        let before = svc.get_task_view(id.as_str()).unwrap();

        let err = svc
            .submit_urls(id.as_str(), &urls(&["http://h/b.pdf"]))
            .unwrap_err();
        assert!(matches!(err, TaskError::InvalidState { .. }));
        assert_eq!(svc.get_task_view(id.as_str()).unwrap(), before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn rejected_concurrent_submissions_add_no_urls() {
        let dir = tempfile::tempdir().unwrap();
        let svc = Arc::new(service(dir.path()));
        let rt = tokio::runtime::Handle::current();

        for round in 0..200 {
            let id = svc.create_task().unwrap();
            let barrier = Arc::new(std::sync::Barrier::new(4));
            let submitters: Vec<_> = ["a", "b", "c", "d"]
                .into_iter()
                .map(|name| {
                    let svc = Arc::clone(&svc);
                    let id = id.clone();
                    let barrier = Arc::clone(&barrier);
                    let rt = rt.clone();
                    std::thread::spawn(move || {
                        let _guard = rt.enter();
                        let url = format!("http://h/{name}.pdf");
                        barrier.wait();
                        let result = svc.submit_urls_tracked(id.as_str(), &[url.clone()]);
                        (url, result.map(|(_, handle)| handle))
                    })
                })
                .collect();

            let mut accepted = 0;
            let mut rejected = Vec::new();
            for submitter in submitters {
                let (url, result) = submitter.join().unwrap();
                match result {
                    Ok(handle) => {
                        accepted += 1;
                        handle.await.unwrap();
                    }
                    Err(TaskError::InvalidState { .. }) => rejected.push(url),
                    Err(e) => panic!("round {round}: unexpected error {e}"),
                }
            }

            assert_eq!(accepted, 1, "round {round}");
            let view = svc.get_task_view(id.as_str()).unwrap();
            assert_eq!(view.urls.len(), 1, "round {round}: {:?}", view.urls);
            for url in rejected {
                assert!(!view.urls.contains(&url), "round {round}: {url} in {:?}", view.urls);
            }
        }
        assert_eq!(svc.gate().in_use(), 0);
    }

    #[tokio::test]
    async fn artifact_not_ready_before_done() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let id = svc.create_task().unwrap();
        assert!(matches!(
            svc.resolve_artifact_path(id.as_str()),
            Err(TaskError::NotReady { status: TaskStatus::Created, .. })
        ));
        assert!(matches!(
            svc.resolve_artifact_path("unknown"),
            Err(TaskError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn failed_task_has_no_resolvable_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let id = svc.create_task().unwrap();
        let (_, handle) = svc
            .submit_urls_tracked(id.as_str(), &urls(&["http://h/unreachable.jpg"]))
            .unwrap();
        assert_eq!(handle.await.unwrap().status, TaskStatus::Failed);
        assert!(matches!(
            svc.resolve_artifact_path(id.as_str()),
            Err(TaskError::NotReady { status: TaskStatus::Failed, .. })
        ));
    }

    #[tokio::test]
    async fn reaping_idle_tasks_frees_slots() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        let a = svc.create_task().unwrap();
        svc.create_task().unwrap();
        assert!(matches!(svc.create_task(), Err(TaskError::Busy)));

        assert_eq!(svc.reap_idle(Duration::from_secs(3600)), 0);
        assert_eq!(svc.reap_idle(Duration::ZERO), 2);

        for _ in 0..100 {
            if svc.gate().in_use() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(svc.gate().in_use(), 0);
        assert_eq!(svc.get_task_view(a.as_str()).unwrap().status, TaskStatus::Failed);
        assert!(svc.create_task().is_ok());
    }
}
