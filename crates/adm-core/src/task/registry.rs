//! Registry of all tasks by id.
//!
//! The map lock is held only for lookups and inserts; task fields are guarded
//! by each task's own lock, which is never taken while the map lock is held.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::admission::AdmissionGate;
use crate::error::TaskError;

use super::{BuildJob, IdGenerator, OsRandomIds, Task, TaskId, TaskStatus, UrlPolicy};

pub struct TaskRegistry {
    tasks: RwLock<HashMap<TaskId, Arc<Task>>>,
    gate: Arc<AdmissionGate>,
    ids: Box<dyn IdGenerator>,
    policy: UrlPolicy,
}

impl TaskRegistry {
    pub fn new(gate: Arc<AdmissionGate>, policy: UrlPolicy) -> Self {
        Self::with_id_generator(gate, policy, Box::new(OsRandomIds))
    }

    pub fn with_id_generator(
        gate: Arc<AdmissionGate>,
        policy: UrlPolicy,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            gate,
            ids,
            policy,
        }
    }

    pub fn gate(&self) -> &Arc<AdmissionGate> {
        &self.gate
    }

    /// Admit and register a new task in `created`.
    ///
    /// Returns `Busy` without registering anything when the gate is full. If
    /// no identifier can be generated the slot is given back.
    pub fn create_task(&self) -> Result<Arc<Task>, TaskError> {
        let Some(permit) = self.gate.try_admit() else {
            tracing::debug!(in_use = self.gate.in_use(), "task rejected: admission gate full");
            return Err(TaskError::Busy);
        };

        loop {
            let id = self.ids.generate().map_err(TaskError::EntropyUnavailable)?;
            let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
            if let Entry::Vacant(slot) = tasks.entry(id) {
                let task = Arc::new(Task::new(slot.key().clone(), permit));
                slot.insert(Arc::clone(&task));
                tracing::info!(task = %task.id(), "task created");
                return Ok(task);
            }
        }
    }

    pub fn get_task(&self, id: &str) -> Result<Arc<Task>, TaskError> {
        self.tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
            .ok_or_else(|| TaskError::NotFound(TaskId::new(id)))
    }

    /// Add candidate URLs to a `created` task. Disallowed suffixes are
    /// dropped silently and anything past the per-task maximum is ignored.
    /// Returns how many URLs were accepted.
    pub fn add_urls(&self, id: &str, candidates: &[String]) -> Result<usize, TaskError> {
        let task = self.get_task(id)?;
        let accepted = task.add_urls(candidates, &self.policy)?;
        tracing::debug!(
            task = %task.id(),
            accepted,
            offered = candidates.len(),
            "urls added"
        );
        Ok(accepted)
    }

    /// Add URLs to a `created` task and freeze it for building, atomically
    /// with respect to other submissions on the same task.
    pub fn submit(&self, id: &str, candidates: &[String]) -> Result<BuildJob, TaskError> {
        let task = self.get_task(id)?;
        let (accepted, job) = task.submit(candidates, &self.policy)?;
        tracing::debug!(
            task = %task.id(),
            accepted,
            offered = candidates.len(),
            "urls submitted, task frozen"
        );
        Ok(job)
    }

    /// Tasks still in `created` after `max_idle`.
    pub fn idle_tasks(&self, max_idle: Duration) -> Vec<Arc<Task>> {
        let all: Vec<Arc<Task>> = self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        all.into_iter()
            .filter(|t| t.created_at().elapsed() >= max_idle && t.status() == TaskStatus::Created)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tasks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
