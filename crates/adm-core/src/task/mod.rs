//! Tasks: identifiers, the per-task state machine, URL admission rules and
//! the registry that owns every task.

pub mod id;
mod policy;
mod registry;
mod state;

pub use id::{IdGenerator, OsRandomIds, TaskId};
pub use policy::UrlPolicy;
pub use registry::TaskRegistry;
pub use state::{BuildJob, Task, TaskStatus, TaskView};
