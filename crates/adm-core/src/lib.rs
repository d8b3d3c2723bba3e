//! ADM core: admits archive-build tasks, tracks them through their lifecycle
//! and bundles the fetched files of each task into one zip.

pub mod config;
pub mod logging;

pub mod admission;
pub mod archive;
pub mod builder;
pub mod error;
pub mod fetch;
pub mod service;
pub mod task;
pub mod url_model;

pub use error::TaskError;
pub use service::ArchiveService;
