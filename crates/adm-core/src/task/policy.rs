//! Which URLs a task accepts and how many.

use crate::config::AdmConfig;

/// URL admission rules applied when URLs are added to a task.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    max_files: usize,
    allowed_extensions: Vec<String>,
}

impl UrlPolicy {
    /// Empty suffixes are ignored: they would match every URL.
    pub fn new(max_files: usize, allowed_extensions: Vec<String>) -> Self {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .filter(|ext| {
                if ext.is_empty() {
                    tracing::warn!("ignoring empty entry in allowed_extensions");
                }
                !ext.is_empty()
            })
            .collect();
        Self {
            max_files,
            allowed_extensions,
        }
    }

    pub fn from_config(cfg: &AdmConfig) -> Self {
        Self::new(cfg.max_files_per_task, cfg.allowed_extensions.clone())
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    /// Case-sensitive suffix match on the raw URL string.
    pub fn allows(&self, url: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|ext| url.ends_with(ext.as_str()))
    }
}
