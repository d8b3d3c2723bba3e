//! `adm bundle` – build one archive without the HTTP server.

use adm_core::config::AdmConfig;
use adm_core::task::TaskStatus;
use adm_core::ArchiveService;
use anyhow::{Context, Result};
use std::time::Duration;

const POLL_INTERVAL_MS: u64 = 100;

pub async fn run_bundle(cfg: AdmConfig, urls: &[String]) -> Result<()> {
    let service = ArchiveService::from_config(&cfg);
    let id = service.create_task().context("create task")?;

    let view = service
        .submit_urls(id.as_str(), urls)
        .context("submit urls")?;
    let dropped = urls.len() - view.urls.len();
    if dropped > 0 {
        tracing::info!(
            "{} url(s) not accepted (allowed suffixes: {:?}, max {} per task)",
            dropped,
            cfg.allowed_extensions,
            cfg.max_files_per_task
        );
    }

    let view = loop {
        let view = service.get_task_view(id.as_str())?;
        if view.status.is_terminal() {
            break view;
        }
        tokio::time::sleep(Duration::from_millis(POLL_INTERVAL_MS)).await;
    };

    println!("{}", serde_json::to_string_pretty(&view)?);
    if view.status == TaskStatus::Failed {
        anyhow::bail!("task {} failed with {} error(s)", view.id, view.errors.len());
    }
    Ok(())
}
