//! `adm serve` – run the HTTP API until Ctrl-C.

use adm_core::config::AdmConfig;
use adm_core::ArchiveService;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use crate::cli::api;

pub async fn run_serve(cfg: AdmConfig) -> Result<()> {
    let service = Arc::new(ArchiveService::from_config(&cfg));

    if let Some(max_idle) = cfg.idle_task_timeout() {
        spawn_idle_reaper(Arc::clone(&service), max_idle);
    }

    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("bind {}", cfg.listen_addr))?;
    tracing::info!(
        address = %cfg.listen_addr,
        archive_dir = %cfg.archive_dir.display(),
        max_active_tasks = cfg.max_active_tasks,
        "API server listening"
    );

    let app = api::create_router(service);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("api server")?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Periodically builds tasks that sat in `created` past `max_idle`.
fn spawn_idle_reaper(service: Arc<ArchiveService>, max_idle: Duration) {
    let period = (max_idle / 4).max(Duration::from_secs(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let n = service.reap_idle(max_idle);
            if n > 0 {
                tracing::info!("dispatched {} idle task(s)", n);
            }
        }
    });
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("ctrl-c handler unavailable; serving until killed");
        std::future::pending::<()>().await;
    }
}
