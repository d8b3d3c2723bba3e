use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Outbound fetch parameters (optional `[fetch]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total time allowed for one GET, including the body transfer.
    pub timeout_secs: u64,
    /// Time allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// Redirects followed before giving up.
    pub max_redirections: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 15,
            max_redirections: 10,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/adm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmConfig {
    /// Address the HTTP front end binds to.
    pub listen_addr: String,
    /// Maximum number of tasks holding an admission permit at once.
    pub max_active_tasks: usize,
    /// Maximum number of URLs stored per task; extra URLs are ignored.
    pub max_files_per_task: usize,
    /// URL suffixes accepted into a task (case-sensitive, e.g. ".pdf"). Empty
    /// entries are ignored.
    pub allowed_extensions: Vec<String>,
    /// Directory receiving one `<task id>.zip` per built task.
    pub archive_dir: PathBuf,
    /// Optional fetch tuning; if missing, built-in defaults are used.
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
    /// Tasks left in `created` longer than this are built with whatever URLs
    /// they hold, which releases their slot. None = never.
    #[serde(default)]
    pub idle_task_timeout_secs: Option<u64>,
}

impl Default for AdmConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            max_active_tasks: 3,
            max_files_per_task: 3,
            allowed_extensions: vec![".pdf".to_string(), ".jpeg".to_string(), ".jpg".to_string()],
            archive_dir: PathBuf::from("archives"),
            fetch: None,
            idle_task_timeout_secs: None,
        }
    }
}

impl AdmConfig {
    /// Fetch settings with defaults filled in.
    pub fn fetch_config(&self) -> FetchConfig {
        self.fetch.clone().unwrap_or_default()
    }

    pub fn idle_task_timeout(&self) -> Option<Duration> {
        self.idle_task_timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("adm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AdmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AdmConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<AdmConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: AdmConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AdmConfig::default();
        assert_eq!(cfg.max_active_tasks, 3);
        assert_eq!(cfg.max_files_per_task, 3);
        assert_eq!(cfg.allowed_extensions, vec![".pdf", ".jpeg", ".jpg"]);
        assert_eq!(cfg.archive_dir, PathBuf::from("archives"));
        assert_eq!(cfg.fetch_config().timeout(), Duration::from_secs(30));
        assert!(cfg.idle_task_timeout().is_none());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            listen_addr = "127.0.0.1:9000"
            max_active_tasks = 8
            max_files_per_task = 5
            allowed_extensions = [".png"]
            archive_dir = "/var/lib/adm"
        "#;
        let cfg: AdmConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9000");
        assert_eq!(cfg.max_active_tasks, 8);
        assert_eq!(cfg.max_files_per_task, 5);
        assert_eq!(cfg.allowed_extensions, vec![".png"]);
        assert_eq!(cfg.archive_dir, PathBuf::from("/var/lib/adm"));
        assert!(cfg.fetch.is_none());
        assert!(cfg.idle_task_timeout_secs.is_none());
    }

    #[test]
    fn config_toml_fetch_section_and_reaper() {
        let toml = r#"
            listen_addr = "127.0.0.1:9000"
            max_active_tasks = 2
            max_files_per_task = 3
            allowed_extensions = [".pdf"]
            archive_dir = "out"
            idle_task_timeout_secs = 600

            [fetch]
            timeout_secs = 5
            connect_timeout_secs = 2
            max_redirections = 3
        "#;
        let cfg: AdmConfig = toml::from_str(toml).unwrap();
        let fetch = cfg.fetch_config();
        assert_eq!(fetch.timeout(), Duration::from_secs(5));
        assert_eq!(fetch.connect_timeout(), Duration::from_secs(2));
        assert_eq!(fetch.max_redirections, 3);
        assert_eq!(cfg.idle_task_timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn load_from_path_reports_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "max_active_tasks = \"three\"").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid config"));
    }
}
