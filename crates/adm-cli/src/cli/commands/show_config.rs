//! `adm config` – print the effective configuration.

use adm_core::config::AdmConfig;
use anyhow::Result;
use std::path::Path;

pub fn run_show_config(cfg: &AdmConfig, source: &Path) -> Result<()> {
    println!("# {}", source.display());
    print!("{}", toml_string(cfg)?);
    Ok(())
}

fn toml_string(cfg: &AdmConfig) -> Result<String> {
    // Fill in the optional sections so the output shows every knob.
    let mut shown = cfg.clone();
    shown.fetch = Some(cfg.fetch_config());
    Ok(toml::to_string_pretty(&shown)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_fetch_defaults() {
        let out = toml_string(&AdmConfig::default()).unwrap();
        assert!(out.contains("max_active_tasks = 3"));
        assert!(out.contains("[fetch]"));
        assert!(out.contains("timeout_secs = 30"));
    }
}
