//! CLI command handlers, one per file.

mod bundle;
mod serve;
mod show_config;

pub use bundle::run_bundle;
pub use serve::run_serve;
pub use show_config::run_show_config;
