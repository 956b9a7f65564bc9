/// TOML configuration with per-section defaults.
pub mod config;
/// Tracing subscriber setup.
pub mod logging;
