//! Configuration for the default pool and chunking
//!
//! Layered with figment, lowest priority first:
//! 1. embedded `default-config.toml`
//! 2. `~/.config/parex/config.toml` (or `.json` / `.yaml`)
//! 3. `parex.toml` / `parex.json` / `parex.yaml` in the working directory
//! 4. `PAREX_*` environment variables
//!
//! An explicit file (`--config`) replaces layers 2 and 3.

pub mod core;

use std::sync::LazyLock;

pub use self::core::{ConfigError, ParallelConfig};

static GLOBAL: LazyLock<ParallelConfig> = LazyLock::new(|| match ParallelConfig::load() {
    Ok(config) => config,
    Err(e) => {
        tracing::warn!("using built-in configuration: {}", e);
        ParallelConfig::default()
    }
});

/// Process-wide configuration, loaded on first use
pub fn global() -> &'static ParallelConfig {
    &GLOBAL
}
