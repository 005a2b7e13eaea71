use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::{Deserialize, Serialize};

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

/// Why a configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        ConfigError::Extract(Box::new(error))
    }
}

/// Tuning for the default pool and for policies without explicit chunking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Maximum number of worker threads (0 = no limit)
    pub max_threads: usize,
    /// Percentage of CPU cores to use (1-100)
    pub thread_percentage: u8,
    /// Minimum elements per chunk
    pub min_chunk_size: usize,
    /// Chunks requested per unit of parallelism
    pub chunks_per_worker: usize,
    pub thread_name_prefix: String,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            thread_percentage: 75,
            min_chunk_size: 1024,
            chunks_per_worker: 4,
            thread_name_prefix: "parex-worker".to_string(),
        }
    }
}

impl ParallelConfig {
    /// Defaults, then user config, then working-directory config, then `PAREX_*`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_custom_config(None)
    }

    /// Like [`load`](Self::load), but an explicit file replaces the user and
    /// working-directory layers
    pub fn load_with_custom_config(custom_config: Option<&Path>) -> Result<Self, ConfigError> {
        let config: ParallelConfig = Self::figment(custom_config).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// The merged provider stack, before extraction
    pub fn figment(custom_config: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(ParallelConfig::default()))
            .merge(Toml::string(DEFAULT_CONFIG));

        if let Some(custom_path) = custom_config {
            figment = match custom_path.extension().and_then(|ext| ext.to_str()) {
                Some("json") => figment.merge(Json::file(custom_path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(custom_path)),
                _ => figment.merge(Toml::file(custom_path)),
            };
        } else {
            let user = Self::user_config_path();
            figment = figment
                .merge(Toml::file(&user))
                .merge(Json::file(user.with_extension("json")))
                .merge(Yaml::file(user.with_extension("yaml")))
                .merge(Toml::file("parex.toml"))
                .merge(Json::file("parex.json"))
                .merge(Yaml::file("parex.yaml"))
                .merge(Yaml::file("parex.yml"));
        }

        // Environment variables always have highest priority
        figment.merge(Env::prefixed("PAREX_"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.thread_percentage) {
            return Err(ConfigError::Invalid(format!(
                "thread_percentage must be between 1 and 100, got {}",
                self.thread_percentage
            )));
        }
        if self.min_chunk_size == 0 {
            return Err(ConfigError::Invalid("min_chunk_size must be at least 1".into()));
        }
        if self.chunks_per_worker == 0 {
            return Err(ConfigError::Invalid("chunks_per_worker must be at least 1".into()));
        }
        Ok(())
    }

    /// Worker threads for the default pool
    pub fn optimal_workers(&self) -> usize {
        Self::workers_for(num_cpus::get(), self.thread_percentage, self.max_threads)
    }

    fn workers_for(cpu_cores: usize, thread_percentage: u8, max_threads: usize) -> usize {
        // Apply thread percentage from config
        let max_by_percentage = std::cmp::max(1, (cpu_cores * thread_percentage as usize) / 100);

        // Apply max_threads limit if specified (0 means use percentage calculation)
        if max_threads > 0 {
            std::cmp::min(max_threads, max_by_percentage)
        } else {
            max_by_percentage
        }
    }

    fn user_config_path() -> PathBuf {
        match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home).join(".config/parex/config.toml"),
            Err(_) => PathBuf::from("~/.config/parex/config.toml"),
        }
    }
}
