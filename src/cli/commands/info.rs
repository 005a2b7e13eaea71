use anyhow::Result;

use crate::cli::Output;
use crate::config::ParallelConfig;
use crate::{PKG_NAME, VERSION};

pub fn execute(config: &ParallelConfig, threads: Option<usize>, output: &Output) -> Result<()> {
    let workers = threads.unwrap_or_else(|| config.optimal_workers());

    output.header(&format!("{PKG_NAME} v{VERSION}"));
    output.key_value("Logical cores:", &num_cpus::get().to_string(), false);
    output.key_value("Physical cores:", &num_cpus::get_physical().to_string(), false);
    output.key_value("Workers:", &workers.to_string(), true);
    output.key_value("Min chunk size:", &config.min_chunk_size.to_string(), false);
    output.key_value("Chunks per worker:", &config.chunks_per_worker.to_string(), false);
    output.key_value("Target:", std::env::consts::ARCH, false);
    output.key_value(
        "Profile:",
        if cfg!(debug_assertions) { "debug" } else { "release" },
        false,
    );
    Ok(())
}
