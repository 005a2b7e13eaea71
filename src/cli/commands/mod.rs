use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::Output;
use crate::config::ParallelConfig;
use crate::executor::{ExecutionContext, ThreadPoolSubstrate};
use crate::policy::{ChunkingParams, ExecutionPolicy, Launch, Mode};

pub mod compare;
pub mod config;
pub mod info;
pub mod transform;

#[derive(Parser)]
#[command(
    name = "parex",
    version = env!("CARGO_PKG_VERSION"),
    about = "Runs and verifies parallel bulk algorithms under every execution policy",
    long_about = "parex partitions a range into chunks, runs them sequentially, vectorized \
                  or on a thread pool, and checks the result against a sequential run."
)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Seed for generated data (defaults to the clock)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Worker threads for the pool (overrides configuration)
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Binary transform `a + b`, verified against a sequential run
    Transform(transform::TransformArgs),
    /// Lexicographical comparison regression scenarios
    Compare(compare::CompareArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// Show version, core count and worker count
    Info,
}

/// Execution mode as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Seq,
    Unseq,
    Par,
    ParUnseq,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Seq => Mode::Sequential,
            ModeArg::Unseq => Mode::Unsequenced,
            ModeArg::Par => Mode::Parallel,
            ModeArg::ParUnseq => Mode::ParallelUnsequenced,
        }
    }
}

/// Everything a command needs: merged configuration, a pool and the data seed.
pub struct Session {
    pub config: ParallelConfig,
    pub seed: u64,
    pub output: Output,
    threads: Option<usize>,
}

impl Session {
    fn new(config: ParallelConfig, seed: Option<u64>, threads: Option<usize>, output: Output) -> Self {
        let seed = seed.unwrap_or_else(clock_seed);
        output.info(&format!("seed: {seed}"));
        Self {
            config,
            seed,
            output,
            threads,
        }
    }

    /// Build a policy on a fresh pool sized from configuration or `--threads`
    pub fn policy(&self, mode: ModeArg, task: bool) -> Result<ExecutionPolicy> {
        let pool = match self.threads {
            Some(threads) => ThreadPoolSubstrate::new(threads),
            None => ThreadPoolSubstrate::from_config(&self.config),
        }
        .context("Failed to build worker pool")?;
        let context = ExecutionContext::thread_pool(Arc::new(pool));
        self.output
            .verbose(&format!("worker pool with {} thread(s)", context.parallelism()));

        let launch = if task { Launch::Async } else { Launch::Sync };
        let params = ChunkingParams::new(self.config.min_chunk_size, self.config.chunks_per_worker);
        let policy = ExecutionPolicy::new(mode.into(), launch, Some(context))?.with_params(params)?;

        tracing::info!("running under {}", policy);
        Ok(policy)
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Set up logging based on verbosity
        setup_logging(self.verbose, self.quiet);

        let output = Output::new(self.verbose > 0, self.quiet);
        let settings = ParallelConfig::load_with_custom_config(self.config.as_deref())
            .context("Failed to load configuration")?;

        match self.command {
            Commands::Config(args) => config::execute(args, &settings),
            Commands::Info => info::execute(&settings, self.threads, &output),
            Commands::Transform(args) => {
                let session = Session::new(settings, self.seed, self.threads, output);
                transform::execute(args, &session)
            }
            Commands::Compare(args) => {
                let session = Session::new(settings, self.seed, self.threads, output);
                compare::execute(args, &session)
            }
        }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
