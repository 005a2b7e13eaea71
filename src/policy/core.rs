use std::fmt;

use super::Launch;
use crate::config;
use crate::error::ConfigurationError;
use crate::executor::{ExecutionContext, Executor};

/// Scheduling strategy requested by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Sequential,
    Unsequenced,
    Parallel,
    ParallelUnsequenced,
}

impl Mode {
    /// Whether dispatch may run more than one unit of work at a time
    pub fn is_concurrent(self) -> bool {
        matches!(self, Mode::Parallel | Mode::ParallelUnsequenced)
    }

    /// Whether chunk work may reorder or vectorize its element operations
    pub fn is_unsequenced(self) -> bool {
        matches!(self, Mode::Unsequenced | Mode::ParallelUnsequenced)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Sequential => "sequential",
            Mode::Unsequenced => "unsequenced",
            Mode::Parallel => "parallel",
            Mode::ParallelUnsequenced => "parallel-unsequenced",
        };
        f.write_str(name)
    }
}

/// Chunk sizing knobs carried by a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingParams {
    /// Never cut chunks smaller than this many elements
    pub min_chunk_size: usize,
    /// Chunks requested per unit of substrate parallelism
    pub chunks_per_worker: usize,
    /// Hard upper bound on the chunk count
    pub max_chunks: Option<usize>,
}

impl ChunkingParams {
    pub fn new(min_chunk_size: usize, chunks_per_worker: usize) -> Self {
        Self {
            min_chunk_size,
            chunks_per_worker,
            max_chunks: None,
        }
    }

    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = Some(max_chunks);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.min_chunk_size == 0 {
            return Err(ConfigurationError::ZeroChunkSize);
        }
        if self.chunks_per_worker == 0 {
            return Err(ConfigurationError::ZeroChunksPerWorker);
        }
        if self.max_chunks == Some(0) {
            return Err(ConfigurationError::ZeroMaxChunks);
        }
        Ok(())
    }

    /// Target chunk count for `len` elements given a parallelism hint.
    ///
    /// ```text
    /// len == 0            -> 0
    /// sequenced modes     -> 1
    /// otherwise           -> min(hint * chunks_per_worker, max_chunks, ceil(len / min_chunk_size))
    /// ```
    pub fn chunk_count(&self, mode: Mode, len: usize, parallelism: usize) -> usize {
        if len == 0 {
            return 0;
        }
        if !mode.is_concurrent() {
            return 1;
        }

        let requested = parallelism.max(1).saturating_mul(self.chunks_per_worker.max(1));
        let bounded = self.max_chunks.map_or(requested, |max| requested.min(max));
        let by_work = len.div_ceil(self.min_chunk_size.max(1));

        bounded.min(by_work).max(1)
    }
}

impl Default for ChunkingParams {
    fn default() -> Self {
        let config = config::global();
        Self::new(config.min_chunk_size, config.chunks_per_worker)
    }
}

/// Declarative execution policy: mode, launch style and optional target context.
///
/// Policies are immutable; every builder method returns a new value. Invalid
/// combinations are rejected here, never at dispatch time.
#[derive(Debug, Clone)]
pub struct ExecutionPolicy {
    mode: Mode,
    launch: Launch,
    context: Option<ExecutionContext>,
    params: Option<ChunkingParams>,
}

impl ExecutionPolicy {
    /// Build a policy, validating the context against the mode
    pub fn new(
        mode: Mode,
        launch: Launch,
        context: Option<ExecutionContext>,
    ) -> Result<Self, ConfigurationError> {
        if let Some(context) = &context {
            Self::check_context(mode, context)?;
        }
        Ok(Self {
            mode,
            launch,
            context,
            params: None,
        })
    }

    pub fn seq() -> Self {
        Self::bare(Mode::Sequential)
    }

    pub fn unseq() -> Self {
        Self::bare(Mode::Unsequenced)
    }

    pub fn par() -> Self {
        Self::bare(Mode::Parallel)
    }

    pub fn par_unseq() -> Self {
        Self::bare(Mode::ParallelUnsequenced)
    }

    fn bare(mode: Mode) -> Self {
        Self {
            mode,
            launch: Launch::Sync,
            context: None,
            params: None,
        }
    }

    /// Same policy, returning a handle instead of blocking
    pub fn task(self) -> Self {
        self.with_launch(Launch::Async)
    }

    pub fn with_launch(mut self, launch: Launch) -> Self {
        self.launch = launch;
        self
    }

    /// Same policy, targeting `context`
    pub fn on(mut self, context: ExecutionContext) -> Result<Self, ConfigurationError> {
        Self::check_context(self.mode, &context)?;
        self.context = Some(context);
        Ok(self)
    }

    /// Same policy with explicit chunking parameters
    pub fn with_params(mut self, params: ChunkingParams) -> Result<Self, ConfigurationError> {
        params.validate()?;
        self.params = Some(params);
        Ok(self)
    }

    fn check_context(mode: Mode, context: &ExecutionContext) -> Result<(), ConfigurationError> {
        if mode.is_concurrent() && context.launch().is_sync() {
            return Err(ConfigurationError::SerialContext { mode });
        }
        if !context.is_accepting() {
            return Err(ConfigurationError::ContextShutDown {
                name: context.name().to_string(),
            });
        }
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn launch(&self) -> Launch {
        self.launch
    }

    pub fn context(&self) -> Option<&ExecutionContext> {
        self.context.as_ref()
    }

    pub fn params(&self) -> ChunkingParams {
        self.params.unwrap_or_default()
    }

    pub fn is_concurrent(&self) -> bool {
        self.mode.is_concurrent()
    }

    pub fn is_unsequenced(&self) -> bool {
        self.mode.is_unsequenced()
    }

    /// Whether a call under this policy hands back a materialized result
    pub fn is_blocking(&self) -> bool {
        self.launch.is_sync()
    }

    /// Resolve the context this policy runs on and bind an executor to it.
    ///
    /// Without an explicit context, sequenced blocking calls run inline on the
    /// caller and everything else goes to the process-wide default pool.
    pub fn executor(&self) -> Executor {
        let context = match &self.context {
            Some(context) => context.clone(),
            None if !self.mode.is_concurrent() && self.launch.is_sync() => ExecutionContext::inline(),
            None => ExecutionContext::global(),
        };
        crate::executor::bind(context, self.launch)
    }
}

impl fmt::Display for ExecutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.mode, self.launch)?;
        if let Some(context) = &self.context {
            write!(f, " on {}", context.name())?;
        }
        Ok(())
    }
}
