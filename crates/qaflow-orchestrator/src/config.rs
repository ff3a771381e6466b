use qaflow_artifacts::ArtifactStoreConfig;
use qaflow_retry::RetryPolicy;

/// Worker pool sizing (§6 `workers.count`). Bounds maximum concurrent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkersConfig {
    pub count: usize,
}

impl Default for WorkersConfig {
    fn default() -> Self {
        Self { count: 4 }
    }
}

/// Bounded job queue sizing (§6 `queue.capacity`). `submit` returns
/// `BACKPRESSURE` once the channel is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}

/// Per-run wall-clock deadline (§6 `run.timeout_ms`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub timeout_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { timeout_ms: 120_000 }
    }
}

/// Root configuration object for the Execution Orchestrator (§6
/// "Configuration"). No reflection, no global statics: every recognized
/// option is an explicit field, constructed via `Default` plus explicit
/// overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct QaConfig {
    pub workers: WorkersConfig,
    pub queue: QueueConfig,
    pub run: RunConfig,
    pub retry: RetryPolicy,
    pub artifact: ArtifactStoreConfig,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            workers: WorkersConfig::default(),
            queue: QueueConfig::default(),
            run: RunConfig::default(),
            retry: RetryPolicy::default(),
            artifact: ArtifactStoreConfig::default(),
        }
    }
}
