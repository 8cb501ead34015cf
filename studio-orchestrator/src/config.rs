//! Orchestrator configuration
//!
//! Defines all configurable parameters for the orchestrator: the listen
//! address, which generation engine backs the stages, ledger capacity and
//! retention, and worker limits for detached jobs.

use std::time::Duration;

/// Which engine implementation backs the four stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMode {
    /// Deterministic in-process engines
    Stub,
    /// Forward stage input to an external model service
    Remote { base_url: String },
}

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP API binds to
    pub bind_addr: String,

    pub engine: EngineMode,

    /// Upper bound on a single engine invocation
    pub engine_timeout: Duration,

    /// Maximum number of jobs the ledger holds at once
    pub max_jobs: usize,

    /// Max detached jobs executing concurrently
    pub max_parallel_jobs: usize,

    /// Largest accepted request body, uploads included
    pub max_upload_bytes: usize,

    /// How long finished jobs are kept; `None` keeps them for the process lifetime
    pub job_retention: Option<Duration>,

    /// How often the retention sweeper runs
    pub sweep_interval: Duration,
}

impl Config {
    /// Creates a configuration with defaults and the stub engine
    pub fn new(bind_addr: String) -> Self {
        Self {
            bind_addr,
            engine: EngineMode::Stub,
            engine_timeout: Duration::from_secs(300),
            max_jobs: 100_000,
            max_parallel_jobs: 4,
            max_upload_bytes: 64 * 1024 * 1024,
            job_retention: None,
            sweep_interval: Duration::from_secs(60),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - STUDIO_BIND_ADDR (default: 0.0.0.0:8000)
    /// - STUDIO_ENGINE (`stub` or `remote`, default: stub)
    /// - STUDIO_ENGINE_URL (required when STUDIO_ENGINE=remote)
    /// - STUDIO_ENGINE_TIMEOUT_SECS (default: 300)
    /// - STUDIO_MAX_JOBS (default: 100000)
    /// - STUDIO_MAX_PARALLEL_JOBS (default: 4)
    /// - STUDIO_MAX_UPLOAD_BYTES (default: 64 MiB)
    /// - STUDIO_JOB_RETENTION_SECS (default: unset, keep forever)
    /// - STUDIO_SWEEP_INTERVAL_SECS (default: 60)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let bind_addr = lookup("STUDIO_BIND_ADDR").unwrap_or(defaults.bind_addr);

        let engine = match lookup("STUDIO_ENGINE").as_deref().map(str::trim) {
            None | Some("") | Some("stub") => EngineMode::Stub,
            Some("remote") => {
                let base_url = lookup("STUDIO_ENGINE_URL").ok_or_else(|| {
                    anyhow::anyhow!("STUDIO_ENGINE_URL must be set when STUDIO_ENGINE=remote")
                })?;
                EngineMode::Remote { base_url }
            }
            Some(other) => anyhow::bail!("unknown STUDIO_ENGINE '{}' (expected stub or remote)", other),
        };

        let engine_timeout = parse_number::<u64>(&lookup, "STUDIO_ENGINE_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.engine_timeout);

        let max_jobs = parse_number::<usize>(&lookup, "STUDIO_MAX_JOBS")?.unwrap_or(defaults.max_jobs);

        let max_parallel_jobs = parse_number::<usize>(&lookup, "STUDIO_MAX_PARALLEL_JOBS")?
            .unwrap_or(defaults.max_parallel_jobs);

        let max_upload_bytes = parse_number::<usize>(&lookup, "STUDIO_MAX_UPLOAD_BYTES")?
            .unwrap_or(defaults.max_upload_bytes);

        let job_retention =
            parse_number::<u64>(&lookup, "STUDIO_JOB_RETENTION_SECS")?.map(Duration::from_secs);

        let sweep_interval = parse_number::<u64>(&lookup, "STUDIO_SWEEP_INTERVAL_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.sweep_interval);

        Ok(Self {
            bind_addr,
            engine,
            engine_timeout,
            max_jobs,
            max_parallel_jobs,
            max_upload_bytes,
            job_retention,
            sweep_interval,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bind_addr.is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if let EngineMode::Remote { base_url } = &self.engine
            && !base_url.starts_with("http://")
            && !base_url.starts_with("https://")
        {
            anyhow::bail!("engine url must start with http:// or https://");
        }

        if self.engine_timeout.is_zero() {
            anyhow::bail!("engine_timeout must be greater than 0");
        }

        if self.max_jobs == 0 {
            anyhow::bail!("max_jobs must be greater than 0");
        }

        if self.max_parallel_jobs == 0 {
            anyhow::bail!("max_parallel_jobs must be greater than 0");
        }

        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than 0");
        }

        if self.job_retention.is_some() && self.sweep_interval.is_zero() {
            anyhow::bail!("sweep_interval must be greater than 0 when retention is enabled");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("0.0.0.0:8000".to_string())
    }
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> anyhow::Result<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} must be a non-negative integer, got '{}'", name, raw)),
    }
}
