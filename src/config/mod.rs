//! Configuration for worker pools
//!
//! A [`PoolConfig`] can be built in code or layered with figment:
//! built-in defaults, then `jobpool.toml` (or an explicit TOML/JSON file),
//! then `JOBPOOL_*` environment variables. The pool never reads the
//! environment itself; only [`PoolConfig::load`] does.

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::thread;

/// Worker count used when the platform cannot report its parallelism
pub const FALLBACK_WORKERS: usize = 2;

/// Thread name prefix used when none is configured
pub const DEFAULT_THREAD_NAME: &str = "jobpool-worker";

/// Repository-local configuration file
pub const CONFIG_FILE: &str = "jobpool.toml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "JOBPOOL_";

/// What a worker does when a job panics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanicPolicy {
    /// Log the panic and queue a `JobFailure` for `WorkerPool::take_failures`
    #[default]
    Report,
    /// Log the panic and abort the whole process
    Abort,
}

/// Worker pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Number of worker threads (0 = one per CPU)
    pub workers: usize,

    /// Prefix for worker thread names, followed by `-{index}`
    pub thread_name: String,

    /// Behaviour when a job panics
    pub on_panic: PanicPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            on_panic: PanicPolicy::Report,
        }
    }
}

impl PoolConfig {
    /// Provider stack used by [`load`](Self::load).
    ///
    /// With `custom_config`, that file replaces `jobpool.toml`; files ending in
    /// `.json` are read as JSON, anything else as TOML. Environment variables
    /// always win.
    pub fn figment(custom_config: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(PoolConfig::default()));

        figment = match custom_config {
            Some(path) if path.extension().is_some_and(|ext| ext == "json") => {
                figment.merge(Json::file_exact(path))
            }
            Some(path) => figment.merge(Toml::file_exact(path)),
            None => figment.merge(Toml::file(CONFIG_FILE)),
        };

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate the layered configuration.
    pub fn load(custom_config: Option<&Path>) -> Result<Self> {
        let config: PoolConfig = Self::figment(custom_config)
            .extract()
            .context("Failed to load worker pool configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.thread_name.is_empty() {
            anyhow::bail!("Worker thread name cannot be empty");
        }
        if self.thread_name.contains('\0') {
            anyhow::bail!("Worker thread name cannot contain NUL bytes");
        }
        Ok(())
    }

    /// Worker count this configuration resolves to on the current machine
    pub fn resolved_workers(&self) -> usize {
        resolve_worker_count(self.workers)
    }
}

/// Turn a requested worker count into the actual one.
///
/// Non-zero requests are taken as is. Zero asks for one worker per logical
/// CPU, or [`FALLBACK_WORKERS`] when the platform cannot report it.
pub fn resolve_worker_count(requested: usize) -> usize {
    let reported = thread::available_parallelism().ok().map(NonZeroUsize::get);
    worker_count_from(requested, reported)
}

fn worker_count_from(requested: usize, reported: Option<usize>) -> usize {
    match (requested, reported) {
        (0, Some(cpus)) if cpus > 0 => cpus,
        (0, _) => FALLBACK_WORKERS,
        (requested, _) => requested,
    }
}
