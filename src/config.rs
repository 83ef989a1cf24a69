//! Per-invocation run configuration.
//!
//! Built once from the command line and read-only afterwards. Also owns the
//! path layout derived from it (query file, launcher script, run log).

use crate::registry::{QueryFamily, QuerySpec};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ESPER_DIR: &str = "../";
pub const DEFAULT_QUERY_DIR: &str = "../queries";
pub const DEFAULT_SAMPLE: u32 = 10;
pub const DEFAULT_POLL_SECS: u64 = 10;
pub const DEFAULT_TIMEOUT_SECS: f64 = 6000.0;

/// Extension of engine query files.
pub const QUERY_EXT: &str = "esper";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no output directory given (use -o/--outdir)")]
    MissingOutDir,
}

#[derive(Debug, Clone)]
pub struct RunConfiguration {
    /// Results sample frequency handed to the engine.
    pub sample: u32,
    pub poll_period: Duration,
    pub timeout: Duration,
    pub esper_dir: PathBuf,
    pub query_dir: PathBuf,
    /// Dataset directory override; each family has its own default.
    pub data_dir: Option<PathBuf>,
    pub out_dir: PathBuf,
    /// Directory holding the `run_*.sh` launcher scripts.
    pub script_dir: PathBuf,
}

impl RunConfiguration {
    /// Defaults everywhere except the output directory, which has none.
    pub fn new(out_dir: Option<PathBuf>, script_dir: PathBuf) -> Result<Self, ConfigError> {
        let out_dir = out_dir
            .filter(|d| !d.as_os_str().is_empty())
            .ok_or(ConfigError::MissingOutDir)?;

        Ok(Self {
            sample: DEFAULT_SAMPLE,
            poll_period: Duration::from_secs(DEFAULT_POLL_SECS),
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            esper_dir: PathBuf::from(DEFAULT_ESPER_DIR),
            query_dir: PathBuf::from(DEFAULT_QUERY_DIR),
            data_dir: None,
            out_dir,
            script_dir,
        })
    }

    pub fn with_sample(mut self, sample: u32) -> Self {
        self.sample = sample;
        self
    }

    pub fn with_poll_period(mut self, poll_period: Duration) -> Self {
        self.poll_period = poll_period;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_esper_dir(mut self, dir: PathBuf) -> Self {
        self.esper_dir = dir;
        self
    }

    pub fn with_query_dir(mut self, dir: PathBuf) -> Self {
        self.query_dir = dir;
        self
    }

    /// An empty path counts as "not given".
    pub fn with_data_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.data_dir = dir.filter(|d| !d.as_os_str().is_empty());
        self
    }

    pub fn data_dir_for(&self, family: QueryFamily) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(family.default_data_dir()))
    }

    pub fn uses_default_query_dir(&self) -> bool {
        self.query_dir == Path::new(DEFAULT_QUERY_DIR)
    }

    /// The default query directory is split into per-family subdirectories;
    /// an explicit one is flat.
    pub fn query_file(&self, query: &QuerySpec) -> PathBuf {
        let file = format!("{}.{}", query.name, QUERY_EXT);
        if self.uses_default_query_dir() {
            self.query_dir.join(query.family.query_subdir()).join(file)
        } else {
            self.query_dir.join(file)
        }
    }

    pub fn launcher_script(&self, family: QueryFamily) -> PathBuf {
        self.script_dir.join(family.launcher_script())
    }

    pub fn log_file(&self, query_name: &str) -> PathBuf {
        self.out_dir.join(format!("{}_run.log", query_name))
    }
}
