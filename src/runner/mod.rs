//! Process runner: spawn one engine run, find its pid, supervise it to completion.

pub mod launch;
pub mod signal;
pub mod supervise;

pub use launch::{LaunchError, PidDiscoveryError};
pub use signal::OsSignaller;
pub use supervise::{RunOutcome, Supervision, Supervisor, SystemClock};

use crate::format::EngineCommand;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use supervise::{ChildProcess, Signaller};
use thiserror::Error;

/// Wait between spawn and reading the pid line.
pub const SETTLE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    PidDiscovery(#[from] PidDiscoveryError),
}

/// What one supervised run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub engine_pid: u32,
    pub log_file: PathBuf,
    pub supervision: Supervision,
}

#[derive(Debug, Clone)]
pub struct Runner {
    pub settle_delay: Duration,
    pub poll_period: Duration,
    pub timeout: Duration,
}

impl Runner {
    pub fn new(poll_period: Duration, timeout: Duration) -> Self {
        Self {
            settle_delay: SETTLE_DELAY,
            poll_period,
            timeout,
        }
    }

    #[cfg(test)]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Run `command` once, logging to `log_file`, until it exits or times out.
    ///
    /// A log whose first line is not a pid is fatal: the spawn handle is
    /// signalled and the error returned without polling.
    pub fn run(&self, command: &EngineCommand, log_file: &Path) -> Result<RunReport, RunError> {
        let (mut child, started) = launch::spawn(command, log_file)?;

        debug!("waiting {:?} for the pid line in {}", self.settle_delay, log_file.display());
        thread::sleep(self.settle_delay);
        let engine_pid = match launch::read_engine_pid(log_file) {
            Ok(pid) => pid,
            Err(e) => {
                warn!("pid discovery failed, terminating spawn handle {}", child.id());
                if !child.has_exited().unwrap_or(false) {
                    let _ = OsSignaller.terminate(child.id());
                }
                return Err(e.into());
            }
        };
        info!("SPE pid {}", engine_pid);

        let supervisor = Supervisor::new(
            self.poll_period,
            self.timeout,
            SystemClock::started_at(started),
            OsSignaller,
        );
        let supervision = supervisor.supervise(&mut child, engine_pid);

        Ok(RunReport {
            engine_pid,
            log_file: log_file.to_path_buf(),
            supervision,
        })
    }
}
