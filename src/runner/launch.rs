//! Spawning the engine and discovering its pid.
//!
//! Collaborator contract: the launcher script must make the engine write its
//! own pid, in decimal, as the very first line of its output. That pid may
//! differ from the spawn handle's (the script itself).

use crate::format::EngineCommand;
use log::info;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::process::{Child, Stdio};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("create run log {}: {source}", .path.display())]
    Log { path: PathBuf, source: io::Error },

    #[error("spawn '{command}': {source}")]
    Spawn { command: String, source: io::Error },
}

#[derive(Debug, Error)]
pub enum PidDiscoveryError {
    #[error("read pid from {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },

    #[error("{} is empty, expected the engine pid on its first line", .path.display())]
    Empty { path: PathBuf },

    #[error("first line of {} is not a pid: {line:?}", .path.display())]
    NotAPid {
        path: PathBuf,
        line: String,
        source: ParseIntError,
    },

    #[error("first line of {} is pid 0, which names no process", .path.display())]
    ZeroPid { path: PathBuf },
}

/// Spawn `command` with stdout and stderr both going to `log_file`.
pub fn spawn(command: &EngineCommand, log_file: &Path) -> Result<(Child, Instant), LaunchError> {
    let log_err = |source| LaunchError::Log {
        path: log_file.to_path_buf(),
        source,
    };
    let stdout = File::create(log_file).map_err(log_err)?;
    let stderr = stdout.try_clone().map_err(log_err)?;

    info!("Starting SPE with '{}' >{} 2>&1", command, log_file.display());

    let child = command
        .to_command()
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            command: command.to_string(),
            source,
        })?;

    Ok((child, Instant::now()))
}

/// Read the engine's self-reported pid from the first line of its log.
pub fn read_engine_pid(log_file: &Path) -> Result<u32, PidDiscoveryError> {
    let unreadable = |source| PidDiscoveryError::Unreadable {
        path: log_file.to_path_buf(),
        source,
    };
    let file = fs::File::open(log_file).map_err(unreadable)?;

    let mut first = String::new();
    let n = BufReader::new(file)
        .read_line(&mut first)
        .map_err(unreadable)?;
    if n == 0 {
        return Err(PidDiscoveryError::Empty {
            path: log_file.to_path_buf(),
        });
    }

    let line = first.trim();
    let pid = line
        .parse::<u32>()
        .map_err(|source| PidDiscoveryError::NotAPid {
            path: log_file.to_path_buf(),
            line: line.to_string(),
            source,
        })?;

    // kill(0, ..) would signal our own process group.
    if pid == 0 {
        return Err(PidDiscoveryError::ZeroPid {
            path: log_file.to_path_buf(),
        });
    }
    Ok(pid)
}
