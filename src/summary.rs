//! JSON record of one run, written when `--summary` is given.

use crate::Result;
use crate::format::EngineCommand;
use crate::registry::{QueryFamily, QuerySpec};
use crate::runner::{RunOutcome, RunReport};
use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub query: String,
    pub family: QueryFamily,
    pub command: EngineCommand,
    pub log_file: PathBuf,
    pub engine_pid: u32,
    pub outcome: RunOutcome,
    pub elapsed_secs: f64,
    pub polls: u32,
}

impl RunSummary {
    pub fn new(query: &QuerySpec, command: &EngineCommand, report: &RunReport) -> Self {
        Self {
            query: query.name.to_string(),
            family: query.family,
            command: command.clone(),
            log_file: report.log_file.clone(),
            engine_pid: report.engine_pid,
            outcome: report.supervision.outcome,
            elapsed_secs: report.supervision.elapsed.as_secs_f64(),
            polls: report.supervision.polls,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("write summary {}", path.display()))?;
        Ok(())
    }
}
