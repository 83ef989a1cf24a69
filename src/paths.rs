//! Pre-run existence checks.
//!
//! Only existence is checked. Permissions and content are the engine's problem.

use crate::config::RunConfiguration;
use crate::registry::QuerySpec;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The paths that must all exist before a run, in the order they are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredPaths {
    pub esper_dir: PathBuf,
    pub query_file: PathBuf,
    pub out_dir: PathBuf,
    pub launcher_script: PathBuf,
}

impl RequiredPaths {
    pub fn for_query(query: &QuerySpec, config: &RunConfiguration) -> Self {
        Self {
            esper_dir: config.esper_dir.clone(),
            query_file: config.query_file(query),
            out_dir: config.out_dir.clone(),
            launcher_script: config.launcher_script(query.family),
        }
    }

    pub fn in_check_order(&self) -> [&PathBuf; 4] {
        [
            &self.esper_dir,
            &self.query_file,
            &self.out_dir,
            &self.launcher_script,
        ]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid paths: {}", DisplayPaths(.missing))]
pub struct MissingPaths {
    pub missing: Vec<PathBuf>,
}

struct DisplayPaths<'a>(&'a [PathBuf]);

impl fmt::Display for DisplayPaths<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.0.iter().map(|p| p.display().to_string()).collect();
        write!(f, "[{}]", joined.join(", "))
    }
}

/// Check that every path exists; on failure report exactly the missing ones, in order.
pub fn validate<'a, I>(paths: I) -> Result<(), MissingPaths>
where
    I: IntoIterator<Item = &'a PathBuf>,
{
    let missing: Vec<PathBuf> = paths
        .into_iter()
        .filter(|p| !p.exists())
        .cloned()
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MissingPaths { missing })
    }
}
