//! Query families and their on-disk conventions.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// The three benchmark workloads. Each has its own dataset shape and launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryFamily {
    Finance,
    Warehouse,
    Cluster,
}

impl QueryFamily {
    pub const ALL: [QueryFamily; 3] = [Self::Finance, Self::Warehouse, Self::Cluster];

    /// Subdirectory of the default query directory holding this family's `.esper` files.
    pub fn query_subdir(self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Warehouse => "tpch",
            Self::Cluster => "cluster",
        }
    }

    pub fn launcher_script(self) -> &'static str {
        match self {
            Self::Finance => "run_finance.sh",
            Self::Warehouse => "run_tpch.sh",
            Self::Cluster => "run_cmgmt.sh",
        }
    }

    pub fn data_ext(self) -> &'static str {
        match self {
            Self::Finance => ".dbtdat",
            Self::Warehouse => ".csv",
            Self::Cluster => ".dat",
        }
    }

    /// Data directory used when none is given on the command line.
    pub fn default_data_dir(self) -> &'static str {
        self.query_subdir()
    }

    /// Fixed dataset file stems, in the order the formatter binds them.
    pub fn dataset_stems(self) -> &'static [&'static str] {
        match self {
            Self::Finance => &[
                "Events2M",
                "InsertBIDS",
                "DeleteBIDS",
                "InsertASKS",
                "DeleteASKS",
            ],
            Self::Warehouse => &[
                "lineitem", "orders", "customer", "supplier", "part", "partsupp", "nation",
                "region",
            ],
            Self::Cluster => &["sl_servers"],
        }
    }

    /// Dataset file paths under `data_dir`, same order as `dataset_stems`.
    pub fn dataset_files(self, data_dir: &Path) -> Vec<PathBuf> {
        self.dataset_stems()
            .iter()
            .map(|stem| data_dir.join(format!("{}{}", stem, self.data_ext())))
            .collect()
    }
}

impl fmt::Display for QueryFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Finance => "finance",
            Self::Warehouse => "warehouse",
            Self::Cluster => "cluster",
        };
        f.write_str(name)
    }
}
