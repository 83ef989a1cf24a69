//! Per-family placeholder vocabularies.
//!
//! finance:   SAMPLEFREQ EVENTS IBIDS DBIDS IASKS DASKS
//! warehouse: SAMPLEFREQ ABSDATADIR DATADIR EVENTS LINEITEM ORDERS CUSTOMER
//!            SUPPLIER PART PARTSUPP NATION REGION
//! cluster:   SAMPLEFREQ EVENTS

use crate::config::RunConfiguration;
use crate::format::{EngineCommand, FormatError, Substitutions};
use crate::registry::{QueryFamily, QuerySpec};
use std::path::Path;

fn path_str(p: &Path) -> String {
    p.display().to_string()
}

fn finish(
    query: &QuerySpec,
    base: EngineCommand,
    subs: &Substitutions,
) -> Result<EngineCommand, FormatError> {
    let words = subs.expand(query.name, query.args)?;
    Ok(words.into_iter().fold(base, |cmd, w| cmd.arg(w)))
}

pub fn format_finance_args(
    query: &QuerySpec,
    base: EngineCommand,
    config: &RunConfiguration,
) -> Result<EngineCommand, FormatError> {
    let data_dir = config.data_dir_for(QueryFamily::Finance);
    let files = QueryFamily::Finance.dataset_files(&data_dir);

    let subs = Substitutions::new()
        .bind("SAMPLEFREQ", config.sample)
        .bind("EVENTS", path_str(&files[0]))
        .bind("IBIDS", path_str(&files[1]))
        .bind("DBIDS", path_str(&files[2]))
        .bind("IASKS", path_str(&files[3]))
        .bind("DASKS", path_str(&files[4]));

    finish(query, base, &subs)
}

pub fn format_warehouse_args(
    query: &QuerySpec,
    base: EngineCommand,
    config: &RunConfiguration,
) -> Result<EngineCommand, FormatError> {
    let family = QueryFamily::Warehouse;
    let data_dir = config.data_dir_for(family);
    let files = family.dataset_files(&data_dir);
    let abs_data_dir = config.esper_dir.join("bin");
    let events = data_dir.join(format!("{}_agenda{}", query.name, family.data_ext()));

    let subs = Substitutions::new()
        .bind("SAMPLEFREQ", config.sample)
        .bind("ABSDATADIR", path_str(&abs_data_dir))
        .bind("DATADIR", path_str(&data_dir))
        .bind("EVENTS", path_str(&events))
        .bind("LINEITEM", path_str(&files[0]))
        .bind("ORDERS", path_str(&files[1]))
        .bind("CUSTOMER", path_str(&files[2]))
        .bind("SUPPLIER", path_str(&files[3]))
        .bind("PART", path_str(&files[4]))
        .bind("PARTSUPP", path_str(&files[5]))
        .bind("NATION", path_str(&files[6]))
        .bind("REGION", path_str(&files[7]));

    finish(query, base, &subs)
}

pub fn format_cluster_args(
    query: &QuerySpec,
    base: EngineCommand,
    config: &RunConfiguration,
) -> Result<EngineCommand, FormatError> {
    let data_dir = config.data_dir_for(QueryFamily::Cluster);
    let files = QueryFamily::Cluster.dataset_files(&data_dir);

    let subs = Substitutions::new()
        .bind("SAMPLEFREQ", config.sample)
        .bind("EVENTS", path_str(&files[0]));

    finish(query, base, &subs)
}

/// Build the engine command for `query`: launcher script, query file, then
/// the family-formatted template arguments.
pub fn format_command(
    query: &QuerySpec,
    config: &RunConfiguration,
) -> Result<EngineCommand, FormatError> {
    let base = EngineCommand::new(
        config.launcher_script(query.family),
        &config.query_file(query),
    );

    match query.family {
        QueryFamily::Finance => format_finance_args(query, base, config),
        QueryFamily::Warehouse => format_warehouse_args(query, base, config),
        QueryFamily::Cluster => format_cluster_args(query, base, config),
    }
}
