//! Static query tables.
//!
//! Each entry maps a query name to the argument fragments its launcher script
//! expects. Fragments may contain `{TOKEN}` placeholders that the formatter
//! fills in (see `crate::format`).

use crate::registry::QueryFamily;
use thiserror::Error;

type Table = &'static [(&'static str, &'static [&'static str])];

const FINANCE_QUERIES: Table = &[
    ("vwap", &["-r 3", "-s {SAMPLEFREQ}", "-u {EVENTS}"]),
    ("axfinder", &["-r 1", "-s {SAMPLEFREQ}", "-u {EVENTS}"]),
    ("brokerspread", &["-r 1", "-s {SAMPLEFREQ}", "-u {EVENTS}"]),
    ("brokervariance", &["-r 1", "-s {SAMPLEFREQ}", "-u {EVENTS}"]),
    ("pricespread", &["-r 1", "-s {SAMPLEFREQ}", "-u {EVENTS}"]),
    ("missedtrades", &["-r 3", "-s {SAMPLEFREQ}", "-u {EVENTS}"]),
];

const WAREHOUSE_QUERIES: Table = &[
    ("query3", &["-r 1", "-r 2", "-s {SAMPLEFREQ}", "-b {ABSDATADIR}", "-u {EVENTS}"]),
    ("query11a", &["-r 1", "-r 2", "-s {SAMPLEFREQ}", "-b {ABSDATADIR}", "-u {EVENTS}"]),
    ("query17", &["-r 1", "-r 4", "-s {SAMPLEFREQ}", "-b {ABSDATADIR}", "-u {EVENTS}"]),
    ("query18", &["-r 1", "-r 4", "-s {SAMPLEFREQ}", "-b {ABSDATADIR}", "-u {EVENTS}"]),
    ("query22", &["-r 1", "-r 4", "-s {SAMPLEFREQ}", "-b {ABSDATADIR}", "-u {EVENTS}"]),
    ("ssb4", &["-r 1", "-r 2", "-s {SAMPLEFREQ}", "-b {ABSDATADIR}", "-u {EVENTS}"]),
];

const CLUSTER_QUERIES: Table = &[("serverload", &["-r 2", "-r 1", "-s {SAMPLEFREQ}", "-u {EVENTS}"])];

fn table(family: QueryFamily) -> Table {
    match family {
        QueryFamily::Finance => FINANCE_QUERIES,
        QueryFamily::Warehouse => WAREHOUSE_QUERIES,
        QueryFamily::Cluster => CLUSTER_QUERIES,
    }
}

/// A registered query: its family plus the argument template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub name: &'static str,
    pub family: QueryFamily,
    pub args: &'static [&'static str],
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid query: {name}\nvalid queries: {}", .valid.join(", "))]
pub struct UnknownQuery {
    pub name: String,
    pub valid: Vec<&'static str>,
}

/// Look up `name` across all three families.
pub fn resolve(name: &str) -> Result<QuerySpec, UnknownQuery> {
    for family in QueryFamily::ALL {
        if let Some(&(key, args)) = table(family).iter().find(|(key, _)| *key == name) {
            return Ok(QuerySpec {
                name: key,
                family,
                args,
            });
        }
    }

    Err(UnknownQuery {
        name: name.to_string(),
        valid: valid_names(),
    })
}

/// Every known query name: finance, then warehouse, then cluster, table order within each.
pub fn valid_names() -> Vec<&'static str> {
    QueryFamily::ALL
        .iter()
        .flat_map(|f| table(*f).iter().map(|(key, _)| *key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_each_family() {
        let q = resolve("vwap").unwrap();
        assert_eq!(q.family, QueryFamily::Finance);
        assert_eq!(q.args, &["-r 3", "-s {SAMPLEFREQ}", "-u {EVENTS}"]);

        assert_eq!(resolve("query11a").unwrap().family, QueryFamily::Warehouse);
        assert_eq!(resolve("serverload").unwrap().family, QueryFamily::Cluster);
    }

    #[test]
    fn unknown_query_lists_every_name_in_family_order() {
        let err = resolve("badname").unwrap_err();
        assert_eq!(err.name, "badname");
        assert_eq!(
            err.valid,
            vec![
                "vwap",
                "axfinder",
                "brokerspread",
                "brokervariance",
                "pricespread",
                "missedtrades",
                "query3",
                "query11a",
                "query17",
                "query18",
                "query22",
                "ssb4",
                "serverload",
            ]
        );
        assert!(err.to_string().contains("invalid query: badname"));
    }

    #[test]
    fn names_are_unique_across_families() {
        let mut names = valid_names();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
