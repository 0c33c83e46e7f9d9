//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The entry point is the [`Cli`] struct.

use clap::Parser;
use std::path::PathBuf;

use crate::dataset::FileFormat;
use crate::report::SortBy;

/// Aggregate, filter and pretty-print YDB query statistics from system
/// view TSV exports.
#[derive(Debug, Parser)]
#[command(name = "ydb-query-metrics")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// TSV files to process; glob patterns are supported
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<String>,

    /// Keep queries containing this pattern (case-insensitive substring,
    /// repeatable, AND logic)
    #[arg(long, value_name = "PATTERN")]
    pub like: Vec<String>,

    /// Drop queries containing this pattern (case-insensitive substring,
    /// repeatable, AND logic)
    #[arg(long, value_name = "PATTERN")]
    pub not_like: Vec<String>,

    /// Keep queries matching this regular expression (case-insensitive,
    /// repeatable, AND logic)
    #[arg(long, value_name = "PATTERN")]
    pub regex: Vec<String>,

    /// Write one .sql file per query instead of printing to stdout
    #[arg(long)]
    pub to_files: bool,

    /// Directory for --to-files output [default: output/<timestamp>]
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// With --to-files, write all queries to a single AllQueries.sql
    #[arg(long)]
    pub one_file: bool,

    /// Write all queries to a single file at this exact path; takes
    /// precedence over --to-files
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Replace existing files in the output location
    #[arg(long)]
    pub overwrite: bool,

    /// Emit query text verbatim, without SQL pretty-printing
    #[arg(long)]
    pub no_format: bool,

    /// Input file format, bypassing detection
    #[arg(long, value_name = "FORMAT", value_enum)]
    pub format: Option<FileFormat>,

    /// Metric to sort queries by, descending
    #[arg(long, value_enum, default_value = "MaxDuration", value_name = "METRIC")]
    pub sort_by: SortBy,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn files_are_required() {
        assert!(Cli::try_parse_from(["ydb-query-metrics"]).is_err());
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["ydb-query-metrics", "metrics.tsv"]).unwrap();
        assert_eq!(cli.files, vec!["metrics.tsv"]);
        assert!(cli.like.is_empty());
        assert!(!cli.to_files);
        assert!(!cli.overwrite);
        assert_eq!(cli.sort_by, SortBy::MaxDuration);
        assert!(cli.format.is_none());
        assert!(cli.output.is_none());
    }

    #[test]
    fn repeatable_filters_accumulate() {
        let cli = Cli::try_parse_from([
            "ydb-query-metrics",
            "metrics.tsv",
            "--like",
            "orders",
            "--like",
            "JOIN",
            "--not-like",
            "system",
            "--regex",
            "SELECT.*FROM",
        ])
        .unwrap();
        assert_eq!(cli.like, vec!["orders", "JOIN"]);
        assert_eq!(cli.not_like, vec!["system"]);
        assert_eq!(cli.regex, vec!["SELECT.*FROM"]);
    }

    #[test]
    fn sort_by_accepts_metric_names() {
        for (value, expected) in [
            ("MaxDuration", SortBy::MaxDuration),
            ("AvgDuration", SortBy::AvgDuration),
            ("MaxCPUTime", SortBy::MaxCpuTime),
            ("AvgCPUTime", SortBy::AvgCpuTime),
        ] {
            let cli =
                Cli::try_parse_from(["ydb-query-metrics", "m.tsv", "--sort-by", value]).unwrap();
            assert_eq!(cli.sort_by, expected);
        }
    }

    #[test]
    fn format_hint_accepts_both_formats() {
        let cli = Cli::try_parse_from(["ydb-query-metrics", "m.tsv", "--format", "top_queries"])
            .unwrap();
        assert_eq!(cli.format, Some(FileFormat::TopQueries));
    }

    #[test]
    fn output_parses_alongside_to_files() {
        let cli = Cli::try_parse_from([
            "ydb-query-metrics",
            "m.tsv",
            "--to-files",
            "--output",
            "all.sql",
        ])
        .unwrap();
        assert!(cli.to_files);
        assert_eq!(cli.output, Some(PathBuf::from("all.sql")));
    }
}
