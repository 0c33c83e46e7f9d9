//! ydb-query-metrics - YDB query statistics aggregation and reporting.
//!
//! Processes TSV exports of the YDB `query_metrics` and `top_queries`
//! system views: loads and normalizes the rows, filters queries by text
//! patterns, aggregates per-query min/avg/max statistics, and renders each
//! unique query as a `.sql` fragment with a statistics comment block.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`dataset`] - Canonical record type and column layouts
//! - [`error`] - Error types and result aliases
//! - [`filter`] - Query text filtering (like / not-like / regex)
//! - [`loader`] - Encoding and format detection, TSV parsing
//! - [`output`] - Console and file output sinks
//! - [`processor`] - End-to-end pipeline orchestration
//! - [`report`] - Statistics block rendering and SQL pretty-printing
//! - [`stats`] - Per-query metric aggregation
//!
//! # Example
//!
//! ```
//! use ydb_query_metrics::report::format_number_with_suffix;
//!
//! assert_eq!(format_number_with_suffix(1_500_000.0), "1.50M");
//! ```

pub mod cli;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod processor;
pub mod report;
pub mod stats;

pub use error::{MetricsError, Result};
