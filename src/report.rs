//! Rendering of queries with their statistics blocks.
//!
//! Every query is emitted as an executable `.sql` fragment: an optional
//! numbered header comment, a `/* ... */` block with the min/avg/max
//! table, then the (optionally pretty-printed) query text.

use std::cmp::Ordering;

use clap::ValueEnum;
use sqlformat::{FormatOptions, Indent, QueryParams};

use crate::stats::{MetricStats, QueryStatistics};

/// Metric used to order queries (always descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    #[value(name = "MaxDuration")]
    MaxDuration,
    #[value(name = "AvgDuration")]
    AvgDuration,
    #[value(name = "MaxCPUTime")]
    MaxCpuTime,
    #[value(name = "AvgCPUTime")]
    AvgCpuTime,
}

impl SortBy {
    /// Sort key value in seconds.
    pub fn key(self, stats: &QueryStatistics) -> f64 {
        match self {
            SortBy::MaxDuration => stats.duration.max(),
            SortBy::AvgDuration => stats.duration.avg(),
            SortBy::MaxCpuTime => stats.cpu_time.max(),
            SortBy::AvgCpuTime => stats.cpu_time.avg(),
        }
    }

    /// Name shown in `-- Query #N (...)` headers.
    pub fn label(self) -> &'static str {
        match self {
            SortBy::MaxDuration => "MaxDuration",
            SortBy::AvgDuration => "AvgDuration",
            SortBy::MaxCpuTime => "MaxCPUTime",
            SortBy::AvgCpuTime => "AvgCPUTime",
        }
    }
}

/// Sort descending by the chosen metric; ties fall back to query text so
/// output order is deterministic across runs.
pub fn sort_statistics(entries: &mut [QueryStatistics], sort_by: SortBy) {
    entries.sort_by(|a, b| {
        sort_by
            .key(b)
            .partial_cmp(&sort_by.key(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.query_text.cmp(&b.query_text))
    });
}

/// Format a number with a magnitude suffix (k, M, G, T, P).
///
/// Precision drops as the mantissa grows: two decimals below 10, one
/// below 100, none above.
pub fn format_number_with_suffix(value: f64) -> String {
    const SUFFIXES: [&str; 6] = ["", "k", "M", "G", "T", "P"];

    if value == 0.0 {
        return "0".to_string();
    }

    let mut value = value;
    let mut index = 0;
    while value >= 1000.0 && index < SUFFIXES.len() - 1 {
        value /= 1000.0;
        index += 1;
    }

    if value >= 100.0 {
        format!("{:.0}{}", value, SUFFIXES[index])
    } else if value >= 10.0 {
        format!("{:.1}{}", value, SUFFIXES[index])
    } else {
        format!("{:.2}{}", value, SUFFIXES[index])
    }
}

fn seconds_row(stats: &MetricStats) -> String {
    format!(
        "{:<15} {:<15.6} {:<15.6} {:<15.6}",
        stats.label(),
        stats.min(),
        stats.avg(),
        stats.max()
    )
}

fn suffixed_row(stats: &MetricStats) -> String {
    format!(
        "{:<15} {:<15} {:<15} {:<15}",
        stats.label(),
        format_number_with_suffix(stats.min()),
        format_number_with_suffix(stats.avg()),
        format_number_with_suffix(stats.max())
    )
}

fn rule() -> String {
    format!("{0} {0} {0} {0}", "-".repeat(15))
}

/// Render one query with its statistics block.
///
/// `query_number` adds a `-- Query #N (<metric>: X seconds)` header for
/// numbered outputs (console and single-file mode).
pub fn format_query_with_stats(
    stats: &QueryStatistics,
    query_number: Option<usize>,
    no_format: bool,
    sort_by: SortBy,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    if let Some(number) = query_number {
        lines.push(format!(
            "-- Query #{} ({}: {:.6} seconds)\n",
            number,
            sort_by.label(),
            sort_by.key(stats)
        ));
    }

    lines.push("/*".to_string());
    lines.push(format!("Row count: {}", stats.row_count));
    lines.push(format!("Total count: {}\n", stats.total_count));

    lines.push(format!(
        "{:<15} {:<15} {:<15} {:<15}",
        "Statistic", "Min", "Avg", "Max"
    ));
    lines.push(rule());

    lines.push(seconds_row(&stats.duration));
    lines.push(seconds_row(&stats.cpu_time));
    lines.push(suffixed_row(&stats.read_rows));
    lines.push(suffixed_row(&stats.read_bytes));
    lines.push(suffixed_row(&stats.update_rows));
    lines.push(suffixed_row(&stats.update_bytes));

    lines.push(rule());
    lines.push(format!(
        "{:<15} {:<15} {:<15} {:<15}",
        "Rows/second",
        "",
        format_number_with_suffix(stats.rows_per_second()),
        ""
    ));
    lines.push(format!(
        "{:<15} {:<15} {:<15} {:<15}",
        "Bytes/row",
        "",
        format_number_with_suffix(stats.bytes_per_row()),
        ""
    ));
    lines.push("*/\n".to_string());

    // Exports carry literal \n sequences inside the query text.
    let query = stats.query_text.replace("\\n", "\n");

    let rendered = if no_format {
        query
    } else {
        sqlformat::format(
            &query,
            &QueryParams::None,
            FormatOptions {
                indent: Indent::Spaces(4),
                uppercase: true,
                lines_between_queries: 1,
            },
        )
    };
    let needs_newline = !rendered.ends_with('\n');
    lines.push(rendered);
    if needs_newline {
        lines.push(String::new());
    }

    lines.join("\n")
}
