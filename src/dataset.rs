//! Canonical record type and column layouts for YDB query statistics.
//!
//! Both supported system view exports are normalized into the
//! `query_metrics` shape: per-interval min/max/sum triples for six metrics
//! plus an occurrence count. `top_queries` rows describe single executions
//! and collapse to min = max = sum = value with a count of 1.

use clap::ValueEnum;

/// Column order of a headerless `query_metrics` export (28 columns).
pub const QUERY_METRICS_COLUMNS: [&str; 28] = [
    "Count",
    "IntervalEnd",
    "MaxCPUTime",
    "MaxDeleteRows",
    "MaxDuration",
    "MaxReadBytes",
    "MaxReadRows",
    "MaxRequestUnits",
    "MaxUpdateBytes",
    "MaxUpdateRows",
    "MinCPUTime",
    "MinDeleteRows",
    "MinDuration",
    "MinReadBytes",
    "MinReadRows",
    "MinRequestUnits",
    "MinUpdateBytes",
    "MinUpdateRows",
    "QueryText",
    "Rank",
    "SumCPUTime",
    "SumDeleteRows",
    "SumDuration",
    "SumReadBytes",
    "SumReadRows",
    "SumRequestUnits",
    "SumUpdateBytes",
    "SumUpdateRows",
];

/// Column order of a headerless `top_queries` export (29 columns).
pub const TOP_QUERIES_COLUMNS: [&str; 29] = [
    "CPUTime",
    "CompileCPUTime",
    "CompileDuration",
    "ComputeNodesCount",
    "DeleteBytes",
    "DeleteRows",
    "Duration",
    "EndTime",
    "FromQueryCache",
    "IntervalEnd",
    "MaxComputeCPUTime",
    "MaxShardCPUTime",
    "MinComputeCPUTime",
    "MinShardCPUTime",
    "ParametersSize",
    "Partitions",
    "ProcessCPUTime",
    "QueryText",
    "Rank",
    "ReadBytes",
    "ReadRows",
    "RequestUnits",
    "ShardCount",
    "SumComputeCPUTime",
    "SumShardCPUTime",
    "Type",
    "UpdateBytes",
    "UpdateRows",
    "UserSID",
];

/// Supported input file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    /// `.sys/query_metrics_one_minute` export: aggregated min/max/sum rows.
    #[value(name = "query_metrics")]
    QueryMetrics,
    /// `.sys/top_queries_by_*` export: one row per execution.
    #[value(name = "top_queries")]
    TopQueries,
}

/// Aggregated min/max/sum values for one metric of one record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricTriple {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

impl MetricTriple {
    /// Triple for a single observed value (top_queries normalization).
    pub fn single(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
        }
    }
}

/// One input row in canonical `query_metrics` shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRecord {
    pub query_text: String,
    /// Number of executions this row aggregates.
    pub count: f64,
    pub duration: MetricTriple,
    pub cpu_time: MetricTriple,
    pub read_rows: MetricTriple,
    pub read_bytes: MetricTriple,
    pub update_rows: MetricTriple,
    pub update_bytes: MetricTriple,
}
