//! Per-query metric aggregation.
//!
//! Records are grouped by exact query text. Each metric keeps a running
//! min/max/sum; averages are weighted by the `Count` column so that
//! pre-aggregated `query_metrics` intervals and single-execution
//! `top_queries` rows combine correctly.

use std::collections::HashMap;

use crate::dataset::{MetricTriple, QueryRecord};

/// YDB reports Duration and CPUTime in microseconds; displayed in seconds.
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Running min/avg/max statistics for a single metric.
///
/// `min` and `max` are stored in display units (divided by `scale`); the
/// sum is kept in source units and only scaled when computing the average.
#[derive(Debug, Clone)]
pub struct MetricStats {
    min: f64,
    max: f64,
    sum: f64,
    scale: f64,
    label: &'static str,
    total_count: f64,
}

impl MetricStats {
    fn new(label: &'static str, scale: f64) -> Self {
        Self {
            min: f64::INFINITY,
            max: 0.0,
            sum: 0.0,
            scale,
            label,
            total_count: 0.0,
        }
    }

    /// Display label, e.g. `Duration (s)`.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Minimum observed value in display units; 0 before any observation.
    pub fn min(&self) -> f64 {
        if self.min.is_finite() {
            self.min
        } else {
            0.0
        }
    }

    /// Maximum observed value in display units.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Count-weighted average in display units; 0 with no observations.
    pub fn avg(&self) -> f64 {
        if self.total_count > 0.0 {
            self.sum / (self.total_count * self.scale)
        } else {
            0.0
        }
    }

    fn observe(&mut self, triple: &MetricTriple, count: f64) {
        self.total_count += count;
        self.min = self.min.min(triple.min / self.scale);
        self.max = self.max.max(triple.max / self.scale);
        self.sum += triple.sum;
    }
}

/// Aggregated statistics for one unique query text.
#[derive(Debug, Clone)]
pub struct QueryStatistics {
    pub query_text: String,
    /// Number of input rows aggregated into this entry.
    pub row_count: usize,
    /// Sum of the `Count` column over those rows.
    pub total_count: f64,
    pub duration: MetricStats,
    pub cpu_time: MetricStats,
    pub read_rows: MetricStats,
    pub read_bytes: MetricStats,
    pub update_rows: MetricStats,
    pub update_bytes: MetricStats,
}

impl QueryStatistics {
    pub fn new(query_text: String) -> Self {
        Self {
            query_text,
            row_count: 0,
            total_count: 0.0,
            duration: MetricStats::new("Duration (s)", MICROS_PER_SECOND),
            cpu_time: MetricStats::new("CPUTime (s)", MICROS_PER_SECOND),
            read_rows: MetricStats::new("ReadRows", 1.0),
            read_bytes: MetricStats::new("ReadBytes", 1.0),
            update_rows: MetricStats::new("UpdateRows", 1.0),
            update_bytes: MetricStats::new("UpdateBytes", 1.0),
        }
    }

    /// Average read rows per second of average duration.
    pub fn rows_per_second(&self) -> f64 {
        if self.duration.avg() > 0.0 {
            self.read_rows.avg() / self.duration.avg()
        } else {
            0.0
        }
    }

    /// Average read bytes per average read row.
    pub fn bytes_per_row(&self) -> f64 {
        if self.read_rows.avg() > 0.0 {
            self.read_bytes.avg() / self.read_rows.avg()
        } else {
            0.0
        }
    }

    pub fn observe(&mut self, record: &QueryRecord) {
        self.row_count += 1;
        self.total_count += record.count;
        self.duration.observe(&record.duration, record.count);
        self.cpu_time.observe(&record.cpu_time, record.count);
        self.read_rows.observe(&record.read_rows, record.count);
        self.read_bytes.observe(&record.read_bytes, record.count);
        self.update_rows.observe(&record.update_rows, record.count);
        self.update_bytes.observe(&record.update_bytes, record.count);
    }
}

/// Group records by query text, skipping rows with blank text.
///
/// The returned entries keep first-seen order; callers sort by metric
/// before rendering.
pub fn calculate_statistics(records: &[QueryRecord]) -> Vec<QueryStatistics> {
    let mut by_text: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<QueryStatistics> = Vec::new();

    for record in records {
        if record.query_text.trim().is_empty() {
            continue;
        }
        let slot = *by_text.entry(record.query_text.as_str()).or_insert_with(|| {
            entries.push(QueryStatistics::new(record.query_text.clone()));
            entries.len() - 1
        });
        entries[slot].observe(record);
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str, count: f64, duration: (f64, f64, f64)) -> QueryRecord {
        QueryRecord {
            query_text: text.to_string(),
            count,
            duration: MetricTriple {
                min: duration.0,
                max: duration.1,
                sum: duration.2,
            },
            ..Default::default()
        }
    }

    #[test]
    fn observe_scales_min_and_max_but_not_sum() {
        let mut stats = MetricStats::new("Test", 10.0);
        stats.observe(
            &MetricTriple {
                min: 50.0,
                max: 100.0,
                sum: 150.0,
            },
            2.0,
        );

        assert_eq!(stats.min(), 5.0);
        assert_eq!(stats.max(), 10.0);
        // avg = 150 / (2 * 10)
        assert_eq!(stats.avg(), 7.5);

        stats.observe(
            &MetricTriple {
                min: 30.0,
                max: 200.0,
                sum: 250.0,
            },
            3.0,
        );

        assert_eq!(stats.min(), 3.0);
        assert_eq!(stats.max(), 20.0);
        // avg = 400 / (5 * 10)
        assert_eq!(stats.avg(), 8.0);
    }

    #[test]
    fn avg_is_zero_with_no_observations() {
        let stats = MetricStats::new("Test", 10.0);
        assert_eq!(stats.avg(), 0.0);
        assert_eq!(stats.min(), 0.0);
        assert_eq!(stats.max(), 0.0);
    }

    #[test]
    fn time_metrics_use_seconds_labels() {
        let stats = QueryStatistics::new("SELECT 1".into());
        assert_eq!(stats.duration.label(), "Duration (s)");
        assert_eq!(stats.cpu_time.label(), "CPUTime (s)");
        assert_eq!(stats.read_rows.label(), "ReadRows");
    }

    #[test]
    fn grouping_by_query_text() {
        let records = vec![
            record("SELECT a", 1.0, (100.0, 500.0, 600.0)),
            record("SELECT b", 2.0, (200.0, 600.0, 800.0)),
            record("SELECT a", 3.0, (50.0, 700.0, 900.0)),
        ];
        let entries = calculate_statistics(&records);
        assert_eq!(entries.len(), 2);

        let a = entries.iter().find(|e| e.query_text == "SELECT a").unwrap();
        assert_eq!(a.row_count, 2);
        assert_eq!(a.total_count, 4.0);
        assert_eq!(a.duration.min() * MICROS_PER_SECOND, 50.0);
        assert_eq!(a.duration.max() * MICROS_PER_SECOND, 700.0);
    }

    #[test]
    fn blank_query_text_is_skipped() {
        let records = vec![
            record("", 1.0, (0.0, 0.0, 0.0)),
            record("   ", 1.0, (0.0, 0.0, 0.0)),
            record("SELECT 1", 1.0, (0.0, 0.0, 0.0)),
        ];
        let entries = calculate_statistics(&records);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query_text, "SELECT 1");
    }

    #[test]
    fn derived_metrics() {
        let mut stats = QueryStatistics::new("SELECT 1".into());
        stats.observe(&QueryRecord {
            query_text: "SELECT 1".into(),
            count: 1.0,
            // 2 seconds in micros
            duration: MetricTriple::single(2.0 * MICROS_PER_SECOND),
            read_rows: MetricTriple::single(100.0),
            read_bytes: MetricTriple::single(1000.0),
            ..Default::default()
        });

        assert_eq!(stats.rows_per_second(), 50.0);
        assert_eq!(stats.bytes_per_row(), 10.0);
    }

    #[test]
    fn derived_metrics_guard_zero_denominators() {
        let stats = QueryStatistics::new("SELECT 1".into());
        assert_eq!(stats.rows_per_second(), 0.0);
        assert_eq!(stats.bytes_per_row(), 0.0);
    }
}
