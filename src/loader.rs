//! TSV loading: encoding detection, header/format detection, and parsing
//! into canonical [`QueryRecord`]s.
//!
//! YDB exports arrive in two shapes (`query_metrics` and `top_queries`),
//! with or without a header row, and occasionally re-encoded to UTF-16 by
//! spreadsheet round-trips. The loader detects all of that and hands back
//! one uniform record type.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::dataset::{
    FileFormat, MetricTriple, QueryRecord, QUERY_METRICS_COLUMNS, TOP_QUERIES_COLUMNS,
};
use crate::error::{MetricsError, Result};

/// Text encodings recognized by BOM sniffing, plus the last-resort fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Utf8,
    Utf8Sig,
    Utf16Le,
    Utf16Be,
    Latin1,
}

/// Cell values that mark a first row as a header row.
const HEADER_INDICATORS: [&str; 4] = ["QueryText", "MaxDuration", "Duration", "IntervalEnd"];

/// Load a TSV file, detecting encoding and format, and normalize every row
/// to the `query_metrics` shape.
///
/// When decoding or parsing with the BOM-detected encoding fails, the
/// remaining encodings are tried in turn before the original error is
/// surfaced.
pub fn load_file(path: &Path, format_hint: Option<FileFormat>) -> Result<Vec<QueryRecord>> {
    let bytes = fs::read(path).map_err(|e| MetricsError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let detected = detect_encoding(&bytes);
    match load_with_encoding(&bytes, detected, format_hint, path) {
        Ok(records) => Ok(records),
        Err(first_err) => {
            for fallback in [
                Encoding::Utf8,
                Encoding::Utf16Le,
                Encoding::Utf16Be,
                Encoding::Latin1,
            ] {
                if fallback == detected {
                    continue;
                }
                if let Ok(records) = load_with_encoding(&bytes, fallback, format_hint, path) {
                    tracing::debug!(?fallback, path = %path.display(), "loaded with fallback encoding");
                    return Ok(records);
                }
            }
            Err(first_err)
        }
    }
}

fn load_with_encoding(
    bytes: &[u8],
    encoding: Encoding,
    format_hint: Option<FileFormat>,
    path: &Path,
) -> Result<Vec<QueryRecord>> {
    let content = decode(bytes, encoding).map_err(|message| MetricsError::LoadError {
        path: path.to_path_buf(),
        message,
    })?;
    parse_content(&content, format_hint, path)
}

/// Sniff the byte order mark. UTF-8 without a BOM is the default.
fn detect_encoding(bytes: &[u8]) -> Encoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Encoding::Utf8Sig
    } else if bytes.starts_with(&[0xFF, 0xFE]) {
        Encoding::Utf16Le
    } else if bytes.starts_with(&[0xFE, 0xFF]) {
        Encoding::Utf16Be
    } else {
        Encoding::Utf8
    }
}

fn decode(bytes: &[u8], encoding: Encoding) -> std::result::Result<String, String> {
    match encoding {
        Encoding::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string()),
        Encoding::Utf8Sig => {
            let body = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF][..]).unwrap_or(bytes);
            String::from_utf8(body.to_vec()).map_err(|e| e.to_string())
        }
        Encoding::Utf16Le | Encoding::Utf16Be => {
            let bom = if encoding == Encoding::Utf16Le {
                &[0xFF, 0xFE][..]
            } else {
                &[0xFE, 0xFF][..]
            };
            let body = bytes.strip_prefix(bom).unwrap_or(bytes);
            if body.len() % 2 != 0 {
                return Err("odd byte length for UTF-16 data".to_string());
            }
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| {
                    if encoding == Encoding::Utf16Le {
                        u16::from_le_bytes([pair[0], pair[1]])
                    } else {
                        u16::from_be_bytes([pair[0], pair[1]])
                    }
                })
                .collect();
            String::from_utf16(&units).map_err(|e| e.to_string())
        }
        // Latin1 maps every byte to the code point of the same value.
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Parse decoded TSV content into canonical records.
fn parse_content(
    content: &str,
    format_hint: Option<FileFormat>,
    path: &Path,
) -> Result<Vec<QueryRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let rows: Vec<csv::StringRecord> = reader
        .records()
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| MetricsError::LoadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let headers_present = has_header_row(first);
    let format = match format_hint {
        Some(format) => format,
        None => detect_format(first, path)?,
    };

    let columns: Vec<String> = if headers_present {
        first.iter().map(|cell| cell.trim().to_string()).collect()
    } else {
        match format {
            FileFormat::QueryMetrics => QUERY_METRICS_COLUMNS
                .iter()
                .map(|name| name.to_string())
                .collect(),
            FileFormat::TopQueries => TOP_QUERIES_COLUMNS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    };

    let index = ColumnIndex::new(&columns);
    let data = if headers_present { &rows[1..] } else { &rows[..] };

    let records = data
        .iter()
        .map(|row| match format {
            FileFormat::QueryMetrics => query_metrics_record(row, &index),
            FileFormat::TopQueries => top_queries_record(row, &index),
        })
        .collect();
    Ok(records)
}

/// A first row naming any well-known column is a header row.
fn has_header_row(row: &csv::StringRecord) -> bool {
    row.iter()
        .any(|cell| HEADER_INDICATORS.contains(&cell.trim()))
}

/// Decide the format from first-row column names, falling back to the
/// column count for headerless files.
fn detect_format(first: &csv::StringRecord, path: &Path) -> Result<FileFormat> {
    let values: Vec<&str> = first.iter().map(|cell| cell.trim()).collect();

    if values.contains(&"MinDuration") && values.contains(&"MaxDuration") {
        return Ok(FileFormat::QueryMetrics);
    }
    if values.contains(&"CPUTime") && values.contains(&"Duration") {
        return Ok(FileFormat::TopQueries);
    }

    match first.len() {
        28 => Ok(FileFormat::QueryMetrics),
        29 => Ok(FileFormat::TopQueries),
        _ => Err(MetricsError::FormatDetection {
            path: path.to_path_buf(),
        }),
    }
}

/// Name-to-position lookup for one file's column layout.
struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(columns: &[String]) -> Self {
        let positions = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { positions }
    }

    fn text(&self, row: &csv::StringRecord, name: &str) -> String {
        self.positions
            .get(name)
            .and_then(|&i| row.get(i))
            .unwrap_or("")
            .to_string()
    }

    /// Numeric cell value; unparseable, empty or ragged-short cells
    /// coerce to 0, a column absent from the layout yields `missing`.
    fn numeric(&self, row: &csv::StringRecord, name: &str, missing: f64) -> f64 {
        match self.positions.get(name) {
            Some(&i) => row
                .get(i)
                .and_then(|cell| cell.trim().parse::<f64>().ok())
                .unwrap_or(0.0),
            None => missing,
        }
    }

    fn triple(&self, row: &csv::StringRecord, metric: &str) -> MetricTriple {
        MetricTriple {
            min: self.numeric(row, &format!("Min{metric}"), 0.0),
            max: self.numeric(row, &format!("Max{metric}"), 0.0),
            sum: self.numeric(row, &format!("Sum{metric}"), 0.0),
        }
    }
}

fn query_metrics_record(row: &csv::StringRecord, index: &ColumnIndex) -> QueryRecord {
    QueryRecord {
        query_text: index.text(row, "QueryText"),
        count: index.numeric(row, "Count", 1.0),
        duration: index.triple(row, "Duration"),
        cpu_time: index.triple(row, "CPUTime"),
        read_rows: index.triple(row, "ReadRows"),
        read_bytes: index.triple(row, "ReadBytes"),
        update_rows: index.triple(row, "UpdateRows"),
        update_bytes: index.triple(row, "UpdateBytes"),
    }
}

/// One `top_queries` row describes a single execution: every metric
/// collapses to min = max = sum = value and counts as one.
fn top_queries_record(row: &csv::StringRecord, index: &ColumnIndex) -> QueryRecord {
    QueryRecord {
        query_text: index.text(row, "QueryText"),
        count: 1.0,
        duration: MetricTriple::single(index.numeric(row, "Duration", 0.0)),
        cpu_time: MetricTriple::single(index.numeric(row, "CPUTime", 0.0)),
        read_rows: MetricTriple::single(index.numeric(row, "ReadRows", 0.0)),
        read_bytes: MetricTriple::single(index.numeric(row, "ReadBytes", 0.0)),
        update_rows: MetricTriple::single(index.numeric(row, "UpdateRows", 0.0)),
        update_bytes: MetricTriple::single(index.numeric(row, "UpdateBytes", 0.0)),
    }
}
