//! Output sinks: console, one file per query, or a single combined file.
//!
//! Callers hand in entries already sorted by [`sort_statistics`]; the
//! writers only render and place them.
//!
//! [`sort_statistics`]: crate::report::sort_statistics

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MetricsError, Result};
use crate::report::{format_query_with_stats, SortBy};
use crate::stats::QueryStatistics;

/// File name used by `--one-file` directory output.
pub const COMBINED_FILE_NAME: &str = "AllQueries.sql";

/// Print all queries to stdout, numbered and separated by a 120-char rule.
pub fn print_queries(entries: &[QueryStatistics], no_format: bool, sort_by: SortBy) {
    for (i, stats) in entries.iter().enumerate() {
        if i > 0 {
            println!("\n{}\n", "=".repeat(120));
        }
        println!(
            "{}",
            format_query_with_stats(stats, Some(i + 1), no_format, sort_by)
        );
    }
}

/// Default output directory: `output/<YYYYmmdd_HHMMSS>`.
fn default_output_dir() -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    PathBuf::from("output").join(timestamp)
}

/// Refuse to write into a directory that already holds files, unless
/// `overwrite` clears them first.
fn prepare_directory(dir: &Path, overwrite: bool) -> Result<()> {
    let existing: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();

    if existing.is_empty() {
        return Ok(());
    }
    if !overwrite {
        return Err(MetricsError::OutputDirNotEmpty {
            path: dir.to_path_buf(),
        });
    }
    for path in existing {
        if path.is_file() {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Write queries into a directory: `Query001.sql`, `Query002.sql`, ... or
/// a single [`COMBINED_FILE_NAME`] when `one_file` is set.
///
/// Returns the directory written to (relevant when it was defaulted to a
/// timestamped path).
pub fn write_to_directory(
    entries: &[QueryStatistics],
    output_dir: Option<&Path>,
    one_file: bool,
    no_format: bool,
    sort_by: SortBy,
    overwrite: bool,
) -> Result<PathBuf> {
    let dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(default_output_dir);
    fs::create_dir_all(&dir)?;
    prepare_directory(&dir, overwrite)?;

    if one_file {
        fs::write(
            dir.join(COMBINED_FILE_NAME),
            render_combined(entries, no_format, sort_by),
        )?;
    } else {
        for (i, stats) in entries.iter().enumerate() {
            let path = dir.join(format!("Query{:03}.sql", i + 1));
            fs::write(path, format_query_with_stats(stats, None, no_format, sort_by))?;
        }
    }
    Ok(dir)
}

/// Write all queries to one file at an explicit path.
pub fn write_single_file(
    entries: &[QueryStatistics],
    output_file: &Path,
    no_format: bool,
    sort_by: SortBy,
    overwrite: bool,
) -> Result<()> {
    if let Some(parent) = output_file.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    if output_file.exists() {
        if !overwrite {
            return Err(MetricsError::OutputFileExists {
                path: output_file.to_path_buf(),
            });
        }
        fs::remove_file(output_file)?;
    }

    fs::write(output_file, render_combined(entries, no_format, sort_by))?;
    Ok(())
}

/// All queries in one buffer, numbered, separated by a commented rule.
fn render_combined(entries: &[QueryStatistics], no_format: bool, sort_by: SortBy) -> String {
    let mut out = String::new();
    for (i, stats) in entries.iter().enumerate() {
        if i > 0 {
            out.push_str(&format!("\n\n-- {}\n\n", "=".repeat(120)));
        }
        out.push_str(&format_query_with_stats(stats, Some(i + 1), no_format, sort_by));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{MetricTriple, QueryRecord};
    use crate::stats::MICROS_PER_SECOND;
    use tempfile::TempDir;

    fn entries() -> Vec<QueryStatistics> {
        ["SELECT a FROM t1", "SELECT b FROM t2", "SELECT c FROM t3"]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let mut stats = QueryStatistics::new(text.to_string());
                stats.observe(&QueryRecord {
                    query_text: text.to_string(),
                    count: 1.0,
                    duration: MetricTriple::single((3 - i) as f64 * MICROS_PER_SECOND),
                    ..Default::default()
                });
                stats
            })
            .collect()
    }

    #[test]
    fn multi_file_output_names_files_by_rank() {
        let temp = TempDir::new().unwrap();
        let dir = write_to_directory(
            &entries(),
            Some(temp.path()),
            false,
            false,
            SortBy::MaxDuration,
            false,
        )
        .unwrap();
        assert_eq!(dir, temp.path());

        for name in ["Query001.sql", "Query002.sql", "Query003.sql"] {
            let content = fs::read_to_string(dir.join(name)).unwrap();
            assert!(content.contains("/*"));
            assert!(content.contains("Row count:"));
            // Per-file output carries no numbered header.
            assert!(!content.contains("-- Query #"));
        }
    }

    #[test]
    fn one_file_output_writes_combined_file() {
        let temp = TempDir::new().unwrap();
        write_to_directory(
            &entries(),
            Some(temp.path()),
            true,
            false,
            SortBy::MaxDuration,
            false,
        )
        .unwrap();

        let names: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec![COMBINED_FILE_NAME.to_string()]);

        let content = fs::read_to_string(temp.path().join(COMBINED_FILE_NAME)).unwrap();
        let separator = format!("-- {}", "=".repeat(120));
        assert_eq!(content.matches(&separator).count(), 2);
        assert!(content.contains("-- Query #1"));
        assert!(content.contains("-- Query #3"));
    }

    #[test]
    fn nonempty_directory_errors_without_overwrite() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("dummy.txt"), "leftover").unwrap();

        let err = write_to_directory(
            &entries(),
            Some(temp.path()),
            false,
            false,
            SortBy::MaxDuration,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::OutputDirNotEmpty { .. }));
        assert!(temp.path().join("dummy.txt").exists());
    }

    #[test]
    fn overwrite_clears_existing_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("dummy.txt"), "leftover").unwrap();

        write_to_directory(
            &entries(),
            Some(temp.path()),
            false,
            false,
            SortBy::MaxDuration,
            true,
        )
        .unwrap();

        assert!(!temp.path().join("dummy.txt").exists());
        assert!(temp.path().join("Query001.sql").exists());
    }

    #[test]
    fn single_file_writes_and_guards_existing() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out").join("all.sql");

        write_single_file(&entries(), &target, false, SortBy::MaxDuration, false).unwrap();
        assert!(target.exists());

        let err =
            write_single_file(&entries(), &target, false, SortBy::MaxDuration, false).unwrap_err();
        assert!(matches!(err, MetricsError::OutputFileExists { .. }));

        write_single_file(&entries(), &target, false, SortBy::MaxDuration, true).unwrap();
    }
}
