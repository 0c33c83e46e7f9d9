//! End-to-end processing: expand inputs, load, filter, aggregate, emit.

use std::path::{Component, Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::cli::Cli;
use crate::error::{MetricsError, Result};
use crate::{filter, loader, output, report, stats};

/// Expand FILES arguments: existing paths pass through, everything else
/// is treated as a glob over its parent directory.
///
/// A pattern matching nothing only warns; an empty overall result is an
/// error.
pub fn expand_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.exists() {
            files.push(path.to_path_buf());
            continue;
        }
        let matched = expand_glob(pattern)?;
        if matched.is_empty() {
            eprintln!("Warning: No files matched pattern '{pattern}'");
        }
        files.extend(matched);
    }
    if files.is_empty() {
        return Err(MetricsError::NoInputFiles);
    }
    Ok(files)
}

fn component_has_wildcards(component: &str) -> bool {
    component.contains(['*', '?', '[', '{'])
}

fn compile_component(component: &str, pattern: &str) -> Result<GlobMatcher> {
    Ok(GlobBuilder::new(component)
        .literal_separator(true)
        .build()
        .map_err(|e| MetricsError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?
        .compile_matcher())
}

/// Expand a pattern component-wise, so wildcards work in directory
/// components too (`logs/2025-*/top*.tsv`). Literal components are
/// joined as-is; each wildcard component fans out over the directory
/// entries matching it.
fn expand_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut candidates: Vec<PathBuf> = vec![PathBuf::new()];

    for component in Path::new(pattern).components() {
        let text = match component {
            Component::Normal(name) => name.to_string_lossy().into_owned(),
            other => {
                // Root, prefix and dot components are never wildcards.
                for candidate in &mut candidates {
                    candidate.push(other.as_os_str());
                }
                continue;
            }
        };

        if !component_has_wildcards(&text) {
            for candidate in &mut candidates {
                candidate.push(&text);
            }
            continue;
        }

        let matcher = compile_component(&text, pattern)?;
        let mut expanded = Vec::new();
        for candidate in &candidates {
            let dir = if candidate.as_os_str().is_empty() {
                Path::new(".")
            } else {
                candidate.as_path()
            };
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.filter_map(|entry| entry.ok()) {
                if matcher.is_match(entry.file_name().to_string_lossy().as_ref()) {
                    expanded.push(entry.path());
                }
            }
        }
        candidates = expanded;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
    }

    let mut matched: Vec<PathBuf> = candidates.into_iter().filter(|p| p.is_file()).collect();
    matched.sort();
    Ok(matched)
}

/// Run the whole pipeline for a parsed command line.
pub fn process_files(args: &Cli) -> Result<()> {
    let files = expand_files(&args.files)?;

    let mut records = Vec::new();
    for path in &files {
        match loader::load_file(path, args.format) {
            Ok(mut file_records) => {
                tracing::debug!(path = %path.display(), rows = file_records.len(), "loaded file");
                records.append(&mut file_records);
            }
            Err(e) => eprintln!("Error processing file {}: {}", path.display(), e),
        }
    }
    if records.is_empty() {
        return Err(MetricsError::NoData);
    }
    let total_rows = records.len();

    let records = filter::filter_records(records, &args.like, &args.not_like, &args.regex)?;
    let mut entries = stats::calculate_statistics(&records);
    if entries.is_empty() {
        return Err(MetricsError::NoMatches);
    }
    report::sort_statistics(&mut entries, args.sort_by);

    println!("Processed {} rows from {} files.", total_rows, files.len());
    println!("Found {} unique queries after filtering.", entries.len());

    if let Some(output_file) = &args.output {
        output::write_single_file(
            &entries,
            output_file,
            args.no_format,
            args.sort_by,
            args.overwrite,
        )?;
        println!("SQL written to {}", output_file.display());
    } else if args.to_files {
        let dir = output::write_to_directory(
            &entries,
            args.output_dir.as_deref(),
            args.one_file,
            args.no_format,
            args.sort_by,
            args.overwrite,
        )?;
        println!("SQL files written to {}/", dir.display());
    } else {
        output::print_queries(&entries, args.no_format, args.sort_by);
    }
    Ok(())
}
