//! Error types for query metrics processing.
//!
//! This module defines [`MetricsError`], the primary error type used
//! throughout the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `MetricsError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `MetricsError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for query metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// No input file matched the given arguments.
    #[error("No files to process")]
    NoInputFiles,

    /// Input file could not be read or decoded.
    #[error("Failed to load {path}: {message}")]
    LoadError { path: PathBuf, message: String },

    /// Input format could not be determined from headers or column count.
    #[error("Unable to detect file format of {path}")]
    FormatDetection { path: PathBuf },

    /// A `--regex` pattern did not compile.
    #[error("Invalid regex pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// No rows survived loading.
    #[error("No data found in the provided files")]
    NoData,

    /// Every query was removed by the filter chain.
    #[error("No queries matched the filter criteria")]
    NoMatches,

    /// Output directory already holds files and `--overwrite` was not given.
    #[error("Directory '{path}' already contains files. Use --overwrite to replace them.")]
    OutputDirNotEmpty { path: PathBuf },

    /// Output file already exists and `--overwrite` was not given.
    #[error("File '{path}' already exists. Use --overwrite to replace it.")]
    OutputFileExists { path: PathBuf },

    /// Invalid glob pattern in a FILES argument.
    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for query metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;
