//! Error types for the movie database loader.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`StorageError`] - Opening the database, creating the schema, running reports
//! - [`LoadError`] - Loading one CSV source into one table
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Row decode failures are *not* errors: the record reader reports them as
//! [`crate::parser::SkippedRow`] and ingestion carries on.
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors from the SQLite storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to create the scratch directory.
    #[error("Failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),

    /// Failed to open or create the database file.
    #[error("Failed to open database '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// DDL execution failed.
    #[error("Failed to create schema: {0}")]
    Schema(#[source] rusqlite::Error),

    /// Failed to apply a connection pragma.
    #[error("Failed to configure connection: {0}")]
    Pragma(#[source] rusqlite::Error),

    /// A reporting query failed.
    #[error("Report '{report}' failed: {source}")]
    Query {
        report: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors that abort the load of a single table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Table name is not one of the known tables.
    #[error("Unknown table: '{0}' (expected 'movies' or 'movies_genres')")]
    UnknownTable(String),

    /// The CSV source could not be opened.
    #[error("Cannot open '{}': {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source has no header line.
    #[error("No header line found for table '{table}'")]
    MissingHeader { table: &'static str },

    /// The header line could not be decoded.
    #[error("Cannot read header for table '{table}': {source}")]
    HeaderRead {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    /// Header names do not match the table's columns.
    #[error("Unexpected CSV headers for table '{table}': expected [{}], found [{}]", .expected.join(", "), .found.join(", "))]
    SchemaMismatch {
        table: &'static str,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Batch capacity is zero or needs more bound parameters than SQLite allows.
    #[error("Invalid batch size {size} for table '{table}' (must be between 1 and {max})")]
    InvalidBatchSize {
        table: &'static str,
        size: usize,
        max: usize,
    },

    /// The source failed mid-stream.
    #[error("Failed reading source for table '{table}': {source}")]
    SourceRead {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    /// The load transaction could not be started.
    #[error("Failed to start transaction for table '{table}': {source}")]
    Begin {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// A multi-row insert was rejected; the whole load was rolled back.
    #[error("Insert of rows {first_row}-{last_row} into '{table}' failed, load rolled back: {source}")]
    BatchInsert {
        table: &'static str,
        first_row: usize,
        last_row: usize,
        #[source]
        source: rusqlite::Error,
    },

    /// The final commit was rejected; the load was rolled back.
    #[error("Commit of table '{table}' failed, load rolled back: {source}")]
    Commit {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    /// The transaction already reached a terminal state.
    #[error("Transaction for table '{table}' is already closed")]
    TransactionClosed { table: &'static str },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// Returned by [`crate::pipeline::run`]. Per-table load failures are
/// recorded in the run summary instead; only failures that prevent the run
/// itself end up here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Load error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for table loads.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let load_err = LoadError::MissingHeader { table: "movies" };
        let pipeline_err: PipelineError = load_err.into();
        assert!(pipeline_err.to_string().contains("movies"));

        let storage_err = StorageError::Schema(rusqlite::Error::InvalidQuery);
        let pipeline_err: PipelineError = storage_err.into();
        assert!(pipeline_err.to_string().contains("schema"));
    }

    #[test]
    fn test_schema_mismatch_format() {
        let err = LoadError::SchemaMismatch {
            table: "movies",
            expected: vec!["id".into(), "name".into()],
            found: vec!["name".into(), "id".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("expected [id, name]"));
        assert!(msg.contains("found [name, id]"));
    }

    #[test]
    fn test_batch_insert_names_row_range() {
        let err = LoadError::BatchInsert {
            table: "movies",
            first_row: 401,
            last_row: 500,
            source: rusqlite::Error::InvalidQuery,
        };
        assert!(err.to_string().contains("rows 401-500"));
    }
}
