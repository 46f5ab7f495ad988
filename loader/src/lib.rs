//! # moviedb - Bulk load IMDb movie CSV dumps into SQLite
//!
//! Loads `movies.csv` and `movies_genres.csv` into a scratch SQLite database
//! with one transaction per table and multi-row batched inserts, skipping
//! rows that cannot be decoded instead of aborting the load.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│   Record    │────▶│   Header    │────▶│    Batch    │────▶│   Table     │
//! │             │     │   Reader    │     │  Validator  │     │ Accumulator │     │   Loader    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!                       (skips bad          (first line        (100 rows per       (one tx per
//!                        rows)               only)              statement)          table)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use moviedb::{load_table, Database, LoadOptions, TableKind};
//!
//! let mut db = Database::open_in_memory()?;
//! db.create_schema()?;
//! let csv = "movie_id,genre\n1,Drama\n";
//! let report = load_table(db.connection_mut(), TableKind::MoviesGenres, csv.as_bytes(), &LoadOptions::default())?;
//! assert_eq!(report.rows_inserted, 1);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Tables and rows
//! - [`parser`] - Tolerant CSV record reader
//! - [`validation`] - Header validation
//! - [`batch`] - Batch accumulator
//! - [`loader`] - Transactional table loader
//! - [`storage`] - SQLite database and scratch directory
//! - [`reports`] - Genre reports
//! - [`pipeline`] - Full run
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod models;

// Ingestion
pub mod parser;
pub mod validation;
pub mod batch;
pub mod loader;

// Storage
pub mod storage;
pub mod reports;

// Orchestration
pub mod pipeline;
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    LoadError,
    LoadResult,
    PipelineError,
    PipelineResult,
    StorageError,
    StorageResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    RowRecord,
    TableKind,
    TableSpec,
    MOVIES,
    MOVIES_GENRES,
};

// =============================================================================
// Re-exports - Ingestion
// =============================================================================

pub use parser::{ReadOutcome, RecordReader, SkippedRow};

pub use validation::{check_headers, validate_headers, validate_headers_for};

pub use batch::{Batch, BatchAccumulator, DEFAULT_BATCH_SIZE};

pub use loader::{
    load_csv_file,
    load_table,
    LoadOptions,
    LoadReport,
    LoadState,
    TableLoader,
};

// =============================================================================
// Re-exports - Storage & reports
// =============================================================================

pub use storage::{Database, ScratchDatabase, SCHEMA};

pub use reports::{genre_counts, genre_ratings, GenreCount, GenreRating};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{run, RunOptions, RunSummary, TableOutcome};
