//! High-level run: scratch database, both loads, reports.
//!
//! # Example
//!
//! ```rust,ignore
//! use moviedb::pipeline::{run, RunOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let summary = run(&RunOptions::default())?;
//!     println!("{}", serde_json::to_string_pretty(&summary)?);
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::PipelineResult;
use crate::loader::{load_csv_file, LoadOptions, LoadReport};
use crate::logs::{log_error, log_info, log_success, log_warning};
use crate::models::TableKind;
use crate::reports::{genre_counts, genre_ratings, GenreCount, GenreRating};
use crate::storage::ScratchDatabase;

/// Options for a full run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    /// CSV source for the `movies` table
    pub movies_csv: PathBuf,

    /// CSV source for the `movies_genres` table
    pub genres_csv: PathBuf,

    /// Per-table load options
    pub load: LoadOptions,

    /// Have SQLite enforce the `movies_genres.movie_id` foreign key
    pub enforce_foreign_keys: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            movies_csv: PathBuf::from("001-IMDb/IMDB-movies.csv"),
            genres_csv: PathBuf::from("001-IMDb/IMDB-movies_genres.csv"),
            load: LoadOptions::default(),
            enforce_foreign_keys: false,
        }
    }
}

impl RunOptions {
    fn source(&self, kind: TableKind) -> &PathBuf {
        match kind {
            TableKind::Movies => &self.movies_csv,
            TableKind::MoviesGenres => &self.genres_csv,
        }
    }
}

/// What happened to one table
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TableOutcome {
    Loaded { report: LoadReport },
    Failed { table: TableKind, error: String },
    NotAttempted { table: TableKind },
}

impl TableOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, TableOutcome::Loaded { .. })
    }
}

/// Result of a full run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    /// Database file used for the run (deleted when the run ends)
    pub database: PathBuf,
    pub tables: Vec<TableOutcome>,
    /// Present only when every table loaded
    pub genre_ratings: Option<Vec<GenreRating>>,
    pub genre_counts: Option<Vec<GenreCount>>,
    /// Set when the loads succeeded but a report query did not
    pub report_error: Option<String>,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        self.tables.iter().all(TableOutcome::is_loaded) && self.report_error.is_none()
    }

    fn attach_reports(&mut self, conn: &Connection) {
        log_info("📊 Running reports...");
        let reports = genre_ratings(conn).and_then(|ratings| Ok((ratings, genre_counts(conn)?)));
        match reports {
            Ok((ratings, counts)) => {
                self.genre_ratings = Some(ratings);
                self.genre_counts = Some(counts);
            }
            Err(e) => {
                log_error(format!("Reports failed: {}", e));
                self.report_error = Some(e.to_string());
            }
        }
    }
}

/// Load both tables into a scratch database and run the reports.
///
/// Tables load one after the other, `movies` first. A failed load is
/// recorded in the summary and the remaining tables are not attempted, and
/// so is a failing report query. Only errors that prevent the run itself
/// (temp directory, schema, pragma) are returned as `Err`. The scratch database is removed before returning.
pub fn run(options: &RunOptions) -> PipelineResult<RunSummary> {
    let started_at = Utc::now();

    let mut scratch = ScratchDatabase::create()?;
    if options.enforce_foreign_keys {
        scratch.db().set_foreign_keys(true)?;
    }
    let database = scratch
        .db()
        .path()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    log_success(format!("Database schema created at {}", database.display()));

    let mut tables = Vec::with_capacity(TableKind::ALL.len());
    let mut failed = false;

    for kind in TableKind::ALL {
        if failed {
            log_warning(format!("Not loading {}: previous table failed", kind));
            tables.push(TableOutcome::NotAttempted { table: kind });
            continue;
        }

        let conn = scratch.db_mut().connection_mut();
        match load_csv_file(conn, kind, options.source(kind), &options.load) {
            Ok(report) => tables.push(TableOutcome::Loaded { report }),
            Err(e) => {
                log_error(format!("Loading {} failed: {}", kind, e));
                tables.push(TableOutcome::Failed { table: kind, error: e.to_string() });
                failed = true;
            }
        }
    }

    let mut summary = RunSummary {
        started_at,
        database,
        tables,
        genre_ratings: None,
        genre_counts: None,
        report_error: None,
    };
    if !failed {
        summary.attach_reports(scratch.db().connection());
    }
    Ok(summary)
}
