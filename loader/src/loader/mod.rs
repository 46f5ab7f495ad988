//! Transactional table loader.
//!
//! One transaction covers the whole load of one table from one source.
//! Rows go in as multi-row `INSERT`s of up to `batch_size` rows each, so
//! the number of statements is `rows / batch_size` instead of `rows`.
//!
//! ```text
//! begin ──▶ InProgress ──commit ok──▶ Committed
//!              │  ▲
//!              └──┘ insert_batch ok
//!              │
//!              └──insert / commit error──▶ RolledBack
//! ```
//!
//! The first failing batch rolls back everything loaded so far, earlier
//! batches included. There are no retries.

use rusqlite::{params_from_iter, Connection, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

use crate::batch::{Batch, BatchAccumulator, DEFAULT_BATCH_SIZE};
use crate::error::{LoadError, LoadResult};
use crate::logs::{log_detail, log_info, log_success, log_warning_indent};
use crate::models::{TableKind, TableSpec};
use crate::parser::{ReadOutcome, RecordReader, SkippedRow};
use crate::validation::check_headers;

/// Options for loading one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Rows per insert statement
    pub batch_size: usize,

    /// How many skipped rows to keep in the report (all are counted)
    pub max_reported_skips: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            max_reported_skips: 100,
        }
    }
}

/// Outcome of a successful table load
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub table: &'static str,
    /// Data rows read from the source, decoded or skipped
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub rows_inserted: usize,
    pub batches: usize,
    pub elapsed_ms: u64,
    /// First skipped rows, up to `max_reported_skips`
    pub skipped: Vec<SkippedRow>,
}

impl LoadReport {
    fn new(table: &'static str) -> Self {
        Self {
            table,
            rows_read: 0,
            rows_skipped: 0,
            rows_inserted: 0,
            batches: 0,
            elapsed_ms: 0,
            skipped: Vec::new(),
        }
    }

    fn record_skip(&mut self, skip: SkippedRow, keep: usize) {
        self.rows_skipped += 1;
        if self.skipped.len() < keep {
            self.skipped.push(skip);
        }
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{}: {} rows read, {} inserted, {} skipped in {} batches ({} ms)",
            self.table,
            self.rows_read,
            self.rows_inserted,
            self.rows_skipped,
            self.batches,
            self.elapsed_ms
        )
    }
}

/// Where a load transaction stands.
///
/// A [`TableLoader`] only exists once its transaction is open, so it starts
/// out `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    InProgress,
    Committed,
    RolledBack,
}

/// A load transaction for one table.
///
/// Dropping a loader that is still in progress rolls the transaction back.
pub struct TableLoader<'conn> {
    spec: TableSpec,
    tx: Option<Transaction<'conn>>,
    state: LoadState,
    inserted: usize,
}

impl<'conn> TableLoader<'conn> {
    /// Open the transaction for `spec`.
    pub fn begin(conn: &'conn mut Connection, spec: TableSpec) -> LoadResult<Self> {
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|source| LoadError::Begin { table: spec.name, source })?;

        Ok(Self {
            spec,
            tx: Some(tx),
            state: LoadState::InProgress,
            inserted: 0,
        })
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Rows inserted so far in this transaction.
    pub fn inserted(&self) -> usize {
        self.inserted
    }

    /// Insert one batch with a single statement.
    ///
    /// On failure the whole transaction is rolled back and the error names
    /// the batch's row range.
    pub fn insert_batch(&mut self, batch: &Batch) -> LoadResult<usize> {
        let result = {
            let tx = self
                .tx
                .as_ref()
                .ok_or(LoadError::TransactionClosed { table: self.spec.name })?;
            tx.prepare_cached(batch.sql())
                .and_then(|mut stmt| stmt.execute(params_from_iter(batch.values())))
        };

        match result {
            Ok(count) => {
                self.inserted += count;
                Ok(count)
            }
            Err(source) => {
                self.rollback();
                Err(LoadError::BatchInsert {
                    table: self.spec.name,
                    first_row: batch.first_row(),
                    last_row: batch.last_row(),
                    source,
                })
            }
        }
    }

    /// Commit everything inserted and return the number of rows.
    pub fn commit(mut self) -> LoadResult<usize> {
        let tx = self
            .tx
            .take()
            .ok_or(LoadError::TransactionClosed { table: self.spec.name })?;

        match tx.commit() {
            Ok(()) => {
                self.state = LoadState::Committed;
                Ok(self.inserted)
            }
            Err(source) => {
                // `Transaction` rolled itself back when commit() dropped it.
                self.state = LoadState::RolledBack;
                Err(LoadError::Commit { table: self.spec.name, source })
            }
        }
    }

    /// Abandon the load.
    pub fn rollback(&mut self) {
        if let Some(tx) = self.tx.take() {
            if let Err(e) = tx.rollback() {
                log_warning_indent(format!("Rollback of '{}' failed: {}", self.spec.name, e), 1);
            }
        }
        self.state = LoadState::RolledBack;
    }
}

impl Drop for TableLoader<'_> {
    fn drop(&mut self) {
        if self.state == LoadState::InProgress {
            self.rollback();
        }
    }
}

/// Load one CSV file into its table.
pub fn load_csv_file(
    conn: &mut Connection,
    kind: TableKind,
    path: &Path,
    options: &LoadOptions,
) -> LoadResult<LoadReport> {
    let file = File::open(path).map_err(|source| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    log_info(format!("📖 Loading {} from {}", kind, path.display()));
    load_table(conn, kind, BufReader::new(file), options)
}

/// Load one CSV source into its table.
///
/// Reads the header, validates it, then streams rows through a
/// [`BatchAccumulator`] into a single [`TableLoader`] transaction. Rows that
/// fail to decode are skipped and reported; anything else aborts the load
/// with nothing committed.
pub fn load_table<R: Read>(
    conn: &mut Connection,
    kind: TableKind,
    source: R,
    options: &LoadOptions,
) -> LoadResult<LoadReport> {
    let started = Instant::now();
    let spec = kind.spec();

    let mut reader = RecordReader::new(source, spec.name)?;
    check_headers(kind, reader.headers())?;

    let mut acc = BatchAccumulator::new(spec, options.batch_size)?;
    let mut loader = TableLoader::begin(conn, spec)?;
    let mut report = LoadReport::new(spec.name);

    for outcome in &mut reader {
        match outcome? {
            ReadOutcome::Row(row) => {
                acc.offer(row);
                if let Some(batch) = acc.flush_if_full() {
                    insert(&mut loader, &mut report, &batch)?;
                    acc.reclaim(batch);
                }
            }
            ReadOutcome::Skipped(skip) => {
                log_warning_indent(format!("Skipping problematic row: {}", skip), 1);
                report.record_skip(skip, options.max_reported_skips);
            }
        }
    }

    if let Some(batch) = acc.flush_remainder() {
        insert(&mut loader, &mut report, &batch)?;
    }

    report.rows_read = reader.rows_seen();
    report.rows_inserted = loader.commit()?;
    report.elapsed_ms = started.elapsed().as_millis() as u64;

    log_success(report.summary());
    Ok(report)
}

fn insert(loader: &mut TableLoader<'_>, report: &mut LoadReport, batch: &Batch) -> LoadResult<()> {
    loader.insert_batch(batch)?;
    report.batches += 1;
    log_detail(format!(
        "Inserted rows {}-{} ({} total)",
        batch.first_row(),
        batch.last_row(),
        loader.inserted()
    ));
    Ok(())
}
