//! Batch accumulator.
//!
//! Groups decoded rows into fixed-capacity batches, each inserted with one
//! multi-row `INSERT` statement. The statement text grows with the buffer so
//! that it always has exactly one `(?, ...)` tuple per buffered row.
//!
//! ```text
//! offer() ──▶ [row, row, ... row] ──full──▶ flush_if_full() ──▶ Batch
//!                      │
//!                      └──end of stream──▶ flush_remainder() ──▶ Batch (1..capacity-1 rows)
//! ```

use crate::error::{LoadError, LoadResult};
use crate::models::{RowRecord, TableSpec};

/// Rows per batch unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Upper bound on bound parameters in one SQLite statement.
pub const MAX_BOUND_PARAMETERS: usize = 32_766;

/// A group of rows ready for one insert statement.
///
/// Always holds between 1 and the accumulator's capacity rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    rows: Vec<RowRecord>,
    sql: String,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    /// Insert statement with one placeholder tuple per row.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Data row number of the first row.
    pub fn first_row(&self) -> usize {
        self.rows.first().map_or(0, |r| r.number)
    }

    /// Data row number of the last row.
    pub fn last_row(&self) -> usize {
        self.rows.last().map_or(0, |r| r.number)
    }

    /// All field values in row-major order, matching the placeholders.
    pub fn values(&self) -> impl Iterator<Item = &String> + '_ {
        self.rows.iter().flat_map(|r| r.fields.iter())
    }
}

/// Collects rows for one table into batches.
#[derive(Debug)]
pub struct BatchAccumulator {
    spec: TableSpec,
    capacity: usize,
    rows: Vec<RowRecord>,
    prefix: String,
    tuple: String,
    sql: String,
}

impl BatchAccumulator {
    /// Create an accumulator for `spec` holding at most `capacity` rows.
    pub fn new(spec: TableSpec, capacity: usize) -> LoadResult<Self> {
        let max = MAX_BOUND_PARAMETERS / spec.column_count().max(1);
        if capacity == 0 || capacity > max {
            return Err(LoadError::InvalidBatchSize {
                table: spec.name,
                size: capacity,
                max,
            });
        }

        let prefix = format!(
            "INSERT INTO {} ({}) VALUES ",
            spec.name,
            spec.columns.join(", ")
        );
        let tuple = format!("({})", vec!["?"; spec.column_count()].join(", "));

        Ok(Self {
            spec,
            capacity,
            rows: Vec::with_capacity(capacity),
            sql: prefix.clone(),
            prefix,
            tuple,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rows.len() >= self.capacity
    }

    /// Statement text for the rows buffered so far.
    pub fn pending_sql(&self) -> &str {
        &self.sql
    }

    /// Buffer a row.
    ///
    /// Callers flush with [`flush_if_full`](Self::flush_if_full) after each
    /// offer; the buffer never holds more than `capacity` rows at that point.
    pub fn offer(&mut self, row: RowRecord) {
        debug_assert_eq!(row.fields.len(), self.spec.column_count());
        debug_assert!(!self.is_full());

        if !self.rows.is_empty() {
            self.sql.push_str(", ");
        }
        self.sql.push_str(&self.tuple);
        self.rows.push(row);
    }

    /// Hand out the buffer if it reached capacity.
    pub fn flush_if_full(&mut self) -> Option<Batch> {
        if self.is_full() {
            self.take()
        } else {
            None
        }
    }

    /// Hand out whatever is left at end of stream, if anything.
    pub fn flush_remainder(&mut self) -> Option<Batch> {
        self.take()
    }

    /// Give a flushed batch's row buffer back for reuse.
    pub fn reclaim(&mut self, batch: Batch) {
        if self.rows.is_empty() {
            let mut rows = batch.rows;
            rows.clear();
            self.rows = rows;
        }
    }

    fn take(&mut self) -> Option<Batch> {
        if self.rows.is_empty() {
            return None;
        }
        let rows = std::mem::take(&mut self.rows);
        let sql = std::mem::replace(&mut self.sql, self.prefix.clone());
        Some(Batch { rows, sql })
    }
}
