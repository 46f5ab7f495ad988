//! Domain models for the loader.
//!
//! - [`TableKind`] - The two tables a CSV source can be loaded into
//! - [`TableSpec`] - Name and ordered columns of a table
//! - [`RowRecord`] - One decoded CSV data row

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LoadError;

// =============================================================================
// Tables
// =============================================================================

/// Static description of a target table.
///
/// The loader is generic over this: the table name goes into the insert
/// statement, the columns are both the expected CSV header and the insert
/// column list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub name: &'static str,
    pub columns: &'static [&'static str],
}

impl TableSpec {
    /// Number of columns (and bound parameters per row).
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

pub const MOVIES: TableSpec = TableSpec {
    name: "movies",
    columns: &["id", "name", "year", "rank"],
};

pub const MOVIES_GENRES: TableSpec = TableSpec {
    name: "movies_genres",
    columns: &["movie_id", "genre"],
};

/// A table that can be loaded from CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Movies,
    MoviesGenres,
}

impl TableKind {
    /// All tables, in load order (entities before relations).
    pub const ALL: [TableKind; 2] = [TableKind::Movies, TableKind::MoviesGenres];

    pub fn spec(self) -> TableSpec {
        match self {
            TableKind::Movies => MOVIES,
            TableKind::MoviesGenres => MOVIES_GENRES,
        }
    }

    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableKind {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movies" => Ok(TableKind::Movies),
            "movies_genres" => Ok(TableKind::MoviesGenres),
            other => Err(LoadError::UnknownTable(other.to_string())),
        }
    }
}

// =============================================================================
// Rows
// =============================================================================

/// A decoded CSV data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRecord {
    /// 1-based data row number (the header is not counted).
    pub number: usize,
    /// Raw field values, in column order.
    pub fields: Vec<String>,
}

impl RowRecord {
    pub fn new(number: usize, fields: Vec<String>) -> Self {
        Self { number, fields }
    }
}
