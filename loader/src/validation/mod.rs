//! Header validation for CSV sources.
//!
//! The first line of every source must name the target table's columns,
//! exactly and in order. Nothing is ingested from a source that fails this
//! check.

use crate::error::{LoadError, LoadResult};
use crate::models::TableKind;

/// Check observed header names against a table's columns.
///
/// Exact and order-sensitive: swapped, missing, or extra columns all fail.
///
/// # Example
/// ```ignore
/// use moviedb::{validate_headers, TableKind};
///
/// assert!(validate_headers(TableKind::MoviesGenres, &["movie_id", "genre"]));
/// assert!(!validate_headers(TableKind::MoviesGenres, &["genre", "movie_id"]));
/// ```
pub fn validate_headers<S: AsRef<str>>(kind: TableKind, observed: &[S]) -> bool {
    let expected = kind.spec().columns;
    observed.len() == expected.len()
        && observed
            .iter()
            .zip(expected)
            .all(|(found, want)| found.as_ref() == *want)
}

/// Same as [`validate_headers`], but returns an error describing the mismatch.
pub fn check_headers<S: AsRef<str>>(kind: TableKind, observed: &[S]) -> LoadResult<()> {
    if validate_headers(kind, observed) {
        return Ok(());
    }

    let spec = kind.spec();
    Err(LoadError::SchemaMismatch {
        table: spec.name,
        expected: spec.columns.iter().map(|c| c.to_string()).collect(),
        found: observed.iter().map(|h| h.as_ref().to_string()).collect(),
    })
}

/// Validate headers for a table given by name.
///
/// Unknown table names are an error, never a silent `false`.
pub fn validate_headers_for(table: &str, observed: &[&str]) -> LoadResult<bool> {
    let kind: TableKind = table.parse()?;
    Ok(validate_headers(kind, observed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_headers_accepted() {
        assert!(validate_headers(TableKind::Movies, &["id", "name", "year", "rank"]));
        assert!(validate_headers(TableKind::MoviesGenres, &["movie_id", "genre"]));
    }

    #[test]
    fn test_permutation_rejected() {
        assert!(!validate_headers(TableKind::Movies, &["name", "id", "year", "rank"]));
        assert!(!validate_headers(TableKind::Movies, &["id", "name", "rank", "year"]));
        assert!(!validate_headers(TableKind::MoviesGenres, &["genre", "movie_id"]));
    }

    #[test]
    fn test_subset_and_superset_rejected() {
        assert!(!validate_headers(TableKind::Movies, &["id", "name", "year"]));
        assert!(!validate_headers(
            TableKind::Movies,
            &["id", "name", "year", "rank", "votes"]
        ));
        assert!(!validate_headers::<&str>(TableKind::MoviesGenres, &[]));
    }

    #[test]
    fn test_wrong_table_rejected() {
        assert!(!validate_headers(TableKind::Movies, &["movie_id", "genre"]));
        assert!(!validate_headers(TableKind::MoviesGenres, &["id", "name", "year", "rank"]));
    }

    #[test]
    fn test_case_and_whitespace_matter() {
        assert!(!validate_headers(TableKind::Movies, &["ID", "name", "year", "rank"]));
        assert!(!validate_headers(TableKind::Movies, &["id", " name", "year", "rank"]));
    }

    #[test]
    fn test_check_headers_reports_mismatch() {
        let err = check_headers(TableKind::Movies, &["name", "id", "year", "rank"]).unwrap_err();
        match err {
            LoadError::SchemaMismatch { table, expected, found } => {
                assert_eq!(table, "movies");
                assert_eq!(expected, vec!["id", "name", "year", "rank"]);
                assert_eq!(found, vec!["name", "id", "year", "rank"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_table_by_name() {
        assert!(validate_headers_for("movies", &["id", "name", "year", "rank"]).unwrap());
        assert!(!validate_headers_for("movies_genres", &["id"]).unwrap());
        assert!(matches!(
            validate_headers_for("actors", &["id"]),
            Err(LoadError::UnknownTable(_))
        ));
    }
}
