//! Read-only reports over the loaded tables.

use rusqlite::Connection;
use serde::Serialize;

use crate::error::{StorageError, StorageResult};

/// Rows returned by each report.
pub const REPORT_LIMIT: usize = 20;

/// Average rank of the movies in a genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreRating {
    pub genre: String,
    pub average_rank: f64,
    pub movies: i64,
}

/// Number of movies tagged with a genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub movies: i64,
}

const GENRE_RATINGS_SQL: &str = "
SELECT g.genre, AVG(m.rank) AS average_rank, COUNT(*) AS movies
FROM movies m
JOIN movies_genres g ON g.movie_id = m.id
WHERE m.rank IS NOT NULL AND typeof(m.rank) IN ('integer', 'real')
GROUP BY g.genre
ORDER BY average_rank DESC, g.genre ASC
LIMIT ?1
";

const GENRE_COUNTS_SQL: &str = "
SELECT genre, COUNT(*) AS movies
FROM movies_genres
GROUP BY genre
ORDER BY movies DESC, genre ASC
LIMIT ?1
";

/// Top genres by average rank, counting only movies with a numeric rank.
pub fn genre_ratings(conn: &Connection) -> StorageResult<Vec<GenreRating>> {
    let query = |source: rusqlite::Error| StorageError::Query { report: "genre_ratings", source };

    let mut stmt = conn.prepare(GENRE_RATINGS_SQL).map_err(query)?;
    let rows = stmt
        .query_map([REPORT_LIMIT as i64], |row| {
            Ok(GenreRating {
                genre: row.get(0)?,
                average_rank: row.get(1)?,
                movies: row.get(2)?,
            })
        })
        .map_err(query)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(query)
}

/// Top genres by number of movies.
pub fn genre_counts(conn: &Connection) -> StorageResult<Vec<GenreCount>> {
    let query = |source: rusqlite::Error| StorageError::Query { report: "genre_counts", source };

    let mut stmt = conn.prepare(GENRE_COUNTS_SQL).map_err(query)?;
    let rows = stmt
        .query_map([REPORT_LIMIT as i64], |row| {
            Ok(GenreCount {
                genre: row.get(0)?,
                movies: row.get(1)?,
            })
        })
        .map_err(query)?;

    rows.collect::<Result<Vec<_>, _>>().map_err(query)
}
