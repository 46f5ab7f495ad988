//! Tolerant streaming CSV record reader.
//!
//! Wraps [`csv::Reader`] so that a bad row costs one row, not the whole
//! load. Unescaped quotes inside fields are kept literally instead of
//! failing the row (real IMDb dumps have thousands of them). Rows with the
//! wrong number of fields or invalid UTF-8 come back as [`SkippedRow`]s and
//! reading continues. Only an I/O failure ends the stream early.

use serde::Serialize;
use std::io::Read;

use crate::error::{LoadError, LoadResult};
use crate::models::RowRecord;

/// A data row that could not be decoded and was left out of the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// 1-based data row number (the header is not counted).
    pub row: usize,
    /// Physical line in the source, when the decoder knows it.
    pub line: Option<u64>,
    pub reason: String,
}

impl std::fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "Row {} (line {}): {}", self.row, line, self.reason),
            None => write!(f, "Row {}: {}", self.row, self.reason),
        }
    }
}

/// One step of the record stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Row(RowRecord),
    Skipped(SkippedRow),
}

/// Lazy, non-restartable reader of CSV data rows.
///
/// The header is consumed on construction and exposed through
/// [`RecordReader::headers`]; it is never yielded as data.
///
/// # Example
/// ```ignore
/// use moviedb::parser::{RecordReader, ReadOutcome};
///
/// let csv = "movie_id,genre\n1,Drama\n2\n3,Comedy\n";
/// let mut reader = RecordReader::new(csv.as_bytes(), "movies_genres")?;
/// assert_eq!(reader.headers(), ["movie_id", "genre"]);
///
/// let outcomes: Vec<_> = reader.collect::<Result<_, _>>()?;
/// assert!(matches!(outcomes[1], ReadOutcome::Skipped(_)));
/// ```
pub struct RecordReader<R> {
    table: &'static str,
    inner: csv::Reader<R>,
    headers: Vec<String>,
    record: csv::StringRecord,
    rows_seen: usize,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    /// Wrap a source and read its header line.
    ///
    /// `table` is only used to label errors.
    pub fn new(source: R, table: &'static str) -> LoadResult<Self> {
        let mut inner = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .quoting(true)
            .double_quote(true)
            .from_reader(source);

        let headers: Vec<String> = inner
            .headers()
            .map_err(|source| LoadError::HeaderRead { table, source })?
            .iter()
            .map(str::to_string)
            .collect();

        if headers.is_empty() {
            return Err(LoadError::MissingHeader { table });
        }

        Ok(Self {
            table,
            inner,
            headers,
            record: csv::StringRecord::new(),
            rows_seen: 0,
            done: false,
        })
    }

    /// Column names from the first line of the source.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows consumed so far, decoded or skipped.
    pub fn rows_seen(&self) -> usize {
        self.rows_seen
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = LoadResult<ReadOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.inner.read_record(&mut self.record) {
            Ok(false) => {
                self.done = true;
                None
            }
            Ok(true) => {
                self.rows_seen += 1;
                let fields = self.record.iter().map(str::to_string).collect();
                Some(Ok(ReadOutcome::Row(RowRecord::new(self.rows_seen, fields))))
            }
            Err(err) if err.is_io_error() => {
                self.done = true;
                Some(Err(LoadError::SourceRead {
                    table: self.table,
                    source: err,
                }))
            }
            Err(err) => {
                self.rows_seen += 1;
                Some(Ok(ReadOutcome::Skipped(skipped_row(self.rows_seen, &err))))
            }
        }
    }
}

fn skipped_row(row: usize, err: &csv::Error) -> SkippedRow {
    let reason = match err.kind() {
        csv::ErrorKind::UnequalLengths { expected_len, len, .. } => {
            format!("expected {} fields, found {}", expected_len, len)
        }
        csv::ErrorKind::Utf8 { err, .. } => {
            format!("invalid UTF-8 in field {}", err.field() + 1)
        }
        _ => err.to_string(),
    };

    SkippedRow {
        row,
        line: err.position().map(|pos| pos.line()),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Hands out `data`, then fails every read.
    struct FailAfter {
        data: io::Cursor<Vec<u8>>,
    }

    impl Read for FailAfter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "disk gone")),
                n => Ok(n),
            }
        }
    }

    fn collect(csv: &[u8]) -> (Vec<String>, Vec<ReadOutcome>) {
        let reader = RecordReader::new(csv, "movies").unwrap();
        let headers = reader.headers().to_vec();
        let outcomes = reader.collect::<Result<Vec<_>, _>>().unwrap();
        (headers, outcomes)
    }

    fn rows(outcomes: &[ReadOutcome]) -> Vec<&RowRecord> {
        outcomes
            .iter()
            .filter_map(|o| match o {
                ReadOutcome::Row(r) => Some(r),
                ReadOutcome::Skipped(_) => None,
            })
            .collect()
    }

    fn skips(outcomes: &[ReadOutcome]) -> Vec<&SkippedRow> {
        outcomes
            .iter()
            .filter_map(|o| match o {
                ReadOutcome::Skipped(s) => Some(s),
                ReadOutcome::Row(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_header_is_not_data() {
        let (headers, outcomes) = collect(b"id,name,year,rank\n1,Alien,1979,8.5\n");
        assert_eq!(headers, vec!["id", "name", "year", "rank"]);
        assert_eq!(outcomes.len(), 1);
        let first = rows(&outcomes)[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.fields, vec!["1", "Alien", "1979", "8.5"]);
    }

    #[test]
    fn test_bare_quote_in_unquoted_field_is_kept() {
        let (_, outcomes) = collect(b"id,name,year,rank\n37,The \"Best\" Movie,2001,7.5\n");
        let read = rows(&outcomes);
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].fields[1], "The \"Best\" Movie");
    }

    #[test]
    fn test_bare_quote_in_quoted_field_is_tolerated() {
        let (_, outcomes) = collect(b"id,name,year,rank\n5,\"Say \"Hi\" now\",2001,7.0\n");
        assert!(skips(&outcomes).is_empty());
        let read = rows(&outcomes);
        assert_eq!(read[0].fields.len(), 4);
        assert_eq!(read[0].fields[2], "2001");
    }

    #[test]
    fn test_escaped_quotes_and_embedded_commas() {
        let (_, outcomes) =
            collect(b"id,name,year,rank\n6,\"Crouching Tiger, \"\"Hidden\"\" Dragon\",2000,7.9\n");
        assert_eq!(rows(&outcomes)[0].fields[1], "Crouching Tiger, \"Hidden\" Dragon");
    }

    #[test]
    fn test_wrong_field_count_is_skipped_and_reading_continues() {
        let (_, outcomes) = collect(b"id,name,year,rank\n1,A,2000,1.0\n2,B,2001\n3,C,2002,3.0\n");
        let skipped = skips(&outcomes);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].row, 2);
        assert!(skipped[0].line.is_some());
        assert!(skipped[0].reason.contains("expected 4 fields, found 3"));

        let read = rows(&outcomes);
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].number, 3);
        assert_eq!(read[1].fields[1], "C");
    }

    #[test]
    fn test_invalid_utf8_is_skipped() {
        let (_, outcomes) = collect(b"id,name,year,rank\n1,Caf\xe9,2000,1.0\n2,Ok,2001,2.0\n");
        let skipped = skips(&outcomes);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].row, 1);
        assert!(skipped[0].reason.contains("UTF-8"));
        assert_eq!(rows(&outcomes).len(), 1);
    }

    #[test]
    fn test_blank_lines_ignored() {
        let (_, outcomes) = collect(b"id,name,year,rank\n1,A,2000,1.0\n\n2,B,2001,2.0\n");
        assert_eq!(rows(&outcomes).len(), 2);
        assert!(skips(&outcomes).is_empty());
    }

    #[test]
    fn test_empty_source_has_no_header() {
        let result = RecordReader::new(&b""[..], "movies");
        assert!(matches!(result, Err(LoadError::MissingHeader { table: "movies" })));
    }

    #[test]
    fn test_header_only_source_yields_nothing() {
        let (headers, outcomes) = collect(b"movie_id,genre\n");
        assert_eq!(headers.len(), 2);
        assert!(outcomes.is_empty());
    }

    #[test]
    fn test_rows_seen_counts_skips() {
        let mut reader = RecordReader::new(&b"movie_id,genre\n1,Drama\n2\n"[..], "movies_genres").unwrap();
        while reader.next().is_some() {}
        assert_eq!(reader.rows_seen(), 2);
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_io_failure_ends_the_stream_once() {
        let source = FailAfter { data: io::Cursor::new(b"id,name,year,rank\n1,A,2000,1.0\n".to_vec()) };
        let mut reader = RecordReader::new(source, "movies").unwrap();

        let outcomes: Vec<_> = reader.by_ref().collect();
        let errors: Vec<_> = outcomes.iter().filter(|o| o.is_err()).collect();
        assert_eq!(errors.len(), 1);
        match outcomes.last() {
            Some(Err(LoadError::SourceRead { table, source })) => {
                assert_eq!(*table, "movies");
                assert!(source.is_io_error());
                assert!(source.to_string().contains("disk gone"));
            }
            other => panic!("unexpected last outcome: {other:?}"),
        }
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_skipped_row_display() {
        let skip = SkippedRow { row: 4, line: Some(5), reason: "bad".into() };
        assert_eq!(skip.to_string(), "Row 4 (line 5): bad");
    }
}
