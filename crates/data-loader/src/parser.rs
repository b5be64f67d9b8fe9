//! Reader for delimited ratings files.
//!
//! The Book-Crossing style dumps this crate targets look like:
//!
//! ```text
//! "User-ID";"ISBN";"Book-Rating"
//! "276725";"034545104X";"0"
//! ```
//!
//! They are Latin-1 encoded, so the file is read as bytes and every byte is
//! mapped to the Unicode code point of the same value before the CSV reader
//! sees it. The reader runs in `flexible` mode: ragged rows are passed on
//! untouched and the cleaner reports them as malformed.

use crate::error::{DataLoadError, Result};
use crate::types::{RawRow, RowSchema};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How to read a ratings file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOptions {
    pub delimiter: u8,
    /// When false the file is read positionally as `user, item, rating`
    pub has_header: bool,
    pub user_column: String,
    pub item_column: String,
    pub rating_column: String,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            user_column: "User-ID".to_string(),
            item_column: "ISBN".to_string(),
            rating_column: "Book-Rating".to_string(),
        }
    }
}

/// Raw rows of a ratings file together with the schema to read them with
#[derive(Debug, Clone)]
pub struct RatingsFile {
    pub schema: RowSchema,
    pub rows: Vec<RawRow>,
}

/// Read a ratings file from disk
pub fn read_ratings(path: &Path, options: &SourceOptions) -> Result<RatingsFile> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    let ratings = read_ratings_from_reader(file, options)?;
    tracing::info!(
        "Read {} rows from {}",
        ratings.rows.len(),
        path.display()
    );
    Ok(ratings)
}

/// Read ratings from any byte source
pub fn read_ratings_from_reader<R: Read>(
    mut reader: R,
    options: &SourceOptions,
) -> Result<RatingsFile> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let content = decode_latin1(&bytes);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(options.has_header)
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let schema = if options.has_header {
        resolve_schema(csv_reader.headers()?, options)?
    } else {
        RowSchema::positional()
    };

    // Line numbers count the header row when there is one
    let first_line = if options.has_header { 2 } else { 1 };

    let mut rows = Vec::new();
    for (idx, record) in csv_reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(first_line + idx);
        rows.push(RawRow::new(
            line,
            record.iter().map(|field| field.to_string()).collect(),
        ));
    }

    Ok(RatingsFile { schema, rows })
}

/// Map header names to field positions
fn resolve_schema(headers: &csv::StringRecord, options: &SourceOptions) -> Result<RowSchema> {
    let position = |column: &str| {
        headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| DataLoadError::MissingColumn {
                column: column.to_string(),
                available: headers.iter().collect::<Vec<_>>().join(", "),
            })
    };

    RowSchema::new(
        position(&options.user_column)?,
        position(&options.item_column)?,
        position(&options.rating_column)?,
        headers.len(),
    )
}

/// ISO-8859-1 is a single-byte encoding where each byte is its own code point
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn semicolon() -> SourceOptions {
        SourceOptions {
            delimiter: b';',
            ..SourceOptions::default()
        }
    }

    #[test]
    fn test_reads_quoted_semicolon_file() {
        let data = "\"User-ID\";\"ISBN\";\"Book-Rating\"\n\
                    \"276725\";\"034545104X\";\"0\"\n\
                    \"276726\";\"0155061224\";\"5\"\n";
        let file = read_ratings_from_reader(data.as_bytes(), &semicolon()).unwrap();

        assert_eq!(file.schema, RowSchema::positional());
        assert_eq!(file.rows.len(), 2);
        assert_eq!(file.rows[0].line, 2);
        assert_eq!(file.rows[0].fields, vec!["276725", "034545104X", "0"]);
        assert_eq!(file.rows[1].line, 3);
    }

    #[test]
    fn test_resolves_columns_by_name() {
        let data = "ISBN,Extra,User-ID,Book-Rating\nb1,x,u1,7\n";
        let file = read_ratings_from_reader(data.as_bytes(), &SourceOptions::default()).unwrap();
        assert_eq!(file.schema, RowSchema::new(2, 0, 3, 4).unwrap());
    }

    #[test]
    fn test_missing_column() {
        let data = "user,item,score\nu1,i1,3\n";
        let err = read_ratings_from_reader(data.as_bytes(), &SourceOptions::default()).unwrap_err();
        match err {
            DataLoadError::MissingColumn { column, available } => {
                assert_eq!(column, "User-ID");
                assert_eq!(available, "user, item, score");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_ragged_rows_pass_through() {
        let data = "User-ID,ISBN,Book-Rating\nu1,i1\nu2,i2,4\n";
        let file = read_ratings_from_reader(data.as_bytes(), &SourceOptions::default()).unwrap();
        assert_eq!(file.rows.len(), 2);
        assert_eq!(file.rows[0].fields.len(), 2);
        assert_eq!(file.rows[1].fields.len(), 3);
    }

    #[test]
    fn test_headerless_is_positional() {
        let options = SourceOptions {
            has_header: false,
            ..SourceOptions::default()
        };
        let file = read_ratings_from_reader("u1,i1,3\n".as_bytes(), &options).unwrap();
        assert_eq!(file.schema, RowSchema::positional());
        assert_eq!(file.rows[0].line, 1);
    }

    #[test]
    fn test_latin1_bytes_decode() {
        let bytes = b"User-ID,ISBN,Book-Rating\nJos\xe9,i1,4\n";
        let file = read_ratings_from_reader(&bytes[..], &SourceOptions::default()).unwrap();
        assert_eq!(file.rows[0].fields[0], "José");
    }

    #[test]
    fn test_missing_file() {
        let err = read_ratings(Path::new("does/not/exist.csv"), &SourceOptions::default())
            .unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }
}
