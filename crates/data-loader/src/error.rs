//! Error types for the data-loader crate.
//!
//! Only structural failures are errors here. A row with a blank identifier
//! or an unreadable rating is not an error: the cleaner rejects it and
//! tallies the reason (see [`crate::cleaner::RejectionTally`]).

use thiserror::Error;

/// Errors that can occur while reading and cleaning rating rows
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The delimited reader itself failed (bad quoting, invalid header, ...)
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// A named column is absent from the header row
    #[error("Missing column '{column}' (available: {available})")]
    MissingColumn { column: String, available: String },

    /// Row shape doesn't match the schema it is read with
    ///
    /// This is the only row-level failure that is not silently absorbed;
    /// whether it aborts the batch is decided by the caller's
    /// [`crate::cleaner::MalformedPolicy`].
    #[error("Malformed record at line {line}: expected {expected} fields but found {found}")]
    MalformedRecord {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A schema addresses a field outside its own width
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
