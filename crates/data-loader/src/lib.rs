//! # Data Loader Crate
//!
//! This crate turns raw rating files into clean `(user, item, rating)`
//! triples ready for the sparsity pipeline.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (RatingTriple, RawRow, RowSchema)
//! - **parser**: Read delimited, Latin-1 encoded ratings files into raw rows
//! - **cleaner**: Row-local cleaning with rejection tallies
//! - **summary**: Descriptive statistics over cleaned triples
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{parser, MalformedPolicy, RecordCleaner, SourceOptions};
//! use std::path::Path;
//!
//! let file = parser::read_ratings(Path::new("data/Ratings.csv"), &SourceOptions::default())?;
//! let cleaner = RecordCleaner::new(file.schema, MalformedPolicy::Skip);
//! let batch = cleaner.clean_all(&file.rows)?;
//!
//! println!("{} triples, {} rejected", batch.triples.len(), batch.rejected.total());
//! ```

// Public modules
pub mod cleaner;
pub mod error;
pub mod parser;
pub mod summary;
pub mod types;

// Re-export commonly used types for convenience
pub use cleaner::{
    CleanOutcome, CleanedBatch, MalformedPolicy, RecordCleaner, RejectReason, RejectionTally,
};
pub use error::{DataLoadError, Result};
pub use parser::{RatingsFile, SourceOptions};
pub use summary::RatingsSummary;
pub use types::{ItemId, RatingTriple, RawRow, RowSchema, UserId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_to_triples() {
        let data = "User-ID;ISBN;Book-Rating\n\
                    u1;i1;5\n\
                    ;i2;3\n\
                    u2;i1;oops\n\
                    u3;i3\n\
                    u4;i1;2\n";
        let options = SourceOptions {
            delimiter: b';',
            ..SourceOptions::default()
        };
        let file = parser::read_ratings_from_reader(data.as_bytes(), &options).unwrap();
        let cleaner = RecordCleaner::new(file.schema, MalformedPolicy::Skip);
        let batch = cleaner.clean_all(&file.rows).unwrap();

        assert_eq!(batch.rows_seen, 5);
        assert_eq!(
            batch.triples,
            vec![
                RatingTriple::new("u1", "i1", 5.0),
                RatingTriple::new("u4", "i1", 2.0),
            ]
        );
        assert_eq!(batch.rejected.missing_user, 1);
        assert_eq!(batch.rejected.invalid_rating, 1);
        assert_eq!(batch.rejected.malformed, 1);
    }
}
