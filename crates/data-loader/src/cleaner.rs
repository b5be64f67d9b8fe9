//! Row cleaning: raw rows in, rating triples out.
//!
//! Cleaning is strictly row-local. A row is either turned into a
//! [`RatingTriple`], rejected for a tallied reason, or, when its shape is
//! wrong, reported as [`DataLoadError::MalformedRecord`]. Because no row looks
//! at any other, batches are cleaned in parallel with Rayon and reassembled
//! in input order.

use crate::error::{DataLoadError, Result};
use crate::types::{RatingTriple, RawRow, RowSchema};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Why a well-shaped row produced no triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    MissingUser,
    MissingItem,
    MissingRating,
    InvalidRating,
}

/// Result of cleaning one well-shaped row
#[derive(Debug, Clone, PartialEq)]
pub enum CleanOutcome {
    Accepted(RatingTriple),
    Rejected(RejectReason),
}

/// What a batch does when it meets a malformed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Abort the batch with the first malformed row's error
    #[default]
    Fail,
    /// Skip the row and count it
    Skip,
}

/// Per-reason counts of rows that did not become triples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionTally {
    pub missing_user: usize,
    pub missing_item: usize,
    pub missing_rating: usize,
    pub invalid_rating: usize,
    /// Rows skipped under [`MalformedPolicy::Skip`]
    pub malformed: usize,
}

impl RejectionTally {
    pub fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::MissingUser => self.missing_user += 1,
            RejectReason::MissingItem => self.missing_item += 1,
            RejectReason::MissingRating => self.missing_rating += 1,
            RejectReason::InvalidRating => self.invalid_rating += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.missing_user
            + self.missing_item
            + self.missing_rating
            + self.invalid_rating
            + self.malformed
    }
}

/// Triples produced from a batch plus the rejection tally
#[derive(Debug, Clone, Default)]
pub struct CleanedBatch {
    pub triples: Vec<RatingTriple>,
    pub rejected: RejectionTally,
    /// Number of rows that went into the cleaner
    pub rows_seen: usize,
}

/// Turns raw rows into canonical rating triples.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCleaner {
    schema: RowSchema,
    policy: MalformedPolicy,
}

impl RecordCleaner {
    pub fn new(schema: RowSchema, policy: MalformedPolicy) -> Self {
        Self { schema, policy }
    }

    pub fn schema(&self) -> RowSchema {
        self.schema
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    /// Clean a single row.
    ///
    /// Returns `Err` only when the row's width differs from the schema's.
    pub fn clean_row(&self, row: &RawRow) -> Result<CleanOutcome> {
        if row.fields.len() != self.schema.width() {
            return Err(DataLoadError::MalformedRecord {
                line: row.line,
                expected: self.schema.width(),
                found: row.fields.len(),
            });
        }

        let user = row.fields[self.schema.user()].trim();
        if user.is_empty() {
            return Ok(CleanOutcome::Rejected(RejectReason::MissingUser));
        }

        let item = row.fields[self.schema.item()].trim();
        if item.is_empty() {
            return Ok(CleanOutcome::Rejected(RejectReason::MissingItem));
        }

        let rating = match parse_rating(&row.fields[self.schema.rating()]) {
            Ok(value) => value,
            Err(reason) => return Ok(CleanOutcome::Rejected(reason)),
        };

        Ok(CleanOutcome::Accepted(RatingTriple::new(user, item, rating)))
    }

    /// Clean a whole batch, preserving the order of accepted rows.
    pub fn clean_all(&self, rows: &[RawRow]) -> Result<CleanedBatch> {
        let outcomes: Vec<Result<CleanOutcome>> =
            rows.par_iter().map(|row| self.clean_row(row)).collect();

        let mut batch = CleanedBatch {
            triples: Vec::with_capacity(rows.len()),
            rejected: RejectionTally::default(),
            rows_seen: rows.len(),
        };

        for outcome in outcomes {
            match outcome {
                Ok(CleanOutcome::Accepted(triple)) => batch.triples.push(triple),
                Ok(CleanOutcome::Rejected(reason)) => batch.rejected.record(reason),
                Err(err @ DataLoadError::MalformedRecord { .. }) => match self.policy {
                    MalformedPolicy::Fail => return Err(err),
                    MalformedPolicy::Skip => {
                        tracing::warn!("Skipping row: {}", err);
                        batch.rejected.malformed += 1;
                    }
                },
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            "Cleaned {} rows: {} accepted, {} rejected",
            batch.rows_seen,
            batch.triples.len(),
            batch.rejected.total()
        );
        Ok(batch)
    }
}

/// Coerce a rating field into a finite number
fn parse_rating(raw: &str) -> std::result::Result<f32, RejectReason> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RejectReason::MissingRating);
    }
    match trimmed.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(RejectReason::InvalidRating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaner() -> RecordCleaner {
        RecordCleaner::new(RowSchema::positional(), MalformedPolicy::Fail)
    }

    #[test]
    fn test_accepts_and_trims() {
        let row = RawRow::from_strs(2, &["  276725 ", "034545104X\t", " 0 "]);
        let outcome = cleaner().clean_row(&row).unwrap();
        assert_eq!(
            outcome,
            CleanOutcome::Accepted(RatingTriple::new("276725", "034545104X", 0.0))
        );
    }

    #[test]
    fn test_identifiers_are_not_numeric() {
        let row = RawRow::from_strs(2, &["007", "0001", "5"]);
        match cleaner().clean_row(&row).unwrap() {
            CleanOutcome::Accepted(t) => {
                assert_eq!(t.user_id, "007");
                assert_eq!(t.item_id, "0001");
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_rejects_blank_identifiers() {
        let c = cleaner();
        assert_eq!(
            c.clean_row(&RawRow::from_strs(1, &["   ", "i1", "4"])).unwrap(),
            CleanOutcome::Rejected(RejectReason::MissingUser)
        );
        assert_eq!(
            c.clean_row(&RawRow::from_strs(1, &["u1", "", "4"])).unwrap(),
            CleanOutcome::Rejected(RejectReason::MissingItem)
        );
    }

    #[test]
    fn test_rejects_bad_ratings() {
        let c = cleaner();
        assert_eq!(
            c.clean_row(&RawRow::from_strs(1, &["u1", "i1", " "])).unwrap(),
            CleanOutcome::Rejected(RejectReason::MissingRating)
        );
        for bad in ["five", "NaN", "inf", "4,5"] {
            assert_eq!(
                c.clean_row(&RawRow::from_strs(1, &["u1", "i1", bad])).unwrap(),
                CleanOutcome::Rejected(RejectReason::InvalidRating),
                "rating {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_wrong_width_is_malformed() {
        let err = cleaner()
            .clean_row(&RawRow::from_strs(7, &["u1", "i1"]))
            .unwrap_err();
        match err {
            DataLoadError::MalformedRecord { line, expected, found } => {
                assert_eq!(line, 7);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_schema_selects_columns() {
        let schema = RowSchema::new(2, 0, 3, 4).unwrap();
        let c = RecordCleaner::new(schema, MalformedPolicy::Fail);
        let row = RawRow::from_strs(1, &["book", "ignored", "reader", "8"]);
        assert_eq!(
            c.clean_row(&row).unwrap(),
            CleanOutcome::Accepted(RatingTriple::new("reader", "book", 8.0))
        );
    }

    #[test]
    fn test_deserialized_schema_cannot_reach_past_row() {
        // a schema pointing past its width is refused before it can index a row
        let schema =
            serde_json::from_str::<RowSchema>(r#"{"user": 5, "item": 1, "rating": 2, "width": 3}"#);
        assert!(schema.is_err());

        let schema: RowSchema =
            serde_json::from_str(r#"{"user": 2, "item": 1, "rating": 0, "width": 3}"#).unwrap();
        let c = RecordCleaner::new(schema, MalformedPolicy::Fail);
        assert_eq!(
            c.clean_row(&RawRow::from_strs(1, &["4", "i1", "u1"])).unwrap(),
            CleanOutcome::Accepted(RatingTriple::new("u1", "i1", 4.0))
        );
    }

    #[test]
    fn test_batch_tallies_and_keeps_order() {
        let rows = vec![
            RawRow::from_strs(2, &["u1", "i1", "5"]),
            RawRow::from_strs(3, &["", "i2", "3"]),
            RawRow::from_strs(4, &["u2", "i1", "x"]),
            RawRow::from_strs(5, &["u3", "i3", "1"]),
            RawRow::from_strs(6, &["u4", "", ""]),
        ];
        let batch = cleaner().clean_all(&rows).unwrap();

        assert_eq!(batch.rows_seen, 5);
        assert_eq!(
            batch.triples,
            vec![
                RatingTriple::new("u1", "i1", 5.0),
                RatingTriple::new("u3", "i3", 1.0),
            ]
        );
        assert_eq!(batch.rejected.missing_user, 1);
        assert_eq!(batch.rejected.invalid_rating, 1);
        assert_eq!(batch.rejected.missing_item, 1);
        assert_eq!(batch.rejected.total(), 3);
    }

    #[test]
    fn test_batch_fail_policy_stops_on_malformed() {
        let rows = vec![
            RawRow::from_strs(2, &["u1", "i1", "5"]),
            RawRow::from_strs(3, &["u1", "i1", "5", "extra"]),
        ];
        let err = cleaner().clean_all(&rows).unwrap_err();
        assert!(matches!(err, DataLoadError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn test_batch_skip_policy_counts_malformed() {
        let rows = vec![
            RawRow::from_strs(2, &["u1", "i1", "5"]),
            RawRow::from_strs(3, &["u1"]),
            RawRow::from_strs(4, &["u2", "i2", "4"]),
        ];
        let c = RecordCleaner::new(RowSchema::positional(), MalformedPolicy::Skip);
        let batch = c.clean_all(&rows).unwrap();
        assert_eq!(batch.triples.len(), 2);
        assert_eq!(batch.rejected.malformed, 1);
        assert_eq!(batch.rejected.total(), 1);
    }
}
