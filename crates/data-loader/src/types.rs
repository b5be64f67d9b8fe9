//! Core domain types for raw and cleaned rating data.
//!
//! Identifiers are kept as the raw tokens the source produced (trimmed).
//! They are never parsed as numbers: `"007"` and `"7"` are different users.

use crate::error::{DataLoadError, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Type Aliases
// =============================================================================

/// Opaque user identifier, as it appeared in the source
pub type UserId = String;

/// Opaque item identifier, as it appeared in the source
pub type ItemId = String;

// =============================================================================
// Rating Triple
// =============================================================================

/// A single cleaned (user, item, rating) observation.
///
/// Triples are created by the cleaner and are read-only afterwards; every
/// later stage works on borrowed or cloned triples, never mutated ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingTriple {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub rating: f32,
}

impl RatingTriple {
    pub fn new(user_id: impl Into<UserId>, item_id: impl Into<ItemId>, rating: f32) -> Self {
        Self {
            user_id: user_id.into(),
            item_id: item_id.into(),
            rating,
        }
    }
}

// =============================================================================
// Raw Rows
// =============================================================================

/// One structural row exactly as the source produced it.
///
/// `fields` holds the whole record, not just the three interesting columns;
/// a [`RowSchema`] says where those columns live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    /// 1-based line number in the source (header included)
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn new(line: usize, fields: Vec<String>) -> Self {
        Self { line, fields }
    }

    /// Convenience for building rows from string literals
    pub fn from_strs(line: usize, fields: &[&str]) -> Self {
        Self {
            line,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Positions of the user, item and rating fields within a [`RawRow`].
///
/// Fields are private so every schema, deserialized ones included, goes
/// through [`RowSchema::new`] and addresses only positions inside `width`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaFields", into = "SchemaFields")]
pub struct RowSchema {
    user: usize,
    item: usize,
    rating: usize,
    /// Number of fields every well-formed row must have
    width: usize,
}

/// Unchecked wire form of a [`RowSchema`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SchemaFields {
    user: usize,
    item: usize,
    rating: usize,
    width: usize,
}

impl TryFrom<SchemaFields> for RowSchema {
    type Error = DataLoadError;

    fn try_from(f: SchemaFields) -> Result<Self> {
        RowSchema::new(f.user, f.item, f.rating, f.width)
    }
}

impl From<RowSchema> for SchemaFields {
    fn from(s: RowSchema) -> Self {
        Self {
            user: s.user,
            item: s.item,
            rating: s.rating,
            width: s.width,
        }
    }
}

impl RowSchema {
    /// Build a schema, checking that every position lies inside `width`
    /// and that no two fields share a position.
    pub fn new(user: usize, item: usize, rating: usize, width: usize) -> Result<Self> {
        let positions = [user, item, rating];
        if let Some(&pos) = positions.iter().find(|&&p| p >= width) {
            return Err(DataLoadError::InvalidSchema(format!(
                "field position {} is outside row width {}",
                pos, width
            )));
        }
        if user == item || user == rating || item == rating {
            return Err(DataLoadError::InvalidSchema(format!(
                "user, item and rating must use distinct positions (got {}, {}, {})",
                user, item, rating
            )));
        }
        Ok(Self {
            user,
            item,
            rating,
            width,
        })
    }

    /// The plain three-column layout: `user, item, rating`
    pub fn positional() -> Self {
        Self {
            user: 0,
            item: 1,
            rating: 2,
            width: 3,
        }
    }

    pub fn user(&self) -> usize {
        self.user
    }

    pub fn item(&self) -> usize {
        self.item
    }

    pub fn rating(&self) -> usize {
        self.rating
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl Default for RowSchema {
    fn default() -> Self {
        Self::positional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_out_of_range_position() {
        assert!(RowSchema::new(0, 1, 3, 3).is_err());
        assert!(RowSchema::new(0, 1, 2, 3).is_ok());
    }

    #[test]
    fn test_schema_rejects_shared_position() {
        let err = RowSchema::new(1, 1, 2, 4).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidSchema(_)));
    }

    #[test]
    fn test_positional_is_default() {
        assert_eq!(RowSchema::default(), RowSchema::positional());
        assert_eq!(RowSchema::default().width(), 3);
    }

    #[test]
    fn test_deserialized_schema_is_checked() {
        let ok: RowSchema =
            serde_json::from_str(r#"{"user": 2, "item": 0, "rating": 3, "width": 4}"#).unwrap();
        assert_eq!(ok, RowSchema::new(2, 0, 3, 4).unwrap());

        let out_of_range =
            serde_json::from_str::<RowSchema>(r#"{"user": 5, "item": 1, "rating": 2, "width": 3}"#);
        assert!(out_of_range.is_err());

        let shared =
            serde_json::from_str::<RowSchema>(r#"{"user": 0, "item": 0, "rating": 2, "width": 3}"#);
        assert!(shared.is_err());
    }
}
