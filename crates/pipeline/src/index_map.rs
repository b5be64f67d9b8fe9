//! Dense index assignment for users and items.
//!
//! Every surviving id gets a position in `[0, N)`. Ids are ordered by the
//! raw bytes of their token before numbering, so `"10"` sorts before `"9"`.
//! Numeric-looking ids are deliberately not compared as numbers: the source
//! data mixes ISBN-style tokens with digits-only ones, and a byte order is
//! total for both.

use crate::error::PipelineError;
use crate::sparsity::FilteredRatingSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Row or column position in the interaction matrix
pub type DenseIndex = usize;

/// An immutable bijection between a set of ids and `0..len()`.
///
/// Both directions are built together from the same ordered list and
/// nothing can mutate either one afterwards. Serializes as the ordered id
/// list; position in the list is the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct IdIndex {
    ids: Vec<String>,
    positions: HashMap<String, DenseIndex>,
}

impl IdIndex {
    /// Number ids in sorted order, ignoring duplicates
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ids: Vec<String> = ids.into_iter().map(str::to_string).collect();
        ids.sort_unstable();
        ids.dedup();

        let positions = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        Self { ids, positions }
    }

    /// Forward lookup
    pub fn index_of(&self, id: &str) -> Option<DenseIndex> {
        self.positions.get(id).copied()
    }

    /// Reverse lookup
    pub fn id_of(&self, idx: DenseIndex) -> Option<&str> {
        self.ids.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in index order
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// `(index, id)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (DenseIndex, &str)> {
        self.ids.iter().map(String::as_str).enumerate()
    }
}

impl TryFrom<Vec<String>> for IdIndex {
    type Error = PipelineError;

    /// Rebuild an index from a stored id list, keeping its order
    fn try_from(ids: Vec<String>) -> Result<Self, Self::Error> {
        let mut positions = HashMap::with_capacity(ids.len());
        for (idx, id) in ids.iter().enumerate() {
            if positions.insert(id.clone(), idx).is_some() {
                return Err(PipelineError::DuplicateId { id: id.clone() });
            }
        }
        Ok(Self { ids, positions })
    }
}

impl From<IdIndex> for Vec<String> {
    fn from(index: IdIndex) -> Self {
        index.ids
    }
}

/// User and item bijections for one filtered rating set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMap {
    pub users: IdIndex,
    pub items: IdIndex,
}

impl IndexMap {
    pub fn n_users(&self) -> usize {
        self.users.len()
    }

    pub fn n_items(&self) -> usize {
        self.items.len()
    }
}

/// Builds an [`IndexMap`] covering exactly the ids of a filtered set.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexMapper;

impl IndexMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, ratings: &FilteredRatingSet) -> IndexMap {
        let users = IdIndex::from_ids(ratings.iter().map(|t| t.user_id.as_str()));
        let items = IdIndex::from_ids(ratings.iter().map(|t| t.item_id.as_str()));

        tracing::info!(
            "Indexed {} users and {} items",
            users.len(),
            items.len()
        );
        IndexMap { users, items }
    }
}
