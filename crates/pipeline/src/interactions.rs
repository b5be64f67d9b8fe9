//! Rewriting filtered ratings into dense interaction records.

use crate::error::{Axis, PipelineError, Result};
use crate::index_map::{DenseIndex, IndexMap};
use crate::sparsity::FilteredRatingSet;
use serde::{Deserialize, Serialize};

/// One rating addressed by matrix position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub user_idx: DenseIndex,
    pub item_idx: DenseIndex,
    pub rating: f32,
}

/// Dimensions of the interaction matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixShape {
    pub n_users: usize,
    pub n_items: usize,
}

/// Interaction records in the same order as the filtered triples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionDataset {
    pub records: Vec<InteractionRecord>,
    pub shape: MatrixShape,
}

/// Rewrites a [`FilteredRatingSet`] through an [`IndexMap`].
#[derive(Debug, Clone, Copy, Default)]
pub struct InteractionMatrixBuilder;

impl InteractionMatrixBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build one record per triple.
    ///
    /// Fails with [`PipelineError::MissingMapping`] if any id is unknown to
    /// the map. With a map built from the same set that cannot happen, so
    /// the error is an internal fault and is never absorbed.
    pub fn build(&self, ratings: &FilteredRatingSet, map: &IndexMap) -> Result<InteractionDataset> {
        let records = ratings
            .iter()
            .map(|triple| {
                let user_idx = map.users.index_of(&triple.user_id).ok_or_else(|| {
                    PipelineError::MissingMapping {
                        axis: Axis::User,
                        id: triple.user_id.clone(),
                    }
                })?;
                let item_idx = map.items.index_of(&triple.item_id).ok_or_else(|| {
                    PipelineError::MissingMapping {
                        axis: Axis::Item,
                        id: triple.item_id.clone(),
                    }
                })?;
                Ok(InteractionRecord {
                    user_idx,
                    item_idx,
                    rating: triple.rating,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(InteractionDataset {
            records,
            shape: MatrixShape {
                n_users: map.n_users(),
                n_items: map.n_items(),
            },
        })
    }
}

impl InteractionDataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw `(user_id, item_id)` of a record, via the reverse maps
    pub fn resolve<'m>(
        &self,
        record: &InteractionRecord,
        map: &'m IndexMap,
    ) -> Option<(&'m str, &'m str)> {
        Some((map.users.id_of(record.user_idx)?, map.items.id_of(record.item_idx)?))
    }
}
