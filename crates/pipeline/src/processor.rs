//! End-to-end orchestration of the preparation stages.
//!
//! ## Stages
//! 1. RecordCleaner turns raw rows into triples (rejections are tallied)
//! 2. SparsityFilter shrinks the triples to their fixed point
//! 3. IndexMapper numbers the surviving users and items
//! 4. InteractionMatrixBuilder rewrites the triples as dense records
//!
//! Each stage consumes the previous stage's output in full before the next
//! one starts. Nothing is shared between runs: every call returns a new
//! filtered set and a new map.

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::index_map::{IndexMap, IndexMapper};
use crate::interactions::{InteractionDataset, InteractionMatrixBuilder, MatrixShape};
use crate::sparsity::{FilteredRatingSet, SparsityFilter};
use data_loader::{CleanedBatch, RawRow, RecordCleaner, RejectionTally, RowSchema};
use serde::{Deserialize, Serialize};

/// Non-fatal conditions worth telling the caller about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineWarning {
    /// Filtering removed every triple; outputs are valid but empty
    EmptyResult,
}

/// Counters describing one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub min_user_ratings: u32,
    pub min_item_ratings: u32,
    pub rows_seen: usize,
    pub accepted: usize,
    pub rejected: RejectionTally,
    pub filter_passes: usize,
    pub dropped_by_filter: usize,
    pub surviving: usize,
    pub shape: MatrixShape,
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineReport {
    pub fn is_empty_result(&self) -> bool {
        self.warnings.contains(&PipelineWarning::EmptyResult)
    }
}

/// Everything one run produces
#[derive(Debug, Clone)]
pub struct ProcessedRatings {
    pub filtered: FilteredRatingSet,
    pub index_map: IndexMap,
    pub interactions: InteractionDataset,
    pub report: PipelineReport,
}

pub struct RatingsProcessor {
    config: PipelineConfig,
}

impl RatingsProcessor {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean raw rows, then run the rest of the pipeline
    pub fn process_rows(&self, rows: &[RawRow], schema: RowSchema) -> Result<ProcessedRatings> {
        let cleaner = RecordCleaner::new(schema, self.config.malformed_policy);
        let batch = cleaner.clean_all(rows)?;
        self.process_batch(batch)
    }

    /// Run filtering, indexing and rewriting over an already cleaned batch
    pub fn process_batch(&self, batch: CleanedBatch) -> Result<ProcessedRatings> {
        let rows_seen = batch.rows_seen;
        let accepted = batch.triples.len();

        let filter = SparsityFilter::new(
            self.config.min_user_ratings,
            self.config.min_item_ratings,
        );
        let outcome = filter.apply(batch.triples);

        let mut warnings = Vec::new();
        if outcome.ratings.is_empty() {
            tracing::warn!(
                "Sparsity filter removed all {} triples (min_user={}, min_item={})",
                accepted,
                self.config.min_user_ratings,
                self.config.min_item_ratings
            );
            warnings.push(PipelineWarning::EmptyResult);
        }

        let index_map = IndexMapper::new().build(&outcome.ratings);
        let interactions = InteractionMatrixBuilder::new().build(&outcome.ratings, &index_map)?;

        let report = PipelineReport {
            min_user_ratings: self.config.min_user_ratings,
            min_item_ratings: self.config.min_item_ratings,
            rows_seen,
            accepted,
            rejected: batch.rejected,
            filter_passes: outcome.passes,
            dropped_by_filter: outcome.dropped,
            surviving: outcome.ratings.len(),
            shape: interactions.shape,
            warnings,
        };

        tracing::info!(
            "Prepared {} interactions over {} users x {} items",
            interactions.len(),
            report.shape.n_users,
            report.shape.n_items
        );

        Ok(ProcessedRatings {
            filtered: outcome.ratings,
            index_map,
            interactions,
            report,
        })
    }
}
