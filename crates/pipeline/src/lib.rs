//! Sparsity filtering and index remapping for rating data.
//!
//! This crate provides:
//! - SparsityFilter: fixed-point removal of low-activity users and items
//! - IndexMapper: deterministic dense indices for the survivors
//! - InteractionMatrixBuilder: dense `(user_idx, item_idx, rating)` records
//! - RatingsProcessor: runs the stages in order and reports on the run
//!
//! ## Architecture
//! Data flows strictly one way:
//! 1. Cleaned triples (from `data_loader`) go through the SparsityFilter
//! 2. The resulting FilteredRatingSet is numbered by the IndexMapper
//! 3. The InteractionMatrixBuilder rewrites the set through the IndexMap
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{PipelineConfig, RatingsProcessor};
//!
//! let processor = RatingsProcessor::new(PipelineConfig::new(5, 5));
//! let processed = processor.process_rows(&file.rows, file.schema)?;
//!
//! if processed.report.is_empty_result() {
//!     eprintln!("thresholds too strict, nothing left");
//! }
//! pipeline::export::write_outputs(Path::new("out"), &processed)?;
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod index_map;
pub mod interactions;
pub mod processor;
pub mod profiles;
pub mod sparsity;

// Re-export main types
pub use config::PipelineConfig;
pub use error::{Axis, PipelineError, Result};
pub use index_map::{DenseIndex, IdIndex, IndexMap, IndexMapper};
pub use interactions::{InteractionDataset, InteractionMatrixBuilder, InteractionRecord, MatrixShape};
pub use processor::{PipelineReport, PipelineWarning, ProcessedRatings, RatingsProcessor};
pub use profiles::{ItemStats, UserProfile};
pub use sparsity::{ActivityCount, FilterOutcome, FilteredRatingSet, SparsityFilter};
