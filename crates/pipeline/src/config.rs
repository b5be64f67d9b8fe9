//! Pipeline configuration.
//!
//! The thresholds have no built-in defaults: whoever runs the pipeline
//! decides them, either in code or through a JSON file such as
//!
//! ```json
//! { "min_user_ratings": 5, "min_item_ratings": 5, "malformed_policy": "skip" }
//! ```

use crate::error::{PipelineError, Result};
use data_loader::MalformedPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Minimum ratings a user needs to survive filtering (0 and 1 disable it)
    pub min_user_ratings: u32,
    /// Minimum ratings an item needs to survive filtering (0 and 1 disable it)
    pub min_item_ratings: u32,
    #[serde(default)]
    pub malformed_policy: MalformedPolicy,
}

impl PipelineConfig {
    pub fn new(min_user_ratings: u32, min_item_ratings: u32) -> Self {
        Self {
            min_user_ratings,
            min_item_ratings,
            malformed_policy: MalformedPolicy::default(),
        }
    }

    /// Builder-style override of the malformed row policy
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
            .map_err(|e| PipelineError::InvalidConfig(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        Ok(config)
    }
}
