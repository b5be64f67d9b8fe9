//! Quick descriptive statistics over a set of cleaned triples.

use crate::types::RatingTriple;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Basic shape of a ratings collection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingsSummary {
    pub count: usize,
    pub unique_users: usize,
    pub unique_items: usize,
    /// `(min, max)` rating, `None` for an empty collection
    pub rating_range: Option<(f32, f32)>,
}

impl RatingsSummary {
    pub fn from_triples(triples: &[RatingTriple]) -> Self {
        let users: HashSet<&str> = triples.iter().map(|t| t.user_id.as_str()).collect();
        let items: HashSet<&str> = triples.iter().map(|t| t.item_id.as_str()).collect();

        let rating_range = triples.iter().map(|t| t.rating).fold(None, |acc, r| match acc {
            None => Some((r, r)),
            Some((lo, hi)) => Some((f32::min(lo, r), f32::max(hi, r))),
        });

        Self {
            count: triples.len(),
            unique_users: users.len(),
            unique_items: items.len(),
            rating_range,
        }
    }
}
