//! Per-user and per-item rating statistics over a filtered set.
//!
//! These feed context features for downstream models (how generous a
//! reader is, how divisive a book is). Both tables are ordered by id.

use crate::sparsity::FilteredRatingSet;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rating behaviour of one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub avg_rating: f32,
    pub total_ratings: usize,
}

/// Rating distribution of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    pub item_id: String,
    pub avg_rating: f32,
    pub total_ratings: usize,
    /// Sample standard deviation; `None` with fewer than two ratings
    pub rating_std: Option<f32>,
}

pub fn user_profiles(ratings: &FilteredRatingSet) -> Vec<UserProfile> {
    let grouped = group_ratings(ratings.iter().map(|t| (t.user_id.as_str(), t.rating)));

    let mut profiles: Vec<UserProfile> = grouped
        .par_iter()
        .map(|(&user_id, values)| UserProfile {
            user_id: user_id.to_string(),
            avg_rating: mean(values),
            total_ratings: values.len(),
        })
        .collect();
    profiles.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    profiles
}

pub fn item_stats(ratings: &FilteredRatingSet) -> Vec<ItemStats> {
    let grouped = group_ratings(ratings.iter().map(|t| (t.item_id.as_str(), t.rating)));

    let mut stats: Vec<ItemStats> = grouped
        .par_iter()
        .map(|(&item_id, values)| {
            let avg_rating = mean(values);
            ItemStats {
                item_id: item_id.to_string(),
                avg_rating,
                total_ratings: values.len(),
                rating_std: sample_std(values, avg_rating),
            }
        })
        .collect();
    stats.sort_by(|a, b| a.item_id.cmp(&b.item_id));
    stats
}

fn group_ratings<'a>(pairs: impl Iterator<Item = (&'a str, f32)>) -> HashMap<&'a str, Vec<f32>> {
    let mut grouped: HashMap<&str, Vec<f32>> = HashMap::new();
    for (id, rating) in pairs {
        grouped.entry(id).or_default().push(rating);
    }
    grouped
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn sample_std(values: &[f32], mean: f32) -> Option<f32> {
    if values.len() < 2 {
        return None;
    }
    let sum_sq: f32 = values.iter().map(|v| (v - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f32).sqrt())
}
