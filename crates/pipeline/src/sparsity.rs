//! Iterative sparsity filtering.
//!
//! Removes users with fewer than `min_user_ratings` ratings and items with
//! fewer than `min_item_ratings` ratings, repeating until a whole pass
//! removes nothing. Dropping a user can push one of its items under the item
//! threshold and vice versa, so a single pass is not enough.
//!
//! ## Algorithm
//! Each pass has two halves:
//! 1. drop every triple whose user has fewer than `min_user_ratings` triples
//! 2. recount items over what is left and drop every triple whose item has
//!    fewer than `min_item_ratings` triples
//!
//! The pass repeats while it keeps removing triples.
//!
//! Counts are kept incrementally instead of being recomputed per pass: ids
//! are interned once, every entity knows its triples, and dropping a triple
//! decrements the counter on the other axis. A half-pass only re-examines the
//! entities whose counter moved during the previous half-pass, which are the
//! only ones that can have newly fallen below their threshold.

use data_loader::RatingTriple;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Ratings that meet both thresholds, counted within the set itself.
///
/// Only [`SparsityFilter`] can build one, so holding a `FilteredRatingSet`
/// means holding a fixed point. Survivors keep their input order.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRatingSet {
    triples: Vec<RatingTriple>,
}

/// Number of triples referencing one user or item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityCount {
    pub entity_id: String,
    pub count: usize,
}

impl FilteredRatingSet {
    pub fn triples(&self) -> &[RatingTriple] {
        &self.triples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RatingTriple> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn into_triples(self) -> Vec<RatingTriple> {
        self.triples
    }

    /// Ratings per user, ordered by user id
    pub fn user_activity(&self) -> Vec<ActivityCount> {
        activity(self.triples.iter().map(|t| t.user_id.as_str()))
    }

    /// Ratings per item, ordered by item id
    pub fn item_activity(&self) -> Vec<ActivityCount> {
        activity(self.triples.iter().map(|t| t.item_id.as_str()))
    }

    /// Whether every user and item in the set meets the given thresholds
    pub fn meets_thresholds(&self, min_user_ratings: u32, min_item_ratings: u32) -> bool {
        let min_user = min_user_ratings as usize;
        let min_item = min_item_ratings as usize;
        self.user_activity().iter().all(|a| a.count >= min_user)
            && self.item_activity().iter().all(|a| a.count >= min_item)
    }
}

impl<'a> IntoIterator for &'a FilteredRatingSet {
    type Item = &'a RatingTriple;
    type IntoIter = std::slice::Iter<'a, RatingTriple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

fn activity<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<ActivityCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(id, count)| ActivityCount {
            entity_id: id.to_string(),
            count,
        })
        .collect()
}

/// What a filter run produced
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub ratings: FilteredRatingSet,
    /// Number of full user+item passes, including the final no-change pass
    pub passes: usize,
    /// Triples removed in total
    pub dropped: usize,
}

/// Fixed-point filter on per-user and per-item rating counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparsityFilter {
    min_user_ratings: u32,
    min_item_ratings: u32,
}

impl SparsityFilter {
    pub fn new(min_user_ratings: u32, min_item_ratings: u32) -> Self {
        Self {
            min_user_ratings,
            min_item_ratings,
        }
    }

    pub fn min_user_ratings(&self) -> u32 {
        self.min_user_ratings
    }

    pub fn min_item_ratings(&self) -> u32 {
        self.min_item_ratings
    }

    /// Filter `triples` down to their fixed point.
    ///
    /// Takes ownership so survivors are moved, not cloned.
    pub fn apply(&self, triples: Vec<RatingTriple>) -> FilterOutcome {
        let total = triples.len();
        let mut users = EntityCounts::intern(triples.iter().map(|t| t.user_id.as_str()));
        let mut items = EntityCounts::intern(triples.iter().map(|t| t.item_id.as_str()));

        let min_user = self.min_user_ratings as usize;
        let min_item = self.min_item_ratings as usize;

        let mut alive = vec![true; total];
        let mut remaining = total;
        let mut passes = 0;

        // First pass looks at everyone
        let mut user_candidates: Vec<usize> = (0..users.len()).collect();
        let mut first_pass = true;

        loop {
            passes += 1;
            let pass_start = remaining;

            let touched_items = drop_below(
                &mut users,
                &mut items,
                &user_candidates,
                min_user,
                &mut alive,
                &mut remaining,
            );
            let item_candidates = if first_pass {
                (0..items.len()).collect()
            } else {
                touched_items
            };

            user_candidates = drop_below(
                &mut items,
                &mut users,
                &item_candidates,
                min_item,
                &mut alive,
                &mut remaining,
            );
            first_pass = false;

            tracing::debug!(
                "Sparsity pass {}: {} -> {} triples",
                passes,
                pass_start,
                remaining
            );

            if remaining == pass_start {
                break;
            }
        }

        let survivors: Vec<RatingTriple> = triples
            .into_iter()
            .zip(alive)
            .filter_map(|(triple, keep)| keep.then_some(triple))
            .collect();

        tracing::info!(
            "Sparsity filter (min_user={}, min_item={}) kept {}/{} triples after {} passes",
            self.min_user_ratings,
            self.min_item_ratings,
            survivors.len(),
            total,
            passes
        );

        FilterOutcome {
            ratings: FilteredRatingSet { triples: survivors },
            passes,
            dropped: total - remaining,
        }
    }
}

/// Interned ids of one axis with live counters and per-entity triple lists
struct EntityCounts {
    /// Entity index for each triple
    of_triple: Vec<usize>,
    /// Triples referencing each entity
    triples: Vec<Vec<usize>>,
    /// Live triples referencing each entity
    counts: Vec<usize>,
    /// Dedup marks for the touched list of the current half-pass
    touched: Vec<bool>,
}

impl EntityCounts {
    fn intern<'a>(ids: impl Iterator<Item = &'a str>) -> Self {
        let mut lookup: HashMap<&str, usize> = HashMap::new();
        let mut of_triple = Vec::new();
        let mut triples: Vec<Vec<usize>> = Vec::new();

        for (triple_idx, id) in ids.enumerate() {
            let next = lookup.len();
            let entity = *lookup.entry(id).or_insert(next);
            if entity == triples.len() {
                triples.push(Vec::new());
            }
            triples[entity].push(triple_idx);
            of_triple.push(entity);
        }

        let counts = triples.iter().map(Vec::len).collect();
        let touched = vec![false; triples.len()];
        Self {
            of_triple,
            triples,
            counts,
            touched,
        }
    }

    fn len(&self) -> usize {
        self.triples.len()
    }
}

/// Drop every live triple of each candidate on `axis` whose count is below
/// `min`, decrementing the counters of `other`. Returns the entities of
/// `other` whose counters moved.
fn drop_below(
    axis: &mut EntityCounts,
    other: &mut EntityCounts,
    candidates: &[usize],
    min: usize,
    alive: &mut [bool],
    remaining: &mut usize,
) -> Vec<usize> {
    let mut touched = Vec::new();

    for &entity in candidates {
        let count = axis.counts[entity];
        if count == 0 || count >= min {
            continue;
        }
        for &t in &axis.triples[entity] {
            if !alive[t] {
                continue;
            }
            alive[t] = false;
            *remaining -= 1;

            let peer = other.of_triple[t];
            other.counts[peer] -= 1;
            if !other.touched[peer] {
                other.touched[peer] = true;
                touched.push(peer);
            }
        }
        axis.counts[entity] = 0;
    }

    for &peer in &touched {
        other.touched[peer] = false;
    }
    touched
}
