//! Merging of similarity hits from the narrative memory collections.
//!
//! The database returns the nearest neighbours of each collection with a
//! normalized score; [`rank_weighted`] merges them so that permanent lore
//! only wins over the current chapter when it is clearly closer.

/// Ranking weight of narratives from the current chapter.
pub const CURRENT_WEIGHT: f64 = 1.0;

/// Ranking weight of permanent world lore.
pub const LORE_WEIGHT: f64 = 0.3;

/// Convert a cosine `vectorSearchScore` in `[0, 1]` to a cosine distance in
/// `[0, 2]`; 0 means identical direction.
///
/// The score is `(1 + cos) / 2`, so the distance `1 - cos` is `2 * (1 - score)`.
pub fn cosine_distance_from_score(score: f64) -> f64 {
    (2.0 * (1.0 - score.clamp(0.0, 1.0))).max(0.0)
}

/// A search hit with its distance to the query and the weight of its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub item: T,
    pub distance: f64,
    pub weight: f64,
}

impl<T> Scored<T> {
    /// Effective rank score; lower is better.
    pub fn score(&self) -> f64 {
        if self.weight <= 0.0 {
            return f64::INFINITY;
        }
        self.distance / self.weight
    }
}

/// Keep the `n` best hits ordered by `distance / weight`.
pub fn rank_weighted<T>(mut hits: Vec<Scored<T>>, n: usize) -> Vec<Scored<T>> {
    hits.sort_by(|a, b| a.score().total_cmp(&b.score()));
    hits.truncate(n);
    hits
}
