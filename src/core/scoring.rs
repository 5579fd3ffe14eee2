use crate::models::{Availability, MatchWeights, Profile};
use std::collections::HashSet;

/// Calculate the compatibility score (0-1) between two profiles
///
/// Scoring formula:
/// score = (
///     interest_score * 0.40 +      # Jaccard over interest ids
///     availability_score * 0.30 +  # Shared days / time slots
///     location_score * 0.20 +      # Constant stub, see below
///     personality_score * 0.10     # Embedding cosine similarity
/// )
///
/// Pure and infallible: absent or partial attribute data degrades the
/// affected sub-score to its defined zero rather than erroring, so one
/// sparse profile never blocks a scoring batch.
pub fn calculate_match_score(a: &Profile, b: &Profile, weights: &MatchWeights) -> f64 {
    let interest = calculate_interest_score(&a.interest_set(), &b.interest_set());
    let availability =
        calculate_availability_score(&a.attributes.availability, &b.attributes.availability);
    let location = calculate_location_score();
    let personality =
        calculate_personality_score(a.embedding.as_deref(), b.embedding.as_deref());

    interest * weights.interest
        + availability * weights.availability
        + location * weights.location
        + personality * weights.personality
}

/// Jaccard similarity over interest-id sets (0-1)
///
/// Defined as 0.0 when neither side declared any interests.
#[inline]
pub fn calculate_interest_score(a: &HashSet<i32>, b: &HashSet<i32>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Availability overlap score, one of {0.0, 0.5, 1.0}
///
/// 0.5 for any shared day label, 0.5 for any shared time slot. Zero if
/// either side declared no availability at all.
#[inline]
pub fn calculate_availability_score(a: &Availability, b: &Availability) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut score = 0.0;
    if intersects(&a.days, &b.days) {
        score += 0.5;
    }
    if intersects(&a.time_slots, &b.time_slots) {
        score += 0.5;
    }
    score
}

/// Location score placeholder
///
/// Geocoding is not implemented; until it is, every pair gets a neutral
/// constant. This is an intentional stub, not a bug: the weight it
/// carries keeps the combiner shape stable for when a real distance
/// score lands.
#[inline]
pub fn calculate_location_score() -> f64 {
    0.5
}

/// Cosine similarity between the two profile embeddings, clamped to 0
///
/// Negative similarity is treated as no similarity. Returns 0.0 when
/// either embedding is absent or empty; eligibility filtering upstream
/// should make that path unreachable, this is a defensive fallback.
#[inline]
pub fn calculate_personality_score(a: Option<&[f64]>, b: Option<&[f64]>) -> f64 {
    let (Some(a), Some(b)) = (a, b) else {
        return 0.0;
    };
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).max(0.0)
}

#[inline]
fn intersects(a: &[String], b: &[String]) -> bool {
    a.iter().any(|x| b.iter().any(|y| x == y))
}
