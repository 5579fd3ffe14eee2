//! Coffee Match - match scoring and shortlist reconciliation service
//!
//! This library provides the core matching engine for the Coffee social
//! app: a multi-signal compatibility score over two profiles and a
//! status-aware reconciler that merges fresh rankings into each user's
//! persisted shortlist without disturbing user-acted entries.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_match_score, plan_merge, rank_candidates, Reconciler};
pub use crate::models::{
    MatchWeights, Profile, ProfileAttributes, RankedCandidate, RefreshOutcome, ShortlistEntry,
    ShortlistStatus,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let weights = MatchWeights::default();
        assert_eq!(weights.interest, 0.40);
    }
}
