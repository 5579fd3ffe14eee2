// Core algorithm exports
pub mod reconciler;
pub mod scoring;

pub use reconciler::{
    eligible_subject, plan_merge, rank_candidates, MergePlan, Reconciler, RefreshError,
};
pub use scoring::{
    calculate_availability_score, calculate_interest_score, calculate_location_score,
    calculate_match_score, calculate_personality_score,
};
