use crate::core::scoring::calculate_match_score;
use crate::models::{
    MatchWeights, Profile, RankedCandidate, RefreshOutcome, ShortlistEntry, ShortlistStatus,
    SkipReason,
};
use crate::services::{PostgresClient, StoreError};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by a shortlist refresh
///
/// Everything here means "failed": the merge transaction rolled back
/// and the previous shortlist is untouched. Eligibility problems are
/// not errors, they come back as `RefreshOutcome::Skipped`.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Orchestrates candidate retrieval, scoring, ranking and the
/// status-aware merge into the persisted shortlist
///
/// # Pipeline
/// 1. Eligibility check on the subject (profile + embedding present)
/// 2. Candidate pool retrieval (embedded profiles, subject excluded)
/// 3. Per-candidate scoring
/// 4. Deterministic ranking, truncated to the shortlist size
/// 5. Transactional merge that never writes over user-acted entries
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<PostgresClient>,
    weights: MatchWeights,
    shortlist_size: usize,
}

impl Reconciler {
    pub fn new(store: Arc<PostgresClient>, weights: MatchWeights, shortlist_size: usize) -> Self {
        Self {
            store,
            weights,
            shortlist_size,
        }
    }

    /// Recompute and persist the shortlist for one subject
    ///
    /// Refreshes for different subjects are independent; refreshes for
    /// the same subject serialize on a per-subject advisory lock inside
    /// the merge transaction, so concurrent callers cannot interleave
    /// conflicting inserts and deletes.
    pub async fn refresh(&self, subject_id: &str) -> Result<RefreshOutcome, RefreshError> {
        let loaded = self.store.get_profile(subject_id).await?;
        let subject = match eligible_subject(loaded.as_ref()) {
            Ok(profile) => profile,
            Err(reason) => {
                tracing::debug!("Refresh skipped for {}: {:?}", subject_id, reason);
                return Ok(RefreshOutcome::Skipped { reason });
            }
        };

        let candidates = self.store.list_embedded_profiles(subject_id).await?;
        let pool_size = candidates.len();

        let ranked = rank_candidates(subject, candidates, &self.weights, self.shortlist_size);

        let written = self.store.apply_refresh(subject_id, &ranked).await?;

        tracing::info!(
            "Refreshed shortlist for {}: {} suggested from {} candidates",
            subject_id,
            written,
            pool_size
        );

        Ok(RefreshOutcome::Applied { suggested: written })
    }
}

/// Check whether a subject is ready to have a shortlist computed
///
/// An ineligible subject is not an error, it is the expected steady
/// state for incomplete profiles: the refresh reports `Skipped` and
/// leaves the store untouched.
pub fn eligible_subject(subject: Option<&Profile>) -> Result<&Profile, SkipReason> {
    let profile = subject.ok_or(SkipReason::ProfileMissing)?;
    if !profile.has_embedding() {
        return Err(SkipReason::EmbeddingMissing);
    }
    Ok(profile)
}

/// Score, rank and truncate the candidate pool for one subject
///
/// Ordering is score descending with candidate id ascending as the
/// tie-break, so repeated runs over unchanged data rank identically.
/// Candidates producing a non-finite score are logged and dropped
/// rather than aborting the batch.
pub fn rank_candidates(
    subject: &Profile,
    candidates: Vec<Profile>,
    weights: &MatchWeights,
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .filter(|c| c.user_id != subject.user_id)
        .filter_map(|candidate| {
            let score = calculate_match_score(subject, &candidate, weights);
            if !score.is_finite() {
                tracing::warn!(
                    "Skipping candidate {} for {}: non-finite score",
                    candidate.user_id,
                    subject.user_id
                );
                return None;
            }
            Some(RankedCandidate {
                candidate_id: candidate.user_id,
                score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });

    ranked.truncate(limit);
    ranked
}

/// The writes one merge transaction will perform
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergePlan {
    /// Insert as `suggested` or re-score an existing `suggested` row
    pub upserts: Vec<RankedCandidate>,
    /// Remove: fell out of the ranking and is still only `suggested`
    pub deletes: Vec<String>,
    /// User-acted rows left untouched (in or out of the ranking)
    pub retained: Vec<String>,
}

/// Diff the fresh ranking against the persisted shortlist
///
/// User-acted entries (`active`, `passed`, `blocked`) are frozen: a
/// ranked candidate that already has one gets no write (the unique-pair
/// invariant means re-suggesting must not create a duplicate), and an
/// unranked one is retained rather than deleted. Only `suggested` rows
/// are ever rewritten or removed.
pub fn plan_merge(ranked: &[RankedCandidate], existing: &[ShortlistEntry]) -> MergePlan {
    let existing_by_candidate: HashMap<&str, &ShortlistEntry> = existing
        .iter()
        .map(|entry| (entry.candidate_id.as_str(), entry))
        .collect();

    let mut plan = MergePlan::default();

    for candidate in ranked {
        match existing_by_candidate.get(candidate.candidate_id.as_str()) {
            Some(entry) if entry.status.is_terminal() => {
                plan.retained.push(candidate.candidate_id.clone());
            }
            // New suggestion or in-place re-score
            _ => plan.upserts.push(candidate.clone()),
        }
    }

    for entry in existing {
        let still_ranked = ranked
            .iter()
            .any(|c| c.candidate_id == entry.candidate_id);
        if still_ranked {
            continue;
        }
        if entry.status == ShortlistStatus::Suggested {
            plan.deletes.push(entry.candidate_id.clone());
        } else {
            plan.retained.push(entry.candidate_id.clone());
        }
    }

    plan
}
