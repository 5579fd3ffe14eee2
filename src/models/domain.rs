use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structured attribute bag collected during onboarding
///
/// Every field defaults when missing so that a partially filled or
/// malformed profile degrades individual sub-scores to zero instead of
/// failing the whole scoring pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileAttributes {
    #[serde(rename = "interestIds", alias = "interest_ids", default)]
    pub interest_ids: Vec<i32>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(rename = "vibeSummary", alias = "vibe_summary", default)]
    pub vibe_summary: Option<String>,
    #[serde(rename = "meetingStyle", alias = "meeting_style", default)]
    pub meeting_style: Option<String>,
    #[serde(rename = "socialIntent", alias = "social_intent", default)]
    pub social_intent: Option<String>,
    #[serde(rename = "personalityType", alias = "personality_type", default)]
    pub personality_type: Option<String>,
    #[serde(rename = "conversationTopics", alias = "conversation_topics", default)]
    pub conversation_topics: Vec<String>,
}

/// Declared availability as day labels plus time-slot labels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Availability {
    #[serde(default)]
    pub days: Vec<String>,
    #[serde(rename = "timeSlots", alias = "time_slots", default)]
    pub time_slots: Vec<String>,
}

impl Availability {
    /// True when no availability data was declared at all
    pub fn is_empty(&self) -> bool {
        self.days.is_empty() && self.time_slots.is_empty()
    }
}

/// A user profile as the matching engine sees it
///
/// The embedding is present only after the provider has processed the
/// attribute bag; a profile without one is excluded from matching on
/// both sides of the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(default)]
    pub attributes: ProfileAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f64>>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Profile {
    /// Eligible to be scored or scored against
    pub fn has_embedding(&self) -> bool {
        self.embedding.as_ref().is_some_and(|e| !e.is_empty())
    }

    pub fn interest_set(&self) -> HashSet<i32> {
        self.attributes.interest_ids.iter().copied().collect()
    }
}

/// Lifecycle of a shortlist entry
///
/// `Suggested` is the only state the reconciler creates or removes. The
/// other three are reached exclusively through a user action and are
/// terminal as far as the reconciler is concerned: it may re-rank past
/// them but never writes to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "shortlist_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ShortlistStatus {
    Suggested,
    Active,
    Passed,
    Blocked,
}

impl ShortlistStatus {
    /// Frozen with respect to the reconciler: score and status are
    /// owned by user action once the entry leaves `suggested`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ShortlistStatus::Suggested)
    }
}

/// One persisted shortlist row, unique per (subject, candidate) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistEntry {
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub score: f64,
    pub status: ShortlistStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A scored candidate, ready for ranking
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    pub candidate_id: String,
    pub score: f64,
}

/// Why a refresh was skipped without touching the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ProfileMissing,
    EmbeddingMissing,
}

/// Tri-state outcome of a shortlist refresh
///
/// The third state (failed) is the error side of the `Result` the
/// reconciler returns; a failed refresh leaves the previous shortlist
/// intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Merge committed; `suggested` is the number of suggested entries
    /// inserted or re-scored.
    Applied { suggested: usize },
    /// Subject not ready for matching; expected steady state, no store
    /// mutation.
    Skipped { reason: SkipReason },
}

/// One canonical interest from the taxonomy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interest {
    pub id: i32,
    pub name: String,
}

/// Weights for the four compatibility pillars
///
/// The single configuration point for the combiner; nothing else in the
/// crate carries weight literals.
#[derive(Debug, Clone, Copy)]
pub struct MatchWeights {
    pub interest: f64,
    pub availability: f64,
    pub location: f64,
    pub personality: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            interest: 0.40,
            availability: 0.30,
            location: 0.20,
            personality: 0.10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = MatchWeights::default();
        assert!((w.interest + w.availability + w.location + w.personality - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ShortlistStatus::Suggested.is_terminal());
        assert!(ShortlistStatus::Active.is_terminal());
        assert!(ShortlistStatus::Passed.is_terminal());
        assert!(ShortlistStatus::Blocked.is_terminal());
    }

    #[test]
    fn test_attributes_tolerate_missing_fields() {
        let attrs: ProfileAttributes = serde_json::from_str("{}").unwrap();
        assert!(attrs.interest_ids.is_empty());
        assert!(attrs.availability.is_empty());
        assert!(attrs.vibe_summary.is_none());
    }

    #[test]
    fn test_attributes_accept_snake_case_aliases() {
        let raw = r#"{
            "interest_ids": [1, 2],
            "availability": {"days": ["saturday"], "time_slots": ["morning"]},
            "vibe_summary": "espresso enthusiast"
        }"#;
        let attrs: ProfileAttributes = serde_json::from_str(raw).unwrap();
        assert_eq!(attrs.interest_ids, vec![1, 2]);
        assert_eq!(attrs.availability.time_slots, vec!["morning"]);
        assert_eq!(attrs.vibe_summary.as_deref(), Some("espresso enthusiast"));
    }

    #[test]
    fn test_empty_embedding_is_not_usable() {
        let profile = Profile {
            user_id: "u1".to_string(),
            attributes: ProfileAttributes::default(),
            embedding: Some(vec![]),
            created_at: None,
            updated_at: None,
        };
        assert!(!profile.has_embedding());
    }
}
