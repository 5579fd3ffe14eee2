use crate::models::domain::{RefreshOutcome, ShortlistEntry, ShortlistStatus, SkipReason};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Tri-state refresh outcome on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// "applied" or "skipped"; a failed refresh comes back as an error
    /// response instead
    pub outcome: String,
    /// Number of suggested entries written (applied only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SkipReason>,
}

impl From<RefreshOutcome> for RefreshResponse {
    fn from(outcome: RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Applied { suggested } => Self {
                outcome: "applied".to_string(),
                suggested: Some(suggested),
                reason: None,
            },
            RefreshOutcome::Skipped { reason } => Self {
                outcome: "skipped".to_string(),
                suggested: None,
                reason: Some(reason),
            },
        }
    }
}

/// Response after saving a profile
///
/// The shortlist refresh triggered by a save is best-effort: its
/// outcome is reported here but never fails the save itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveProfileResponse {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub embedded: bool,
    pub refresh: RefreshResponse,
}

/// A subject's current shortlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShortlistResponse {
    #[serde(rename = "subjectId")]
    pub subject_id: String,
    pub entries: Vec<ShortlistEntry>,
    pub count: usize,
}

/// Response after a user action on a shortlist entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub transitioned: bool,
    pub status: ShortlistStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_response_from_applied() {
        let response = RefreshResponse::from(RefreshOutcome::Applied { suggested: 3 });
        assert_eq!(response.outcome, "applied");
        assert_eq!(response.suggested, Some(3));
        assert!(response.reason.is_none());
    }

    #[test]
    fn test_refresh_response_from_skipped() {
        let response = RefreshResponse::from(RefreshOutcome::Skipped {
            reason: SkipReason::EmbeddingMissing,
        });
        assert_eq!(response.outcome, "skipped");
        assert!(response.suggested.is_none());
        assert_eq!(response.reason, Some(SkipReason::EmbeddingMissing));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["reason"], "embedding_missing");
        // The applied-only field stays off the wire entirely
        assert!(json.get("suggested").is_none());
    }
}
