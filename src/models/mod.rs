// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Availability, Interest, MatchWeights, Profile, ProfileAttributes, RankedCandidate,
    RefreshOutcome, ShortlistEntry, ShortlistStatus, SkipReason,
};
pub use requests::{RecordActionRequest, RefreshRequest, SaveProfileRequest};
pub use responses::{
    ActionResponse, ErrorResponse, HealthResponse, RefreshResponse, SaveProfileResponse,
    ShortlistResponse,
};
