use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::types::PackTier;

#[derive(Deserialize, ToSchema)]
pub struct CreateSessionRequest {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub loyalty_points: Option<u64>,
}

/// Session id handed over as a query parameter or JSON body, as a fallback
/// for clients that cannot send the session cookie.
#[derive(Deserialize, ToSchema)]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ExperienceRequest {
    pub session_id: Option<String>,
    pub amount: u64,
}

#[derive(Deserialize, ToSchema)]
pub struct AchievementProgressRequest {
    pub session_id: Option<String>,
    pub progress: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct ChallengeProgressRequest {
    pub session_id: Option<String>,
    pub amount: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct RedeemRequest {
    pub session_id: Option<String>,
    pub code: String,
}

#[derive(Deserialize, ToSchema)]
pub struct OpenPackRequest {
    pub session_id: Option<String>,
    pub tier: PackTier,
}
