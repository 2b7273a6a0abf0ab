use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    app::api::AppContext,
    managers::rewards::CheckInOutcome,
    models::{
        requests::{ExperienceRequest, SessionQuery},
        responses::ApiResponse,
    },
    services::session::get_session_from_cookie,
};

#[utoipa::path(
    post,
    path = "/game/experience",
    tag = "Game",
    request_body = ExperienceRequest,
    responses(
        (status = 200, description = "Experience added", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn add_experience(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<ExperienceRequest>,
) -> impl IntoResponse {
    let session_id =
        match get_session_from_cookie(&headers, req.session_id.as_ref(), &context.state.sessions)
            .await
        {
            Ok(sid) => sid,
            Err(_) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(ApiResponse::failure(
                        "Session ID is missing or invalid",
                        401,
                    )),
                )
                    .into_response();
            }
        };

    match context.state.add_experience(&session_id, req.amount).await {
        Ok(trainer) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Experience added.".into(),
                json!({
                    "experience": trainer.progression.experience,
                    "level": trainer.progression.level,
                    "experience_to_next_level": trainer.progression.experience_to_next_level
                }),
            )),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Failed to add experience", 500)),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/checkin",
    tag = "Game",
    request_body = SessionQuery,
    responses(
        (status = 200, description = "Check-in recorded", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 409, description = "Already checked in today", body = ApiResponse)
    )
)]
pub async fn check_in(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<SessionQuery>,
) -> impl IntoResponse {
    let session_id =
        match get_session_from_cookie(&headers, req.session_id.as_ref(), &context.state.sessions)
            .await
        {
            Ok(sid) => sid,
            Err(_) => {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(ApiResponse::failure(
                        "Session ID is missing or invalid",
                        401,
                    )),
                )
                    .into_response();
            }
        };

    match context.state.check_in(&session_id).await {
        Ok(CheckInOutcome::Recorded {
            streak_days,
            xp_granted,
            points_granted,
            new_level,
            streak_week,
        }) => {
            tracing::info!(
                "Trainer {} checked in, streak now {} days",
                session_id.chars().take(8).collect::<String>(),
                streak_days
            );

            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    "Check-in recorded.".into(),
                    json!({
                        "streak_days": streak_days,
                        "xp_granted": xp_granted,
                        "points_granted": points_granted,
                        "new_level": new_level,
                        "streak_achievement_unlocked": streak_week.map(|o| o.name)
                    }),
                )),
            )
                .into_response()
        }
        Ok(CheckInOutcome::AlreadyCheckedIn { streak_days }) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::failure(
                &format!("Already checked in today (streak: {} days)", streak_days),
                409,
            )),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Check-in failed", 500)),
        )
            .into_response(),
    }
}
