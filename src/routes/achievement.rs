use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    app::api::AppContext,
    models::{
        achievement::AchievementId,
        requests::{AchievementProgressRequest, SessionQuery},
        responses::ApiResponse,
    },
    services::session::get_session_from_cookie,
};

#[utoipa::path(
    get,
    path = "/achievements",
    tag = "Achievements",
    params(
        ("session_id" = Option<String>, Query, description = "Optional session id in query")
    ),
    responses(
        (status = 200, description = "Achievements listed", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse)
    )
)]
pub async fn list_achievements(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
) -> impl IntoResponse {
    if let Ok(session_id) =
        get_session_from_cookie(&headers, query.session_id.as_ref(), &context.state.sessions).await
    {
        let achievements = context.state.list_achievements(&session_id).await;
        let unlocked = achievements.iter().filter(|a| a.unlocked).count();

        (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Achievements fetched.".into(),
                json!({
                    "achievements": achievements,
                    "unlocked": unlocked
                }),
            )),
        )
            .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::failure(
                "Session ID is missing or invalid",
                401,
            )),
        )
            .into_response()
    }
}

#[utoipa::path(
    post,
    path = "/achievements/{achievement_id}/progress",
    tag = "Achievements",
    request_body = AchievementProgressRequest,
    params(
        ("achievement_id" = String, Path, description = "Achievement identifier")
    ),
    responses(
        (status = 200, description = "Progress updated", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 404, description = "Unknown achievement", body = ApiResponse)
    )
)]
pub async fn update_achievement_progress(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Path(achievement_id): Path<String>,
    Json(req): Json<AchievementProgressRequest>,
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

    let Some(id) = AchievementId::from_str(&achievement_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failure("Unknown achievement", 404)),
        )
            .into_response();
    };

    match context
        .state
        .update_achievement_progress(&session_id, id, req.progress)
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Achievement progress updated.".into(),
                json!({
                    "achievement_id": id.as_str(),
                    "unlocked": outcome.map(|o| o.newly_unlocked).unwrap_or(false)
                }),
            )),
        )
            .into_response(),
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::failure("Achievement has no progress counter", 400)),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/achievements/{achievement_id}/complete",
    tag = "Achievements",
    request_body = SessionQuery,
    params(
        ("achievement_id" = String, Path, description = "Achievement identifier")
    ),
    responses(
        (status = 200, description = "Achievement completed", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 404, description = "Unknown achievement", body = ApiResponse)
    )
)]
pub async fn complete_achievement(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Path(achievement_id): Path<String>,
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

    let Some(id) = AchievementId::from_str(&achievement_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failure("Unknown achievement", 404)),
        )
            .into_response();
    };

    match context.state.complete_achievement(&session_id, id).await {
        Ok(outcome) => {
            if outcome.newly_unlocked {
                tracing::info!(
                    "Trainer {} unlocked achievement {}",
                    session_id.chars().take(8).collect::<String>(),
                    id.as_str()
                );
            }

            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    "Achievement completed.".into(),
                    json!({
                        "achievement_id": id.as_str(),
                        "newly_unlocked": outcome.newly_unlocked,
                        "rewards_granted": outcome.inbox_rewards,
                        "new_level": outcome.new_level
                    }),
                )),
            )
                .into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Achievement completion failed", 500)),
        )
            .into_response(),
    }
}
