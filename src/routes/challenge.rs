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
        challenge::DailyChallengeId,
        requests::{ChallengeProgressRequest, SessionQuery},
        responses::ApiResponse,
    },
    services::session::get_session_from_cookie,
};

#[utoipa::path(
    get,
    path = "/challenges",
    tag = "Challenges",
    params(
        ("session_id" = Option<String>, Query, description = "Optional session id in query")
    ),
    responses(
        (status = 200, description = "Daily challenges listed", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse)
    )
)]
pub async fn list_challenges(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
) -> impl IntoResponse {
    let session_id = match get_session_from_cookie(
        &headers,
        query.session_id.as_ref(),
        &context.state.sessions,
    )
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

    match context.state.daily_challenges(&session_id).await {
        Ok(challenges) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Daily challenges fetched.".into(),
                json!({
                    "challenges": challenges,
                    "count": challenges.len()
                }),
            )),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Failed to fetch challenges", 500)),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/challenges/{challenge_id}/progress",
    tag = "Challenges",
    request_body = ChallengeProgressRequest,
    params(
        ("challenge_id" = String, Path, description = "Daily challenge identifier")
    ),
    responses(
        (status = 200, description = "Challenge progress updated", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 404, description = "Unknown challenge", body = ApiResponse)
    )
)]
pub async fn update_challenge_progress(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Path(challenge_id): Path<String>,
    Json(req): Json<ChallengeProgressRequest>,
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

    let Some(id) = DailyChallengeId::from_str(&challenge_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failure("Unknown daily challenge", 404)),
        )
            .into_response();
    };

    match context
        .state
        .update_challenge_progress(&session_id, id, req.amount)
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Challenge progress updated.".into(),
                json!({
                    "challenge_id": id.as_str(),
                    "completed": outcome.is_some(),
                    "reward_granted": outcome.map(|o| o.inbox_rewards)
                }),
            )),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Challenge update failed", 500)),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/challenges/{challenge_id}/complete",
    tag = "Challenges",
    request_body = SessionQuery,
    params(
        ("challenge_id" = String, Path, description = "Daily challenge identifier")
    ),
    responses(
        (status = 200, description = "Challenge completed", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 404, description = "Unknown challenge", body = ApiResponse)
    )
)]
pub async fn complete_challenge(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Path(challenge_id): Path<String>,
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

    let Some(id) = DailyChallengeId::from_str(&challenge_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failure("Unknown daily challenge", 404)),
        )
            .into_response();
    };

    match context
        .state
        .complete_daily_challenge(&session_id, id)
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Challenge completed.".into(),
                json!({
                    "challenge_id": id.as_str(),
                    "newly_completed": outcome.is_some(),
                    "reward_granted": outcome.map(|o| o.inbox_rewards)
                }),
            )),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Challenge completion failed", 500)),
        )
            .into_response(),
    }
}
