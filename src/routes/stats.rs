use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    app::api::AppContext,
    models::{requests::SessionQuery, responses::ApiResponse},
    services::session::get_session_from_cookie,
};

#[utoipa::path(
    get,
    path = "/game/profile",
    tag = "Game",
    params(
        ("session_id" = Option<String>, Query, description = "Optional session id in query")
    ),
    responses(
        (status = 200, description = "Trainer profile retrieved", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse)
    )
)]
pub async fn get_trainer_profile(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Query(query): Query<SessionQuery>,
) -> impl IntoResponse {
    if let Ok(session_id) =
        get_session_from_cookie(&headers, query.session_id.as_ref(), &context.state.sessions).await
    {
        let trainer = context.state.ensure_trainer(&session_id, None).await;

        (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Trainer profile fetched.".into(),
                json!(trainer),
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
    get,
    path = "/game/leaderboard",
    tag = "Game",
    responses(
        (status = 200, description = "Leaderboard retrieved", body = ApiResponse)
    )
)]
pub async fn get_leaderboard(State(context): State<AppContext>) -> impl IntoResponse {
    let leaderboard = context.state.get_leaderboard().await;
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            "Leaderboard fetched successfully".into(),
            json!(leaderboard),
        )),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/rewards/status",
    tag = "Rewards",
    responses(
        (status = 200, description = "Ledger status retrieved", body = ApiResponse)
    )
)]
pub async fn rewards_status(State(context): State<AppContext>) -> impl IntoResponse {
    let stats = context.state.get_ledger_stats().await;

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            "Rewards ledger status fetched successfully".into(),
            json!({
                "stats": stats,
                "pack_open_delay_ms": context.config.rewards.pack_open_delay_ms,
                "reward_ttl_hours": context.config.rewards.reward_ttl_hours
            }),
        )),
    )
        .into_response()
}
