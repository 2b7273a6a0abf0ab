use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    app::api::AppContext,
    models::{requests::OpenPackRequest, responses::ApiResponse},
    services::session::get_session_from_cookie,
};

#[utoipa::path(
    post,
    path = "/packs/open",
    tag = "Packs",
    request_body = OpenPackRequest,
    responses(
        (status = 200, description = "Pack opened", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn open_pack(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<OpenPackRequest>,
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

    let delay_ms = context.config.rewards.pack_open_delay_ms;

    match context.state.open_pack(&session_id, req.tier, delay_ms).await {
        Ok((set_name, cards, outcome)) => {
            tracing::info!(
                "Trainer {} opened a {} pack from {}",
                session_id.chars().take(8).collect::<String>(),
                req.tier.as_str(),
                set_name
            );

            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    "Pack opened.".into(),
                    json!({
                        "tier": req.tier,
                        "set_name": set_name,
                        "cards": cards,
                        "achievements_unlocked": outcome
                            .unlocked
                            .iter()
                            .map(|o| o.id.as_str())
                            .collect::<Vec<_>>(),
                        "challenge_completed": outcome.challenge.map(|c| c.id.as_str()),
                        "new_level": outcome.new_level
                    }),
                )),
            )
                .into_response()
        }
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Pack opening failed", 500)),
        )
            .into_response(),
    }
}
