use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    app::api::AppContext,
    managers::rewards::RedeemOutcome,
    models::{
        requests::{RedeemRequest, SessionQuery},
        responses::ApiResponse,
    },
    services::session::get_session_from_cookie,
};

#[utoipa::path(
    get,
    path = "/rewards",
    tag = "Rewards",
    params(
        ("session_id" = Option<String>, Query, description = "Optional session id in query")
    ),
    responses(
        (status = 200, description = "Reward inbox listed", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse)
    )
)]
pub async fn list_rewards(
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

    match context.state.reward_inbox(&session_id).await {
        Ok(rewards) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Reward inbox fetched.".into(),
                json!({
                    "rewards": rewards,
                    "count": rewards.len()
                }),
            )),
        )
            .into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Failed to fetch rewards", 500)),
        )
            .into_response(),
    }
}

fn redeem_response(outcome: RedeemOutcome) -> axum::response::Response {
    if outcome.success {
        return (
            StatusCode::OK,
            Json(ApiResponse::success(
                "Reward redeemed.".into(),
                json!({
                    "reward": outcome.reward,
                    "new_level": outcome.new_level
                }),
            )),
        )
            .into_response();
    }

    if outcome.purged_expired.is_some() {
        return (
            StatusCode::GONE,
            Json(ApiResponse::failure("Reward has expired", 410)),
        )
            .into_response();
    }

    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure("Reward not found", 404)),
    )
        .into_response()
}

#[utoipa::path(
    post,
    path = "/rewards/claim",
    tag = "Rewards",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Reward claimed", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 404, description = "Reward not found", body = ApiResponse),
        (status = 410, description = "Reward expired", body = ApiResponse)
    )
)]
pub async fn claim_reward(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<RedeemRequest>,
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

    match context.state.claim_reward(&session_id, &req.code).await {
        Ok(outcome) => redeem_response(outcome),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Claim failed", 500)),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/rewards/discount",
    tag = "Rewards",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Discount redeemed", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 404, description = "Reward not found", body = ApiResponse),
        (status = 410, description = "Reward expired", body = ApiResponse)
    )
)]
pub async fn redeem_discount(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<RedeemRequest>,
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

    match context.state.redeem_discount(&session_id, &req.code).await {
        Ok(outcome) => redeem_response(outcome),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Redemption failed", 500)),
        )
            .into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/rewards/free-pack",
    tag = "Rewards",
    request_body = RedeemRequest,
    responses(
        (status = 200, description = "Free pack redeemed", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse),
        (status = 404, description = "Reward not found", body = ApiResponse),
        (status = 410, description = "Reward expired", body = ApiResponse)
    )
)]
pub async fn redeem_free_pack(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<RedeemRequest>,
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

    match context.state.redeem_free_pack(&session_id, &req.code).await {
        Ok(outcome) => redeem_response(outcome),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Redemption failed", 500)),
        )
            .into_response(),
    }
}
