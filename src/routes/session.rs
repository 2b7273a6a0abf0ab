use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    app::api::AppContext,
    models::{requests::CreateSessionRequest, responses::ApiResponse, trainer::TrainerSeed},
    services::session::{get_session_from_cookie, SESSION_COOKIE},
};

#[utoipa::path(
    post,
    path = "/sessions",
    tag = "Session",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created or validated", body = ApiResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_or_validate_session(
    State(context): State<AppContext>,
    headers: HeaderMap,
    Json(req): Json<CreateSessionRequest>,
) -> impl IntoResponse {
    let prefix = format!("{}=", SESSION_COOKIE);
    let session_id = headers
        .get(header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find(|c| c.trim().starts_with(&prefix))
                .and_then(|c| c.split('=').nth(1))
        });

    let (session, is_new) = if let Some(sid) = session_id {
        if let Some(sess) = context.state.sessions.get_session(sid).await {
            (sess, false)
        } else {
            (context.state.sessions.create_session().await, true)
        }
    } else {
        (context.state.sessions.create_session().await, true)
    };

    // A fresh session gets its trainer state seeded from the auth profile
    let seed = is_new.then(|| TrainerSeed {
        display_name: req.display_name,
        email: req.email,
        loyalty_points: req.loyalty_points,
    });
    let trainer = context.state.ensure_trainer(&session.id, seed).await;

    let cookie_value = format!(
        "{}={}; Path=/; HttpOnly; SameSite=None; Secure; Max-Age={}",
        SESSION_COOKIE, session.id, 86400
    );

    let data = json!({
        "session_id": session.id,
        "status": if is_new { "created" } else { "validated" },
        "created_at": session.created_at,
        "expires_at": session.expires_at,
        "loyalty_points": trainer.loyalty_points,
        "level": trainer.progression.level
    });

    let api_response = ApiResponse::success("Session created or validated.".to_string(), data);

    let mut response = Json(api_response).into_response();

    if let Ok(cookie_header) = cookie_value.parse() {
        response
            .headers_mut()
            .insert(header::SET_COOKIE, cookie_header);
        response
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure("Failed to set session cookie", 500)),
        )
            .into_response()
    }
}

#[utoipa::path(
    post,
    path = "/sessions/logout",
    tag = "Session",
    responses(
        (status = 200, description = "Session and trainer state torn down", body = ApiResponse),
        (status = 401, description = "Unauthorized", body = ApiResponse)
    )
)]
pub async fn logout_session(
    State(context): State<AppContext>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let session_id =
        match get_session_from_cookie(&headers, None, &context.state.sessions).await {
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

    context.state.sessions.remove_session(&session_id).await;
    context.state.remove_trainer(&session_id).await;

    tracing::info!(
        "Session {} logged out, trainer state dropped",
        session_id.chars().take(8).collect::<String>()
    );

    let cookie_value = format!(
        "{}=; Path=/; HttpOnly; SameSite=None; Secure; Max-Age=0",
        SESSION_COOKIE
    );

    let mut response = Json(ApiResponse::success(
        "Logged out.".to_string(),
        json!({ "session_id": session_id }),
    ))
    .into_response();

    if let Ok(cookie_header) = cookie_value.parse() {
        response
            .headers_mut()
            .insert(header::SET_COOKIE, cookie_header);
    }

    response
}
