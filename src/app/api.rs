use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    app::state::AppState,
    config::GlobalConfig,
    middleware::rate_limiter::rate_limit_middleware,
    routes::{
        achievement::{complete_achievement, list_achievements, update_achievement_progress},
        challenge::{complete_challenge, list_challenges, update_challenge_progress},
        event::sse_handler,
        health::health_check,
        pack::open_pack,
        progression::{add_experience, check_in},
        reward::{claim_reward, list_rewards, redeem_discount, redeem_free_pack},
        session::{create_or_validate_session, logout_session},
        stats::{get_leaderboard, get_trainer_profile, rewards_status},
    },
    utils::rate_limiter::RateLimiter,
};

#[derive(Clone)]
pub struct AppContext {
    pub state: AppState,
    pub config: GlobalConfig,
    pub rate_limiter: RateLimiter,
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Rumble Rewards Backend API", version = "1.0.0"),
    paths(
        crate::routes::health::health_check,
        crate::routes::event::sse_handler,
        crate::routes::session::create_or_validate_session,
        crate::routes::session::logout_session,
        crate::routes::stats::get_trainer_profile,
        crate::routes::stats::get_leaderboard,
        crate::routes::stats::rewards_status,
        crate::routes::progression::add_experience,
        crate::routes::progression::check_in,
        crate::routes::achievement::list_achievements,
        crate::routes::achievement::update_achievement_progress,
        crate::routes::achievement::complete_achievement,
        crate::routes::challenge::list_challenges,
        crate::routes::challenge::update_challenge_progress,
        crate::routes::challenge::complete_challenge,
        crate::routes::reward::list_rewards,
        crate::routes::reward::claim_reward,
        crate::routes::reward::redeem_discount,
        crate::routes::reward::redeem_free_pack,
        crate::routes::pack::open_pack,
    ),
    components(schemas(crate::models::responses::ApiResponse,),)
)]
struct ApiDoc;

pub fn create_api_router(context: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            context
                .config
                .server
                .cors_allowed_origins
                .iter()
                .map(|origin| origin.parse().unwrap())
                .collect::<Vec<_>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::COOKIE,
            axum::http::header::CACHE_CONTROL,
        ])
        .allow_credentials(true);

    Router::new()
        .route("/sessions", post(create_or_validate_session))
        .route("/sessions/logout", post(logout_session))
        .route("/events", get(sse_handler))
        .route("/health", get(health_check))
        .route("/game/profile", get(get_trainer_profile))
        .route("/game/experience", post(add_experience))
        .route("/game/leaderboard", get(get_leaderboard))
        .route("/checkin", post(check_in))
        .route("/achievements", get(list_achievements))
        .route(
            "/achievements/{achievement_id}/progress",
            post(update_achievement_progress),
        )
        .route(
            "/achievements/{achievement_id}/complete",
            post(complete_achievement),
        )
        .route("/challenges", get(list_challenges))
        .route(
            "/challenges/{challenge_id}/progress",
            post(update_challenge_progress),
        )
        .route("/challenges/{challenge_id}/complete", post(complete_challenge))
        .route("/rewards", get(list_rewards))
        .route("/rewards/status", get(rewards_status))
        .route("/rewards/claim", post(claim_reward))
        .route("/rewards/discount", post(redeem_discount))
        .route("/rewards/free-pack", post(redeem_free_pack))
        .route("/packs/open", post(open_pack))
        .merge(SwaggerUi::new("/swagger-ui").url("/docs/openapi.json", ApiDoc::openapi()))
        .layer(axum::middleware::from_fn(rate_limit_middleware))
        .layer(axum::Extension(context.rate_limiter.clone()))
        .layer(cors)
        .with_state(context)
}
