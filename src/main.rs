use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::time::interval;

use rumble_rewards::{
    app::{
        api::{create_api_router, AppContext},
        state::AppState,
    },
    config::GlobalConfig,
    utils::rate_limiter::RateLimiter,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting Rumble Rewards Simulator");

    let config = GlobalConfig::from_env()?;
    let state = AppState::new(&config.rewards);
    let rate_limiter = RateLimiter::new(100);

    let sweeper_state = state.clone();
    let session_state = state.clone();

    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(config.sweeper.sweep_interval_secs));

        loop {
            interval.tick().await;
            let purged = sweeper_state.sweep().await;

            if purged > 0 {
                tracing::info!("Sweeper purged {} expired reward codes", purged);
            }
        }
    });

    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(300));

        loop {
            interval.tick().await;
            let session_count = session_state.sessions.get_session_count().await;

            if session_count > 0 {
                tracing::info!("Active sessions: {}", session_count);
            }
        }
    });

    let context = AppContext {
        state: state.clone(),
        config: config.clone(),
        rate_limiter,
    };

    let app: Router = create_api_router(context);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    tracing::info!("Rumble Rewards Simulator running on http://{}", addr);
    tracing::info!("Pack opening delay: {}ms", config.rewards.pack_open_delay_ms);
    tracing::info!("Reward code TTL: {}h", config.rewards.reward_ttl_hours);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
