use std::env;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    pub server: ServerConfig,
    pub rewards: RewardsConfig,
    pub sweeper: SweeperConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewardsConfig {
    /// Artificial latency applied to every pack opening.
    pub pack_open_delay_ms: u64,
    /// Hours before an inbox reward code expires.
    pub reward_ttl_hours: i64,
    pub checkin_base_xp: u64,
    pub checkin_base_points: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweeperConfig {
    pub sweep_interval_secs: u64,
}

impl GlobalConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(GlobalConfig {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .or_else(|_| env::var("SERVER_PORT"))
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .unwrap_or(8080),
                cors_allowed_origins: env::var("CORS_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            rewards: RewardsConfig {
                pack_open_delay_ms: env::var("PACK_OPEN_DELAY_MS")
                    .unwrap_or_else(|_| "1500".to_string())
                    .parse()
                    .unwrap_or(1500),
                reward_ttl_hours: env::var("REWARD_TTL_HOURS")
                    .unwrap_or_else(|_| "72".to_string())
                    .parse()
                    .unwrap_or(72),
                checkin_base_xp: env::var("CHECKIN_BASE_XP")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                checkin_base_points: env::var("CHECKIN_BASE_POINTS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            sweeper: SweeperConfig {
                sweep_interval_secs: env::var("SWEEP_INTERVAL_SECS")
                    .unwrap_or_else(|_| "300".to_string())
                    .parse()
                    .unwrap_or(300),
            },
        })
    }
}
