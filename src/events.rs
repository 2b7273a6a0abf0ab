use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{channel, Receiver, Sender};

use crate::models::{reward::Reward, types::PackTier};

/// Everything the storefront surfaces as a toast arrives here as a tagged
/// event on the SSE stream.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AppEvent {
    LevelUp {
        session_id: String,
        level: u32,
    },
    AchievementUnlocked {
        session_id: String,
        achievement_id: String,
        name: String,
    },
    ChallengeCompleted {
        session_id: String,
        challenge_id: String,
        description: String,
    },
    CheckInRecorded {
        session_id: String,
        streak_days: u32,
        xp_granted: u64,
        points_granted: u64,
    },
    RewardGranted {
        session_id: String,
        reward: Reward,
    },
    RewardRedeemed {
        session_id: String,
        code: String,
    },
    RewardExpired {
        session_id: String,
        code: Option<String>,
    },
    PackOpened {
        session_id: String,
        tier: PackTier,
        cards: usize,
        set_name: String,
    },
    LedgerStats {
        active_trainers: usize,
        total_packs_opened: u64,
        achievements_unlocked: u64,
        active_reward_codes: usize,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Clone)]
pub struct EventBroadcaster {
    sender: Sender<AppEvent>,
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = channel(10000);
        Self { sender }
    }

    /// Fire-and-forget, like the toasts it stands in for: nobody listening
    /// is not an error.
    pub fn broadcast(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}
