use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::RewardsConfig,
    events::{AppEvent, EventBroadcaster},
    managers::{
        rewards::{
            AchievementOutcome, ChallengeOutcome, CheckInOutcome, Leaderboard, LedgerStats,
            PackOutcome, RedeemOutcome, RewardsLedger,
        },
        session::SessionManager,
    },
    models::{
        achievement::{Achievement, AchievementId},
        card::Card,
        challenge::{DailyChallenge, DailyChallengeId},
        reward::Reward,
        trainer::{TrainerProfile, TrainerSeed},
        types::PackTier,
    },
    services::packs,
};

/// The one owner of all mutable state. Constructed once in `main`, handed
/// to every route through `AppContext`; mutations go through the ledger and
/// each one broadcasts its toast events afterwards.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<RwLock<RewardsLedger>>,
    pub sessions: SessionManager,
    pub events: EventBroadcaster,
}

impl AppState {
    pub fn new(config: &RewardsConfig) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(RewardsLedger::new(config))),
            sessions: SessionManager::new(),
            events: EventBroadcaster::new(),
        }
    }

    pub async fn ensure_trainer(
        &self,
        session_id: &str,
        seed: Option<TrainerSeed>,
    ) -> TrainerProfile {
        let mut ledger = self.ledger.write().await;
        ledger.get_or_create_trainer(session_id, seed).clone()
    }

    pub async fn get_trainer(&self, session_id: &str) -> Option<TrainerProfile> {
        self.ledger.read().await.trainers.get(session_id).cloned()
    }

    /// Logout teardown: the session and its trainer state go together.
    pub async fn remove_trainer(&self, session_id: &str) -> bool {
        self.ledger.write().await.remove_trainer(session_id)
    }

    pub async fn add_experience(
        &self,
        session_id: &str,
        amount: u64,
    ) -> anyhow::Result<TrainerProfile> {
        let (new_level, trainer) = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            let new_level = ledger.add_experience(session_id, amount)?;
            let trainer = ledger.trainers[session_id].clone();
            (new_level, trainer)
        };

        if let Some(level) = new_level {
            self.events.broadcast(AppEvent::LevelUp {
                session_id: session_id.to_string(),
                level,
            });
        }

        Ok(trainer)
    }

    pub async fn list_achievements(&self, session_id: &str) -> Vec<Achievement> {
        let mut ledger = self.ledger.write().await;
        ledger
            .get_or_create_trainer(session_id, None)
            .achievements
            .clone()
    }

    pub async fn update_achievement_progress(
        &self,
        session_id: &str,
        id: AchievementId,
        progress: u32,
    ) -> anyhow::Result<Option<AchievementOutcome>> {
        let outcome = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.update_achievement_progress(session_id, id, progress)?
        };

        if let Some(outcome) = &outcome {
            self.broadcast_achievement(session_id, outcome);
        }

        Ok(outcome)
    }

    pub async fn complete_achievement(
        &self,
        session_id: &str,
        id: AchievementId,
    ) -> anyhow::Result<AchievementOutcome> {
        let outcome = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.complete_achievement(session_id, id)?
        };

        self.broadcast_achievement(session_id, &outcome);
        Ok(outcome)
    }

    pub async fn daily_challenges(&self, session_id: &str) -> anyhow::Result<Vec<DailyChallenge>> {
        let mut ledger = self.ledger.write().await;
        ledger.get_or_create_trainer(session_id, None);
        ledger.daily_challenges_for(session_id)
    }

    pub async fn update_challenge_progress(
        &self,
        session_id: &str,
        id: DailyChallengeId,
        amount: u32,
    ) -> anyhow::Result<Option<ChallengeOutcome>> {
        let outcome = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.update_challenge_progress(session_id, id, amount)?
        };

        if let Some(outcome) = &outcome {
            self.broadcast_challenge(session_id, outcome);
        }

        Ok(outcome)
    }

    pub async fn complete_daily_challenge(
        &self,
        session_id: &str,
        id: DailyChallengeId,
    ) -> anyhow::Result<Option<ChallengeOutcome>> {
        let outcome = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.complete_daily_challenge(session_id, id)?
        };

        if let Some(outcome) = &outcome {
            self.broadcast_challenge(session_id, outcome);
        }

        Ok(outcome)
    }

    pub async fn check_in(&self, session_id: &str) -> anyhow::Result<CheckInOutcome> {
        let outcome = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.check_in(session_id)?
        };

        if let CheckInOutcome::Recorded {
            streak_days,
            xp_granted,
            points_granted,
            new_level,
            streak_week,
        } = &outcome
        {
            self.events.broadcast(AppEvent::CheckInRecorded {
                session_id: session_id.to_string(),
                streak_days: *streak_days,
                xp_granted: *xp_granted,
                points_granted: *points_granted,
            });

            if let Some(unlocked) = streak_week {
                self.broadcast_achievement(session_id, unlocked);
            }

            if let Some(level) = new_level {
                self.events.broadcast(AppEvent::LevelUp {
                    session_id: session_id.to_string(),
                    level: *level,
                });
            }
        }

        Ok(outcome)
    }

    pub async fn reward_inbox(&self, session_id: &str) -> anyhow::Result<Vec<Reward>> {
        let (active, purged) = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.reward_inbox_for(session_id)?
        };

        for reward in purged {
            self.events.broadcast(AppEvent::RewardExpired {
                session_id: session_id.to_string(),
                code: reward.code,
            });
        }

        Ok(active)
    }

    pub async fn claim_reward(&self, session_id: &str, code: &str) -> anyhow::Result<RedeemOutcome> {
        let outcome = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.claim_reward(session_id, code)?
        };

        self.broadcast_redeem(session_id, code, &outcome);
        Ok(outcome)
    }

    pub async fn redeem_discount(
        &self,
        session_id: &str,
        code: &str,
    ) -> anyhow::Result<RedeemOutcome> {
        let outcome = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.redeem_discount(session_id, code)?
        };

        self.broadcast_redeem(session_id, code, &outcome);
        Ok(outcome)
    }

    pub async fn redeem_free_pack(
        &self,
        session_id: &str,
        code: &str,
    ) -> anyhow::Result<RedeemOutcome> {
        let outcome = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.redeem_free_pack(session_id, code)?
        };

        self.broadcast_redeem(session_id, code, &outcome);
        Ok(outcome)
    }

    /// The full pack-opening flow: simulated network wait, card draw, then
    /// ledger bookkeeping and toasts.
    pub async fn open_pack(
        &self,
        session_id: &str,
        tier: PackTier,
        delay_ms: u64,
    ) -> anyhow::Result<(String, Vec<Card>, PackOutcome)> {
        let (set_name, cards) = packs::open_pack(tier, delay_ms).await;

        let outcome = {
            let mut ledger = self.ledger.write().await;
            ledger.get_or_create_trainer(session_id, None);
            ledger.record_pack_opened(session_id, cards.len() as u32)?
        };

        self.events.broadcast(AppEvent::PackOpened {
            session_id: session_id.to_string(),
            tier,
            cards: cards.len(),
            set_name: set_name.clone(),
        });

        for unlocked in &outcome.unlocked {
            self.broadcast_achievement(session_id, unlocked);
        }
        if let Some(challenge) = &outcome.challenge {
            self.broadcast_challenge(session_id, challenge);
        }

        Ok((set_name, cards, outcome))
    }

    pub async fn get_leaderboard(&self) -> Leaderboard {
        self.ledger.read().await.generate_leaderboard()
    }

    pub async fn get_ledger_stats(&self) -> LedgerStats {
        self.ledger.read().await.stats()
    }

    pub async fn broadcast_stats(&self) {
        let stats = self.get_ledger_stats().await;

        self.events.broadcast(AppEvent::LedgerStats {
            active_trainers: stats.active_trainers,
            total_packs_opened: stats.total_packs_opened,
            achievements_unlocked: stats.achievements_unlocked,
            active_reward_codes: stats.active_reward_codes,
            timestamp: chrono::Utc::now(),
        });
    }

    /// One sweeper pass: expired inbox rewards out, stale daily challenges
    /// regenerated, trainer state of lapsed sessions torn down.
    pub async fn sweep(&self) -> usize {
        let expired_sessions = self.sessions.cleanup_expired_sessions().await;

        let purged = {
            let mut ledger = self.ledger.write().await;
            ledger.cleanup_trainers(&expired_sessions);
            ledger.refresh_all_daily_challenges();
            ledger.purge_expired_rewards()
        };

        let purged_count = purged.len();
        for (session_id, reward) in purged {
            self.events.broadcast(AppEvent::RewardExpired {
                session_id,
                code: reward.code,
            });
        }

        self.broadcast_stats().await;
        purged_count
    }

    fn broadcast_achievement(&self, session_id: &str, outcome: &AchievementOutcome) {
        if !outcome.newly_unlocked {
            return;
        }

        self.events.broadcast(AppEvent::AchievementUnlocked {
            session_id: session_id.to_string(),
            achievement_id: outcome.id.as_str().to_string(),
            name: outcome.name.clone(),
        });

        for reward in &outcome.inbox_rewards {
            self.events.broadcast(AppEvent::RewardGranted {
                session_id: session_id.to_string(),
                reward: reward.clone(),
            });
        }

        if let Some(level) = outcome.new_level {
            self.events.broadcast(AppEvent::LevelUp {
                session_id: session_id.to_string(),
                level,
            });
        }
    }

    fn broadcast_challenge(&self, session_id: &str, outcome: &ChallengeOutcome) {
        self.events.broadcast(AppEvent::ChallengeCompleted {
            session_id: session_id.to_string(),
            challenge_id: outcome.id.as_str().to_string(),
            description: outcome.description.clone(),
        });

        for reward in &outcome.inbox_rewards {
            self.events.broadcast(AppEvent::RewardGranted {
                session_id: session_id.to_string(),
                reward: reward.clone(),
            });
        }

        if let Some(level) = outcome.new_level {
            self.events.broadcast(AppEvent::LevelUp {
                session_id: session_id.to_string(),
                level,
            });
        }
    }

    fn broadcast_redeem(&self, session_id: &str, code: &str, outcome: &RedeemOutcome) {
        if outcome.success {
            self.events.broadcast(AppEvent::RewardRedeemed {
                session_id: session_id.to_string(),
                code: code.to_string(),
            });
        } else if outcome.purged_expired.is_some() {
            self.events.broadcast(AppEvent::RewardExpired {
                session_id: session_id.to_string(),
                code: Some(code.to_string()),
            });
        }

        if let Some(level) = outcome.new_level {
            self.events.broadcast(AppEvent::LevelUp {
                session_id: session_id.to_string(),
                level,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::achievement::AchievementId;

    fn test_state() -> AppState {
        AppState::new(&RewardsConfig {
            pack_open_delay_ms: 0,
            reward_ttl_hours: 72,
            checkin_base_xp: 10,
            checkin_base_points: 5,
        })
    }

    #[tokio::test]
    async fn test_unlock_emits_toast_events() {
        let state = test_state();
        let mut receiver = state.events.subscribe();

        state.ensure_trainer("s1", None).await;
        let outcome = state
            .complete_achievement("s1", AchievementId::FirstPurchase)
            .await
            .unwrap();
        assert!(outcome.newly_unlocked);

        match receiver.recv().await.unwrap() {
            AppEvent::AchievementUnlocked { achievement_id, .. } => {
                assert_eq!(achievement_id, "first_purchase");
            }
            other => panic!("expected AchievementUnlocked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_open_pack_returns_cards_and_records_state() {
        let state = test_state();
        state.ensure_trainer("s1", None).await;

        let (set_name, cards, _) = state
            .open_pack("s1", PackTier::Standard, 0)
            .await
            .unwrap();

        assert_eq!(cards.len(), crate::CARDS_PER_PACK);
        assert!(!set_name.is_empty());
        assert_eq!(state.get_trainer("s1").await.unwrap().packs_opened, 1);
    }

    #[tokio::test]
    async fn test_logout_removes_trainer() {
        let state = test_state();
        state.ensure_trainer("s1", None).await;

        assert!(state.remove_trainer("s1").await);
        assert!(state.get_trainer("s1").await.is_none());
    }
}
