use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::Local;
use serde::Serialize;

use crate::{
    config::RewardsConfig,
    models::{
        achievement::AchievementId,
        challenge::{daily_challenges, DailyChallenge, DailyChallengeId},
        reward::{generate_code, Reward, RewardKind},
        trainer::{TrainerProfile, TrainerSeed},
    },
    STREAK_WEEK_DAYS,
};

/// Owns every trainer's in-memory gamification state, keyed by session id.
/// All transitions are one-way flips or monotonic counters; nothing here is
/// persisted or recovered.
pub struct RewardsLedger {
    pub trainers: HashMap<String, TrainerProfile>,
    reward_ttl_hours: i64,
    checkin_base_xp: u64,
    checkin_base_points: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct AchievementOutcome {
    pub id: AchievementId,
    pub name: String,
    pub newly_unlocked: bool,
    pub inbox_rewards: Vec<Reward>,
    pub new_level: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ChallengeOutcome {
    pub id: DailyChallengeId,
    pub description: String,
    pub inbox_rewards: Vec<Reward>,
    pub new_level: Option<u32>,
}

#[derive(Clone, Debug)]
pub enum CheckInOutcome {
    AlreadyCheckedIn {
        streak_days: u32,
    },
    Recorded {
        streak_days: u32,
        xp_granted: u64,
        points_granted: u64,
        new_level: Option<u32>,
        streak_week: Option<AchievementOutcome>,
    },
}

#[derive(Clone, Debug)]
pub struct RedeemOutcome {
    pub success: bool,
    pub reward: Option<Reward>,
    pub purged_expired: Option<Reward>,
    pub new_level: Option<u32>,
}

impl RedeemOutcome {
    fn not_found() -> Self {
        Self {
            success: false,
            reward: None,
            purged_expired: None,
            new_level: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PackOutcome {
    pub unlocked: Vec<AchievementOutcome>,
    pub challenge: Option<ChallengeOutcome>,
    pub new_level: Option<u32>,
}

enum RedeemFilter {
    Discount,
    FreePack,
}

impl RewardsLedger {
    pub fn new(config: &RewardsConfig) -> Self {
        Self {
            trainers: HashMap::new(),
            reward_ttl_hours: config.reward_ttl_hours,
            checkin_base_xp: config.checkin_base_xp,
            checkin_base_points: config.checkin_base_points,
        }
    }

    pub fn get_or_create_trainer(
        &mut self,
        session_id: &str,
        seed: Option<TrainerSeed>,
    ) -> &mut TrainerProfile {
        self.trainers
            .entry(session_id.to_string())
            .or_insert_with(|| TrainerProfile::new(session_id.to_string(), seed.unwrap_or_default()))
    }

    pub fn remove_trainer(&mut self, session_id: &str) -> bool {
        self.trainers.remove(session_id).is_some()
    }

    pub fn cleanup_trainers(&mut self, session_ids: &[String]) {
        for session_id in session_ids {
            self.trainers.remove(session_id);
        }
    }

    fn trainer_mut(&mut self, session_id: &str) -> Result<&mut TrainerProfile> {
        self.trainers
            .get_mut(session_id)
            .ok_or_else(|| anyhow!("No trainer state for session {}", session_id))
    }

    pub fn add_experience(&mut self, session_id: &str, amount: u64) -> Result<Option<u32>> {
        let trainer = self.trainer_mut(session_id)?;
        Ok(trainer.progression.add_experience(amount))
    }

    /// Raises a counted achievement to `progress` (clamped to its maximum,
    /// never lowered). Reaching the maximum triggers completion.
    pub fn update_achievement_progress(
        &mut self,
        session_id: &str,
        id: AchievementId,
        progress: u32,
    ) -> Result<Option<AchievementOutcome>> {
        let reached_max = {
            let trainer = self.trainer_mut(session_id)?;
            let achievement = trainer
                .achievements
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| anyhow!("Unknown achievement {}", id.as_str()))?;

            if achievement.unlocked {
                return Ok(None);
            }

            let max = achievement
                .max_progress
                .ok_or_else(|| anyhow!("Achievement {} has no progress counter", id.as_str()))?;

            let current = achievement.progress.unwrap_or(0);
            let clamped = progress.min(max).max(current);
            achievement.progress = Some(clamped);
            clamped >= max
        };

        if reached_max {
            return self.complete_achievement(session_id, id).map(Some);
        }

        Ok(None)
    }

    fn bump_achievement_progress(
        &mut self,
        session_id: &str,
        id: AchievementId,
        delta: u32,
    ) -> Result<Option<AchievementOutcome>> {
        let current = {
            let trainer = self.trainer_mut(session_id)?;
            let achievement = trainer
                .achievements
                .iter()
                .find(|a| a.id == id)
                .ok_or_else(|| anyhow!("Unknown achievement {}", id.as_str()))?;

            if achievement.unlocked {
                return Ok(None);
            }
            achievement.progress.unwrap_or(0)
        };

        self.update_achievement_progress(session_id, id, current.saturating_add(delta))
    }

    /// Unlocks an achievement and dispatches its rewards. Idempotent: an
    /// already-unlocked achievement never dispatches again.
    pub fn complete_achievement(
        &mut self,
        session_id: &str,
        id: AchievementId,
    ) -> Result<AchievementOutcome> {
        let ttl_hours = self.reward_ttl_hours;
        let trainer = self.trainer_mut(session_id)?;

        let index = trainer
            .achievements
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| anyhow!("Unknown achievement {}", id.as_str()))?;

        if trainer.achievements[index].unlocked {
            return Ok(AchievementOutcome {
                id,
                name: trainer.achievements[index].name.clone(),
                newly_unlocked: false,
                inbox_rewards: Vec::new(),
                new_level: None,
            });
        }

        trainer.achievements[index].unlocked = true;
        if let Some(max) = trainer.achievements[index].max_progress {
            trainer.achievements[index].progress = Some(max);
        }

        let name = trainer.achievements[index].name.clone();
        let rewards = trainer.achievements[index].rewards.clone();
        let (inbox_rewards, new_level) = dispatch_rewards(trainer, rewards, ttl_hours);

        Ok(AchievementOutcome {
            id,
            name,
            newly_unlocked: true,
            inbox_rewards,
            new_level,
        })
    }

    /// Advances a daily challenge by `amount`. Returns the completion
    /// outcome the first time the target is reached, `None` otherwise.
    pub fn update_challenge_progress(
        &mut self,
        session_id: &str,
        id: DailyChallengeId,
        amount: u32,
    ) -> Result<Option<ChallengeOutcome>> {
        let ttl_hours = self.reward_ttl_hours;
        let trainer = self.trainer_mut(session_id)?;
        refresh_daily_challenges(trainer);

        let challenge = trainer
            .daily_challenges
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| anyhow!("Unknown daily challenge {}", id.as_str()))?;

        if challenge.completed {
            return Ok(None);
        }

        challenge.progress = challenge.progress.saturating_add(amount).min(challenge.target);
        if challenge.progress < challenge.target {
            return Ok(None);
        }

        challenge.completed = true;
        let description = challenge.description.clone();
        let reward = challenge.reward.clone();
        let (inbox_rewards, new_level) = dispatch_rewards(trainer, vec![reward], ttl_hours);

        Ok(Some(ChallengeOutcome {
            id,
            description,
            inbox_rewards,
            new_level,
        }))
    }

    /// Completes a challenge outright regardless of remaining progress.
    pub fn complete_daily_challenge(
        &mut self,
        session_id: &str,
        id: DailyChallengeId,
    ) -> Result<Option<ChallengeOutcome>> {
        let target = {
            let trainer = self.trainer_mut(session_id)?;
            refresh_daily_challenges(trainer);
            trainer
                .daily_challenges
                .iter()
                .find(|c| c.id == id)
                .map(|c| c.target)
                .ok_or_else(|| anyhow!("Unknown daily challenge {}", id.as_str()))?
        };

        self.update_challenge_progress(session_id, id, target)
    }

    pub fn daily_challenges_for(&mut self, session_id: &str) -> Result<Vec<DailyChallenge>> {
        let trainer = self.trainer_mut(session_id)?;
        refresh_daily_challenges(trainer);
        Ok(trainer.daily_challenges.clone())
    }

    /// Records a daily check-in. A second call on the same calendar day
    /// changes nothing; exactly-consecutive days extend the streak, any gap
    /// resets it to 1.
    pub fn check_in(&mut self, session_id: &str) -> Result<CheckInOutcome> {
        let base_xp = self.checkin_base_xp;
        let base_points = self.checkin_base_points;

        let (streak_days, xp_granted, points_granted, mut new_level) = {
            let trainer = self.trainer_mut(session_id)?;
            let today = Local::now().date_naive();

            if trainer.last_check_in == Some(today) {
                return Ok(CheckInOutcome::AlreadyCheckedIn {
                    streak_days: trainer.streak_days,
                });
            }

            let consecutive = trainer
                .last_check_in
                .map(|last| (today - last).num_days() == 1)
                .unwrap_or(false);

            trainer.streak_days = if consecutive { trainer.streak_days + 1 } else { 1 };
            trainer.best_streak = trainer.best_streak.max(trainer.streak_days);
            trainer.last_check_in = Some(today);
            trainer.total_check_ins += 1;

            let scale = trainer.streak_days.min(STREAK_WEEK_DAYS) as u64;
            let xp_granted = base_xp * scale;
            let points_granted = base_points * scale;

            let new_level = trainer.progression.add_experience(xp_granted);
            trainer.grant_points(points_granted);

            (trainer.streak_days, xp_granted, points_granted, new_level)
        };

        let streak_week = if streak_days >= STREAK_WEEK_DAYS {
            let outcome = self.complete_achievement(session_id, AchievementId::StreakWeek)?;
            if outcome.newly_unlocked {
                if outcome.new_level.is_some() {
                    new_level = outcome.new_level;
                }
                Some(outcome)
            } else {
                None
            }
        } else {
            None
        };

        Ok(CheckInOutcome::Recorded {
            streak_days,
            xp_granted,
            points_granted,
            new_level,
            streak_week,
        })
    }

    /// Claims any inbox reward by code, applying self-contained kinds
    /// (XP, loyalty points, badge) to the profile.
    pub fn claim_reward(&mut self, session_id: &str, code: &str) -> Result<RedeemOutcome> {
        self.redeem(session_id, code, None)
    }

    pub fn redeem_discount(&mut self, session_id: &str, code: &str) -> Result<RedeemOutcome> {
        self.redeem(session_id, code, Some(RedeemFilter::Discount))
    }

    pub fn redeem_free_pack(&mut self, session_id: &str, code: &str) -> Result<RedeemOutcome> {
        self.redeem(session_id, code, Some(RedeemFilter::FreePack))
    }

    fn redeem(
        &mut self,
        session_id: &str,
        code: &str,
        filter: Option<RedeemFilter>,
    ) -> Result<RedeemOutcome> {
        let trainer = self.trainer_mut(session_id)?;

        let Some(index) = trainer
            .reward_inbox
            .iter()
            .position(|reward| reward.code.as_deref() == Some(code))
        else {
            return Ok(RedeemOutcome::not_found());
        };

        // Expired rewards are purged on lookup, never claimed
        if trainer.reward_inbox[index].is_expired() {
            let purged = trainer.reward_inbox.remove(index);
            return Ok(RedeemOutcome {
                success: false,
                reward: None,
                purged_expired: Some(purged),
                new_level: None,
            });
        }

        let kind_matches = match filter {
            None => true,
            Some(RedeemFilter::Discount) => {
                matches!(trainer.reward_inbox[index].kind, RewardKind::Discount { .. })
            }
            Some(RedeemFilter::FreePack) => {
                matches!(trainer.reward_inbox[index].kind, RewardKind::FreePack { .. })
            }
        };

        if !kind_matches {
            return Ok(RedeemOutcome::not_found());
        }

        let reward = trainer.reward_inbox.remove(index);
        let mut new_level = None;

        match &reward.kind {
            RewardKind::Xp { amount } => {
                new_level = trainer.progression.add_experience(*amount);
            }
            RewardKind::LoyaltyPoints { amount } => trainer.grant_points(*amount),
            RewardKind::Badge { name } => trainer.add_badge(name),
            RewardKind::Discount { .. } | RewardKind::FreePack { .. } => {}
        }

        Ok(RedeemOutcome {
            success: true,
            reward: Some(reward),
            purged_expired: None,
            new_level,
        })
    }

    /// Active (non-expired) inbox entries; expired ones are purged in place.
    pub fn reward_inbox_for(&mut self, session_id: &str) -> Result<(Vec<Reward>, Vec<Reward>)> {
        let trainer = self.trainer_mut(session_id)?;
        let mut purged = Vec::new();

        trainer.reward_inbox.retain(|reward| {
            if reward.is_expired() {
                purged.push(reward.clone());
                false
            } else {
                true
            }
        });

        Ok((trainer.reward_inbox.clone(), purged))
    }

    /// Bookkeeping after a pack was opened: lifetime counters, collection
    /// achievements, and the daily pack challenge.
    pub fn record_pack_opened(&mut self, session_id: &str, cards_in_pack: u32) -> Result<PackOutcome> {
        {
            let trainer = self.trainer_mut(session_id)?;
            trainer.packs_opened += 1;
            trainer.cards_collected += cards_in_pack;
        }

        let mut unlocked = Vec::new();
        if let Some(outcome) =
            self.bump_achievement_progress(session_id, AchievementId::PackPioneer, 1)?
        {
            unlocked.push(outcome);
        }
        if let Some(outcome) =
            self.bump_achievement_progress(session_id, AchievementId::CardCollector, cards_in_pack)?
        {
            unlocked.push(outcome);
        }

        let challenge =
            self.update_challenge_progress(session_id, DailyChallengeId::PackBreaker, 1)?;

        let new_level = unlocked
            .iter()
            .filter_map(|outcome| outcome.new_level)
            .max()
            .or_else(|| challenge.as_ref().and_then(|c| c.new_level));

        Ok(PackOutcome {
            unlocked,
            challenge,
            new_level,
        })
    }

    /// Sweeps every inbox, returning `(session_id, reward)` for each purged
    /// entry so the caller can broadcast the expiries.
    pub fn purge_expired_rewards(&mut self) -> Vec<(String, Reward)> {
        let mut purged = Vec::new();

        for (session_id, trainer) in self.trainers.iter_mut() {
            trainer.reward_inbox.retain(|reward| {
                if reward.is_expired() {
                    purged.push((session_id.clone(), reward.clone()));
                    false
                } else {
                    true
                }
            });
        }

        purged
    }

    pub fn refresh_all_daily_challenges(&mut self) {
        for trainer in self.trainers.values_mut() {
            refresh_daily_challenges(trainer);
        }
    }

    pub fn generate_leaderboard(&self) -> Leaderboard {
        let mut by_level: Vec<_> = self.trainers.values().collect();
        by_level.sort_by(|a, b| {
            (b.progression.level, b.progression.experience)
                .cmp(&(a.progression.level, a.progression.experience))
        });

        let mut by_points: Vec<_> = self.trainers.values().collect();
        by_points.sort_by(|a, b| b.loyalty_points.cmp(&a.loyalty_points));

        let mut by_streak: Vec<_> = self.trainers.values().collect();
        by_streak.sort_by(|a, b| b.best_streak.cmp(&a.best_streak));

        Leaderboard {
            top_by_level: top_entries(&by_level),
            top_by_points: top_entries(&by_points),
            top_by_streak: top_entries(&by_streak),
            last_updated: chrono::Utc::now(),
        }
    }

    pub fn stats(&self) -> LedgerStats {
        LedgerStats {
            active_trainers: self.trainers.len(),
            total_packs_opened: self
                .trainers
                .values()
                .map(|t| t.packs_opened as u64)
                .sum(),
            achievements_unlocked: self
                .trainers
                .values()
                .flat_map(|t| t.achievements.iter())
                .filter(|a| a.unlocked)
                .count() as u64,
            active_reward_codes: self.trainers.values().map(|t| t.reward_inbox.len()).sum(),
        }
    }
}

fn refresh_daily_challenges(trainer: &mut TrainerProfile) {
    let today = Local::now().date_naive();
    if trainer.challenges_generated_on != today {
        trainer.daily_challenges = daily_challenges(today);
        trainer.challenges_generated_on = today;
    }
}

/// Fans an achievement's or challenge's reward list out over the profile:
/// XP feeds progression, points feed the balance, badges join the badge set,
/// discounts and free packs land in the inbox behind a fresh unique code.
fn dispatch_rewards(
    trainer: &mut TrainerProfile,
    rewards: Vec<Reward>,
    ttl_hours: i64,
) -> (Vec<Reward>, Option<u32>) {
    let mut inbox_rewards = Vec::new();
    let mut new_level = None;

    for reward in rewards {
        match &reward.kind {
            RewardKind::Xp { amount } => {
                if let Some(level) = trainer.progression.add_experience(*amount) {
                    new_level = Some(level);
                }
            }
            RewardKind::LoyaltyPoints { amount } => trainer.grant_points(*amount),
            RewardKind::Badge { name } => trainer.add_badge(name),
            RewardKind::Discount { .. } | RewardKind::FreePack { .. } => {
                let mut stamped = reward.clone().with_code(ttl_hours);
                while stamped
                    .code
                    .as_deref()
                    .map(|code| trainer.has_active_code(code))
                    .unwrap_or(false)
                {
                    stamped.code = Some(generate_code());
                }

                trainer.reward_inbox.push(stamped.clone());
                inbox_rewards.push(stamped);
            }
        }
    }

    (inbox_rewards, new_level)
}

fn top_entries(sorted: &[&TrainerProfile]) -> Vec<LeaderboardEntry> {
    sorted
        .iter()
        .take(10)
        .enumerate()
        .map(|(i, trainer)| LeaderboardEntry {
            session_id: trainer.session_id.clone(),
            display_name: trainer.display_name.clone().unwrap_or_else(|| {
                format!(
                    "Trainer {}",
                    trainer.session_id.chars().take(6).collect::<String>()
                )
            }),
            rank: (i + 1) as u32,
            level: trainer.progression.level,
            loyalty_points: trainer.loyalty_points,
            best_streak: trainer.best_streak,
        })
        .collect()
}

#[derive(Clone, Debug, Serialize)]
pub struct LeaderboardEntry {
    pub session_id: String,
    pub display_name: String,
    pub rank: u32,
    pub level: u32,
    pub loyalty_points: u64,
    pub best_streak: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Leaderboard {
    pub top_by_level: Vec<LeaderboardEntry>,
    pub top_by_points: Vec<LeaderboardEntry>,
    pub top_by_streak: Vec<LeaderboardEntry>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct LedgerStats {
    pub active_trainers: usize,
    pub total_packs_opened: u64,
    pub achievements_unlocked: u64,
    pub active_reward_codes: usize,
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, Utc};

    use super::*;
    use crate::models::types::PackTier;

    fn test_ledger() -> RewardsLedger {
        RewardsLedger::new(&RewardsConfig {
            pack_open_delay_ms: 0,
            reward_ttl_hours: 72,
            checkin_base_xp: 10,
            checkin_base_points: 5,
        })
    }

    fn ledger_with_trainer(session_id: &str) -> RewardsLedger {
        let mut ledger = test_ledger();
        ledger.get_or_create_trainer(session_id, None);
        ledger
    }

    #[test]
    fn test_add_experience_follows_level_formula() {
        let mut ledger = ledger_with_trainer("s1");

        let new_level = ledger.add_experience("s1", 200).unwrap();
        assert_eq!(new_level, Some(3));

        let trainer = &ledger.trainers["s1"];
        assert_eq!(trainer.progression.level, 3);
        assert_eq!(trainer.progression.experience_to_next_level, 600);
    }

    #[test]
    fn test_complete_achievement_dispatches_once() {
        let mut ledger = ledger_with_trainer("s1");

        let first = ledger
            .complete_achievement("s1", AchievementId::FirstPurchase)
            .unwrap();
        assert!(first.newly_unlocked);
        assert_eq!(ledger.trainers["s1"].loyalty_points, 50);

        let second = ledger
            .complete_achievement("s1", AchievementId::FirstPurchase)
            .unwrap();
        assert!(!second.newly_unlocked);
        assert!(second.inbox_rewards.is_empty());
        assert_eq!(ledger.trainers["s1"].loyalty_points, 50);
    }

    #[test]
    fn test_achievement_progress_clamps_and_completes() {
        let mut ledger = ledger_with_trainer("s1");

        let partial = ledger
            .update_achievement_progress("s1", AchievementId::PackPioneer, 4)
            .unwrap();
        assert!(partial.is_none());

        // Overshooting clamps to the maximum and triggers completion
        let outcome = ledger
            .update_achievement_progress("s1", AchievementId::PackPioneer, 99)
            .unwrap()
            .unwrap();
        assert!(outcome.newly_unlocked);
        assert_eq!(outcome.inbox_rewards.len(), 1);

        let trainer = &ledger.trainers["s1"];
        let pioneer = trainer
            .achievements
            .iter()
            .find(|a| a.id == AchievementId::PackPioneer)
            .unwrap();
        assert_eq!(pioneer.progress, Some(10));
        assert!(pioneer.unlocked);
    }

    #[test]
    fn test_achievement_progress_is_monotonic() {
        let mut ledger = ledger_with_trainer("s1");

        ledger
            .update_achievement_progress("s1", AchievementId::CardCollector, 20)
            .unwrap();
        ledger
            .update_achievement_progress("s1", AchievementId::CardCollector, 5)
            .unwrap();

        let trainer = &ledger.trainers["s1"];
        let collector = trainer
            .achievements
            .iter()
            .find(|a| a.id == AchievementId::CardCollector)
            .unwrap();
        assert_eq!(collector.progress, Some(20));
    }

    #[test]
    fn test_achievement_fan_out_reaches_every_target() {
        let mut ledger = ledger_with_trainer("s1");

        // big_spender carries a discount (inbox) and an XP grant
        let outcome = ledger
            .complete_achievement("s1", AchievementId::BigSpender)
            .unwrap();

        assert!(outcome.newly_unlocked);
        assert_eq!(outcome.inbox_rewards.len(), 1);
        assert!(outcome.inbox_rewards[0].code.is_some());

        let trainer = &ledger.trainers["s1"];
        assert_eq!(trainer.progression.experience, 100);
        assert_eq!(trainer.reward_inbox.len(), 1);
    }

    #[test]
    fn test_challenge_completes_once() {
        let mut ledger = ledger_with_trainer("s1");

        assert!(ledger
            .update_challenge_progress("s1", DailyChallengeId::PackBreaker, 1)
            .unwrap()
            .is_some());

        // Re-triggering a completed challenge is a no-op
        assert!(ledger
            .update_challenge_progress("s1", DailyChallengeId::PackBreaker, 1)
            .unwrap()
            .is_none());
        assert!(ledger
            .complete_daily_challenge("s1", DailyChallengeId::PackBreaker)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_challenge_progress_accumulates_to_target() {
        let mut ledger = ledger_with_trainer("s1");

        assert!(ledger
            .update_challenge_progress("s1", DailyChallengeId::CatalogBrowser, 2)
            .unwrap()
            .is_none());
        assert!(ledger
            .update_challenge_progress("s1", DailyChallengeId::CatalogBrowser, 2)
            .unwrap()
            .is_none());

        let outcome = ledger
            .update_challenge_progress("s1", DailyChallengeId::CatalogBrowser, 1)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.id, DailyChallengeId::CatalogBrowser);

        // 25 XP from the browsing reward
        assert_eq!(ledger.trainers["s1"].progression.experience, 25);
    }

    #[test]
    fn test_stale_challenges_regenerate_on_touch() {
        let mut ledger = ledger_with_trainer("s1");
        let yesterday = Local::now().date_naive() - Duration::days(1);

        {
            let trainer = ledger.trainers.get_mut("s1").unwrap();
            trainer.challenges_generated_on = yesterday;
            trainer.daily_challenges = daily_challenges(yesterday);
            trainer.daily_challenges[0].completed = true;
        }

        let challenges = ledger.daily_challenges_for("s1").unwrap();
        assert_eq!(challenges.len(), 3);
        assert!(challenges.iter().all(|c| !c.completed));
        assert_eq!(
            ledger.trainers["s1"].challenges_generated_on,
            Local::now().date_naive()
        );
    }

    #[test]
    fn test_check_in_twice_same_day_is_rejected() {
        let mut ledger = ledger_with_trainer("s1");

        let first = ledger.check_in("s1").unwrap();
        let streak = match first {
            CheckInOutcome::Recorded { streak_days, .. } => streak_days,
            _ => panic!("first check-in must record"),
        };
        assert_eq!(streak, 1);

        match ledger.check_in("s1").unwrap() {
            CheckInOutcome::AlreadyCheckedIn { streak_days } => assert_eq!(streak_days, 1),
            _ => panic!("second check-in must be rejected"),
        }
        assert_eq!(ledger.trainers["s1"].streak_days, 1);
    }

    #[test]
    fn test_consecutive_check_in_extends_streak() {
        let mut ledger = ledger_with_trainer("s1");
        let yesterday = Local::now().date_naive() - Duration::days(1);

        {
            let trainer = ledger.trainers.get_mut("s1").unwrap();
            trainer.last_check_in = Some(yesterday);
            trainer.streak_days = 3;
        }

        match ledger.check_in("s1").unwrap() {
            CheckInOutcome::Recorded {
                streak_days,
                xp_granted,
                points_granted,
                ..
            } => {
                assert_eq!(streak_days, 4);
                assert_eq!(xp_granted, 40);
                assert_eq!(points_granted, 20);
            }
            _ => panic!("check-in must record"),
        }
    }

    #[test]
    fn test_gapped_check_in_resets_streak() {
        let mut ledger = ledger_with_trainer("s1");

        {
            let trainer = ledger.trainers.get_mut("s1").unwrap();
            trainer.last_check_in = Some(Local::now().date_naive() - Duration::days(3));
            trainer.streak_days = 5;
        }

        match ledger.check_in("s1").unwrap() {
            CheckInOutcome::Recorded { streak_days, .. } => assert_eq!(streak_days, 1),
            _ => panic!("check-in must record"),
        }
    }

    #[test]
    fn test_seventh_check_in_unlocks_streak_week() {
        let mut ledger = ledger_with_trainer("s1");

        {
            let trainer = ledger.trainers.get_mut("s1").unwrap();
            trainer.last_check_in = Some(Local::now().date_naive() - Duration::days(1));
            trainer.streak_days = 6;
        }

        match ledger.check_in("s1").unwrap() {
            CheckInOutcome::Recorded {
                streak_days,
                streak_week,
                ..
            } => {
                assert_eq!(streak_days, 7);
                let unlocked = streak_week.expect("streak_week must unlock at 7 days");
                assert_eq!(unlocked.id, AchievementId::StreakWeek);
            }
            _ => panic!("check-in must record"),
        }

        assert!(ledger.trainers["s1"]
            .badges
            .iter()
            .any(|b| b == "Dedicated Trainer"));

        // An eighth consecutive day must not re-dispatch the achievement
        {
            let trainer = ledger.trainers.get_mut("s1").unwrap();
            trainer.last_check_in = Some(Local::now().date_naive() - Duration::days(1));
        }
        match ledger.check_in("s1").unwrap() {
            CheckInOutcome::Recorded { streak_week, .. } => assert!(streak_week.is_none()),
            _ => panic!("check-in must record"),
        }
    }

    #[test]
    fn test_redeem_unknown_code_fails_silently() {
        let mut ledger = ledger_with_trainer("s1");

        let outcome = ledger.redeem_discount("s1", "RMB-DOESNOTX").unwrap();
        assert!(!outcome.success);
        assert!(outcome.reward.is_none());
    }

    #[test]
    fn test_redeem_type_mismatch_fails_and_keeps_reward() {
        let mut ledger = ledger_with_trainer("s1");
        ledger
            .complete_achievement("s1", AchievementId::BigSpender)
            .unwrap();

        let code = ledger.trainers["s1"].reward_inbox[0]
            .code
            .clone()
            .unwrap();

        // The code belongs to a discount, not a free pack
        let outcome = ledger.redeem_free_pack("s1", &code).unwrap();
        assert!(!outcome.success);
        assert_eq!(ledger.trainers["s1"].reward_inbox.len(), 1);

        let outcome = ledger.redeem_discount("s1", &code).unwrap();
        assert!(outcome.success);
        assert!(matches!(
            outcome.reward.unwrap().kind,
            RewardKind::Discount { percent: 10 }
        ));
        assert!(ledger.trainers["s1"].reward_inbox.is_empty());
    }

    #[test]
    fn test_expired_reward_is_purged_on_lookup() {
        let mut ledger = ledger_with_trainer("s1");
        ledger
            .complete_achievement("s1", AchievementId::BigSpender)
            .unwrap();

        let code = {
            let trainer = ledger.trainers.get_mut("s1").unwrap();
            trainer.reward_inbox[0].expires_at = Some(Utc::now() - Duration::hours(1));
            trainer.reward_inbox[0].code.clone().unwrap()
        };

        let outcome = ledger.redeem_discount("s1", &code).unwrap();
        assert!(!outcome.success);
        assert!(outcome.purged_expired.is_some());
        assert!(ledger.trainers["s1"].reward_inbox.is_empty());
    }

    #[test]
    fn test_claim_applies_self_contained_kinds() {
        let mut ledger = ledger_with_trainer("s1");

        {
            let trainer = ledger.trainers.get_mut("s1").unwrap();
            trainer
                .reward_inbox
                .push(Reward::loyalty_points(30, "promo").with_code(72));
        }
        let code = ledger.trainers["s1"].reward_inbox[0]
            .code
            .clone()
            .unwrap();

        let outcome = ledger.claim_reward("s1", &code).unwrap();
        assert!(outcome.success);
        assert_eq!(ledger.trainers["s1"].loyalty_points, 30);
        assert!(ledger.trainers["s1"].reward_inbox.is_empty());
    }

    #[test]
    fn test_record_pack_opened_feeds_counters_and_challenge() {
        let mut ledger = ledger_with_trainer("s1");

        let outcome = ledger.record_pack_opened("s1", 10).unwrap();
        assert!(outcome.unlocked.is_empty());
        let challenge = outcome.challenge.expect("daily pack challenge completes");
        assert_eq!(challenge.id, DailyChallengeId::PackBreaker);

        let trainer = &ledger.trainers["s1"];
        assert_eq!(trainer.packs_opened, 1);
        assert_eq!(trainer.cards_collected, 10);
        // 20 loyalty points from the daily pack bonus
        assert_eq!(trainer.loyalty_points, 20);
    }

    #[test]
    fn test_pack_milestones_unlock_collection_achievements() {
        let mut ledger = ledger_with_trainer("s1");
        let mut unlocked_ids = Vec::new();

        for _ in 0..10 {
            let outcome = ledger.record_pack_opened("s1", 10).unwrap();
            unlocked_ids.extend(outcome.unlocked.iter().map(|o| o.id));
        }

        // 50 cards land at pack five, the tenth pack unlocks the pioneer
        assert!(unlocked_ids.contains(&AchievementId::CardCollector));
        assert!(unlocked_ids.contains(&AchievementId::PackPioneer));
        assert_eq!(unlocked_ids.len(), 2);
        assert_eq!(ledger.trainers["s1"].packs_opened, 10);
        assert_eq!(ledger.trainers["s1"].cards_collected, 100);
    }

    #[test]
    fn test_purge_sweep_reports_owner_and_reward() {
        let mut ledger = ledger_with_trainer("s1");

        {
            let trainer = ledger.trainers.get_mut("s1").unwrap();
            let mut reward = Reward::free_pack(PackTier::Standard, "stale").with_code(72);
            reward.expires_at = Some(Utc::now() - Duration::minutes(5));
            trainer.reward_inbox.push(reward);
        }

        let purged = ledger.purge_expired_rewards();
        assert_eq!(purged.len(), 1);
        assert_eq!(purged[0].0, "s1");
        assert!(ledger.trainers["s1"].reward_inbox.is_empty());
    }

    #[test]
    fn test_logout_tears_down_trainer_state() {
        let mut ledger = ledger_with_trainer("s1");
        assert!(ledger.remove_trainer("s1"));
        assert!(!ledger.remove_trainer("s1"));
        assert!(ledger.trainers.is_empty());
    }

    #[test]
    fn test_leaderboard_ranks_by_each_board() {
        let mut ledger = test_ledger();
        ledger.get_or_create_trainer("a", None);
        ledger.get_or_create_trainer("b", None);

        ledger.add_experience("a", 500).unwrap();
        if let Some(t) = ledger.trainers.get_mut("b") {
            t.loyalty_points = 900;
        }

        let leaderboard = ledger.generate_leaderboard();
        assert_eq!(leaderboard.top_by_level[0].session_id, "a");
        assert_eq!(leaderboard.top_by_points[0].session_id, "b");
        assert_eq!(leaderboard.top_by_level.len(), 2);
    }
}
