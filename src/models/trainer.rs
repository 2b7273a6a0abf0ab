use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{
    achievement::{default_achievements, Achievement},
    challenge::{daily_challenges, DailyChallenge},
    progression::Progression,
    reward::Reward,
};

/// Per-session gamification state. Created on first touch of a valid
/// session, torn down on logout or session expiry. Never persisted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainerProfile {
    pub session_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub loyalty_points: u64,
    pub progression: Progression,
    pub badges: Vec<String>,
    pub achievements: Vec<Achievement>,
    pub daily_challenges: Vec<DailyChallenge>,
    pub challenges_generated_on: NaiveDate,
    pub streak_days: u32,
    pub best_streak: u32,
    pub last_check_in: Option<NaiveDate>,
    pub total_check_ins: u32,
    pub packs_opened: u32,
    pub cards_collected: u32,
    pub reward_inbox: Vec<Reward>,
}

/// Identity seed handed over by the auth collaborator on session creation.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TrainerSeed {
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub loyalty_points: Option<u64>,
}

impl TrainerProfile {
    pub fn new(session_id: String, seed: TrainerSeed) -> Self {
        let today = Local::now().date_naive();

        Self {
            session_id,
            display_name: seed.display_name,
            email: seed.email,
            loyalty_points: seed.loyalty_points.unwrap_or(0),
            progression: Progression::new(),
            badges: Vec::new(),
            achievements: default_achievements(),
            daily_challenges: daily_challenges(today),
            challenges_generated_on: today,
            streak_days: 0,
            best_streak: 0,
            last_check_in: None,
            total_check_ins: 0,
            packs_opened: 0,
            cards_collected: 0,
            reward_inbox: Vec::new(),
        }
    }

    pub fn grant_points(&mut self, amount: u64) {
        self.loyalty_points += amount;
    }

    pub fn add_badge(&mut self, name: &str) {
        if !self.badges.iter().any(|badge| badge == name) {
            self.badges.push(name.to_string());
        }
    }

    pub fn has_active_code(&self, code: &str) -> bool {
        self.reward_inbox
            .iter()
            .any(|reward| reward.code.as_deref() == Some(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_points_become_starting_balance() {
        let seed = TrainerSeed {
            display_name: Some("Ash".to_string()),
            email: Some("ash@pallet.town".to_string()),
            loyalty_points: Some(120),
        };
        let trainer = TrainerProfile::new("session-1".to_string(), seed);

        assert_eq!(trainer.loyalty_points, 120);
        assert_eq!(trainer.progression.level, 1);
        assert_eq!(trainer.daily_challenges.len(), 3);
        assert!(trainer.achievements.iter().all(|a| !a.unlocked));
    }

    #[test]
    fn test_badges_do_not_duplicate() {
        let mut trainer = TrainerProfile::new("session-1".to_string(), TrainerSeed::default());
        trainer.add_badge("Collector");
        trainer.add_badge("Collector");
        assert_eq!(trainer.badges.len(), 1);
    }
}
