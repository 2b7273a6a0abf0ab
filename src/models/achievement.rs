use serde::{Deserialize, Serialize};

use crate::models::{
    reward::Reward,
    types::{AchievementCategory, PackTier},
};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstPurchase,
    BigSpender,
    CardCollector,
    PackPioneer,
    StreakWeek,
    RumbleContender,
}

impl AchievementId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstPurchase => "first_purchase",
            Self::BigSpender => "big_spender",
            Self::CardCollector => "card_collector",
            Self::PackPioneer => "pack_pioneer",
            Self::StreakWeek => "streak_week",
            Self::RumbleContender => "rumble_contender",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "first_purchase" => Some(Self::FirstPurchase),
            "big_spender" => Some(Self::BigSpender),
            "card_collector" => Some(Self::CardCollector),
            "pack_pioneer" => Some(Self::PackPioneer),
            "streak_week" => Some(Self::StreakWeek),
            "rumble_contender" => Some(Self::RumbleContender),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub unlocked: bool,
    pub progress: Option<u32>,
    pub max_progress: Option<u32>,
    pub rewards: Vec<Reward>,
}

impl Achievement {
    fn one_shot(
        id: AchievementId,
        name: &str,
        description: &str,
        category: AchievementCategory,
        rewards: Vec<Reward>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            category,
            unlocked: false,
            progress: None,
            max_progress: None,
            rewards,
        }
    }

    fn counted(
        id: AchievementId,
        name: &str,
        description: &str,
        category: AchievementCategory,
        max_progress: u32,
        rewards: Vec<Reward>,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            category,
            unlocked: false,
            progress: Some(0),
            max_progress: Some(max_progress),
            rewards,
        }
    }

    pub fn first_purchase() -> Self {
        Self::one_shot(
            AchievementId::FirstPurchase,
            "First Purchase!",
            "Buy your first card from the shop",
            AchievementCategory::Shopping,
            vec![Reward::loyalty_points(50, "First purchase bonus")],
        )
    }

    pub fn big_spender() -> Self {
        Self::counted(
            AchievementId::BigSpender,
            "Big Spender!",
            "Spend 500 loyalty points in the shop",
            AchievementCategory::Shopping,
            500,
            vec![
                Reward::discount(10, "10% off your next order"),
                Reward::xp(100, "Big spender bonus XP"),
            ],
        )
    }

    pub fn card_collector() -> Self {
        Self::counted(
            AchievementId::CardCollector,
            "Card Collector!",
            "Collect 50 cards from booster packs",
            AchievementCategory::Collection,
            50,
            vec![
                Reward::free_pack(PackTier::Premium, "Free premium booster pack"),
                Reward::badge("Collector", "Card collector badge"),
            ],
        )
    }

    pub fn pack_pioneer() -> Self {
        Self::counted(
            AchievementId::PackPioneer,
            "Pack Pioneer!",
            "Open 10 booster packs",
            AchievementCategory::Collection,
            10,
            vec![Reward::free_pack(PackTier::Ultra, "Free ultra booster pack")],
        )
    }

    pub fn streak_week() -> Self {
        Self::one_shot(
            AchievementId::StreakWeek,
            "Dedicated Trainer!",
            "Check in 7 days in a row",
            AchievementCategory::Engagement,
            vec![
                Reward::badge("Dedicated Trainer", "Week-long streak badge"),
                Reward::loyalty_points(100, "Streak milestone bonus"),
            ],
        )
    }

    pub fn rumble_contender() -> Self {
        Self::one_shot(
            AchievementId::RumbleContender,
            "Rumble Contender!",
            "Enter your first Rumble contest",
            AchievementCategory::Engagement,
            vec![Reward::xp(150, "Rumble debut bonus XP")],
        )
    }
}

/// The fixed catalog every trainer starts with.
pub fn default_achievements() -> Vec<Achievement> {
    vec![
        Achievement::first_purchase(),
        Achievement::big_spender(),
        Achievement::card_collector(),
        Achievement::pack_pioneer(),
        Achievement::streak_week(),
        Achievement::rumble_contender(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_are_unique() {
        let catalog = default_achievements();
        for (i, a) in catalog.iter().enumerate() {
            for b in catalog.iter().skip(i + 1) {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_id_round_trip() {
        for achievement in default_achievements() {
            assert_eq!(
                AchievementId::from_str(achievement.id.as_str()),
                Some(achievement.id)
            );
        }
    }

    #[test]
    fn test_counted_achievements_start_locked_at_zero() {
        let collector = Achievement::card_collector();
        assert!(!collector.unlocked);
        assert_eq!(collector.progress, Some(0));
        assert_eq!(collector.max_progress, Some(50));
    }
}
