use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::types::PackTier;

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardKind {
    Discount { percent: u32 },
    FreePack { tier: PackTier },
    LoyaltyPoints { amount: u64 },
    Badge { name: String },
    Xp { amount: u64 },
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Reward {
    #[serde(flatten)]
    pub kind: RewardKind,
    pub description: String,
    pub code: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Reward {
    pub fn discount(percent: u32, description: impl Into<String>) -> Self {
        Self {
            kind: RewardKind::Discount { percent },
            description: description.into(),
            code: None,
            expires_at: None,
        }
    }

    pub fn free_pack(tier: PackTier, description: impl Into<String>) -> Self {
        Self {
            kind: RewardKind::FreePack { tier },
            description: description.into(),
            code: None,
            expires_at: None,
        }
    }

    pub fn loyalty_points(amount: u64, description: impl Into<String>) -> Self {
        Self {
            kind: RewardKind::LoyaltyPoints { amount },
            description: description.into(),
            code: None,
            expires_at: None,
        }
    }

    pub fn badge(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: RewardKind::Badge { name: name.into() },
            description: description.into(),
            code: None,
            expires_at: None,
        }
    }

    pub fn xp(amount: u64, description: impl Into<String>) -> Self {
        Self {
            kind: RewardKind::Xp { amount },
            description: description.into(),
            code: None,
            expires_at: None,
        }
    }

    /// Whether this reward must sit in the inbox behind a redeemable code,
    /// as opposed to being applied to the profile immediately.
    pub fn is_claimable(&self) -> bool {
        matches!(
            self.kind,
            RewardKind::Discount { .. } | RewardKind::FreePack { .. }
        )
    }

    /// Stamps the reward with a fresh code and expiry for inbox delivery.
    pub fn with_code(mut self, ttl_hours: i64) -> Self {
        self.code = Some(generate_code());
        self.expires_at = Some(Utc::now() + Duration::hours(ttl_hours));
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| at < Utc::now()).unwrap_or(false)
    }
}

pub fn generate_code() -> String {
    let fragment = Uuid::new_v4().simple().to_string();
    format!("RMB-{}", fragment[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_discount_and_free_pack_are_claimable() {
        assert!(Reward::discount(10, "10% off").is_claimable());
        assert!(Reward::free_pack(PackTier::Standard, "free pack").is_claimable());
        assert!(!Reward::loyalty_points(50, "points").is_claimable());
        assert!(!Reward::badge("Collector", "badge").is_claimable());
        assert!(!Reward::xp(100, "xp").is_claimable());
    }

    #[test]
    fn test_with_code_stamps_code_and_expiry() {
        let reward = Reward::discount(5, "5% off").with_code(72);
        let code = reward.code.as_deref().unwrap();
        assert!(code.starts_with("RMB-"));
        assert_eq!(code.len(), 12);
        assert!(!reward.is_expired());
    }

    #[test]
    fn test_expired_reward_detection() {
        let mut reward = Reward::discount(5, "5% off").with_code(72);
        reward.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(reward.is_expired());
    }

    #[test]
    fn test_reward_kind_serializes_with_type_tag() {
        let reward = Reward::loyalty_points(50, "First purchase bonus");
        let value = serde_json::to_value(&reward).unwrap();
        assert_eq!(value["type"], "loyalty_points");
        assert_eq!(value["amount"], 50);
    }
}
