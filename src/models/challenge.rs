use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{reward::Reward, types::PackTier};

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DailyChallengeId {
    CatalogBrowser,
    PackBreaker,
    CartFiller,
}

impl DailyChallengeId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CatalogBrowser => "catalog_browser",
            Self::PackBreaker => "pack_breaker",
            Self::CartFiller => "cart_filler",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "catalog_browser" => Some(Self::CatalogBrowser),
            "pack_breaker" => Some(Self::PackBreaker),
            "cart_filler" => Some(Self::CartFiller),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DailyChallenge {
    pub id: DailyChallengeId,
    pub description: String,
    pub progress: u32,
    pub target: u32,
    pub reward: Reward,
    pub completed: bool,
    pub expires_at: DateTime<Utc>,
}

impl DailyChallenge {
    fn new(
        id: DailyChallengeId,
        description: &str,
        target: u32,
        reward: Reward,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            description: description.to_string(),
            progress: 0,
            target,
            reward,
            completed: false,
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// The fixed three-challenge template, regenerated each local calendar day.
pub fn daily_challenges(day: NaiveDate) -> Vec<DailyChallenge> {
    let expires_at = next_local_midnight(day);

    vec![
        DailyChallenge::new(
            DailyChallengeId::CatalogBrowser,
            "Browse 5 cards in the catalog",
            5,
            Reward::xp(25, "Daily browsing bonus"),
            expires_at,
        ),
        DailyChallenge::new(
            DailyChallengeId::PackBreaker,
            "Open a booster pack",
            1,
            Reward::loyalty_points(20, "Daily pack bonus"),
            expires_at,
        ),
        DailyChallenge::new(
            DailyChallengeId::CartFiller,
            "Add 3 items to your cart",
            3,
            Reward::free_pack(PackTier::Standard, "Daily cart bonus pack"),
            expires_at,
        ),
    ]
}

/// Midnight at the start of the day after `day`, in the local timezone.
/// A DST-skipped midnight falls back to the next representable local hour.
pub fn next_local_midnight(day: NaiveDate) -> DateTime<Utc> {
    let midnight = (day + Duration::days(1)).and_time(NaiveTime::MIN);

    match midnight.and_local_timezone(Local) {
        LocalResult::Single(at) => at.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => (midnight + Duration::hours(1))
            .and_local_timezone(Local)
            .earliest()
            .map(|at| at.with_timezone(&Utc))
            .unwrap_or_else(|| Utc::now() + Duration::days(1)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_has_three_challenges() {
        let today = Local::now().date_naive();
        let challenges = daily_challenges(today);

        assert_eq!(challenges.len(), 3);
        assert!(challenges.iter().all(|c| !c.completed && c.progress == 0));
    }

    #[test]
    fn test_todays_challenges_expire_in_the_future() {
        let today = Local::now().date_naive();
        for challenge in daily_challenges(today) {
            assert!(!challenge.is_expired());
            assert!(challenge.expires_at > Utc::now());
        }
    }

    #[test]
    fn test_yesterdays_challenges_are_expired() {
        let yesterday = Local::now().date_naive() - Duration::days(1);
        for challenge in daily_challenges(yesterday) {
            assert!(challenge.is_expired());
        }
    }

    #[test]
    fn test_expiry_is_at_most_a_day_away() {
        let today = Local::now().date_naive();
        let expires_at = next_local_midnight(today);
        assert!(expires_at - Utc::now() <= Duration::days(1) + Duration::hours(1));
    }
}
