use std::time::Duration;

use crate::models::{
    card::{random_set_name, rarity_slots, Card},
    types::PackTier,
};

/// Opens a booster pack: one simulated network round-trip, then ten cards
/// drawn against the tier's fixed rarity table. The delay is a single
/// non-cancelable wait with no timeout or retry.
pub async fn open_pack(tier: PackTier, delay_ms: u64) -> (String, Vec<Card>) {
    tokio::time::sleep(Duration::from_millis(delay_ms)).await;

    let set_name = random_set_name();
    let cards = rarity_slots(tier)
        .iter()
        .map(|rarity| Card::draw(*rarity, &set_name))
        .collect();

    (set_name, cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CARDS_PER_PACK;

    #[tokio::test]
    async fn test_pack_always_holds_ten_cards() {
        for tier in [PackTier::Standard, PackTier::Premium, PackTier::Ultra] {
            let (_, cards) = open_pack(tier, 0).await;
            assert_eq!(cards.len(), CARDS_PER_PACK);
        }
    }

    #[tokio::test]
    async fn test_rarities_are_index_aligned_to_the_tier_table() {
        for tier in [PackTier::Standard, PackTier::Premium, PackTier::Ultra] {
            let slots = rarity_slots(tier);
            let (_, cards) = open_pack(tier, 0).await;

            for (card, expected) in cards.iter().zip(slots.iter()) {
                assert_eq!(card.rarity, *expected);
            }
        }
    }

    #[tokio::test]
    async fn test_all_cards_share_one_set_name() {
        let (set_name, cards) = open_pack(PackTier::Premium, 0).await;
        assert!(cards.iter().all(|card| card.set_name == set_name));
    }
}
