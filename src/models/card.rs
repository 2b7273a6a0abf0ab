use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::types::{CardRarity, PackTier};
use crate::CARDS_PER_PACK;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub rarity: CardRarity,
    pub set_name: String,
}

impl Card {
    pub fn draw(rarity: CardRarity, set_name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: random_card_name(),
            rarity,
            set_name: set_name.to_string(),
        }
    }
}

const CARD_NAMES: &[&str] = &[
    "Charizard",
    "Pikachu",
    "Mewtwo",
    "Eevee",
    "Snorlax",
    "Gengar",
    "Dragonite",
    "Blastoise",
    "Venusaur",
    "Jigglypuff",
    "Lucario",
    "Greninja",
];

const SET_NAMES: &[&str] = &[
    "Base Set",
    "Jungle",
    "Fossil",
    "Team Rocket",
    "Neo Genesis",
];

/// Each tier maps to a fixed, index-aligned rarity table: slot `i` of a pack
/// always carries rarity `rarity_slots(tier)[i]`. The draw is deterministic
/// per slot; only card and set names are randomized.
pub fn rarity_slots(tier: PackTier) -> [CardRarity; CARDS_PER_PACK] {
    use CardRarity::*;

    match tier {
        PackTier::Standard => [
            Common, Common, Common, Common, Common, Common, Uncommon, Uncommon, Uncommon, Rare,
        ],
        PackTier::Premium => [
            Common, Common, Common, Common, Uncommon, Uncommon, Uncommon, Rare, Rare, HoloRare,
        ],
        PackTier::Ultra => [
            Common, Common, Common, Uncommon, Uncommon, Rare, Rare, HoloRare, HoloRare, UltraRare,
        ],
    }
}

pub fn random_card_name() -> String {
    let index = rand::rng().random_range(0..CARD_NAMES.len());
    CARD_NAMES[index].to_string()
}

pub fn random_set_name() -> String {
    let index = rand::rng().random_range(0..SET_NAMES.len());
    SET_NAMES[index].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tier_fills_the_pack() {
        for tier in [PackTier::Standard, PackTier::Premium, PackTier::Ultra] {
            assert_eq!(rarity_slots(tier).len(), CARDS_PER_PACK);
        }
    }

    #[test]
    fn test_higher_tiers_end_with_rarer_slots() {
        assert_eq!(rarity_slots(PackTier::Standard)[9], CardRarity::Rare);
        assert_eq!(rarity_slots(PackTier::Premium)[9], CardRarity::HoloRare);
        assert_eq!(rarity_slots(PackTier::Ultra)[9], CardRarity::UltraRare);
    }

    #[test]
    fn test_drawn_card_keeps_slot_rarity() {
        let card = Card::draw(CardRarity::HoloRare, "Base Set");
        assert_eq!(card.rarity, CardRarity::HoloRare);
        assert_eq!(card.set_name, "Base Set");
        assert!(CARD_NAMES.contains(&card.name.as_str()));
    }
}
