//! Static game content: specialists, market decks, treasury tiers and what
//! each location offers.

use crate::state::types::{
    Good, LocationAction, LocationName, MarketCard, MetalCost, Reward, Specialist,
    SpecialistName, TreasuryTier,
};

impl SpecialistName {
    pub fn card(&self) -> Specialist {
        let (display_name, starting_favor) = match self {
            Self::Harbormaster => ("Harbormaster", 2),
            Self::Moneychanger => ("Moneychanger", 2),
            Self::Ambassador => ("Ambassador", 4),
            Self::Priest => ("Priest", 3),
            Self::Navigator => ("Navigator", 2),
            Self::Advisor => ("Advisor", 3),
        };
        Specialist {
            name: *self,
            display_name: display_name.to_string(),
            starting_favor,
        }
    }
}

impl LocationName {
    /// Actions available to a player anchored here at the start of a visit.
    pub fn actions(&self) -> Vec<LocationAction> {
        match self {
            Self::Temple => vec![
                LocationAction::UpgradeCargo,
                LocationAction::DonateGoods,
                LocationAction::DonateMetals,
            ],
            Self::Market => vec![LocationAction::SellGoods],
            Self::Treasury => vec![LocationAction::BuyMetals],
            Self::Quarry | Self::Forest | Self::Mines | Self::Farms => {
                vec![LocationAction::LoadGood]
            }
        }
    }

    /// The good a resource site hands out.
    pub fn good(&self) -> Option<Good> {
        match self {
            Self::Quarry => Some(Good::Stone),
            Self::Forest => Some(Good::Wood),
            Self::Mines => Some(Good::Gem),
            Self::Farms => Some(Good::Cloth),
            Self::Temple | Self::Market | Self::Treasury => None,
        }
    }

    /// Locations where the market's trade slots can be fulfilled.
    pub fn trades(&self) -> bool {
        matches!(self, Self::Market | Self::Temple)
    }
}

/// Locations spread over the ring zones during setup. The temple is fixed.
pub const RING_LOCATIONS: [LocationName; 6] = [
    LocationName::Market,
    LocationName::Treasury,
    LocationName::Quarry,
    LocationName::Forest,
    LocationName::Mines,
    LocationName::Farms,
];

type CardRow = (&'static str, &'static [Good], u8, u8);

use crate::state::types::Good::{Cloth, Gem, Stone, Wood};

const DECK_A: [CardRow; 12] = [
    ("A01", &[Gem, Gem], 4, 2),
    ("A02", &[Cloth, Cloth], 3, 2),
    ("A03", &[Wood, Wood], 3, 1),
    ("A04", &[Stone, Stone], 3, 1),
    ("A05", &[Gem, Cloth], 4, 1),
    ("A06", &[Gem, Wood], 3, 2),
    ("A07", &[Gem, Stone], 3, 2),
    ("A08", &[Cloth, Wood], 2, 2),
    ("A09", &[Cloth, Stone], 2, 2),
    ("A10", &[Wood, Stone], 2, 1),
    ("A11", &[Stone, Gem], 4, 1),
    ("A12", &[Wood, Cloth], 3, 1),
];

const DECK_B: [CardRow; 12] = [
    ("B01", &[Gem, Gem, Gem], 7, 3),
    ("B02", &[Cloth, Cloth, Cloth], 6, 3),
    ("B03", &[Wood, Wood, Wood], 5, 3),
    ("B04", &[Stone, Stone, Stone], 5, 3),
    ("B05", &[Gem, Cloth, Wood], 6, 2),
    ("B06", &[Gem, Cloth, Stone], 6, 2),
    ("B07", &[Gem, Wood, Stone], 5, 3),
    ("B08", &[Cloth, Wood, Stone], 5, 2),
    ("B09", &[Gem, Gem, Stone], 6, 3),
    ("B10", &[Cloth, Cloth, Wood], 5, 2),
    ("B11", &[Wood, Wood, Gem], 5, 3),
    ("B12", &[Stone, Stone, Cloth], 4, 3),
];

fn build_deck(specs: &[CardRow]) -> Vec<MarketCard> {
    specs
        .iter()
        .map(|(id, request, coins, favor_and_vp)| MarketCard {
            id: id.to_string(),
            request: request.to_vec(),
            reward: Reward {
                coins: *coins,
                favor_and_vp: *favor_and_vp,
            },
        })
        .collect()
}

/// Unshuffled primary deck.
pub fn deck_a() -> Vec<MarketCard> {
    build_deck(&DECK_A)
}

/// Unshuffled secondary deck, drawn once the primary is exhausted.
pub fn deck_b() -> Vec<MarketCard> {
    build_deck(&DECK_B)
}

const fn tier(gold: (u8, u8), silver: (u8, u8)) -> TreasuryTier {
    TreasuryTier {
        gold_cost: MetalCost {
            coins: gold.0,
            favor: gold.1,
        },
        silver_cost: MetalCost {
            coins: silver.0,
            favor: silver.1,
        },
    }
}

/// Unshuffled pool of metal price tiers; one is drawn per temple level.
pub const TREASURY_TIERS: [TreasuryTier; 8] = [
    tier((5, 3), (3, 2)),
    tier((6, 3), (3, 2)),
    tier((6, 4), (4, 2)),
    tier((7, 4), (4, 3)),
    tier((7, 5), (5, 3)),
    tier((8, 5), (5, 3)),
    tier((8, 6), (6, 4)),
    tier((9, 6), (6, 4)),
];

/// Temple levels to complete before the game ends.
pub fn temple_max_level(player_count: usize) -> u8 {
    (player_count as u8).saturating_add(2)
}
