//! Shared domain vocabulary.
//!
//! Every enum here serializes as snake_case, both through serde (wire format)
//! and through strum (the `VARIANTS` lists the validator checks enum
//! membership against). The two spellings must stay identical.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, VariantNames};

/// Maximum players per session (one per color).
pub const MAX_PLAYERS: usize = 4;

/// Minimum players needed to leave enrolment.
pub const MIN_PLAYERS: usize = 2;

/// Move actions granted at the start of every turn (and to the rival per hand-off).
pub const MOVES_PER_TURN: u8 = 2;

/// Favor ceiling.
pub const MAX_FAVOR: u8 = 6;

/// Cargo length at game start.
pub const STARTING_CARGO_SLOTS: usize = 2;

/// Cargo length ceiling.
pub const MAX_CARGO_SLOTS: usize = 4;

/// Price of one cargo upgrade.
pub const CARGO_UPGRADE_COST: u8 = 2;

/// Donations needed to complete one temple level.
pub const DONATIONS_PER_LEVEL: u8 = 3;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlayerColor {
    Purple,
    Yellow,
    Red,
    Green,
}

/// Session phase. Determines which processor is active.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    Enrolment,
    Setup,
    Play,
    Conclusion,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ZoneName {
    Center,
    TopRight,
    Right,
    BottomRight,
    BottomLeft,
    Left,
    TopLeft,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LocationName {
    Temple,
    Market,
    Treasury,
    Quarry,
    Forest,
    Mines,
    Farms,
}

/// Tradeable goods, loaded at resource sites.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Good {
    Gem,
    Cloth,
    Wood,
    Stone,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metal {
    Gold,
    Silver,
}

impl Metal {
    /// Victory points granted when this metal is donated to the temple.
    pub fn donation_reward(&self) -> u16 {
        match self {
            Self::Gold => 10,
            Self::Silver => 5,
        }
    }

    /// Victory points this metal is worth if still in cargo at game end.
    pub fn cargo_value(&self) -> u16 {
        match self {
            Self::Gold => 5,
            Self::Silver => 3,
        }
    }

    pub fn item(&self) -> ItemName {
        match self {
            Self::Gold => ItemName::Gold,
            Self::Silver => ItemName::Silver,
        }
    }

    pub fn extra(&self) -> ItemName {
        match self {
            Self::Gold => ItemName::GoldExtra,
            Self::Silver => ItemName::SilverExtra,
        }
    }
}

/// Content of a single cargo slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemName {
    Empty,
    Gem,
    Cloth,
    Wood,
    Stone,
    Gold,
    Silver,
    GoldExtra,
    SilverExtra,
}

impl From<Good> for ItemName {
    fn from(good: Good) -> Self {
        match good {
            Good::Gem => Self::Gem,
            Good::Cloth => Self::Cloth,
            Good::Wood => Self::Wood,
            Good::Stone => Self::Stone,
        }
    }
}

impl ItemName {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The metal this slot belongs to, including the "extra" half.
    pub fn metal(&self) -> Option<Metal> {
        match self {
            Self::Gold | Self::GoldExtra => Some(Metal::Gold),
            Self::Silver | Self::SilverExtra => Some(Metal::Silver),
            _ => None,
        }
    }

    pub fn good(&self) -> Option<Good> {
        match self {
            Self::Gem => Some(Good::Gem),
            Self::Cloth => Some(Good::Cloth),
            Self::Wood => Some(Good::Wood),
            Self::Stone => Some(Good::Stone),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Currency {
    Coins,
    Favor,
}

/// Actions a location offers to an anchored player, each usable once per turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LocationAction {
    UpgradeCargo,
    SellGoods,
    DonateGoods,
    BuyMetals,
    DonateMetals,
    LoadGood,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MarketSlotKey {
    Slot1,
    Slot2,
    Slot3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeckId {
    A,
    B,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpecialistName {
    Harbormaster,
    Moneychanger,
    Ambassador,
    Priest,
    Navigator,
    Advisor,
}

/// Display position of a ship on the client's map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Where a ship currently is: zone, display position and resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bearings {
    pub sea_zone: ZoneName,
    pub position: Coordinates,
    pub location: LocationName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialist {
    pub name: SpecialistName,
    pub display_name: String,
    pub starting_favor: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub coins: u8,
    pub favor_and_vp: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketCard {
    pub id: String,
    pub request: Vec<Good>,
    pub reward: Reward,
}

/// Per-slot coin modifier, each one of -1, 0 or +1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fluctuations {
    pub slot_1: i8,
    pub slot_2: i8,
    pub slot_3: i8,
}

impl Fluctuations {
    pub fn get(&self, slot: MarketSlotKey) -> i8 {
        match slot {
            MarketSlotKey::Slot1 => self.slot_1,
            MarketSlotKey::Slot2 => self.slot_2,
            MarketSlotKey::Slot3 => self.slot_3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOffer {
    pub deck_id: DeckId,
    pub deck_size: usize,
    pub future: MarketCard,
    pub slot_1: MarketCard,
    pub slot_2: MarketCard,
    pub slot_3: MarketCard,
    pub fluctuations: Fluctuations,
}

impl MarketOffer {
    pub fn card(&self, slot: MarketSlotKey) -> &MarketCard {
        match slot {
            MarketSlotKey::Slot1 => &self.slot_1,
            MarketSlotKey::Slot2 => &self.slot_2,
            MarketSlotKey::Slot3 => &self.slot_3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetalCost {
    pub coins: u8,
    pub favor: u8,
}

impl MetalCost {
    pub fn in_currency(&self, currency: Currency) -> u8 {
        match currency {
            Currency::Coins => self.coins,
            Currency::Favor => self.favor,
        }
    }
}

/// Metal prices valid for one temple level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreasuryTier {
    pub gold_cost: MetalCost,
    pub silver_cost: MetalCost,
}

impl TreasuryTier {
    pub fn cost_of(&self, metal: Metal) -> MetalCost {
        match metal {
            Metal::Gold => self.gold_cost,
            Metal::Silver => self.silver_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TempleStatus {
    pub current_level: u8,
    pub max_level: u8,
    pub level_completion: u8,
    pub treasury: TreasuryTier,
    pub donations: Vec<Metal>,
}

/// The AI-controlled secondary ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RivalShip {
    pub is_controllable: bool,
    pub active_player_color: PlayerColor,
    pub bearings: Bearings,
    pub moves: u8,
    pub destinations: Vec<ZoneName>,
    pub influence: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub color: Option<PlayerColor>,
    pub name: String,
    pub message: String,
    pub sent_at: chrono::DateTime<chrono::Utc>,
}
