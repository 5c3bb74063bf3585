//! Inbound actions and their typed payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString, VariantNames};

use crate::state::types::{
    Coordinates, Currency, Good, ItemName, LocationName, MarketSlotKey, Metal, PlayerColor,
    SpecialistName, ZoneName,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantNames,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    // Phase transitions
    Enrol,
    StartSetup,
    PickSpecialist,
    StartPlay,

    // Any phase
    Chat,
    DeclareReset,

    // Play
    Move,
    MoveRival,
    Reposition,
    RepositionRival,
    LoadGood,
    SellGoods,
    DonateGoods,
    BuyMetal,
    DonateMetal,
    EndTurn,
    EndRivalTurn,
    ShiftMarket,
    UpgradeCargo,
    DropItem,
    Undo,
    SpendFavor,
    ForceTurn,
}

impl Action {
    /// Actions a player may still take while steering the rival.
    pub fn allowed_while_handling_rival(&self) -> bool {
        matches!(
            self,
            Self::MoveRival
                | Self::RepositionRival
                | Self::DropItem
                | Self::EndRivalTurn
                | Self::ShiftMarket
                | Self::Undo
        )
    }
}

/// The `message` part of an inbound frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub action: Action,
    #[serde(default)]
    pub payload: Value,
}

/// A complete inbound frame. The message is validated separately so that a
/// bad message can still be answered to its sender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundAction {
    pub identity: String,
    #[serde(default)]
    pub message: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnrolPayload {
    pub color: PlayerColor,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSetupPayload {
    pub include_rival: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PickSpecialistPayload {
    pub name: SpecialistName,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPlayPayload {
    pub setup_coordinates: Vec<Coordinates>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatPayload {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePayload {
    pub zone_id: ZoneName,
    pub position: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositioningPayload {
    pub position: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoadGoodPayload {
    pub item: Good,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DropItemPayload {
    pub item: ItemName,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TradePayload {
    pub slot: MarketSlotKey,
    pub location: LocationName,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetalPurchasePayload {
    pub metal: Metal,
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetalDonationPayload {
    pub metal: Metal,
}

/// A play action after validation, with its typed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayCommand {
    Move(MovePayload),
    MoveRival(MovePayload),
    Reposition(RepositioningPayload),
    RepositionRival(RepositioningPayload),
    LoadGood(LoadGoodPayload),
    SellGoods(TradePayload),
    DonateGoods(TradePayload),
    BuyMetal(MetalPurchasePayload),
    DonateMetal(MetalDonationPayload),
    EndTurn,
    EndRivalTurn,
    ShiftMarket,
    UpgradeCargo,
    DropItem(DropItemPayload),
    Undo,
    SpendFavor,
    ForceTurn,
}
