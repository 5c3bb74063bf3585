//! Schemas for every inbound message and payload.

use serde_json::Value;
use strum::VariantNames;

use super::{validate, FieldTest, FieldType};
use crate::action::{
    Action, ChatPayload, ClientMessage, DropItemPayload, EnrolPayload, InboundAction,
    LoadGoodPayload, MetalDonationPayload, MetalPurchasePayload, MovePayload, PickSpecialistPayload, PlayCommand,
    RepositioningPayload, StartPlayPayload, StartSetupPayload, TradePayload,
};
use crate::error::Rejection;
use crate::state::types::{
    Currency, Good, ItemName, LocationName, MarketSlotKey, Metal, PlayerColor, SpecialistName,
    ZoneName,
};

pub const INBOUND_ACTION: &[FieldTest] = &[
    FieldTest::required("identity", FieldType::String),
    FieldTest::nullable("message", FieldType::Object(&[])),
];

pub const CLIENT_MESSAGE: &[FieldTest] = &[
    FieldTest::required("action", FieldType::Enum(Action::VARIANTS)),
    FieldTest::nullable("payload", FieldType::Object(&[])),
];

pub const COORDINATES: &[FieldTest] = &[
    FieldTest::required("x", FieldType::Number),
    FieldTest::required("y", FieldType::Number),
];

pub const ENROL: &[FieldTest] = &[
    FieldTest::required("color", FieldType::Enum(PlayerColor::VARIANTS)),
    FieldTest::required("name", FieldType::String),
];

pub const START_SETUP: &[FieldTest] = &[FieldTest::nullable("includeRival", FieldType::Boolean)];

pub const PICK_SPECIALIST: &[FieldTest] = &[FieldTest::required(
    "name",
    FieldType::Enum(SpecialistName::VARIANTS),
)];

pub const START_PLAY: &[FieldTest] = &[FieldTest::required(
    "setupCoordinates",
    FieldType::Array(&FieldType::Object(COORDINATES)),
)];

pub const CHAT: &[FieldTest] = &[FieldTest::required("message", FieldType::String)];

pub const MOVE: &[FieldTest] = &[
    FieldTest::required("zoneId", FieldType::Enum(ZoneName::VARIANTS)),
    FieldTest::required("position", FieldType::Object(COORDINATES)),
];

pub const REPOSITIONING: &[FieldTest] =
    &[FieldTest::required("position", FieldType::Object(COORDINATES))];

pub const LOAD_GOOD: &[FieldTest] = &[FieldTest::required("item", FieldType::Enum(Good::VARIANTS))];

pub const DROP_ITEM: &[FieldTest] =
    &[FieldTest::required("item", FieldType::Enum(ItemName::VARIANTS))];

pub const TRADE: &[FieldTest] = &[
    FieldTest::required("slot", FieldType::Enum(MarketSlotKey::VARIANTS)),
    FieldTest::required("location", FieldType::Enum(LocationName::VARIANTS)),
];

pub const METAL_PURCHASE: &[FieldTest] = &[
    FieldTest::required("metal", FieldType::Enum(Metal::VARIANTS)),
    FieldTest::required("currency", FieldType::Enum(Currency::VARIANTS)),
];

pub const METAL_DONATION: &[FieldTest] =
    &[FieldTest::required("metal", FieldType::Enum(Metal::VARIANTS))];

/// Validate a transport frame: who sent it, and an object to process.
pub fn parse_inbound(raw: &Value) -> Result<InboundAction, Rejection> {
    validate(raw, INBOUND_ACTION)
}

/// Validate the envelope of an inbound message.
pub fn parse_client_message(raw: &Value) -> Result<ClientMessage, Rejection> {
    validate(raw, CLIENT_MESSAGE)
}

pub fn parse_enrol(payload: &Value) -> Result<EnrolPayload, Rejection> {
    validate(payload, ENROL)
}

/// An absent payload means "no options".
pub fn parse_start_setup(payload: &Value) -> Result<StartSetupPayload, Rejection> {
    if payload.is_null() {
        return Ok(StartSetupPayload { include_rival: None });
    }
    validate(payload, START_SETUP)
}

pub fn parse_pick_specialist(payload: &Value) -> Result<PickSpecialistPayload, Rejection> {
    validate(payload, PICK_SPECIALIST)
}

pub fn parse_start_play(payload: &Value) -> Result<StartPlayPayload, Rejection> {
    validate(payload, START_PLAY)
}

pub fn parse_chat(payload: &Value) -> Result<ChatPayload, Rejection> {
    validate(payload, CHAT)
}

/// Validate a play-phase action's payload and pair it with the action.
///
/// Actions that belong to another phase are rejected here.
pub fn parse_play_command(action: Action, payload: &Value) -> Result<PlayCommand, Rejection> {
    let command = match action {
        Action::Move => PlayCommand::Move(validate::<MovePayload>(payload, MOVE)?),
        Action::MoveRival => PlayCommand::MoveRival(validate::<MovePayload>(payload, MOVE)?),
        Action::Reposition => {
            PlayCommand::Reposition(validate::<RepositioningPayload>(payload, REPOSITIONING)?)
        }
        Action::RepositionRival => {
            PlayCommand::RepositionRival(validate::<RepositioningPayload>(payload, REPOSITIONING)?)
        }
        Action::LoadGood => PlayCommand::LoadGood(validate::<LoadGoodPayload>(payload, LOAD_GOOD)?),
        Action::SellGoods => PlayCommand::SellGoods(validate::<TradePayload>(payload, TRADE)?),
        Action::DonateGoods => PlayCommand::DonateGoods(validate::<TradePayload>(payload, TRADE)?),
        Action::BuyMetal => {
            PlayCommand::BuyMetal(validate::<MetalPurchasePayload>(payload, METAL_PURCHASE)?)
        }
        Action::DonateMetal => {
            PlayCommand::DonateMetal(validate::<MetalDonationPayload>(payload, METAL_DONATION)?)
        }
        Action::DropItem => PlayCommand::DropItem(validate::<DropItemPayload>(payload, DROP_ITEM)?),
        Action::EndTurn => PlayCommand::EndTurn,
        Action::EndRivalTurn => PlayCommand::EndRivalTurn,
        Action::ShiftMarket => PlayCommand::ShiftMarket,
        Action::UpgradeCargo => PlayCommand::UpgradeCargo,
        Action::Undo => PlayCommand::Undo,
        Action::SpendFavor => PlayCommand::SpendFavor,
        Action::ForceTurn => PlayCommand::ForceTurn,
        Action::Enrol
        | Action::StartSetup
        | Action::PickSpecialist
        | Action::StartPlay
        | Action::Chat
        | Action::DeclareReset => {
            return Err(Rejection::new(vec![format!(
                "{action} is not a play action"
            )]))
        }
    };
    Ok(command)
}
