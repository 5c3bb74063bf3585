//! Player state.
//!
//! A player looks different in every phase, so each phase has its own type
//! and [`PlayerEntity`] tags which one is meant. During play the state lives
//! in a [`PlayerHandler`], which only exposes game operations.
//!
//! # Turn lifecycle (play)
//!
//! ```text
//!   inactive ──activate──▶ active, anchored, 2 moves
//!                            │        ▲
//!                  sail_to   │        │ blocked (moves left: un-anchored)
//!                            ▼        │
//!                         anchored at new zone ──meets rival──▶ handling rival
//!                            │                                     │
//!                  deactivate│◀──────────────── release_rival ─────┘
//!                            ▼
//!                         inactive
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RuleViolation;
use crate::processor::play::PlayerResult;
use crate::state::store::Writable;
use crate::state::types::{
    Bearings, Coordinates, Good, ItemName, LocationAction, MarketSlotKey, Metal, PlayerColor,
    Specialist, SpecialistName, ZoneName, CARGO_UPGRADE_COST, MAX_CARGO_SLOTS, MAX_FAVOR,
    MOVES_PER_TURN,
};

/// A player who has claimed a color but nothing else yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledPlayer {
    pub color: PlayerColor,
    pub name: String,
}

/// A player during setup, picking a specialist in turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupPlayer {
    pub color: PlayerColor,
    pub name: String,
    pub turn_order: u8,
    pub specialist: Option<SpecialistName>,
    pub turn_to_pick: bool,
}

/// Full player state during play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub color: PlayerColor,
    pub name: String,
    pub turn_order: u8,
    pub specialist: Specialist,
    pub is_active: bool,
    pub is_anchored: bool,
    pub is_handling_rival: bool,
    pub privileged_sailing: bool,
    pub influence: u8,
    pub move_actions: u8,
    pub favor: u8,
    pub coins: u8,
    pub vp: u16,
    pub cargo: Vec<ItemName>,
    pub bearings: Bearings,
    pub destinations: Vec<ZoneName>,
    pub location_actions: Vec<LocationAction>,
    pub feasible_trades: Vec<MarketSlotKey>,
}

/// A player in whichever shape the current phase uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEntity {
    Enrolled(EnrolledPlayer),
    Setup(SetupPlayer),
    Playing(PlayerDto),
    Finished(PlayerResult),
}

impl PlayerEntity {
    pub fn color(&self) -> PlayerColor {
        match self {
            Self::Enrolled(p) => p.color,
            Self::Setup(p) => p.color,
            Self::Playing(p) => p.color,
            Self::Finished(p) => p.color,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Enrolled(p) => &p.name,
            Self::Setup(p) => &p.name,
            Self::Playing(p) => &p.name,
            Self::Finished(p) => &p.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Identity {
    color: PlayerColor,
    name: String,
    turn_order: u8,
    specialist: Specialist,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TurnFlags {
    is_active: bool,
    is_anchored: bool,
    is_handling_rival: bool,
    privileged_sailing: bool,
    move_actions: u8,
    influence: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Purse {
    favor: u8,
    coins: u8,
    vp: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Whereabouts {
    bearings: Bearings,
    destinations: Vec<ZoneName>,
    location_actions: Vec<LocationAction>,
}

/// Goods in `cargo`, one entry per loaded good.
pub fn cargo_goods(cargo: &[ItemName]) -> Vec<Good> {
    cargo.iter().filter_map(|item| item.good()).collect()
}

/// Whether `cargo` holds every good in `request`, counting duplicates.
pub fn fulfils(cargo: &[ItemName], request: &[Good]) -> bool {
    let mut available = cargo_goods(cargo);
    request.iter().all(|good| match available.iter().position(|g| g == good) {
        Some(i) => {
            available.swap_remove(i);
            true
        }
        None => false,
    })
}

/// Play-phase player state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerHandler {
    identity: Writable<Identity>,
    flags: Writable<TurnFlags>,
    purse: Writable<Purse>,
    cargo: Writable<Vec<ItemName>>,
    whereabouts: Writable<Whereabouts>,
    feasible_trades: Writable<Vec<MarketSlotKey>>,
}

impl PlayerHandler {
    pub fn from_dto(dto: PlayerDto) -> Self {
        Self {
            identity: Writable::new(Identity {
                color: dto.color,
                name: dto.name,
                turn_order: dto.turn_order,
                specialist: dto.specialist,
            }),
            flags: Writable::new(TurnFlags {
                is_active: dto.is_active,
                is_anchored: dto.is_anchored,
                is_handling_rival: dto.is_handling_rival,
                privileged_sailing: dto.privileged_sailing,
                move_actions: dto.move_actions,
                influence: dto.influence,
            }),
            purse: Writable::new(Purse {
                favor: dto.favor,
                coins: dto.coins,
                vp: dto.vp,
            }),
            cargo: Writable::new(dto.cargo),
            whereabouts: Writable::new(Whereabouts {
                bearings: dto.bearings,
                destinations: dto.destinations,
                location_actions: dto.location_actions,
            }),
            feasible_trades: Writable::new(dto.feasible_trades),
        }
    }

    pub fn to_dto(&self) -> PlayerDto {
        let identity = self.identity.get();
        let flags = self.flags.get();
        let purse = self.purse.get();
        let whereabouts = self.whereabouts.get();
        PlayerDto {
            color: identity.color,
            name: identity.name,
            turn_order: identity.turn_order,
            specialist: identity.specialist,
            is_active: flags.is_active,
            is_anchored: flags.is_anchored,
            is_handling_rival: flags.is_handling_rival,
            privileged_sailing: flags.privileged_sailing,
            influence: flags.influence,
            move_actions: flags.move_actions,
            favor: purse.favor,
            coins: purse.coins,
            vp: purse.vp,
            cargo: self.cargo.get(),
            bearings: whereabouts.bearings,
            destinations: whereabouts.destinations,
            location_actions: whereabouts.location_actions,
            feasible_trades: self.feasible_trades.get(),
        }
    }

    // Queries

    pub fn color(&self) -> PlayerColor {
        self.identity.inspect(|i| i.color)
    }

    pub fn name(&self) -> String {
        self.identity.inspect(|i| i.name.clone())
    }

    pub fn turn_order(&self) -> u8 {
        self.identity.inspect(|i| i.turn_order)
    }

    pub fn is_active(&self) -> bool {
        self.flags.inspect(|f| f.is_active)
    }

    pub fn is_anchored(&self) -> bool {
        self.flags.inspect(|f| f.is_anchored)
    }

    pub fn is_handling_rival(&self) -> bool {
        self.flags.inspect(|f| f.is_handling_rival)
    }

    pub fn is_privileged(&self) -> bool {
        self.flags.inspect(|f| f.privileged_sailing)
    }

    pub fn move_actions(&self) -> u8 {
        self.flags.inspect(|f| f.move_actions)
    }

    pub fn influence(&self) -> u8 {
        self.flags.inspect(|f| f.influence)
    }

    pub fn favor(&self) -> u8 {
        self.purse.inspect(|p| p.favor)
    }

    pub fn coins(&self) -> u8 {
        self.purse.inspect(|p| p.coins)
    }

    pub fn vp(&self) -> u16 {
        self.purse.inspect(|p| p.vp)
    }

    pub fn cargo(&self) -> Vec<ItemName> {
        self.cargo.get()
    }

    pub fn bearings(&self) -> Bearings {
        self.whereabouts.inspect(|w| w.bearings)
    }

    pub fn zone(&self) -> ZoneName {
        self.whereabouts.inspect(|w| w.bearings.sea_zone)
    }

    pub fn destinations(&self) -> Vec<ZoneName> {
        self.whereabouts.inspect(|w| w.destinations.clone())
    }

    pub fn can_reach(&self, zone: ZoneName) -> bool {
        self.whereabouts.inspect(|w| w.destinations.contains(&zone))
    }

    pub fn location_actions(&self) -> Vec<LocationAction> {
        self.whereabouts.inspect(|w| w.location_actions.clone())
    }

    pub fn can_act(&self, action: LocationAction) -> bool {
        self.whereabouts
            .inspect(|w| w.location_actions.contains(&action))
    }

    pub fn feasible_trades(&self) -> Vec<MarketSlotKey> {
        self.feasible_trades.get()
    }

    pub fn empty_slots(&self) -> usize {
        self.cargo.inspect(|c| c.iter().filter(|i| i.is_empty()).count())
    }

    /// Whole metals in cargo (the "extra" halves are not counted).
    pub fn metal_count(&self, metal: Metal) -> usize {
        self.cargo
            .inspect(|c| c.iter().filter(|i| **i == metal.item()).count())
    }

    // Identity

    pub fn rename(&mut self, name: String) {
        self.identity.update(|mut i| {
            i.name = name;
            i
        });
    }

    // Turn flow

    /// Start this player's turn at their current zone.
    pub fn activate(&mut self, destinations: Vec<ZoneName>, actions: Vec<LocationAction>) {
        self.flags.update(|mut f| {
            f.is_active = true;
            f.is_anchored = true;
            f.privileged_sailing = false;
            f.move_actions = MOVES_PER_TURN;
            f
        });
        self.whereabouts.update(|mut w| {
            w.destinations = destinations;
            w.location_actions = actions;
            w
        });
    }

    pub fn deactivate(&mut self) {
        self.flags.update(|mut f| {
            f.is_active = false;
            f.is_anchored = true;
            f.is_handling_rival = false;
            f.privileged_sailing = false;
            f.move_actions = 0;
            f
        });
        self.whereabouts.update(|mut w| {
            w.destinations.clear();
            w.location_actions.clear();
            w
        });
        self.feasible_trades.set(Vec::new());
    }

    pub fn set_influence(&mut self, influence: u8) {
        self.flags.update(|mut f| {
            f.influence = influence;
            f
        });
    }

    /// Lose one influence after winning a contest, never dropping below 1.
    pub fn trim_influence(&mut self) {
        self.flags.update(|mut f| {
            f.influence = f.influence.saturating_sub(1).max(1);
            f
        });
    }

    /// Arrive at a new zone.
    pub fn sail_to(
        &mut self,
        bearings: Bearings,
        destinations: Vec<ZoneName>,
        actions: Vec<LocationAction>,
    ) {
        self.flags.update(|mut f| {
            f.move_actions = f.move_actions.saturating_sub(1);
            f.is_anchored = true;
            f
        });
        self.whereabouts.set(Whereabouts {
            bearings,
            destinations,
            location_actions: actions,
        });
    }

    /// Spend a move on a failed crossing.
    ///
    /// With moves left the ship stays un-anchored; with none left it anchors
    /// where it is and loses this turn's location actions.
    pub fn register_blocked_move(&mut self) {
        let remaining = self.move_actions().saturating_sub(1);
        self.flags.update(|mut f| {
            f.move_actions = remaining;
            f.is_anchored = remaining == 0;
            f
        });
        if remaining == 0 {
            self.whereabouts.update(|mut w| {
                w.destinations.clear();
                w.location_actions.clear();
                w
            });
        }
    }

    pub fn reposition(&mut self, position: Coordinates) {
        self.whereabouts.update(|mut w| {
            w.bearings.position = position;
            w
        });
    }

    /// Take control of the rival.
    pub fn freeze(&mut self) {
        self.flags.update(|mut f| {
            f.is_handling_rival = true;
            f
        });
    }

    /// Give up control of the rival; `rival_zone` is no longer a destination.
    pub fn release_rival(&mut self, rival_zone: ZoneName) {
        self.flags.update(|mut f| {
            f.is_handling_rival = false;
            f
        });
        self.whereabouts.update(|mut w| {
            w.destinations.retain(|z| *z != rival_zone);
            w
        });
    }

    pub fn enable_privileged_sailing(&mut self) -> Result<(), RuleViolation> {
        if self.is_privileged() {
            return Err(RuleViolation::AlreadyPrivileged);
        }
        self.spend_favor(1)?;
        self.flags.update(|mut f| {
            f.privileged_sailing = true;
            f
        });
        Ok(())
    }

    /// Use up a location action for this turn.
    pub fn spend_action(&mut self, action: LocationAction) -> Result<(), RuleViolation> {
        if !self.can_act(action) {
            return Err(RuleViolation::ActionUnavailable(action));
        }
        self.whereabouts.update(|mut w| {
            w.location_actions.retain(|a| *a != action);
            w
        });
        Ok(())
    }

    // Purse

    pub fn add_coins(&mut self, amount: u8) {
        self.purse.update(|mut p| {
            p.coins = p.coins.saturating_add(amount);
            p
        });
    }

    pub fn spend_coins(&mut self, amount: u8) -> Result<(), RuleViolation> {
        let coins = self.coins();
        if coins < amount {
            return Err(RuleViolation::InsufficientCoins);
        }
        self.purse.update(|mut p| {
            p.coins = coins - amount;
            p
        });
        Ok(())
    }

    /// Gain favor up to the ceiling.
    pub fn add_favor(&mut self, amount: u8) {
        self.purse.update(|mut p| {
            p.favor = p.favor.saturating_add(amount).min(MAX_FAVOR);
            p
        });
    }

    pub fn spend_favor(&mut self, amount: u8) -> Result<(), RuleViolation> {
        let favor = self.favor();
        if favor < amount {
            return Err(RuleViolation::InsufficientFavor);
        }
        self.purse.update(|mut p| {
            p.favor = favor - amount;
            p
        });
        Ok(())
    }

    pub fn add_vp(&mut self, amount: u16) {
        self.purse.update(|mut p| {
            p.vp = p.vp.saturating_add(amount);
            p
        });
    }

    // Cargo

    pub fn load_good(&mut self, good: Good) -> Result<(), RuleViolation> {
        let mut cargo = self.cargo.get();
        let slot = cargo
            .iter()
            .position(|i| i.is_empty())
            .ok_or(RuleViolation::CargoFull)?;
        cargo[slot] = good.into();
        self.cargo.set(cargo);
        Ok(())
    }

    /// Stow a metal in two adjacent slots, packing other items to the front.
    pub fn load_metal(&mut self, metal: Metal) -> Result<(), RuleViolation> {
        if self.empty_slots() < 2 {
            return Err(RuleViolation::CargoFull);
        }
        let cargo = self.cargo.get();
        let length = cargo.len();
        let mut packed: Vec<ItemName> = cargo.into_iter().filter(|i| !i.is_empty()).collect();
        packed.push(metal.item());
        packed.push(metal.extra());
        packed.resize(length, ItemName::Empty);
        self.cargo.set(packed);
        Ok(())
    }

    /// Remove one good or one whole metal.
    pub fn drop_item(&mut self, item: ItemName) -> Result<(), RuleViolation> {
        if let Some(metal) = item.metal() {
            return self.unload_metal(metal);
        }
        let mut cargo = self.cargo.get();
        let slot = cargo
            .iter()
            .position(|i| !i.is_empty() && *i == item)
            .ok_or(RuleViolation::ItemNotInCargo)?;
        cargo[slot] = ItemName::Empty;
        self.cargo.set(cargo);
        Ok(())
    }

    pub fn unload_metal(&mut self, metal: Metal) -> Result<(), RuleViolation> {
        let mut cargo = self.cargo.get();
        let slot = cargo
            .iter()
            .position(|i| *i == metal.item())
            .ok_or(RuleViolation::ItemNotInCargo)?;
        cargo[slot] = ItemName::Empty;
        if let Some(extra) = cargo.iter().position(|i| *i == metal.extra()) {
            cargo[extra] = ItemName::Empty;
        }
        self.cargo.set(cargo);
        Ok(())
    }

    /// Remove every good a trade asks for, leaving their slots empty.
    pub fn remove_goods(&mut self, request: &[Good]) -> Result<(), RuleViolation> {
        let mut cargo = self.cargo.get();
        if !fulfils(&cargo, request) {
            return Err(RuleViolation::TradeNotFeasible);
        }
        for good in request {
            let target: ItemName = (*good).into();
            if let Some(slot) = cargo.iter().position(|i| *i == target) {
                cargo[slot] = ItemName::Empty;
            }
        }
        self.cargo.set(cargo);
        Ok(())
    }

    pub fn upgrade_cargo(&mut self) -> Result<(), RuleViolation> {
        if self.cargo.inspect(|c| c.len()) >= MAX_CARGO_SLOTS {
            return Err(RuleViolation::CargoAtCapacity);
        }
        self.spend_coins(CARGO_UPGRADE_COST)?;
        self.cargo.update(|mut c| {
            c.push(ItemName::Empty);
            c
        });
        Ok(())
    }

    pub fn set_feasible_trades(&mut self, trades: Vec<MarketSlotKey>) {
        self.feasible_trades.set(trades);
    }
}
