//! Play: the turn loop.
//!
//! Every command runs against a draft copy of the processor. The draft
//! replaces the live state only when the command succeeds, so a rejected
//! command never leaves a partial change behind.
//!
//! ```text
//!   ┌──────────── active player ─────────────┐
//!   │ move ─▶ (contest?) ─▶ anchored at zone │
//!   │   │                       │            │
//!   │   │            meets rival ▼           │
//!   │   │            handling rival ─▶ move_rival / shift_market
//!   │   │                       │      end_rival_turn
//!   │   ▼                       ▼            │
//!   │ location actions (once per turn each)  │
//!   │   │                                    │
//!   │ end_turn ─▶ next player in turn order  │
//!   └────────────────────────────────────────┘
//!        market deck exhausted / temple complete ─▶ conclusion
//! ```

mod movement;
mod rival;
pub mod scoring;
mod trading;

use rand::Rng;
use strum::IntoEnumIterator;
use tracing::info;

use crate::action::PlayCommand;
use crate::error::{ActionError, ActionResult, RuleViolation};
use crate::state::backup::{BackupHandler, BackupSnapshot};
use crate::state::play::{PlayStateDto, PlayStateHandler};
use crate::state::player::{fulfils, PlayerDto, PlayerHandler};
use crate::state::private::{PrivateStateDto, PrivateStateHandler};
use crate::state::store::Keyed;
use crate::state::types::{MarketSlotKey, PlayerColor};

pub use scoring::{GameResults, PlayerResult};

/// What a successful command led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    Continue,
    GameOver(GameResults),
}

/// How a command treats the undo buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackupEffect {
    /// Keep the pre-command state for undo.
    Save,
    /// Rolled dice, drew cards or changed turns: nothing before it can be undone.
    Clear,
    /// Undo consumed the buffer itself.
    Keep,
}

/// A reposition by anyone but the active player leaves the active player's
/// undo slot alone.
fn backup_effect(command: &PlayCommand, is_active: bool) -> BackupEffect {
    match command {
        PlayCommand::Reposition(_) if !is_active => BackupEffect::Keep,
        PlayCommand::LoadGood(_)
        | PlayCommand::DropItem(_)
        | PlayCommand::UpgradeCargo
        | PlayCommand::BuyMetal(_)
        | PlayCommand::DonateGoods(_)
        | PlayCommand::SpendFavor
        | PlayCommand::Reposition(_)
        | PlayCommand::RepositionRival(_) => BackupEffect::Save,
        PlayCommand::Move(_)
        | PlayCommand::MoveRival(_)
        | PlayCommand::SellGoods(_)
        | PlayCommand::DonateMetal(_)
        | PlayCommand::EndTurn
        | PlayCommand::EndRivalTurn
        | PlayCommand::ShiftMarket
        | PlayCommand::ForceTurn => BackupEffect::Clear,
        PlayCommand::Undo => BackupEffect::Keep,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayProcessor {
    players: Keyed<PlayerColor, PlayerHandler>,
    state: PlayStateHandler,
    private: PrivateStateHandler,
    backup: BackupHandler,
}

impl PlayProcessor {
    pub fn new(players: Vec<PlayerDto>, play: PlayStateDto, private: PrivateStateDto) -> Self {
        Self::from_parts(players, play, private, None)
    }

    /// Rebuild from persisted parts.
    pub fn from_parts(
        players: Vec<PlayerDto>,
        play: PlayStateDto,
        private: PrivateStateDto,
        backup: Option<BackupSnapshot>,
    ) -> Self {
        let mut processor = Self {
            players: Keyed::from_entries(
                players
                    .into_iter()
                    .map(|p| (p.color, PlayerHandler::from_dto(p))),
            ),
            state: PlayStateHandler::from_dto(play),
            private: PrivateStateHandler::from_dto(private),
            backup: BackupHandler::from_dto(backup),
        };
        processor.refresh_feasible_trades();
        processor
    }

    /// Players in turn order.
    pub fn players(&self) -> Vec<PlayerDto> {
        let mut players: Vec<PlayerDto> = self.players.values().iter().map(|p| p.to_dto()).collect();
        players.sort_by_key(|p| p.turn_order);
        players
    }

    pub fn state(&self) -> PlayStateDto {
        self.state.to_dto()
    }

    pub fn private_state(&self) -> PrivateStateDto {
        self.private.to_dto()
    }

    pub fn backup(&self) -> Option<BackupSnapshot> {
        self.backup.to_dto()
    }

    pub fn is_handling_rival(&self, color: PlayerColor) -> bool {
        self.players
            .get(&color)
            .is_some_and(|p| p.is_handling_rival())
    }

    pub fn rename(&mut self, color: PlayerColor, name: String) -> bool {
        self.players.update(&color, |mut p| {
            p.rename(name);
            p
        })
    }

    /// Run one command for `color`.
    ///
    /// On error the processor is exactly as it was before the call.
    pub fn process(
        &mut self,
        color: PlayerColor,
        command: PlayCommand,
        is_owner: bool,
        rng: &mut impl Rng,
    ) -> ActionResult<PlayOutcome> {
        let is_active = self.players.get(&color).is_some_and(|p| p.is_active());
        let effect = backup_effect(&command, is_active);
        let before = self.backup_snapshot();

        let mut draft = self.clone();
        let outcome = draft.apply(color, command, is_owner, rng)?;
        match effect {
            BackupEffect::Save => draft.backup.save(before),
            BackupEffect::Clear => draft.backup.clear(),
            BackupEffect::Keep => {}
        }
        draft.refresh_feasible_trades();

        *self = draft;
        Ok(outcome)
    }

    fn apply(
        &mut self,
        color: PlayerColor,
        command: PlayCommand,
        is_owner: bool,
        rng: &mut impl Rng,
    ) -> ActionResult<PlayOutcome> {
        match command {
            PlayCommand::Move(payload) => self.sail(color, payload, rng)?,
            PlayCommand::MoveRival(payload) => self.move_rival(color, payload)?,
            PlayCommand::Reposition(payload) => self.reposition(color, payload.position)?,
            PlayCommand::RepositionRival(payload) => {
                self.reposition_rival(color, payload.position)?
            }
            PlayCommand::LoadGood(payload) => self.load_good(color, payload.item)?,
            PlayCommand::SellGoods(payload) => return self.sell_goods(color, payload, rng),
            PlayCommand::DonateGoods(payload) => self.donate_goods(color, payload)?,
            PlayCommand::BuyMetal(payload) => self.buy_metal(color, payload)?,
            PlayCommand::DonateMetal(payload) => return self.donate_metal(color, payload.metal),
            PlayCommand::EndTurn => self.end_turn(color)?,
            PlayCommand::EndRivalTurn => self.end_rival_turn(color, rng)?,
            PlayCommand::ShiftMarket => return self.shift_market(color, rng),
            PlayCommand::UpgradeCargo => self.upgrade_cargo(color)?,
            PlayCommand::DropItem(payload) => self.drop_item(color, payload.item)?,
            PlayCommand::Undo => self.undo(color)?,
            PlayCommand::SpendFavor => self.spend_favor(color)?,
            PlayCommand::ForceTurn => self.force_turn(is_owner, rng)?,
        }
        Ok(PlayOutcome::Continue)
    }

    // Shared helpers

    fn player(&self, color: PlayerColor) -> ActionResult<PlayerHandler> {
        self.players
            .get(&color)
            .ok_or_else(|| ActionError::fatal(format!("no play state for {color}")))
    }

    fn active_player(&self, color: PlayerColor) -> ActionResult<PlayerHandler> {
        let player = self.player(color)?;
        if !player.is_active() {
            return Err(RuleViolation::NotActivePlayer.into());
        }
        Ok(player)
    }

    fn store(&mut self, player: PlayerHandler) {
        self.players.set(player.color(), player);
    }

    fn backup_snapshot(&self) -> BackupSnapshot {
        BackupSnapshot {
            players: self.players(),
            play: self.state.to_dto(),
        }
    }

    /// Recompute which market slots each player could fulfil right now.
    ///
    /// Only the active player at a trading location has any.
    fn refresh_feasible_trades(&mut self) {
        let market = self.state.market();
        for color in self.players.keys() {
            self.players.update(&color, |mut player| {
                let trades = if player.is_active() && player.bearings().location.trades() {
                    let cargo = player.cargo();
                    MarketSlotKey::iter()
                        .filter(|slot| fulfils(&cargo, &market.card(*slot).request))
                        .collect()
                } else {
                    Vec::new()
                };
                player.set_feasible_trades(trades);
                player
            });
        }
    }

    fn final_results(&self) -> GameResults {
        GameResults::compile(&self.players())
    }

    // Turn flow

    fn end_turn(&mut self, color: PlayerColor) -> ActionResult<()> {
        let player = self.active_player(color)?;
        if player.is_handling_rival() {
            return Err(RuleViolation::HandlingRival.into());
        }
        if !player.is_anchored() {
            return Err(RuleViolation::NotAnchored.into());
        }
        self.hand_over_turn(color)
    }

    /// End whoever's turn it is. Only the session owner may do this.
    fn force_turn(&mut self, is_owner: bool, rng: &mut impl Rng) -> ActionResult<()> {
        if !is_owner {
            return Err(RuleViolation::NotOwner.into());
        }
        let active = self
            .players
            .values()
            .into_iter()
            .find(|p| p.is_active())
            .ok_or_else(|| ActionError::fatal("no active player"))?;
        if active.is_handling_rival() {
            self.release_rival(active.color(), rng)?;
        }
        info!(color = %active.color(), "turn forced");
        self.hand_over_turn(active.color())
    }

    fn hand_over_turn(&mut self, color: PlayerColor) -> ActionResult<()> {
        let mut current = self.player(color)?;
        let count = self.players.len() as u8;
        let next_turn = current.turn_order() % count + 1;
        current.deactivate();
        self.store(current);

        let mut next = self
            .players
            .values()
            .into_iter()
            .find(|p| p.turn_order() == next_turn)
            .ok_or_else(|| ActionError::fatal(format!("no player with turn order {next_turn}")))?;
        let layout = self.state.layout();
        let zone = next.zone();
        let location = layout
            .location_of(zone)
            .ok_or_else(|| ActionError::fatal(format!("no location at {zone}")))?;
        next.activate(layout.ship_destinations(zone, None), location.actions());
        let next_color = next.color();
        self.store(next);
        self.state.hand_rival_to(next_color);

        info!(from = %color, to = %next_color, "turn handed over");
        Ok(())
    }

    fn undo(&mut self, color: PlayerColor) -> ActionResult<()> {
        self.active_player(color)?;
        let snapshot = self.backup.take().ok_or(RuleViolation::NoBackup)?;
        self.players = Keyed::from_entries(
            snapshot
                .players
                .into_iter()
                .map(|p| (p.color, PlayerHandler::from_dto(p))),
        );
        self.state = PlayStateHandler::from_dto(snapshot.play);
        Ok(())
    }
}
