//! Steering the rival ship after meeting it.

use rand::Rng;
use tracing::debug;

use super::{PlayOutcome, PlayProcessor};
use crate::action::MovePayload;
use crate::error::{ActionError, ActionResult, RuleViolation};
use crate::map::rival_destinations;
use crate::processor::setup::roll_influence;
use crate::state::types::{Bearings, Coordinates, LocationName, PlayerColor, RivalShip};

impl PlayProcessor {
    /// The rival, if `color` currently steers it.
    fn controlled_rival(&self, color: PlayerColor) -> ActionResult<RivalShip> {
        let rival = self.state.rival().ok_or(RuleViolation::NoRival)?;
        if !rival.is_controllable || rival.active_player_color != color {
            return Err(RuleViolation::RivalNotControllable.into());
        }
        Ok(rival)
    }

    pub(super) fn move_rival(&mut self, color: PlayerColor, payload: MovePayload) -> ActionResult<()> {
        let rival = self.controlled_rival(color)?;
        if rival.moves == 0 {
            return Err(RuleViolation::NoMovesLeft.into());
        }
        let target = payload.zone_id;
        if !rival.destinations.contains(&target) {
            return Err(RuleViolation::DestinationUnavailable.into());
        }

        let location = self
            .state
            .layout()
            .location_of(target)
            .ok_or_else(|| ActionError::fatal(format!("no location at {target}")))?;
        let destinations = if rival.moves > 1 {
            rival_destinations(target, Some(rival.bearings.sea_zone))
        } else {
            Vec::new()
        };
        self.state.move_rival(
            Bearings {
                sea_zone: target,
                position: payload.position,
                location,
            },
            destinations,
        );
        debug!(%color, zone = %target, "rival moved");
        Ok(())
    }

    pub(super) fn reposition_rival(
        &mut self,
        color: PlayerColor,
        position: Coordinates,
    ) -> ActionResult<()> {
        self.controlled_rival(color)?;
        self.state.reposition_rival(position);
        Ok(())
    }

    pub(super) fn end_rival_turn(&mut self, color: PlayerColor, rng: &mut impl Rng) -> ActionResult<()> {
        let rival = self.controlled_rival(color)?;
        if rival.moves > 0 {
            return Err(RuleViolation::RivalMovesRemaining.into());
        }
        self.release_rival(color, rng)
    }

    /// Spend the rival's remaining moves on shifting the market. The rival
    /// must be at the market.
    pub(super) fn shift_market(
        &mut self,
        color: PlayerColor,
        rng: &mut impl Rng,
    ) -> ActionResult<PlayOutcome> {
        let rival = self.controlled_rival(color)?;
        if rival.bearings.location != LocationName::Market {
            return Err(RuleViolation::RivalNotAtMarket.into());
        }
        if rival.moves == 0 {
            return Err(RuleViolation::NoMovesLeft.into());
        }
        self.state.exhaust_rival_moves();
        debug!(%color, "market shifted by the rival");
        Ok(self.advance_market(rng))
    }

    /// Return the rival to its idle state and unfreeze `color`.
    pub(super) fn release_rival(&mut self, color: PlayerColor, rng: &mut impl Rng) -> ActionResult<()> {
        let zone = self
            .state
            .rival_zone()
            .ok_or(RuleViolation::NoRival)?;
        self.state.conclude_rival_turn(roll_influence(rng));

        let mut player = self.player(color)?;
        player.release_rival(zone);
        self.store(player);
        Ok(())
    }
}
