//! Sailing between zones, including contested arrivals.

use rand::Rng;
use tracing::debug;

use super::PlayProcessor;
use crate::action::MovePayload;
use crate::error::{ActionError, ActionResult, RuleViolation};
use crate::map::rival_destinations;
use crate::processor::setup::roll_influence;
use crate::state::types::{Bearings, Coordinates, PlayerColor};

/// Whether a mover with `roll` is turned away by defenders with `influences`.
///
/// Only a strictly higher influence blocks; ties go to the mover.
pub(crate) fn is_blocked(roll: u8, influences: &[u8]) -> bool {
    influences.iter().any(|i| *i > roll)
}

impl PlayProcessor {
    pub(super) fn sail(
        &mut self,
        color: PlayerColor,
        payload: MovePayload,
        rng: &mut impl Rng,
    ) -> ActionResult<()> {
        let mut player = self.active_player(color)?;
        if player.move_actions() == 0 {
            return Err(RuleViolation::NoMovesLeft.into());
        }
        let target = payload.zone_id;
        if !player.can_reach(target) {
            return Err(RuleViolation::DestinationUnavailable.into());
        }

        let occupants: Vec<_> = self
            .players
            .values()
            .into_iter()
            .filter(|p| p.color() != color && p.zone() == target)
            .collect();
        let rival = self
            .state
            .rival()
            .filter(|r| r.bearings.sea_zone == target);

        if !player.is_privileged() && (!occupants.is_empty() || rival.is_some()) {
            let roll = roll_influence(rng);
            player.set_influence(roll);

            let mut defenders: Vec<u8> = occupants.iter().map(|p| p.influence()).collect();
            defenders.extend(rival.as_ref().map(|r| r.influence));

            if is_blocked(roll, &defenders) {
                let strongest = defenders.iter().copied().max().unwrap_or(0);
                for mut occupant in occupants {
                    if occupant.influence() == strongest {
                        occupant.trim_influence();
                        self.store(occupant);
                    }
                }
                if rival.is_some_and(|r| r.influence == strongest) {
                    self.state.trim_rival_influence();
                }

                player.register_blocked_move();
                debug!(%color, zone = %target, roll, strongest, "move blocked");
                self.store(player);
                return Ok(());
            }
        }

        let layout = self.state.layout();
        let location = layout
            .location_of(target)
            .ok_or_else(|| ActionError::fatal(format!("no location at {target}")))?;
        let came_from = player.zone();
        player.sail_to(
            Bearings {
                sea_zone: target,
                position: payload.position,
                location,
            },
            layout.ship_destinations(target, Some(came_from)),
            location.actions(),
        );

        if rival.is_some() {
            player.freeze();
            self.state
                .grant_rival_control(color, rival_destinations(target, None));
            debug!(%color, zone = %target, "player took control of the rival");
        }

        self.store(player);
        Ok(())
    }

    pub(super) fn reposition(
        &mut self,
        color: PlayerColor,
        position: Coordinates,
    ) -> ActionResult<()> {
        let mut player = self.player(color)?;
        player.reposition(position);
        self.store(player);
        Ok(())
    }
}
