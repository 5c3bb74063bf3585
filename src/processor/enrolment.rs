//! Enrolment: players claim a color and a name.

use tracing::info;

use crate::error::{ActionResult, RuleViolation};
use crate::state::enrolment::{EnrolmentStateDto, EnrolmentStateHandler};
use crate::state::player::EnrolledPlayer;
use crate::state::types::{PlayerColor, MIN_PLAYERS};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnrolmentProcessor {
    state: EnrolmentStateHandler,
}

impl EnrolmentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dto(dto: EnrolmentStateDto) -> Self {
        Self {
            state: EnrolmentStateHandler::from_dto(dto),
        }
    }

    pub fn to_dto(&self) -> EnrolmentStateDto {
        self.state.to_dto()
    }

    pub fn players(&self) -> Vec<EnrolledPlayer> {
        self.state.players()
    }

    pub fn enrol(&mut self, player: EnrolledPlayer) -> ActionResult<()> {
        if !self.state.is_open() {
            return Err(RuleViolation::EnrolmentClosed.into());
        }
        if self.state.is_color_taken(player.color) {
            return Err(RuleViolation::ColorTaken(player.color).into());
        }
        if self.state.is_name_taken(&player.name) {
            return Err(RuleViolation::NameTaken.into());
        }

        info!(color = %player.color, "player enrolled");
        self.state.add_player(player);
        Ok(())
    }

    /// Players to carry into setup, once enough have enrolled.
    pub fn roster_for_setup(&self) -> ActionResult<Vec<EnrolledPlayer>> {
        if self.state.player_count() < MIN_PLAYERS {
            return Err(RuleViolation::NotEnoughPlayers(MIN_PLAYERS).into());
        }
        Ok(self.state.players())
    }

    pub fn rename(&mut self, color: PlayerColor, name: String) -> bool {
        self.state.rename(color, name)
    }
}
