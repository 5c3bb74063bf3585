//! Enrolment-phase public state: who has claimed which color.

use serde::{Deserialize, Serialize};

use crate::state::player::EnrolledPlayer;
use crate::state::store::{Keyed, Writable};
use crate::state::types::{PlayerColor, MAX_PLAYERS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrolmentStatus {
    #[default]
    Open,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolmentStateDto {
    pub status: EnrolmentStatus,
    pub players: Vec<EnrolledPlayer>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnrolmentStateHandler {
    status: Writable<EnrolmentStatus>,
    players: Keyed<PlayerColor, EnrolledPlayer>,
}

impl EnrolmentStateHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dto(dto: EnrolmentStateDto) -> Self {
        Self {
            status: Writable::new(dto.status),
            players: Keyed::from_entries(dto.players.into_iter().map(|p| (p.color, p))),
        }
    }

    pub fn to_dto(&self) -> EnrolmentStateDto {
        EnrolmentStateDto {
            status: self.status.get(),
            players: self.players.values(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status.get() == EnrolmentStatus::Open
    }

    pub fn is_color_taken(&self, color: PlayerColor) -> bool {
        self.players.contains(&color)
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        self.players.values().iter().any(|p| p.name == name)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn players(&self) -> Vec<EnrolledPlayer> {
        self.players.values()
    }

    /// Register a player. The session is marked full once every color is claimed.
    pub fn add_player(&mut self, player: EnrolledPlayer) {
        self.players.set(player.color, player);
        if self.players.len() >= MAX_PLAYERS {
            self.status.set(EnrolmentStatus::Full);
        }
    }

    pub fn rename(&mut self, color: PlayerColor, name: String) -> bool {
        self.players.update(&color, |mut p| {
            p.name = name;
            p
        })
    }
}
