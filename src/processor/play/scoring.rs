//! Final scoring.
//!
//! Metals still in cargo count toward victory points. Ties are broken by
//! favor, then coins; players still level after that share the victory.

use serde::{Deserialize, Serialize};

use crate::state::player::PlayerDto;
use crate::state::types::{Metal, PlayerColor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    pub color: PlayerColor,
    pub name: String,
    pub vp: u16,
    pub gold: u8,
    pub silver: u8,
    pub favor: u8,
    pub coins: u8,
    pub total_vp: u16,
}

impl PlayerResult {
    pub fn from_player(player: &PlayerDto) -> Self {
        let count = |metal: Metal| {
            player
                .cargo
                .iter()
                .filter(|item| **item == metal.item())
                .count() as u8
        };
        let gold = count(Metal::Gold);
        let silver = count(Metal::Silver);
        let total_vp = player.vp
            + u16::from(gold) * Metal::Gold.cargo_value()
            + u16::from(silver) * Metal::Silver.cargo_value();

        Self {
            color: player.color,
            name: player.name.clone(),
            vp: player.vp,
            gold,
            silver,
            favor: player.favor,
            coins: player.coins,
            total_vp,
        }
    }

    fn rank(&self) -> (u16, u8, u8) {
        (self.total_vp, self.favor, self.coins)
    }
}

/// Ranked results and the winning color(s).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResults {
    pub results: Vec<PlayerResult>,
    pub winners: Vec<PlayerColor>,
}

impl GameResults {
    pub fn compile(players: &[PlayerDto]) -> Self {
        let mut results: Vec<PlayerResult> = players.iter().map(PlayerResult::from_player).collect();
        results.sort_by(|a, b| b.rank().cmp(&a.rank()));

        let best = results.first().map(PlayerResult::rank);
        let winners = results
            .iter()
            .filter(|r| Some(r.rank()) == best)
            .map(|r| r.color)
            .collect();

        Self { results, winners }
    }

    pub fn rename(&mut self, color: PlayerColor, name: String) -> bool {
        match self.results.iter_mut().find(|r| r.color == color) {
            Some(result) => {
                result.name = name;
                true
            }
            None => false,
        }
    }
}
