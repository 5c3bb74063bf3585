//! Setup-phase public state: board layout, turn order and specialist picks.

use serde::{Deserialize, Serialize};

use crate::map::MapLayout;
use crate::state::player::SetupPlayer;
use crate::state::store::{Keyed, Writable};
use crate::state::types::{PlayerColor, Specialist, SpecialistName};

/// A dealt specialist card and who took it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistOffer {
    pub specialist: Specialist,
    pub owner: Option<PlayerColor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStateDto {
    pub layout: MapLayout,
    pub specialists: Vec<SpecialistOffer>,
    pub players: Vec<SetupPlayer>,
    pub rival_included: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupStateHandler {
    layout: Writable<MapLayout>,
    specialists: Writable<Vec<SpecialistOffer>>,
    players: Keyed<PlayerColor, SetupPlayer>,
    rival_included: Writable<bool>,
}

impl SetupStateHandler {
    pub fn from_dto(dto: SetupStateDto) -> Self {
        Self {
            layout: Writable::new(dto.layout),
            specialists: Writable::new(dto.specialists),
            players: Keyed::from_entries(dto.players.into_iter().map(|p| (p.color, p))),
            rival_included: Writable::new(dto.rival_included),
        }
    }

    pub fn to_dto(&self) -> SetupStateDto {
        SetupStateDto {
            layout: self.layout.get(),
            specialists: self.specialists.get(),
            players: self.players_in_turn_order(),
            rival_included: self.rival_included.get(),
        }
    }

    pub fn layout(&self) -> MapLayout {
        self.layout.get()
    }

    pub fn rival_included(&self) -> bool {
        self.rival_included.get()
    }

    pub fn player(&self, color: PlayerColor) -> Option<SetupPlayer> {
        self.players.get(&color)
    }

    pub fn players_in_turn_order(&self) -> Vec<SetupPlayer> {
        let mut players = self.players.values();
        players.sort_by_key(|p| p.turn_order);
        players
    }

    pub fn specialists(&self) -> Vec<SpecialistOffer> {
        self.specialists.get()
    }

    pub fn is_available(&self, name: SpecialistName) -> bool {
        self.specialists
            .inspect(|s| s.iter().any(|o| o.specialist.name == name && o.owner.is_none()))
    }

    pub fn all_picked(&self) -> bool {
        self.players.values().iter().all(|p| p.specialist.is_some())
    }

    /// Give `name` to `color` and pass the pick to the next player without one.
    pub fn assign_specialist(&mut self, color: PlayerColor, name: SpecialistName) {
        self.specialists.update(|mut offers| {
            if let Some(offer) = offers.iter_mut().find(|o| o.specialist.name == name) {
                offer.owner = Some(color);
            }
            offers
        });
        self.players.update(&color, |mut p| {
            p.specialist = Some(name);
            p.turn_to_pick = false;
            p
        });
        let next = self
            .players_in_turn_order()
            .into_iter()
            .find(|p| p.specialist.is_none());
        if let Some(next) = next {
            self.players.update(&next.color, |mut p| {
                p.turn_to_pick = true;
                p
            });
        }
    }

    pub fn rename(&mut self, color: PlayerColor, name: String) -> bool {
        self.players.update(&color, |mut p| {
            p.name = name;
            p
        })
    }
}
