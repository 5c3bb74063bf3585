//! Play-phase public state: market, temple and rival.

use serde::{Deserialize, Serialize};

use crate::map::MapLayout;
use crate::state::store::Writable;
use crate::state::types::{
    Bearings, Coordinates, DeckId, Fluctuations, MarketCard, MarketOffer, Metal, PlayerColor,
    RivalShip, TempleStatus, TreasuryTier, ZoneName, DONATIONS_PER_LEVEL, MOVES_PER_TURN,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayStateDto {
    pub layout: MapLayout,
    pub market: MarketOffer,
    pub temple: TempleStatus,
    pub rival: Option<RivalShip>,
}

/// What a metal donation did to the temple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempleProgress {
    /// The current level still needs donations.
    Donated,
    /// A level was completed and the next one opened.
    LevelCompleted,
    /// The final level was completed; the game is over.
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayStateHandler {
    layout: Writable<MapLayout>,
    market: Writable<MarketOffer>,
    temple: Writable<TempleStatus>,
    rival: Writable<Option<RivalShip>>,
}

impl PlayStateHandler {
    pub fn from_dto(dto: PlayStateDto) -> Self {
        Self {
            layout: Writable::new(dto.layout),
            market: Writable::new(dto.market),
            temple: Writable::new(dto.temple),
            rival: Writable::new(dto.rival),
        }
    }

    pub fn to_dto(&self) -> PlayStateDto {
        PlayStateDto {
            layout: self.layout.get(),
            market: self.market.get(),
            temple: self.temple.get(),
            rival: self.rival.get(),
        }
    }

    pub fn layout(&self) -> MapLayout {
        self.layout.get()
    }

    pub fn market(&self) -> MarketOffer {
        self.market.get()
    }

    pub fn temple(&self) -> TempleStatus {
        self.temple.get()
    }

    pub fn treasury(&self) -> TreasuryTier {
        self.temple.inspect(|t| t.treasury)
    }

    // Market

    /// Slide every card one slot down, dropping slot 3, and put `next` in the
    /// future slot.
    pub fn shift_market(
        &mut self,
        next: MarketCard,
        deck_id: DeckId,
        deck_size: usize,
        fluctuations: Fluctuations,
    ) {
        self.market.update(|m| MarketOffer {
            deck_id,
            deck_size,
            future: next,
            slot_1: m.future,
            slot_2: m.slot_1,
            slot_3: m.slot_2,
            fluctuations,
        });
    }

    // Temple

    pub fn register_donation(&mut self, metal: Metal) -> TempleProgress {
        let mut temple = self.temple.get();
        temple.donations.push(metal);
        temple.level_completion += 1;

        let progress = if temple.level_completion < DONATIONS_PER_LEVEL {
            TempleProgress::Donated
        } else {
            temple.level_completion = 0;
            temple.current_level += 1;
            if temple.current_level >= temple.max_level {
                TempleProgress::Completed
            } else {
                TempleProgress::LevelCompleted
            }
        };

        self.temple.set(temple);
        progress
    }

    pub fn set_treasury(&mut self, tier: TreasuryTier) {
        self.temple.update(|mut t| {
            t.treasury = tier;
            t
        });
    }

    // Rival

    pub fn rival(&self) -> Option<RivalShip> {
        self.rival.get()
    }

    pub fn rival_zone(&self) -> Option<ZoneName> {
        self.rival.inspect(|r| r.as_ref().map(|r| r.bearings.sea_zone))
    }

    fn update_rival(&mut self, f: impl FnOnce(&mut RivalShip)) {
        self.rival.update(|mut rival| {
            if let Some(r) = rival.as_mut() {
                f(r);
            }
            rival
        });
    }

    /// Make the rival the next turn's responsibility of `color`, not yet controllable.
    pub fn hand_rival_to(&mut self, color: PlayerColor) {
        self.update_rival(|r| {
            r.active_player_color = color;
            r.is_controllable = false;
        });
    }

    /// Let `color` steer the rival for a fresh move budget.
    pub fn grant_rival_control(&mut self, color: PlayerColor, destinations: Vec<ZoneName>) {
        self.update_rival(|r| {
            r.active_player_color = color;
            r.is_controllable = true;
            r.moves = MOVES_PER_TURN;
            r.destinations = destinations;
        });
    }

    pub fn move_rival(&mut self, bearings: Bearings, destinations: Vec<ZoneName>) {
        self.update_rival(|r| {
            r.bearings = bearings;
            r.moves = r.moves.saturating_sub(1);
            r.destinations = destinations;
        });
    }

    pub fn reposition_rival(&mut self, position: Coordinates) {
        self.update_rival(|r| r.bearings.position = position);
    }

    /// Use up whatever moves the rival has left this hand-off.
    pub fn exhaust_rival_moves(&mut self) {
        self.update_rival(|r| {
            r.moves = 0;
            r.destinations.clear();
        });
    }

    /// End a hand-off with a freshly rolled influence.
    pub fn conclude_rival_turn(&mut self, influence: u8) {
        self.update_rival(|r| {
            r.is_controllable = false;
            r.moves = MOVES_PER_TURN;
            r.destinations.clear();
            r.influence = influence;
        });
    }

    /// Lose one influence after winning a contest, never dropping below 1.
    pub fn trim_rival_influence(&mut self) {
        self.update_rival(|r| r.influence = r.influence.saturating_sub(1).max(1));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::{deck_a, RING_LOCATIONS, TREASURY_TIERS};
    use crate::state::types::LocationName;
    use pretty_assertions::assert_eq;

    pub(crate) fn make_play_state(max_level: u8, with_rival: bool) -> PlayStateHandler {
        let deck = deck_a();
        PlayStateHandler::from_dto(PlayStateDto {
            layout: MapLayout::new(RING_LOCATIONS, vec![2, 5]),
            market: MarketOffer {
                deck_id: DeckId::A,
                deck_size: 20,
                future: deck[0].clone(),
                slot_1: deck[1].clone(),
                slot_2: deck[2].clone(),
                slot_3: deck[3].clone(),
                fluctuations: Fluctuations::default(),
            },
            temple: TempleStatus {
                current_level: 0,
                max_level,
                level_completion: 0,
                treasury: TREASURY_TIERS[0],
                donations: Vec::new(),
            },
            rival: with_rival.then(|| RivalShip {
                is_controllable: false,
                active_player_color: PlayerColor::Red,
                bearings: Bearings {
                    sea_zone: ZoneName::BottomLeft,
                    position: Coordinates::new(5, 5),
                    location: LocationName::Forest,
                },
                moves: MOVES_PER_TURN,
                destinations: Vec::new(),
                influence: 3,
            }),
        })
    }

    #[test]
    fn test_market_shift_slides_cards() {
        let mut state = make_play_state(4, false);
        let before = state.market();
        let next = deck_a()[4].clone();

        state.shift_market(next.clone(), DeckId::A, 19, Fluctuations::default());

        let after = state.market();
        assert_eq!(after.slot_1, before.future);
        assert_eq!(after.slot_2, before.slot_1);
        assert_eq!(after.slot_3, before.slot_2);
        assert_eq!(after.future, next);
        assert_eq!(after.deck_size, 19);
    }

    #[test]
    fn test_temple_levels_cycle() {
        let mut state = make_play_state(2, false);
        let mut completions = Vec::new();
        for _ in 0..3 {
            state.register_donation(Metal::Silver);
            completions.push(state.temple().level_completion);
        }
        assert_eq!(completions, vec![1, 2, 0]);
        assert_eq!(state.temple().current_level, 1);

        assert_eq!(state.register_donation(Metal::Gold), TempleProgress::Donated);
        assert_eq!(state.register_donation(Metal::Gold), TempleProgress::Donated);
        assert_eq!(state.register_donation(Metal::Gold), TempleProgress::Completed);
        assert_eq!(state.temple().donations.len(), 6);
    }

    #[test]
    fn test_rival_control_cycle() {
        let mut state = make_play_state(4, true);
        state.grant_rival_control(PlayerColor::Green, vec![ZoneName::Left]);
        let rival = state.rival().unwrap();
        assert!(rival.is_controllable);
        assert_eq!(rival.active_player_color, PlayerColor::Green);

        state.exhaust_rival_moves();
        assert_eq!(state.rival().unwrap().moves, 0);

        state.conclude_rival_turn(6);
        let rival = state.rival().unwrap();
        assert!(!rival.is_controllable);
        assert_eq!(rival.moves, MOVES_PER_TURN);
        assert_eq!(rival.influence, 6);
    }

    #[test]
    fn test_rival_operations_are_noops_without_rival() {
        let mut state = make_play_state(4, false);
        state.hand_rival_to(PlayerColor::Green);
        state.trim_rival_influence();
        assert_eq!(state.rival(), None);
        assert_eq!(state.rival_zone(), None);
    }

    #[test]
    fn test_dto_round_trip() {
        let state = make_play_state(4, true);
        let dto = state.to_dto();
        assert_eq!(PlayStateHandler::from_dto(dto.clone()).to_dto(), dto);
    }
}
