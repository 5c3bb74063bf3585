//! Setup: the board is laid out, players pick specialists in turn order,
//! and the starting state for play is dealt.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::action::StartPlayPayload;
use crate::content::{deck_a, deck_b, temple_max_level, RING_LOCATIONS, TREASURY_TIERS};
use crate::error::{ActionError, ActionResult, RuleViolation};
use crate::map::{incompatible_barriers, BarrierId, MapLayout, BARRIER_COUNT, RING};
use crate::processor::play::PlayProcessor;
use crate::state::play::PlayStateDto;
use crate::state::player::{EnrolledPlayer, PlayerDto, SetupPlayer};
use crate::state::private::{PrivateStateDto, PrivateStateHandler};
use crate::state::setup::{SetupStateDto, SetupStateHandler, SpecialistOffer};
use crate::state::types::{
    Bearings, Fluctuations, ItemName, LocationName, MarketOffer, PlayerColor, RivalShip,
    SpecialistName, TempleStatus, ZoneName, MOVES_PER_TURN, STARTING_CARGO_SLOTS,
};

/// Roll a six-sided influence die.
pub(crate) fn roll_influence(rng: &mut impl Rng) -> u8 {
    rng.random_range(1..=6)
}

/// Roll a fresh -1/0/+1 modifier for each market slot.
pub(crate) fn roll_fluctuations(rng: &mut impl Rng) -> Fluctuations {
    Fluctuations {
        slot_1: rng.random_range(-1..=1),
        slot_2: rng.random_range(-1..=1),
        slot_3: rng.random_range(-1..=1),
    }
}

/// Two barriers that never touch each other.
fn draw_barriers(rng: &mut impl Rng) -> Vec<BarrierId> {
    let first = rng.random_range(1..=BARRIER_COUNT);
    let excluded = incompatible_barriers(first);
    let candidates: Vec<BarrierId> = (1..=BARRIER_COUNT)
        .filter(|b| !excluded.contains(b))
        .collect();
    match candidates.choose(rng) {
        Some(second) => vec![first, *second],
        None => vec![first],
    }
}

/// `count` specialists, the `forced` ones first.
fn deal_specialists(
    forced: &[SpecialistName],
    count: usize,
    rng: &mut impl Rng,
) -> Vec<SpecialistName> {
    let mut dealt: Vec<SpecialistName> = Vec::with_capacity(count);
    for name in forced {
        if dealt.len() < count && !dealt.contains(name) {
            dealt.push(*name);
        }
    }

    let mut rest: Vec<SpecialistName> = SpecialistName::iter()
        .filter(|n| !dealt.contains(n))
        .collect();
    rest.shuffle(rng);
    let missing = count.saturating_sub(dealt.len());
    dealt.extend(rest.into_iter().take(missing));
    dealt
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupProcessor {
    state: SetupStateHandler,
}

impl SetupProcessor {
    /// Lay out the board, shuffle turn order and deal one specialist more
    /// than there are players.
    pub fn new(
        players: Vec<EnrolledPlayer>,
        include_rival: bool,
        forced_specialists: &[SpecialistName],
        rng: &mut impl Rng,
    ) -> Self {
        let mut ring = RING_LOCATIONS;
        ring.shuffle(rng);
        let layout = MapLayout::new(ring, draw_barriers(rng));

        let mut order = players;
        order.shuffle(rng);
        let players: Vec<SetupPlayer> = order
            .into_iter()
            .enumerate()
            .map(|(i, p)| SetupPlayer {
                color: p.color,
                name: p.name,
                turn_order: i as u8 + 1,
                specialist: None,
                turn_to_pick: i == 0,
            })
            .collect();

        let specialists = deal_specialists(forced_specialists, players.len() + 1, rng)
            .into_iter()
            .map(|name| SpecialistOffer {
                specialist: name.card(),
                owner: None,
            })
            .collect();

        debug!(barriers = ?layout.barriers, "board laid out");
        Self {
            state: SetupStateHandler::from_dto(SetupStateDto {
                layout,
                specialists,
                players,
                rival_included: include_rival,
            }),
        }
    }

    pub fn from_dto(dto: SetupStateDto) -> Self {
        Self {
            state: SetupStateHandler::from_dto(dto),
        }
    }

    pub fn to_dto(&self) -> SetupStateDto {
        self.state.to_dto()
    }

    pub fn players(&self) -> Vec<SetupPlayer> {
        self.state.players_in_turn_order()
    }

    pub fn rename(&mut self, color: PlayerColor, name: String) -> bool {
        self.state.rename(color, name)
    }

    pub fn pick_specialist(&mut self, color: PlayerColor, name: SpecialistName) -> ActionResult<()> {
        let player = self
            .state
            .player(color)
            .ok_or(RuleViolation::UnknownIdentity)?;
        if !player.turn_to_pick {
            return Err(RuleViolation::NotYourPick.into());
        }
        if !self.state.is_available(name) {
            return Err(RuleViolation::SpecialistUnavailable.into());
        }

        self.state.assign_specialist(color, name);
        info!(%color, specialist = %name, "specialist picked");
        Ok(())
    }

    /// Deal the starting state and hand over to play.
    pub fn start_play(
        &self,
        payload: StartPlayPayload,
        rng: &mut impl Rng,
    ) -> ActionResult<PlayProcessor> {
        if !self.state.all_picked() {
            return Err(RuleViolation::PicksIncomplete.into());
        }
        let setup_players = self.state.players_in_turn_order();
        if payload.setup_coordinates.len() < setup_players.len() {
            return Err(RuleViolation::MissingCoordinates.into());
        }

        let layout = self.state.layout();
        let start_actions = LocationName::Temple.actions();
        let first_destinations = layout.ship_destinations(ZoneName::Center, None);

        let mut players = Vec::with_capacity(setup_players.len());
        for (setup_player, position) in setup_players.iter().zip(&payload.setup_coordinates) {
            let specialist = setup_player
                .specialist
                .ok_or_else(|| ActionError::fatal("picked specialist missing"))?
                .card();
            let is_first = setup_player.turn_order == 1;
            players.push(PlayerDto {
                color: setup_player.color,
                name: setup_player.name.clone(),
                turn_order: setup_player.turn_order,
                favor: specialist.starting_favor,
                specialist,
                is_active: is_first,
                is_anchored: true,
                is_handling_rival: false,
                privileged_sailing: false,
                influence: roll_influence(rng),
                move_actions: if is_first { MOVES_PER_TURN } else { 0 },
                coins: 0,
                vp: 0,
                cargo: vec![ItemName::Empty; STARTING_CARGO_SLOTS],
                bearings: Bearings {
                    sea_zone: ZoneName::Center,
                    position: *position,
                    location: LocationName::Temple,
                },
                destinations: if is_first {
                    first_destinations.clone()
                } else {
                    Vec::new()
                },
                location_actions: if is_first {
                    start_actions.clone()
                } else {
                    Vec::new()
                },
                feasible_trades: Vec::new(),
            });
        }

        let mut cards_a = deck_a();
        cards_a.shuffle(rng);
        let mut cards_b = deck_b();
        cards_b.shuffle(rng);
        let mut tiers = TREASURY_TIERS.to_vec();
        tiers.shuffle(rng);
        let mut private = PrivateStateHandler::from_dto(PrivateStateDto {
            deck_a: cards_a,
            deck_b: cards_b,
            treasury_tiers: tiers,
        });

        let mut draw = || {
            private
                .draw_card()
                .ok_or_else(|| ActionError::fatal("market deck too small to deal"))
        };
        let (slot_3, slot_2, slot_1, future) = (draw()?, draw()?, draw()?, draw()?);
        let treasury = private
            .draw_treasury_tier()
            .ok_or_else(|| ActionError::fatal("treasury tier pool is empty"))?;

        let market = MarketOffer {
            deck_id: private.deck_id(),
            deck_size: private.deck_size(),
            future,
            slot_1,
            slot_2,
            slot_3,
            fluctuations: roll_fluctuations(rng),
        };

        let temple = TempleStatus {
            current_level: 0,
            max_level: temple_max_level(players.len()),
            level_completion: 0,
            treasury,
            donations: Vec::new(),
        };

        let rival = match (self.state.rival_included(), players.first()) {
            (true, Some(first)) => {
                let zone = RING[rng.random_range(0..RING.len())];
                let location = layout
                    .location_of(zone)
                    .ok_or_else(|| ActionError::fatal(format!("no location at {zone}")))?;
                Some(RivalShip {
                    is_controllable: false,
                    active_player_color: first.color,
                    bearings: Bearings {
                        sea_zone: zone,
                        position: Default::default(),
                        location,
                    },
                    moves: MOVES_PER_TURN,
                    destinations: Vec::new(),
                    influence: roll_influence(rng),
                })
            }
            _ => None,
        };

        info!(
            players = players.len(),
            rival = rival.is_some(),
            "starting play"
        );
        Ok(PlayProcessor::new(
            players,
            PlayStateDto {
                layout,
                market,
                temple,
                rival,
            },
            private.to_dto(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::Coordinates;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn enrolled() -> Vec<EnrolledPlayer> {
        [(PlayerColor::Purple, "Ana"), (PlayerColor::Green, "Bo")]
            .into_iter()
            .map(|(color, name)| EnrolledPlayer {
                color,
                name: name.to_string(),
            })
            .collect()
    }

    fn pick_all(processor: &mut SetupProcessor) {
        for player in processor.players() {
            let offer = processor
                .state
                .specialists()
                .into_iter()
                .find(|o| o.owner.is_none())
                .unwrap();
            processor
                .pick_specialist(player.color, offer.specialist.name)
                .unwrap();
        }
    }

    fn coordinates(n: usize) -> StartPlayPayload {
        StartPlayPayload {
            setup_coordinates: (0..n as i32).map(|i| Coordinates::new(i, i)).collect(),
        }
    }

    #[test]
    fn test_barriers_never_adjacent() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let barriers = draw_barriers(&mut rng);
            assert_eq!(barriers.len(), 2);
            assert!(!incompatible_barriers(barriers[0]).contains(&barriers[1]));
        }
    }

    #[test]
    fn test_forced_specialists_are_dealt() {
        let mut rng = StdRng::seed_from_u64(2);
        let dealt = deal_specialists(
            &[SpecialistName::Advisor, SpecialistName::Advisor],
            3,
            &mut rng,
        );
        assert_eq!(dealt.len(), 3);
        assert_eq!(dealt[0], SpecialistName::Advisor);
        assert_eq!(
            dealt.iter().filter(|n| **n == SpecialistName::Advisor).count(),
            1
        );
    }

    #[test]
    fn test_new_assigns_turn_order() {
        let mut rng = StdRng::seed_from_u64(3);
        let processor = SetupProcessor::new(enrolled(), true, &[], &mut rng);
        let players = processor.players();
        assert_eq!(
            players.iter().map(|p| p.turn_order).collect::<Vec<_>>(),
            vec![1, 2]
        );
        assert!(players[0].turn_to_pick);
        assert!(!players[1].turn_to_pick);
        assert_eq!(processor.to_dto().specialists.len(), 3);
    }

    #[test]
    fn test_pick_out_of_turn() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut processor = SetupProcessor::new(enrolled(), false, &[], &mut rng);
        let second = processor.players()[1].color;
        let name = processor.to_dto().specialists[0].specialist.name;
        assert_eq!(
            processor.pick_specialist(second, name),
            Err(ActionError::Rule(RuleViolation::NotYourPick))
        );
    }

    #[test]
    fn test_start_play_requires_picks_and_coordinates() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut processor = SetupProcessor::new(enrolled(), false, &[], &mut rng);
        assert_eq!(
            processor.start_play(coordinates(2), &mut rng).err(),
            Some(ActionError::Rule(RuleViolation::PicksIncomplete))
        );

        pick_all(&mut processor);
        assert_eq!(
            processor.start_play(coordinates(1), &mut rng).err(),
            Some(ActionError::Rule(RuleViolation::MissingCoordinates))
        );
        assert!(processor.start_play(coordinates(2), &mut rng).is_ok());
    }

    #[test]
    fn test_start_play_deals_starting_state() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut processor = SetupProcessor::new(enrolled(), true, &[], &mut rng);
        pick_all(&mut processor);
        let play = processor.start_play(coordinates(2), &mut rng).unwrap();

        let players = play.players();
        let first = players.iter().find(|p| p.turn_order == 1).unwrap();
        let second = players.iter().find(|p| p.turn_order == 2).unwrap();
        assert!(first.is_active);
        assert_eq!(first.move_actions, MOVES_PER_TURN);
        assert_eq!(first.destinations.len(), 6);
        assert!(!second.is_active);
        assert_eq!(first.favor, first.specialist.starting_favor);
        assert_eq!(first.cargo, vec![ItemName::Empty; STARTING_CARGO_SLOTS]);

        let state = play.state();
        assert_eq!(state.market.deck_size, 20);
        assert_eq!(state.market.deck_id, crate::state::types::DeckId::A);
        assert_eq!(state.temple.max_level, 4);
        let rival = state.rival.unwrap();
        assert_eq!(rival.active_player_color, first.color);
        assert_ne!(rival.bearings.sea_zone, ZoneName::Center);
        assert!((1..=6).contains(&rival.influence));
    }
}
