//! Hidden session data. Persisted, never broadcast.

use serde::{Deserialize, Serialize};

use crate::state::store::Writable;
use crate::state::types::{DeckId, MarketCard, TreasuryTier};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateStateDto {
    pub deck_a: Vec<MarketCard>,
    pub deck_b: Vec<MarketCard>,
    pub treasury_tiers: Vec<TreasuryTier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrivateStateHandler {
    deck_a: Writable<Vec<MarketCard>>,
    deck_b: Writable<Vec<MarketCard>>,
    treasury_tiers: Writable<Vec<TreasuryTier>>,
}

impl PrivateStateHandler {
    pub fn from_dto(dto: PrivateStateDto) -> Self {
        Self {
            deck_a: Writable::new(dto.deck_a),
            deck_b: Writable::new(dto.deck_b),
            treasury_tiers: Writable::new(dto.treasury_tiers),
        }
    }

    pub fn to_dto(&self) -> PrivateStateDto {
        PrivateStateDto {
            deck_a: self.deck_a.get(),
            deck_b: self.deck_b.get(),
            treasury_tiers: self.treasury_tiers.get(),
        }
    }

    /// Cards not yet drawn from either deck.
    pub fn deck_size(&self) -> usize {
        self.deck_a.inspect(Vec::len) + self.deck_b.inspect(Vec::len)
    }

    /// The deck currently being drawn from.
    pub fn deck_id(&self) -> DeckId {
        if self.deck_a.inspect(Vec::is_empty) {
            DeckId::B
        } else {
            DeckId::A
        }
    }

    /// Draw the next market card, switching to deck B once A runs out.
    pub fn draw_card(&mut self) -> Option<MarketCard> {
        for deck in [&mut self.deck_a, &mut self.deck_b] {
            let mut cards = deck.get();
            if let Some(card) = cards.pop() {
                deck.set(cards);
                return Some(card);
            }
        }
        None
    }

    pub fn draw_treasury_tier(&mut self) -> Option<TreasuryTier> {
        let mut tiers = self.treasury_tiers.get();
        let tier = tiers.pop();
        self.treasury_tiers.set(tiers);
        tier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{deck_a, deck_b, TREASURY_TIERS};
    use pretty_assertions::assert_eq;

    fn make_private(a: usize, b: usize) -> PrivateStateHandler {
        PrivateStateHandler::from_dto(PrivateStateDto {
            deck_a: deck_a().into_iter().take(a).collect(),
            deck_b: deck_b().into_iter().take(b).collect(),
            treasury_tiers: TREASURY_TIERS.to_vec(),
        })
    }

    #[test]
    fn test_deck_flips_once() {
        let mut private = make_private(2, 2);
        let mut ids = Vec::new();
        let mut sizes = vec![private.deck_size()];
        while private.draw_card().is_some() {
            ids.push(private.deck_id());
            sizes.push(private.deck_size());
        }
        assert_eq!(ids, vec![DeckId::A, DeckId::B, DeckId::B, DeckId::B]);
        assert_eq!(sizes, vec![4, 3, 2, 1, 0]);
        assert_eq!(private.draw_card(), None);
    }

    #[test]
    fn test_treasury_tiers_run_out() {
        let mut private = make_private(0, 0);
        for _ in 0..TREASURY_TIERS.len() {
            assert!(private.draw_treasury_tier().is_some());
        }
        assert_eq!(private.draw_treasury_tier(), None);
    }

    #[test]
    fn test_dto_round_trip() {
        let private = make_private(3, 1);
        let dto = private.to_dto();
        assert_eq!(PrivateStateHandler::from_dto(dto.clone()).to_dto(), dto);
    }
}
