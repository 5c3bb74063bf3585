//! Location actions: loading goods, trading, metals and cargo.

use rand::Rng;
use tracing::{debug, info};

use super::{PlayOutcome, PlayProcessor};
use crate::action::{MetalPurchasePayload, TradePayload};
use crate::error::{ActionError, ActionResult, RuleViolation};
use crate::processor::setup::roll_fluctuations;
use crate::state::play::TempleProgress;
use crate::state::player::PlayerHandler;
use crate::state::types::{
    Currency, Good, ItemName, LocationAction, LocationName, MarketCard, Metal, PlayerColor,
};

/// Coins paid for a market card after its slot's fluctuation. Never negative.
fn sale_price(base: u8, fluctuation: i8) -> u8 {
    (i16::from(base) + i16::from(fluctuation)).clamp(0, i16::from(u8::MAX)) as u8
}

impl PlayProcessor {
    /// The active player, anchored, with `action` still available this turn.
    fn at_location(&self, color: PlayerColor, action: LocationAction) -> ActionResult<PlayerHandler> {
        let player = self.active_player(color)?;
        if !player.is_anchored() {
            return Err(RuleViolation::NotAnchored.into());
        }
        if !player.can_act(action) {
            return Err(RuleViolation::ActionUnavailable(action).into());
        }
        Ok(player)
    }

    fn trade(
        &self,
        color: PlayerColor,
        payload: &TradePayload,
        action: LocationAction,
        location: LocationName,
    ) -> ActionResult<(PlayerHandler, MarketCard)> {
        if payload.location != location {
            return Err(RuleViolation::LocationMismatch.into());
        }
        let player = self.at_location(color, action)?;
        if player.bearings().location != location {
            return Err(RuleViolation::LocationMismatch.into());
        }
        if !player.feasible_trades().contains(&payload.slot) {
            return Err(RuleViolation::TradeNotFeasible.into());
        }
        let card = self.state.market().card(payload.slot).clone();
        Ok((player, card))
    }

    /// Draw the next card into the market. The game ends once both decks
    /// are empty, including when this draw took the last card.
    pub(super) fn advance_market(&mut self, rng: &mut impl Rng) -> PlayOutcome {
        if let Some(card) = self.private.draw_card() {
            let fluctuations = roll_fluctuations(rng);
            self.state.shift_market(
                card,
                self.private.deck_id(),
                self.private.deck_size(),
                fluctuations,
            );
        }
        if self.private.deck_size() > 0 {
            return PlayOutcome::Continue;
        }
        info!("market decks exhausted");
        PlayOutcome::GameOver(self.final_results())
    }

    pub(super) fn load_good(&mut self, color: PlayerColor, good: Good) -> ActionResult<()> {
        let mut player = self.at_location(color, LocationAction::LoadGood)?;
        if player.bearings().location.good() != Some(good) {
            return Err(RuleViolation::WrongGood.into());
        }
        player.load_good(good)?;
        player.spend_action(LocationAction::LoadGood)?;
        self.store(player);
        Ok(())
    }

    pub(super) fn sell_goods(
        &mut self,
        color: PlayerColor,
        payload: TradePayload,
        rng: &mut impl Rng,
    ) -> ActionResult<PlayOutcome> {
        let (mut player, card) =
            self.trade(color, &payload, LocationAction::SellGoods, LocationName::Market)?;
        let fluctuation = self.state.market().fluctuations.get(payload.slot);
        let coins = sale_price(card.reward.coins, fluctuation);

        player.remove_goods(&card.request)?;
        player.add_coins(coins);
        player.spend_action(LocationAction::SellGoods)?;
        self.store(player);

        debug!(%color, card = %card.id, coins, "goods sold");
        Ok(self.advance_market(rng))
    }

    pub(super) fn donate_goods(&mut self, color: PlayerColor, payload: TradePayload) -> ActionResult<()> {
        let (mut player, card) =
            self.trade(color, &payload, LocationAction::DonateGoods, LocationName::Temple)?;
        let reward = card.reward.favor_and_vp;

        player.remove_goods(&card.request)?;
        player.add_favor(reward);
        player.add_vp(u16::from(reward));
        player.spend_action(LocationAction::DonateGoods)?;
        self.store(player);

        debug!(%color, card = %card.id, reward, "goods donated");
        Ok(())
    }

    pub(super) fn buy_metal(&mut self, color: PlayerColor, payload: MetalPurchasePayload) -> ActionResult<()> {
        let mut player = self.at_location(color, LocationAction::BuyMetals)?;
        if player.empty_slots() < 2 {
            return Err(RuleViolation::CargoFull.into());
        }
        let cost = self
            .state
            .treasury()
            .cost_of(payload.metal)
            .in_currency(payload.currency);
        match payload.currency {
            Currency::Coins => player.spend_coins(cost)?,
            Currency::Favor => player.spend_favor(cost)?,
        }
        player.load_metal(payload.metal)?;
        player.spend_action(LocationAction::BuyMetals)?;
        self.store(player);
        Ok(())
    }

    pub(super) fn donate_metal(&mut self, color: PlayerColor, metal: Metal) -> ActionResult<PlayOutcome> {
        let mut player = self.at_location(color, LocationAction::DonateMetals)?;
        player.unload_metal(metal)?;
        player.add_vp(metal.donation_reward());
        player.spend_action(LocationAction::DonateMetals)?;
        self.store(player);

        match self.state.register_donation(metal) {
            TempleProgress::Donated => Ok(PlayOutcome::Continue),
            TempleProgress::LevelCompleted => {
                let tier = self
                    .private
                    .draw_treasury_tier()
                    .ok_or_else(|| ActionError::fatal("treasury tier pool is empty"))?;
                self.state.set_treasury(tier);
                info!(level = self.state.temple().current_level, "temple level completed");
                Ok(PlayOutcome::Continue)
            }
            TempleProgress::Completed => {
                info!("temple completed");
                Ok(PlayOutcome::GameOver(self.final_results()))
            }
        }
    }

    pub(super) fn upgrade_cargo(&mut self, color: PlayerColor) -> ActionResult<()> {
        let mut player = self.at_location(color, LocationAction::UpgradeCargo)?;
        player.upgrade_cargo()?;
        player.spend_action(LocationAction::UpgradeCargo)?;
        self.store(player);
        Ok(())
    }

    pub(super) fn drop_item(&mut self, color: PlayerColor, item: ItemName) -> ActionResult<()> {
        let mut player = self.active_player(color)?;
        player.drop_item(item)?;
        self.store(player);
        Ok(())
    }

    pub(super) fn spend_favor(&mut self, color: PlayerColor) -> ActionResult<()> {
        let mut player = self.active_player(color)?;
        player.enable_privileged_sailing()?;
        self.store(player);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DropItemPayload, LoadGoodPayload, MetalDonationPayload, PlayCommand};
    use crate::processor::play::tests::{edit_player, make_processor, player, rng};
    use crate::state::types::{Fluctuations, MarketSlotKey, ZoneName};
    use pretty_assertions::assert_eq;

    fn at_market(processor: &mut PlayProcessor, cargo: Vec<ItemName>) {
        edit_player(processor, PlayerColor::Red, |p| {
            p.bearings.sea_zone = ZoneName::TopRight;
            p.bearings.location = LocationName::Market;
            p.location_actions = LocationName::Market.actions();
            p.cargo = cargo;
        });
    }

    fn trade(slot: MarketSlotKey, location: LocationName) -> TradePayload {
        TradePayload { slot, location }
    }

    #[test]
    fn test_sale_price_floor() {
        assert_eq!(sale_price(3, -1), 2);
        assert_eq!(sale_price(0, -1), 0);
        assert_eq!(sale_price(4, 1), 5);
    }

    #[test]
    fn test_feasible_trades_follow_cargo() {
        let mut processor = make_processor(false);
        // Slot 1 asks for two cloth, slot 2 for two wood.
        at_market(&mut processor, vec![ItemName::Cloth, ItemName::Cloth]);
        assert_eq!(
            player(&processor, PlayerColor::Red).feasible_trades,
            vec![MarketSlotKey::Slot1]
        );
        assert!(player(&processor, PlayerColor::Green).feasible_trades.is_empty());
    }

    #[test]
    fn test_sell_goods_pays_and_shifts_market() {
        let mut processor = make_processor(false);
        at_market(&mut processor, vec![ItemName::Cloth, ItemName::Cloth]);
        let before = processor.state().market;

        let outcome = processor
            .process(
                PlayerColor::Red,
                PlayCommand::SellGoods(trade(MarketSlotKey::Slot1, LocationName::Market)),
                false,
                &mut rng(),
            )
            .unwrap();
        assert_eq!(outcome, PlayOutcome::Continue);

        let red = player(&processor, PlayerColor::Red);
        assert_eq!(red.coins, 3);
        assert_eq!(red.cargo, vec![ItemName::Empty, ItemName::Empty]);
        assert!(red.location_actions.is_empty());
        assert!(red.feasible_trades.is_empty());

        let after = processor.state().market;
        assert_eq!(after.slot_1, before.future);
        assert_eq!(after.slot_2, before.slot_1);
        assert_eq!(after.deck_size, before.deck_size - 1);
    }

    #[test]
    fn test_trade_rejections_leave_state_untouched() {
        let mut processor = make_processor(false);
        at_market(&mut processor, vec![ItemName::Cloth, ItemName::Cloth]);
        let before = processor.clone();
        let mut rng = rng();

        assert_eq!(
            processor.process(
                PlayerColor::Red,
                PlayCommand::SellGoods(trade(MarketSlotKey::Slot2, LocationName::Market)),
                false,
                &mut rng,
            ),
            Err(ActionError::Rule(RuleViolation::TradeNotFeasible))
        );
        assert_eq!(
            processor.process(
                PlayerColor::Red,
                PlayCommand::DonateGoods(trade(MarketSlotKey::Slot1, LocationName::Temple)),
                false,
                &mut rng,
            ),
            Err(ActionError::Rule(RuleViolation::ActionUnavailable(
                LocationAction::DonateGoods
            )))
        );
        assert_eq!(processor, before);
    }

    #[test]
    fn test_exhausted_decks_end_the_game() {
        let mut processor = make_processor(false);
        at_market(&mut processor, vec![ItemName::Cloth, ItemName::Cloth]);
        processor.private = crate::state::private::PrivateStateHandler::from_dto(
            crate::state::private::PrivateStateDto {
                deck_a: Vec::new(),
                deck_b: Vec::new(),
                treasury_tiers: Vec::new(),
            },
        );

        let outcome = processor
            .process(
                PlayerColor::Red,
                PlayCommand::SellGoods(trade(MarketSlotKey::Slot1, LocationName::Market)),
                false,
                &mut rng(),
            )
            .unwrap();
        match outcome {
            PlayOutcome::GameOver(results) => {
                assert_eq!(results.winners, vec![PlayerColor::Red]);
            }
            PlayOutcome::Continue => panic!("game should be over"),
        }
    }

    #[test]
    fn test_drawing_the_last_card_ends_the_game() {
        let mut processor = make_processor(false);
        at_market(&mut processor, vec![ItemName::Cloth, ItemName::Cloth]);
        let last = crate::content::deck_b().remove(0);
        processor.private = crate::state::private::PrivateStateHandler::from_dto(
            crate::state::private::PrivateStateDto {
                deck_a: Vec::new(),
                deck_b: vec![last.clone()],
                treasury_tiers: Vec::new(),
            },
        );
        let before = processor.state().market;

        let outcome = processor
            .process(
                PlayerColor::Red,
                PlayCommand::SellGoods(trade(MarketSlotKey::Slot1, LocationName::Market)),
                false,
                &mut rng(),
            )
            .unwrap();
        assert!(matches!(outcome, PlayOutcome::GameOver(_)));

        let market = processor.state().market;
        assert_eq!(market.deck_size, 0);
        assert_eq!(market.future, last);
        assert_eq!(market.slot_1, before.future);
        assert_eq!(player(&processor, PlayerColor::Red).coins, 3);
    }

    #[test]
    fn test_donate_goods_grants_favor_and_vp() {
        let mut processor = make_processor(false);
        edit_player(&mut processor, PlayerColor::Red, |p| {
            p.cargo = vec![ItemName::Wood, ItemName::Wood];
            p.favor = 5;
        });
        processor.state.shift_market(
            processor.state.market().future,
            crate::state::types::DeckId::A,
            20,
            Fluctuations::default(),
        );
        // Slot 2 is now two cloth, slot 3 two wood (A03, worth 1).
        processor.refresh_feasible_trades();

        processor
            .process(
                PlayerColor::Red,
                PlayCommand::DonateGoods(trade(MarketSlotKey::Slot3, LocationName::Temple)),
                false,
                &mut rng(),
            )
            .unwrap();
        let red = player(&processor, PlayerColor::Red);
        assert_eq!(red.favor, 6);
        assert_eq!(red.vp, 1);
        assert!(processor.backup().is_some());
    }

    #[test]
    fn test_load_good_matches_site() {
        let mut processor = make_processor(false);
        edit_player(&mut processor, PlayerColor::Red, |p| {
            p.bearings.sea_zone = ZoneName::BottomRight;
            p.bearings.location = LocationName::Quarry;
            p.location_actions = LocationName::Quarry.actions();
        });
        let mut rng = rng();
        assert_eq!(
            processor.process(
                PlayerColor::Red,
                PlayCommand::LoadGood(LoadGoodPayload { item: Good::Gem }),
                false,
                &mut rng,
            ),
            Err(ActionError::Rule(RuleViolation::WrongGood))
        );
        processor
            .process(
                PlayerColor::Red,
                PlayCommand::LoadGood(LoadGoodPayload { item: Good::Stone }),
                false,
                &mut rng,
            )
            .unwrap();
        assert_eq!(
            player(&processor, PlayerColor::Red).cargo,
            vec![ItemName::Stone, ItemName::Empty]
        );
        assert_eq!(
            processor.process(
                PlayerColor::Red,
                PlayCommand::LoadGood(LoadGoodPayload { item: Good::Stone }),
                false,
                &mut rng,
            ),
            Err(ActionError::Rule(RuleViolation::ActionUnavailable(
                LocationAction::LoadGood
            )))
        );
    }

    #[test]
    fn test_buy_metal_with_favor() {
        let mut processor = make_processor(false);
        edit_player(&mut processor, PlayerColor::Red, |p| {
            p.bearings.sea_zone = ZoneName::Right;
            p.bearings.location = LocationName::Treasury;
            p.location_actions = LocationName::Treasury.actions();
        });
        let payload = |metal, currency| {
            PlayCommand::BuyMetal(MetalPurchasePayload { metal, currency })
        };
        let mut rng = rng();

        // The first tier prices gold at 3 favor and silver at 2.
        assert_eq!(
            processor.process(PlayerColor::Red, payload(Metal::Gold, Currency::Coins), false, &mut rng),
            Err(ActionError::Rule(RuleViolation::InsufficientCoins))
        );
        processor
            .process(PlayerColor::Red, payload(Metal::Silver, Currency::Favor), false, &mut rng)
            .unwrap();

        let red = player(&processor, PlayerColor::Red);
        assert_eq!(red.favor, 1);
        assert_eq!(red.cargo, vec![ItemName::Silver, ItemName::SilverExtra]);
    }

    #[test]
    fn test_buy_metal_needs_two_free_slots() {
        let mut processor = make_processor(false);
        edit_player(&mut processor, PlayerColor::Red, |p| {
            p.bearings.location = LocationName::Treasury;
            p.location_actions = LocationName::Treasury.actions();
            p.cargo = vec![ItemName::Gem, ItemName::Empty];
            p.coins = 20;
        });
        assert_eq!(
            processor.process(
                PlayerColor::Red,
                PlayCommand::BuyMetal(MetalPurchasePayload {
                    metal: Metal::Gold,
                    currency: Currency::Coins,
                }),
                false,
                &mut rng(),
            ),
            Err(ActionError::Rule(RuleViolation::CargoFull))
        );
        assert_eq!(player(&processor, PlayerColor::Red).coins, 20);
    }

    #[test]
    fn test_metal_donations_complete_levels() {
        let mut processor = make_processor(false);
        let donate = PlayCommand::DonateMetal(MetalDonationPayload { metal: Metal::Gold });
        let first_tier = processor.state().temple.treasury;
        let mut rng = rng();

        for round in 0..3 {
            edit_player(&mut processor, PlayerColor::Red, |p| {
                p.cargo = vec![ItemName::Gold, ItemName::GoldExtra];
                p.location_actions = LocationName::Temple.actions();
            });
            let outcome = processor
                .process(PlayerColor::Red, donate.clone(), false, &mut rng)
                .unwrap();
            assert_eq!(outcome, PlayOutcome::Continue);
            assert_eq!(player(&processor, PlayerColor::Red).vp, 10 * (round + 1));
        }

        let temple = processor.state().temple;
        assert_eq!(temple.current_level, 1);
        assert_eq!(temple.level_completion, 0);
        assert_ne!(temple.treasury, first_tier);
    }

    #[test]
    fn test_final_donation_ends_the_game() {
        let mut processor = make_processor(false);
        let mut temple = processor.state().temple;
        temple.current_level = 3;
        temple.level_completion = 2;
        let mut play = processor.state();
        play.temple = temple;
        processor.state = crate::state::play::PlayStateHandler::from_dto(play);
        edit_player(&mut processor, PlayerColor::Red, |p| {
            p.cargo = vec![ItemName::Silver, ItemName::SilverExtra];
        });

        let outcome = processor
            .process(
                PlayerColor::Red,
                PlayCommand::DonateMetal(MetalDonationPayload { metal: Metal::Silver }),
                false,
                &mut rng(),
            )
            .unwrap();
        let PlayOutcome::GameOver(results) = outcome else {
            panic!("game should be over");
        };
        assert_eq!(results.winners, vec![PlayerColor::Red]);
        assert_eq!(results.results[0].total_vp, 5);
    }

    #[test]
    fn test_drop_metal_frees_both_slots() {
        let mut processor = make_processor(false);
        edit_player(&mut processor, PlayerColor::Red, |p| {
            p.cargo = vec![ItemName::Gold, ItemName::GoldExtra];
        });
        processor
            .process(
                PlayerColor::Red,
                PlayCommand::DropItem(DropItemPayload {
                    item: ItemName::GoldExtra,
                }),
                false,
                &mut rng(),
            )
            .unwrap();
        assert_eq!(
            player(&processor, PlayerColor::Red).cargo,
            vec![ItemName::Empty, ItemName::Empty]
        );
    }
}
