// Implements the round state machine: dealing, forced bets, betting and showdown.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::errors::{ConfigError, RoundError};
use crate::games::{ForcedBets, Game, Opening, Street};
use crate::hands::{Evaluator, Strength};
use crate::options::{fallback, options, Action};
use crate::players::Player;
use crate::pots::{self, Award, Contender, PotSlice};
use crate::stakes::Stakes;
use crate::strategy::{Actor, RoundView};
use crate::table::{Direction, SeatState, Table};
use crate::utilities::{Card, Deck};

/// Decision makers keyed by seat.
pub type Actors = BTreeMap<usize, Box<dyn Actor>>;

/// Tries an interactive actor gets before its decision defaults to check or fold.
const MAX_SOLICITS: usize = 3;

// Represents every state transition recorded during a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    AntePosting(AntePosting),
    BlindPosting(BlindPosting),
    BringInPosting(BringInPosting),
    HoleDealing(HoleDealing),
    Discarding(Discarding),
    Acting(Acting),
    ChipsPushing(ChipsPushing),
    Mucking(Mucking),
}

#[derive(Debug, Clone, PartialEq, Eq)] pub struct AntePosting { pub seat: usize, pub amount: u64 }
#[derive(Debug, Clone, PartialEq, Eq)] pub struct BlindPosting { pub seat: usize, pub amount: u64 }
#[derive(Debug, Clone, PartialEq, Eq)] pub struct BringInPosting { pub seat: usize, pub amount: u64 }
#[derive(Debug, Clone, PartialEq, Eq)] pub struct HoleDealing { pub seat: usize, pub card: Card, pub faceup: bool }
#[derive(Debug, Clone, PartialEq, Eq)] pub struct Discarding { pub seat: usize, pub discarded: Vec<Card>, pub replacements: Vec<Card> }
#[derive(Debug, Clone, PartialEq, Eq)] pub struct Acting { pub seat: usize, pub action: Action }
#[derive(Debug, Clone, PartialEq, Eq)] pub struct ChipsPushing { pub seat: usize, pub amount: u64 }
#[derive(Debug, Clone, PartialEq, Eq)] pub struct Mucking { pub count: usize }

/// How a finished round paid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Total chips won per seat.
    pub awards: BTreeMap<usize, u64>,
    /// Empty when the round ended without a showdown.
    pub slices: Vec<PotSlice>,
    pub uncontested: bool,
}

/// One hand, from the first forced bet to the last chip pushed.
///
/// The round borrows the table for its whole life. Two invariants hold after every
/// movement: every card is in the deck, a hand or the muck, and the pot plus all
/// stacks equals the chips on the table when the round began.
pub struct Round<'a> {
    table: &'a mut Table,
    game: &'a Game,
    pub stakes: Stakes,
    pub antes: bool,
    pub street: usize,
    pub pot: u64,
    /// Pot slice per all-in stack level, filled in at showdown.
    pub sidepots: BTreeMap<u64, u64>,
    pub raise_cap: u32,
    pub bet_unit: u64,
    pub level: u32,
    /// Bring-in owed on top of `level` bets, on the first stud street only.
    pub opening: u64,
    pub bettor: Option<usize>,
    pub closer: Option<usize>,
    pub big_blind_seat: Option<usize>,
    pub bring_in_seat: Option<usize>,
    pub street_stacks: Vec<u64>,
    pub starting_stacks: Vec<u64>,
    pub muck: Vec<Card>,
    pub deck: Deck,
    pub deck_size: usize,
    total_chips: u64,
    pub operations: Vec<Operation>,
}

impl<'a> Round<'a> {
    pub fn new(table: &'a mut Table, game: &'a Game, stakes: Stakes, deck: Deck) -> Result<Self, RoundError> {
        let seated = table.occupied().len();
        if seated < 2 {
            return Err(ConfigError::NotEnoughPlayers(seated).into());
        }
        table.button()?;
        let held: usize = table.players().map(|(_, p)| p.hand.len()).sum();
        let max = game.max_players(deck.len() + held);
        if seated > max {
            return Err(ConfigError::TooManyPlayers { players: seated, max }.into());
        }

        let stacks: Vec<u64> = (0..table.len())
            .map(|seat| table.seat(seat).map_or(0, |p| p.stack))
            .collect();

        Ok(Self {
            stakes,
            antes: game.antes,
            street: 0,
            pot: 0,
            sidepots: BTreeMap::new(),
            raise_cap: game.raise_cap,
            bet_unit: stakes.small_bet(),
            level: 0,
            opening: 0,
            bettor: None,
            closer: None,
            big_blind_seat: None,
            bring_in_seat: None,
            street_stacks: stacks.clone(),
            total_chips: stacks.iter().sum(),
            starting_stacks: stacks,
            muck: Vec::new(),
            deck_size: deck.len() + held,
            deck,
            operations: Vec::new(),
            table,
            game,
        })
    }

    pub fn with_raise_cap(mut self, raise_cap: u32) -> Self {
        self.raise_cap = raise_cap;
        self
    }

    /// Antes are only posted when both the game and this switch allow them.
    pub fn with_antes(mut self, enabled: bool) -> Self {
        self.antes = enabled && self.game.antes;
        self
    }

    pub fn table(&self) -> &Table {
        &*self.table
    }

    fn player(&self, seat: usize) -> Result<&Player, RoundError> {
        self.table.seat(seat).ok_or(RoundError::EmptySeat(seat))
    }

    fn player_mut(&mut self, seat: usize) -> Result<&mut Player, RoundError> {
        self.table.seat_mut(seat).ok_or(RoundError::EmptySeat(seat))
    }

    fn current_street(&self) -> Result<&'a Street, RoundError> {
        let game = self.game;
        game.streets
            .get(self.street)
            .ok_or(RoundError::StreetOverflow(self.street))
    }

    // Bookkeeping

    pub fn stack(&self, seat: usize) -> u64 {
        self.table.seat(seat).map_or(0, |p| p.stack)
    }

    pub fn stacks(&self) -> Vec<u64> {
        (0..self.table.len()).map(|seat| self.stack(seat)).collect()
    }

    /// Chips the seat has put in this round.
    pub fn invested(&self, seat: usize) -> u64 {
        self.starting_stacks
            .get(seat)
            .map_or(0, |start| start.saturating_sub(self.stack(seat)))
    }

    /// Chips the seat has put in since the current street began.
    pub fn invested_this_street(&self, seat: usize) -> u64 {
        self.street_stacks
            .get(seat)
            .map_or(0, |start| start.saturating_sub(self.stack(seat)))
    }

    /// What the seat must add to stay in.
    pub fn cost(&self, seat: usize) -> u64 {
        let owed = self.opening + u64::from(self.level) * self.bet_unit;
        owed.saturating_sub(self.invested_this_street(seat))
    }

    pub fn allins(&self) -> Vec<usize> {
        self.table
            .players()
            .filter(|(_, p)| p.is_allin())
            .map(|(seat, _)| seat)
            .collect()
    }

    pub fn one_left(&self) -> bool {
        self.table.players_with_cards().len() == 1
    }

    fn held_cards(&self) -> usize {
        self.table.players().map(|(_, p)| p.hand.len()).sum()
    }

    fn cards_conserved(&self) -> bool {
        self.deck.len() + self.held_cards() + self.muck.len() == self.deck_size
    }

    fn chips_conserved(&self) -> bool {
        self.pot + self.table.players().map(|(_, p)| p.stack).sum::<u64>() == self.total_chips
    }

    /// Moves up to `amount` from the seat's stack into the pot, returning what was
    /// actually paid.
    fn contribute(&mut self, seat: usize, amount: u64) -> Result<u64, RoundError> {
        let paid = self.player_mut(seat)?.bet(amount);
        self.pot += paid;
        debug_assert!(self.chips_conserved());
        Ok(paid)
    }

    fn award(&mut self, seat: usize, amount: u64) -> Result<(), RoundError> {
        debug_assert!(amount <= self.pot);
        let amount = amount.min(self.pot);
        self.player_mut(seat)?.win(amount);
        self.pot -= amount;
        debug_assert!(self.chips_conserved());
        self.operations.push(Operation::ChipsPushing(ChipsPushing { seat, amount }));
        Ok(())
    }

    // Cards

    /// Deals `quantity` cards to every seat holding cards, one per pass, starting
    /// left of the button. The first deal of the round goes to every occupied seat.
    pub fn deal(&mut self, quantity: usize, faceup: bool) -> Result<(), RoundError> {
        let mut receivers = self.table.players_with_cards();
        if receivers.is_empty() {
            receivers = self.table.occupied();
        }
        let order: Vec<usize> = self
            .table
            .dealing_order()
            .into_iter()
            .filter(|seat| receivers.contains(seat))
            .collect();

        let needed = quantity * order.len();
        if needed > self.deck.len() {
            return Err(RoundError::DeckExhausted {
                needed,
                remaining: self.deck.len(),
            });
        }

        for _ in 0..quantity {
            for &seat in &order {
                let card = self.deck.deal()?;
                self.player_mut(seat)?.add_card(card, !faceup);
                log::trace!("seat {} dealt {}{}", seat, card, if faceup { "" } else { " (down)" });
                self.operations.push(Operation::HoleDealing(HoleDealing { seat, card, faceup }));
            }
        }
        debug_assert!(self.cards_conserved());
        Ok(())
    }

    /// Replaces `discards` from the seat's hand with fresh cards from the deck.
    pub fn draw(&mut self, seat: usize, discards: &[Card]) -> Result<Vec<Card>, RoundError> {
        let held = self.player(seat)?.cards();
        let legal = discards.len() <= self.game.max_discards
            && discards.iter().all_unique()
            && discards.iter().all(|card| held.contains(card));
        if !legal {
            return Err(RoundError::InvalidDiscard { seat });
        }
        if discards.len() > self.deck.len() {
            return Err(RoundError::DeckExhausted {
                needed: discards.len(),
                remaining: self.deck.len(),
            });
        }

        self.player_mut(seat)?.hand.retain(|h| !discards.contains(&h.card));
        self.muck.extend_from_slice(discards);
        let replacements = discards
            .iter()
            .map(|_| self.deck.deal())
            .collect::<Result<Vec<Card>, RoundError>>()?;
        let player = self.player_mut(seat)?;
        for &card in &replacements {
            player.add_card(card, true);
        }
        debug_assert!(self.cards_conserved());

        log::debug!("seat {} draws {}", seat, replacements.len());
        self.operations.push(Operation::Discarding(Discarding {
            seat,
            discarded: discards.to_vec(),
            replacements: replacements.clone(),
        }));
        Ok(replacements)
    }

    pub fn reveal(&mut self) {
        for (_, player) in self.table.players_mut() {
            player.reveal();
        }
    }

    /// Moves every held card, then the rest of the deck, into the muck.
    pub fn muck_all(&mut self) {
        let before = self.muck.len();
        for (_, player) in self.table.players_mut() {
            self.muck.extend(player.fold());
        }
        self.muck.extend(self.deck.take_all());
        debug_assert!(self.cards_conserved());
        self.operations.push(Operation::Mucking(Mucking {
            count: self.muck.len() - before,
        }));
    }

    /// True once every card of the deck has been returned to the muck.
    pub fn verify_integrity(&self) -> bool {
        self.deck.is_empty() && self.muck.len() == self.deck_size && self.held_cards() == 0
    }

    pub fn finish(&self) -> Result<(), RoundError> {
        if self.verify_integrity() {
            Ok(())
        } else {
            Err(RoundError::Integrity {
                deck: self.deck.len(),
                held: self.held_cards(),
                muck: self.muck.len(),
                expected: self.deck_size,
            })
        }
    }

    pub fn next_street(&mut self) -> Result<usize, RoundError> {
        let next = self.street + 1;
        if next >= self.game.streets.len() {
            return Err(RoundError::StreetOverflow(next));
        }
        self.street = next;
        self.level = 0;
        self.opening = 0;
        Ok(next)
    }

    // Forced bets

    pub fn post_antes(&mut self) -> Result<(), RoundError> {
        let ante = self.stakes.ante;
        if ante == 0 {
            return Ok(());
        }
        for seat in self.table.dealing_order() {
            let amount = self.contribute(seat, ante)?;
            self.operations.push(Operation::AntePosting(AntePosting { seat, amount }));
        }
        log::info!("antes of {} posted, pot is {}", ante, self.pot);
        Ok(())
    }

    pub fn post_blinds(&mut self) -> Result<(), RoundError> {
        let small_blind = self.table.small_blind()?;
        let big_blind = self.table.big_blind()?;
        for (seat, blind) in [(small_blind, self.stakes.small_blind), (big_blind, self.stakes.big_blind)] {
            let amount = self.contribute(seat, blind)?;
            log::debug!("{} posts a blind of {}", self.player(seat)?.name(), amount);
            self.operations.push(Operation::BlindPosting(BlindPosting { seat, amount }));
        }
        self.big_blind_seat = Some(big_blind);
        Ok(())
    }

    /// The card-holder showing the lowest up-card. Suits break rank ties, clubs lowest.
    pub fn find_bring_in(&self) -> Result<usize, RoundError> {
        self.table
            .players_with_cards()
            .into_iter()
            .filter_map(|seat| {
                let lowest = self.table.seat(seat)?.up_cards().into_iter().min()?;
                Some((lowest, seat))
            })
            .min()
            .map(|(_, seat)| seat)
            .ok_or(RoundError::NoCardHolders)
    }

    pub fn post_bringin(&mut self) -> Result<(), RoundError> {
        let seat = self.find_bring_in()?;
        let amount = self.contribute(seat, self.stakes.bring_in)?;
        log::debug!("{} brings it in for {}", self.player(seat)?.name(), amount);
        self.operations.push(Operation::BringInPosting(BringInPosting { seat, amount }));
        self.bring_in_seat = Some(seat);
        Ok(())
    }

    /// The card-holder with the strongest up-cards. Ties go to the first tied seat
    /// counting left from the bring-in, or left of the button without one.
    pub fn high_hand_seat(&self, evaluator: &dyn Evaluator) -> Result<usize, RoundError> {
        let seats = self.table.len();
        let start = match self.bring_in_seat {
            Some(seat) => (seat + seats - 1) % seats,
            None => self.table.button()?,
        };
        let mut best: Option<(Strength, usize)> = None;
        for seat in self.table.seats_from(start, Direction::Left, SeatState::has_cards) {
            let Some(player) = self.table.seat(seat) else { continue };
            let strength = evaluator.evaluate(&player.up_cards());
            if best.as_ref().map_or(true, |(top, _)| strength > *top) {
                best = Some((strength, seat));
            }
        }
        best.map(|(_, seat)| seat).ok_or(RoundError::NoCardHolders)
    }

    // Betting

    /// Picks the bet unit and the first actor of the current street. The closer is
    /// the card-holder just before the first actor.
    pub fn setup_betting(&mut self, evaluator: &dyn Evaluator) -> Result<(), RoundError> {
        let street = self.current_street()?;
        self.bet_unit = if street.big_bet {
            self.stakes.big_bet()
        } else {
            self.stakes.small_bet()
        };
        self.level = 0;
        self.opening = 0;

        let button = self.table.button()?;
        let first = match street.opening {
            Opening::Position => match self.big_blind_seat.filter(|_| self.street == 0) {
                Some(big_blind) => {
                    self.level = 1;
                    self.table.next_with_cards(big_blind, Direction::Left)
                }
                None => self.table.next_with_cards(button, Direction::Left),
            },
            Opening::LowCard => {
                let bring_in = match self.bring_in_seat {
                    Some(seat) => seat,
                    None => self.find_bring_in()?,
                };
                self.opening = self.stakes.bring_in;
                self.table.next_with_cards(bring_in, Direction::Left)
            }
            Opening::HighHand => Some(self.high_hand_seat(evaluator)?),
        }
        .ok_or(RoundError::NoCardHolders)?;

        let closer = self
            .table
            .next_with_cards(first, Direction::Right)
            .ok_or(RoundError::NoCardHolders)?;
        self.bettor = Some(first);
        self.closer = Some(closer);
        log::info!(
            "street {}: seat {} opens, unit {}, pot {}",
            self.street + 1,
            first,
            self.bet_unit,
            self.pot
        );
        Ok(())
    }

    /// True when fewer than two card-holders have chips behind.
    fn lone_stack(&self) -> bool {
        self.table
            .players_with_cards()
            .into_iter()
            .filter(|&s| self.table.state(s) == SeatState::Active)
            .count()
            < 2
    }

    /// All-in seats never decide. A lone seat with chips only decides when it still
    /// owes something.
    fn needs_decision(&self, seat: usize) -> bool {
        if self.table.state(seat) != SeatState::Active {
            return false;
        }
        !self.lone_stack() || self.cost(seat) > 0
    }

    pub fn view(&self, seat: usize, evaluator: &dyn Evaluator) -> Result<RoundView, RoundError> {
        let player = self.player(seat)?;
        let hand = player.cards();
        Ok(RoundView {
            seat,
            street: self.street,
            pot: self.pot,
            cost: self.cost(seat),
            stack: player.stack,
            level: self.level,
            strength: evaluator.evaluate(&hand),
            hand,
            max_discards: self.game.max_discards,
        })
    }

    fn solicit(&self, seat: usize, actors: &mut Actors, evaluator: &dyn Evaluator) -> Result<Action, RoundError> {
        // nobody is left to answer a raise
        let raises_left = if self.lone_stack() {
            0
        } else {
            self.raise_cap.saturating_sub(self.level)
        };
        let options = options(self.cost(seat), self.stack(seat), self.bet_unit, raises_left);
        let view = self.view(seat, evaluator)?;
        let actor = actors.get_mut(&seat).ok_or(RoundError::MissingActor(seat))?;

        for _ in 0..MAX_SOLICITS {
            let choice = actor.choose(&options, &view);
            if options.contains(&choice) {
                return Ok(choice);
            }
            if !actor.is_interactive() {
                return Err(RoundError::IllegalAction { seat, action: choice });
            }
            log::warn!("seat {} chose {}, which is not allowed", seat, choice);
        }
        let action = fallback(&options);
        log::warn!("seat {} gave no legal decision, defaulting to {}", seat, action);
        Ok(action)
    }

    pub fn apply(&mut self, seat: usize, action: Action) -> Result<(), RoundError> {
        match action {
            Action::Fold => {
                let cards = self.player_mut(seat)?.fold();
                self.muck.extend(cards);
                debug_assert!(self.cards_conserved());
            }
            Action::Check => {}
            _ => {
                self.contribute(seat, action.amount())?;
                if action.is_aggressive() {
                    self.level += action.increment();
                    self.closer = self.table.next_with_cards(seat, Direction::Right);
                }
            }
        }
        log::debug!("{} {}", self.player(seat)?.name(), action);
        self.operations.push(Operation::Acting(Acting { seat, action }));
        Ok(())
    }

    /// Runs the street from the bettor until action comes back around to the closer.
    pub fn betting_round(&mut self, actors: &mut Actors, evaluator: &dyn Evaluator) -> Result<(), RoundError> {
        let mut bettor = self.bettor.ok_or(RoundError::NoCardHolders)?;
        while !self.one_left() {
            self.bettor = Some(bettor);
            if self.needs_decision(bettor) {
                let action = self.solicit(bettor, actors, evaluator)?;
                self.apply(bettor, action)?;
            }
            if Some(bettor) == self.closer {
                break;
            }
            bettor = self
                .table
                .next_with_cards(bettor, Direction::Left)
                .ok_or(RoundError::NoCardHolders)?;
        }
        self.bettor = None;
        self.closer = None;
        Ok(())
    }

    fn draw_phase(&mut self, actors: &mut Actors, evaluator: &dyn Evaluator) -> Result<(), RoundError> {
        for seat in self.table.dealing_order() {
            if !self.table.state(seat).has_cards() {
                continue;
            }
            let view = self.view(seat, evaluator)?;
            let actor = actors.get_mut(&seat).ok_or(RoundError::MissingActor(seat))?;
            let discards = actor.discard(&view);
            self.draw(seat, &discards)?;
        }
        Ok(())
    }

    // Payouts

    fn award_uncontested(&mut self) -> Result<Award, RoundError> {
        let seat = *self
            .table
            .players_with_cards()
            .first()
            .ok_or(RoundError::NoCardHolders)?;
        let amount = self.pot;
        self.award(seat, amount)?;
        log::info!("{} wins {} uncontested", self.player(seat)?.name(), amount);
        Ok(Award { seat, amount })
    }

    /// Reveals every hand, splits the pot into slices and pays each slice out.
    pub fn showdown(&mut self, evaluator: &dyn Evaluator) -> Result<Vec<PotSlice>, RoundError> {
        self.reveal();
        let button = self.table.button()?;
        let contenders: Vec<Contender> = self
            .table
            .players()
            .map(|(seat, player)| {
                let starting_stack = self.starting_stacks.get(seat).copied().unwrap_or(0);
                Contender {
                    seat,
                    starting_stack,
                    invested: starting_stack.saturating_sub(player.stack),
                    allin: player.is_allin(),
                    strength: player.has_cards().then(|| evaluator.evaluate(&player.cards())),
                }
            })
            .collect();

        self.sidepots = pots::make_sidepots(&pots::allin_levels(&contenders), &contenders);
        let slices = pots::showdown(self.pot, &contenders, button, self.table.len());
        for slice in &slices {
            log::info!(
                "pot of {} (eligible {:?}) won by {:?}",
                slice.amount,
                slice.eligible,
                slice.winners
            );
        }
        for (seat, amount) in pots::totals(&slices) {
            self.award(seat, amount)?;
        }
        Ok(slices)
    }

    /// Plays the round to completion. Every occupied seat needs an actor before any
    /// chip moves.
    pub fn play(&mut self, actors: &mut Actors, evaluator: &dyn Evaluator) -> Result<RoundOutcome, RoundError> {
        if let Some(seat) = self.table.occupied().into_iter().find(|s| !actors.contains_key(s)) {
            return Err(RoundError::MissingActor(seat));
        }
        let game = self.game;
        log::info!(
            "{} round begins, button at seat {}",
            game.variant,
            self.table.button()?
        );
        if self.antes {
            self.post_antes()?;
        }

        let mut uncontested = None;
        for (index, street) in game.streets.iter().enumerate() {
            if index > 0 {
                self.next_street()?;
            }
            self.street_stacks = self.stacks();

            if index == 0 && game.forced_bets == ForcedBets::Blinds {
                self.post_blinds()?;
            }
            if street.draw_status {
                self.draw_phase(actors, evaluator)?;
            }
            for &faceup in &street.hole_dealing_statuses {
                self.deal(1, faceup)?;
            }
            if index == 0 && game.forced_bets == ForcedBets::BringIn {
                self.post_bringin()?;
            }

            self.setup_betting(evaluator)?;
            self.betting_round(actors, evaluator)?;
            if self.one_left() {
                uncontested = Some(self.award_uncontested()?);
                break;
            }
        }

        let (awards, slices) = match uncontested {
            Some(award) => (BTreeMap::from([(award.seat, award.amount)]), Vec::new()),
            None => {
                let slices = self.showdown(evaluator)?;
                (pots::totals(&slices), slices)
            }
        };
        self.muck_all();
        self.finish()?;

        Ok(RoundOutcome {
            awards,
            slices,
            uncontested: uncontested.is_some(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{FiveCardDraw, FiveCardStud, Variant};
    use crate::hands::StandardHighHand;
    use crate::players::Archetype;
    use crate::strategy::Scripted;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn seated(stacks: &[Option<u64>]) -> Table {
        let mut table = Table::new(stacks.len());
        for (seat, stack) in stacks.iter().enumerate() {
            if let Some(stack) = stack {
                let mut player = Player::new(&format!("player{}", seat), Archetype::Fish).unwrap();
                player.stack = *stack;
                table.sit(seat, player).unwrap();
            }
        }
        table
    }

    fn stakes() -> Stakes {
        Stakes {
            small_blind: 5,
            big_blind: 10,
            ante: 0,
            bring_in: 2,
        }
    }

    fn scripted(scripts: Vec<(usize, Vec<Action>)>) -> Actors {
        scripts
            .into_iter()
            .map(|(seat, actions)| (seat, Box::new(Scripted::new(actions)) as Box<dyn Actor>))
            .collect()
    }

    fn total_chips(table: &Table) -> u64 {
        table.players().map(|(_, p)| p.stack).sum()
    }

    #[test]
    fn round_needs_a_button_and_two_players() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000), Some(1000)]);
        assert!(matches!(
            Round::new(&mut table, &game, stakes(), Deck::standard()),
            Err(RoundError::Config(ConfigError::ButtonUnset))
        ));
        let mut table = seated(&[Some(1000), None]);
        table.button = Some(0);
        assert!(matches!(
            Round::new(&mut table, &game, stakes(), Deck::standard()),
            Err(RoundError::Config(ConfigError::NotEnoughPlayers(1)))
        ));
    }

    #[test]
    fn antes_come_from_every_seat() {
        let game = FiveCardStud::create_game().unwrap();
        let mut table = seated(&[Some(1000); 6]);
        table.button = Some(0);
        let stakes = Stakes { ante: 10, ..stakes() };
        let mut round = Round::new(&mut table, &game, stakes, Deck::standard()).unwrap();
        round.post_antes().unwrap();
        assert_eq!(round.pot, 60);
        assert!(round.table().players().all(|(_, p)| p.stack == 990));
    }

    #[test]
    fn blinds_skip_empty_seats() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000), None, Some(1000), None, Some(3)]);
        table.button = Some(0);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        round.post_blinds().unwrap();
        assert_eq!(round.stacks(), vec![1000, 0, 995, 0, 0]);
        assert_eq!(round.pot, 8);
        assert_eq!(round.big_blind_seat, Some(4));
        assert_eq!(round.allins(), Vec::<usize>::new());
    }

    #[test]
    fn heads_up_button_posts_the_small_blind_and_acts_first() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000), Some(1000)]);
        table.button = Some(1);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        round.post_blinds().unwrap();
        round.deal(5, false).unwrap();
        round.setup_betting(&StandardHighHand).unwrap();
        assert_eq!(round.stacks(), vec![990, 995]);
        assert_eq!((round.bettor, round.closer), (Some(1), Some(0)));
        assert_eq!(round.cost(1), 5);
        assert_eq!(round.cost(0), 0);
    }

    #[test]
    fn deal_and_muck_keep_every_card() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(100); 4]);
        table.button = Some(3);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        round.deal(5, false).unwrap();
        assert_eq!(round.deck.len(), 32);
        assert!(round.cards_conserved());
        assert!(!round.verify_integrity());

        round.apply(2, Action::Fold).unwrap();
        assert_eq!(round.muck.len(), 5);
        round.deal(1, true).unwrap();
        assert_eq!(round.deck.len(), 29);

        round.muck_all();
        assert!(round.verify_integrity());
        assert!(round.finish().is_ok());
    }

    #[test]
    fn integrity_fails_when_a_card_goes_astray() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(100); 2]);
        table.button = Some(0);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        round.deal(5, false).unwrap();
        round.muck_all();

        let card = round.muck.pop().unwrap();
        assert!(!round.verify_integrity());
        assert!(matches!(round.finish(), Err(RoundError::Integrity { muck: 51, .. })));

        round.table.seat_mut(0).unwrap().add_card(card, true);
        assert!(!round.verify_integrity());
    }

    #[test]
    fn dealing_past_the_deck_fails() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(100); 6]);
        table.button = Some(0);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        assert!(matches!(
            round.deal(9, false),
            Err(RoundError::DeckExhausted { needed: 54, remaining: 52 })
        ));
    }

    #[test]
    fn streets_stop_at_the_last_one() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(100); 2]);
        table.button = Some(0);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        assert_eq!(round.next_street().unwrap(), 1);
        assert!(matches!(round.next_street(), Err(RoundError::StreetOverflow(2))));
    }

    #[test]
    fn drawing_replaces_discards() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(100); 2]);
        table.button = Some(1);
        let top = Card::parse_cards("AsKsQsJsTs2c3c4c5c6c7d8d9d").unwrap();
        let mut round = Round::new(&mut table, &game, stakes(), Deck::from(top)).unwrap();
        round.deal(5, false).unwrap();

        let seat0 = round.table().seat(0).unwrap().cards();
        assert_eq!(seat0, Card::parse_cards("AsQsTs3c5c").unwrap());

        let discards = Card::parse_cards("3c5c").unwrap();
        let drawn = round.draw(0, &discards).unwrap();
        assert_eq!(drawn, Card::parse_cards("7d8d").unwrap());
        assert_eq!(round.table().seat(0).unwrap().cards().len(), 5);
        assert_eq!(round.muck, discards);
        assert!(round.cards_conserved());
    }

    #[test]
    fn draw_round_plays_through_to_showdown() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000); 2]);
        table.button = Some(1);
        let top = Card::parse_cards("AsKsQsJsTs2c3c4c5c6c7d8d9d").unwrap();
        let mut actors: Actors = BTreeMap::new();
        actors.insert(0, Box::new(Scripted::default().with_discards([Card::parse_cards("3c5c").unwrap()])));
        actors.insert(
            1,
            Box::new(Scripted::new([Action::Call(5)]).with_discards([Card::parse_cards("2c").unwrap()])),
        );

        let (outcome, operations) = {
            let mut round = Round::new(&mut table, &game, stakes(), Deck::from(top)).unwrap();
            let outcome = round.play(&mut actors, &StandardHighHand).unwrap();
            (outcome, round.operations.clone())
        };

        // ace-queen-ten-eight-seven beats king-jack-nine-six-four
        assert_eq!(outcome.awards, BTreeMap::from([(0, 20)]));
        assert_eq!(table.seat(0).unwrap().stack, 1010);
        assert_eq!(table.seat(1).unwrap().stack, 990);
        let draws: Vec<&Discarding> = operations
            .iter()
            .filter_map(|op| match op {
                Operation::Discarding(d) => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].replacements, Card::parse_cards("7d8d").unwrap());
        assert_eq!(draws[1].replacements, Card::parse_cards("9d").unwrap());
    }

    #[test]
    fn illegal_discards_are_rejected() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(100); 2]);
        table.button = Some(1);
        let top = Card::parse_cards("AsKsQsJsTs2c3c4c5c6c").unwrap();
        let mut round = Round::new(&mut table, &game, stakes(), Deck::from(top)).unwrap();
        round.deal(5, false).unwrap();

        let not_held = Card::parse_cards("Ks").unwrap();
        assert!(matches!(round.draw(0, &not_held), Err(RoundError::InvalidDiscard { seat: 0 })));
        let too_many = Card::parse_cards("AsQsTs3c").unwrap();
        assert!(matches!(round.draw(0, &too_many), Err(RoundError::InvalidDiscard { seat: 0 })));
        let twice = Card::parse_cards("AsAs").unwrap();
        assert!(matches!(round.draw(0, &twice), Err(RoundError::InvalidDiscard { seat: 0 })));
    }

    #[test]
    fn bring_in_is_the_lowest_up_card() {
        let game = FiveCardStud::create_game().unwrap();
        for (cards, expected) in [("AsKs5h5c", 1), ("AsKs4d5c", 0), ("AsKs9c8s", 1)] {
            let mut table = seated(&[Some(100); 2]);
            table.button = Some(1);
            let top = Card::parse_cards(cards).unwrap();
            let mut round = Round::new(&mut table, &game, stakes(), Deck::from(top)).unwrap();
            round.deal(1, false).unwrap();
            round.deal(1, true).unwrap();
            assert_eq!(round.find_bring_in().unwrap(), expected, "{}", cards);
        }
    }

    #[test]
    fn bring_in_opens_the_first_stud_street() {
        let game = FiveCardStud::create_game().unwrap();
        let mut table = seated(&[Some(100); 3]);
        table.button = Some(2);
        let top = Card::parse_cards("AsKsQs9h3c8d").unwrap();
        let mut round = Round::new(&mut table, &game, stakes(), Deck::from(top)).unwrap();
        round.deal(1, false).unwrap();
        round.deal(1, true).unwrap();
        round.post_bringin().unwrap();
        round.setup_betting(&StandardHighHand).unwrap();

        assert_eq!(round.bring_in_seat, Some(1));
        assert_eq!(round.pot, 2);
        assert_eq!((round.bettor, round.closer), (Some(2), Some(1)));
        assert_eq!(round.cost(2), 2);
        assert_eq!(round.cost(1), 0);
    }

    #[test]
    fn high_hand_opens_later_stud_streets() {
        let game = FiveCardStud::create_game().unwrap();
        let mut table = seated(&[Some(100); 3]);
        table.button = Some(2);
        let top = Card::parse_cards("AcAdAhKhKd3h2c2d4h").unwrap();
        let mut round = Round::new(&mut table, &game, stakes(), Deck::from(top)).unwrap();
        round.deal(1, false).unwrap();
        round.deal(1, true).unwrap();
        round.deal(1, true).unwrap();

        // seats 0 and 1 both show king-deuce
        assert_eq!(round.high_hand_seat(&StandardHighHand).unwrap(), 0);
        round.table.button = Some(0);
        assert_eq!(round.high_hand_seat(&StandardHighHand).unwrap(), 1);

        round.next_street().unwrap();
        round.setup_betting(&StandardHighHand).unwrap();
        assert_eq!((round.bettor, round.closer), (Some(1), Some(0)));
        assert_eq!(round.cost(1), 0);

        // with a bring-in, ties count from the bring-in seat itself
        round.bring_in_seat = Some(1);
        assert_eq!(round.high_hand_seat(&StandardHighHand).unwrap(), 1);
        round.bring_in_seat = Some(2);
        assert_eq!(round.high_hand_seat(&StandardHighHand).unwrap(), 0);
    }

    #[test]
    fn tables_too_big_for_the_deck_are_refused() {
        let game = FiveCardStud::create_game().unwrap();
        let mut table = seated(&[Some(100); 11]);
        table.button = Some(0);
        assert!(matches!(
            Round::new(&mut table, &game, stakes(), Deck::standard()),
            Err(RoundError::Config(ConfigError::TooManyPlayers { players: 11, max: 10 }))
        ));
        assert_eq!(total_chips(&table), 1100);

        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(100); 7]);
        table.button = Some(0);
        assert!(matches!(
            Round::new(&mut table, &game, stakes(), Deck::standard()),
            Err(RoundError::Config(ConfigError::TooManyPlayers { players: 7, max: 6 }))
        ));
    }

    #[test]
    fn raise_moves_the_closer() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000); 3]);
        table.button = Some(0);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        round.post_blinds().unwrap();
        round.deal(5, false).unwrap();
        round.setup_betting(&StandardHighHand).unwrap();
        assert_eq!((round.bettor, round.closer), (Some(0), Some(2)));
        assert_eq!(round.cost(1), 5);

        let mut actors = scripted(vec![
            (0, vec![Action::Call(10), Action::Call(10)]),
            (1, vec![Action::Raise { amount: 15, increment: 1 }]),
            (2, vec![Action::Call(10)]),
        ]);
        round.betting_round(&mut actors, &StandardHighHand).unwrap();
        assert_eq!(round.pot, 60);
        assert_eq!(round.level, 2);
        for seat in 0..3 {
            assert_eq!(round.invested(seat), 20);
        }
    }

    #[test]
    fn short_allin_does_not_reopen_the_betting() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000), Some(8), Some(1000), Some(1000)]);
        table.button = Some(0);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        round.post_blinds().unwrap();
        round.deal(5, false).unwrap();
        round.setup_betting(&StandardHighHand).unwrap();
        assert_eq!((round.bettor, round.closer), (Some(3), Some(2)));

        let mut actors = scripted(vec![
            (3, vec![Action::Raise { amount: 20, increment: 1 }]),
            (0, vec![Action::Call(20)]),
            (1, vec![Action::AllIn(3)]),
            (2, vec![Action::Call(10)]),
        ]);
        round.betting_round(&mut actors, &StandardHighHand).unwrap();

        let acted: Vec<usize> = round
            .operations
            .iter()
            .filter_map(|op| match op {
                Operation::Acting(a) => Some(a.seat),
                _ => None,
            })
            .collect();
        assert_eq!(acted, vec![3, 0, 1, 2]);
        assert_eq!(round.level, 2);
        assert_eq!(round.pot, 68);
        assert_eq!(round.allins(), vec![1]);
    }

    #[test]
    fn lone_stack_facing_an_allin_cannot_raise() {
        let game = FiveCardDraw::create_game().unwrap();
        for (reply, legal) in [(Action::Raise { amount: 20, increment: 1 }, false), (Action::Call(10), true)] {
            let mut table = seated(&[Some(20), Some(1000)]);
            table.button = Some(1);
            let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
            round.post_blinds().unwrap();
            round.deal(5, false).unwrap();
            round.setup_betting(&StandardHighHand).unwrap();

            // the big blind bets its last chips
            let mut actors = scripted(vec![(1, vec![Action::Call(5), reply]), (0, vec![Action::Bet(10)])]);
            let result = round.betting_round(&mut actors, &StandardHighHand);
            if legal {
                assert!(result.is_ok());
                assert_eq!(round.pot, 40);
                assert_eq!(round.stacks(), vec![0, 980]);
            } else {
                assert!(matches!(result, Err(RoundError::IllegalAction { seat: 1, .. })));
                assert_eq!(round.pot, 30);
            }
            assert_eq!(round.level, 2);
        }
    }

    #[test]
    fn everyone_folding_to_one_ends_the_round() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000); 3]);
        table.button = Some(0);
        let mut actors = scripted(vec![
            (0, vec![Action::Fold]),
            (1, vec![Action::Fold]),
            (2, vec![]),
        ]);
        let outcome = {
            let mut round = Round::new(&mut table, &game, stakes(), Deck::shuffled()).unwrap();
            round.play(&mut actors, &StandardHighHand).unwrap()
        };
        assert!(outcome.uncontested);
        assert!(outcome.slices.is_empty());
        assert_eq!(outcome.awards, BTreeMap::from([(2, 15)]));
        let stacks: Vec<u64> = table.players().map(|(_, p)| p.stack).collect();
        assert_eq!(stacks, vec![1000, 995, 1005]);
        assert!(table.players().all(|(_, p)| !p.has_cards()));
    }

    #[test]
    fn illegal_ai_choice_is_an_error() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000); 3]);
        table.button = Some(0);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        round.post_blinds().unwrap();
        round.deal(5, false).unwrap();
        round.setup_betting(&StandardHighHand).unwrap();
        let mut actors = scripted(vec![(0, vec![Action::Bet(999)])]);
        assert!(matches!(
            round.betting_round(&mut actors, &StandardHighHand),
            Err(RoundError::IllegalAction { seat: 0, action: Action::Bet(999) })
        ));
    }

    #[test]
    fn interactive_seats_default_after_repeated_illegal_choices() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000); 3]);
        table.button = Some(0);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::standard()).unwrap();
        round.post_blinds().unwrap();
        round.deal(5, false).unwrap();
        round.setup_betting(&StandardHighHand).unwrap();

        let mut actors = scripted(vec![(1, vec![Action::Fold]), (2, vec![])]);
        let stubborn = Scripted::new([Action::Bet(999), Action::Bet(999), Action::Bet(999), Action::Call(10)]).interactive();
        actors.insert(0, Box::new(stubborn));
        round.betting_round(&mut actors, &StandardHighHand).unwrap();

        assert_eq!(round.table().state(0), SeatState::Folded);
        assert!(round.one_left());
        assert_eq!(round.pot, 15);
    }

    #[test]
    fn missing_actor_is_reported() {
        let game = FiveCardDraw::create_game().unwrap();
        let mut table = seated(&[Some(1000); 2]);
        table.button = Some(0);
        let mut round = Round::new(&mut table, &game, stakes(), Deck::shuffled()).unwrap();
        let mut actors = scripted(vec![(1, vec![])]);
        assert!(matches!(
            round.play(&mut actors, &StandardHighHand),
            Err(RoundError::MissingActor(0))
        ));
    }

    #[test]
    fn allin_players_reach_showdown_without_betting() {
        let game = FiveCardStud::create_game().unwrap();
        let mut table = seated(&[Some(100), Some(40), Some(100)]);
        table.button = Some(2);
        // seat 1 holds aces, seat 0 kings, seat 2 queens
        let top = Card::parse_cards("KcAcQc9dTd2d KdAdQd 3h4h5h 7s8s6s").unwrap();
        let mut actors: Actors = (0..3)
            .map(|seat| (seat, Box::new(Maniac) as Box<dyn Actor>))
            .collect();
        let outcome = {
            let mut round = Round::new(&mut table, &game, Stakes { ante: 0, ..stakes() }, Deck::from(top)).unwrap();
            round.play(&mut actors, &StandardHighHand).unwrap()
        };
        assert!(!outcome.uncontested);
        assert_eq!(total_chips(&table), 240);
        // seat 1 wins the slice it could reach, seat 0 beats seat 2 for the rest
        assert_eq!(outcome.awards, BTreeMap::from([(0, 84), (1, 120)]));
        assert_eq!(outcome.slices.len(), 2);
        assert_eq!(outcome.slices[0].eligible, vec![0, 1, 2]);
        assert_eq!(outcome.slices[1].eligible, vec![0, 2]);
        assert_eq!(table.seat(1).unwrap().stack, 120);
    }

    /// Bets and raises whenever allowed, otherwise stays in.
    struct Maniac;

    impl Actor for Maniac {
        fn choose(&mut self, options: &[Action], _view: &RoundView) -> Action {
            options
                .iter()
                .copied()
                .max_by_key(|o| match o {
                    Action::Fold => 0,
                    Action::Check | Action::Call(_) | Action::AllIn(_) => 1,
                    Action::Bet(_) | Action::Raise { .. } => 2,
                })
                .unwrap_or(Action::Fold)
        }
    }

    struct RandomActor(StdRng);

    impl Actor for RandomActor {
        fn choose(&mut self, options: &[Action], _view: &RoundView) -> Action {
            options[self.0.gen_range(0..options.len())]
        }

        fn discard(&mut self, view: &RoundView) -> Vec<Card> {
            let count = self.0.gen_range(0..=view.max_discards.min(view.hand.len()));
            view.hand.iter().copied().take(count).collect()
        }
    }

    #[test]
    fn random_rounds_conserve_chips_and_cards() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..300 {
            let size = rng.gen_range(2..=6);
            let stacks: Vec<Option<u64>> = (0..size).map(|_| Some(rng.gen_range(1..=120))).collect();
            let mut table = seated(&stacks);
            let before = total_chips(&table);
            for _ in 0..rng.gen_range(1..=size) {
                table.move_button().unwrap();
            }

            let variant = if rng.gen_bool(0.5) { Variant::FiveCardDraw } else { Variant::FiveCardStud };
            let game = variant.create_game().unwrap();
            let stakes = Stakes::level(rng.gen_range(1..=5)).unwrap();
            let mut deck = Deck::standard();
            deck.shuffle_with(&mut rng);
            let mut actors: Actors = (0..size)
                .map(|seat| {
                    let actor = RandomActor(StdRng::seed_from_u64(rng.gen()));
                    (seat, Box::new(actor) as Box<dyn Actor>)
                })
                .collect();

            let outcome = {
                let mut round = Round::new(&mut table, &game, stakes, deck).unwrap();
                round.play(&mut actors, &StandardHighHand).unwrap()
            };
            assert_eq!(total_chips(&table), before);
            assert!(table.players().all(|(_, p)| !p.has_cards()));
            assert!(!outcome.awards.is_empty());
        }
    }
}
