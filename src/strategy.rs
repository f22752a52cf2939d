//! Decision makers for seats.
//!
//! The round asks an [`Actor`] for every betting decision and, in draw games, for
//! the cards to throw away. AI actors are driven by immutable [`Ranges`] picked per
//! archetype and street.

use std::collections::VecDeque;

use itertools::Itertools;

use crate::hands::{Label, Strength};
use crate::options::{fallback, Action};
use crate::players::Archetype;
use crate::utilities::{Card, Rank};

/// What an actor is allowed to know when deciding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundView {
    pub seat: usize,
    pub street: usize,
    pub pot: u64,
    pub cost: u64,
    pub stack: u64,
    /// Bet level reached on this street.
    pub level: u32,
    pub hand: Vec<Card>,
    pub strength: Strength,
    pub max_discards: usize,
}

pub trait Actor {
    /// Picks one of `options`, which is never empty.
    fn choose(&mut self, options: &[Action], view: &RoundView) -> Action;

    /// Cards to replace on a draw street. Standing pat by default.
    fn discard(&mut self, _view: &RoundView) -> Vec<Card> {
        Vec::new()
    }

    /// Interactive actors get another chance after an illegal choice.
    fn is_interactive(&self) -> bool {
        false
    }
}

/// Plays back a fixed list of actions, then falls back to check or fold.
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    actions: VecDeque<Action>,
    discards: VecDeque<Vec<Card>>,
    interactive: bool,
}

impl Scripted {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn with_discards(mut self, discards: impl IntoIterator<Item = Vec<Card>>) -> Self {
        self.discards = discards.into_iter().collect();
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }
}

impl Actor for Scripted {
    fn choose(&mut self, options: &[Action], _view: &RoundView) -> Action {
        self.actions.pop_front().unwrap_or_else(|| fallback(options))
    }

    fn discard(&mut self, _view: &RoundView) -> Vec<Card> {
        self.discards.pop_front().unwrap_or_default()
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Never folds when it can stay in.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallingStation;

impl Actor for CallingStation {
    fn choose(&mut self, options: &[Action], _view: &RoundView) -> Action {
        options
            .iter()
            .find(|o| matches!(o, Action::Check | Action::Call(_) | Action::AllIn(_)))
            .copied()
            .unwrap_or_else(|| fallback(options))
    }
}

/// Minimum strengths for each kind of decision. `call1`/`raise1` apply when facing
/// a single bet, `call2`/`raise2` when facing more. `bet` is `None` for actors that
/// never open the betting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranges {
    pub call1: Strength,
    pub call2: Strength,
    pub bet: Option<Strength>,
    pub raise1: Strength,
    pub raise2: Strength,
}

fn high(first: Rank, second: Rank) -> Strength {
    Strength {
        label: Label::HighCard,
        ranks: vec![first, second],
    }
}

fn pair(rank: Rank) -> Strength {
    Strength::floor(Label::OnePair, rank)
}

fn two_pair(rank: Rank) -> Strength {
    Strength::floor(Label::TwoPair, rank)
}

fn any(label: Label) -> Strength {
    Strength::floor(label, Rank::Deuce)
}

impl Ranges {
    /// Ranges for an AI archetype: one set for the opening street, a tighter one
    /// for every street after. Humans have none.
    pub fn for_archetype(archetype: Archetype, street: usize) -> Option<Ranges> {
        let early = street == 0;
        let ranges = match (archetype, early) {
            (Archetype::Human, _) => return None,
            (Archetype::Fish, true) => Ranges {
                call1: any(Label::HighCard),
                call2: pair(Rank::Six),
                bet: None,
                raise1: pair(Rank::Ace),
                raise2: pair(Rank::Ace),
            },
            (Archetype::Fish, false) => Ranges {
                call1: pair(Rank::Deuce),
                call2: pair(Rank::Jack),
                bet: Some(two_pair(Rank::Deuce)),
                raise1: two_pair(Rank::Jack),
                raise2: any(Label::ThreeOfAKind),
            },
            (Archetype::Jackal, true) => Ranges {
                call1: high(Rank::King, Rank::Ten),
                call2: pair(Rank::Six),
                bet: None,
                raise1: pair(Rank::Six),
                raise2: pair(Rank::Ace),
            },
            (Archetype::Jackal, false) => Ranges {
                call1: pair(Rank::Jack),
                call2: pair(Rank::Ace),
                bet: Some(pair(Rank::Six)),
                raise1: two_pair(Rank::Ten),
                raise2: two_pair(Rank::King),
            },
            (Archetype::Mouse, true) => Ranges {
                call1: two_pair(Rank::King),
                call2: two_pair(Rank::Ten),
                bet: None,
                raise1: any(Label::ThreeOfAKind),
                raise2: any(Label::Straight),
            },
            (Archetype::Mouse, false) => Ranges {
                call1: two_pair(Rank::Ten),
                call2: any(Label::ThreeOfAKind),
                bet: Some(two_pair(Rank::Ten)),
                raise1: any(Label::Straight),
                raise2: any(Label::Flush),
            },
            (Archetype::Lion, true) => Ranges {
                call1: pair(Rank::Eight),
                call2: pair(Rank::King),
                bet: None,
                raise1: pair(Rank::Jack),
                raise2: any(Label::ThreeOfAKind),
            },
            (Archetype::Lion, false) => Ranges {
                call1: two_pair(Rank::Ten),
                call2: any(Label::ThreeOfAKind),
                bet: Some(pair(Rank::King)),
                raise1: any(Label::ThreeOfAKind),
                raise2: any(Label::Straight),
            },
        };
        Some(ranges)
    }
}

/// Plays by comparing its hand against the ranges of its archetype.
#[derive(Debug, Clone, Copy)]
pub struct RangeActor {
    archetype: Archetype,
}

impl RangeActor {
    pub fn new(archetype: Archetype) -> Self {
        Self { archetype }
    }

    fn decide(ranges: &Ranges, options: &[Action], view: &RoundView) -> Action {
        let strength = &view.strength;
        let find = |pred: fn(&Action) -> bool| options.iter().copied().find(pred);

        if options.contains(&Action::Check) {
            let opens = ranges.bet.as_ref().is_some_and(|bet| strength >= bet);
            return match find(|o| matches!(o, Action::Bet(_))) {
                Some(bet) if opens => bet,
                _ => Action::Check,
            };
        }

        let (call, raise) = if view.level <= 1 {
            (&ranges.call1, &ranges.raise1)
        } else {
            (&ranges.call2, &ranges.raise2)
        };
        if strength >= raise {
            if let Some(action) = find(|o| matches!(o, Action::Raise { .. })) {
                return action;
            }
        }
        if strength >= call {
            if let Some(action) = find(|o| matches!(o, Action::Call(_) | Action::AllIn(_))) {
                return action;
            }
        }
        fallback(options)
    }
}

impl Actor for RangeActor {
    fn choose(&mut self, options: &[Action], view: &RoundView) -> Action {
        match Ranges::for_archetype(self.archetype, view.street) {
            Some(ranges) => Self::decide(&ranges, options, view),
            None => fallback(options),
        }
    }

    /// Keeps made hands, otherwise keeps the paired ranks, or the two highest
    /// cards when nothing pairs.
    fn discard(&mut self, view: &RoundView) -> Vec<Card> {
        if view.strength.label >= Label::Straight {
            return Vec::new();
        }
        let counts = Card::get_ranks(&view.hand).counts();
        let loose: Vec<Card> = view
            .hand
            .iter()
            .copied()
            .filter(|c| counts.get(&c.rank).copied().unwrap_or(0) < 2)
            .collect();
        let throw: Vec<Card> = if loose.len() < view.hand.len() {
            loose
        } else {
            view.hand
                .iter()
                .copied()
                .sorted_by(|a, b| b.rank.cmp(&a.rank))
                .skip(2)
                .collect()
        };
        throw
            .into_iter()
            .sorted_by_key(|c| c.rank)
            .take(view.max_discards)
            .collect()
    }
}
