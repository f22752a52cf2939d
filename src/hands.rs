//! Hand strengths and the evaluator seam.
//!
//! The round never looks inside a [`Strength`]; it only orders them. Any evaluator
//! producing a total order within a game variant can be plugged in through
//! [`Evaluator`].

use std::fmt;

use itertools::Itertools;
use strum_macros::{Display, EnumString};

use crate::utilities::{Card, Rank};

/// Hand classification labels, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Display)]
pub enum Label {
    #[strum(serialize = "High card")]
    HighCard,
    #[strum(serialize = "One pair")]
    OnePair,
    #[strum(serialize = "Two pair")]
    TwoPair,
    #[strum(serialize = "Three of a kind")]
    ThreeOfAKind,
    #[strum(serialize = "Straight")]
    Straight,
    #[strum(serialize = "Flush")]
    Flush,
    #[strum(serialize = "Full house")]
    FullHouse,
    #[strum(serialize = "Four of a kind")]
    FourOfAKind,
    #[strum(serialize = "Straight flush")]
    StraightFlush,
}

/// A comparable hand value. Stronger hands are greater; equal hands compare equal.
///
/// `ranks` lists the ranks that break ties within a label, most significant first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Strength {
    pub label: Label,
    pub ranks: Vec<Rank>,
}

impl Strength {
    /// The weakest strength of `label` whose leading rank is `rank`. Any hand of the
    /// same label and leading rank compares at least equal to it.
    pub fn floor(label: Label, rank: Rank) -> Self {
        Self {
            label,
            ranks: vec![rank],
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranks = self.ranks.iter().map(|r| r.to_string()).collect::<String>();
        write!(f, "{} ({})", self.label, ranks)
    }
}

/// Maps a player's cards to a totally ordered strength.
pub trait Evaluator {
    fn evaluate(&self, cards: &[Card]) -> Strength;
}

/// Standard high-hand rankings.
///
/// Five cards are ranked normally. Fewer cards (exposed stud boards) only make
/// rank-multiset hands: no straights or flushes. More than five cards use the best
/// five-card combination.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardHighHand;

impl StandardHighHand {
    fn rank_exactly(cards: &[Card]) -> Strength {
        // Ranks grouped by multiplicity, larger groups first, then higher ranks.
        let groups: Vec<(usize, Rank)> = Card::get_ranks(cards)
            .counts()
            .into_iter()
            .map(|(rank, count)| (count, rank))
            .sorted_by(|a, b| b.cmp(a))
            .collect();
        let ranks: Vec<Rank> = groups.iter().map(|&(_, rank)| rank).collect();
        let shape: Vec<usize> = groups.iter().map(|&(count, _)| count).collect();

        if cards.len() == 5 && shape.len() == 5 {
            let flush = Card::are_suited(cards);
            let straight_high = Self::straight_high(&ranks);
            match (flush, straight_high) {
                (true, Some(high)) => return Strength { label: Label::StraightFlush, ranks: vec![high] },
                (true, None) => return Strength { label: Label::Flush, ranks },
                (false, Some(high)) => return Strength { label: Label::Straight, ranks: vec![high] },
                (false, None) => {}
            }
        }

        let label = match shape.as_slice() {
            [4, ..] => Label::FourOfAKind,
            [3, 2, ..] => Label::FullHouse,
            [3, ..] => Label::ThreeOfAKind,
            [2, 2, ..] => Label::TwoPair,
            [2, ..] => Label::OnePair,
            _ => Label::HighCard,
        };
        Strength { label, ranks }
    }

    /// `ranks` must be five distinct ranks in descending order.
    fn straight_high(ranks: &[Rank]) -> Option<Rank> {
        let values: Vec<usize> = ranks.iter().map(|&r| r as usize).collect();
        if values.windows(2).all(|w| w[0] == w[1] + 1) {
            return Some(ranks[0]);
        }
        let wheel = [Rank::Ace, Rank::Five, Rank::Four, Rank::Trey, Rank::Deuce];
        (ranks == wheel).then_some(Rank::Five)
    }
}

impl Evaluator for StandardHighHand {
    fn evaluate(&self, cards: &[Card]) -> Strength {
        if cards.len() <= 5 {
            return Self::rank_exactly(cards);
        }
        cards
            .iter()
            .copied()
            .combinations(5)
            .map(|combo| Self::rank_exactly(&combo))
            .max()
            .unwrap_or_else(|| Self::rank_exactly(cards))
    }
}
