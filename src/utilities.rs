//! Cards, decks and the small helpers used throughout the engine.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use regex::Regex;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::errors::{CardError, ConfigError, RoundError};

/// Player names: a letter followed by 2 to 15 letters, digits or underscores.
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{2,15}$").expect("static pattern compiles"));

/// Represents the rank of a card. Declaration order is the standard high order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, EnumString, Display, EnumIter)]
pub enum Rank {
    #[strum(serialize = "2")]
    Deuce,
    #[strum(serialize = "3")]
    Trey,
    #[strum(serialize = "4")]
    Four,
    #[strum(serialize = "5")]
    Five,
    #[strum(serialize = "6")]
    Six,
    #[strum(serialize = "7")]
    Seven,
    #[strum(serialize = "8")]
    Eight,
    #[strum(serialize = "9")]
    Nine,
    #[strum(serialize = "T")]
    Ten,
    #[strum(serialize = "J")]
    Jack,
    #[strum(serialize = "Q")]
    Queen,
    #[strum(serialize = "K")]
    King,
    #[strum(serialize = "A")]
    Ace,
}

/// Represents the suit of a card.
///
/// Declaration order is the bring-in order: clubs are the lowest suit, spades the
/// highest.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, EnumString, Display, EnumIter)]
pub enum Suit {
    #[strum(serialize = "c")]
    Club,
    #[strum(serialize = "d")]
    Diamond,
    #[strum(serialize = "h")]
    Heart,
    #[strum(serialize = "s")]
    Spade,
}

/// Represents a playing card with a rank and a suit. Cards order by rank, then suit.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub fn get_ranks(cards: &[Card]) -> impl Iterator<Item = Rank> + '_ {
        cards.iter().map(|c| c.rank)
    }

    pub fn are_suited(cards: &[Card]) -> bool {
        cards.iter().map(|c| c.suit).unique().count() <= 1
    }

    /// Parses a run of cards such as `"As Kd 10h"` or `"AsKd"`.
    pub fn parse_cards(s: &str) -> Result<Vec<Card>, CardError> {
        let s = s.replace("10", "T").replace(',', "");
        let mut cards = Vec::new();
        for content in s.split_whitespace() {
            if content.len() % 2 != 0 {
                return Err(CardError::OddLength(content.to_string()));
            }
            for i in (0..content.len()).step_by(2) {
                let rank_str = &content[i..i + 1];
                let suit_str = &content[i + 1..i + 2];
                let rank = Rank::from_str(rank_str)
                    .map_err(|_| CardError::InvalidRank(rank_str.to_string()))?;
                let suit = Suit::from_str(suit_str)
                    .map_err(|_| CardError::InvalidSuit(suit_str.to_string()))?;
                cards.push(Card::new(rank, suit));
            }
        }
        Ok(cards)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cards = Card::parse_cards(s)?;
        match cards.as_slice() {
            [card] => Ok(*card),
            _ => Err(CardError::NotSingle(cards.len())),
        }
    }
}

/// An ordered pile of unique cards. The top of the deck is the end of the vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// The 52 standard cards in rank-major order, unshuffled.
    pub fn standard() -> Self {
        let cards = Rank::iter()
            .cartesian_product(Suit::iter())
            .map(|(rank, suit)| Card::new(rank, suit))
            .collect();
        Self { cards }
    }

    /// A standard deck shuffled with the thread-local generator.
    pub fn shuffled() -> Self {
        let mut deck = Self::standard();
        deck.shuffle();
        deck
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut thread_rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
    }

    /// Removes and returns the top card.
    pub fn deal(&mut self) -> Result<Card, RoundError> {
        self.cards.pop().ok_or(RoundError::DeckExhausted {
            needed: 1,
            remaining: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Empties the deck, returning what was left in it.
    pub fn take_all(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }
}

/// Builds a deck whose top cards are `cards` in order: the first element is dealt
/// first. The remaining standard cards sit underneath.
impl From<Vec<Card>> for Deck {
    fn from(top: Vec<Card>) -> Self {
        let mut cards: Vec<Card> = Deck::standard()
            .cards
            .into_iter()
            .filter(|c| !top.contains(c))
            .collect();
        cards.extend(top.into_iter().rev());
        Self { cards }
    }
}

/// Checks a player name against the naming rules.
pub fn validate_name(name: &str) -> Result<(), ConfigError> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(ConfigError::InvalidName(name.to_string()))
    }
}

/// Quotient and remainder.
pub fn div_mod(dividend: u64, divisor: u64) -> (u64, u64) {
    (dividend / divisor, dividend % divisor)
}
