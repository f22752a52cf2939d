//! Game variant definitions, acting as factories for `Game`.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize)]
pub enum Variant {
    #[strum(serialize = "FIVE CARD DRAW")]
    FiveCardDraw,
    #[strum(serialize = "FIVE CARD STUD")]
    FiveCardStud,
}

/// How the first actor of a street is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum Opening {
    /// First card-holder left of the button, or left of the big blind when blinds
    /// were posted this street.
    Position,
    /// The lowest up-card brings it in; the seat after it acts next.
    LowCard,
    /// The strongest exposed cards act first.
    HighHand,
}

/// How chips are forced into the pot before the first street's betting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedBets {
    Blinds,
    BringIn,
}

/// Represents a single street (betting round) in a poker game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Street {
    /// One entry per card dealt to each hand this street: `true` deals it face up.
    pub hole_dealing_statuses: Vec<bool>,
    pub draw_status: bool,
    pub opening: Opening,
    /// Bets in units of the big bet (twice the big blind) rather than the small bet.
    pub big_bet: bool,
}

impl Street {
    pub fn new(
        hole_dealing_statuses: Vec<bool>,
        draw_status: bool,
        opening: Opening,
        big_bet: bool,
    ) -> Result<Self, ConfigError> {
        if !hole_dealing_statuses.is_empty() && draw_status {
            return Err(ConfigError::InvalidGame(
                "only one of hole dealing or drawing is permitted",
            ));
        }
        Ok(Self {
            hole_dealing_statuses,
            draw_status,
            opening,
            big_bet,
        })
    }
}

/// Everything that distinguishes one variant from another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub variant: Variant,
    pub streets: Vec<Street>,
    pub forced_bets: ForcedBets,
    pub antes: bool,
    /// Bet levels allowed per street, counting the opening bet.
    pub raise_cap: u32,
    pub max_discards: usize,
}

impl Game {
    /// Cards one hand can take from the deck: every dealt card plus the most it can
    /// replace on each draw.
    pub fn cards_per_hand(&self) -> usize {
        self.streets
            .iter()
            .map(|street| {
                street.hole_dealing_statuses.len()
                    + if street.draw_status { self.max_discards } else { 0 }
            })
            .sum()
    }

    /// Most hands a deck of `deck_size` cards can serve through every street.
    pub fn max_players(&self, deck_size: usize) -> usize {
        deck_size / self.cards_per_hand().max(1)
    }
}

pub struct GameBuilder {
    variant: Variant,
    streets: Vec<Street>,
    forced_bets: ForcedBets,
    antes: bool,
    raise_cap: u32,
    max_discards: usize,
}

impl GameBuilder {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            streets: Vec::new(),
            forced_bets: ForcedBets::Blinds,
            antes: false,
            raise_cap: 4,
            max_discards: 0,
        }
    }

    pub fn streets(mut self, streets: Vec<Street>) -> Self { self.streets = streets; self }
    pub fn forced_bets(mut self, forced_bets: ForcedBets) -> Self { self.forced_bets = forced_bets; self }
    pub fn antes(mut self, antes: bool) -> Self { self.antes = antes; self }
    pub fn raise_cap(mut self, raise_cap: u32) -> Self { self.raise_cap = raise_cap; self }
    pub fn max_discards(mut self, max_discards: usize) -> Self { self.max_discards = max_discards; self }

    pub fn build(self) -> Result<Game, ConfigError> {
        let first = self
            .streets
            .first()
            .ok_or(ConfigError::InvalidGame("streets cannot be empty"))?;
        if first.hole_dealing_statuses.is_empty() {
            return Err(ConfigError::InvalidGame("the first street must deal cards"));
        }
        if self.forced_bets == ForcedBets::BringIn && first.opening != Opening::LowCard {
            return Err(ConfigError::InvalidGame("a bring-in needs a low-card opening"));
        }
        if self.raise_cap == 0 {
            return Err(ConfigError::InvalidGame("raise cap must allow a bet"));
        }
        Ok(Game {
            variant: self.variant,
            streets: self.streets,
            forced_bets: self.forced_bets,
            antes: self.antes,
            raise_cap: self.raise_cap,
            max_discards: self.max_discards,
        })
    }
}

// Each struct here represents a specific variant. They hold no data and only
// provide a `create_game` method building a fully configured `Game`.

pub struct FiveCardDraw;

impl FiveCardDraw {
    pub fn create_game() -> Result<Game, ConfigError> {
        let streets = vec![
            Street::new(vec![false; 5], false, Opening::Position, false)?,
            Street::new(vec![], true, Opening::Position, true)?,
        ];

        GameBuilder::new(Variant::FiveCardDraw)
            .streets(streets)
            .forced_bets(ForcedBets::Blinds)
            .max_discards(3)
            .build()
    }
}

pub struct FiveCardStud;

impl FiveCardStud {
    pub fn create_game() -> Result<Game, ConfigError> {
        let streets = vec![
            Street::new(vec![false, true], false, Opening::LowCard, false)?,
            Street::new(vec![true], false, Opening::HighHand, false)?,
            Street::new(vec![true], false, Opening::HighHand, true)?,
            Street::new(vec![true], false, Opening::HighHand, true)?,
        ];

        GameBuilder::new(Variant::FiveCardStud)
            .streets(streets)
            .forced_bets(ForcedBets::BringIn)
            .antes(true)
            .build()
    }
}

impl Variant {
    pub fn create_game(&self) -> Result<Game, ConfigError> {
        match self {
            Variant::FiveCardDraw => FiveCardDraw::create_game(),
            Variant::FiveCardStud => FiveCardStud::create_game(),
        }
    }
}
