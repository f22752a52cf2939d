//! Error types shared across the engine.

use thiserror::Error;

use crate::options::Action;

/// Problems detected before a round can start.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid player name '{0}'")]
    InvalidName(String),
    #[error("button has not been set")]
    ButtonUnset,
    #[error("at least 2 seated players are required, found {0}")]
    NotEnoughPlayers(usize),
    #[error("{players} players are more than the deck can deal to ({max})")]
    TooManyPlayers { players: usize, max: usize },
    #[error("seat {0} is out of range")]
    SeatOutOfRange(usize),
    #[error("seat {0} is already occupied")]
    SeatOccupied(usize),
    #[error("player name '{0}' is already seated")]
    DuplicateName(String),
    #[error("invalid game definition: {0}")]
    InvalidGame(&'static str),
    #[error("unknown stake level {0}")]
    UnknownStakeLevel(u32),
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Fatal or recoverable failures while a round is running.
#[derive(Debug, Error)]
pub enum RoundError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("deck exhausted: needed {needed} cards, {remaining} remaining")]
    DeckExhausted { needed: usize, remaining: usize },
    #[error("card integrity violated: deck {deck} + held {held} + muck {muck} != {expected}")]
    Integrity {
        deck: usize,
        held: usize,
        muck: usize,
        expected: usize,
    },
    #[error("seat {seat} chose {action}, which is not a legal option")]
    IllegalAction { seat: usize, action: Action },
    #[error("seat {seat} cannot discard cards it does not hold")]
    InvalidDiscard { seat: usize },
    #[error("seat {0} is empty")]
    EmptySeat(usize),
    #[error("no actor is registered for seat {0}")]
    MissingActor(usize),
    #[error("street {0} is past the final street")]
    StreetOverflow(usize),
    #[error("no seat holds cards")]
    NoCardHolders,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardError {
    #[error("card string '{0}' must have an even length")]
    OddLength(String),
    #[error("invalid rank '{0}'")]
    InvalidRank(String),
    #[error("invalid suit '{0}'")]
    InvalidSuit(String),
    #[error("expected a single card, got {0}")]
    NotSingle(usize),
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("profile io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("profile data is corrupt: {0}")]
    Json(#[from] serde_json::Error),
    #[error("profile '{0}' already exists")]
    Exists(String),
    #[error("profile '{0}' does not exist")]
    NotFound(String),
    #[error("{name} has {bank} in the bank, {requested} requested")]
    InsufficientBank { name: String, bank: u64, requested: u64 },
}
