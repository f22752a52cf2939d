//! Game-state engine for five-card draw and five-card stud.
//!
//! A [`session::Session`] seats players and plays [`state::Round`]s one after the
//! other. Each round deals, posts forced bets, runs fixed-limit betting streets and
//! pays out side pots, keeping every chip and card accounted for.

pub mod errors;
pub mod games;
pub mod hands;
pub mod options;
pub mod players;
pub mod pots;
pub mod profiles;
pub mod session;
pub mod stakes;
pub mod state;
pub mod strategy;
pub mod table;
pub mod utilities;
