//! A sequence of rounds played at one table.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::errors::{ConfigError, RoundError};
use crate::games::{Game, Variant};
use crate::hands::{Evaluator, StandardHighHand};
use crate::players::Player;
use crate::stakes::Stakes;
use crate::state::{Actors, Round, RoundOutcome};
use crate::strategy::{Actor, RangeActor};
use crate::table::Table;
use crate::utilities::Deck;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub variant: Variant,
    pub stake_level: u32,
    pub starting_chips: u64,
    pub table_size: usize,
    pub antes: bool,
    pub raise_cap: u32,
    /// Fixes the shuffles and the first button when set.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            variant: Variant::FiveCardDraw,
            stake_level: 4,
            starting_chips: 1000,
            table_size: 6,
            antes: true,
            raise_cap: 4,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.table_size < 2 {
            return Err(ConfigError::NotEnoughPlayers(self.table_size));
        }
        if self.raise_cap == 0 {
            return Err(ConfigError::InvalidGame("raise cap must allow a bet"));
        }
        Stakes::level(self.stake_level)?;
        let max = self.variant.create_game()?.max_players(Deck::standard().len());
        if self.table_size > max {
            return Err(ConfigError::TooManyPlayers {
                players: self.table_size,
                max,
            });
        }
        Ok(())
    }
}

pub struct Session {
    pub config: SessionConfig,
    pub game: Game,
    pub stakes: Stakes,
    pub table: Table,
    pub rounds: usize,
    actors: Actors,
    evaluator: Box<dyn Evaluator>,
    rng: StdRng,
}

impl Session {
    /// Seats `players` in order, gives each the starting chips and places the
    /// button at random. AI players get a range actor; human seats need one from
    /// [`Session::seat_actor`] before play.
    pub fn new(config: SessionConfig, players: Vec<Player>) -> Result<Self, ConfigError> {
        config.validate()?;
        let game = config.variant.create_game()?;
        let stakes = Stakes::level(config.stake_level)?;
        if players.len() < 2 {
            return Err(ConfigError::NotEnoughPlayers(players.len()));
        }

        let mut table = Table::new(config.table_size);
        let mut actors = Actors::new();
        for (seat, mut player) in players.into_iter().enumerate() {
            player.stack = config.starting_chips;
            if !player.archetype.is_human() {
                actors.insert(seat, Box::new(RangeActor::new(player.archetype)) as Box<dyn Actor>);
            }
            table.sit(seat, player)?;
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        table.button = table.occupied().choose(&mut rng).copied();

        log::info!(
            "{} session at stake level {} with {} players",
            game.variant,
            config.stake_level,
            table.occupied().len()
        );
        Ok(Self {
            config,
            game,
            stakes,
            table,
            rounds: 0,
            actors,
            evaluator: Box::new(StandardHighHand),
            rng,
        })
    }

    pub fn seat_actor(&mut self, seat: usize, actor: Box<dyn Actor>) {
        self.actors.insert(seat, actor);
    }

    pub fn is_over(&self) -> bool {
        self.table.occupied().len() < 2
    }

    pub fn total_chips(&self) -> u64 {
        self.table.players().map(|(_, p)| p.stack).sum()
    }

    /// Plays one round, then removes players left without chips and advances the
    /// button.
    pub fn play_round(&mut self) -> Result<RoundOutcome, RoundError> {
        let mut deck = Deck::standard();
        deck.shuffle_with(&mut self.rng);

        let outcome = {
            let mut round = Round::new(&mut self.table, &self.game, self.stakes, deck)?
                .with_raise_cap(self.config.raise_cap)
                .with_antes(self.config.antes);
            round.play(&mut self.actors, self.evaluator.as_ref())?
        };
        self.rounds += 1;

        self.clear_broke_players();
        if !self.is_over() {
            self.table.move_button()?;
        }
        Ok(outcome)
    }

    /// Stands up every player without chips, returning them.
    pub fn clear_broke_players(&mut self) -> Vec<Player> {
        let broke = self.table.broke_players();
        broke
            .into_iter()
            .filter_map(|seat| {
                self.actors.remove(&seat);
                let player = self.table.stand(seat)?;
                log::info!("{} is out of chips and leaves seat {}", player.name(), seat);
                Some(player)
            })
            .collect()
    }
}
