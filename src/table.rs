//! Fixed-capacity seating with a rotating button.

use crate::errors::ConfigError;
use crate::players::Player;

/// What a seat contributes to the current hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatState {
    Empty,
    /// Seated but holding no cards.
    Folded,
    Active,
    /// Holding cards with no chips behind.
    AllIn,
}

impl SeatState {
    pub fn is_occupied(self) -> bool {
        self != SeatState::Empty
    }

    pub fn has_cards(self) -> bool {
        matches!(self, SeatState::Active | SeatState::AllIn)
    }
}

/// Rotation direction. `Left` follows increasing seat indices, the order of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    seats: Vec<Option<Player>>,
    pub button: Option<usize>,
}

impl Table {
    pub fn new(size: usize) -> Self {
        Self {
            seats: vec![None; size],
            button: None,
        }
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.iter().all(Option::is_none)
    }

    pub fn sit(&mut self, seat: usize, player: Player) -> Result<(), ConfigError> {
        if self.players().any(|(_, p)| p.name() == player.name()) {
            return Err(ConfigError::DuplicateName(player.name().to_string()));
        }
        match self.seats.get_mut(seat) {
            None => Err(ConfigError::SeatOutOfRange(seat)),
            Some(Some(_)) => Err(ConfigError::SeatOccupied(seat)),
            Some(slot) => {
                *slot = Some(player);
                Ok(())
            }
        }
    }

    pub fn stand(&mut self, seat: usize) -> Option<Player> {
        self.seats.get_mut(seat).and_then(Option::take)
    }

    pub fn seat(&self, seat: usize) -> Option<&Player> {
        self.seats.get(seat).and_then(Option::as_ref)
    }

    pub fn seat_mut(&mut self, seat: usize) -> Option<&mut Player> {
        self.seats.get_mut(seat).and_then(Option::as_mut)
    }

    /// Occupied seats with their players, in seat order.
    pub fn players(&self) -> impl Iterator<Item = (usize, &Player)> + '_ {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|p| (i, p)))
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = (usize, &mut Player)> + '_ {
        self.seats
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|p| (i, p)))
    }

    pub fn state(&self, seat: usize) -> SeatState {
        match self.seat(seat) {
            None => SeatState::Empty,
            Some(p) if !p.has_cards() => SeatState::Folded,
            Some(p) if p.stack == 0 => SeatState::AllIn,
            Some(_) => SeatState::Active,
        }
    }

    pub fn occupied(&self) -> Vec<usize> {
        self.players().map(|(i, _)| i).collect()
    }

    pub fn players_with_cards(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.state(i).has_cards()).collect()
    }

    /// Seated players without chips.
    pub fn broke_players(&self) -> Vec<usize> {
        self.players()
            .filter(|(_, p)| p.stack == 0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Seats strictly after `from` in `direction`, going once around the table and
    /// ending on `from` itself, restricted to seats whose state passes `filter`.
    pub fn seats_from(
        &self,
        from: usize,
        direction: Direction,
        filter: fn(SeatState) -> bool,
    ) -> SeatIter<'_> {
        SeatIter {
            table: self,
            cursor: from,
            remaining: self.len(),
            direction,
            filter,
        }
    }

    pub fn next_occupied(&self, from: usize, direction: Direction) -> Option<usize> {
        self.seats_from(from, direction, SeatState::is_occupied).next()
    }

    pub fn next_with_cards(&self, from: usize, direction: Direction) -> Option<usize> {
        self.seats_from(from, direction, SeatState::has_cards).next()
    }

    /// Moves the button to the next occupied seat, or to the first occupied seat if
    /// the button has never been placed.
    pub fn move_button(&mut self) -> Result<usize, ConfigError> {
        let next = match self.button {
            Some(button) => self.next_occupied(button, Direction::Left),
            None => self.occupied().first().copied(),
        };
        let button = next.ok_or(ConfigError::NotEnoughPlayers(0))?;
        self.button = Some(button);
        Ok(button)
    }

    pub fn button(&self) -> Result<usize, ConfigError> {
        self.button.ok_or(ConfigError::ButtonUnset)
    }

    /// Heads-up the button posts the small blind; otherwise the first occupied seat
    /// left of the button does.
    pub fn small_blind(&self) -> Result<usize, ConfigError> {
        let button = self.button()?;
        let seated = self.occupied().len();
        if seated < 2 {
            return Err(ConfigError::NotEnoughPlayers(seated));
        }
        if seated == 2 && self.seat(button).is_some() {
            return Ok(button);
        }
        self.next_occupied(button, Direction::Left)
            .ok_or(ConfigError::NotEnoughPlayers(seated))
    }

    pub fn big_blind(&self) -> Result<usize, ConfigError> {
        let small_blind = self.small_blind()?;
        self.next_occupied(small_blind, Direction::Left)
            .ok_or(ConfigError::NotEnoughPlayers(self.occupied().len()))
    }

    /// Occupied seats in dealing order: left of the button first, button last.
    pub fn dealing_order(&self) -> Vec<usize> {
        let start = self.button.unwrap_or(self.len().saturating_sub(1));
        self.seats_from(start, Direction::Left, SeatState::is_occupied)
            .collect()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = (usize, &'a Player);
    type IntoIter = Box<dyn Iterator<Item = (usize, &'a Player)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.players())
    }
}

/// Walks seats around the table, skipping those a filter rejects.
pub struct SeatIter<'a> {
    table: &'a Table,
    cursor: usize,
    remaining: usize,
    direction: Direction,
    filter: fn(SeatState) -> bool,
}

impl Iterator for SeatIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let len = self.table.len();
        while self.remaining > 0 {
            self.remaining -= 1;
            self.cursor = match self.direction {
                Direction::Left => (self.cursor + 1) % len,
                Direction::Right => (self.cursor + len - 1) % len,
            };
            if (self.filter)(self.table.state(self.cursor)) {
                return Some(self.cursor);
            }
        }
        None
    }
}
