//! Seated players: name, chips and the cards currently held.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::errors::ConfigError;
use crate::utilities::{validate_name, Card};

/// Who makes the decisions for a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Archetype {
    Human,
    Fish,
    Jackal,
    Mouse,
    Lion,
}

impl Archetype {
    pub const AI: [Archetype; 4] = [
        Archetype::Fish,
        Archetype::Jackal,
        Archetype::Mouse,
        Archetype::Lion,
    ];

    pub fn is_human(&self) -> bool {
        *self == Archetype::Human
    }
}

/// A card in a player's hand together with its visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeldCard {
    pub card: Card,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    pub archetype: Archetype,
    pub stack: u64,
    pub hand: Vec<HeldCard>,
}

impl Player {
    pub fn new(name: &str, archetype: Archetype) -> Result<Self, ConfigError> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            archetype,
            stack: 0,
            hand: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Removes up to `amount` chips from the stack and returns what was actually
    /// taken. Asking for more than the stack puts the player all-in.
    pub fn bet(&mut self, amount: u64) -> u64 {
        let paid = amount.min(self.stack);
        self.stack -= paid;
        paid
    }

    pub fn win(&mut self, amount: u64) {
        self.stack += amount;
    }

    pub fn add_card(&mut self, card: Card, hidden: bool) {
        self.hand.push(HeldCard { card, hidden });
    }

    /// Gives up the hand, returning its cards.
    pub fn fold(&mut self) -> Vec<Card> {
        self.hand.drain(..).map(|h| h.card).collect()
    }

    pub fn has_cards(&self) -> bool {
        !self.hand.is_empty()
    }

    pub fn is_allin(&self) -> bool {
        self.stack == 0 && self.has_cards()
    }

    pub fn cards(&self) -> Vec<Card> {
        self.hand.iter().map(|h| h.card).collect()
    }

    pub fn up_cards(&self) -> Vec<Card> {
        self.hand.iter().filter(|h| !h.hidden).map(|h| h.card).collect()
    }

    pub fn reveal(&mut self) {
        self.hand.iter_mut().for_each(|h| h.hidden = false);
    }
}
