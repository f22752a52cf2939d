//! Legal betting options for the acting player.

use std::fmt;

/// A betting decision. Amounts are the chips the action moves into the pot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Fold,
    Check,
    Call(u64),
    Bet(u64),
    /// `increment` is how many bet levels the raise adds.
    Raise { amount: u64, increment: u32 },
    /// The player's whole stack, for no more than the amount owed.
    AllIn(u64),
}

impl Action {
    /// Chips moved into the pot.
    pub fn amount(&self) -> u64 {
        match *self {
            Action::Fold | Action::Check => 0,
            Action::Call(amount) | Action::Bet(amount) | Action::AllIn(amount) => amount,
            Action::Raise { amount, .. } => amount,
        }
    }

    /// Bet levels added. A non-zero increment reopens the street.
    pub fn increment(&self) -> u32 {
        match *self {
            Action::Bet(_) => 1,
            Action::Raise { increment, .. } => increment,
            _ => 0,
        }
    }

    pub fn is_aggressive(&self) -> bool {
        self.increment() > 0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Fold => write!(f, "FOLD"),
            Action::Check => write!(f, "CHECK"),
            Action::Call(amount) => write!(f, "CALL {}", amount),
            Action::Bet(amount) => write!(f, "BET {}", amount),
            Action::Raise { amount, .. } => write!(f, "RAISE {}", amount),
            Action::AllIn(amount) => write!(f, "ALLIN {}", amount),
        }
    }
}

/// Legal actions for a player owing `cost` with `stack` chips behind, betting in
/// increments of `unit` with `raises_left` raises remaining on the street.
///
/// A bet or raise the stack cannot fully cover is not offered, so every level
/// increase is a complete one.
pub fn options(cost: u64, stack: u64, unit: u64, raises_left: u32) -> Vec<Action> {
    let can_raise = raises_left > 0;
    if cost == 0 {
        let mut options = vec![Action::Check];
        if can_raise && stack >= unit {
            options.push(Action::Bet(unit));
        }
        options
    } else if stack > cost {
        let mut options = vec![Action::Fold, Action::Call(cost)];
        if can_raise && stack >= cost + unit {
            options.push(Action::Raise {
                amount: cost + unit,
                increment: 1,
            });
        }
        options
    } else {
        vec![Action::Fold, Action::AllIn(stack)]
    }
}

/// The action taken when a decision never arrives: check when free, else fold.
pub fn fallback(options: &[Action]) -> Action {
    if options.contains(&Action::Check) {
        Action::Check
    } else {
        Action::Fold
    }
}
