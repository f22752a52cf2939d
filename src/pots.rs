//! Side-pot partitioning and prize distribution.
//!
//! Everything here is a pure function of what each seat put in, how much it started
//! the round with and, for seats still holding cards, how strong its hand is. The
//! round feeds these in at showdown and applies the resulting awards.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::hands::Strength;
use crate::utilities::div_mod;

/// What one seat brings to the showdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contender {
    pub seat: usize,
    pub starting_stack: u64,
    pub invested: u64,
    pub allin: bool,
    /// `None` once the seat has folded.
    pub strength: Option<Strength>,
}

impl Contender {
    pub fn has_cards(&self) -> bool {
        self.strength.is_some()
    }
}

/// The chips contestable by a player who went all-in for `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidePot {
    pub level: u64,
    pub amount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Award {
    pub seat: usize,
    pub amount: u64,
}

/// One slice of the pot with the seats that could win it and the seats that did.
/// `level` is `None` for the uncapped slice above every all-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PotSlice {
    pub level: Option<u64>,
    pub amount: u64,
    pub eligible: Vec<usize>,
    pub winners: Vec<usize>,
    pub awards: Vec<Award>,
}

/// Distinct all-in levels, ascending.
pub fn allin_levels(contenders: &[Contender]) -> Vec<u64> {
    contenders
        .iter()
        .filter(|c| c.allin && c.has_cards())
        .map(|c| c.starting_stack)
        .sorted()
        .dedup()
        .collect()
}

/// Every contributor's investment counted up to `level`.
pub fn sidepot(level: u64, contenders: &[Contender]) -> SidePot {
    let amount = contenders.iter().map(|c| c.invested.min(level)).sum();
    SidePot { level, amount }
}

/// The pot slice belonging to each level: the cumulative side pot at that level
/// minus the cumulative side pot at the level below.
pub fn make_sidepots(levels: &[u64], contenders: &[Contender]) -> BTreeMap<u64, u64> {
    let mut slices = BTreeMap::new();
    let mut below = 0;
    for &level in levels.iter().sorted().dedup() {
        let cumulative = sidepot(level, contenders).amount;
        slices.insert(level, cumulative - below);
        below = cumulative;
    }
    slices
}

/// Seats holding cards whose starting stack reaches `threshold`.
pub fn eligible(threshold: u64, contenders: &[Contender]) -> Vec<usize> {
    contenders
        .iter()
        .filter(|c| c.has_cards() && c.starting_stack >= threshold)
        .map(|c| c.seat)
        .collect()
}

/// The eligible seats holding the strongest hand.
pub fn best_hands(eligible: &[usize], contenders: &[Contender]) -> Vec<usize> {
    let strengths: Vec<(usize, &Strength)> = contenders
        .iter()
        .filter(|c| eligible.contains(&c.seat))
        .filter_map(|c| c.strength.as_ref().map(|s| (c.seat, s)))
        .collect();
    let best = strengths.iter().map(|(_, s)| *s).max();
    strengths
        .iter()
        .filter(|(_, s)| Some(*s) == best)
        .map(|(seat, _)| *seat)
        .collect()
}

/// Splits `amount` evenly among `winners`. Chips that do not divide evenly all go
/// to the first winner strictly left of the button.
pub fn split(amount: u64, winners: &[usize], button: usize, seat_count: usize) -> Vec<Award> {
    if winners.is_empty() {
        return Vec::new();
    }
    let (share, remainder) = div_mod(amount, winners.len() as u64);
    let distance = |seat: usize| (seat + seat_count - button - 1) % seat_count;
    let first = winners.iter().copied().min_by_key(|&seat| distance(seat));
    winners
        .iter()
        .map(|&seat| Award {
            seat,
            amount: if Some(seat) == first { share + remainder } else { share },
        })
        .collect()
}

/// Partitions `pot` into slices and decides who wins each one.
pub fn showdown(pot: u64, contenders: &[Contender], button: usize, seat_count: usize) -> Vec<PotSlice> {
    let levels = allin_levels(contenders);
    let sidepots = make_sidepots(&levels, contenders);

    let mut slices: Vec<(Option<u64>, u64, u64)> = sidepots
        .iter()
        .map(|(&level, &amount)| (Some(level), amount, level))
        .collect();
    let remainder = pot - sidepots.values().sum::<u64>();
    if remainder > 0 || slices.is_empty() {
        let threshold = levels.last().map_or(0, |top| top + 1);
        slices.push((None, remainder, threshold));
    }

    slices
        .into_iter()
        .filter(|&(_, amount, _)| amount > 0)
        .map(|(level, amount, threshold)| {
            let mut seats = eligible(threshold, contenders);
            if seats.is_empty() {
                log::warn!("no seat is eligible for the {} slice, opening it to every hand", amount);
                seats = eligible(0, contenders);
            }
            let winners = best_hands(&seats, contenders);
            let awards = split(amount, &winners, button, seat_count);
            PotSlice {
                level,
                amount,
                eligible: seats,
                winners,
                awards,
            }
        })
        .collect()
}

/// Total awarded per seat across all slices.
pub fn totals(slices: &[PotSlice]) -> BTreeMap<usize, u64> {
    let mut totals = BTreeMap::new();
    for award in slices.iter().flat_map(|s| s.awards.iter()) {
        *totals.entry(award.seat).or_insert(0) += award.amount;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hands::Label;
    use crate::utilities::Rank;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn contender(seat: usize, starting_stack: u64, invested: u64, strength: Option<Strength>) -> Contender {
        Contender {
            seat,
            starting_stack,
            invested,
            allin: invested == starting_stack,
            strength,
        }
    }

    fn high(rank: Rank) -> Option<Strength> {
        Some(Strength::floor(Label::HighCard, rank))
    }

    #[test]
    fn two_players_allin_for_100() {
        let contenders = vec![
            contender(0, 100, 100, high(Rank::Ace)),
            contender(1, 100, 100, high(Rank::King)),
        ];
        let levels = allin_levels(&contenders);
        assert_eq!(make_sidepots(&levels, &contenders), BTreeMap::from([(100, 200)]));
    }

    #[test]
    fn uneven_stacks_make_two_slices() {
        let contenders = vec![
            contender(0, 1000, 300, high(Rank::Ace)),
            contender(1, 1000, 300, high(Rank::King)),
            contender(2, 225, 225, high(Rank::Queen)),
            contender(3, 100, 100, high(Rank::Jack)),
        ];
        let levels = allin_levels(&contenders);
        assert_eq!(levels, vec![100, 225]);
        assert_eq!(
            make_sidepots(&levels, &contenders),
            BTreeMap::from([(100, 400), (225, 375)])
        );
        assert_eq!(sidepot(225, &contenders).amount, 775);
    }

    #[test]
    fn stepped_stacks_are_won_by_descending_hands() {
        let contenders = vec![
            contender(0, 100, 100, high(Rank::Ace)),
            contender(1, 200, 200, high(Rank::King)),
            contender(2, 300, 300, high(Rank::Queen)),
        ];
        let slices = showdown(600, &contenders, 2, 3);
        let summary: Vec<(u64, Vec<usize>)> =
            slices.iter().map(|s| (s.amount, s.winners.clone())).collect();
        assert_eq!(summary, vec![(300, vec![0]), (200, vec![1]), (100, vec![2])]);
    }

    #[test]
    fn no_allins_is_one_slice_open_to_all() {
        let contenders = vec![
            contender(0, 1000, 50, high(Rank::Ace)),
            contender(1, 1000, 50, high(Rank::King)),
            contender(2, 1000, 20, None),
        ];
        let slices = showdown(120, &contenders, 0, 3);
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].level, None);
        assert_eq!(slices[0].eligible, vec![0, 1]);
        assert_eq!(totals(&slices), BTreeMap::from([(0, 120)]));
    }

    #[test]
    fn eligibility_requires_cards_and_depth() {
        let contenders = vec![
            contender(0, 100, 100, high(Rank::Ace)),
            contender(1, 200, 200, high(Rank::King)),
            contender(2, 300, 300, high(Rank::Queen)),
            contender(3, 500, 300, None),
        ];
        assert_eq!(eligible(100, &contenders), vec![0, 1, 2]);
        assert_eq!(eligible(200, &contenders), vec![1, 2]);
        assert_eq!(eligible(300, &contenders), vec![2]);
    }

    #[test]
    fn odd_chip_goes_left_of_the_button() {
        let awards = split(101, &[1, 4], 3, 6);
        assert_eq!(awards, vec![Award { seat: 1, amount: 50 }, Award { seat: 4, amount: 51 }]);
        let awards = split(101, &[1, 4], 0, 6);
        assert_eq!(awards, vec![Award { seat: 1, amount: 51 }, Award { seat: 4, amount: 50 }]);
        // the button itself is the last seat in line
        let awards = split(7, &[2, 3], 2, 4);
        assert_eq!(awards, vec![Award { seat: 2, amount: 3 }, Award { seat: 3, amount: 4 }]);
    }

    #[test]
    fn ties_split_evenly() {
        let contenders = vec![
            contender(0, 1000, 100, high(Rank::Ace)),
            contender(1, 1000, 100, high(Rank::Ace)),
            contender(2, 1000, 100, high(Rank::King)),
        ];
        let slices = showdown(300, &contenders, 2, 3);
        assert_eq!(totals(&slices), BTreeMap::from([(0, 150), (1, 150)]));
    }

    #[test]
    fn random_partitions_award_the_whole_pot() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let seats = rng.gen_range(2..=8);
            let contenders: Vec<Contender> = (0..seats)
                .map(|seat| {
                    let starting_stack = rng.gen_range(1..=20) * 25;
                    let invested = rng.gen_range(0..=starting_stack);
                    let folded = rng.gen_bool(0.3);
                    let rank = RANKS[rng.gen_range(0..RANKS.len())];
                    let strength = (!folded).then(|| Strength::floor(Label::HighCard, rank));
                    contender(seat, starting_stack, invested, strength)
                })
                .collect();
            if contenders.iter().all(|c| !c.has_cards()) {
                continue;
            }
            let pot: u64 = contenders.iter().map(|c| c.invested).sum();
            let slices = showdown(pot, &contenders, rng.gen_range(0..seats), seats);

            assert_eq!(slices.iter().map(|s| s.amount).sum::<u64>(), pot);
            assert_eq!(totals(&slices).values().sum::<u64>(), pot);
            for slice in &slices {
                if let Some(level) = slice.level {
                    for seat in &slice.eligible {
                        assert!(contenders[*seat].starting_stack >= level);
                    }
                }
            }
        }
    }

    const RANKS: [Rank; 13] = [
        Rank::Deuce,
        Rank::Trey,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];
}
