//! Pot settlement policy.
//!
//! There are no side pots: the whole pot goes to the best hand(s) among the
//! contenders regardless of how much each of them put in.

use super::entities::{Chips, SeatIndex};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PotSplit {
    pub payouts: Vec<(SeatIndex, Chips)>,
    /// Chips integer division couldn't hand out. They stay in the pot.
    pub remainder: Chips,
}

/// Split `pot` evenly between `winners`.
#[must_use]
pub fn simple_split_pot(pot: Chips, winners: &[SeatIndex]) -> PotSplit {
    let Ok(count) = Chips::try_from(winners.len()) else {
        return PotSplit {
            payouts: Vec::new(),
            remainder: pot,
        };
    };
    if count == 0 {
        return PotSplit {
            payouts: Vec::new(),
            remainder: pot,
        };
    }

    let share = pot / count;
    PotSplit {
        payouts: winners.iter().map(|&seat| (seat, share)).collect(),
        remainder: pot - share * count,
    }
}
