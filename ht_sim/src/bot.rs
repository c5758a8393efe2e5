//! Bot decision-making for self-play.
//!
//! Bots only ever produce actions the engine will accept: they read the
//! amount to call and the minimum raise off the table view and never bet
//! more than they hold.

use holdem_table::{
    Action, Card, Chips, HandRank, TableView,
    constants::{BOARD_SIZE, HOLE_CARDS},
    functional::evaluate,
};
use rand::Rng;

/// Hand strength for a made hand on a full board, by rank
fn made_hand_strength(rank: HandRank) -> f32 {
    match rank {
        HandRank::HighCard => 0.1,
        HandRank::OnePair => 0.25,
        HandRank::TwoPair => 0.40,
        HandRank::ThreeOfAKind => 0.55,
        HandRank::Straight => 0.70,
        HandRank::Flush => 0.75,
        HandRank::FullHouse => 0.85,
        HandRank::FourOfAKind => 0.95,
        HandRank::StraightFlush => 0.99,
    }
}

/// Rough strength of two hole cards: pairs and high cards score well,
/// suited and connected cards get a small bonus.
fn hole_card_strength(hole: &[Card]) -> f32 {
    let [Card(a, a_suit), Card(b, b_suit)] = hole else {
        return 0.0;
    };
    let (high, low) = if a >= b { (*a, *b) } else { (*b, *a) };
    let mut strength = f32::from(high + low) / 28.0 * 0.5;
    if high == low {
        strength += 0.3;
    }
    if a_suit == b_suit {
        strength += 0.05;
    }
    if high - low == 1 {
        strength += 0.03;
    }
    strength.min(1.0)
}

/// Estimate where `hole` stands given the board dealt so far.
#[must_use]
pub fn hand_strength(hole: &[Card], board: &[Card]) -> f32 {
    if hole.len() != HOLE_CARDS {
        return 0.0;
    }
    if board.len() == BOARD_SIZE {
        let mut cards = [hole[0]; 7];
        cards[..HOLE_CARDS].copy_from_slice(hole);
        cards[HOLE_CARDS..].copy_from_slice(board);
        return made_hand_strength(evaluate(&cards).rank);
    }
    hole_card_strength(hole)
}

/// Pick a legal action for `token`, who must be the player to act.
pub fn decide<R: Rng>(
    view: &TableView,
    token: &str,
    hole: &[Card],
    rng: &mut R,
) -> Action {
    let Some(me) = view.player(token) else {
        return Action::Fold;
    };
    let to_call = view.highest_bet.saturating_sub(me.current_bet);
    let max_total: Chips = me.current_bet + me.stack;
    let can_raise = view.min_raise_to <= max_total;

    let strength = hand_strength(hole, &view.board);
    let roll: f32 = rng.random();

    if strength > 0.6 && can_raise && roll < 0.6 {
        // Between a min-raise and a pot-sized one, capped at the stack.
        let pot_sized = view
            .highest_bet
            .saturating_add(view.pot.max(view.blinds.big));
        let target = rng.random_range(view.min_raise_to..=pot_sized.max(view.min_raise_to));
        return Action::Raise(target.min(max_total));
    }

    if to_call == 0 {
        if can_raise && roll < 0.1 {
            return Action::Raise(view.min_raise_to);
        }
        return Action::Check;
    }

    // Pot odds make marginal calls cheaper.
    let pot_odds = to_call as f32 / (view.pot + to_call) as f32;
    if strength + 0.2 >= pot_odds || roll < 0.15 {
        Action::Call
    } else {
        Action::Fold
    }
}
