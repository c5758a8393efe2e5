//! Hand evaluation.
//!
//! Evaluation runs once per contender per hand, so the best hand out of
//! seven cards is found by brute force over all 21 five-card subsets.

use super::entities::{ACE, Card, EvaluatedHand, HandRank, Value};

/// Best five-card hand out of two hole cards and a full board.
#[must_use]
pub fn evaluate(cards: &[Card; 7]) -> EvaluatedHand {
    five_card_subsets(cards)
        .map(|subset| evaluate_five(&subset))
        .fold(None, |best: Option<EvaluatedHand>, hand| match best {
            Some(best) if best >= hand => Some(best),
            _ => Some(hand),
        })
        .unwrap_or_else(EvaluatedHand::uncontested)
}

/// Every way of leaving out two of the seven cards.
fn five_card_subsets(cards: &[Card; 7]) -> impl Iterator<Item = [Card; 5]> + '_ {
    (0..7).flat_map(move |skip_a| {
        (skip_a + 1..7).map(move |skip_b| {
            let mut subset = [cards[0]; 5];
            let kept = (0..7).filter(|&i| i != skip_a && i != skip_b);
            for (slot, i) in subset.iter_mut().zip(kept) {
                *slot = cards[i];
            }
            subset
        })
    })
}

/// Classify exactly five cards.
///
/// `values` is ordered for tie-breaking: larger groups first, higher values
/// first within a group size. Straights list their cards from the top, a
/// wheel (A-2-3-4-5) counting the ace as 1.
#[must_use]
pub fn evaluate_five(cards: &[Card; 5]) -> EvaluatedHand {
    let mut values: Vec<Value> = cards.iter().map(|card| card.0).collect();
    values.sort_unstable_by(|a, b| b.cmp(a));

    let is_flush = cards.iter().all(|card| card.1 == cards[0].1);
    let straight_high = straight_high(&values);

    // (count, value) pairs, largest group first.
    let mut groups: Vec<(usize, Value)> = Vec::with_capacity(5);
    for &value in &values {
        match groups.last_mut() {
            Some((count, v)) if *v == value => *count += 1,
            _ => groups.push((1, value)),
        }
    }
    groups.sort_unstable_by(|a, b| b.cmp(a));
    let counts: Vec<usize> = groups.iter().map(|(count, _)| *count).collect();

    let rank = match (straight_high, is_flush, counts.as_slice()) {
        (Some(_), true, _) => HandRank::StraightFlush,
        (_, _, [4, ..]) => HandRank::FourOfAKind,
        (_, _, [3, 2]) => HandRank::FullHouse,
        (_, true, _) => HandRank::Flush,
        (Some(_), _, _) => HandRank::Straight,
        (_, _, [3, ..]) => HandRank::ThreeOfAKind,
        (_, _, [2, 2, ..]) => HandRank::TwoPair,
        (_, _, [2, ..]) => HandRank::OnePair,
        _ => HandRank::HighCard,
    };

    let values = match straight_high {
        Some(high) => (0..5).map(|offset| high - offset).collect(),
        None => groups
            .iter()
            .flat_map(|&(count, value)| std::iter::repeat_n(value, count))
            .collect(),
    };

    EvaluatedHand::new(rank, values)
}

/// Top card of a straight, given values sorted high to low.
fn straight_high(sorted: &[Value]) -> Option<Value> {
    if sorted.windows(2).all(|w| w[0] == w[1] + 1) {
        return sorted.first().copied();
    }
    if sorted == [ACE, 5, 4, 3, 2] {
        return Some(5);
    }
    None
}

/// Indices of every hand tied for best.
#[must_use]
pub fn winners(hands: &[EvaluatedHand]) -> Vec<usize> {
    let Some(best) = hands.iter().max() else {
        return Vec::new();
    };
    hands
        .iter()
        .enumerate()
        .filter(|(_, hand)| *hand == best)
        .map(|(i, _)| i)
        .collect()
}
