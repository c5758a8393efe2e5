use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

use super::errors::GameError;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Spade, Self::Diamond, Self::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

pub const MIN_VALUE: Value = 2;
pub const ACE: Value = 14;

/// A card is a tuple of a value (deuce=2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            14 => write!(f, "A")?,
            13 => write!(f, "K")?,
            12 => write!(f, "Q")?,
            11 => write!(f, "J")?,
            v => write!(f, "{v}")?,
        }
        write!(f, "{}", self.1)
    }
}

/// A 52-card deck. Cards are dealt from the top, which is the end of the
/// underlying vector.
#[derive(Clone, Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Unshuffled deck, clubs through hearts, deuce through ace.
    #[must_use]
    pub fn ordered() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for value in MIN_VALUE..=ACE {
                cards.push(Card(value, suit));
            }
        }
        Self { cards }
    }

    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Self::ordered();
        deck.cards.shuffle(rng);
        deck
    }

    #[must_use]
    pub fn new_shuffled() -> Self {
        Self::shuffled(&mut rand::rng())
    }

    /// Deck that deals `cards` front to back. Used to replay or rig a hand.
    #[must_use]
    pub fn from_draw_order(cards: impl IntoIterator<Item = Card>) -> Self {
        let mut cards: Vec<Card> = cards.into_iter().collect();
        cards.reverse();
        Self { cards }
    }

    pub fn draw(&mut self) -> Result<Card, GameError> {
        self.cards.pop().ok_or(GameError::EmptyDeck)
    }

    pub fn burn(&mut self) -> Result<(), GameError> {
        self.draw().map(|_| ())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::ordered()
    }
}

/// Type alias for whole chips. Stacks, bets and pots are all counted in
/// whole chips.
pub type Chips = u32;

/// Seat positions are indices into the table's seating order.
pub type SeatIndex = usize;

/// Unique seat identifier of a player at a table.
pub type Token = String;

/// Identifier a table is registered under.
pub type GameId = String;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.small, self.big)
    }
}

/// What a player can do on their turn. `Raise` carries the player's new
/// total bet for the current betting round, not the increment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Fold,
    Check,
    Call,
    Raise(Chips),
}

impl Action {
    /// Build an action from an inbound `(kind, amount)` pair. The amount is
    /// only read for raises.
    pub fn from_request(kind: &str, amount: Option<Chips>) -> Result<Self, GameError> {
        match kind.parse::<ActionKind>()? {
            ActionKind::Fold => Ok(Self::Fold),
            ActionKind::Check => Ok(Self::Check),
            ActionKind::Call => Ok(Self::Call),
            ActionKind::Raise => amount
                .map(Self::Raise)
                .ok_or_else(|| GameError::InvalidAction("raise needs an amount".to_string())),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Fold => ActionKind::Fold,
            Self::Check => ActionKind::Check,
            Self::Call => ActionKind::Call,
            Self::Raise(_) => ActionKind::Raise,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Fold => write!(f, "folds"),
            Self::Check => write!(f, "checks"),
            Self::Call => write!(f, "calls"),
            Self::Raise(amount) => write!(f, "raises to {amount}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fold,
    Check,
    Call,
    Raise,
}

impl FromStr for ActionKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(Self::Fold),
            "check" => Ok(Self::Check),
            "call" => Ok(Self::Call),
            "raise" => Ok(Self::Raise),
            other => Err(GameError::InvalidAction(format!("unknown action '{other}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlayerStatus {
    /// In the hand with chips behind; the only status that gets a turn.
    Active,
    Folded,
    AllIn,
    /// No chips at the start of the hand. Still seated, never dealt in.
    Out,
    /// Joined while a hand was running; dealt in on the next hand.
    Waiting,
}

impl PlayerStatus {
    /// Whether a player with this status can still win the pot.
    #[must_use]
    pub fn is_contender(self) -> bool {
        matches!(self, Self::Active | Self::AllIn)
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Active => "active",
            Self::Folded => "folded",
            Self::AllIn => "all-in",
            Self::Out => "out",
            Self::Waiting => "waiting",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub username: String,
    pub token: Token,
    pub stack: Chips,
    pub hand: Vec<Card>,
    /// Chips put in during the current betting round only.
    pub current_bet: Chips,
    pub status: PlayerStatus,
    pub has_acted: bool,
    pub is_winner: bool,
    pub evaluated_hand: Option<EvaluatedHand>,
}

impl Player {
    #[must_use]
    pub fn new(token: impl Into<Token>, username: impl Into<String>, stack: Chips) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
            stack,
            hand: Vec::with_capacity(2),
            current_bet: 0,
            status: PlayerStatus::Active,
            has_acted: false,
            is_winner: false,
            evaluated_hand: None,
        }
    }

    pub fn reset_for_new_hand(&mut self) {
        self.hand.clear();
        self.current_bet = 0;
        self.has_acted = false;
        self.is_winner = false;
        self.evaluated_hand = None;
        self.status = if self.stack > 0 {
            PlayerStatus::Active
        } else {
            PlayerStatus::Out
        };
    }

    /// Move up to `amount` chips from the stack into the current bet and
    /// return how much actually moved. Emptying the stack puts the player
    /// all-in.
    pub(crate) fn commit(&mut self, amount: Chips) -> Chips {
        let paid = amount.min(self.stack);
        self.stack -= paid;
        self.current_bet += paid;
        if self.stack == 0 {
            self.status = PlayerStatus::AllIn;
        }
        paid
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandRank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl HandRank {
    /// Numeric category, 0 for high card through 8 for a straight flush.
    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::HighCard => "High Card",
            Self::OnePair => "One Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
        }
    }
}

impl fmt::Display for HandRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub const UNCONTESTED: &str = "Uncontested";

/// The best five-card hand a player holds. Hands compare by rank first and
/// then by `values`, which lists card values most significant first.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EvaluatedHand {
    pub rank: HandRank,
    pub name: String,
    pub values: Vec<Value>,
}

impl EvaluatedHand {
    #[must_use]
    pub fn new(rank: HandRank, values: Vec<Value>) -> Self {
        Self {
            rank,
            name: rank.name().to_string(),
            values,
        }
    }

    /// Marker for a pot won because everyone else folded.
    #[must_use]
    pub fn uncontested() -> Self {
        Self {
            rank: HandRank::HighCard,
            name: UNCONTESTED.to_string(),
            values: Vec::new(),
        }
    }
}

impl PartialEq for EvaluatedHand {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EvaluatedHand {}

impl PartialOrd for EvaluatedHand {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EvaluatedHand {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.values.cmp(&other.values))
    }
}

impl fmt::Display for EvaluatedHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
