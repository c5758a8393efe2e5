//! Errors raised by the table state machine.

use thiserror::Error;

use super::entities::Chips;

/// Every variant is recoverable at the call boundary: the call that raised it
/// left the table exactly as it was. `EmptyDeck` and `Internal` indicate a
/// bookkeeping bug rather than bad input.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GameError {
    #[error("token or username already seated at this table")]
    SeatTaken,
    #[error("table is full")]
    TableFull,
    #[error("that many chips would overflow the table's chip count")]
    TooManyChips,
    #[error("need 2+ players with chips")]
    NotEnoughPlayers,
    #[error("game already started")]
    AlreadyStarted,
    #[error("current hand is not finished")]
    HandInProgress,
    #[error("not your turn")]
    NotYourTurn,
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("raise must be at least {min}")]
    RaiseTooSmall { min: Chips },
    #[error("need {needed} chips, have {available}")]
    InsufficientFunds { needed: Chips, available: Chips },
    #[error("player is not seated at this table")]
    PlayerNotSeated,
    #[error("deck is empty")]
    EmptyDeck,
    #[error("invalid game state: {0}")]
    Internal(&'static str),
}

impl GameError {
    /// Whether the error points at an engine bug instead of a bad request.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::EmptyDeck | Self::Internal(_))
    }
}
