//! Serializable projections of a table handed to the transport layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    entities::{Blinds, Card, Chips, EvaluatedHand, GameId, PlayerStatus, SeatIndex, Token},
    state_machine::Round,
};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerView {
    pub username: String,
    pub token: Token,
    pub stack: Chips,
    pub current_bet: Chips,
    pub status: PlayerStatus,
    pub is_winner: bool,
    /// Only at showdown, and only for players who didn't fold.
    pub hand: Option<Vec<Card>>,
    pub evaluated_hand: Option<EvaluatedHand>,
}

/// What one viewer is allowed to see of a table.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableView {
    pub game_id: GameId,
    pub creator: String,
    pub in_progress: bool,
    pub round: Round,
    /// Includes the live bets of the current betting round.
    pub pot: Chips,
    pub board: Vec<Card>,
    pub min_players: usize,
    pub max_players: usize,
    pub current_player: Option<Token>,
    pub blinds: Blinds,
    pub highest_bet: Chips,
    pub min_raise_to: Chips,
    pub hand_number: u64,
    pub viewer_seat: Option<SeatIndex>,
    pub players: Vec<PlayerView>,
}

impl TableView {
    #[must_use]
    pub fn player(&self, token: &str) -> Option<&PlayerView> {
        self.players.iter().find(|player| player.token == token)
    }

    #[must_use]
    pub fn viewer(&self) -> Option<&PlayerView> {
        self.viewer_seat.and_then(|seat| self.players.get(seat))
    }

    /// Pot plus every stack.
    #[must_use]
    pub fn chips_in_play(&self) -> Chips {
        self.pot + self.players.iter().map(|player| player.stack).sum::<Chips>()
    }

    /// Whether it's `token`'s turn.
    #[must_use]
    pub fn is_turn_of(&self, token: &str) -> bool {
        self.current_player.as_deref() == Some(token)
    }
}

/// A player's own hole cards, delivered separately from the shared view.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PrivateHand {
    pub game_id: GameId,
    pub token: Token,
    pub cards: Vec<Card>,
}

/// Lobby row.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableSummary {
    pub game_id: GameId,
    pub creator: String,
    pub players: usize,
    pub max_players: usize,
    pub blinds: Blinds,
    pub is_private: bool,
    pub in_progress: bool,
    pub round: Round,
    pub hand_number: u64,
    pub created_at: DateTime<Utc>,
}
