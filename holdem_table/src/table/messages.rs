//! Table actor message types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use super::errors::TableError;
use crate::game::{
    PrivateHand, TableSummary, TableView,
    entities::{Action, Chips, GameId, Player, Token},
};

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Sit down. `stack` falls back to the table's starting stack.
    Join {
        token: Token,
        username: String,
        password: Option<String>,
        stack: Option<Chips>,
        response: oneshot::Sender<Result<TableSummary, TableError>>,
    },

    Leave {
        token: Token,
        response: oneshot::Sender<Result<LeaveOutcome, TableError>>,
    },

    /// Player action on their turn
    TakeAction {
        token: Token,
        action: Action,
        response: oneshot::Sender<Result<TableView, TableError>>,
    },

    /// Deal the first hand (creator only)
    StartGame {
        requester: Token,
        response: oneshot::Sender<Result<TableView, TableError>>,
    },

    /// Deal the next hand after a showdown (creator only)
    StartNewHand {
        requester: Token,
        response: oneshot::Sender<Result<TableView, TableError>>,
    },

    GetView {
        viewer: Token,
        response: oneshot::Sender<TableView>,
    },

    GetHoleCards {
        viewer: Token,
        response: oneshot::Sender<Option<PrivateHand>>,
    },

    GetSummary {
        response: oneshot::Sender<TableSummary>,
    },

    /// Subscribe to state change notifications
    Subscribe {
        token: Token,
        sender: mpsc::Sender<TableEvent>,
    },

    /// Unsubscribe from state change notifications
    Unsubscribe { token: Token },

    Close { response: oneshot::Sender<()> },
}

/// Result of a successful leave.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    /// The player as they left, stack included.
    pub player: Player,
    /// Seats still taken after the leave.
    pub remaining: usize,
}

/// Notification sent after a table commits a change. Carries no state: the
/// receiver fetches whatever view it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TableEvent {
    /// Action taken, street dealt, hand started
    StateChanged { game_id: GameId },
    /// Player joined or left
    PlayerListChanged { game_id: GameId },
    /// A hand reached showdown
    HandFinished {
        game_id: GameId,
        hand_number: u64,
        winners: Vec<String>,
    },
}

impl TableEvent {
    #[must_use]
    pub fn game_id(&self) -> &str {
        match self {
            Self::StateChanged { game_id }
            | Self::PlayerListChanged { game_id }
            | Self::HandFinished { game_id, .. } => game_id,
        }
    }
}
