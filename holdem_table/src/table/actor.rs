//! Table actor: one tokio task per table, processing messages in order.

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};

use super::{
    config::TableConfig,
    errors::TableError,
    messages::{LeaveOutcome, TableEvent, TableMessage},
};
use crate::game::{
    GameError, Round, Table, TableSummary, TableView,
    entities::{Action, Chips, GameId, Token},
};

const INBOX_CAPACITY: usize = 100;

/// Table actor handle for sending messages
#[derive(Clone, Debug)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    game_id: GameId,
}

impl TableHandle {
    pub fn new(sender: mpsc::Sender<TableMessage>, game_id: GameId) -> Self {
        Self { sender, game_id }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    /// Whether the actor behind this handle has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), TableError> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::TableClosed)
    }

    /// Send a message built around a fresh reply channel and wait for the
    /// reply.
    pub async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> Result<T, TableError> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| TableError::TableClosed)
    }
}

/// Table actor owning a single [`Table`]
pub struct TableActor {
    table: Table,

    config: TableConfig,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Subscribers for state change notifications
    subscribers: HashMap<Token, mpsc::Sender<TableEvent>>,

    /// Last hand a `HandFinished` went out for
    reported_hand: u64,

    is_closed: bool,
}

impl TableActor {
    /// Create a new table actor and the handle that talks to it.
    pub fn new(table: Table, config: TableConfig) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(INBOX_CAPACITY);
        let handle = TableHandle::new(sender, table.game_id().to_string());
        let actor = Self {
            table,
            config,
            inbox,
            subscribers: HashMap::new(),
            reported_hand: 0,
            is_closed: false,
        };
        (actor, handle)
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!(
            "Table {} starting ({} blinds, {} seats)",
            self.table.game_id(),
            self.table.settings().blinds,
            self.table.settings().max_players
        );

        while let Some(message) = self.inbox.recv().await {
            self.handle_message(message);
            if self.is_closed {
                break;
            }
        }

        log::info!("Table {} closed", self.table.game_id());
    }

    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::Join {
                token,
                username,
                password,
                stack,
                response,
            } => {
                let result = self.handle_join(token, username, password.as_deref(), stack);
                let _ = response.send(result);
            }

            TableMessage::Leave { token, response } => {
                let result = self.handle_leave(&token);
                let _ = response.send(result);
            }

            TableMessage::TakeAction {
                token,
                action,
                response,
            } => {
                let result = self.handle_action(&token, action);
                let _ = response.send(result);
            }

            TableMessage::StartGame {
                requester,
                response,
            } => {
                let result = self.handle_start(&requester, Table::start_game);
                let _ = response.send(result);
            }

            TableMessage::StartNewHand {
                requester,
                response,
            } => {
                let result = self.handle_start(&requester, Table::start_new_hand);
                let _ = response.send(result);
            }

            TableMessage::GetView { viewer, response } => {
                let _ = response.send(self.table.public_state(&viewer));
            }

            TableMessage::GetHoleCards { viewer, response } => {
                let _ = response.send(self.table.hole_cards(&viewer));
            }

            TableMessage::GetSummary { response } => {
                let _ = response.send(self.table.summary());
            }

            TableMessage::Subscribe { token, sender } => {
                log::debug!(
                    "{} subscribed to table {} state changes",
                    token,
                    self.table.game_id()
                );
                self.subscribers.insert(token, sender);
            }

            TableMessage::Unsubscribe { token } => {
                self.subscribers.remove(&token);
                log::debug!(
                    "{} unsubscribed from table {} state changes",
                    token,
                    self.table.game_id()
                );
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    fn handle_join(
        &mut self,
        token: Token,
        username: String,
        password: Option<&str>,
        stack: Option<Chips>,
    ) -> Result<TableSummary, TableError> {
        if !self.table.password_matches(password) {
            log::debug!(
                "{} gave the wrong password for table {}",
                username,
                self.table.game_id()
            );
            return Err(TableError::WrongPassword);
        }

        let stack = stack.unwrap_or(self.config.starting_stack);
        self.table.add_player(token, username.clone(), stack)?;
        log::info!(
            "{} joined table {} with {} chips",
            username,
            self.table.game_id(),
            stack
        );

        self.notify(TableEvent::PlayerListChanged {
            game_id: self.table.game_id().to_string(),
        });
        Ok(self.table.summary())
    }

    fn handle_leave(&mut self, token: &str) -> Result<LeaveOutcome, TableError> {
        let player = self.table.remove_player(token)?;
        self.subscribers.remove(token);
        log::info!(
            "{} left table {} with {} chips",
            player.username,
            self.table.game_id(),
            player.stack
        );

        self.notify(TableEvent::PlayerListChanged {
            game_id: self.table.game_id().to_string(),
        });
        self.report_finished_hand();

        let remaining = self.table.num_players();
        if remaining == 0 {
            log::info!("Table {} is empty, closing", self.table.game_id());
            self.is_closed = true;
        }
        Ok(LeaveOutcome { player, remaining })
    }

    fn handle_action(&mut self, token: &str, action: Action) -> Result<TableView, TableError> {
        self.table.handle_player_action(token, action)?;
        self.notify(TableEvent::StateChanged {
            game_id: self.table.game_id().to_string(),
        });
        self.report_finished_hand();
        Ok(self.table.public_state(token))
    }

    fn handle_start(
        &mut self,
        requester: &str,
        start: fn(&mut Table) -> Result<(), GameError>,
    ) -> Result<TableView, TableError> {
        self.ensure_creator(requester)?;
        start(&mut self.table)?;
        self.notify(TableEvent::StateChanged {
            game_id: self.table.game_id().to_string(),
        });
        self.report_finished_hand();
        Ok(self.table.public_state(requester))
    }

    fn ensure_creator(&self, requester: &str) -> Result<(), TableError> {
        match self.table.player(requester) {
            Some(player) if player.username == self.table.creator() => Ok(()),
            Some(_) => Err(TableError::NotCreator),
            None => Err(GameError::PlayerNotSeated.into()),
        }
    }

    /// Emit `HandFinished` once per hand that reached showdown.
    fn report_finished_hand(&mut self) {
        if self.table.round() != Round::Showdown
            || self.table.hand_number() == self.reported_hand
        {
            return;
        }
        self.reported_hand = self.table.hand_number();
        let winners = self
            .table
            .players()
            .iter()
            .filter(|player| player.is_winner)
            .map(|player| player.username.clone())
            .collect();
        self.notify(TableEvent::HandFinished {
            game_id: self.table.game_id().to_string(),
            hand_number: self.reported_hand,
            winners,
        });
    }

    /// Broadcast state change notification to all subscribers
    fn notify(&mut self, event: TableEvent) {
        self.subscribers
            .retain(|token, sender| match sender.try_send(event.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!("Subscriber {} channel full, dropping notification", token);
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!("Subscriber {} disconnected, removing", token);
                    false
                }
            });
    }
}
