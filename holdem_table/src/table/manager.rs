//! Table manager for spawning and managing multiple table actors.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{RwLock, mpsc};

use super::{
    actor::{TableActor, TableHandle},
    config::TableConfig,
    errors::TableError,
    messages::{TableEvent, TableMessage},
};
use crate::game::{
    PrivateHand, Round, Table, TableSummary, TableView,
    entities::{Action, Chips, GameId, Player, Token},
};

/// Everything needed to open a table. The creator is seated straight away.
#[derive(Debug, Clone)]
pub struct CreateTable {
    pub game_id: GameId,
    pub creator_token: Token,
    pub creator_username: String,
    pub config: TableConfig,
}

/// Table manager for managing multiple table instances
///
/// The registry lock is only held to look up, insert or remove a handle.
/// Everything that touches a table goes through that table's actor.
#[derive(Clone, Default)]
pub struct TableManager {
    /// Active table handles
    tables: Arc<RwLock<HashMap<GameId, TableHandle>>>,

    /// Lobby rows, refreshed after changes that affect them
    summaries: Arc<RwLock<HashMap<GameId, TableSummary>>>,
}

impl TableManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and spawn a new table
    ///
    /// # Errors
    ///
    /// * `InvalidConfig` - the config failed validation
    /// * `TableExists` - `game_id` is already registered
    pub async fn create_table(&self, request: CreateTable) -> Result<TableSummary, TableError> {
        let CreateTable {
            game_id,
            creator_token,
            creator_username,
            config,
        } = request;
        config.validate()?;

        let mut table = Table::new(
            game_id.clone(),
            creator_username.clone(),
            config.password.clone(),
            config.settings(),
        );
        if let Some(seed) = config.seed {
            table = table.with_seed(seed);
        }
        table.add_player(creator_token, creator_username, config.starting_stack)?;
        let summary = table.summary();

        let mut tables = self.tables.write().await;
        if tables.contains_key(&game_id) {
            return Err(TableError::TableExists);
        }
        let (actor, handle) = TableActor::new(table, config);
        tables.insert(game_id.clone(), handle);
        drop(tables);

        let mut summaries = self.summaries.write().await;
        summaries.insert(game_id.clone(), summary.clone());
        drop(summaries);

        tokio::spawn(actor.run());
        log::info!("Created and spawned table {}", game_id);

        Ok(summary)
    }

    /// Get a table handle
    pub async fn get_table(&self, game_id: &str) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(game_id).cloned()
    }

    async fn handle(&self, game_id: &str) -> Result<TableHandle, TableError> {
        self.get_table(game_id)
            .await
            .ok_or(TableError::TableNotFound)
    }

    /// Join a table
    ///
    /// # Errors
    ///
    /// * `TableNotFound`, `WrongPassword`
    /// * `Game(SeatTaken)`, `Game(TableFull)`
    pub async fn join_table(
        &self,
        game_id: &str,
        token: &str,
        username: &str,
        password: Option<&str>,
        stack: Option<Chips>,
    ) -> Result<TableSummary, TableError> {
        let handle = self.handle(game_id).await?;
        let summary = handle
            .request(|response| TableMessage::Join {
                token: token.to_string(),
                username: username.to_string(),
                password: password.map(str::to_string),
                stack,
                response,
            })
            .await??;
        self.cache_summary(summary.clone()).await;
        Ok(summary)
    }

    /// Leave a table and get the player back, stack included. The last player
    /// out closes the table.
    pub async fn leave_table(&self, game_id: &str, token: &str) -> Result<Player, TableError> {
        let handle = self.handle(game_id).await?;
        let outcome = handle
            .request(|response| TableMessage::Leave {
                token: token.to_string(),
                response,
            })
            .await??;

        if outcome.remaining == 0 {
            self.forget(game_id).await;
            log::info!("Table {} removed from registry", game_id);
        } else {
            self.refresh_summary(&handle).await;
        }
        Ok(outcome.player)
    }

    pub async fn take_action(
        &self,
        game_id: &str,
        token: &str,
        action: Action,
    ) -> Result<TableView, TableError> {
        let handle = self.handle(game_id).await?;
        let view = handle
            .request(|response| TableMessage::TakeAction {
                token: token.to_string(),
                action,
                response,
            })
            .await??;
        if view.round == Round::Showdown {
            self.refresh_summary(&handle).await;
        }
        Ok(view)
    }

    /// Deal the first hand. Creator only.
    pub async fn start_game(&self, game_id: &str, requester: &str) -> Result<TableView, TableError> {
        let handle = self.handle(game_id).await?;
        let view = handle
            .request(|response| TableMessage::StartGame {
                requester: requester.to_string(),
                response,
            })
            .await??;
        self.refresh_summary(&handle).await;
        Ok(view)
    }

    /// Deal the next hand. Creator only.
    pub async fn start_new_hand(
        &self,
        game_id: &str,
        requester: &str,
    ) -> Result<TableView, TableError> {
        let handle = self.handle(game_id).await?;
        let view = handle
            .request(|response| TableMessage::StartNewHand {
                requester: requester.to_string(),
                response,
            })
            .await??;
        self.refresh_summary(&handle).await;
        Ok(view)
    }

    pub async fn view(&self, game_id: &str, viewer: &str) -> Result<TableView, TableError> {
        let handle = self.handle(game_id).await?;
        handle
            .request(|response| TableMessage::GetView {
                viewer: viewer.to_string(),
                response,
            })
            .await
    }

    pub async fn hole_cards(
        &self,
        game_id: &str,
        viewer: &str,
    ) -> Result<Option<PrivateHand>, TableError> {
        let handle = self.handle(game_id).await?;
        handle
            .request(|response| TableMessage::GetHoleCards {
                viewer: viewer.to_string(),
                response,
            })
            .await
    }

    /// Lobby listing, newest table first. Served from the summary cache, so
    /// it never waits on a busy table.
    pub async fn list_tables(&self) -> Vec<TableSummary> {
        let summaries = self.summaries.read().await;
        let mut list: Vec<TableSummary> = summaries.values().cloned().collect();
        drop(summaries);
        list.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.game_id.cmp(&b.game_id))
        });
        list
    }

    /// Get active table count
    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.len()
    }

    /// Receive a [`TableEvent`] after every committed change at the table.
    pub async fn subscribe(
        &self,
        game_id: &str,
        token: &str,
        sender: mpsc::Sender<TableEvent>,
    ) -> Result<(), TableError> {
        let handle = self.handle(game_id).await?;
        handle
            .send(TableMessage::Subscribe {
                token: token.to_string(),
                sender,
            })
            .await
    }

    pub async fn unsubscribe(&self, game_id: &str, token: &str) -> Result<(), TableError> {
        let handle = self.handle(game_id).await?;
        handle
            .send(TableMessage::Unsubscribe {
                token: token.to_string(),
            })
            .await
    }

    /// Close a table
    pub async fn close_table(&self, game_id: &str) -> Result<(), TableError> {
        let handle = self.handle(game_id).await?;
        let closed = handle
            .request(|response| TableMessage::Close { response })
            .await;
        self.forget(game_id).await;

        match closed {
            // Already stopped on its own; forgetting it is all that's left.
            Ok(()) | Err(TableError::TableClosed) => {
                log::info!("Closed table {}", game_id);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn forget(&self, game_id: &str) {
        let mut tables = self.tables.write().await;
        tables.remove(game_id);
        drop(tables);

        let mut summaries = self.summaries.write().await;
        summaries.remove(game_id);
    }

    async fn refresh_summary(&self, handle: &TableHandle) {
        match handle
            .request(|response| TableMessage::GetSummary { response })
            .await
        {
            Ok(summary) => self.cache_summary(summary).await,
            Err(e) => log::debug!(
                "Could not refresh summary of table {}: {}",
                handle.game_id(),
                e
            ),
        }
    }

    async fn cache_summary(&self, summary: TableSummary) {
        let mut summaries = self.summaries.write().await;
        // A table forgotten in the meantime stays forgotten.
        if let Some(entry) = summaries.get_mut(&summary.game_id) {
            *entry = summary;
        }
    }
}
