//! Table registry with one actor per table.
//!
//! Each table runs in its own tokio task with an mpsc inbox. Messages carry
//! a oneshot reply channel and are handled strictly in arrival order, so
//! actions on one table never interleave while different tables run in
//! parallel. The [`TableManager`] keeps the only cross-table state: the
//! handle registry and the lobby summary cache.
//!
//! ## Example
//!
//! ```no_run
//! use holdem_table::table::{CreateTable, TableConfig, TableManager};
//! use holdem_table::game::entities::Action;
//!
//! # async fn demo() -> Result<(), holdem_table::table::TableError> {
//! let manager = TableManager::new();
//! manager
//!     .create_table(CreateTable {
//!         game_id: "main".to_string(),
//!         creator_token: "alice-token".to_string(),
//!         creator_username: "alice".to_string(),
//!         config: TableConfig::default(),
//!     })
//!     .await?;
//! manager.join_table("main", "bob-token", "bob", None, None).await?;
//! manager.start_game("main", "alice-token").await?;
//! manager.take_action("main", "bob-token", Action::Call).await?;
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod config;
pub mod errors;
pub mod manager;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::TableConfig;
pub use errors::TableError;
pub use manager::{CreateTable, TableManager};
pub use messages::{LeaveOutcome, TableEvent, TableMessage};
