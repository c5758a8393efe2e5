//! # Holdem Table
//!
//! A server-authoritative Texas Hold'em table engine.
//!
//! The engine keeps the full state of each table, validates player actions
//! against the betting rules, advances rounds, deals the board and settles the
//! pot by evaluating the best five-card hand out of seven.
//!
//! ## Core Modules
//!
//! - [`game`]: cards, the hand evaluator, player state and the synchronous
//!   table state machine with its per-viewer projections
//! - [`table`]: one tokio actor per table plus the registry that creates,
//!   finds and retires them
//!
//! Transport, authentication and broadcasting are left to the caller: the
//! registry returns views and emits [`table::TableEvent`]s, and the caller
//! decides who gets told what.
//!
//! ## Example
//!
//! ```
//! use holdem_table::{Action, GameSettings, Round, Table};
//!
//! let mut table = Table::new("demo", "alice", None, GameSettings::default());
//! table.add_player("alice", "alice", 1000).unwrap();
//! table.add_player("bob", "bob", 1000).unwrap();
//! table.start_game().unwrap();
//!
//! // Heads-up: the dealer posts the big blind and the other seat acts first.
//! table.handle_player_action("bob", Action::Fold).unwrap();
//! assert_eq!(table.round(), Round::Showdown);
//! assert_eq!(table.player("alice").unwrap().stack, 1010);
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    GameError, GameSettings, PrivateHand, Round, Table, TableSummary, TableView,
    constants,
    entities::{self, Action, Card, Chips, EvaluatedHand, HandRank, PlayerStatus},
    functional,
};

/// Per-table actors and the table registry.
pub mod table;
pub use table::{CreateTable, TableConfig, TableError, TableEvent, TableManager};
