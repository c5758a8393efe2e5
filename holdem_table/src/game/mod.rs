//! Hold'em engine: cards, hand evaluation and the table state machine.
//!
//! Everything in here is synchronous and in-memory. Serializing access to a
//! [`Table`] is the caller's job; see [`crate::table`].

pub mod constants;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod pot;
pub mod state_machine;
pub mod views;

pub use errors::GameError;
pub use state_machine::{GameSettings, Round, Table};
pub use views::{PlayerView, PrivateHand, TableSummary, TableView};
