//! Errors surfaced by the table registry and actors.

use thiserror::Error;

use crate::game::GameError;

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum TableError {
    #[error("table not found")]
    TableNotFound,
    #[error("a table with that id already exists")]
    TableExists,
    #[error("wrong password")]
    WrongPassword,
    #[error("only the table creator can do that")]
    NotCreator,
    #[error("invalid table config: {0}")]
    InvalidConfig(String),
    #[error("table is closed")]
    TableClosed,
    #[error(transparent)]
    Game(#[from] GameError),
}
