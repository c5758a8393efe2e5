use super::entities::Chips;

pub const MIN_PLAYERS: usize = 2;
/// Two hole cards each plus five board cards and three burns must fit in one
/// deck: 2 * 22 + 8 = 52.
pub const MAX_PLAYERS: usize = 22;
pub const DEFAULT_MAX_PLAYERS: usize = 9;

pub const DEFAULT_SMALL_BLIND: Chips = 10;
pub const DEFAULT_BIG_BLIND: Chips = 20;
pub const DEFAULT_STARTING_STACK: Chips = 1000;

pub const BOARD_SIZE: usize = 5;
pub const HOLE_CARDS: usize = 2;
