//! Wire-facing game types shared by the session and the referee.

use alloc::vec::Vec;

use crate::game::GameStatus;

/// Full authoritative state pushed by the referee, seen from the receiving
/// player's side. Times are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "camelCase"))]
pub struct Snapshot {
    pub game_status: GameStatus,
    /// Whether the receiving player holds the turn.
    pub turn: bool,
    pub player_choices: Vec<u8>,
    pub oponent_choices: Vec<u8>,
    pub player_time_left: u64,
    pub oponent_time_left: u64,
}
