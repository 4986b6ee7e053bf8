#![cfg(feature = "std")]

use std::string::String;

use anyhow::Context;

use crate::domain::Snapshot;

/// Frames exchanged between a session and the referee over one channel.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Message {
    /// First frame on every channel: binds it to a match and a player.
    Hello { match_id: String, credential: String },
    /// Player is listening and wants the current state.
    Ready,
    /// Player picked a value.
    Choice { choice: u8 },
    /// Authoritative state, serialized as JSON text.
    GameState(String),
    /// Referee is closing the channel.
    Disconnect,
}

impl Snapshot {
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("malformed game state")
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("failed to encode game state")
    }
}

impl Message {
    pub fn game_state(snapshot: &Snapshot) -> anyhow::Result<Self> {
        Ok(Message::GameState(snapshot.to_json()?))
    }
}
