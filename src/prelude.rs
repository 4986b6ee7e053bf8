//! Commonly used types and utilities for ease of import.

pub use crate::{AiPlayer, Choice, ChoiceSet, GameStatus, MatchState, Player, Selection, Turn};

#[cfg(feature = "std")]
pub use crate::{CliPlayer, PlayerNode, Referee, Session, SessionEvent};

#[cfg(feature = "std")]
pub use crate::transport::{
    in_memory::{InMemoryConnector, InMemoryTransport},
    tcp::{TcpConnector, TcpTransport},
    Connector, Transport,
};
