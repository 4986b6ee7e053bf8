#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod choice_set;
mod common;
mod config;
pub mod domain;
mod game;
mod player;
mod player_ai;
mod timer;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
mod player_cli;
#[cfg(feature = "std")]
pub mod player_node;
#[cfg(feature = "std")]
pub mod protocol;
#[cfg(feature = "std")]
pub mod records;
#[cfg(feature = "std")]
pub mod referee;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;
pub mod prelude;

pub use choice_set::*;
pub use common::*;
pub use config::*;
pub use domain::Snapshot;
pub use game::*;
pub use player::*;
pub use player_ai::*;
pub use timer::*;
#[cfg(feature = "std")]
pub use logging::init_logging;
#[cfg(feature = "std")]
pub use player_cli::*;
#[cfg(feature = "std")]
pub use player_node::*;
#[cfg(feature = "std")]
pub use protocol::Message;
#[cfg(feature = "std")]
pub use referee::{Referee, RefereeConfig, Verdict};
#[cfg(feature = "std")]
pub use session::*;
#[cfg(feature = "std")]
pub use transport::{in_memory::InMemoryTransport, tcp::TcpTransport, Connector, Transport};
