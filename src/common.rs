//! Common types for the fifteen game: picked values, winning triples and
//! session errors.

use crate::config::{CHOICE_MAX, CHOICE_MIN, TRIPLE_LEN};

/// A single picked value in `CHOICE_MIN..=CHOICE_MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(try_from = "u8", into = "u8"))]
pub struct Choice(u8);

impl Choice {
    /// Build a choice, rejecting values outside the playable range.
    pub const fn new(value: u8) -> Result<Self, SessionError> {
        if value < CHOICE_MIN || value > CHOICE_MAX {
            Err(SessionError::ChoiceOutOfRange(value))
        } else {
            Ok(Choice(value))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Choice {
    type Error = SessionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Choice::new(value)
    }
}

impl From<Choice> for u8 {
    fn from(choice: Choice) -> Self {
        choice.0
    }
}

impl core::fmt::Display for Choice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Winning line: each slot holds a choice, or `None` while unresolved.
pub type Triple = [Option<Choice>; TRIPLE_LEN];

pub const EMPTY_TRIPLE: Triple = [None; TRIPLE_LEN];

/// Errors returned by session state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Value lies outside the playable range.
    ChoiceOutOfRange(u8),
    /// Value was already picked by one of the sides.
    ChoiceTaken(Choice),
    /// The opponent holds the turn.
    NotYourTurn,
    /// No match is bound, or the channel was lost.
    NotConnected,
    /// The match already reached a final status.
    MatchOver,
    /// Snapshot failed validation and was discarded.
    InvalidSnapshot(&'static str),
}

impl core::fmt::Display for SessionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SessionError::ChoiceOutOfRange(v) => {
                write!(f, "Choice {} is outside {}..={}", v, CHOICE_MIN, CHOICE_MAX)
            }
            SessionError::ChoiceTaken(c) => write!(f, "Choice {} was already picked", c),
            SessionError::NotYourTurn => write!(f, "It is the opponent's turn"),
            SessionError::NotConnected => write!(f, "Not connected to a match"),
            SessionError::MatchOver => write!(f, "The match is already over"),
            SessionError::InvalidSnapshot(reason) => write!(f, "Invalid snapshot: {}", reason),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SessionError {}
