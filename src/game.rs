use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

use crate::{
    choice_set::{available_choices, sequences_equal, winning_triple, ChoiceSet},
    common::{Choice, SessionError, Triple, EMPTY_TRIPLE},
    domain::Snapshot,
    timer::Timer,
};

/// Status of a match as last reported by the referee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum GameStatus {
    #[default]
    Undefined,
    Ongoing,
    Victory,
    Defeat,
    Draw,
    Disconnected,
}

impl GameStatus {
    /// Victory, defeat or draw.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Victory | GameStatus::Defeat | GameStatus::Draw)
    }
}

/// Which side may pick next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "std", serde(rename_all = "lowercase"))]
pub enum Turn {
    Local,
    Remote,
    #[default]
    None,
}

/// What an applied snapshot actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotOutcome {
    pub local_replaced: bool,
    pub remote_replaced: bool,
    pub status_changed: bool,
    pub turn_changed: bool,
}

impl SnapshotOutcome {
    /// True when only the timers were resynchronised.
    pub fn is_unchanged(&self) -> bool {
        !(self.local_replaced || self.remote_replaced || self.status_changed || self.turn_changed)
    }
}

/// Owned read model handed to observers of a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "std", derive(serde::Serialize))]
pub struct SessionView {
    pub local_choices: Vec<Choice>,
    pub remote_choices: Vec<Choice>,
    pub available: Vec<Choice>,
    pub local_time_left: Duration,
    pub remote_time_left: Duration,
    pub local_timer_running: bool,
    pub remote_timer_running: bool,
    pub status: GameStatus,
    pub turn: Turn,
    pub triple: Triple,
    pub match_id: Option<String>,
    pub credential: Option<String>,
}

/// Local copy of a match: both move sequences, both clocks and the
/// referee-reported status. Pure state, no I/O.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchState {
    local_choices: Vec<Choice>,
    remote_choices: Vec<Choice>,
    local_timer: Timer,
    remote_timer: Timer,
    turn: Turn,
    status: GameStatus,
    triple: Triple,
    match_id: Option<String>,
    credential: Option<String>,
}

impl MatchState {
    /// Empty state, not bound to any match.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop whatever was there and bind to a new match.
    pub fn begin(&mut self, match_id: String, credential: String) {
        self.clear();
        self.match_id = Some(match_id);
        self.credential = Some(credential);
    }

    /// Clear the board and zero both clocks. Match binding is kept.
    pub fn reset(&mut self) {
        self.local_choices.clear();
        self.remote_choices.clear();
        self.status = GameStatus::Undefined;
        self.turn = Turn::None;
        self.triple = EMPTY_TRIPLE;
        self.local_timer.reset(Duration::ZERO);
        self.remote_timer.reset(Duration::ZERO);
    }

    /// `reset` plus forgetting the match binding.
    pub fn clear(&mut self) {
        self.reset();
        self.match_id = None;
        self.credential = None;
    }

    pub fn local_choices(&self) -> &[Choice] {
        &self.local_choices
    }

    pub fn remote_choices(&self) -> &[Choice] {
        &self.remote_choices
    }

    pub fn local_timer(&self) -> &Timer {
        &self.local_timer
    }

    pub fn remote_timer(&self) -> &Timer {
        &self.remote_timer
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn triple(&self) -> Triple {
        self.triple
    }

    pub fn match_id(&self) -> Option<&str> {
        self.match_id.as_deref()
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.match_id.is_some()
    }

    pub fn available_choices(&self) -> ChoiceSet {
        available_choices(&self.local_choices, &self.remote_choices)
    }

    /// Check a pick against what we already know, without touching state.
    pub fn validate_choice(&self, choice: Choice) -> Result<(), SessionError> {
        if !self.is_bound() || self.status == GameStatus::Disconnected {
            return Err(SessionError::NotConnected);
        }
        if self.status.is_terminal() {
            return Err(SessionError::MatchOver);
        }
        if self.turn == Turn::Remote {
            return Err(SessionError::NotYourTurn);
        }
        if !self.available_choices().contains(choice) {
            return Err(SessionError::ChoiceTaken(choice));
        }
        Ok(())
    }

    /// Optimistically record our own pick and hand the clock to the opponent.
    pub fn submit_choice(&mut self, choice: Choice) -> Result<(), SessionError> {
        self.validate_choice(choice)?;
        self.local_choices.push(choice);
        self.turn = Turn::Remote;
        self.local_timer.pause();
        self.remote_timer.start();
        Ok(())
    }

    /// Reconcile with an authoritative snapshot. A rejected snapshot leaves
    /// the state untouched.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) -> Result<SnapshotOutcome, SessionError> {
        if !self.is_bound() {
            return Err(SessionError::NotConnected);
        }
        let (local, remote) = validated_sequences(snapshot)?;

        let mut outcome = SnapshotOutcome::default();
        if !sequences_equal(&remote, &self.remote_choices) {
            self.remote_choices = remote;
            outcome.remote_replaced = true;
        }
        if !sequences_equal(&local, &self.local_choices) {
            self.local_choices = local;
            outcome.local_replaced = true;
        }

        outcome.status_changed = self.status != snapshot.game_status;
        self.status = snapshot.game_status;

        let turn = if snapshot.turn {
            self.local_timer.start();
            self.remote_timer.pause();
            Turn::Local
        } else if snapshot.game_status == GameStatus::Ongoing {
            self.local_timer.pause();
            self.remote_timer.start();
            Turn::Remote
        } else {
            self.local_timer.pause();
            self.remote_timer.pause();
            Turn::None
        };
        outcome.turn_changed = self.turn != turn;
        self.turn = turn;

        match snapshot.game_status {
            GameStatus::Victory => self.triple = winning_triple(&self.local_choices),
            GameStatus::Defeat => self.triple = winning_triple(&self.remote_choices),
            _ => {}
        }

        self.local_timer
            .set_remaining(Duration::from_millis(snapshot.player_time_left));
        self.remote_timer
            .set_remaining(Duration::from_millis(snapshot.oponent_time_left));
        Ok(outcome)
    }

    /// The channel went away. Picks stay visible and a final result is kept.
    pub fn mark_disconnected(&mut self) {
        if !self.status.is_terminal() {
            self.status = GameStatus::Disconnected;
        }
        self.turn = Turn::None;
        self.local_timer.pause();
        self.remote_timer.pause();
    }

    /// Advance whichever clock is running.
    pub fn tick(&mut self, elapsed: Duration) {
        self.local_timer.tick(elapsed);
        self.remote_timer.tick(elapsed);
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            local_choices: self.local_choices.clone(),
            remote_choices: self.remote_choices.clone(),
            available: self.available_choices().iter().collect(),
            local_time_left: self.local_timer.remaining(),
            remote_time_left: self.remote_timer.remaining(),
            local_timer_running: self.local_timer.is_running(),
            remote_timer_running: self.remote_timer.is_running(),
            status: self.status,
            turn: self.turn,
            triple: self.triple,
            match_id: self.match_id.clone(),
            credential: self.credential.clone(),
        }
    }
}

/// Range-check both sequences and make sure no value appears twice.
fn validated_sequences(snapshot: &Snapshot) -> Result<(Vec<Choice>, Vec<Choice>), SessionError> {
    let mut seen = ChoiceSet::new();
    let mut convert = |values: &[u8]| -> Result<Vec<Choice>, SessionError> {
        let mut out = Vec::with_capacity(values.len());
        for v in values {
            let choice =
                Choice::new(*v).map_err(|_| SessionError::InvalidSnapshot("choice out of range"))?;
            if !seen.insert(choice) {
                return Err(SessionError::InvalidSnapshot("choice repeated"));
            }
            out.push(choice);
        }
        Ok(out)
    };
    let local = convert(&snapshot.player_choices)?;
    let remote = convert(&snapshot.oponent_choices)?;
    Ok((local, remote))
}
