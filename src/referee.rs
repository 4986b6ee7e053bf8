#![cfg(feature = "std")]

//! Authoritative endpoint for a single match. It owns the real move lists
//! and clocks and pushes a full [`Snapshot`] to both players after every
//! accepted move. Used by the simulation binary and the integration tests.

use std::string::String;
use std::vec::Vec;

use log::{debug, info, warn};
use tokio::time::{sleep_until, Duration, Instant};

use crate::{
    choice_set::{available_choices, has_winning_triple},
    common::{Choice, SessionError},
    config::DEFAULT_TURN_TIME,
    domain::Snapshot,
    game::GameStatus,
    protocol::Message,
    transport::Transport,
};

#[derive(Debug, Clone, Copy)]
pub struct RefereeConfig {
    /// Clock each side starts with.
    pub turn_time: Duration,
}

impl Default for RefereeConfig {
    fn default() -> Self {
        Self {
            turn_time: DEFAULT_TURN_TIME,
        }
    }
}

/// Final result of a match, by side index (0 moves first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Winner(usize),
    Draw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Standing {
    Ongoing,
    Over(Verdict),
}

enum Wake {
    Frame(usize, anyhow::Result<Message>),
    Timeout(usize),
}

pub struct Referee {
    choices: [Vec<Choice>; 2],
    time_left: [Duration; 2],
    turn: usize,
    standing: Standing,
    match_id: Option<String>,
}

impl Referee {
    pub fn new(config: RefereeConfig) -> Self {
        Self {
            choices: [Vec::new(), Vec::new()],
            time_left: [config.turn_time; 2],
            turn: 0,
            standing: Standing::Ongoing,
            match_id: None,
        }
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn choices(&self, side: usize) -> &[Choice] {
        &self.choices[side]
    }

    pub fn time_left(&self, side: usize) -> Duration {
        self.time_left[side]
    }

    pub fn verdict(&self) -> Option<Verdict> {
        match self.standing {
            Standing::Ongoing => None,
            Standing::Over(v) => Some(v),
        }
    }

    pub fn is_over(&self) -> bool {
        self.standing != Standing::Ongoing
    }

    /// Apply `side`'s pick after `elapsed` of thinking time.
    pub fn play(&mut self, side: usize, choice: Choice, elapsed: Duration) -> Result<(), SessionError> {
        if self.is_over() {
            return Err(SessionError::MatchOver);
        }
        if side != self.turn {
            return Err(SessionError::NotYourTurn);
        }
        if !available_choices(&self.choices[0], &self.choices[1]).contains(choice) {
            return Err(SessionError::ChoiceTaken(choice));
        }
        if elapsed >= self.time_left[side] {
            self.expire(side);
            return Ok(());
        }
        self.time_left[side] -= elapsed;
        self.choices[side].push(choice);

        if has_winning_triple(&self.choices[side]) {
            self.standing = Standing::Over(Verdict::Winner(side));
        } else if available_choices(&self.choices[0], &self.choices[1]).is_empty() {
            self.standing = Standing::Over(Verdict::Draw);
        } else {
            self.turn = 1 - side;
        }
        Ok(())
    }

    /// `side` ran out of time.
    pub fn expire(&mut self, side: usize) {
        if self.is_over() {
            return;
        }
        self.time_left[side] = Duration::ZERO;
        self.standing = Standing::Over(Verdict::Winner(1 - side));
    }

    /// `side` left the match.
    pub fn forfeit(&mut self, side: usize) {
        if !self.is_over() {
            self.standing = Standing::Over(Verdict::Winner(1 - side));
        }
    }

    /// Match state as seen by `side`.
    pub fn snapshot_for(&self, side: usize) -> Snapshot {
        let other = 1 - side;
        let game_status = match self.standing {
            Standing::Ongoing => GameStatus::Ongoing,
            Standing::Over(Verdict::Winner(w)) if w == side => GameStatus::Victory,
            Standing::Over(Verdict::Winner(_)) => GameStatus::Defeat,
            Standing::Over(Verdict::Draw) => GameStatus::Draw,
        };
        Snapshot {
            game_status,
            turn: !self.is_over() && self.turn == side,
            player_choices: self.choices[side].iter().map(|c| c.get()).collect(),
            oponent_choices: self.choices[other].iter().map(|c| c.get()).collect(),
            player_time_left: self.time_left[side].as_millis() as u64,
            oponent_time_left: self.time_left[other].as_millis() as u64,
        }
    }

    /// Wait for `Hello` and `Ready` on a fresh channel.
    async fn greet(&mut self, side: usize, channel: &mut dyn Transport) -> anyhow::Result<()> {
        let match_id = match channel.recv().await? {
            Message::Hello { match_id, .. } => match_id,
            other => {
                return Err(anyhow::anyhow!(
                    "Expected Hello from side {}, got {:?}",
                    side,
                    other
                ))
            }
        };
        match &self.match_id {
            Some(expected) if *expected != match_id => {
                return Err(anyhow::anyhow!(
                    "Side {} joined match {} instead of {}",
                    side,
                    match_id,
                    expected
                ));
            }
            Some(_) => {}
            None => self.match_id = Some(match_id),
        }
        loop {
            match channel.recv().await? {
                Message::Ready => return Ok(()),
                other => debug!("side {} sent {:?} before Ready", side, other),
            }
        }
    }

    async fn send_state(&self, side: usize, channel: &mut dyn Transport) {
        let sent = match Message::game_state(&self.snapshot_for(side)) {
            Ok(msg) => channel.send(msg).await,
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            warn!("could not update side {}: {:#}", side, e);
        }
    }

    /// Run the match over two channels; side 0 moves first. Both channels
    /// are closed when the match ends.
    pub async fn serve(&mut self, mut sides: [Box<dyn Transport>; 2]) -> anyhow::Result<Verdict> {
        for (side, channel) in sides.iter_mut().enumerate() {
            self.greet(side, channel.as_mut()).await?;
        }
        info!(
            "match {} started",
            self.match_id.as_deref().unwrap_or_default()
        );
        for (side, channel) in sides.iter_mut().enumerate() {
            self.send_state(side, channel.as_mut()).await;
        }

        let mut turn_started = Instant::now();
        while !self.is_over() {
            let side = self.turn;
            let deadline = turn_started + self.time_left[side];
            let wake = {
                let [first, second] = &mut sides;
                tokio::select! {
                    frame = first.recv() => Wake::Frame(0, frame),
                    frame = second.recv() => Wake::Frame(1, frame),
                    _ = sleep_until(deadline) => Wake::Timeout(side),
                }
            };

            match wake {
                Wake::Timeout(side) => {
                    info!("side {} ran out of time", side);
                    self.expire(side);
                }
                Wake::Frame(from, Err(e)) => {
                    info!("side {} left: {:#}", from, e);
                    self.forfeit(from);
                }
                Wake::Frame(from, Ok(Message::Choice { choice })) => {
                    let result = Choice::new(choice)
                        .and_then(|c| self.play(from, c, turn_started.elapsed()));
                    match result {
                        Ok(()) => {
                            turn_started = Instant::now();
                            debug!("side {} picked {}", from, choice);
                            for (side, channel) in sides.iter_mut().enumerate() {
                                self.send_state(side, channel.as_mut()).await;
                            }
                        }
                        Err(e) => {
                            warn!("side {} picked {}: {}", from, choice, e);
                            self.send_state(from, sides[from].as_mut()).await;
                        }
                    }
                }
                Wake::Frame(from, Ok(Message::Ready)) => {
                    self.send_state(from, sides[from].as_mut()).await;
                }
                Wake::Frame(from, Ok(other)) => debug!("side {} sent {:?}", from, other),
            }
        }

        for (side, channel) in sides.iter_mut().enumerate() {
            self.send_state(side, channel.as_mut()).await;
            if let Err(e) = channel.close().await {
                debug!("closing side {}: {:#}", side, e);
            }
        }
        let verdict = self.verdict().unwrap_or(Verdict::Draw);
        info!("match over: {:?}", verdict);
        Ok(verdict)
    }
}
