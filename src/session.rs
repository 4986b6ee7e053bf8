#![cfg(feature = "std")]

//! The session synchronizer: owns the local [`MatchState`] and the live
//! channel, and turns channel traffic and clock ticks into state changes.
//!
//! Everything runs on the caller's task. Each mutator takes `&mut self`, so
//! events are applied one at a time in arrival order.

use std::string::String;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::time::{interval_at, Duration, Instant, Interval, MissedTickBehavior};

use crate::{
    common::{Choice, SessionError},
    config::TICK_INTERVAL,
    domain::Snapshot,
    game::{MatchState, SessionView, SnapshotOutcome},
    protocol::Message,
    transport::{Connector, Transport},
};

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// How often the running clock is counted down locally.
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
        }
    }
}

/// Result of one step of [`Session::next_event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A snapshot was applied.
    Snapshot(SnapshotOutcome),
    /// A game state arrived but failed to parse or validate; state kept.
    Rejected,
    /// A frame with no meaning for the client arrived.
    Ignored,
    /// The local clock advanced.
    Tick,
    /// The channel is gone.
    Disconnected,
}

enum Wake {
    Frame(anyhow::Result<Message>),
    Tick,
}

pub struct Session {
    state: MatchState,
    channel: Option<Box<dyn Transport>>,
    /// Set once a send fails; the channel is still drained for inbound frames.
    send_failed: bool,
    connector: Box<dyn Connector>,
    config: SessionConfig,
    ticker: Option<Interval>,
    last_tick: Option<Instant>,
    view_tx: watch::Sender<SessionView>,
}

impl Session {
    pub fn new(connector: Box<dyn Connector>) -> Self {
        Self::with_config(connector, SessionConfig::default())
    }

    pub fn with_config(connector: Box<dyn Connector>, config: SessionConfig) -> Self {
        let state = MatchState::new();
        let (view_tx, _) = watch::channel(state.view());
        Self {
            state,
            channel: None,
            send_failed: false,
            connector,
            config,
            ticker: None,
            last_tick: None,
            view_tx,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn view(&self) -> SessionView {
        self.state.view()
    }

    /// Receive a fresh [`SessionView`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Connected and the last send went through.
    pub fn can_send(&self) -> bool {
        self.channel.is_some() && !self.send_failed
    }

    /// Bind to `match_id`, replacing any previous match and channel.
    pub async fn connect(
        &mut self,
        match_id: impl Into<String>,
        credential: impl Into<String>,
    ) -> anyhow::Result<()> {
        let match_id = match_id.into();
        let credential = credential.into();

        self.close_channel().await;
        self.state.begin(match_id.clone(), credential.clone());
        self.last_tick = None;

        match self.open_channel(&match_id, &credential).await {
            Ok(channel) => {
                self.channel = Some(channel);
                info!("joined match {}", match_id);
                self.publish();
                Ok(())
            }
            Err(e) => {
                warn!("could not join match {}: {:#}", match_id, e);
                self.state.clear();
                self.publish();
                Err(e)
            }
        }
    }

    async fn open_channel(
        &mut self,
        match_id: &str,
        credential: &str,
    ) -> anyhow::Result<Box<dyn Transport>> {
        let mut channel = self.connector.open().await?;
        channel
            .send(Message::Hello {
                match_id: match_id.to_owned(),
                credential: credential.to_owned(),
            })
            .await?;
        channel.send(Message::Ready).await?;
        Ok(channel)
    }

    /// Pick a value. Applied locally right away and sent without waiting for
    /// an answer; the next snapshot settles it.
    ///
    /// A failed send is not an error. The channel stays open for reading so
    /// frames already queued still arrive; [`Session::next_event`] reports
    /// the loss once the channel runs dry.
    pub async fn submit_choice(&mut self, choice: Choice) -> anyhow::Result<()> {
        if self.send_failed {
            return Err(SessionError::NotConnected.into());
        }
        let Some(channel) = self.channel.as_mut() else {
            return Err(SessionError::NotConnected.into());
        };
        self.state.submit_choice(choice)?;
        self.last_tick = Some(Instant::now());
        let sent = channel
            .send(Message::Choice {
                choice: choice.get(),
            })
            .await;
        match sent {
            Ok(()) => debug!("sent choice {}", choice),
            Err(e) => {
                warn!("failed to send choice {}: {:#}", choice, e);
                self.send_failed = true;
            }
        }
        self.publish();
        Ok(())
    }

    /// Leave the match. Safe to call when already disconnected.
    pub async fn disconnect(&mut self) {
        self.close_channel().await;
        self.state.clear();
        self.last_tick = None;
        self.publish();
        info!("left match");
    }

    /// Wait for the next frame or clock tick and apply it.
    pub async fn next_event(&mut self) -> anyhow::Result<SessionEvent> {
        let period = self.config.tick_interval;
        let ticker = self.ticker.get_or_insert_with(|| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        let wake = match self.channel.as_mut() {
            Some(channel) => tokio::select! {
                biased;
                frame = channel.recv() => Wake::Frame(frame),
                _ = ticker.tick() => Wake::Tick,
            },
            None => {
                ticker.tick().await;
                Wake::Tick
            }
        };

        match wake {
            Wake::Frame(Ok(msg)) => self.handle_message(msg).await,
            Wake::Frame(Err(e)) => {
                warn!("channel lost: {:#}", e);
                self.lose_channel().await;
                Ok(SessionEvent::Disconnected)
            }
            Wake::Tick => {
                self.advance_clock();
                Ok(SessionEvent::Tick)
            }
        }
    }

    /// Dispatch one inbound frame.
    async fn handle_message(&mut self, msg: Message) -> anyhow::Result<SessionEvent> {
        match msg {
            Message::GameState(_) if self.channel.is_none() => {
                debug!("game state without a channel");
                Ok(SessionEvent::Ignored)
            }
            Message::GameState(text) => Ok(self.handle_game_state(&text)),
            Message::Disconnect => {
                info!("referee closed the match");
                self.lose_channel().await;
                Ok(SessionEvent::Disconnected)
            }
            other => {
                debug!("ignoring {:?}", other);
                Ok(SessionEvent::Ignored)
            }
        }
    }

    fn handle_game_state(&mut self, text: &str) -> SessionEvent {
        let snapshot = match Snapshot::from_json(text) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("discarding game state: {:#}", e);
                return SessionEvent::Rejected;
            }
        };
        match self.state.apply_snapshot(&snapshot) {
            Ok(outcome) => {
                self.last_tick = Some(Instant::now());
                if !outcome.is_unchanged() {
                    debug!("state now {:?}, turn {:?}", self.state.status(), self.state.turn());
                }
                self.publish();
                SessionEvent::Snapshot(outcome)
            }
            Err(e) => {
                warn!("discarding game state: {}", e);
                SessionEvent::Rejected
            }
        }
    }

    fn advance_clock(&mut self) {
        let now = Instant::now();
        let elapsed = match self.last_tick.replace(now) {
            Some(prev) => now.saturating_duration_since(prev),
            None => Duration::ZERO,
        };
        if self.state.local_timer().is_running() || self.state.remote_timer().is_running() {
            self.state.tick(elapsed);
            self.publish();
        }
    }

    async fn lose_channel(&mut self) {
        self.close_channel().await;
        self.state.mark_disconnected();
        self.publish();
    }

    async fn close_channel(&mut self) {
        self.send_failed = false;
        if let Some(mut channel) = self.channel.take() {
            if let Err(e) = channel.close().await {
                debug!("error while closing channel: {:#}", e);
            }
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.state.view());
    }
}
