#![cfg(feature = "std")]

use log::{info, warn};
use rand::rngs::SmallRng;

use crate::{
    common::{Choice, SessionError},
    game::{GameStatus, Turn},
    player::{Player, Selection},
    session::{Session, SessionEvent},
};

/// Drives a [`Session`] with a [`Player`] until the match is over.
pub struct PlayerNode {
    player: Box<dyn Player>,
    session: Session,
}

impl PlayerNode {
    pub fn new(player: Box<dyn Player>, session: Session) -> Self {
        Self { player, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    fn my_move_due(&self) -> bool {
        let state = self.session.state();
        self.session.can_send()
            && state.status() == GameStatus::Ongoing
            && state.turn() == Turn::Local
    }

    /// Channel failures surface later through `next_event`, so only local
    /// refusals are reported here.
    async fn submit(&mut self, choice: Choice) {
        match self.session.submit_choice(choice).await {
            Ok(()) => self.player.handle_update(&self.session.view()),
            Err(e) => {
                let reason = match e.downcast_ref::<SessionError>() {
                    Some(reason) => reason.to_string(),
                    None => format!("{:#}", e),
                };
                warn!("choice {} refused: {}", choice, reason);
                self.player.handle_rejected(choice, &reason);
            }
        }
    }

    /// Join `match_id` and play until the referee ends the match or the
    /// channel drops. Returns the last known status.
    pub async fn run(
        &mut self,
        rng: &mut SmallRng,
        match_id: &str,
        credential: &str,
    ) -> anyhow::Result<GameStatus> {
        self.session.connect(match_id, credential).await?;

        loop {
            if self.my_move_due() {
                let state = self.session.state();
                let picked = self.player.select_choice(
                    rng,
                    state.local_choices(),
                    state.remote_choices(),
                    state.available_choices(),
                );
                match picked {
                    Selection::Pick(choice) => self.submit(choice).await,
                    Selection::Pending => {}
                    Selection::Quit => {
                        info!("player left match {}", match_id);
                        self.session.disconnect().await;
                        return Ok(GameStatus::Disconnected);
                    }
                }
            }

            match self.session.next_event().await? {
                SessionEvent::Snapshot(outcome) if !outcome.is_unchanged() => {
                    self.player.handle_update(&self.session.view());
                }
                SessionEvent::Disconnected => {
                    self.player.handle_update(&self.session.view());
                    break;
                }
                _ => {}
            }
        }

        let status = self.session.state().status();
        info!("match {} finished: {:?}", match_id, status);
        Ok(status)
    }

    /// Number of values this player has picked so far.
    pub fn choice_count(&self) -> usize {
        self.session.state().local_choices().len()
    }
}
