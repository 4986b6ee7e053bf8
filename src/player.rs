use rand::rngs::SmallRng;

use crate::{choice_set::ChoiceSet, common::Choice, game::SessionView};

/// Answer to a request for the next pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Pick(Choice),
    /// No decision yet; ask again on the next session event.
    Pending,
    /// The player leaves the match.
    Quit,
}

impl From<Option<Choice>> for Selection {
    fn from(choice: Option<Choice>) -> Self {
        choice.map_or(Selection::Quit, Selection::Pick)
    }
}

/// Interface implemented by different player types.
pub trait Player: Send {
    /// Pick the next value from `available`. Must not block: a player still
    /// thinking answers [`Selection::Pending`] and is asked again later.
    fn select_choice(
        &mut self,
        rng: &mut SmallRng,
        own: &[Choice],
        opponent: &[Choice],
        available: ChoiceSet,
    ) -> Selection;

    /// Inform the player that the session state changed.
    fn handle_update(&mut self, _view: &SessionView) {}

    /// Inform the player that a pick was refused locally.
    fn handle_rejected(&mut self, _choice: Choice, _reason: &str) {}
}
