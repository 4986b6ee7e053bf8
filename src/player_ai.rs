use alloc::vec::Vec;

use rand::Rng;
use rand::rngs::SmallRng;

use crate::{
    choice_set::{has_winning_triple, ChoiceSet},
    common::Choice,
    player::{Player, Selection},
};

/// Greedy AI: completes its own line, else blocks the opponent's, else
/// takes the centre value, else picks at random.
#[derive(Debug, Default)]
pub struct AiPlayer;

impl AiPlayer {
    pub fn new() -> Self {
        Self
    }
}

fn completes_line(picks: &[Choice], candidate: Choice) -> bool {
    let mut line: Vec<Choice> = picks.to_vec();
    line.push(candidate);
    has_winning_triple(&line)
}

/// Best pick for `own` against `opponent`, or `None` if nothing is free.
pub fn suggest_choice(
    rng: &mut SmallRng,
    own: &[Choice],
    opponent: &[Choice],
    available: ChoiceSet,
) -> Option<Choice> {
    if let Some(win) = available.iter().find(|c| completes_line(own, *c)) {
        return Some(win);
    }
    if let Some(block) = available.iter().find(|c| completes_line(opponent, *c)) {
        return Some(block);
    }
    if let Ok(centre) = Choice::new(5) {
        if available.contains(centre) {
            return Some(centre);
        }
    }
    if available.is_empty() {
        return None;
    }
    let idx = rng.random_range(0..available.len());
    available.iter().nth(idx)
}

impl Player for AiPlayer {
    fn select_choice(
        &mut self,
        rng: &mut SmallRng,
        own: &[Choice],
        opponent: &[Choice],
        available: ChoiceSet,
    ) -> Selection {
        suggest_choice(rng, own, opponent, available).into()
    }
}
