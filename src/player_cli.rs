#![cfg(feature = "std")]

use std::io::{self, BufRead, Write};
use std::string::String;

use rand::rngs::SmallRng;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver};

use crate::{
    choice_set::ChoiceSet,
    common::Choice,
    game::{GameStatus, SessionView, Turn},
    player::{Player, Selection},
    player_ai::suggest_choice,
};

/// Values laid out as a 3×3 magic square: every row, column and diagonal
/// adds up to 15, so the game plays like tic-tac-toe on this grid.
const MAGIC_SQUARE: [[u8; 3]; 3] = [[2, 7, 6], [9, 5, 1], [4, 3, 8]];

/// Terminal player. Lines are read on a background thread so the session
/// keeps ticking while the user types.
pub struct CliPlayer {
    input: Option<UnboundedReceiver<String>>,
    /// Hint shown in the open prompt, if one is open.
    hint: Option<Choice>,
}

impl CliPlayer {
    pub fn new() -> Self {
        Self {
            input: None,
            hint: None,
        }
    }

    /// Read answers from `input` instead of stdin.
    pub fn with_input(input: UnboundedReceiver<String>) -> Self {
        Self {
            input: Some(input),
            hint: None,
        }
    }
}

impl Default for CliPlayer {
    fn default() -> Self {
        Self::new()
    }
}

fn spawn_stdin_reader() -> UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

fn prompt(available: ChoiceSet, hint: Choice) {
    std::print!("Pick a number {:?} [{}]: ", available, hint);
    let _ = io::stdout().flush();
}

fn parse_choice(input: &str, available: ChoiceSet) -> Result<Choice, String> {
    let value: u8 = input
        .parse()
        .map_err(|_| std::format!("'{}' is not a number", input))?;
    let choice = Choice::new(value).map_err(|e| e.to_string())?;
    if !available.contains(choice) {
        return Err(std::format!("{} is already taken", choice));
    }
    Ok(choice)
}

fn cell(value: u8, view: &SessionView) -> char {
    if view.local_choices.iter().any(|c| c.get() == value) {
        'X'
    } else if view.remote_choices.iter().any(|c| c.get() == value) {
        'O'
    } else {
        (b'0' + value) as char
    }
}

/// Print the grid with your picks as `X` and the opponent's as `O`.
pub fn print_board(view: &SessionView) {
    for row in MAGIC_SQUARE.iter() {
        let line: Vec<String> = row.iter().map(|v| cell(*v, view).to_string()).collect();
        std::println!("  {}", line.join(" | "));
    }
}

fn print_clocks(view: &SessionView) {
    std::println!(
        "  you {:>5.1}s{}   opponent {:>5.1}s{}",
        view.local_time_left.as_secs_f64(),
        if view.local_timer_running { " *" } else { "  " },
        view.remote_time_left.as_secs_f64(),
        if view.remote_timer_running { " *" } else { "  " },
    );
}

impl Player for CliPlayer {
    fn select_choice(
        &mut self,
        rng: &mut SmallRng,
        own: &[Choice],
        opponent: &[Choice],
        available: ChoiceSet,
    ) -> Selection {
        let input = self.input.get_or_insert_with(spawn_stdin_reader);
        let hint = match self.hint {
            Some(hint) if available.contains(hint) => hint,
            _ => {
                let Some(hint) = suggest_choice(rng, own, opponent, available) else {
                    return Selection::Quit;
                };
                // Drop anything typed while it was not our turn.
                while input.try_recv().is_ok() {}
                prompt(available, hint);
                self.hint = Some(hint);
                hint
            }
        };
        loop {
            let line = match input.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => return Selection::Pending,
                Err(TryRecvError::Disconnected) => {
                    self.hint = None;
                    return Selection::Quit;
                }
            };
            let line = line.trim();
            let picked = if line.is_empty() {
                Ok(hint)
            } else {
                parse_choice(line, available)
            };
            match picked {
                Ok(choice) => {
                    self.hint = None;
                    return Selection::Pick(choice);
                }
                Err(e) => {
                    std::println!("{}", e);
                    prompt(available, hint);
                }
            }
        }
    }

    fn handle_update(&mut self, view: &SessionView) {
        if view.turn != Turn::Local {
            self.hint = None;
        }
        std::println!();
        print_board(view);
        print_clocks(view);
        match (view.status, view.turn) {
            (GameStatus::Ongoing, Turn::Local) => std::println!("Your turn."),
            (GameStatus::Ongoing, _) => std::println!("Waiting for opponent..."),
            (GameStatus::Victory, _) => std::println!("VICTORY! Line: {}", format_triple(view)),
            (GameStatus::Defeat, _) => std::println!("DEFEAT. Line: {}", format_triple(view)),
            (GameStatus::Draw, _) => std::println!("Draw."),
            (GameStatus::Disconnected, _) => std::println!("Connection lost."),
            (GameStatus::Undefined, _) => {}
        }
    }

    fn handle_rejected(&mut self, choice: Choice, reason: &str) {
        std::println!("Cannot pick {}: {}", choice, reason);
    }
}

fn format_triple(view: &SessionView) -> String {
    let parts: Vec<String> = view
        .triple
        .iter()
        .map(|c| c.map_or_else(|| "-".to_string(), |c| c.to_string()))
        .collect();
    parts.join(" + ")
}
