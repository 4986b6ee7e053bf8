use core::time::Duration;

/// Smallest value a player may pick.
pub const CHOICE_MIN: u8 = 1;
/// Largest value a player may pick.
pub const CHOICE_MAX: u8 = 9;
/// Number of distinct values in play.
pub const NUM_CHOICES: usize = (CHOICE_MAX - CHOICE_MIN + 1) as usize;
/// Three picks adding up to this value win the match.
pub const TARGET_SUM: u8 = 15;
pub const TRIPLE_LEN: usize = 3;

/// Step used by the session to count the running timer down.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Time budget each side gets from the referee for the whole match.
pub const DEFAULT_TURN_TIME: Duration = Duration::from_secs(30);

/// Number of records returned by a by-player match listing.
pub const RECENT_MATCHES_LIMIT: usize = 20;
