//! Per-side countdown clock.
//!
//! The timer does not read a clock itself: the owner advances it with
//! [`Timer::tick`], and authoritative snapshots overwrite the remaining time
//! with [`Timer::set_remaining`].

use core::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(serde::Serialize, serde::Deserialize))]
pub enum TimerState {
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    remaining: Duration,
    state: TimerState,
}

impl Timer {
    /// A paused timer holding `remaining`.
    pub const fn new(remaining: Duration) -> Self {
        Self {
            remaining,
            state: TimerState::Paused,
        }
    }

    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Overwrite the remaining time without touching the running state.
    pub fn set_remaining(&mut self, remaining: Duration) {
        self.remaining = remaining;
    }

    pub fn start(&mut self) {
        self.state = TimerState::Running;
    }

    pub fn pause(&mut self) {
        self.state = TimerState::Paused;
    }

    /// Pause and load `remaining`.
    pub fn reset(&mut self, remaining: Duration) {
        self.remaining = remaining;
        self.state = TimerState::Paused;
    }

    /// Count down by `elapsed` if running. Saturates at zero.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.is_running() {
            self.remaining = self.remaining.saturating_sub(elapsed);
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_timer_does_not_count_down() {
        let mut t = Timer::new(Duration::from_millis(500));
        t.tick(Duration::from_millis(100));
        assert_eq!(t.remaining(), Duration::from_millis(500));
        t.start();
        t.tick(Duration::from_millis(100));
        assert_eq!(t.remaining(), Duration::from_millis(400));
    }

    #[test]
    fn tick_saturates_at_zero() {
        let mut t = Timer::new(Duration::from_millis(50));
        t.start();
        t.tick(Duration::from_millis(100));
        assert!(t.is_expired());
        assert!(t.is_running());
    }

    #[test]
    fn reset_pauses() {
        let mut t = Timer::new(Duration::from_secs(1));
        t.start();
        t.reset(Duration::ZERO);
        assert!(!t.is_running());
        assert_eq!(t.remaining(), Duration::ZERO);
    }

    #[test]
    fn set_remaining_keeps_state() {
        let mut t = Timer::default();
        t.start();
        t.set_remaining(Duration::from_secs(8));
        assert!(t.is_running());
        assert_eq!(t.remaining(), Duration::from_secs(8));
    }
}
