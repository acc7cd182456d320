//! Trailing-edge coalescing timer for mutation bursts.
//!
//! Every poke re-arms the deadline; the timer fires once when polled past it.
//! Coalescing bounds snapshot cost to once per quiet period regardless of
//! mutation volume. Time is injected, so tests drive it with synthetic
//! instants.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arm, or re-arm, the timer: the deadline moves to `now + window`.
    pub fn poke(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire-once: `true` exactly when armed and past the deadline; disarms.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[test]
    fn fires_once_after_the_quiet_window() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(WINDOW);
        debounce.poke(t0);
        assert!(!debounce.fire_if_due(t0 + Duration::from_millis(499)));
        assert!(debounce.fire_if_due(t0 + Duration::from_millis(500)));
        // disarmed after firing
        assert!(!debounce.fire_if_due(t0 + Duration::from_millis(1000)));
    }

    #[test]
    fn bursts_coalesce_to_one_firing_timed_from_the_last_poke() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(WINDOW);
        let mut fired = 0;
        for i in 0..10 {
            debounce.poke(t0 + Duration::from_millis(i * 100));
            if debounce.fire_if_due(t0 + Duration::from_millis(i * 100 + 1)) {
                fired += 1;
            }
        }
        assert_eq!(fired, 0);
        let last_poke = t0 + Duration::from_millis(900);
        assert!(!debounce.fire_if_due(last_poke + Duration::from_millis(499)));
        assert!(debounce.fire_if_due(last_poke + WINDOW));
        assert_eq!(fired, 0);
    }

    #[test]
    fn cancel_disarms_a_pending_firing() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(WINDOW);
        debounce.poke(t0);
        assert!(debounce.is_armed());
        debounce.cancel();
        assert!(!debounce.is_armed());
        assert!(!debounce.fire_if_due(t0 + WINDOW));
    }
}
