//! Fixed-period route poll.
//!
//! Client-side routers rewrite the location without any observable event, so
//! the bridge compares the logical route on a fixed interval and reports each
//! change once. The first poll after supervision starts reports the current
//! route.

use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct RoutePoll {
    period: Duration,
    next_due: Option<Instant>,
    last: Option<String>,
}

impl RoutePoll {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
            last: None,
        }
    }

    /// One timer tick: `true` when a poll interval has elapsed.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            None => {
                self.next_due = Some(now + self.period);
                false
            }
            Some(deadline) if now >= deadline => {
                self.next_due = Some(now + self.period);
                true
            }
            Some(_) => false,
        }
    }

    /// Record the observed route; `true` when it differs from the last seen.
    pub fn observe(&mut self, route: &str) -> bool {
        if self.last.as_deref() == Some(route) {
            return false;
        }
        self.last = Some(route.to_string());
        true
    }
}
