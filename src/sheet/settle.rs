use std::time::{Duration, Instant};

/// How long a closing sheet takes to slide away; the drag offset is only
/// reset once this has elapsed so that the sheet does not visibly jump
pub(crate) const SETTLE_DELAY: Duration = Duration::from_millis(300);

/// A cancellable one-shot deadline, polled by the event loop
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct SettleTimer {
    deadline: Option<Instant>,
}

impl SettleTimer {
    pub(crate) fn new() -> SettleTimer {
        SettleTimer::default()
    }

    /// (Re)starts the timer so that it fires `SETTLE_DELAY` after `now`
    pub(crate) fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now.checked_add(SETTLE_DELAY).unwrap_or(now));
    }

    /// Returns `true` if a pending deadline was dropped
    pub(crate) fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Time left before the timer fires, or `None` if nothing is scheduled
    pub(crate) fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Returns `true` exactly once, on the first call at or after the
    /// deadline
    pub(crate) fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
