//! Trailing-edge update scheduler
//!
//! An explicit Idle/Pending state machine with a single pending slot. The
//! first input of a burst arms a deadline `delay` in the future; later inputs
//! while Pending are absorbed without moving it. When the deadline passes the
//! owner recomputes once, reading whatever query is current at that moment.
//!
//! Time is passed in by the caller, so tests can drive it with any instants.

use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Pending { due: Instant },
}

#[derive(Debug)]
pub struct UpdateScheduler {
    delay: Duration,
    state: SchedulerState,
    fired: u64,
    coalesced: u64,
}

impl UpdateScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: SchedulerState::Idle,
            fired: 0,
            coalesced: 0,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SchedulerState::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Idle => None,
            SchedulerState::Pending { due } => Some(due),
        }
    }

    /// Record one input event.
    ///
    /// Returns true if this event armed a new deadline, false if it was
    /// absorbed into the one already pending.
    pub fn schedule(&mut self, now: Instant) -> bool {
        match self.state {
            SchedulerState::Idle => {
                let due = now + self.delay;
                self.state = SchedulerState::Pending { due };
                trace!("Recompute scheduled in {:?}", self.delay);
                true
            }
            SchedulerState::Pending { .. } => {
                self.coalesced += 1;
                false
            }
        }
    }

    /// Fire if the pending deadline has passed. Returns to Idle when it fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            SchedulerState::Pending { due } if now >= due => self.fire(),
            _ => false,
        }
    }

    /// Fire immediately if anything is pending
    pub fn flush(&mut self) -> bool {
        match self.state {
            SchedulerState::Pending { .. } => self.fire(),
            SchedulerState::Idle => false,
        }
    }

    fn fire(&mut self) -> bool {
        self.state = SchedulerState::Idle;
        self.fired += 1;
        true
    }

    /// Number of recomputes released so far
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    /// Number of inputs absorbed into an already-pending recompute
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}
