use std::num::NonZeroUsize;

/// Where a member stands within its readiness cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    /// More steps are needed before the next readiness check succeeds.
    Counting { remaining: usize },
    /// The cycle is over, `overrun` steps were taken past its end.
    Due { overrun: usize },
}

/// Counts optimization steps down to the next readiness check.
///
/// Steps taken past the end of a cycle are tolerated and discarded: a successful poll
/// always restarts the countdown at the full cycle length.
#[derive(Debug, Clone)]
pub struct Countdown {
    steps_to_ready: NonZeroUsize,
    remaining: i64,
}

impl Countdown {
    pub fn new(steps_to_ready: NonZeroUsize) -> Self {
        Self {
            steps_to_ready,
            remaining: steps_to_ready.get() as i64,
        }
    }

    /// Records one optimization step.
    #[inline]
    pub fn tick(&mut self) {
        self.remaining -= 1;
    }

    /// Returns true and restarts the cycle if it is over.
    pub fn poll(&mut self) -> bool {
        if self.remaining > 0 {
            return false;
        }

        self.remaining = self.steps_to_ready.get() as i64;
        true
    }

    pub fn state(&self) -> ReadyState {
        if self.remaining > 0 {
            ReadyState::Counting {
                remaining: self.remaining as usize,
            }
        } else {
            ReadyState::Due {
                overrun: self.remaining.unsigned_abs() as usize,
            }
        }
    }

    /// Returns the raw counter, negative once the cycle has been overrun.
    #[inline]
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    #[inline]
    pub fn steps_to_ready(&self) -> NonZeroUsize {
        self.steps_to_ready
    }
}
