//! Purpose-keyed timer table
//!
//! Every delayed action in the engine (leash corrections, the Map-mode settle
//! delay, advisory auto-dismiss) runs through this table. Scheduling a purpose
//! replaces any deadline already pending for it, which is what gives the leash
//! its debounce: of N rapid triggers, only the last one fires. `cancel_all` is
//! the single teardown used on reset and drop.
//!
//! Deadlines are plain `instant::Instant`s polled from the frame loop, so
//! tests can drive time explicitly through the `now` arguments.

use instant::Instant;
use std::time::Duration;

/// What a pending deadline is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPurpose {
    /// Debounced leash check after viewport movement settled
    LeashIdle,
    /// Debounced leash check after a drag gesture ended
    LeashDragEnd,
    /// Auto-dismiss of the advisory overlay
    MaskAutoClear,
    /// Map-mode entry after a fit-to-selection settles
    ModeTransition,
}

impl TimerPurpose {
    /// Stable dispatch order for `take_due`
    const ALL: [TimerPurpose; 4] = [
        TimerPurpose::LeashIdle,
        TimerPurpose::LeashDragEnd,
        TimerPurpose::MaskAutoClear,
        TimerPurpose::ModeTransition,
    ];

    fn index(self) -> usize {
        match self {
            TimerPurpose::LeashIdle => 0,
            TimerPurpose::LeashDragEnd => 1,
            TimerPurpose::MaskAutoClear => 2,
            TimerPurpose::ModeTransition => 3,
        }
    }
}

/// One deadline slot per purpose
#[derive(Debug, Default)]
pub struct TimerTable {
    deadlines: [Option<Instant>; 4],
}

impl TimerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `purpose` to fire `delay` after `now`, replacing any deadline
    /// already pending for the same purpose.
    pub fn schedule(&mut self, purpose: TimerPurpose, delay: Duration, now: Instant) {
        self.deadlines[purpose.index()] = Some(now + delay);
    }

    pub fn cancel(&mut self, purpose: TimerPurpose) {
        self.deadlines[purpose.index()] = None;
    }

    /// Cancel every pending deadline. Used as the single teardown routine.
    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 4];
    }

    pub fn is_pending(&self, purpose: TimerPurpose) -> bool {
        self.deadlines[purpose.index()].is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.deadlines.iter().filter(|d| d.is_some()).count()
    }

    /// Remove and return every purpose whose deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Vec<TimerPurpose> {
        let mut due = Vec::new();
        for purpose in TimerPurpose::ALL {
            if let Some(deadline) = self.deadlines[purpose.index()]
                && deadline <= now
            {
                self.deadlines[purpose.index()] = None;
                due.push(purpose);
            }
        }
        due
    }
}
