//! Periodic observe schedule.

use std::time::{Duration, Instant};

use minioc_app::ports::NextWake;

#[derive(Debug)]
struct ObserveEntry {
    path: String,
    every: Duration,
    due: Instant,
}

/// Next notification time of every periodically observable resource.
#[derive(Debug, Default)]
pub(crate) struct ObserveScheduler {
    entries: Vec<ObserveEntry>,
}

impl ObserveScheduler {
    /// First notifications are due one interval after `now`.
    pub(crate) fn new<'a>(
        observable: impl IntoIterator<Item = (&'a str, Duration)>,
        now: Instant,
    ) -> Self {
        let entries = observable
            .into_iter()
            .map(|(path, every)| ObserveEntry {
                path: path.to_string(),
                every,
                due: now + every,
            })
            .collect();
        Self { entries }
    }

    /// Paths due at `now`, in registration order; each is rescheduled.
    ///
    /// A resource that fell more than one interval behind is rescheduled
    /// from `now` instead of firing a burst of catch-up notifications.
    pub(crate) fn take_due(&mut self, now: Instant) -> Vec<String> {
        let mut due = Vec::new();
        for entry in &mut self.entries {
            if entry.due > now {
                continue;
            }
            due.push(entry.path.clone());
            entry.due += entry.every;
            if entry.due <= now {
                entry.due = now + entry.every;
            }
        }
        due
    }

    pub(crate) fn next_wake(&self) -> NextWake {
        self.entries
            .iter()
            .map(|entry| NextWake::At(entry.due))
            .fold(NextWake::Idle, NextWake::earliest)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
