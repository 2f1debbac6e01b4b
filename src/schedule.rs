//! Periodic task schedule driven by the event loop
//!
//! The schedule never spawns threads or timers of its own. The owner asks
//! for the next due instant, sleeps the event loop until then, and calls
//! [`Schedule::take_due`] to learn which tasks should run. Stopping a task
//! takes effect immediately: a stopped task is never reported as due again.

use std::time::{Duration, Instant};

/// The periodic actions of an enforcement cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Force the pointer back to the screen center
    PointerRepin,
    /// Re-evaluate the countdown against the deadline
    Countdown,
}

#[derive(Debug, Clone, Copy)]
struct Periodic {
    interval: Duration,
    next_due: Instant,
}

#[derive(Debug, Default)]
pub struct Schedule {
    pointer_repin: Option<Periodic>,
    countdown: Option<Periodic>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) `task`; its first run is one interval after `now`
    pub fn start(&mut self, task: Task, interval: Duration, now: Instant) {
        *self.slot_mut(task) = Some(Periodic {
            interval,
            next_due: now + interval,
        });
    }

    pub fn stop(&mut self, task: Task) {
        *self.slot_mut(task) = None;
    }

    pub fn stop_all(&mut self) {
        self.pointer_repin = None;
        self.countdown = None;
    }

    pub fn is_running(&self, task: Task) -> bool {
        self.slot(task).is_some()
    }

    /// Earliest instant at which any running task is due
    pub fn next_due(&self) -> Option<Instant> {
        [self.pointer_repin, self.countdown]
            .into_iter()
            .flatten()
            .map(|p| p.next_due)
            .min()
    }

    /// Tasks due at `now`, earliest first, each rescheduled for its next run
    ///
    /// Missed runs are coalesced: a task that fell several intervals behind
    /// is reported once and rescheduled relative to `now`.
    pub fn take_due(&mut self, now: Instant) -> Vec<Task> {
        let mut due: Vec<(Instant, Task)> = Vec::with_capacity(2);

        for task in [Task::PointerRepin, Task::Countdown] {
            if let Some(periodic) = self.slot_mut(task) {
                if periodic.next_due <= now {
                    due.push((periodic.next_due, task));
                    periodic.next_due += periodic.interval;
                    if periodic.next_due <= now {
                        periodic.next_due = now + periodic.interval;
                    }
                }
            }
        }

        due.sort_by_key(|(at, _)| *at);
        due.into_iter().map(|(_, task)| task).collect()
    }

    fn slot(&self, task: Task) -> &Option<Periodic> {
        match task {
            Task::PointerRepin => &self.pointer_repin,
            Task::Countdown => &self.countdown,
        }
    }

    fn slot_mut(&mut self, task: Task) -> &mut Option<Periodic> {
        match task {
            Task::PointerRepin => &mut self.pointer_repin,
            Task::Countdown => &mut self.countdown,
        }
    }
}
