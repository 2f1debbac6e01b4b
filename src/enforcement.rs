//! Countdown enforcement state machine
//!
//! `Uninitialized -> Locked -> Released`. Entering `Locked` starts the
//! countdown and pointer re-pin tasks and engages the input lock; the
//! countdown task alone performs the transition to `Released`, at most once.
//! All methods take the current monotonic time explicitly, so the machine is
//! a pure function of its inputs and can be driven with simulated time.

use crate::constants::{
    countdown_status, COUNTDOWN_TICK_INTERVAL_MS, LOCK_MAX_SECONDS, LOCK_MIN_SECONDS,
    POINTER_REPIN_INTERVAL_MS, RELEASED_STATUS,
};
use crate::input_blocking::{InputLock, ScreenRect};
use crate::schedule::{Schedule, Task};
use anyhow::Result;
use log::{debug, info, trace, warn};
use std::time::{Duration, Instant};

/// Window-side effects the state machine requests
pub trait EnforcementView {
    /// Replace the status line under the rules
    fn set_status(&mut self, text: &str);

    fn set_dismiss_enabled(&mut self, enabled: bool);

    /// Place the window above all others and focus it
    fn raise_to_top(&mut self);

    /// Undo a minimize
    fn restore(&mut self);

    /// Center the window within `area`
    fn center_in(&mut self, area: ScreenRect);

    /// Primary screen geometry as seen by the windowing layer, used when the
    /// input lock cannot report a work area
    fn primary_screen_area(&self) -> Option<ScreenRect>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Locked,
    Released,
}

/// Answer to a user close request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissOutcome {
    /// Dismiss arrived before the countdown finished
    Ignored,
    /// Enforcement is torn down; the process should exit with code 0
    Exit,
}

/// Whole seconds left until `deadline`, rounded up, never negative
pub fn remaining_at(deadline: Instant, now: Instant) -> u64 {
    let left = deadline.saturating_duration_since(now);
    left.as_secs() + u64::from(left.subsec_nanos() > 0)
}

pub struct Enforcement<L: InputLock> {
    lock_seconds: u64,
    phase: Phase,
    deadline: Option<Instant>,
    /// Last value pushed to the status line
    remaining: u64,
    input_lock: L,
    schedule: Schedule,
    dismissed: bool,
}

impl<L: InputLock> Enforcement<L> {
    /// `lock_seconds` is clamped to `LOCK_MIN_SECONDS..=LOCK_MAX_SECONDS`
    pub fn new(lock_seconds: u64, input_lock: L) -> Self {
        let lock_seconds = lock_seconds.clamp(LOCK_MIN_SECONDS, LOCK_MAX_SECONDS);
        Self {
            lock_seconds,
            phase: Phase::Uninitialized,
            deadline: None,
            remaining: lock_seconds,
            input_lock,
            schedule: Schedule::new(),
            dismissed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn lock_seconds(&self) -> u64 {
        self.lock_seconds
    }

    /// Seconds shown on the status line; zero once released
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn can_dismiss(&self) -> bool {
        self.phase == Phase::Released
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    pub fn input_lock(&self) -> &L {
        &self.input_lock
    }

    pub fn is_task_running(&self, task: Task) -> bool {
        self.schedule.is_running(task)
    }

    /// When the event loop must wake next, if any task is running
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.schedule.next_due()
    }

    /// Enter `Locked` on the window's first appearance
    ///
    /// Later appearances are ignored: the lock runs once per process.
    pub fn begin(&mut self, now: Instant, view: &mut impl EnforcementView) {
        if self.phase != Phase::Uninitialized {
            debug!("Enforcement already started - ignoring repeated show");
            return;
        }

        // Only overflows if the clamp in `new` is bypassed
        let deadline = now
            .checked_add(Duration::from_secs(self.lock_seconds))
            .unwrap_or_else(|| {
                warn!("Deadline {}s from now overflows - releasing at once", self.lock_seconds);
                now
            });
        self.deadline = Some(deadline);
        self.remaining = self.lock_seconds;
        self.phase = Phase::Locked;

        if let Some(area) = self.screen_area(&*view) {
            view.center_in(area);
        }
        view.raise_to_top();
        view.set_dismiss_enabled(false);

        self.schedule.start(
            Task::PointerRepin,
            Duration::from_millis(POINTER_REPIN_INTERVAL_MS),
            now,
        );
        self.schedule.start(
            Task::Countdown,
            Duration::from_millis(COUNTDOWN_TICK_INTERVAL_MS),
            now,
        );

        best_effort("Keyboard interception", self.input_lock.install());
        best_effort(
            "Hiding pointer",
            self.input_lock.set_pointer_visible(false),
        );

        view.set_status(&countdown_status(self.remaining));
        self.repin_pointer(view);

        info!(
            "Enforcement started - dismiss unlocks in {} seconds",
            self.lock_seconds
        );
    }

    /// Run every task that is due at `now`
    ///
    /// A task stopped by an earlier task in the same batch does not run.
    pub fn on_timers(&mut self, now: Instant, view: &mut impl EnforcementView) {
        for task in self.schedule.take_due(now) {
            if !self.schedule.is_running(task) {
                continue;
            }
            match task {
                Task::PointerRepin => self.repin_pointer(view),
                Task::Countdown => self.countdown_tick(now, view),
            }
        }
    }

    /// Recompute the remaining time and release once it reaches zero
    pub fn countdown_tick(&mut self, now: Instant, view: &mut impl EnforcementView) {
        if self.phase != Phase::Locked {
            return;
        }
        let Some(deadline) = self.deadline else {
            return;
        };

        let remaining = remaining_at(deadline, now);
        if remaining == 0 {
            self.release(view);
        } else if remaining != self.remaining {
            self.remaining = remaining;
            view.set_status(&countdown_status(remaining));
        }
    }

    /// Force the pointer to the center of the primary screen
    ///
    /// The screen geometry is read fresh on every call so display changes
    /// during the lock are followed.
    pub fn repin_pointer(&mut self, view: &mut impl EnforcementView) {
        if self.phase != Phase::Locked {
            return;
        }
        let Some(area) = self.screen_area(&*view) else {
            return;
        };

        let (x, y) = area.center();
        if let Err(e) = self.input_lock.pin_pointer(x, y) {
            trace!("Pointer pin failed (ignored): {:#}", e);
        }
    }

    /// Close requests are always refused; the window stays on top
    pub fn on_close_requested(&mut self, view: &mut impl EnforcementView) -> CloseDecision {
        warn!("Close request rejected ({:?})", self.phase);
        view.raise_to_top();
        CloseDecision::Reject
    }

    /// Revert a minimize immediately
    pub fn on_minimized(&mut self, view: &mut impl EnforcementView) {
        debug!("Window minimized - restoring");
        view.restore();
        view.raise_to_top();
    }

    /// Handle a click on the dismiss control
    ///
    /// Only accepted once released. The release sequence runs again so that
    /// nothing stays installed even if an earlier teardown was incomplete.
    pub fn dismiss(&mut self) -> DismissOutcome {
        if self.phase != Phase::Released {
            warn!("Dismiss ignored - countdown still running ({:?})", self.phase);
            return DismissOutcome::Ignored;
        }

        self.release_input();
        self.dismissed = true;
        info!("Rules dismissed - exiting");
        DismissOutcome::Exit
    }

    /// Tear down platform effects without changing phase (event loop exit)
    pub fn shutdown(&mut self) {
        self.release_input();
    }

    fn release(&mut self, view: &mut impl EnforcementView) {
        if self.phase != Phase::Locked {
            return;
        }

        self.release_input();
        self.deadline = None;
        self.remaining = 0;
        self.phase = Phase::Released;

        view.set_status(RELEASED_STATUS);
        view.set_dismiss_enabled(true);
        info!("Countdown finished - input released, dismiss enabled");
    }

    /// Stop both tasks first, then undo the input lock. Idempotent.
    fn release_input(&mut self) {
        self.schedule.stop_all();
        best_effort("Keyboard release", self.input_lock.uninstall());
        best_effort(
            "Showing pointer",
            self.input_lock.set_pointer_visible(true),
        );
    }

    fn screen_area(&self, view: &impl EnforcementView) -> Option<ScreenRect> {
        self.input_lock
            .primary_work_area()
            .or_else(|| view.primary_screen_area())
    }
}

fn best_effort(what: &str, result: Result<()>) {
    if let Err(e) = result {
        debug!("{} failed (ignored): {:#}", what, e);
    }
}
