use anyhow::{bail, Result};
use readfirst::constants::{countdown_status, LOCK_MAX_SECONDS, RELEASED_STATUS};
use readfirst::schedule::Task;
use readfirst::{Config, DismissOutcome, Enforcement, EnforcementView, InputLock, Phase, ScreenRect};
use std::time::{Duration, Instant};

/// Input lock that records every call
#[derive(Default)]
struct RecordingLock {
    installed: bool,
    installs: u32,
    uninstalls: u32,
    pointer_visible: bool,
    pins: Vec<(i32, i32)>,
    work_area: Option<ScreenRect>,
    fail_everything: bool,
}

impl RecordingLock {
    fn new() -> Self {
        Self {
            pointer_visible: true,
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail_everything: true,
            ..Self::new()
        }
    }
}

impl InputLock for RecordingLock {
    fn install(&mut self) -> Result<()> {
        if self.fail_everything {
            bail!("hook refused");
        }
        if !self.installed {
            self.installed = true;
            self.installs += 1;
        }
        Ok(())
    }

    fn uninstall(&mut self) -> Result<()> {
        if self.installed {
            self.installed = false;
            self.uninstalls += 1;
        }
        Ok(())
    }

    fn is_installed(&self) -> bool {
        self.installed
    }

    fn pin_pointer(&mut self, x: i32, y: i32) -> Result<()> {
        if self.fail_everything {
            bail!("cursor refused");
        }
        self.pins.push((x, y));
        Ok(())
    }

    fn set_pointer_visible(&mut self, visible: bool) -> Result<()> {
        if self.fail_everything {
            bail!("cursor refused");
        }
        self.pointer_visible = visible;
        Ok(())
    }

    fn primary_work_area(&self) -> Option<ScreenRect> {
        self.work_area
    }
}

/// Window surface that records every request
struct RecordingView {
    statuses: Vec<String>,
    dismiss_enabled: bool,
    dismiss_enable_count: u32,
    raises: u32,
    restores: u32,
    centered_in: Option<ScreenRect>,
    screen: Option<ScreenRect>,
}

impl RecordingView {
    fn new() -> Self {
        Self {
            statuses: Vec::new(),
            dismiss_enabled: false,
            dismiss_enable_count: 0,
            raises: 0,
            restores: 0,
            centered_in: None,
            screen: Some(ScreenRect::new(0, 0, 1920, 1080)),
        }
    }

    fn last_status(&self) -> &str {
        self.statuses.last().map(String::as_str).unwrap_or("")
    }
}

impl EnforcementView for RecordingView {
    fn set_status(&mut self, text: &str) {
        self.statuses.push(text.to_string());
    }

    fn set_dismiss_enabled(&mut self, enabled: bool) {
        if enabled && !self.dismiss_enabled {
            self.dismiss_enable_count += 1;
        }
        self.dismiss_enabled = enabled;
    }

    fn raise_to_top(&mut self) {
        self.raises += 1;
    }

    fn restore(&mut self) {
        self.restores += 1;
    }

    fn center_in(&mut self, area: ScreenRect) {
        self.centered_in = Some(area);
    }

    fn primary_screen_area(&self) -> Option<ScreenRect> {
        self.screen
    }
}

/// Drive the event loop in 10ms steps from `from` to `to` inclusive,
/// firing whatever the schedule reports as due
fn run_until(
    enforcement: &mut Enforcement<RecordingLock>,
    view: &mut RecordingView,
    from: Instant,
    to: Instant,
) {
    let mut now = from;
    while now <= to {
        enforcement.on_timers(now, view);
        now += Duration::from_millis(10);
    }
}

fn started(lock_seconds: u64) -> (Enforcement<RecordingLock>, RecordingView, Instant) {
    let mut enforcement = Enforcement::new(lock_seconds, RecordingLock::new());
    let mut view = RecordingView::new();
    let start = Instant::now();
    enforcement.begin(start, &mut view);
    (enforcement, view, start)
}

#[test]
fn test_initial_state() {
    let enforcement = Enforcement::new(5, RecordingLock::new());
    assert_eq!(enforcement.phase(), Phase::Uninitialized);
    assert_eq!(enforcement.remaining_seconds(), 5);
    assert!(enforcement.deadline().is_none());
    assert!(!enforcement.can_dismiss());
    assert!(enforcement.next_wakeup().is_none());
}

#[test]
fn test_zero_lock_seconds_raised_to_one() {
    let enforcement = Enforcement::new(0, RecordingLock::new());
    assert_eq!(enforcement.lock_seconds(), 1);
}

#[test]
fn test_huge_lock_seconds_capped() {
    let enforcement = Enforcement::new(u64::MAX, RecordingLock::new());
    assert_eq!(enforcement.lock_seconds(), LOCK_MAX_SECONDS);
}

#[test]
fn test_huge_configured_lock_starts_without_overflow() {
    let config = Config::from_json_str(r#"{"lock_seconds": 9223372036854775807}"#).unwrap();
    let (enforcement, view, start) = started(config.lock_seconds);

    assert_eq!(enforcement.phase(), Phase::Locked);
    assert_eq!(
        enforcement.deadline(),
        Some(start + Duration::from_secs(LOCK_MAX_SECONDS))
    );
    assert_eq!(view.last_status(), countdown_status(LOCK_MAX_SECONDS));
}

#[test]
fn test_begin_enters_locked() {
    let (enforcement, view, start) = started(5);

    assert_eq!(enforcement.phase(), Phase::Locked);
    assert_eq!(enforcement.deadline(), Some(start + Duration::from_secs(5)));
    assert_eq!(enforcement.remaining_seconds(), 5);
    assert!(enforcement.is_task_running(Task::PointerRepin));
    assert!(enforcement.is_task_running(Task::Countdown));

    let lock = enforcement.input_lock();
    assert!(lock.installed, "Keyboard interception should be installed");
    assert!(!lock.pointer_visible, "Pointer should be hidden");
    assert_eq!(lock.pins, vec![(960, 540)], "Pointer pinned immediately");

    assert!(!view.dismiss_enabled);
    assert!(view.raises >= 1, "Window should be raised to top");
    assert_eq!(view.centered_in, Some(ScreenRect::new(0, 0, 1920, 1080)));
    assert_eq!(view.last_status(), countdown_status(5));
}

#[test]
fn test_begin_only_once() {
    let (mut enforcement, mut view, start) = started(5);
    let deadline = enforcement.deadline();

    enforcement.begin(start + Duration::from_secs(2), &mut view);
    assert_eq!(enforcement.deadline(), deadline, "Deadline must not move");
    assert_eq!(enforcement.input_lock().installs, 1);
}

#[test]
fn test_work_area_preferred_over_monitor() {
    let work_area = ScreenRect::new(0, 0, 1920, 1040);
    let lock = RecordingLock {
        work_area: Some(work_area),
        ..RecordingLock::new()
    };
    let mut enforcement = Enforcement::new(5, lock);
    let mut view = RecordingView::new();
    enforcement.begin(Instant::now(), &mut view);

    assert_eq!(view.centered_in, Some(work_area));
    assert_eq!(enforcement.input_lock().pins, vec![(960, 520)]);
}

#[test]
fn test_pointer_follows_screen_changes() {
    let (mut enforcement, mut view, start) = started(5);

    view.screen = Some(ScreenRect::new(0, 0, 2560, 1440));
    enforcement.on_timers(start + Duration::from_millis(10), &mut view);

    assert_eq!(enforcement.input_lock().pins.last(), Some(&(1280, 720)));
}

#[test]
fn test_dismiss_disabled_until_deadline() {
    for lock_seconds in [1, 2, 5] {
        let (mut enforcement, mut view, start) = started(lock_seconds);
        let deadline = start + Duration::from_secs(lock_seconds);

        run_until(
            &mut enforcement,
            &mut view,
            start,
            deadline - Duration::from_millis(1),
        );
        assert_eq!(enforcement.phase(), Phase::Locked);
        assert!(!view.dismiss_enabled, "Dismiss enabled early ({}s)", lock_seconds);
        assert!(!enforcement.can_dismiss());

        enforcement.countdown_tick(deadline, &mut view);
        assert_eq!(enforcement.phase(), Phase::Released);
        assert!(view.dismiss_enabled, "Dismiss should be enabled at the deadline");
    }
}

#[test]
fn test_remaining_monotonic_and_status_changes_only_on_new_value() {
    let (mut enforcement, mut view, start) = started(5);

    let mut previous = enforcement.remaining_seconds();
    let mut now = start;
    while now <= start + Duration::from_secs(6) {
        enforcement.on_timers(now, &mut view);
        let remaining = enforcement.remaining_seconds();
        assert!(remaining <= previous, "Remaining went up: {} -> {}", previous, remaining);
        previous = remaining;
        now += Duration::from_millis(10);
    }

    let expected: Vec<String> = [5, 4, 3, 2, 1]
        .into_iter()
        .map(countdown_status)
        .chain([RELEASED_STATUS.to_string()])
        .collect();
    assert_eq!(view.statuses, expected, "One status update per second");
}

#[test]
fn test_one_second_lock_releases_exactly_once() {
    let (mut enforcement, mut view, start) = started(1);

    run_until(&mut enforcement, &mut view, start, start + Duration::from_secs(3));

    assert_eq!(enforcement.phase(), Phase::Released);
    assert_eq!(enforcement.remaining_seconds(), 0);
    assert_eq!(view.dismiss_enable_count, 1);
    assert_eq!(
        view.statuses.iter().filter(|s| *s == RELEASED_STATUS).count(),
        1,
        "Release status shown once"
    );

    let lock = enforcement.input_lock();
    assert!(!lock.installed);
    assert_eq!(lock.uninstalls, 1);
    assert!(lock.pointer_visible);
}

#[test]
fn test_release_stops_both_tasks() {
    let (mut enforcement, mut view, start) = started(1);
    run_until(&mut enforcement, &mut view, start, start + Duration::from_secs(1));

    assert!(!enforcement.is_task_running(Task::PointerRepin));
    assert!(!enforcement.is_task_running(Task::Countdown));
    assert!(enforcement.next_wakeup().is_none());

    let pins = enforcement.input_lock().pins.len();
    enforcement.on_timers(start + Duration::from_secs(5), &mut view);
    enforcement.repin_pointer(&mut view);
    assert_eq!(enforcement.input_lock().pins.len(), pins, "No pin after release");
}

#[test]
fn test_late_tick_releases_without_intermediate_values() {
    let (mut enforcement, mut view, start) = started(5);

    // Loop stalled past the deadline
    enforcement.on_timers(start + Duration::from_secs(9), &mut view);

    assert_eq!(enforcement.phase(), Phase::Released);
    assert_eq!(view.last_status(), RELEASED_STATUS);
}

#[test]
fn test_close_rejected_while_locked() {
    let (mut enforcement, mut view, start) = started(5);
    let raises = view.raises;

    enforcement.on_close_requested(&mut view);

    assert_eq!(enforcement.phase(), Phase::Locked);
    assert_eq!(enforcement.deadline(), Some(start + Duration::from_secs(5)));
    assert!(enforcement.input_lock().installed);
    assert_eq!(view.raises, raises + 1, "Topmost re-asserted");
}

#[test]
fn test_close_rejected_after_release() {
    let (mut enforcement, mut view, start) = started(1);
    enforcement.countdown_tick(start + Duration::from_secs(1), &mut view);

    enforcement.on_close_requested(&mut view);
    assert_eq!(enforcement.phase(), Phase::Released);
    assert!(!enforcement.is_dismissed());
}

#[test]
fn test_dismiss_ignored_while_locked() {
    let (mut enforcement, mut view, start) = started(5);
    let statuses = view.statuses.clone();

    assert_eq!(enforcement.dismiss(), DismissOutcome::Ignored);

    assert_eq!(enforcement.phase(), Phase::Locked);
    assert!(!enforcement.is_dismissed());
    assert!(enforcement.input_lock().installed, "Lock must stay engaged");
    assert!(enforcement.is_task_running(Task::Countdown));
    assert_eq!(view.statuses, statuses);
    assert_eq!(enforcement.deadline(), Some(start + Duration::from_secs(5)));
}

#[test]
fn test_dismiss_ignored_before_start() {
    let mut enforcement = Enforcement::new(5, RecordingLock::new());
    assert_eq!(enforcement.dismiss(), DismissOutcome::Ignored);
    assert_eq!(enforcement.phase(), Phase::Uninitialized);
}

#[test]
fn test_dismiss_after_release_exits() {
    let (mut enforcement, mut view, start) = started(1);
    enforcement.countdown_tick(start + Duration::from_secs(1), &mut view);
    let statuses = view.statuses.clone();

    assert_eq!(enforcement.dismiss(), DismissOutcome::Exit);
    assert!(enforcement.is_dismissed());
    assert_eq!(view.statuses, statuses, "Window untouched on the way out");
    assert_eq!(view.dismiss_enable_count, 1);

    let lock = enforcement.input_lock();
    assert_eq!(lock.uninstalls, 1, "Repeat release must not double-uninstall");
    assert!(!lock.installed);
    assert!(lock.pointer_visible);
}

#[test]
fn test_shutdown_after_dismiss_is_harmless() {
    let (mut enforcement, mut view, start) = started(1);
    enforcement.countdown_tick(start + Duration::from_secs(1), &mut view);
    assert_eq!(enforcement.dismiss(), DismissOutcome::Exit);

    // Event loop teardown runs after the dismiss
    enforcement.shutdown();

    let lock = enforcement.input_lock();
    assert_eq!(lock.uninstalls, 1);
    assert!(lock.pointer_visible);
    assert!(enforcement.next_wakeup().is_none());
}

#[test]
fn test_release_sequence_idempotent() {
    let (mut enforcement, mut view, start) = started(1);
    enforcement.countdown_tick(start + Duration::from_secs(1), &mut view);
    enforcement.countdown_tick(start + Duration::from_secs(2), &mut view);
    enforcement.shutdown();
    enforcement.shutdown();

    assert_eq!(enforcement.phase(), Phase::Released);
    assert_eq!(enforcement.remaining_seconds(), 0);
    assert_eq!(view.dismiss_enable_count, 1);
    assert_eq!(enforcement.input_lock().uninstalls, 1);
    assert_eq!(enforcement.input_lock().installs, 1);
}

#[test]
fn test_minimize_reverted() {
    let (mut enforcement, mut view, _) = started(5);
    let raises = view.raises;

    enforcement.on_minimized(&mut view);

    assert_eq!(view.restores, 1);
    assert_eq!(view.raises, raises + 1);
    assert_eq!(enforcement.phase(), Phase::Locked);
}

#[test]
fn test_countdown_runs_when_platform_fails() {
    let mut enforcement = Enforcement::new(2, RecordingLock::failing());
    let mut view = RecordingView::new();
    let start = Instant::now();

    enforcement.begin(start, &mut view);
    assert_eq!(enforcement.phase(), Phase::Locked);
    assert!(!enforcement.input_lock().installed);

    run_until(&mut enforcement, &mut view, start, start + Duration::from_secs(2));
    assert_eq!(enforcement.phase(), Phase::Released);
    assert!(view.dismiss_enabled);
    assert_eq!(enforcement.dismiss(), DismissOutcome::Exit);
}

#[test]
fn test_no_screen_geometry_skips_pinning() {
    let mut enforcement = Enforcement::new(2, RecordingLock::new());
    let mut view = RecordingView::new();
    view.screen = None;

    enforcement.begin(Instant::now(), &mut view);

    assert!(view.centered_in.is_none());
    assert!(enforcement.input_lock().pins.is_empty());
    assert_eq!(enforcement.phase(), Phase::Locked);
}
