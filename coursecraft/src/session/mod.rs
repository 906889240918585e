/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Idle-session expiry.
//!
//! [`IdleSessionTimer`] is a pure state machine: every method takes the
//! current instant from the caller, so it can be driven by a real runtime
//! ([`driver::SessionTimerHandle`]) or stepped by hand in tests.
//!
//! ```text
//!            activity (resets idle clock)
//!              ┌──────┐
//!              ▼      │
//!   ──►  Counting ────┘ ── idle_timeout elapsed ──►  Warning
//!           ▲                                        │  │
//!           └──────────────── stay() ────────────────┘  │ remaining reaches 0
//!                                                       ▼
//!          any non-terminal ── logout_now() ──────►  LoggedOut (terminal)
//! ```
//!
//! Invalid calls (e.g. `stay()` while `Counting`, anything after logout) are
//! silent no-ops.  The timer never fails.

pub mod driver;

pub use driver::{ActivityNotifier, SessionTimerHandle};

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::{duration_ms, SessionSettings};

/// Timer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Waiting for the idle timeout; activity restarts the wait.
    Counting,
    /// Countdown visible to the user.
    Warning,
    /// Terminal.
    LoggedOut,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Counting => "counting",
            Phase::Warning => "warning",
            Phase::LoggedOut => "logged out",
        })
    }
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogoutReason {
    /// The warning countdown reached zero.
    Expired,
    /// The user chose "log out now".
    Requested,
}

/// Something the host may want to react to, produced by [`IdleSessionTimer::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    WarningStarted { remaining_ms: u64 },
    Countdown { remaining_ms: u64 },
    LoggedOut { reason: LogoutReason },
}

/// Observable state, as published to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerSnapshot {
    pub phase: Phase,
    pub active: bool,
    pub remaining_ms: u64,
}

/// Countdown / warning / logout state machine.
#[derive(Debug, Clone)]
pub struct IdleSessionTimer {
    settings: SessionSettings,
    phase: Phase,
    active: bool,
    last_activity: Instant,
    /// Instant the current warning began; `Some` only in `Warning`.
    warning_since: Option<Instant>,
    /// Whole ticks already counted down in the current warning.
    ticks_elapsed: u64,
    remaining_ms: u64,
}

impl IdleSessionTimer {
    /// Start counting from `now`.
    pub fn new(settings: SessionSettings, now: Instant) -> Self {
        Self {
            settings,
            phase: Phase::Counting,
            active: true,
            last_activity: now,
            warning_since: None,
            ticks_elapsed: 0,
            remaining_ms: window_ms(&settings),
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// `false` once logged out or disposed.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Countdown value.  Only meaningful in `Warning`; reads the full window
    /// while counting and `0` after logout.
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            phase: self.phase,
            active: self.active,
            remaining_ms: self.remaining_ms,
        }
    }

    /// Instant at which [`tick`](Self::tick) next has something to do, or
    /// `None` when the timer is stopped.
    pub fn next_deadline(&self) -> Option<Instant> {
        if !self.active {
            return None;
        }
        match self.phase {
            Phase::Counting => Some(self.last_activity + self.settings.idle_timeout),
            Phase::Warning => {
                let since = self.warning_since?;
                let step = tick_ms(&self.settings);
                Some(since + Duration::from_millis(step.saturating_mul(self.ticks_elapsed + 1)))
            }
            Phase::LoggedOut => None,
        }
    }

    // ── Inputs ────────────────────────────────────────────────────────────────

    /// User activity.  Restarts the idle clock while counting; ignored in
    /// every other state.  Returns `true` if it was taken into account.
    pub fn notify_activity(&mut self, now: Instant) -> bool {
        if self.active && self.phase == Phase::Counting {
            self.last_activity = now;
            true
        } else {
            false
        }
    }

    /// User confirmed presence during the warning.  Returns to `Counting`
    /// with a fresh idle clock.  Returns `true` if the warning was cancelled.
    pub fn stay(&mut self, now: Instant) -> bool {
        if !self.active || self.phase != Phase::Warning {
            return false;
        }
        self.phase = Phase::Counting;
        self.last_activity = now;
        self.warning_since = None;
        self.ticks_elapsed = 0;
        self.remaining_ms = window_ms(&self.settings);
        true
    }

    /// Log out immediately from any non-terminal state.
    pub fn logout_now(&mut self) -> Option<TimerEvent> {
        if !self.active {
            return None;
        }
        self.enter_logged_out();
        Some(TimerEvent::LoggedOut {
            reason: LogoutReason::Requested,
        })
    }

    /// Stop tracking without logging out (host teardown).
    pub fn dispose(&mut self) {
        self.active = false;
        self.warning_since = None;
    }

    /// Advance the machine to `now`.
    ///
    /// The countdown is derived from the instant the warning began, so a
    /// late call catches up instead of drifting.  A call that arrives after
    /// the whole warning window has passed goes straight to `LoggedOut`.
    pub fn tick(&mut self, now: Instant) -> Option<TimerEvent> {
        if !self.active {
            return None;
        }
        match self.phase {
            Phase::Counting => {
                let deadline = self.last_activity + self.settings.idle_timeout;
                if now < deadline {
                    return None;
                }
                self.phase = Phase::Warning;
                self.warning_since = Some(deadline);
                self.ticks_elapsed = 0;
                self.remaining_ms = window_ms(&self.settings);

                match self.advance_countdown(now) {
                    Some(ev @ TimerEvent::LoggedOut { .. }) => Some(ev),
                    _ => Some(TimerEvent::WarningStarted {
                        remaining_ms: self.remaining_ms,
                    }),
                }
            }
            Phase::Warning => self.advance_countdown(now),
            Phase::LoggedOut => None,
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn advance_countdown(&mut self, now: Instant) -> Option<TimerEvent> {
        let since = self.warning_since?;
        let step = tick_ms(&self.settings);
        let elapsed_ms = duration_ms(now.saturating_duration_since(since));
        let ticks = elapsed_ms / step;
        if ticks == self.ticks_elapsed {
            return None;
        }

        self.ticks_elapsed = ticks;
        self.remaining_ms = window_ms(&self.settings).saturating_sub(ticks.saturating_mul(step));

        if self.remaining_ms == 0 {
            self.enter_logged_out();
            Some(TimerEvent::LoggedOut {
                reason: LogoutReason::Expired,
            })
        } else {
            Some(TimerEvent::Countdown {
                remaining_ms: self.remaining_ms,
            })
        }
    }

    fn enter_logged_out(&mut self) {
        self.phase = Phase::LoggedOut;
        self.active = false;
        self.warning_since = None;
        self.remaining_ms = 0;
    }
}

fn window_ms(settings: &SessionSettings) -> u64 {
    duration_ms(settings.warning_window)
}

/// Tick length in ms, never zero.
fn tick_ms(settings: &SessionSettings) -> u64 {
    duration_ms(settings.tick).max(1)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Duration = Duration::from_secs(60);
    const SEC: Duration = Duration::from_secs(1);

    fn timer() -> (IdleSessionTimer, Instant) {
        let t0 = Instant::now();
        (IdleSessionTimer::new(SessionSettings::default(), t0), t0)
    }

    /// Drive `timer` one tick deadline at a time until it stops or `limit`.
    fn run_until(timer: &mut IdleSessionTimer, limit: Instant) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        while let Some(d) = timer.next_deadline() {
            if d > limit {
                break;
            }
            if let Some(ev) = timer.tick(d) {
                events.push(ev);
            }
        }
        events
    }

    // ── Counting ──────────────────────────────────────────────────────────────

    #[test]
    fn starts_counting_and_active() {
        let (t, t0) = timer();
        assert_eq!(t.phase(), Phase::Counting);
        assert!(t.is_active());
        assert_eq!(t.next_deadline(), Some(t0 + 15 * MIN));
    }

    #[test]
    fn no_warning_before_idle_timeout() {
        let (mut t, t0) = timer();
        assert_eq!(t.tick(t0 + 15 * MIN - SEC), None);
        assert_eq!(t.phase(), Phase::Counting);
    }

    #[test]
    fn idle_timeout_enters_warning_with_full_window() {
        let (mut t, t0) = timer();
        let ev = t.tick(t0 + 15 * MIN);
        assert_eq!(ev, Some(TimerEvent::WarningStarted { remaining_ms: 30_000 }));
        assert_eq!(t.phase(), Phase::Warning);
        assert_eq!(t.remaining_ms(), 30_000);
    }

    #[test]
    fn activity_resets_idle_clock_without_phase_change() {
        let (mut t, t0) = timer();
        assert!(t.notify_activity(t0 + 10 * MIN));
        assert_eq!(t.phase(), Phase::Counting);
        assert_eq!(t.tick(t0 + 15 * MIN), None);
        assert_eq!(t.next_deadline(), Some(t0 + 25 * MIN));
        assert!(matches!(
            t.tick(t0 + 25 * MIN),
            Some(TimerEvent::WarningStarted { .. })
        ));
    }

    #[test]
    fn stay_while_counting_is_noop() {
        let (mut t, t0) = timer();
        assert!(!t.stay(t0 + MIN));
        assert_eq!(t.next_deadline(), Some(t0 + 15 * MIN));
    }

    // ── Warning ───────────────────────────────────────────────────────────────

    #[test]
    fn countdown_drops_one_second_per_tick() {
        let (mut t, t0) = timer();
        let warn_at = t0 + 15 * MIN;
        t.tick(warn_at);

        assert_eq!(t.next_deadline(), Some(warn_at + SEC));
        assert_eq!(
            t.tick(warn_at + SEC),
            Some(TimerEvent::Countdown { remaining_ms: 29_000 })
        );
        assert_eq!(
            t.tick(warn_at + 2 * SEC),
            Some(TimerEvent::Countdown { remaining_ms: 28_000 })
        );
        // Mid-tick call changes nothing
        assert_eq!(t.tick(warn_at + 2 * SEC + Duration::from_millis(400)), None);
        assert_eq!(t.remaining_ms(), 28_000);
    }

    #[test]
    fn countdown_reaching_zero_logs_out() {
        let (mut t, t0) = timer();
        let events = run_until(&mut t, t0 + 20 * MIN);

        assert_eq!(events.first(), Some(&TimerEvent::WarningStarted { remaining_ms: 30_000 }));
        assert_eq!(
            events.last(),
            Some(&TimerEvent::LoggedOut { reason: LogoutReason::Expired })
        );
        // 1 warning + 29 countdown ticks (29000..=1000) + logout
        assert_eq!(events.len(), 31);
        assert_eq!(t.phase(), Phase::LoggedOut);
        assert!(!t.is_active());
        assert_eq!(t.remaining_ms(), 0);
        assert_eq!(t.next_deadline(), None);
    }

    #[test]
    fn late_tick_catches_up() {
        let (mut t, t0) = timer();
        t.tick(t0 + 15 * MIN);
        let ev = t.tick(t0 + 15 * MIN + 10 * SEC + Duration::from_millis(300));
        assert_eq!(ev, Some(TimerEvent::Countdown { remaining_ms: 20_000 }));
    }

    #[test]
    fn very_late_first_tick_goes_straight_to_logout() {
        let (mut t, t0) = timer();
        let ev = t.tick(t0 + 60 * MIN);
        assert_eq!(ev, Some(TimerEvent::LoggedOut { reason: LogoutReason::Expired }));
        assert_eq!(t.phase(), Phase::LoggedOut);
    }

    #[test]
    fn activity_during_warning_is_ignored() {
        let (mut t, t0) = timer();
        t.tick(t0 + 15 * MIN);
        assert!(!t.notify_activity(t0 + 15 * MIN + SEC));
        assert_eq!(t.phase(), Phase::Warning);
    }

    #[test]
    fn stay_returns_to_counting_and_resets() {
        let (mut t, t0) = timer();
        t.tick(t0 + 15 * MIN);
        t.tick(t0 + 15 * MIN + 5 * SEC);
        assert_eq!(t.remaining_ms(), 25_000);

        let stay_at = t0 + 15 * MIN + 5 * SEC + Duration::from_millis(200);
        assert!(t.stay(stay_at));
        assert_eq!(t.phase(), Phase::Counting);
        assert_eq!(t.remaining_ms(), 30_000);
        assert_eq!(t.next_deadline(), Some(stay_at + 15 * MIN));

        // Next cycle starts a fresh 30s window
        let ev = t.tick(stay_at + 15 * MIN);
        assert_eq!(ev, Some(TimerEvent::WarningStarted { remaining_ms: 30_000 }));
    }

    // ── logout_now / dispose ──────────────────────────────────────────────────

    #[test]
    fn logout_now_from_counting_and_warning() {
        let (mut t, _) = timer();
        assert_eq!(
            t.logout_now(),
            Some(TimerEvent::LoggedOut { reason: LogoutReason::Requested })
        );
        assert_eq!(t.phase(), Phase::LoggedOut);

        let (mut t, t0) = timer();
        t.tick(t0 + 15 * MIN);
        assert!(t.logout_now().is_some());
        assert_eq!(t.phase(), Phase::LoggedOut);
    }

    #[test]
    fn everything_is_noop_after_logout() {
        let (mut t, t0) = timer();
        t.logout_now();
        let before = t.snapshot();

        assert!(!t.notify_activity(t0 + SEC));
        assert!(!t.stay(t0 + SEC));
        assert_eq!(t.logout_now(), None);
        assert_eq!(t.tick(t0 + 60 * MIN), None);
        assert_eq!(t.snapshot(), before);
    }

    #[test]
    fn dispose_stops_tracking_without_logout() {
        let (mut t, t0) = timer();
        t.dispose();
        assert!(!t.is_active());
        assert_eq!(t.phase(), Phase::Counting);
        assert_eq!(t.next_deadline(), None);
        assert_eq!(t.tick(t0 + 60 * MIN), None);
        assert!(!t.notify_activity(t0 + SEC));
    }

    #[test]
    fn uneven_window_saturates_to_zero() {
        let settings = SessionSettings {
            idle_timeout: SEC,
            warning_window: Duration::from_millis(2_500),
            tick: SEC,
        };
        let t0 = Instant::now();
        let mut t = IdleSessionTimer::new(settings, t0);
        let events = run_until(&mut t, t0 + MIN);
        assert_eq!(
            events,
            vec![
                TimerEvent::WarningStarted { remaining_ms: 2_500 },
                TimerEvent::Countdown { remaining_ms: 1_500 },
                TimerEvent::Countdown { remaining_ms: 500 },
                TimerEvent::LoggedOut { reason: LogoutReason::Expired },
            ]
        );
    }
}
