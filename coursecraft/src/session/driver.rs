/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Runtime driver for [`IdleSessionTimer`].
//!
//! [`SessionTimerHandle::spawn`] moves the timer into a tokio task that
//! sleeps until the timer's next deadline or the next host command,
//! whichever comes first.  State changes are published on a `watch`
//! channel; the task exits once the session is logged out or disposed.
//! Dropping the handle aborts the task, so no timer outlives its host.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use super::{IdleSessionTimer, LogoutReason, Phase, TimerEvent, TimerSnapshot};
use crate::audit::{AuditLevel, AuditSink};
use crate::config::{duration_ms, SessionSettings};

#[derive(Debug, Clone, Copy)]
enum Command {
    Activity,
    Stay,
    LogoutNow,
    Dispose,
}

/// Cheap, cloneable sender for user-activity signals (pointer moves, key
/// presses, scrolls).  Silently does nothing once the session has ended.
#[derive(Debug, Clone)]
pub struct ActivityNotifier {
    commands: mpsc::UnboundedSender<Command>,
}

impl ActivityNotifier {
    pub fn notify(&self) {
        let _ = self.commands.send(Command::Activity);
    }
}

/// Owner of a running idle-session timer.
pub struct SessionTimerHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<TimerSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl SessionTimerHandle {
    /// Start a timer on the current tokio runtime.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime.
    pub fn spawn(settings: SessionSettings) -> Self {
        Self::spawn_inner(settings, None)
    }

    /// Like [`spawn`](Self::spawn), and also reports logouts to `sink` as `user`.
    pub fn spawn_with_audit(
        settings: SessionSettings,
        sink: Arc<dyn AuditSink>,
        user: impl Into<String>,
    ) -> Self {
        Self::spawn_inner(settings, Some((sink, user.into())))
    }

    fn spawn_inner(settings: SessionSettings, audit: Option<(Arc<dyn AuditSink>, String)>) -> Self {
        let timer = IdleSessionTimer::new(settings, Instant::now().into_std());
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(timer.snapshot());

        info!(
            idle_ms = duration_ms(settings.idle_timeout),
            warning_ms = duration_ms(settings.warning_window),
            "session timer started"
        );
        let task = tokio::spawn(run(timer, cmd_rx, state_tx, audit));

        Self {
            commands: cmd_tx,
            state: state_rx,
            task: Some(task),
        }
    }

    // ── Host commands ─────────────────────────────────────────────────────────

    pub fn notify_activity(&self) {
        self.send(Command::Activity);
    }

    /// "Stay logged in" from the warning dialog.
    pub fn stay(&self) {
        self.send(Command::Stay);
    }

    /// "Log out now" from the warning dialog.
    pub fn logout_now(&self) {
        self.send(Command::LogoutNow);
    }

    pub fn activity_notifier(&self) -> ActivityNotifier {
        ActivityNotifier {
            commands: self.commands.clone(),
        }
    }

    // ── Observation ───────────────────────────────────────────────────────────

    /// Latest published state.
    pub fn snapshot(&self) -> TimerSnapshot {
        *self.state.borrow()
    }

    pub fn phase(&self) -> Phase {
        self.snapshot().phase
    }

    pub fn remaining_ms(&self) -> u64 {
        self.snapshot().remaining_ms
    }

    /// New receiver for state changes.
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.state.clone()
    }

    /// Wait until the timer reaches `phase`.  Returns `None` if the timer
    /// stopped in some other phase.
    pub async fn wait_for_phase(&self, phase: Phase) -> Option<TimerSnapshot> {
        let mut rx = self.state.clone();
        let snapshot = rx.wait_for(|s| s.phase == phase).await.ok()?;
        Some(*snapshot)
    }

    /// Stop tracking and wait for the background task to finish.  Does not
    /// log the user out.
    pub async fn dispose(mut self) {
        self.send(Command::Dispose);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("session timer task ended abnormally: {e}");
            }
        }
    }

    fn send(&self, cmd: Command) {
        if self.commands.send(cmd).is_err() {
            debug!(?cmd, "session timer already stopped; command ignored");
        }
    }
}

impl Drop for SessionTimerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for SessionTimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTimerHandle")
            .field("state", &*self.state.borrow())
            .field("running", &self.task.as_ref().map(|t| !t.is_finished()))
            .finish()
    }
}

// ── Background task ───────────────────────────────────────────────────────────

async fn run(
    mut timer: IdleSessionTimer,
    mut commands: mpsc::UnboundedReceiver<Command>,
    state: watch::Sender<TimerSnapshot>,
    audit: Option<(Arc<dyn AuditSink>, String)>,
) {
    while let Some(deadline) = timer.next_deadline() {
        let event = tokio::select! {
            cmd = commands.recv() => {
                let now = Instant::now().into_std();
                match cmd {
                    Some(Command::Activity) => {
                        if !timer.notify_activity(now) {
                            debug!(phase = %timer.phase(), "activity ignored");
                        }
                        None
                    }
                    Some(Command::Stay) => {
                        if timer.stay(now) {
                            info!("session extended by user");
                        } else {
                            debug!(phase = %timer.phase(), "stay ignored");
                        }
                        None
                    }
                    Some(Command::LogoutNow) => timer.logout_now(),
                    Some(Command::Dispose) | None => {
                        debug!("session timer disposed");
                        timer.dispose();
                        None
                    }
                }
            }
            _ = sleep_until(Instant::from_std(deadline)) => {
                timer.tick(Instant::now().into_std())
            }
        };

        if let Some(event) = event {
            report(&event, audit.as_ref());
        }

        let snapshot = timer.snapshot();
        state.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

fn report(event: &TimerEvent, audit: Option<&(Arc<dyn AuditSink>, String)>) {
    match *event {
        TimerEvent::WarningStarted { remaining_ms } => {
            info!(remaining_ms, "session idle; logout warning shown");
        }
        TimerEvent::Countdown { remaining_ms } => {
            debug!(remaining_ms, "logout countdown");
        }
        TimerEvent::LoggedOut { reason } => {
            let message = match reason {
                LogoutReason::Expired => "User logged out due to inactivity",
                LogoutReason::Requested => "User logged out from inactivity warning",
            };
            info!(?reason, "{message}");
            if let Some((sink, user)) = audit {
                let level = match reason {
                    LogoutReason::Expired => AuditLevel::Warning,
                    LogoutReason::Requested => AuditLevel::Info,
                };
                sink.record(level, message, user);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
