//! Timetable planner for CourseCraft.
//!
//! The planner keeps one student's working set of [`ScheduledSlot`]s and
//! guarantees that `has_conflict` is correct for every slot after every
//! mutation.
//!
//! Two layers:
//!
//! * Pure functions ([`add_course`], [`remove_course`], [`move_course`],
//!   [`recompute_conflicts`]) take the current set by reference and return a
//!   brand-new annotated set.  On error nothing is returned, so the caller's
//!   set is unchanged by construction.
//! * [`SchedulePlanner`] owns a set for a session and adopts whatever the
//!   pure functions return.  It adds logging and optional audit reporting.
//!
//! # Placement
//! `add` is first-fit: days Monday → Friday (outer), start hours 08:00 →
//! 18:00 (inner); the first cell where the new slot overlaps nothing wins.
//! `move` never rejects an overlapping destination; conflicts are shown to
//! the student, not enforced.
//!
//! # Example
//! ```rust
//! use coursecraft::config::PlannerSettings;
//! use coursecraft::course::{Course, Day, Department};
//! use coursecraft::planner::SchedulePlanner;
//!
//! let course = Course {
//!     id: "cs101".into(),
//!     code: "CS101".into(),
//!     title: "Intro".into(),
//!     credits: 4,
//!     department: Department::ComputerScience,
//!     description: String::new(),
//! };
//!
//! let mut planner = SchedulePlanner::new(PlannerSettings::default());
//! let slot = planner.add(&course).unwrap();
//! assert_eq!((slot.day, slot.start_hour), (Day::Monday, 8));
//! ```

pub mod conflict;
pub mod credits;
pub mod error;

pub use conflict::{conflict_pairs, overlaps, recompute_conflicts};
pub use credits::{CreditLimits, CreditStatus, CreditSummary};
pub use error::PlannerError;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::audit::{AuditLevel, AuditSink};
use crate::catalog::CourseLookup;
use crate::config::PlannerSettings;
use crate::course::{format_hour, is_grid_hour, start_hours, Course, Day, ScheduledSlot};

// ─────────────────────────────────────────────────────────────────────────────
// Pure operations
// ─────────────────────────────────────────────────────────────────────────────

/// First `(day, start_hour)` on the grid where a `duration_hours` slot
/// overlaps nothing in `slots`.
pub fn find_open_slot(slots: &[ScheduledSlot], duration_hours: u32) -> Option<(Day, u32)> {
    for day in Day::ALL {
        for hour in start_hours() {
            if cell_is_free(slots, day, hour, duration_hours) {
                debug!(day = %day, hour = %format_hour(hour), "open cell found");
                return Some((day, hour));
            }
            debug!(day = %day, hour = %format_hour(hour), "cell occupied");
        }
    }
    None
}

/// Place `course` at the first open cell and return the new annotated set.
///
/// # Errors
/// * [`PlannerError::DuplicateCourse`]: `course.id` is already placed.
/// * [`PlannerError::NoAvailableSlot`]: all 55 cells would overlap.
pub fn add_course(
    course: &Course,
    slots: &[ScheduledSlot],
    duration_hours: u32,
) -> Result<Vec<ScheduledSlot>, PlannerError> {
    if slots.iter().any(|s| s.id() == course.id) {
        return Err(PlannerError::DuplicateCourse {
            course: course.id.clone(),
        });
    }

    let (day, hour) =
        find_open_slot(slots, duration_hours).ok_or_else(|| PlannerError::NoAvailableSlot {
            course: course.id.clone(),
            duration_hours,
        })?;

    let mut next = slots.to_vec();
    next.push(ScheduledSlot::new(course.clone(), day, hour, duration_hours));
    Ok(recompute_conflicts(next))
}

/// Drop the slot with `course_id` (if any) and return the new annotated set.
///
/// Removing an absent id is a no-op, so removal is safe to retry.
pub fn remove_course(course_id: &str, slots: &[ScheduledSlot]) -> Vec<ScheduledSlot> {
    let next: Vec<ScheduledSlot> = slots
        .iter()
        .filter(|s| s.id() != course_id)
        .cloned()
        .collect();
    recompute_conflicts(next)
}

/// Relocate `course_id` to `(day, start_hour)`, keeping its duration, and
/// return the new annotated set.
///
/// Overlapping destinations are accepted.  Off-grid coordinates are not
/// checked here.
///
/// # Errors
/// [`PlannerError::SlotNotFound`] when `course_id` is not in `slots`.
pub fn move_course(
    course_id: &str,
    day: Day,
    start_hour: u32,
    slots: &[ScheduledSlot],
) -> Result<Vec<ScheduledSlot>, PlannerError> {
    if !slots.iter().any(|s| s.id() == course_id) {
        return Err(PlannerError::SlotNotFound {
            course: course_id.to_string(),
        });
    }

    let next: Vec<ScheduledSlot> = slots
        .iter()
        .map(|s| {
            if s.id() == course_id {
                ScheduledSlot {
                    day,
                    start_hour,
                    ..s.clone()
                }
            } else {
                s.clone()
            }
        })
        .collect();
    Ok(recompute_conflicts(next))
}

/// Same half-open interval test as [`overlaps`], against a not-yet-built slot.
fn cell_is_free(slots: &[ScheduledSlot], day: Day, start_hour: u32, duration_hours: u32) -> bool {
    let end = start_hour.saturating_add(duration_hours);
    !slots
        .iter()
        .any(|s| s.day == day && start_hour < s.end_hour() && s.start_hour < end)
}

// ─────────────────────────────────────────────────────────────────────────────
// SchedulePlanner
// ─────────────────────────────────────────────────────────────────────────────

/// Owner of one session's timetable.
///
/// Mutations are expected one at a time from the host's event loop; a
/// multi-threaded host must wrap the planner in its own lock.
pub struct SchedulePlanner {
    settings: PlannerSettings,
    slots: Vec<ScheduledSlot>,
    audit: Option<Arc<dyn AuditSink>>,
    user: String,
}

impl SchedulePlanner {
    /// Empty timetable.
    pub fn new(settings: PlannerSettings) -> Self {
        Self {
            settings,
            slots: Vec::new(),
            audit: None,
            user: String::new(),
        }
    }

    /// Start from slots supplied by the host (e.g. a saved draft).  Conflict
    /// flags are recomputed; whatever the input carried is ignored.
    ///
    /// # Errors
    /// [`PlannerError::DuplicateCourse`] for the first id that appears twice.
    pub fn from_slots(
        settings: PlannerSettings,
        slots: Vec<ScheduledSlot>,
    ) -> Result<Self, PlannerError> {
        let mut seen = HashSet::new();
        if let Some(dup) = slots.iter().find(|s| !seen.insert(s.id())) {
            warn!(course = %dup.id(), "working set contains a repeated course");
            return Err(PlannerError::DuplicateCourse {
                course: dup.id().to_string(),
            });
        }

        Ok(Self {
            slots: recompute_conflicts(slots),
            ..Self::new(settings)
        })
    }

    /// Report mutations to `sink`, attributed to `user`.
    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>, user: impl Into<String>) -> Self {
        self.audit = Some(sink);
        self.user = user.into();
        self
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    /// The authoritative working set, in insertion order.
    pub fn slots(&self) -> &[ScheduledSlot] {
        &self.slots
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, course_id: &str) -> Option<&ScheduledSlot> {
        self.slots.iter().find(|s| s.id() == course_id)
    }

    /// Slot starting at `(day, start_hour)`, if any.
    pub fn slot_at(&self, day: Day, start_hour: u32) -> Option<&ScheduledSlot> {
        self.slots
            .iter()
            .find(|s| s.day == day && s.start_hour == start_hour)
    }

    pub fn has_conflicts(&self) -> bool {
        self.slots.iter().any(|s| s.has_conflict)
    }

    /// Overlapping pairs, see [`conflict_pairs`].
    pub fn conflict_pairs(&self) -> Vec<(&ScheduledSlot, &ScheduledSlot)> {
        conflict_pairs(&self.slots)
    }

    pub fn credit_total(&self) -> u32 {
        credits::credit_total(&self.slots)
    }

    pub fn credit_summary(&self) -> CreditSummary {
        credits::summarize(&self.slots, &self.settings.credit_limits)
    }

    // ── Mutations ─────────────────────────────────────────────────────────────

    /// First-fit placement of `course`.  Returns the new slot.
    pub fn add(&mut self, course: &Course) -> Result<&ScheduledSlot, PlannerError> {
        let duration = self.settings.placement_duration_hours;
        match add_course(course, &self.slots, duration) {
            Ok(next) => {
                self.slots = next;
                let idx = self.slots.len() - 1;
                let slot = &self.slots[idx];
                info!(
                    course = %slot.id(),
                    day = %slot.day,
                    start = %format_hour(slot.start_hour),
                    duration_h = slot.duration_hours,
                    total_credits = credits::credit_total(&self.slots),
                    "course added"
                );
                if let Some(sink) = &self.audit {
                    sink.record(AuditLevel::Info, &format!("Added {slot}"), &self.user);
                }
                Ok(&self.slots[idx])
            }
            Err(e) => {
                warn!(course = %course.id, error = %e, "add rejected");
                self.record(AuditLevel::Warning, &format!("Add rejected: {e}"));
                Err(e)
            }
        }
    }

    /// Resolve `course_id` through `catalog`, then [`add`](Self::add) it.
    pub fn add_by_id<L: CourseLookup + ?Sized>(
        &mut self,
        course_id: &str,
        catalog: &L,
    ) -> Result<&ScheduledSlot, PlannerError> {
        let course = catalog
            .get_course(course_id)
            .ok_or_else(|| PlannerError::CourseNotFound {
                course: course_id.to_string(),
            })?
            .clone();
        self.add(&course)
    }

    /// Remove `course_id`.  Returns `true` if a slot was removed; an absent
    /// id leaves the timetable as it was.
    pub fn remove(&mut self, course_id: &str) -> bool {
        let before = self.slots.len();
        self.slots = remove_course(course_id, &self.slots);
        let removed = self.slots.len() < before;

        if removed {
            info!(course = %course_id, remaining = self.slots.len(), "course removed");
            self.record(AuditLevel::Info, &format!("Removed {course_id}"));
        } else {
            debug!(course = %course_id, "remove of absent course ignored");
        }
        removed
    }

    /// Relocate `course_id` to `(day, start_hour)`.
    ///
    /// Overlap with other slots is allowed and flagged.  An off-grid
    /// `start_hour` is accepted with a warning.
    pub fn move_to(
        &mut self,
        course_id: &str,
        day: Day,
        start_hour: u32,
    ) -> Result<&ScheduledSlot, PlannerError> {
        let next = match move_course(course_id, day, start_hour, &self.slots) {
            Ok(next) => next,
            Err(e) => {
                warn!(course = %course_id, error = %e, "move rejected");
                self.record(AuditLevel::Warning, &format!("Move rejected: {e}"));
                return Err(e);
            }
        };

        if !is_grid_hour(start_hour) {
            warn!(
                course = %course_id,
                hour = start_hour,
                "move target is outside the 08:00-18:00 grid"
            );
        }
        self.slots = next;

        let idx = self
            .slots
            .iter()
            .position(|s| s.id() == course_id)
            .ok_or_else(|| PlannerError::SlotNotFound {
                course: course_id.to_string(),
            })?;
        let slot = &self.slots[idx];

        info!(
            course = %course_id,
            day = %day,
            start = %format_hour(start_hour),
            conflict = slot.has_conflict,
            "course moved"
        );
        if let Some(sink) = &self.audit {
            let level = if slot.has_conflict {
                AuditLevel::Warning
            } else {
                AuditLevel::Info
            };
            let suffix = if slot.has_conflict { " (conflict)" } else { "" };
            sink.record(level, &format!("Moved {slot}{suffix}"), &self.user);
        }
        Ok(&self.slots[idx])
    }

    /// Drop every slot.
    pub fn clear(&mut self) {
        if !self.slots.is_empty() {
            info!("Cleared {} slot(s)", self.slots.len());
            self.slots.clear();
        }
    }

    /// Hand the working set back to the host.
    pub fn into_slots(self) -> Vec<ScheduledSlot> {
        self.slots
    }

    fn record(&self, level: AuditLevel, message: &str) {
        if let Some(sink) = &self.audit {
            sink.record(level, message, &self.user);
        }
    }
}

impl fmt::Debug for SchedulePlanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulePlanner")
            .field("settings", &self.settings)
            .field("slots", &self.slots)
            .field("audit", &self.audit.is_some())
            .field("user", &self.user)
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
