/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for the timetable planner.
//!
//! Every variant is recoverable: the working set is left untouched and the
//! host is expected to surface a notice to the student.
//!
//! | Variant | Raised by | Host treatment |
//! |---|---|---|
//! | `DuplicateCourse` | `add` | "already in your timetable" notice |
//! | `NoAvailableSlot` | `add` | "no free slot" notice |
//! | `SlotNotFound` | `move` | stale drag source, refresh the grid |
//! | `CourseNotFound` | `add_by_id` | catalog entry vanished |
//!
//! Overlapping placement produced by `move` is **not** an error; it is
//! represented by `has_conflict` on the affected slots.

use thiserror::Error;

/// Error returned from the planner mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// The course is already placed in the timetable.
    #[error("course '{course}' is already in the timetable")]
    DuplicateCourse { course: String },

    /// No `(day, start hour)` cell on the grid can hold the course without
    /// overlapping an existing slot.
    #[error("no conflict-free {duration_hours}h slot left in the week for course '{course}'")]
    NoAvailableSlot { course: String, duration_hours: u32 },

    /// `move` referenced an identifier that is not in the working set.
    #[error("course '{course}' is not in the timetable")]
    SlotNotFound { course: String },

    /// The catalog lookup did not know the requested identifier.
    #[error("course '{course}' not found in the catalog")]
    CourseNotFound { course: String },
}

impl PlannerError {
    /// Identifier of the course the error refers to.
    pub fn course(&self) -> &str {
        match self {
            PlannerError::DuplicateCourse { course }
            | PlannerError::NoAvailableSlot { course, .. }
            | PlannerError::SlotNotFound { course }
            | PlannerError::CourseNotFound { course } => course,
        }
    }
}
