/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core course data structures for the CourseCraft timetable engine.
//!
//! Two distinct types model the two sides of the planning pipeline:
//!
//! ```text
//! catalog  ──(lookup)──►  Course  ──(planner)──►  ScheduledSlot  ──►  grid display
//!                          ↑ read-only                ↑ day / start hour / duration
//!                          never mutated              has_conflict derived by the planner
//! ```
//!
//! # Grid
//! The weekly grid is five [`Day`]s by eleven whole-hour start times
//! (`08:00` – `18:00`).  A slot occupies the half-open interval
//! `[start_hour, start_hour + duration_hours)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── Grid constants ────────────────────────────────────────────────────────────

/// First valid start hour on the grid (`08:00`).
pub const FIRST_START_HOUR: u32 = 8;

/// Last valid start hour on the grid (`18:00`).
pub const LAST_START_HOUR: u32 = 18;

/// Number of discrete start times per day.
pub const SLOTS_PER_DAY: usize = (LAST_START_HOUR - FIRST_START_HOUR + 1) as usize;

/// Duration the planner gives every newly placed course, in hours.
pub const DEFAULT_PLACEMENT_HOURS: u32 = 2;

/// Iterate the valid start hours in ascending order.
pub fn start_hours() -> impl Iterator<Item = u32> + Clone {
    FIRST_START_HOUR..=LAST_START_HOUR
}

/// Returns `true` if `hour` is one of the eleven grid start times.
pub fn is_grid_hour(hour: u32) -> bool {
    (FIRST_START_HOUR..=LAST_START_HOUR).contains(&hour)
}

/// Render a start hour the way the grid labels it (`9` → `"09:00"`).
pub fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}

/// Parse a grid label (`"09:00"`, `"9:00"` or `"9"`) back into an hour.
///
/// Only whole hours are accepted; the range is **not** checked here.
pub fn parse_hour(s: &str) -> Result<u32, ParseGridError> {
    let s = s.trim();
    let (h, m) = match s.split_once(':') {
        Some((h, m)) => (h, m),
        None => (s, "00"),
    };
    if m != "00" {
        return Err(ParseGridError::Hour(s.to_string()));
    }
    h.parse::<u32>()
        .ok()
        .filter(|h| *h < 24)
        .ok_or_else(|| ParseGridError::Hour(s.to_string()))
}

/// Failure to parse a day name or a start time from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseGridError {
    #[error("unknown day '{0}' (expected Monday..Friday)")]
    Day(String),
    #[error("invalid start time '{0}' (expected a whole hour such as 09:00)")]
    Hour(String),
}

// ── Day ───────────────────────────────────────────────────────────────────────

/// Teaching day.  The declaration order is the placement search order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Day {
    /// All days in grid order.
    pub const ALL: [Day; 5] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = ParseGridError;

    /// Case-insensitive; accepts full names and three-letter abbreviations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Day::ALL
            .into_iter()
            .find(|d| {
                let name = d.name().to_ascii_lowercase();
                lower == name || (lower.len() == 3 && name.starts_with(&lower))
            })
            .ok_or_else(|| ParseGridError::Day(s.to_string()))
    }
}

// ── Department ────────────────────────────────────────────────────────────────

/// Academic department offering a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Computer Science")]
    ComputerScience,
    Mathematics,
    Physics,
    Humanities,
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Department::ComputerScience => "Computer Science",
            Department::Mathematics => "Mathematics",
            Department::Physics => "Physics",
            Department::Humanities => "Humanities",
        })
    }
}

// ── Course (catalog entry) ────────────────────────────────────────────────────

/// A catalog course.  Immutable once retrieved; the planner only copies it
/// into [`ScheduledSlot`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique key.  A course can be placed at most once per timetable.
    pub id: String,
    /// Display code, e.g. `CS101`.
    pub code: String,
    pub title: String,
    /// Positive credit count.
    pub credits: u32,
    pub department: Department,
    #[serde(default)]
    pub description: String,
}

// ── ScheduledSlot (placed course) ─────────────────────────────────────────────

/// A course placed on the grid.
///
/// `has_conflict` is derived: it is overwritten by
/// [`recompute_conflicts`](crate::planner::recompute_conflicts) after every
/// planner mutation, so any value a caller sets by hand is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSlot {
    #[serde(flatten)]
    pub course: Course,
    pub day: Day,
    /// Start hour (24h clock).  Grid values are `8..=18`; values coming from
    /// external data are not validated.
    pub start_hour: u32,
    /// Positive duration in whole hours.
    pub duration_hours: u32,
    #[serde(default)]
    pub has_conflict: bool,
}

impl ScheduledSlot {
    /// Place `course` at `(day, start_hour)` for `duration_hours`.
    pub fn new(course: Course, day: Day, start_hour: u32, duration_hours: u32) -> Self {
        Self {
            course,
            day,
            start_hour,
            duration_hours,
            has_conflict: false,
        }
    }

    /// Identifier of the originating course.
    pub fn id(&self) -> &str {
        &self.course.id
    }

    pub fn credits(&self) -> u32 {
        self.course.credits
    }

    /// Exclusive end hour of the occupied interval.
    pub fn end_hour(&self) -> u32 {
        self.start_hour.saturating_add(self.duration_hours)
    }

    /// Returns `true` when the slot starts on a grid cell.
    pub fn is_on_grid(&self) -> bool {
        is_grid_hour(self.start_hour)
    }
}

impl fmt::Display for ScheduledSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}-{}",
            self.course.code,
            self.day,
            format_hour(self.start_hour),
            format_hour(self.end_hour()),
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: &str) -> Course {
        Course {
            id: id.into(),
            code: id.to_uppercase(),
            title: format!("Course {id}"),
            credits: 3,
            department: Department::Mathematics,
            description: String::new(),
        }
    }

    // ── Grid ──────────────────────────────────────────────────────────────────

    #[test]
    fn grid_has_eleven_start_hours() {
        assert_eq!(SLOTS_PER_DAY, 11);
        let hours: Vec<u32> = start_hours().collect();
        assert_eq!(hours.first(), Some(&8));
        assert_eq!(hours.last(), Some(&18));
        assert_eq!(hours.len(), SLOTS_PER_DAY);
    }

    #[test]
    fn grid_hour_bounds() {
        assert!(!is_grid_hour(7));
        assert!(is_grid_hour(8));
        assert!(is_grid_hour(18));
        assert!(!is_grid_hour(19));
    }

    #[test]
    fn hour_formats_with_leading_zero() {
        assert_eq!(format_hour(9), "09:00");
        assert_eq!(format_hour(14), "14:00");
    }

    #[test]
    fn parse_hour_accepts_labels() {
        assert_eq!(parse_hour("09:00"), Ok(9));
        assert_eq!(parse_hour("9:00"), Ok(9));
        assert_eq!(parse_hour("13"), Ok(13));
    }

    #[test]
    fn parse_hour_rejects_minutes_and_garbage() {
        assert!(parse_hour("09:30").is_err());
        assert!(parse_hour("noon").is_err());
        assert!(parse_hour("25:00").is_err());
    }

    // ── Day ───────────────────────────────────────────────────────────────────

    #[test]
    fn days_are_ordered_monday_first() {
        assert!(Day::Monday < Day::Tuesday);
        assert!(Day::Thursday < Day::Friday);
        assert_eq!(Day::ALL[0], Day::Monday);
        assert_eq!(Day::ALL[4], Day::Friday);
    }

    #[test]
    fn day_parses_names_and_abbreviations() {
        assert_eq!("Monday".parse::<Day>(), Ok(Day::Monday));
        assert_eq!("wednesday".parse::<Day>(), Ok(Day::Wednesday));
        assert_eq!("fri".parse::<Day>(), Ok(Day::Friday));
        assert!("Saturday".parse::<Day>().is_err());
    }

    // ── Department ────────────────────────────────────────────────────────────

    #[test]
    fn department_deserializes_display_names() {
        let d: Department = serde_yaml::from_str("Computer Science").unwrap();
        assert_eq!(d, Department::ComputerScience);
        assert_eq!(d.to_string(), "Computer Science");
    }

    // ── ScheduledSlot ─────────────────────────────────────────────────────────

    #[test]
    fn new_slot_starts_without_conflict() {
        let slot = ScheduledSlot::new(course("cs101"), Day::Monday, 8, 2);
        assert!(!slot.has_conflict);
        assert_eq!(slot.id(), "cs101");
        assert_eq!(slot.end_hour(), 10);
        assert!(slot.is_on_grid());
    }

    #[test]
    fn end_hour_saturates() {
        let slot = ScheduledSlot::new(course("x"), Day::Monday, u32::MAX - 1, 5);
        assert_eq!(slot.end_hour(), u32::MAX);
    }

    #[test]
    fn slot_display_shows_interval() {
        let slot = ScheduledSlot::new(course("ma201"), Day::Tuesday, 9, 2);
        assert_eq!(slot.to_string(), "MA201 Tuesday 09:00-11:00");
    }
}
