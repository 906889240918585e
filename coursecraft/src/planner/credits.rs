/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Credit-load checks for a timetable.
//!
//! The credit total is a pure derived query over the working set.  It is
//! classified against an inclusive `[min, max]` band:
//!
//! | Total | Status |
//! |---|---|
//! | `< min` | `BelowMin` |
//! | `min ..= max` | `Ok` |
//! | `> max` | `AboveMax` |
//!
//! The band is advisory: the planner never refuses a mutation because of it.

use std::fmt;

use serde::Serialize;

use crate::course::ScheduledSlot;

/// Default lower bound of a valid semester load.
pub const DEFAULT_MIN_CREDITS: u32 = 17;

/// Default upper bound of a valid semester load.
pub const DEFAULT_MAX_CREDITS: u32 = 27;

/// Where a credit total sits relative to [`CreditLimits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CreditStatus {
    BelowMin,
    Ok,
    AboveMax,
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CreditStatus::BelowMin => "below minimum",
            CreditStatus::Ok => "ok",
            CreditStatus::AboveMax => "above maximum",
        })
    }
}

/// Inclusive credit band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditLimits {
    pub min: u32,
    pub max: u32,
}

impl CreditLimits {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn classify(&self, total: u32) -> CreditStatus {
        if total < self.min {
            CreditStatus::BelowMin
        } else if total > self.max {
            CreditStatus::AboveMax
        } else {
            CreditStatus::Ok
        }
    }
}

impl Default for CreditLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CREDITS, DEFAULT_MAX_CREDITS)
    }
}

/// Total plus classification, as shown next to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CreditSummary {
    pub total: u32,
    pub status: CreditStatus,
}

/// Sum of credits over every slot in the set.
pub fn credit_total(slots: &[ScheduledSlot]) -> u32 {
    slots.iter().map(ScheduledSlot::credits).sum()
}

/// Total and status of `slots` against `limits`.
pub fn summarize(slots: &[ScheduledSlot], limits: &CreditLimits) -> CreditSummary {
    let total = credit_total(slots);
    CreditSummary {
        total,
        status: limits.classify(total),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
