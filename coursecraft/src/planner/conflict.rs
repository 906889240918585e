/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Overlap detection and conflict annotation.
//!
//! Two slots conflict when they sit on the same day and their half-open hour
//! intervals intersect:
//!
//! ```text
//! a.start < b.start + b.duration  &&  b.start < a.start + a.duration
//! ```
//!
//! A slot never conflicts with itself (same identifier).  Back-to-back slots
//! (`08:00-10:00` and `10:00-12:00`) do **not** conflict.
//!
//! Slots are bucketed by day before the pairwise scan, so the quadratic part
//! only ever runs over one day's worth of slots.

use std::collections::BTreeMap;

use tracing::debug;

use crate::course::{Day, ScheduledSlot};

/// Returns `true` if `a` and `b` are distinct slots on the same day whose
/// intervals intersect.  Symmetric in its arguments.
pub fn overlaps(a: &ScheduledSlot, b: &ScheduledSlot) -> bool {
    if a.id() == b.id() || a.day != b.day {
        return false;
    }
    a.start_hour < b.end_hour() && b.start_hour < a.end_hour()
}

/// Returns `true` if `candidate` would overlap any slot in `slots`.
pub fn overlaps_any(candidate: &ScheduledSlot, slots: &[ScheduledSlot]) -> bool {
    slots.iter().any(|s| overlaps(candidate, s))
}

/// Recompute `has_conflict` for every slot over the **whole** set.
///
/// Consumes the set and returns the annotated one; callers adopt the result
/// as the new authoritative state.  Order is preserved.
pub fn recompute_conflicts(mut slots: Vec<ScheduledSlot>) -> Vec<ScheduledSlot> {
    let mut flags = vec![false; slots.len()];

    for (i, j) in overlapping_indices(&slots) {
        debug!(
            a = %slots[i].id(),
            b = %slots[j].id(),
            day = %slots[i].day,
            "conflict"
        );
        flags[i] = true;
        flags[j] = true;
    }

    for (slot, flag) in slots.iter_mut().zip(flags) {
        slot.has_conflict = flag;
    }
    slots
}

/// Every overlapping pair, each reported once as `(earlier, later)` by start
/// hour, ordered by day then start hour.
pub fn conflict_pairs(slots: &[ScheduledSlot]) -> Vec<(&ScheduledSlot, &ScheduledSlot)> {
    let mut pairs: Vec<(&ScheduledSlot, &ScheduledSlot)> = overlapping_indices(slots)
        .into_iter()
        .map(|(i, j)| {
            let (a, b) = (&slots[i], &slots[j]);
            if (b.start_hour, b.id()) < (a.start_hour, a.id()) {
                (b, a)
            } else {
                (a, b)
            }
        })
        .collect();
    pairs.sort_by(|x, y| {
        (x.0.day, x.0.start_hour, x.1.start_hour, x.0.id(), x.1.id()).cmp(&(
            y.0.day,
            y.0.start_hour,
            y.1.start_hour,
            y.0.id(),
            y.1.id(),
        ))
    });
    pairs
}

/// Index pairs `(i, j)` with `i < j` of overlapping slots.
fn overlapping_indices(slots: &[ScheduledSlot]) -> Vec<(usize, usize)> {
    // BTreeMap so pairs come out grouped in day order.
    let mut by_day: BTreeMap<Day, Vec<usize>> = BTreeMap::new();
    for (idx, slot) in slots.iter().enumerate() {
        by_day.entry(slot.day).or_default().push(idx);
    }

    let mut out = Vec::new();
    for indices in by_day.values() {
        for (n, &i) in indices.iter().enumerate() {
            for &j in &indices[n + 1..] {
                if overlaps(&slots[i], &slots[j]) {
                    out.push((i, j));
                }
            }
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
