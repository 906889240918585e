/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! CourseCraft – timetable engine
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── course          – courses, departments, the weekly grid, scheduled slots
//! ├── catalog/        – course lookup trait + YAML catalog with search
//! ├── planner/        – first-fit placement, add / remove / move
//! │   ├── conflict    – overlap predicate and conflict annotation
//! │   ├── credits     – credit totals and the min / max band
//! │   └── error       – PlannerError
//! ├── session/        – idle-session timer state machine
//! │   └── driver      – tokio task that runs the timer
//! ├── config/         – YAML engine configuration
//! └── audit           – injected append-only activity log
//! ```

pub mod audit;
pub mod catalog;
pub mod config;
pub mod course;
pub mod planner;
pub mod session;
