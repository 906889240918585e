/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use coursecraft::audit::{AuditSink, MemoryAuditLog};
use coursecraft::catalog::CourseCatalog;
use coursecraft::config::EngineConfig;
use coursecraft::course::{format_hour, parse_hour, Day};
use coursecraft::planner::{CreditStatus, SchedulePlanner};
use coursecraft::session::{Phase, SessionTimerHandle};

// ── CLI argument definition ───────────────────────────────────────────────────

/// A `--move` request: `<id>@<Day>@<HH:MM>`.
#[derive(Debug, Clone)]
struct MoveArg {
    course: String,
    day: Day,
    start_hour: u32,
}

fn parse_move(s: &str) -> Result<MoveArg, String> {
    let mut parts = s.splitn(3, '@');
    let (Some(course), Some(day), Some(hour)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected <id>@<Day>@<HH:MM>, got '{s}'"));
    };
    if course.is_empty() {
        return Err(format!("missing course id in '{s}'"));
    }
    Ok(MoveArg {
        course: course.to_string(),
        day: day.parse::<Day>().map_err(|e| format!("{e}"))?,
        start_hour: parse_hour(hour).map_err(|e| format!("{e}"))?,
    })
}

/// CourseCraft timetable engine.
///
/// Example:
///   coursecraft --catalog data/catalog.yaml --config data/engine.yaml \
///               --add cs101 --add ma201 --move ma201@Monday@09:00
#[derive(Debug, Parser)]
#[command(
    name = "coursecraft",
    about = "CourseCraft timetable engine – placement, conflicts, idle-session expiry",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML course catalog.
    #[arg(short = 'c', long = "catalog")]
    catalog: Option<PathBuf>,

    /// Path to the YAML engine configuration file.
    #[arg(short = 'f', long = "config")]
    config: Option<PathBuf>,

    /// Course id to place (repeatable, applied in order).
    #[arg(short = 'a', long = "add")]
    add: Vec<String>,

    /// Course id to remove (repeatable, applied after the adds).
    #[arg(short = 'r', long = "remove")]
    remove: Vec<String>,

    /// Relocate a placed course: <id>@<Day>@<HH:MM> (repeatable, applied last).
    #[arg(short = 'm', long = "move", value_parser = parse_move)]
    moves: Vec<MoveArg>,

    /// Name recorded in the activity log.
    #[arg(short = 's', long = "student", default_value = "student")]
    student: String,

    /// Run the idle-session timer with the configured durations until logout.
    #[arg(long = "session-demo", default_value_t = false)]
    session_demo: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialise structured logging.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("CourseCraft starting up...");

    // ── Parse CLI arguments ───────────────────────────────────────────────────
    let cli = Cli::parse();

    info!(
        catalog      = ?cli.catalog,
        config       = ?cli.config,
        adds         = cli.add.len(),
        removes      = cli.remove.len(),
        moves        = cli.moves.len(),
        student      = %cli.student,
        session_demo = cli.session_demo,
        "Configuration"
    );

    // ── Load engine configuration ─────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => match EngineConfig::load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!("Failed to load engine configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No configuration file provided, using default engine settings");
            EngineConfig::default()
        }
    };

    // ── Load course catalog ───────────────────────────────────────────────────
    let catalog = match &cli.catalog {
        Some(path) => match CourseCatalog::load_from_file(path) {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to load course catalog: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No course catalog provided, catalog is empty");
            CourseCatalog::new()
        }
    };

    let audit = Arc::new(MemoryAuditLog::new());

    // ── Build the timetable ───────────────────────────────────────────────────
    let mut planner = SchedulePlanner::new(config.planner.clone())
        .with_audit(audit.clone() as Arc<dyn AuditSink>, cli.student.clone());

    for id in &cli.add {
        if let Err(e) = planner.add_by_id(id, &catalog) {
            error!("Cannot add '{id}': {e}");
        }
    }
    for id in &cli.remove {
        if !planner.remove(id) {
            warn!("'{id}' is not in the timetable");
        }
    }
    for m in &cli.moves {
        if let Err(e) = planner.move_to(&m.course, m.day, m.start_hour) {
            error!("Cannot move '{}': {e}", m.course);
        }
    }

    print_timetable(&planner);

    // ── Idle-session demo ─────────────────────────────────────────────────────
    if cli.session_demo {
        run_session_demo(&config, audit.clone(), &cli.student).await;
    }

    let entries = audit.entries();
    if !entries.is_empty() {
        info!("Activity log ({} entries, newest first):", entries.len());
        for e in entries {
            info!(
                "  {id}  {ts}  {level:?}  {user}: {msg}",
                id = e.id,
                ts = e.timestamp.format("%Y-%m-%d %H:%M:%S"),
                level = e.level,
                user = e.user,
                msg = e.message,
            );
        }
    }
}

fn print_timetable(planner: &SchedulePlanner) {
    if planner.is_empty() {
        info!("Timetable is empty");
    } else {
        info!("Timetable ({} course(s)):", planner.len());
        let mut sorted: Vec<_> = planner.slots().iter().collect();
        sorted.sort_by_key(|s| (s.day, s.start_hour));
        for slot in sorted {
            info!(
                "  {day:<9} {start}-{end}  {code:<6} {title}  ({credits} cr){flag}",
                day = slot.day.name(),
                start = format_hour(slot.start_hour),
                end = format_hour(slot.end_hour()),
                code = slot.course.code,
                title = slot.course.title,
                credits = slot.credits(),
                flag = if slot.has_conflict { "  CONFLICT" } else { "" },
            );
        }
    }

    for (a, b) in planner.conflict_pairs() {
        warn!("Conflict: {a} overlaps {b}");
    }

    let summary = planner.credit_summary();
    let limits = &planner.settings().credit_limits;
    match summary.status {
        CreditStatus::Ok => info!(
            "Total credits: {} (within {}-{})",
            summary.total, limits.min, limits.max
        ),
        status => warn!(
            "Total credits: {} ({status}, allowed {}-{})",
            summary.total, limits.min, limits.max
        ),
    }
}

async fn run_session_demo(config: &EngineConfig, audit: Arc<MemoryAuditLog>, user: &str) {
    info!(
        "Session demo: warning after {:?} idle, logout {:?} later (Ctrl-C logs out)",
        config.session.idle_timeout, config.session.warning_window
    );

    let handle = SessionTimerHandle::spawn_with_audit(config.session, audit, user);
    let mut rx = handle.subscribe();
    let mut last_phase = handle.phase();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = *rx.borrow_and_update();
                if snap.phase != last_phase {
                    info!(phase = %snap.phase, remaining_ms = snap.remaining_ms, "session phase changed");
                    last_phase = snap.phase;
                }
                if snap.phase == Phase::LoggedOut {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, logging out");
                handle.logout_now();
            }
        }
    }

    handle.dispose().await;
}
