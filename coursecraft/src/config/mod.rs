//! Engine configuration loading.
//!
//! Every field is optional; anything not present in the file keeps its
//! default.  The expected YAML structure is:
//! ```yaml
//! planner:
//!   credit_min: 17
//!   credit_max: 27
//!   placement_duration_hours: 2
//! session:
//!   idle_timeout_ms: 900000   # 15 min
//!   warning_window_ms: 30000  # 30 s
//!   tick_ms: 1000
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::course::DEFAULT_PLACEMENT_HOURS;
use crate::planner::CreditLimits;

// ── Defaults ──────────────────────────────────────────────────────────────────

/// Inactivity period before the warning dialog (15 minutes).
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Countdown shown in the warning dialog (30 seconds).
pub const DEFAULT_WARNING_WINDOW: Duration = Duration::from_secs(30);

/// Countdown granularity.
pub const DEFAULT_TICK: Duration = Duration::from_millis(1_000);

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ── Private YAML deserialization types ────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    planner: PlannerSection,
    #[serde(default)]
    session: SessionSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PlannerSection {
    credit_min: Option<u32>,
    credit_max: Option<u32>,
    placement_duration_hours: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionSection {
    idle_timeout_ms: Option<u64>,
    warning_window_ms: Option<u64>,
    tick_ms: Option<u64>,
}

// ── Public data structures ────────────────────────────────────────────────────

/// Planner knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerSettings {
    pub credit_limits: CreditLimits,
    /// Duration given to every newly added course.
    pub placement_duration_hours: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            credit_limits: CreditLimits::default(),
            placement_duration_hours: DEFAULT_PLACEMENT_HOURS,
        }
    }
}

/// Idle-session timer knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub idle_timeout: Duration,
    pub warning_window: Duration,
    pub tick: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            warning_window: DEFAULT_WARNING_WINDOW,
            tick: DEFAULT_TICK,
        }
    }
}

impl SessionSettings {
    /// Reject settings the timer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.idle_timeout.is_zero() {
            bail!("session.idle_timeout_ms must be > 0");
        }
        if self.tick.is_zero() {
            bail!("session.tick_ms must be > 0");
        }
        if self.warning_window < self.tick {
            bail!(
                "session.warning_window_ms ({}) must be >= tick_ms ({})",
                duration_ms(self.warning_window),
                duration_ms(self.tick)
            );
        }
        Ok(())
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub planner: PlannerSettings,
    pub session: SessionSettings,
}

impl EngineConfig {
    /// Parse and validate a YAML string.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document deserializes to `()`, not to a mapping.
        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(content).context("Failed to parse config YAML")?
        };

        let defaults = EngineConfig::default();

        let planner = PlannerSettings {
            credit_limits: CreditLimits::new(
                file.planner
                    .credit_min
                    .unwrap_or(defaults.planner.credit_limits.min),
                file.planner
                    .credit_max
                    .unwrap_or(defaults.planner.credit_limits.max),
            ),
            placement_duration_hours: file
                .planner
                .placement_duration_hours
                .unwrap_or(defaults.planner.placement_duration_hours),
        };

        let session = SessionSettings {
            idle_timeout: file
                .session
                .idle_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.session.idle_timeout),
            warning_window: file
                .session
                .warning_window_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.session.warning_window),
            tick: file
                .session
                .tick_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.session.tick),
        };

        let config = EngineConfig { planner, session };
        config.validate()?;
        Ok(config)
    }

    /// Parse the config file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the YAML is invalid or
    /// contains unknown keys, or the values fail validation.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading engine configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid configuration file: {}", path.display()))?;

        debug!(
            credit_min = config.planner.credit_limits.min,
            credit_max = config.planner.credit_limits.max,
            placement_h = config.planner.placement_duration_hours,
            idle_ms = duration_ms(config.session.idle_timeout),
            warning_ms = duration_ms(config.session.warning_window),
            tick_ms = duration_ms(config.session.tick),
            "configuration loaded"
        );

        Ok(config)
    }

    /// Cross-field checks.
    pub fn validate(&self) -> Result<()> {
        let limits = &self.planner.credit_limits;
        if limits.min > limits.max {
            bail!(
                "planner.credit_min ({}) must not exceed credit_max ({})",
                limits.min,
                limits.max
            );
        }
        if self.planner.placement_duration_hours == 0 {
            bail!("planner.placement_duration_hours must be > 0");
        }
        self.session.validate()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
