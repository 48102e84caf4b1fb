//! Cell configuration loading and validation.
//!
//! The cell is configured from a single TOML file with `[motion]`,
//! `[lift]` and `[arm]` sections. Every field has a default matching the
//! commissioned machine, so a partial (or absent) file is valid.
//!
//! # TOML Example
//!
//! ```toml
//! [motion]
//! move_timeout_ms = 10000
//! poll_interval_us = 200
//!
//! [lift]
//! up_position_mm = -226.0
//!
//! [arm]
//! station_a_rev = 0.24
//! station_b_rev = 0.41
//! grip_settle_ms = 1500
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(String),

    /// TOML parsing failed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// Semantic validation failed.
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Top-level cell configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CellConfig {
    /// Shared motion supervision settings.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Vertical lift axis and gate.
    #[serde(default)]
    pub lift: LiftConfig,

    /// Rotating pick-arm, gripper and carriage.
    #[serde(default)]
    pub arm: ArmConfig,
}

impl CellConfig {
    /// Parse a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if:
    /// - any speed or the motion timeout is not positive
    /// - a station fraction is outside `[0, 1)` revolutions
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.lift.validate()?;
        self.arm.validate()
    }
}

// ─── Motion Supervision ─────────────────────────────────────────────

/// Bounds for blocking motion waits, shared by both axes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Maximum wall-clock time a single move or homing approach may take
    /// before it is reported as stalled [ms].
    #[serde(default = "default_move_timeout_ms")]
    pub move_timeout_ms: u64,

    /// Pause between motion-complete polls [us]. Zero spins.
    #[serde(default = "default_poll_interval_us")]
    pub poll_interval_us: u64,
}

fn default_move_timeout_ms() -> u64 {
    10_000
}

fn default_poll_interval_us() -> u64 {
    200
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            move_timeout_ms: default_move_timeout_ms(),
            poll_interval_us: default_poll_interval_us(),
        }
    }
}

impl MotionConfig {
    /// Timeout bound as a `Duration`.
    #[inline]
    pub fn move_timeout(&self) -> Duration {
        Duration::from_millis(self.move_timeout_ms)
    }

    /// Poll pause as a `Duration`.
    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_micros(self.poll_interval_us)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.move_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "motion.move_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ─── Lift ───────────────────────────────────────────────────────────

/// Vertical lift configuration. Position 0 is the homed (bottom) station;
/// the raised station is above it at a negative offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiftConfig {
    /// Absolute position of the raised station [mm].
    #[serde(default = "default_lift_up_position")]
    pub up_position_mm: f64,

    /// Travel speed for positioning moves [mm/s].
    #[serde(default = "default_lift_speed")]
    pub speed_mm_s: f64,

    /// Homing approach speed [mm/s].
    #[serde(default = "default_lift_homing_speed")]
    pub homing_speed_mm_s: f64,

    /// Homing approach acceleration [mm/s^2].
    #[serde(default = "default_lift_homing_accel")]
    pub homing_accel_mm_s2: f64,
}

fn default_lift_up_position() -> f64 {
    -226.0
}

fn default_lift_speed() -> f64 {
    25.0
}

fn default_lift_homing_speed() -> f64 {
    50.0
}

fn default_lift_homing_accel() -> f64 {
    250.0
}

impl Default for LiftConfig {
    fn default() -> Self {
        Self {
            up_position_mm: default_lift_up_position(),
            speed_mm_s: default_lift_speed(),
            homing_speed_mm_s: default_lift_homing_speed(),
            homing_accel_mm_s2: default_lift_homing_accel(),
        }
    }
}

impl LiftConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.speed_mm_s <= 0.0 || self.homing_speed_mm_s <= 0.0 {
            return Err(ConfigError::Validation(
                "lift speeds must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ─── Arm ────────────────────────────────────────────────────────────

/// Rotating pick-arm configuration. Angles are fractions of a full
/// revolution; 0 is the homed (neutral) station.
///
/// The settle durations are deliberate wall-clock pauses inserted between
/// mechanically significant sub-steps. The mechanism has no settle sensor,
/// so these are tuned on the machine, not derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmConfig {
    /// Angular position of station A [rev].
    #[serde(default = "default_station_a")]
    pub station_a_rev: f64,

    /// Angular position of station B [rev].
    #[serde(default = "default_station_b")]
    pub station_b_rev: f64,

    /// Rotation speed for positioning moves [rev/s].
    #[serde(default = "default_arm_speed")]
    pub speed_rev_s: f64,

    /// Homing approach speed [rev/s].
    #[serde(default = "default_arm_speed")]
    pub homing_speed_rev_s: f64,

    /// Homing approach acceleration [rev/s^2].
    #[serde(default = "default_arm_homing_accel")]
    pub homing_accel_rev_s2: f64,

    /// Pause after engaging the gripper on a part [ms].
    #[serde(default = "default_grip_settle_ms")]
    pub grip_settle_ms: u64,

    /// Pause after releasing the gripper [ms].
    #[serde(default = "default_grip_settle_ms")]
    pub release_settle_ms: u64,

    /// Pause after a rotation move [ms].
    #[serde(default = "default_rotate_settle_ms")]
    pub rotate_settle_ms: u64,

    /// Pause after raising or lowering the carriage [ms].
    #[serde(default = "default_grip_settle_ms")]
    pub carriage_settle_ms: u64,
}

fn default_station_a() -> f64 {
    0.24
}

fn default_station_b() -> f64 {
    0.41
}

fn default_arm_speed() -> f64 {
    0.15
}

fn default_arm_homing_accel() -> f64 {
    2.0
}

fn default_grip_settle_ms() -> u64 {
    1500
}

fn default_rotate_settle_ms() -> u64 {
    1000
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            station_a_rev: default_station_a(),
            station_b_rev: default_station_b(),
            speed_rev_s: default_arm_speed(),
            homing_speed_rev_s: default_arm_speed(),
            homing_accel_rev_s2: default_arm_homing_accel(),
            grip_settle_ms: default_grip_settle_ms(),
            release_settle_ms: default_grip_settle_ms(),
            rotate_settle_ms: default_rotate_settle_ms(),
            carriage_settle_ms: default_grip_settle_ms(),
        }
    }
}

impl ArmConfig {
    /// Pause after engaging the gripper.
    #[inline]
    pub fn grip_settle(&self) -> Duration {
        Duration::from_millis(self.grip_settle_ms)
    }

    /// Pause after releasing the gripper.
    #[inline]
    pub fn release_settle(&self) -> Duration {
        Duration::from_millis(self.release_settle_ms)
    }

    /// Pause after a rotation move.
    #[inline]
    pub fn rotate_settle(&self) -> Duration {
        Duration::from_millis(self.rotate_settle_ms)
    }

    /// Pause after a carriage toggle.
    #[inline]
    pub fn carriage_settle(&self) -> Duration {
        Duration::from_millis(self.carriage_settle_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, fraction) in [
            ("arm.station_a_rev", self.station_a_rev),
            ("arm.station_b_rev", self.station_b_rev),
        ] {
            if !(0.0..1.0).contains(&fraction) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be within [0, 1) revolutions, got {fraction}"
                )));
            }
        }
        if self.speed_rev_s <= 0.0 || self.homing_speed_rev_s <= 0.0 {
            return Err(ConfigError::Validation(
                "arm speeds must be positive".into(),
            ));
        }
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
