//! Axis and actuator driver boundary.
//!
//! This module defines:
//! - `AxisDriver` trait - Interface for a single-degree-of-freedom actuator
//! - `BinaryOutput` trait - Interface for on/off actuators (gate, gripper, feeder)
//! - `HalError` enum - Error types reported by drivers
//! - `MoveDirection` - Homing approach direction

use thiserror::Error;

/// Error types reported by axis/actuator drivers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Motion was commanded while the axis drive is disabled.
    #[error("axis is disabled")]
    Disabled,

    /// Hardware communication or drive fault.
    #[error("driver fault: {0}")]
    Fault(String),
}

/// Direction of a homing approach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    /// Toward decreasing positions.
    Negative,
    /// Toward increasing positions.
    Positive,
}

impl MoveDirection {
    /// Sign multiplier for velocity in this direction.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            MoveDirection::Negative => -1.0,
            MoveDirection::Positive => 1.0,
        }
    }
}

/// Trait defining the interface to a single positioning axis.
///
/// The control layer drives motion through this trait, enabling pluggable
/// backends (simulation, stepper drivers, servo drives).
///
/// # Lifecycle
///
/// 1. `enable()` - Energize the drive before any motion
/// 2. `begin_home()` / `begin_move_to()` - Arm a motion profile
/// 3. `step()` + `motion_complete()` - Advance and poll until done
/// 4. `mark_home()` - After a homing approach, define the current point as 0
/// 5. `disable()` - De-energize when the axis is parked
///
/// Motion primitives are non-blocking; the bounded wait (and the timeout
/// that replaces an indefinite sensor wait) is the caller's concern.
pub trait AxisDriver: Send {
    /// Energize the drive.
    fn enable(&mut self);

    /// De-energize the drive. Any armed motion is abandoned.
    fn disable(&mut self);

    /// Arm a homing approach: move in `direction` at `speed` until the
    /// home/limit sensor asserts.
    fn begin_home(&mut self, direction: MoveDirection, speed: f64, accel: f64)
    -> Result<(), HalError>;

    /// Arm a move to an absolute position in axis units.
    fn begin_move_to(&mut self, target: f64) -> Result<(), HalError>;

    /// Advance the motion profile by one increment.
    fn step(&mut self) -> Result<(), HalError>;

    /// Whether the armed motion has finished (target reached or sensor
    /// asserted). `true` when no motion is armed.
    fn motion_complete(&self) -> bool;

    /// Define the current position as 0. Call after a completed homing
    /// approach.
    fn mark_home(&mut self);

    /// Current position in axis units.
    fn position(&self) -> f64;
}

/// Trait defining the interface to a binary (on/off) actuator.
///
/// Writes are instantaneous and non-blocking.
pub trait BinaryOutput: Send {
    /// Drive the output high (`true`) or low (`false`).
    fn set(&mut self, level: bool);

    /// Last commanded level.
    fn get(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_signs() {
        assert_eq!(MoveDirection::Positive.sign(), 1.0);
        assert_eq!(MoveDirection::Negative.sign(), -1.0);
    }

    #[test]
    fn hal_error_display() {
        assert_eq!(HalError::Disabled.to_string(), "axis is disabled");
        assert_eq!(
            HalError::Fault("drive offline".into()).to_string(),
            "driver fault: drive offline"
        );
    }
}
