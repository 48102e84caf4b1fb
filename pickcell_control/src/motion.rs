//! Bounded blocking waits over the axis driver boundary.
//!
//! The driver primitives are non-blocking; these helpers provide the
//! blocking semantics the choreographies need, with an explicit timeout
//! so a sensor that never asserts surfaces as a `Timeout` error instead
//! of hanging the dispatch path forever.

use pickcell_common::config::MotionConfig;
use pickcell_common::error::ControlError;
use pickcell_common::hal::{AxisDriver, MoveDirection};
use std::time::{Duration, Instant};

/// Drive the axis to an absolute position, blocking until it reports
/// completion or the configured timeout expires.
pub fn run_to_target(
    axis: &mut dyn AxisDriver,
    target: f64,
    what: &'static str,
    motion: &MotionConfig,
) -> Result<(), ControlError> {
    axis.begin_move_to(target)?;
    settle(axis, what, motion)
}

/// Run a homing approach, blocking until the home sensor asserts, then
/// define that point as position 0.
pub fn home(
    axis: &mut dyn AxisDriver,
    direction: MoveDirection,
    speed: f64,
    accel: f64,
    what: &'static str,
    motion: &MotionConfig,
) -> Result<(), ControlError> {
    axis.begin_home(direction, speed, accel)?;
    settle(axis, what, motion)?;
    axis.mark_home();
    Ok(())
}

/// Poll the armed motion to completion within the configured bound.
fn settle(
    axis: &mut dyn AxisDriver,
    what: &'static str,
    motion: &MotionConfig,
) -> Result<(), ControlError> {
    let timeout = motion.move_timeout();
    let deadline = Instant::now() + timeout;
    let pause = motion.poll_interval();

    while !axis.motion_complete() {
        if Instant::now() >= deadline {
            return Err(ControlError::Timeout { what, waited: timeout });
        }
        axis.step()?;
        if !pause.is_zero() {
            std::thread::sleep(pause);
        }
    }
    Ok(())
}

/// Wall-clock settling pause between choreography sub-steps. The
/// mechanism has no settle sensor; the duration comes from configuration
/// and a zero duration skips the pause entirely.
pub fn dwell(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
