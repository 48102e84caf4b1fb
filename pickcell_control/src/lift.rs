//! Vertical lift controller.
//!
//! Owns the lift axis, the output-chute gate and the continuous part
//! feeder. Position 0 is the homed bottom station; the raised station sits
//! above it at a configured negative offset. `ready` means the lift is at
//! the bottom station with the gate open, able to receive parts — a raised
//! lift is deliberately not ready, so `raise()` clears the flag and only
//! `lower()`/`home()` restore it.

use pickcell_common::config::{LiftConfig, MotionConfig};
use pickcell_common::error::ControlError;
use pickcell_common::hal::{AxisDriver, BinaryOutput, MoveDirection};
use pickcell_common::protocol::{lift_events, Notification};
use tracing::{debug, info};

use crate::motion;
use crate::state::StateController;
use crate::wire::WireTable;

/// Controller for the vertical lift with gated output chute and feeder.
pub struct LiftController<A: AxisDriver, O: BinaryOutput> {
    axis: A,
    gate: O,
    feeder: O,
    ready: bool,
    lift: LiftConfig,
    motion: MotionConfig,
}

impl<A: AxisDriver, O: BinaryOutput> LiftController<A, O> {
    /// Create a lift controller over the given axis and outputs.
    pub fn new(axis: A, gate: O, feeder: O, lift: LiftConfig, motion: MotionConfig) -> Self {
        Self {
            axis,
            gate,
            feeder,
            ready: false,
            lift,
            motion,
        }
    }

    /// Whether the lift is at the bottom station with the gate open.
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Home against the limit sensor and define position 0, then open the
    /// gate. Must run before positioning moves are trusted.
    pub fn home(&mut self) -> Result<(), ControlError> {
        info!("lift: homing");
        self.axis.enable();
        let result = motion::home(
            &mut self.axis,
            MoveDirection::Positive,
            self.lift.homing_speed_mm_s,
            self.lift.homing_accel_mm_s2,
            "lift homing",
            &self.motion,
        );
        self.axis.disable();
        result?;
        self.ready = true;
        self.gate.set(true);
        info!("lift: homed, gate open");
        Ok(())
    }

    /// Close the gate and move to the raised station. Leaves `ready`
    /// cleared: a raised lift cannot receive parts.
    pub fn raise(&mut self) -> Result<(), ControlError> {
        info!("lift: raising to {}", self.lift.up_position_mm);
        self.ready = false;
        self.gate.set(false);
        self.axis.enable();
        let result = motion::run_to_target(
            &mut self.axis,
            self.lift.up_position_mm,
            "lift raise",
            &self.motion,
        );
        self.axis.disable();
        result
    }

    /// Move to the bottom station, then open the gate and mark ready.
    pub fn lower(&mut self) -> Result<(), ControlError> {
        info!("lift: lowering to bottom station");
        self.axis.enable();
        let result = motion::run_to_target(&mut self.axis, 0.0, "lift lower", &self.motion);
        self.axis.disable();
        result?;
        self.ready = true;
        self.gate.set(true);
        Ok(())
    }

    /// Start the continuous part feeder. Independent of axis motion.
    pub fn run_feeder(&mut self) {
        debug!("lift: feeder on");
        self.feeder.set(true);
    }

    /// Stop the continuous part feeder.
    pub fn stop_feeder(&mut self) {
        debug!("lift: feeder off");
        self.feeder.set(false);
    }
}

impl<A: AxisDriver, O: BinaryOutput> StateController for LiftController<A, O> {
    fn setup(&mut self) -> Result<(), ControlError> {
        self.axis.disable();
        self.gate.set(false);
        self.feeder.set(false);
        Ok(())
    }

    fn calibrate(&mut self) -> Result<(), ControlError> {
        self.home()
    }

    fn event(
        &mut self,
        code: u8,
        _wires: &WireTable,
    ) -> Result<Option<Notification>, ControlError> {
        match code {
            lift_events::RAISE => self.raise()?,
            lift_events::LOWER => self.lower()?,
            lift_events::HOME => self.home()?,
            lift_events::RUN_FEEDER => self.run_feeder(),
            lift_events::STOP_FEEDER => self.stop_feeder(),
            other => debug!(code = other, "lift: unknown event code ignored"),
        }
        Ok(None)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
