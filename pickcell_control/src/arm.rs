//! Rotating pick-arm controller.
//!
//! Owns the rotation axis, the electromagnetic gripper and the pneumatic
//! carriage that lowers the gripper onto a part. Angles are fractions of a
//! full revolution; 0 is the homed neutral station, with pick stations A
//! and B at configured fractions.
//!
//! The transfer choreographies interleave every mechanically significant
//! sub-step with a configured wall-clock dwell. The mechanism has no
//! settle sensor, so the dwells are tuned on the machine rather than
//! confirmed by feedback.

use pickcell_common::config::{ArmConfig, MotionConfig};
use pickcell_common::error::ControlError;
use pickcell_common::hal::{AxisDriver, BinaryOutput, MoveDirection};
use pickcell_common::protocol::{arm_events, Notification, StateId, WIRE_ARM_ROTATIONS};
use tracing::{debug, info};

use crate::motion;
use crate::state::StateController;
use crate::wire::WireTable;

/// Angular position of the neutral station [rev].
const NEUTRAL_REV: f64 = 0.0;

/// Controller for the rotating pick-arm with electromagnetic gripper.
pub struct ArmController<A: AxisDriver, O: BinaryOutput> {
    rotation: A,
    gripper: O,
    carriage: O,
    homed: bool,
    arm: ArmConfig,
    motion: MotionConfig,
}

impl<A: AxisDriver, O: BinaryOutput> ArmController<A, O> {
    /// Create an arm controller over the given rotation axis and outputs.
    pub fn new(rotation: A, gripper: O, carriage: O, arm: ArmConfig, motion: MotionConfig) -> Self {
        Self {
            rotation,
            gripper,
            carriage,
            homed: false,
            arm,
            motion,
        }
    }

    /// Whether startup homing has defined the neutral station.
    pub fn homed(&self) -> bool {
        self.homed
    }

    /// Home the rotation axis against its limit sensor and define that
    /// point as the neutral station (angle 0).
    pub fn home(&mut self) -> Result<(), ControlError> {
        info!("arm: homing rotation axis");
        self.rotation.enable();
        let result = motion::home(
            &mut self.rotation,
            MoveDirection::Negative,
            self.arm.homing_speed_rev_s,
            self.arm.homing_accel_rev_s2,
            "arm homing",
            &self.motion,
        );
        self.rotation.disable();
        result?;
        self.homed = true;
        info!("arm: homed at neutral station");
        Ok(())
    }

    /// Pick a part at station A and place it at station B.
    pub fn transfer_a_to_b(&mut self) -> Result<(), ControlError> {
        info!("arm: transfer A -> B");
        self.transfer(self.arm.station_a_rev, self.arm.station_b_rev)
    }

    /// Pick a part at station B and place it at station A.
    pub fn transfer_b_to_a(&mut self) -> Result<(), ControlError> {
        info!("arm: transfer B -> A");
        self.transfer(self.arm.station_b_rev, self.arm.station_a_rev)
    }

    /// The shared pick-and-place choreography: pick at `source_rev`, place
    /// at `dest_rev`, return to neutral. Every sub-step is followed by its
    /// configured settling dwell.
    fn transfer(&mut self, source_rev: f64, dest_rev: f64) -> Result<(), ControlError> {
        self.rotate_to(source_rev, "arm rotate to pick station")?;
        motion::dwell(self.arm.rotate_settle());

        self.lower_carriage();
        motion::dwell(self.arm.carriage_settle());
        self.engage_gripper();
        motion::dwell(self.arm.grip_settle());
        self.raise_carriage();
        motion::dwell(self.arm.carriage_settle());

        self.rotate_to(dest_rev, "arm rotate to place station")?;
        motion::dwell(self.arm.rotate_settle());

        self.lower_carriage();
        motion::dwell(self.arm.carriage_settle());
        self.disengage_gripper();
        motion::dwell(self.arm.release_settle());
        self.raise_carriage();
        motion::dwell(self.arm.carriage_settle());

        self.rotate_to(NEUTRAL_REV, "arm rotate to neutral")?;
        motion::dwell(self.arm.rotate_settle());
        info!("arm: transfer finished");
        Ok(())
    }

    /// Rotate to the fraction of a revolution stored in the `rotations`
    /// wire value. The cell holds a percentage-scaled integer (24 means
    /// 0.24 rev); a fraction outside `[0, 1)` or a wire that was never
    /// written is rejected.
    pub fn rotate_to_fraction(&mut self, wires: &WireTable) -> Result<(), ControlError> {
        if !wires.written(WIRE_ARM_ROTATIONS)? {
            return Err(ControlError::InvalidParameter {
                what: "rotation fraction (wire never written)",
                value: 0.0,
            });
        }
        let raw = wires.read(WIRE_ARM_ROTATIONS)?;
        let fraction = f64::from(raw) / 100.0;
        if !(0.0..1.0).contains(&fraction) {
            return Err(ControlError::InvalidParameter {
                what: "rotation fraction",
                value: fraction,
            });
        }
        info!("arm: rotating to {fraction} rev");
        self.rotate_to(fraction, "arm rotate")
    }

    /// Energize the electromagnet. Non-blocking.
    pub fn engage_gripper(&mut self) {
        debug!("arm: gripper on");
        self.gripper.set(true);
    }

    /// Release the electromagnet. Non-blocking.
    pub fn disengage_gripper(&mut self) {
        debug!("arm: gripper off");
        self.gripper.set(false);
    }

    /// Lower the pneumatic gripper carriage. Non-blocking.
    pub fn lower_carriage(&mut self) {
        debug!("arm: carriage down");
        self.carriage.set(true);
    }

    /// Raise the pneumatic gripper carriage. Non-blocking.
    pub fn raise_carriage(&mut self) {
        debug!("arm: carriage up");
        self.carriage.set(false);
    }

    fn rotate_to(&mut self, target_rev: f64, what: &'static str) -> Result<(), ControlError> {
        self.rotation.enable();
        let result = motion::run_to_target(&mut self.rotation, target_rev, what, &self.motion);
        self.rotation.disable();
        result
    }
}

impl<A: AxisDriver, O: BinaryOutput> StateController for ArmController<A, O> {
    fn setup(&mut self) -> Result<(), ControlError> {
        self.rotation.disable();
        self.gripper.set(false);
        self.carriage.set(false);
        Ok(())
    }

    fn calibrate(&mut self) -> Result<(), ControlError> {
        self.home()
    }

    fn event(
        &mut self,
        code: u8,
        wires: &WireTable,
    ) -> Result<Option<Notification>, ControlError> {
        match code {
            arm_events::TRANSFER_A_TO_B => {
                self.transfer_a_to_b()?;
                return Ok(Some(Notification::ActionFinished {
                    state: StateId::Arm,
                }));
            }
            arm_events::TRANSFER_B_TO_A => {
                self.transfer_b_to_a()?;
                return Ok(Some(Notification::ActionFinished {
                    state: StateId::Arm,
                }));
            }
            arm_events::DISENGAGE_GRIPPER => self.disengage_gripper(),
            arm_events::ENGAGE_GRIPPER => self.engage_gripper(),
            arm_events::LOWER_CARRIAGE => self.lower_carriage(),
            arm_events::RAISE_CARRIAGE => self.raise_carriage(),
            arm_events::HOME => self.home()?,
            arm_events::ROTATE => self.rotate_to_fraction(wires)?,
            other => debug!(code = other, "arm: unknown event code ignored"),
        }
        Ok(None)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
