//! Operator protocol constants, frames and notifications.
//!
//! The external controller (operator tablet) and this firmware agree on a
//! protocol identity constant, a fixed set of state ids, per-state event
//! code repertoires, and a fixed wire-value table. The framing/encoding of
//! these on the physical link belongs to the transport collaborator; the
//! control core consumes decoded [`Frame`]s and produces [`Notification`]s.

use serde::{Deserialize, Serialize};

/// Protocol identity shared with the external controller. Both sides must
/// present the same constant for a session to be valid.
pub const PROTOCOL_ID: u32 = 0x1946_5309;

/// Identifier of a wire value cell.
pub type WireId = u8;

/// Wire id backing the lift's raw stepper target register.
pub const WIRE_LIFT_STEPPER_TARGET: WireId = 1;

/// Wire id backing the arm's rotation target, as a percentage of a full
/// revolution (e.g. 24 → 0.24 rev).
pub const WIRE_ARM_ROTATIONS: WireId = 2;

// ─── States ─────────────────────────────────────────────────────────

/// The fixed set of subsystem states. Exactly one is active at a time;
/// all exist for the whole process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum StateId {
    /// No-op state; owns no actuators.
    Idle = 0,
    /// Vertical lift with gated output chute and part feeder.
    Lift = 1,
    /// Rotating pick-arm with electromagnetic gripper.
    Arm = 2,
}

impl StateId {
    /// Number of states in the router table.
    pub const COUNT: usize = 3;

    /// All states in table order.
    pub const ALL: [StateId; Self::COUNT] = [StateId::Idle, StateId::Lift, StateId::Arm];

    /// Wire representation of this state id.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for StateId {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(StateId::Idle),
            1 => Ok(StateId::Lift),
            2 => Ok(StateId::Arm),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StateId::Idle => "idle",
            StateId::Lift => "lift",
            StateId::Arm => "arm",
        };
        f.write_str(name)
    }
}

// ─── Event Codes ────────────────────────────────────────────────────

/// Event codes understood by the lift controller.
pub mod lift_events {
    /// Close the gate and move to the raised station.
    pub const RAISE: u8 = 0;
    /// Move to the bottom station and open the gate.
    pub const LOWER: u8 = 1;
    /// Home against the limit sensor and define position 0.
    pub const HOME: u8 = 2;
    /// Start the continuous part feeder.
    pub const RUN_FEEDER: u8 = 3;
    /// Stop the continuous part feeder.
    pub const STOP_FEEDER: u8 = 4;
}

/// Event codes understood by the arm controller.
pub mod arm_events {
    /// Pick at station A, place at station B, return to neutral.
    pub const TRANSFER_A_TO_B: u8 = 0;
    /// Pick at station B, place at station A, return to neutral.
    pub const TRANSFER_B_TO_A: u8 = 1;
    /// Release the electromagnetic gripper.
    pub const DISENGAGE_GRIPPER: u8 = 2;
    /// Energize the electromagnetic gripper.
    pub const ENGAGE_GRIPPER: u8 = 3;
    /// Lower the pneumatic gripper carriage.
    pub const LOWER_CARRIAGE: u8 = 4;
    /// Raise the pneumatic gripper carriage.
    pub const RAISE_CARRIAGE: u8 = 5;
    /// Home the rotation axis and define the neutral station.
    pub const HOME: u8 = 6;
    /// Rotate to the fraction stored in the `rotations` wire value.
    pub const ROTATE: u8 = 7;
}

// ─── Frames ─────────────────────────────────────────────────────────

/// A decoded inbound frame from the external controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Dispatch an event code to a subsystem state.
    Event {
        /// Target state.
        state: StateId,
        /// Event code within that state's repertoire.
        code: u8,
    },
    /// Overwrite a wire value cell.
    WireWrite {
        /// Target wire cell.
        id: WireId,
        /// Raw value, written without interpretation.
        value: u32,
    },
}

/// An outbound notification to the external controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// A multi-step action ran to completion.
    ActionFinished {
        /// State whose action finished.
        state: StateId,
    },
}

impl Notification {
    /// Wire event code of this notification.
    #[inline]
    pub const fn code(&self) -> u8 {
        match self {
            Notification::ActionFinished { .. } => 0,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
