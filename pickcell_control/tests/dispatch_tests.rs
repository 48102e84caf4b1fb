//! End-to-end dispatch tests for the pickcell cell.
//!
//! These tests drive a fully assembled `CellManager` (lift + arm over the
//! simulation driver) through inbound frames the way the transport would,
//! and observe the actuators through simulation probes:
//!
//! 1. Valid event codes invoke exactly one action, invalid codes none.
//! 2. Startup homing postconditions and the lift raise/lower scenario.
//! 3. Transfer round trip returns the arm to its neutral actuator state.
//! 4. Wire write then rotate event moves the arm to `value / 100` rev.
//! 5. Busy rejection of a re-entrant action and timeout of stalled motion.

use pickcell_common::config::CellConfig;
use pickcell_common::error::ControlError;
use pickcell_common::protocol::{
    arm_events, lift_events, Frame, Notification, StateId, WIRE_ARM_ROTATIONS,
};
use pickcell_control::arm::ArmController;
use pickcell_control::lift::LiftController;
use pickcell_control::manager::CellManager;
use pickcell_hal::sim::{SimAxis, SimAxisProbe, SimOutput, SimOutputProbe};
use std::sync::Arc;
use std::time::Duration;

// ─── Helpers ────────────────────────────────────────────────────────

/// Probe handles onto every simulated actuator of the cell.
struct CellProbes {
    lift_axis: SimAxisProbe,
    gate: SimOutputProbe,
    feeder: SimOutputProbe,
    arm_axis: SimAxisProbe,
    gripper: SimOutputProbe,
    carriage: SimOutputProbe,
}

/// Configuration tuned for tests: no dwells, tight timeout, spinning polls.
fn test_config() -> CellConfig {
    let mut config = CellConfig::default();
    config.motion.move_timeout_ms = 2_000;
    config.motion.poll_interval_us = 0;
    config.lift.speed_mm_s = 2_000.0;
    config.lift.homing_speed_mm_s = 2_000.0;
    config.arm.speed_rev_s = 20.0;
    config.arm.homing_speed_rev_s = 20.0;
    config.arm.grip_settle_ms = 0;
    config.arm.release_settle_ms = 0;
    config.arm.rotate_settle_ms = 0;
    config.arm.carriage_settle_ms = 0;
    config
}

fn build_cell(config: &CellConfig) -> (CellManager, CellProbes) {
    let lift_axis = SimAxis::new("lift", config.lift.speed_mm_s);
    let gate = SimOutput::new("gate");
    let feeder = SimOutput::new("feeder");
    let arm_axis = SimAxis::new("arm", config.arm.speed_rev_s);
    let gripper = SimOutput::new("gripper");
    let carriage = SimOutput::new("carriage");

    let probes = CellProbes {
        lift_axis: lift_axis.probe(),
        gate: gate.probe(),
        feeder: feeder.probe(),
        arm_axis: arm_axis.probe(),
        gripper: gripper.probe(),
        carriage: carriage.probe(),
    };

    let lift = LiftController::new(
        lift_axis,
        gate,
        feeder,
        config.lift.clone(),
        config.motion.clone(),
    );
    let arm = ArmController::new(
        arm_axis,
        gripper,
        carriage,
        config.arm.clone(),
        config.motion.clone(),
    );

    let manager = CellManager::new(Box::new(lift), Box::new(arm));
    (manager, probes)
}

fn started_cell() -> (CellManager, CellProbes) {
    let (mut manager, probes) = build_cell(&test_config());
    manager.startup().expect("startup homing failed");
    (manager, probes)
}

fn event(state: StateId, code: u8) -> Frame {
    Frame::Event { state, code }
}

// ─── Startup ────────────────────────────────────────────────────────

#[test]
fn startup_homes_every_subsystem() {
    let (manager, probes) = started_cell();
    assert!(manager.is_calibrated());
    assert_eq!(probes.lift_axis.position(), 0.0);
    assert!(probes.gate.get());
    assert_eq!(probes.arm_axis.position(), 0.0);
    assert!(!probes.gripper.get());
    assert!(!probes.carriage.get());
}

#[test]
fn events_before_startup_are_rejected() {
    let (manager, probes) = build_cell(&test_config());
    let err = manager
        .handle_frame(event(StateId::Lift, lift_events::RAISE))
        .unwrap_err();
    assert_eq!(err, ControlError::NotCalibrated);
    assert_eq!(probes.lift_axis.position(), 0.0);
}

#[test]
fn failed_startup_homing_blocks_dispatch() {
    let (mut manager, probes) = build_cell(&{
        let mut config = test_config();
        config.motion.move_timeout_ms = 20;
        config
    });
    probes.lift_axis.set_position(-50.0);
    probes.lift_axis.stall();

    let err = manager.startup().unwrap_err();
    assert!(matches!(err, ControlError::Timeout { .. }));
    assert!(!manager.is_calibrated());

    let err = manager
        .handle_frame(event(StateId::Arm, arm_events::ENGAGE_GRIPPER))
        .unwrap_err();
    assert_eq!(err, ControlError::NotCalibrated);
}

// ─── Event routing ──────────────────────────────────────────────────

#[test]
fn valid_event_invokes_exactly_one_action() {
    let (manager, probes) = started_cell();

    // Feeder on: no other actuator moves.
    manager
        .handle_frame(event(StateId::Lift, lift_events::RUN_FEEDER))
        .unwrap();
    assert!(probes.feeder.get());
    assert_eq!(probes.lift_axis.position(), 0.0);
    assert!(probes.gate.get());
    assert_eq!(probes.arm_axis.position(), 0.0);
    assert!(!probes.gripper.get());

    manager
        .handle_frame(event(StateId::Lift, lift_events::STOP_FEEDER))
        .unwrap();
    assert!(!probes.feeder.get());
}

#[test]
fn invalid_event_code_is_a_silent_no_op() {
    let (manager, probes) = started_cell();
    for state in [StateId::Idle, StateId::Lift, StateId::Arm] {
        assert_eq!(manager.handle_frame(event(state, 200)), Ok(None));
    }
    assert_eq!(probes.lift_axis.position(), 0.0);
    assert!(probes.gate.get());
    assert!(!probes.feeder.get());
    assert_eq!(probes.arm_axis.position(), 0.0);
    assert!(!probes.gripper.get());
    assert!(!probes.carriage.get());
}

#[test]
fn idle_state_ignores_its_whole_repertoire() {
    let (manager, _probes) = started_cell();
    for code in 0..8 {
        assert_eq!(manager.handle_frame(event(StateId::Idle, code)), Ok(None));
    }
}

// ─── Lift scenario ──────────────────────────────────────────────────

#[test]
fn lift_raise_then_lower_scenario() {
    let (manager, probes) = started_cell();

    // Fresh start: homed at 0, gate open.
    assert_eq!(probes.lift_axis.position(), 0.0);
    assert!(probes.gate.get());

    // Lift up: at the configured raised station, gate closed.
    manager
        .handle_frame(event(StateId::Lift, lift_events::RAISE))
        .unwrap();
    assert_eq!(probes.lift_axis.position(), -226.0);
    assert!(!probes.gate.get());

    // Lift down: back at 0, gate open.
    manager
        .handle_frame(event(StateId::Lift, lift_events::LOWER))
        .unwrap();
    assert_eq!(probes.lift_axis.position(), 0.0);
    assert!(probes.gate.get());
}

#[test]
fn lift_rehome_event_recovers_position() {
    let (manager, probes) = started_cell();
    manager
        .handle_frame(event(StateId::Lift, lift_events::RAISE))
        .unwrap();
    manager
        .handle_frame(event(StateId::Lift, lift_events::HOME))
        .unwrap();
    assert_eq!(probes.lift_axis.position(), 0.0);
    assert!(probes.gate.get());
}

// ─── Arm scenarios ──────────────────────────────────────────────────

#[test]
fn transfer_round_trip_restores_neutral_state() {
    let (manager, probes) = started_cell();

    let note = manager
        .handle_frame(event(StateId::Arm, arm_events::TRANSFER_A_TO_B))
        .unwrap();
    assert_eq!(
        note,
        Some(Notification::ActionFinished {
            state: StateId::Arm
        })
    );

    let note = manager
        .handle_frame(event(StateId::Arm, arm_events::TRANSFER_B_TO_A))
        .unwrap();
    assert_eq!(
        note,
        Some(Notification::ActionFinished {
            state: StateId::Arm
        })
    );

    assert_eq!(probes.arm_axis.position(), 0.0);
    assert!(!probes.gripper.get());
    assert!(!probes.carriage.get());
}

#[test]
fn wire_write_then_rotate_event() {
    let (manager, probes) = started_cell();

    manager
        .handle_frame(Frame::WireWrite {
            id: WIRE_ARM_ROTATIONS,
            value: 41,
        })
        .unwrap();
    manager
        .handle_frame(event(StateId::Arm, arm_events::ROTATE))
        .unwrap();
    assert!((probes.arm_axis.position() - 0.41).abs() < 1e-9);
}

#[test]
fn out_of_range_rotation_wire_is_rejected_at_consumption() {
    let (manager, probes) = started_cell();

    // The raw write itself is unvalidated.
    manager
        .handle_frame(Frame::WireWrite {
            id: WIRE_ARM_ROTATIONS,
            value: 150,
        })
        .unwrap();
    assert_eq!(manager.wires().read(WIRE_ARM_ROTATIONS), Ok(150));

    // Consumption rejects it and the axis never moves.
    let err = manager
        .handle_frame(event(StateId::Arm, arm_events::ROTATE))
        .unwrap_err();
    assert!(matches!(err, ControlError::InvalidParameter { .. }));
    assert_eq!(probes.arm_axis.position(), 0.0);
}

#[test]
fn unknown_wire_write_is_reported() {
    let (manager, _probes) = started_cell();
    let err = manager
        .handle_frame(Frame::WireWrite { id: 77, value: 1 })
        .unwrap_err();
    assert_eq!(err, ControlError::UnknownWire(77));
}

// ─── Busy and timeout ───────────────────────────────────────────────

#[test]
fn reentrant_transfer_is_rejected_with_busy() {
    let mut config = test_config();
    // Slow the choreography down so the second dispatch lands mid-action.
    config.arm.grip_settle_ms = 300;
    let (mut manager, _probes) = build_cell(&config);
    manager.startup().expect("startup homing failed");

    let manager = Arc::new(manager);
    let background = Arc::clone(&manager);
    let worker = std::thread::spawn(move || {
        background.handle_frame(event(StateId::Arm, arm_events::TRANSFER_A_TO_B))
    });

    // Let the transfer reach its first dwell, then dispatch again.
    std::thread::sleep(Duration::from_millis(100));
    let err = manager
        .handle_frame(event(StateId::Arm, arm_events::TRANSFER_B_TO_A))
        .unwrap_err();
    assert_eq!(err, ControlError::Busy);

    // A different subsystem is not blocked by the arm being busy.
    manager
        .handle_frame(event(StateId::Lift, lift_events::RUN_FEEDER))
        .unwrap();

    let note = worker.join().expect("transfer thread panicked").unwrap();
    assert_eq!(
        note,
        Some(Notification::ActionFinished {
            state: StateId::Arm
        })
    );

    // Once the first transfer finished the arm accepts events again.
    manager
        .handle_frame(event(StateId::Arm, arm_events::ENGAGE_GRIPPER))
        .unwrap();
}

#[test]
fn stalled_motion_surfaces_timeout_not_a_hang() {
    let mut config = test_config();
    config.motion.move_timeout_ms = 50;
    let (mut manager, probes) = build_cell(&config);
    manager.startup().expect("startup homing failed");

    probes.lift_axis.stall();
    let err = manager
        .handle_frame(event(StateId::Lift, lift_events::RAISE))
        .unwrap_err();
    assert!(matches!(
        err,
        ControlError::Timeout { what: "lift raise", .. }
    ));
}
