//! Cell manager: router table, wire table, active-state cursor and frame
//! dispatch.
//!
//! The manager binds the fixed state/event router and the wire-value
//! synchronization table together under the protocol identity constant.
//! Dispatch is strictly serial: an event frame is routed synchronously to
//! its controller and blocks until the chosen action completes. A frame
//! that targets a controller still mid-action is rejected with `Busy`
//! (chosen busy discipline: reject-and-report), which also keeps dispatch
//! safe if the transport listener and the driving loop ever run on
//! separate threads.

use pickcell_common::error::ControlError;
use pickcell_common::protocol::{Frame, Notification, StateId, PROTOCOL_ID};
use std::sync::{Mutex, MutexGuard, TryLockError};
use tracing::{debug, error, info, warn};

use crate::state::{IdleController, StateController};
use crate::wire::WireTable;

/// Binds the state/event router and the wire table; owns the active-state
/// cursor and the calibration gate.
pub struct CellManager {
    /// Fixed router table in [`StateId::ALL`] order.
    states: [Mutex<Box<dyn StateController>>; StateId::COUNT],
    /// Fixed wire-value synchronization table.
    wires: WireTable,
    /// Currently active state.
    active: StateId,
    /// Set once startup setup + homing has succeeded for every state.
    calibrated: bool,
}

impl CellManager {
    /// Build the fixed router table from the lift and arm controllers,
    /// with the machine's standard wire table. `Idle` starts active.
    pub fn new(lift: Box<dyn StateController>, arm: Box<dyn StateController>) -> Self {
        Self {
            states: [
                Mutex::new(Box::new(IdleController)),
                Mutex::new(lift),
                Mutex::new(arm),
            ],
            wires: WireTable::standard(),
            active: StateId::Idle,
            calibrated: false,
        }
    }

    /// Protocol identity shared with the external controller.
    pub const fn protocol_id(&self) -> u32 {
        PROTOCOL_ID
    }

    /// Whether startup homing has completed for every subsystem.
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Currently active state.
    pub fn active(&self) -> StateId {
        self.active
    }

    /// The wire-value synchronization table.
    pub fn wires(&self) -> &WireTable {
        &self.wires
    }

    /// Run every controller's `setup()` and then its homing action, so the
    /// cell begins from a known calibrated position before accepting
    /// events. A homing failure leaves the manager uncalibrated: event
    /// frames are rejected with `NotCalibrated` until a later `startup()`
    /// succeeds.
    pub fn startup(&mut self) -> Result<(), ControlError> {
        info!("cell startup: setup + homing for every subsystem");
        self.calibrated = false;
        for state in StateId::ALL {
            let mut controller = lock_state(&self.states[state.as_u8() as usize])?;
            controller.setup()?;
            if let Err(e) = controller.calibrate() {
                error!("startup homing failed for {state}: {e}");
                return Err(e);
            }
        }
        self.calibrated = true;
        info!("cell calibrated");
        Ok(())
    }

    /// Decode and dispatch one inbound frame.
    ///
    /// Event frames route synchronously to the target state's controller
    /// and block for the duration of the action; the returned notification
    /// (if any) is for the transport to send back. Wire writes are raw
    /// overwrites and are accepted even while uncalibrated.
    pub fn handle_frame(&self, frame: Frame) -> Result<Option<Notification>, ControlError> {
        match frame {
            Frame::Event { state, code } => {
                if !self.calibrated {
                    warn!("event {code} for {state} rejected: not calibrated");
                    return Err(ControlError::NotCalibrated);
                }
                debug!("dispatching event {code} to {state}");
                let mut controller = lock_state(&self.states[state.as_u8() as usize])?;
                controller.event(code, &self.wires)
            }
            Frame::WireWrite { id, value } => {
                debug!("wire write: id {id} <- {value}");
                self.wires.write(id, value)?;
                Ok(None)
            }
        }
    }

    /// Move the active-state cursor, running the `exit` and `enter` hooks.
    pub fn set_active(&mut self, state: StateId) -> Result<(), ControlError> {
        if state == self.active {
            return Ok(());
        }
        info!("active state: {} -> {state}", self.active);
        lock_state(&self.states[self.active.as_u8() as usize])?.exit();
        self.active = state;
        lock_state(&self.states[state.as_u8() as usize])?.enter();
        Ok(())
    }

    /// Run the active state's periodic hook. Driven by the external loop.
    pub fn tick(&self) -> Result<(), ControlError> {
        lock_state(&self.states[self.active.as_u8() as usize])?.tick();
        Ok(())
    }
}

/// Take a controller's lock without blocking; contention means the
/// controller is mid-choreography and the caller gets `Busy`.
fn lock_state(
    state: &Mutex<Box<dyn StateController>>,
) -> Result<MutexGuard<'_, Box<dyn StateController>>, ControlError> {
    match state.try_lock() {
        Ok(guard) => Ok(guard),
        Err(TryLockError::WouldBlock) => Err(ControlError::Busy),
        Err(TryLockError::Poisoned(poisoned)) => Ok(poisoned.into_inner()),
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Controller stub with a switchable homing failure.
    struct StubController {
        fail_homing: bool,
    }

    impl StubController {
        fn new() -> Self {
            Self { fail_homing: false }
        }
    }

    impl StateController for StubController {
        fn calibrate(&mut self) -> Result<(), ControlError> {
            if self.fail_homing {
                return Err(ControlError::Timeout {
                    what: "test homing",
                    waited: std::time::Duration::from_millis(1),
                });
            }
            Ok(())
        }

        fn event(
            &mut self,
            _code: u8,
            _wires: &WireTable,
        ) -> Result<Option<Notification>, ControlError> {
            Ok(None)
        }
    }

    fn stub_manager() -> CellManager {
        CellManager::new(Box::new(StubController::new()), Box::new(StubController::new()))
    }

    #[test]
    fn protocol_identity() {
        let manager = stub_manager();
        assert_eq!(manager.protocol_id(), 0x1946_5309);
    }

    #[test]
    fn uncalibrated_manager_rejects_events() {
        let manager = stub_manager();
        let err = manager
            .handle_frame(Frame::Event {
                state: StateId::Lift,
                code: 0,
            })
            .unwrap_err();
        assert_eq!(err, ControlError::NotCalibrated);
    }

    #[test]
    fn wire_writes_pass_while_uncalibrated() {
        let manager = stub_manager();
        manager
            .handle_frame(Frame::WireWrite { id: 2, value: 24 })
            .unwrap();
        assert_eq!(manager.wires().read(2), Ok(24));
    }

    #[test]
    fn startup_calibrates_and_enables_dispatch() {
        let mut manager = stub_manager();
        manager.startup().unwrap();
        assert!(manager.is_calibrated());
        assert_eq!(
            manager.handle_frame(Frame::Event {
                state: StateId::Arm,
                code: 3,
            }),
            Ok(None)
        );
    }

    #[test]
    fn failed_homing_leaves_dispatch_rejected() {
        let mut failing = StubController::new();
        failing.fail_homing = true;
        let mut manager = CellManager::new(Box::new(failing), Box::new(StubController::new()));
        assert!(manager.startup().is_err());
        assert!(!manager.is_calibrated());
        let err = manager
            .handle_frame(Frame::Event {
                state: StateId::Arm,
                code: 0,
            })
            .unwrap_err();
        assert_eq!(err, ControlError::NotCalibrated);
    }

    #[test]
    fn unknown_wire_id_is_reported() {
        let manager = stub_manager();
        let err = manager
            .handle_frame(Frame::WireWrite { id: 9, value: 1 })
            .unwrap_err();
        assert_eq!(err, ControlError::UnknownWire(9));
    }

    #[test]
    fn cursor_moves_between_states() {
        let mut manager = stub_manager();
        assert_eq!(manager.active(), StateId::Idle);
        manager.set_active(StateId::Arm).unwrap();
        assert_eq!(manager.active(), StateId::Arm);
        manager.tick().unwrap();
        manager.set_active(StateId::Arm).unwrap();
        assert_eq!(manager.active(), StateId::Arm);
    }
}
