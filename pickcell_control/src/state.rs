//! Subsystem state lifecycle and event dispatch.
//!
//! Every subsystem is a named state with lifecycle hooks and an event
//! dispatcher. Hooks default to no-ops so a state only implements what it
//! needs; `event` is the one required entry point.

use pickcell_common::error::ControlError;
use pickcell_common::protocol::Notification;
use tracing::debug;

use crate::wire::WireTable;

/// Lifecycle and dispatch interface of one subsystem state.
///
/// # Lifecycle
///
/// 1. `setup()` - Once at process start: configure outputs to safe levels
/// 2. `calibrate()` - Immediately after setup: homing; failure is fatal
///    for dispatch until the cell is re-homed
/// 3. `enter()` / `exit()` - When the active-state cursor moves
/// 4. `tick()` - Repeatedly while this state is active
/// 5. `event(code, wires)` - On every inbound event frame for this state
///
/// An event code outside the state's repertoire is a no-op, not an error.
pub trait StateController: Send {
    /// One-time output/axis configuration.
    fn setup(&mut self) -> Result<(), ControlError> {
        Ok(())
    }

    /// Startup homing. Runs once after `setup`; must leave the subsystem
    /// at a known calibrated position.
    fn calibrate(&mut self) -> Result<(), ControlError> {
        Ok(())
    }

    /// The active-state cursor moved onto this state.
    fn enter(&mut self) {}

    /// The active-state cursor moved off this state.
    fn exit(&mut self) {}

    /// Periodic hook while active. Driven by the external loop.
    fn tick(&mut self) {}

    /// Dispatch one event code, reading any action parameter from the
    /// wire table at execution time.
    fn event(&mut self, code: u8, wires: &WireTable)
    -> Result<Option<Notification>, ControlError>;
}

/// The idle state: owns no actuators, ignores every event.
pub struct IdleController;

impl StateController for IdleController {
    fn event(
        &mut self,
        code: u8,
        _wires: &WireTable,
    ) -> Result<Option<Notification>, ControlError> {
        debug!(code, "idle: event ignored");
        Ok(None)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_ignores_every_code() {
        let wires = WireTable::standard();
        let mut idle = IdleController;
        for code in 0..=u8::MAX {
            assert_eq!(idle.event(code, &wires), Ok(None));
        }
    }

    #[test]
    fn default_hooks_are_no_ops() {
        let mut idle = IdleController;
        assert!(idle.setup().is_ok());
        assert!(idle.calibrate().is_ok());
        idle.enter();
        idle.tick();
        idle.exit();
    }
}
