//! Wire-value synchronization table.
//!
//! A fixed table of externally writable numeric cells, each owned by one
//! subsystem state. Writes are raw overwrites with no range check; a
//! controller action that depends on a wire value reads it lazily at the
//! moment the action executes, and range validation happens there. Cells
//! are atomic so the transport listener may write while an action is in
//! flight on the dispatch context.

use pickcell_common::config::ConfigError;
use pickcell_common::error::ControlError;
use pickcell_common::protocol::{
    StateId, WireId, WIRE_ARM_ROTATIONS, WIRE_LIFT_STEPPER_TARGET,
};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

/// One entry of the synchronization table.
#[derive(Debug)]
struct WireEntry {
    /// Unique wire id on the external protocol.
    id: WireId,
    /// Subsystem state whose actions consume this cell.
    owner: StateId,
    /// Declared width on the wire [bytes].
    width_bytes: usize,
    /// Current value. Raw, uninterpreted.
    cell: AtomicU32,
    /// Has this cell ever been written? Lets a consuming action reject
    /// a parameter that was never supplied.
    written: AtomicBool,
}

impl WireEntry {
    fn new(id: WireId, owner: StateId, width_bytes: usize) -> Self {
        Self {
            id,
            owner,
            width_bytes,
            cell: AtomicU32::new(0),
            written: AtomicBool::new(false),
        }
    }
}

/// Fixed table of wire value cells.
#[derive(Debug)]
pub struct WireTable {
    entries: Vec<WireEntry>,
}

impl WireTable {
    /// Build a table from `(id, owner, width)` declarations.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a wire id appears twice.
    pub fn new(declarations: &[(WireId, StateId, usize)]) -> Result<Self, ControlError> {
        let mut entries: Vec<WireEntry> = Vec::with_capacity(declarations.len());
        for &(id, owner, width_bytes) in declarations {
            if entries.iter().any(|e| e.id == id) {
                return Err(ControlError::Config(ConfigError::Validation(format!(
                    "duplicate wire id {id}"
                ))));
            }
            entries.push(WireEntry::new(id, owner, width_bytes));
        }
        Ok(Self { entries })
    }

    /// The machine's fixed wire table: the lift's raw stepper target and
    /// the arm's rotation percentage, both 32-bit.
    pub fn standard() -> Self {
        Self {
            entries: vec![
                WireEntry::new(WIRE_LIFT_STEPPER_TARGET, StateId::Lift, 4),
                WireEntry::new(WIRE_ARM_ROTATIONS, StateId::Arm, 4),
            ],
        }
    }

    fn entry(&self, id: WireId) -> Result<&WireEntry, ControlError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or(ControlError::UnknownWire(id))
    }

    /// Overwrite a cell with a raw value. No interpretation or range check.
    ///
    /// The value store is ordered before the written flag, so a reader on
    /// another thread that observes `written == true` also sees the value.
    pub fn write(&self, id: WireId, value: u32) -> Result<(), ControlError> {
        let entry = self.entry(id)?;
        entry.cell.store(value, Ordering::Release);
        entry.written.store(true, Ordering::Release);
        Ok(())
    }

    /// Read the current raw contents of a cell.
    pub fn read(&self, id: WireId) -> Result<u32, ControlError> {
        Ok(self.entry(id)?.cell.load(Ordering::Acquire))
    }

    /// Whether a cell has ever been written.
    pub fn written(&self, id: WireId) -> Result<bool, ControlError> {
        Ok(self.entry(id)?.written.load(Ordering::Acquire))
    }

    /// Owning state of a wire id, if present.
    pub fn owner(&self, id: WireId) -> Option<StateId> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.owner)
    }

    /// Declared byte width of a wire id, if present.
    pub fn width(&self, id: WireId) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.width_bytes)
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
