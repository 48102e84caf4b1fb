//! Pickcell HAL
//!
//! Driver implementations for the axis/actuator boundary declared in
//! `pickcell_common::hal`. Currently a single backend: the simulation
//! driver used by tests and by the control binary's `--simulate` mode.

pub mod sim;
