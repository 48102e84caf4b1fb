//! Pickcell Common Library
//!
//! Shared types for the pickcell workspace: the cell configuration, the
//! error taxonomy, the operator protocol constants, and the axis/actuator
//! driver boundary consumed by the control crate.
//!
//! # Module Structure
//!
//! - [`config`] - Cell configuration loading and validation
//! - [`error`] - Control-layer error taxonomy
//! - [`hal`] - Axis and binary-actuator driver traits
//! - [`protocol`] - Operator protocol ids, frames and notifications

pub mod config;
pub mod error;
pub mod hal;
pub mod protocol;
