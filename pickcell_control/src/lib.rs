//! # Pickcell Control Library
//!
//! Motion-choreography and state/event-dispatch core for the pickcell
//! pick-and-place machine: a rotating pick-arm with an electromagnetic
//! gripper and a vertical lift with a gated output chute, coordinated
//! from event frames sent by an operator tablet.
//!
//! ## Architecture
//!
//! - [`state`] — `StateController` lifecycle/dispatch trait, `Idle` state
//! - [`lift`] — vertical lift controller (home, raise, lower, feeder)
//! - [`arm`] — pick-arm controller (homing, transfer choreographies,
//!   gripper/carriage toggles, wire-parameterized rotation)
//! - [`wire`] — externally writable value cells backing action parameters
//! - [`motion`] — bounded blocking waits over the axis driver boundary
//! - [`manager`] — router table, active-state cursor, frame dispatch
//!
//! Dispatch is strictly serial: an action runs to completion before the
//! next frame is handled, and a frame targeting a controller that is
//! still mid-choreography is rejected with `Busy`.

pub mod arm;
pub mod lift;
pub mod manager;
pub mod motion;
pub mod state;
pub mod wire;
