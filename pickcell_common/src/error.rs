//! Control-layer error taxonomy.
//!
//! Every action failure is recoverable at the manager boundary and is
//! reported back over the transport instead of crashing the process. The
//! one exception is a failed startup homing: the manager then refuses
//! event dispatch with `NotCalibrated` until the cell is re-homed.

use crate::config::ConfigError;
use crate::hal::HalError;
use std::time::Duration;
use thiserror::Error;

/// Error types for cell control operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControlError {
    /// The target controller is still executing a previous action.
    #[error("controller is busy with a previous action")]
    Busy,

    /// An externally supplied parameter is outside the accepted range.
    #[error("invalid parameter: {what} = {value}")]
    InvalidParameter {
        /// Which parameter was rejected.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A bounded motion wait expired before the axis reported completion.
    #[error("{what} did not complete within {waited:?}")]
    Timeout {
        /// Which motion stalled.
        what: &'static str,
        /// The configured bound that expired.
        waited: Duration,
    },

    /// Event dispatch was attempted before startup homing succeeded.
    #[error("cell is not calibrated: startup homing has not completed")]
    NotCalibrated,

    /// A wire id that is not present in the synchronization table.
    #[error("no wire value with id {0}")]
    UnknownWire(u8),

    /// Driver-reported failure.
    #[error("driver error: {0}")]
    Hal(#[from] HalError),

    /// Configuration failure.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
