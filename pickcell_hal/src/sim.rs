//! Simulated axis and binary output.
//!
//! `SimAxis` integrates position toward a target at the commanded speed,
//! one fixed time-slice per `step()` call. Homing moves in the commanded
//! direction until the simulated home sensor position is crossed. A
//! `stall()` switch freezes motion for timeout testing.
//!
//! Both drivers hand out probe handles ([`SimAxisProbe`],
//! [`SimOutputProbe`]) so a test can observe and fault-inject an actuator
//! after ownership has moved into a controller.
//!
//! Acceleration parameters are accepted for contract parity with real
//! drives but not modeled; the simulation is velocity-limited only.

use pickcell_common::hal::{AxisDriver, BinaryOutput, HalError, MoveDirection};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Simulated time advanced by one `step()` call [s].
const SIM_STEP_DT: f64 = 0.001;

/// What the simulated axis is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimMotion {
    /// No motion armed.
    Rest,
    /// Positioning move toward `target`.
    Positioning,
    /// Homing approach toward the home sensor.
    Homing,
}

/// Mutable axis state, shared between the driver and its probes.
struct AxisInner {
    /// Current position in axis units.
    position: f64,
    /// Target of the armed positioning move.
    target: f64,
    /// Speed of the armed motion [units/s].
    commanded_speed: f64,
    /// Direction sign of the armed homing approach.
    homing_sign: f64,
    /// Where the simulated home sensor asserts.
    home_sensor_position: f64,
    /// Armed motion kind.
    motion: SimMotion,
    /// Is the drive energized?
    enabled: bool,
    /// Fault injection: motion armed but never progresses.
    stalled: bool,
}

impl AxisInner {
    fn advance_toward(&mut self, goal: f64, rate: f64) -> bool {
        let delta = goal - self.position;
        if delta.abs() <= rate {
            self.position = goal;
            true
        } else {
            self.position += delta.signum() * rate;
            false
        }
    }
}

/// Simulated single-degree-of-freedom axis.
pub struct SimAxis {
    /// Axis name for logging.
    name: &'static str,
    /// Speed for positioning moves [units/s].
    travel_speed: f64,
    /// Shared state, also reachable through probes.
    inner: Arc<Mutex<AxisInner>>,
}

impl SimAxis {
    /// Create a simulated axis with its home sensor at position 0.
    pub fn new(name: &'static str, travel_speed: f64) -> Self {
        Self {
            name,
            travel_speed,
            inner: Arc::new(Mutex::new(AxisInner {
                position: 0.0,
                target: 0.0,
                commanded_speed: travel_speed,
                homing_sign: 1.0,
                home_sensor_position: 0.0,
                motion: SimMotion::Rest,
                enabled: false,
                stalled: false,
            })),
        }
    }

    /// Observation/fault-injection handle onto this axis.
    pub fn probe(&self) -> SimAxisProbe {
        SimAxisProbe {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Place the axis at an arbitrary position (test setup).
    pub fn set_position(&mut self, position: f64) {
        self.lock().position = position;
    }

    /// Freeze all motion: armed moves never complete.
    pub fn stall(&mut self) {
        self.lock().stalled = true;
    }

    /// Is the drive energized?
    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    fn lock(&self) -> MutexGuard<'_, AxisInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AxisDriver for SimAxis {
    fn enable(&mut self) {
        self.lock().enabled = true;
        debug!("sim axis {} enabled", self.name);
    }

    fn disable(&mut self) {
        let mut inner = self.lock();
        inner.enabled = false;
        inner.motion = SimMotion::Rest;
        debug!("sim axis {} disabled", self.name);
    }

    fn begin_home(
        &mut self,
        direction: MoveDirection,
        speed: f64,
        _accel: f64,
    ) -> Result<(), HalError> {
        let mut inner = self.lock();
        if !inner.enabled {
            return Err(HalError::Disabled);
        }
        inner.commanded_speed = speed.abs();
        inner.homing_sign = direction.sign();
        inner.motion = SimMotion::Homing;
        debug!("sim axis {} homing {:?} at {speed}", self.name, direction);
        Ok(())
    }

    fn begin_move_to(&mut self, target: f64) -> Result<(), HalError> {
        let mut inner = self.lock();
        if !inner.enabled {
            return Err(HalError::Disabled);
        }
        inner.commanded_speed = self.travel_speed;
        inner.target = target;
        inner.motion = SimMotion::Positioning;
        debug!("sim axis {} moving to {target}", self.name);
        Ok(())
    }

    fn step(&mut self) -> Result<(), HalError> {
        let mut inner = self.lock();
        if !inner.enabled {
            return Err(HalError::Disabled);
        }
        if inner.stalled || inner.motion == SimMotion::Rest {
            return Ok(());
        }

        let rate = inner.commanded_speed * SIM_STEP_DT;
        match inner.motion {
            SimMotion::Positioning => {
                let target = inner.target;
                if inner.advance_toward(target, rate) {
                    inner.motion = SimMotion::Rest;
                    trace!("sim axis {} reached {}", self.name, inner.position);
                }
            }
            SimMotion::Homing => {
                // The sensor asserts once the approach reaches its position.
                if (inner.position - inner.home_sensor_position).abs() <= rate {
                    inner.position = inner.home_sensor_position;
                    inner.motion = SimMotion::Rest;
                    trace!("sim axis {} home sensor asserted", self.name);
                } else {
                    inner.position += inner.homing_sign * rate;
                }
            }
            SimMotion::Rest => {}
        }
        Ok(())
    }

    fn motion_complete(&self) -> bool {
        self.lock().motion == SimMotion::Rest
    }

    fn mark_home(&mut self) {
        let mut inner = self.lock();
        inner.position = 0.0;
        inner.target = 0.0;
        inner.home_sensor_position = 0.0;
        debug!("sim axis {} homed", self.name);
    }

    fn position(&self) -> f64 {
        self.lock().position
    }
}

/// Observation and fault-injection handle onto a [`SimAxis`].
#[derive(Clone)]
pub struct SimAxisProbe {
    inner: Arc<Mutex<AxisInner>>,
}

impl SimAxisProbe {
    fn lock(&self) -> MutexGuard<'_, AxisInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current position in axis units.
    pub fn position(&self) -> f64 {
        self.lock().position
    }

    /// Is the drive energized?
    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Whether the armed motion has finished.
    pub fn motion_complete(&self) -> bool {
        self.lock().motion == SimMotion::Rest
    }

    /// Freeze all motion: armed moves never complete.
    pub fn stall(&self) {
        self.lock().stalled = true;
    }

    /// Place the axis at an arbitrary position (test setup).
    pub fn set_position(&self, position: f64) {
        self.lock().position = position;
    }
}

/// Simulated binary output. Remembers the last commanded level.
pub struct SimOutput {
    name: &'static str,
    level: Arc<AtomicBool>,
}

impl SimOutput {
    /// Create an output driven low.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            level: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Observation handle onto this output.
    pub fn probe(&self) -> SimOutputProbe {
        SimOutputProbe {
            level: Arc::clone(&self.level),
        }
    }
}

impl BinaryOutput for SimOutput {
    fn set(&mut self, level: bool) {
        self.level.store(level, Ordering::Relaxed);
        trace!("sim output {} -> {level}", self.name);
    }

    fn get(&self) -> bool {
        self.level.load(Ordering::Relaxed)
    }
}

/// Observation handle onto a [`SimOutput`].
#[derive(Clone)]
pub struct SimOutputProbe {
    level: Arc<AtomicBool>,
}

impl SimOutputProbe {
    /// Last commanded level.
    pub fn get(&self) -> bool {
        self.level.load(Ordering::Relaxed)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
