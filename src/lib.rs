//! Torque-speed and power-speed envelope estimation for permanent-magnet
//! synchronous machines.
//!
//! The envelope is built from steady-state dq-frame equations. Below base speed
//! the drive holds a fixed current angle (MTPA or zero d-axis current). Above it
//! the drive either advances the current angle (flux weakening) or lets the
//! current magnitude roll off as back-EMF eats the available voltage.
//!
//! The two entry points are [`compute_curve`] and [`estimate_max_speed`]. Both
//! are pure functions of a [`MotorParameters`] record.
#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod config;
pub mod curve;
pub mod dq;
pub mod error;
pub mod max_speed;
pub mod operating_point;
pub mod params;
pub mod search;

pub use config::{AngleScan, SimulationConfig};
pub use curve::{compute_curve, compute_curve_with, Region, SimulationPoint, SimulationResult};
pub use error::ParameterError;
pub use max_speed::{estimate_max_speed, estimate_max_speed_with, MaxSpeedEstimate};
pub use operating_point::OperatingPoint;
pub use params::{ControlStrategy, MotorParameters, MotorType};

/// 1/sqrt(3)
const FRAC_1_SQRT_3: f64 = 0.577_350_269_189_625_8;

/// Shared motor used by the unit tests: a small 30-pole IPMSM on an 18.5 V bus.
#[cfg(test)]
pub(crate) fn test_motor() -> MotorParameters {
    MotorParameters {
        motor_type: MotorType::Ipmsm,
        control_strategy: ControlStrategy::ZeroD,
        flux_weakening: false,
        rs: 0.0595,
        ld: 23.5e-6,
        lq: 35e-6,
        flux_linkage: 1.59e-3,
        pole_pairs: 15,
        dc_bus_voltage: 18.5,
        voltage_utilization: 0.9,
        max_current: 13.0,
        sweep_max_rpm: 5000.0,
    }
}
