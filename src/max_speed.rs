//! Closed-form estimate of the highest reachable speed.
//!
//! Ignores the resistive drop, so it is only meant as a suggested ceiling for
//! the sweep, not as a result in its own right.

use libm::{ceil, fabs};
use log::debug;

use crate::{config::SimulationConfig, dq, params::MotorParameters};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxSpeedEstimate {
    /// Mechanical RPM, rounded up to the configured unit.
    Bounded { rpm: f64 },
    /// Enough d-axis current is available to cancel the magnet flux.
    Unbounded,
}

impl MaxSpeedEstimate {
    /// Speed in RPM, with `Unbounded` mapped to `unbounded_rpm`.
    pub fn rpm_or(self, unbounded_rpm: f64) -> f64 {
        match self {
            Self::Bounded { rpm } => rpm,
            Self::Unbounded => unbounded_rpm,
        }
    }
}

/// Suggested sweep ceiling in RPM, using the default [`SimulationConfig`].
///
/// Returns the configured sentinel (20000 RPM) when the speed is theoretically
/// unbounded.
pub fn estimate_max_speed(params: &MotorParameters) -> f64 {
    let config = SimulationConfig::default();
    estimate_max_speed_with(params, &config).rpm_or(config.unbounded_speed_rpm)
}

pub fn estimate_max_speed_with(params: &MotorParameters, config: &SimulationConfig) -> MaxSpeedEstimate {
    let voltage_limit = dq::voltage_limit(params);

    let effective_flux = if params.flux_weakening {
        let characteristic_current = params.flux_linkage / params.ld;
        if params.max_current >= characteristic_current {
            debug!(
                "max current {} A reaches characteristic current {} A, speed unbounded",
                params.max_current, characteristic_current
            );
            return MaxSpeedEstimate::Unbounded;
        }
        let residual = fabs(params.flux_linkage - params.ld * params.max_current);
        if residual < config.residual_flux_epsilon {
            debug!("residual flux {} Wb cancels out, speed unbounded", residual);
            return MaxSpeedEstimate::Unbounded;
        }
        residual
    } else {
        params.flux_linkage
    };

    let omega = voltage_limit / effective_flux;
    let rpm = dq::electrical_speed_to_rpm(omega, params.pole_pairs);
    let unit = config.speed_rounding_rpm;
    let rpm = ceil(rpm / unit) * unit;
    debug!("estimated max speed {} rpm from {} Wb", rpm, effective_flux);
    MaxSpeedEstimate::Bounded { rpm }
}
